//! # Fee Calculator
//!
//! Shared by all four processors. Items are grouped by currency; each item
//! adds the currency's fee evaluated at a zero base, so fees behave as flat
//! per-item surcharges.
//!
//! ## Two-slot accumulation
//!
//! Every currency accumulates a [`RequiredFee`] with two running totals:
//! `total` (what the sender must be able to pay) and `receiver_amount`
//! (what is credited to the currency's fee receiver). Today both grow by
//! the same amount per item, but settlement treats them independently.
//!
//! ## Settlement
//!
//! [`settle`] checks the sender's balances and builds the balance
//! directives in currency-id order:
//!
//! - no receiver configured: debit `total`, no credit;
//! - receiver is the sender: debit `total - receiver_amount`;
//! - otherwise: debit `total`, credit `receiver_amount` to the receiver.
//!
//! Zero-amount directives are never emitted.

use std::collections::BTreeMap;

use credreg_core::{Address, Amount, CurrencyId};
use credreg_state::keys::balance_key;

use crate::error::{Fatal, ProcessError, Rejection};
use crate::merge::StateMergeValue;
use crate::reader::{load_balance, require_currency, StateReader};

/// Anything that is charged a fee in one currency.
pub trait FeeItem {
    /// Currency the fee is paid in.
    fn currency(&self) -> &CurrencyId;
}

/// Accumulated fee for one currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredFee {
    /// Amount the sender must cover.
    pub total: Amount,
    /// Amount payable to the receiver.
    pub receiver_amount: Amount,
    /// Configured fee receiver, if any.
    pub receiver: Option<Address>,
}

impl RequiredFee {
    fn new(receiver: Option<Address>) -> Self {
        Self {
            total: Amount::ZERO,
            receiver_amount: Amount::ZERO,
            receiver,
        }
    }
}

/// Group `items` by currency and sum each currency's per-item fee.
///
/// Every currency must exist, including those whose fee evaluates to zero.
pub fn calculate_required<'i, I>(
    reader: &dyn StateReader,
    items: impl IntoIterator<Item = &'i I>,
) -> Result<BTreeMap<CurrencyId, RequiredFee>, ProcessError>
where
    I: FeeItem + 'i,
{
    let mut required: BTreeMap<CurrencyId, RequiredFee> = BTreeMap::new();
    for item in items {
        let currency = item.currency();
        let record = require_currency(reader, currency)?;
        let fee = record.fee.fee(Amount::ZERO).map_err(|source| Rejection::Fee {
            currency: currency.clone(),
            source,
        })?;

        let entry = required
            .entry(currency.clone())
            .or_insert_with(|| RequiredFee::new(record.fee.receiver().cloned()));
        if fee.is_zero() {
            continue;
        }
        entry.total = entry.total.checked_add(fee).map_err(|source| Rejection::Fee {
            currency: currency.clone(),
            source,
        })?;
        entry.receiver_amount = entry
            .receiver_amount
            .checked_add(fee)
            .map_err(|source| Rejection::Fee {
                currency: currency.clone(),
                source,
            })?;
    }
    Ok(required)
}

/// Check that `sender` can pay `required` and build the balance directives.
pub fn settle(
    reader: &dyn StateReader,
    sender: &Address,
    required: &BTreeMap<CurrencyId, RequiredFee>,
) -> Result<Vec<StateMergeValue>, ProcessError> {
    let mut directives = Vec::new();
    for (currency, fee) in required {
        if fee.total.is_zero() {
            continue;
        }

        let available = load_balance(reader, sender, currency)?
            .map(|b| b.amount)
            .unwrap_or(Amount::ZERO);
        if available < fee.total {
            return Err(Rejection::InsufficientBalance {
                currency: currency.clone(),
                required: fee.total,
                available,
            }
            .into());
        }

        let mut debit = fee.total;
        match &fee.receiver {
            Some(receiver) if !fee.receiver_amount.is_zero() => {
                if load_balance(reader, receiver, currency)?.is_none() {
                    return Err(Rejection::FeeReceiverNotFound {
                        currency: currency.clone(),
                        receiver: receiver.clone(),
                    }
                    .into());
                }
                if receiver == sender {
                    debit = debit.checked_sub(fee.receiver_amount).map_err(Fatal::Arithmetic)?;
                } else {
                    directives.push(StateMergeValue::add_balance(
                        balance_key(receiver, currency),
                        currency.clone(),
                        fee.receiver_amount,
                    ));
                }
            }
            _ => {}
        }

        if !debit.is_zero() {
            directives.push(StateMergeValue::deduct_balance(
                balance_key(sender, currency),
                currency.clone(),
                debit,
            ));
        }
    }
    Ok(directives)
}

/// [`calculate_required`] followed by [`settle`].
pub fn charge<'i, I>(
    reader: &dyn StateReader,
    sender: &Address,
    items: impl IntoIterator<Item = &'i I>,
) -> Result<Vec<StateMergeValue>, ProcessError>
where
    I: FeeItem + 'i,
{
    let required = calculate_required(reader, items)?;
    settle(reader, sender, &required)
}
