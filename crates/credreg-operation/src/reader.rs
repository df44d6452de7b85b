//! # State Reader and Host Checks
//!
//! Processors never own state. Each call receives a [`StateReader`], a point
//! lookup against committed-plus-pending state, and builds every host check
//! (account existence, contract ownership, currency policy, balance,
//! signature threshold) on top of it.
//!
//! Any closure `Fn(&str) -> Result<Option<StateValue>, ReadError>` is a
//! reader, so hosts can pass a snapshot lookup directly.

use std::collections::HashSet;

use credreg_core::{Address, CurrencyId};
use credreg_crypto::{signing_message, verify};
use credreg_state::keys::{account_key, balance_key, contract_account_key, currency_key, design_key};
use credreg_state::{
    AccountRecord, BalanceRecord, ContractAccountRecord, CurrencyRecord, Design, StateValue,
};
use thiserror::Error;

use crate::error::{Fatal, ProcessError, Rejection};
use crate::fact::Operation;

/// A failed state lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("state read failed for {key}: {reason}")]
pub struct ReadError {
    /// Key being read.
    pub key: String,
    /// Host-supplied reason.
    pub reason: String,
}

/// Point lookup of a state value.
pub trait StateReader {
    /// Read the value under `key`; `Ok(None)` when absent.
    fn read(&self, key: &str) -> Result<Option<StateValue>, ReadError>;
}

impl<F> StateReader for F
where
    F: Fn(&str) -> Result<Option<StateValue>, ReadError>,
{
    fn read(&self, key: &str) -> Result<Option<StateValue>, ReadError> {
        self(key)
    }
}

// ─── Typed Lookups ───────────────────────────────────────────────────

fn read(reader: &dyn StateReader, key: &str) -> Result<Option<StateValue>, ProcessError> {
    reader.read(key).map_err(|e| Fatal::Read(e).into())
}

fn unexpected(key: &str, expected: &'static str, found: &StateValue) -> ProcessError {
    Fatal::UnexpectedValue {
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
    .into()
}

/// Read a value and project it with `pick`, treating a wrong variant as fatal.
pub(crate) fn read_typed<T>(
    reader: &dyn StateReader,
    key: &str,
    expected: &'static str,
    pick: impl FnOnce(StateValue) -> Result<T, StateValue>,
) -> Result<Option<T>, ProcessError> {
    match read(reader, key)? {
        None => Ok(None),
        Some(v) => pick(v).map(Some).map_err(|v| unexpected(key, expected, &v)),
    }
}

/// Load an account's key set, if it exists.
pub fn load_account(
    reader: &dyn StateReader,
    address: &Address,
) -> Result<Option<AccountRecord>, ProcessError> {
    read_typed(reader, &account_key(address), "account", |v| match v {
        StateValue::Account(a) => Ok(a),
        other => Err(other),
    })
}

/// Load a contract account record, if it exists.
pub fn load_contract_account(
    reader: &dyn StateReader,
    address: &Address,
) -> Result<Option<ContractAccountRecord>, ProcessError> {
    read_typed(reader, &contract_account_key(address), "contract_account", |v| match v {
        StateValue::ContractAccount(c) => Ok(c),
        other => Err(other),
    })
}

/// Load a contract's design, if registered.
pub fn load_design(
    reader: &dyn StateReader,
    contract: &Address,
) -> Result<Option<Design>, ProcessError> {
    read_typed(reader, &design_key(contract), "design", |v| match v {
        StateValue::Design(d) => Ok(d),
        other => Err(other),
    })
}

/// Load a currency design, if it exists.
pub fn load_currency(
    reader: &dyn StateReader,
    currency: &CurrencyId,
) -> Result<Option<CurrencyRecord>, ProcessError> {
    read_typed(reader, &currency_key(currency), "currency", |v| match v {
        StateValue::Currency(c) => Ok(c),
        other => Err(other),
    })
}

/// Load an account's balance in one currency, if it exists.
pub fn load_balance(
    reader: &dyn StateReader,
    address: &Address,
    currency: &CurrencyId,
) -> Result<Option<BalanceRecord>, ProcessError> {
    read_typed(reader, &balance_key(address, currency), "balance", |v| match v {
        StateValue::Balance(b) => Ok(b),
        other => Err(other),
    })
}

// ─── Host Checks ─────────────────────────────────────────────────────

/// Require a plain (non-contract) account to exist.
pub fn require_plain_account(
    reader: &dyn StateReader,
    role: &'static str,
    address: &Address,
) -> Result<AccountRecord, ProcessError> {
    let account = load_account(reader, address)?.ok_or_else(|| Rejection::AccountNotFound {
        role,
        address: address.clone(),
    })?;
    if load_contract_account(reader, address)?.is_some() {
        return Err(Rejection::IsContractAccount {
            role,
            address: address.clone(),
        }
        .into());
    }
    Ok(account)
}

/// Require the contract account to exist and return its record.
pub fn require_contract(
    reader: &dyn StateReader,
    contract: &Address,
) -> Result<ContractAccountRecord, ProcessError> {
    if load_account(reader, contract)?.is_none() {
        return Err(Rejection::ContractNotFound(contract.clone()).into());
    }
    load_contract_account(reader, contract)?
        .ok_or_else(|| Rejection::ContractNotFound(contract.clone()).into())
}

/// Require the contract to exist and be owned by `sender`.
pub fn require_owned_contract(
    reader: &dyn StateReader,
    sender: &Address,
    contract: &Address,
) -> Result<ContractAccountRecord, ProcessError> {
    let record = require_contract(reader, contract)?;
    if &record.owner != sender {
        return Err(Rejection::NotOwner {
            sender: sender.clone(),
            contract: contract.clone(),
        }
        .into());
    }
    Ok(record)
}

/// Require an active contract that `sender` owns or operates.
pub fn require_operable_contract(
    reader: &dyn StateReader,
    sender: &Address,
    contract: &Address,
) -> Result<ContractAccountRecord, ProcessError> {
    let record = require_contract(reader, contract)?;
    if !record.is_owner_or_operator(sender) {
        return Err(Rejection::NotOwnerOrOperator {
            sender: sender.clone(),
            contract: contract.clone(),
        }
        .into());
    }
    if !record.is_active {
        return Err(Rejection::ContractNotActive(contract.clone()).into());
    }
    Ok(record)
}

/// Require a currency design to exist.
pub fn require_currency(
    reader: &dyn StateReader,
    currency: &CurrencyId,
) -> Result<CurrencyRecord, ProcessError> {
    load_currency(reader, currency)?.ok_or_else(|| Rejection::CurrencyNotFound(currency.clone()).into())
}

/// Verify that the operation's sign set satisfies `sender`'s threshold.
///
/// Each distinct account key counts once, and only when its signature over
/// `network_id ++ fact_hash` verifies. Signatures from keys outside the
/// account are ignored.
pub fn check_fact_signs(
    account: &AccountRecord,
    op: &Operation,
    network_id: &[u8],
) -> Result<(), ProcessError> {
    if op.signs.is_empty() {
        return Err(Rejection::InvalidSigning("no signatures".to_string()).into());
    }
    let message = signing_message(network_id, &op.fact.hash());
    let mut counted = HashSet::new();
    let mut weight: u32 = 0;
    for sign in &op.signs {
        let Some(w) = account.weight_of(&sign.signer) else {
            continue;
        };
        if verify(&message, &sign.signature, &sign.signer).is_err() {
            return Err(Rejection::InvalidSigning(format!(
                "signature by {} does not verify",
                sign.signer
            ))
            .into());
        }
        if counted.insert(sign.signer.clone()) {
            weight += u32::from(w);
        }
    }
    if weight < u32::from(account.threshold) {
        return Err(Rejection::InvalidSigning(format!(
            "signed weight {weight} below threshold {}",
            account.threshold
        ))
        .into());
    }
    Ok(())
}
