//! # In-Memory Ledger
//!
//! A `BTreeMap`-backed state store implementing [`StateReader`] and an
//! atomic directive commit. Used by the CLI's scenario replay and by the
//! integration tests to drive the processors end to end.
//!
//! ## Commit
//!
//! A directive list is staged against a scratch view first; nothing is
//! written unless every directive applies. Balance deltas against the same
//! key accumulate in list order.

use std::collections::BTreeMap;

use credreg_core::{Address, Amount, CredregError, CurrencyId};
use credreg_crypto::Ed25519PublicKey;
use credreg_state::keys::{account_key, balance_key, contract_account_key, currency_key};
use credreg_state::{
    AccountKey, AccountRecord, BalanceRecord, ContractAccountRecord, CurrencyRecord, FeePolicy,
    StateValue,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::merge::{MergeValue, StateMergeValue};
use crate::reader::{ReadError, StateReader};

/// A directive list that could not be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// A balance delta targets a key holding something else.
    #[error("balance directive targets non-balance value at {key}: {found}")]
    NotBalance {
        /// Key.
        key: String,
        /// Variant found.
        found: &'static str,
    },

    /// A balance delta's currency differs from the stored balance.
    #[error("currency mismatch at {key}: stored {stored}, directive {directive}")]
    CurrencyMismatch {
        /// Key.
        key: String,
        /// Stored currency.
        stored: CurrencyId,
        /// Directive currency.
        directive: CurrencyId,
    },

    /// A debit targets a missing balance.
    #[error("debit from missing balance at {0}")]
    MissingBalance(String),

    /// Balance arithmetic failed.
    #[error("balance arithmetic at {key}: {source}")]
    Arithmetic {
        /// Key.
        key: String,
        /// Underlying error.
        source: CredregError,
    },
}

/// Ordered key-value state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryLedger {
    states: BTreeMap<String, StateValue>,
}

impl MemoryLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value at `key`.
    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.states.get(key)
    }

    /// Replace the value at `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: StateValue) {
        self.states.insert(key.into(), value);
    }

    /// All states in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &StateValue)> {
        self.states.iter()
    }

    /// States whose key satisfies `pred`.
    pub fn filter_keys<'a>(
        &'a self,
        pred: impl Fn(&str) -> bool + 'a,
    ) -> impl Iterator<Item = (&'a String, &'a StateValue)> + 'a {
        self.states.iter().filter(move |(k, _)| pred(k))
    }

    /// Number of stored states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Amount held by `address` in `currency`; zero when absent.
    pub fn balance(&self, address: &Address, currency: &CurrencyId) -> Amount {
        self.states
            .get(&balance_key(address, currency))
            .and_then(StateValue::as_balance)
            .map(|b| b.amount)
            .unwrap_or(Amount::ZERO)
    }

    // ─── Genesis ─────────────────────────────────────────────────────

    /// Store a single-key account with threshold equal to the key's weight.
    pub fn add_account(&mut self, address: &Address, public_key: Ed25519PublicKey) {
        self.add_multisig_account(
            address,
            vec![AccountKey {
                public_key,
                weight: 100,
            }],
            100,
        );
    }

    /// Store an account with explicit weighted keys.
    pub fn add_multisig_account(&mut self, address: &Address, keys: Vec<AccountKey>, threshold: u16) {
        self.insert(
            account_key(address),
            StateValue::Account(AccountRecord {
                address: address.clone(),
                keys,
                threshold,
            }),
        );
    }

    /// Store a contract account owned by `owner`. Contract accounts also
    /// carry an (empty) account record.
    pub fn add_contract_account(&mut self, address: &Address, owner: &Address, operators: Vec<Address>) {
        self.add_multisig_account(address, Vec::new(), 100);
        self.insert(
            contract_account_key(address),
            StateValue::ContractAccount(ContractAccountRecord {
                owner: owner.clone(),
                operators,
                is_active: false,
            }),
        );
    }

    /// Store a currency and its fee policy.
    pub fn add_currency(&mut self, currency: &CurrencyId, fee: FeePolicy) {
        self.insert(
            currency_key(currency),
            StateValue::Currency(CurrencyRecord {
                currency: currency.clone(),
                fee,
            }),
        );
    }

    /// Set a balance.
    pub fn set_balance(&mut self, address: &Address, currency: &CurrencyId, amount: Amount) {
        self.insert(
            balance_key(address, currency),
            StateValue::Balance(BalanceRecord {
                currency: currency.clone(),
                amount,
            }),
        );
    }

    // ─── Commit ──────────────────────────────────────────────────────

    /// Apply a directive list atomically.
    pub fn commit(&mut self, directives: &[StateMergeValue]) -> Result<(), CommitError> {
        let mut staged: BTreeMap<String, StateValue> = BTreeMap::new();
        for d in directives {
            let current = staged
                .get(&d.key)
                .or_else(|| self.states.get(&d.key))
                .cloned();
            let next = match &d.value {
                MergeValue::Set { value } => value.clone(),
                MergeValue::AddBalance { currency, amount } => {
                    let held = held_balance(&d.key, current.as_ref(), currency)?;
                    let total = held
                        .unwrap_or(Amount::ZERO)
                        .checked_add(*amount)
                        .map_err(|source| CommitError::Arithmetic {
                            key: d.key.clone(),
                            source,
                        })?;
                    balance_value(currency, total)
                }
                MergeValue::DeductBalance { currency, amount } => {
                    let held = held_balance(&d.key, current.as_ref(), currency)?
                        .ok_or_else(|| CommitError::MissingBalance(d.key.clone()))?;
                    let rest = held
                        .checked_sub(*amount)
                        .map_err(|source| CommitError::Arithmetic {
                            key: d.key.clone(),
                            source,
                        })?;
                    balance_value(currency, rest)
                }
            };
            staged.insert(d.key.clone(), next);
        }
        tracing::debug!(states = staged.len(), "committing directives");
        self.states.extend(staged);
        Ok(())
    }
}

fn held_balance(
    key: &str,
    current: Option<&StateValue>,
    currency: &CurrencyId,
) -> Result<Option<Amount>, CommitError> {
    match current {
        None => Ok(None),
        Some(StateValue::Balance(b)) if &b.currency == currency => Ok(Some(b.amount)),
        Some(StateValue::Balance(b)) => Err(CommitError::CurrencyMismatch {
            key: key.to_string(),
            stored: b.currency.clone(),
            directive: currency.clone(),
        }),
        Some(other) => Err(CommitError::NotBalance {
            key: key.to_string(),
            found: other.kind(),
        }),
    }
}

fn balance_value(currency: &CurrencyId, amount: Amount) -> StateValue {
    StateValue::Balance(BalanceRecord {
        currency: currency.clone(),
        amount,
    })
}

impl StateReader for MemoryLedger {
    fn read(&self, key: &str) -> Result<Option<StateValue>, ReadError> {
        Ok(self.states.get(key).cloned())
    }
}
