//! # State-Merge Directives
//!
//! `process` never writes state. It returns a list of directives that the
//! host commits atomically. Entity writes replace the stored value; balance
//! changes are expressed as deltas so the host can merge several operations'
//! fee movements against the same balance within one block.

use credreg_core::{Amount, CurrencyId};
use credreg_state::StateValue;
use serde::{Deserialize, Serialize};

/// One `(key, new value)` pair returned by `process`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMergeValue {
    /// State key.
    pub key: String,
    /// What to do at the key.
    pub value: MergeValue,
}

/// The change applied at a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MergeValue {
    /// Replace the stored value.
    Set {
        /// New value.
        value: StateValue,
    },
    /// Credit a balance.
    AddBalance {
        /// Currency.
        currency: CurrencyId,
        /// Credited amount.
        amount: Amount,
    },
    /// Debit a balance.
    DeductBalance {
        /// Currency.
        currency: CurrencyId,
        /// Debited amount.
        amount: Amount,
    },
}

impl StateMergeValue {
    /// A replace directive.
    pub fn set(key: impl Into<String>, value: StateValue) -> Self {
        Self {
            key: key.into(),
            value: MergeValue::Set { value },
        }
    }

    /// A credit directive.
    pub fn add_balance(key: impl Into<String>, currency: CurrencyId, amount: Amount) -> Self {
        Self {
            key: key.into(),
            value: MergeValue::AddBalance { currency, amount },
        }
    }

    /// A debit directive.
    pub fn deduct_balance(key: impl Into<String>, currency: CurrencyId, amount: Amount) -> Self {
        Self {
            key: key.into(),
            value: MergeValue::DeductBalance { currency, amount },
        }
    }

    /// The value set by this directive, if it is a replace.
    pub fn set_value(&self) -> Option<&StateValue> {
        match &self.value {
            MergeValue::Set { value } => Some(value),
            _ => None,
        }
    }
}
