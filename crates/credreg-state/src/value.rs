//! # State Values
//!
//! `StateValue` is the closed set of values stored under the keys built in
//! [`crate::keys`]: the registry's own entities plus the host ledger records
//! (accounts, contract accounts, balances, currencies) the processors read.
//!
//! Processors that find a value of the wrong variant under a key treat it as
//! an invariant violation; the typed accessors return `None` in that case so
//! the caller decides the error tier.

use credreg_core::{Address, Amount, Canonical, CanonicalWriter, CredregError, CurrencyId};
use credreg_crypto::Ed25519PublicKey;
use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::design::Design;
use crate::template::Template;

/// A value stored in the ledger's key-value state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateValue {
    /// A credential service design.
    Design(Design),
    /// An immutable template.
    Template(Template),
    /// A credential row with its activity flag.
    Credential {
        /// The credential entity.
        credential: Credential,
        /// Whether the credential is currently active.
        is_active: bool,
    },
    /// Latest DID recorded for a holder under one design.
    HolderDid {
        /// The DID string.
        did: String,
    },
    /// A host account's signing keys.
    Account(AccountRecord),
    /// A host contract account.
    ContractAccount(ContractAccountRecord),
    /// A host balance in one currency.
    Balance(BalanceRecord),
    /// A host currency design.
    Currency(CurrencyRecord),
}

impl StateValue {
    /// Short variant name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Design(_) => "design",
            Self::Template(_) => "template",
            Self::Credential { .. } => "credential",
            Self::HolderDid { .. } => "holder_did",
            Self::Account(_) => "account",
            Self::ContractAccount(_) => "contract_account",
            Self::Balance(_) => "balance",
            Self::Currency(_) => "currency",
        }
    }

    /// The design, if this is one.
    pub fn as_design(&self) -> Option<&Design> {
        match self {
            Self::Design(d) => Some(d),
            _ => None,
        }
    }

    /// The template, if this is one.
    pub fn as_template(&self) -> Option<&Template> {
        match self {
            Self::Template(t) => Some(t),
            _ => None,
        }
    }

    /// The credential and its activity flag, if this is one.
    pub fn as_credential(&self) -> Option<(&Credential, bool)> {
        match self {
            Self::Credential {
                credential,
                is_active,
            } => Some((credential, *is_active)),
            _ => None,
        }
    }

    /// The account record, if this is one.
    pub fn as_account(&self) -> Option<&AccountRecord> {
        match self {
            Self::Account(a) => Some(a),
            _ => None,
        }
    }

    /// The contract account record, if this is one.
    pub fn as_contract_account(&self) -> Option<&ContractAccountRecord> {
        match self {
            Self::ContractAccount(c) => Some(c),
            _ => None,
        }
    }

    /// The balance record, if this is one.
    pub fn as_balance(&self) -> Option<&BalanceRecord> {
        match self {
            Self::Balance(b) => Some(b),
            _ => None,
        }
    }

    /// The currency record, if this is one.
    pub fn as_currency(&self) -> Option<&CurrencyRecord> {
        match self {
            Self::Currency(c) => Some(c),
            _ => None,
        }
    }
}

impl Canonical for StateValue {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        match self {
            Self::Design(d) => {
                w.put(d);
            }
            Self::Template(t) => {
                w.put(t);
            }
            Self::Credential {
                credential,
                is_active,
            } => {
                w.put(credential).put_flag(*is_active);
            }
            Self::HolderDid { did } => {
                w.put_str(did);
            }
            Self::Account(a) => {
                w.put(a);
            }
            Self::ContractAccount(c) => {
                w.put(c);
            }
            Self::Balance(b) => {
                w.put(&b.currency).put(&b.amount);
            }
            Self::Currency(c) => {
                w.put(&c.currency);
            }
        }
    }
}

// ─── Host Records ────────────────────────────────────────────────────

/// A weighted signing key of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountKey {
    /// Public key.
    pub public_key: Ed25519PublicKey,
    /// Weight contributed toward the threshold.
    pub weight: u16,
}

/// An account's key set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    /// Account address.
    pub address: Address,
    /// Signing keys.
    pub keys: Vec<AccountKey>,
    /// Summed weight a sign set must reach.
    pub threshold: u16,
}

impl AccountRecord {
    /// Weight of `public_key` in this account, if it is one of its keys.
    pub fn weight_of(&self, public_key: &Ed25519PublicKey) -> Option<u16> {
        self.keys
            .iter()
            .find(|k| &k.public_key == public_key)
            .map(|k| k.weight)
    }
}

impl Canonical for AccountRecord {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put(&self.address);
        for k in &self.keys {
            w.put_bytes(k.public_key.as_bytes())
                .put_u64(u64::from(k.weight));
        }
        w.put_u64(u64::from(self.threshold));
    }
}

/// A contract account: owner, operators and service activation flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAccountRecord {
    /// Owning account.
    pub owner: Address,
    /// Accounts allowed to issue and revoke on the owner's behalf.
    #[serde(default)]
    pub operators: Vec<Address>,
    /// Whether a credential service has been registered on the contract.
    #[serde(default)]
    pub is_active: bool,
}

impl ContractAccountRecord {
    /// Whether `address` is a listed operator.
    pub fn is_operator(&self, address: &Address) -> bool {
        self.operators.contains(address)
    }

    /// Whether `address` is the owner or an operator.
    pub fn is_owner_or_operator(&self, address: &Address) -> bool {
        &self.owner == address || self.is_operator(address)
    }

    /// A copy of this record with the active flag set.
    pub fn activated(&self) -> Self {
        Self {
            is_active: true,
            ..self.clone()
        }
    }
}

impl Canonical for ContractAccountRecord {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put(&self.owner).put_all(&self.operators).put_flag(self.is_active);
    }
}

/// An account's balance in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    /// Currency.
    pub currency: CurrencyId,
    /// Amount held.
    pub amount: Amount,
}

/// A currency and its fee policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRecord {
    /// Currency id.
    pub currency: CurrencyId,
    /// Fee charged per operation item.
    pub fee: FeePolicy,
}

/// How a currency charges fees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeePolicy {
    /// No fee.
    Nil,
    /// A flat amount.
    Fixed {
        /// Fee receiver; fees are burned when absent.
        #[serde(default)]
        receiver: Option<Address>,
        /// Flat fee.
        amount: Amount,
    },
    /// A ratio of the base amount, clamped to `[min, max]`.
    Ratio {
        /// Fee receiver; fees are burned when absent.
        #[serde(default)]
        receiver: Option<Address>,
        /// Parts per million of the base amount.
        ratio_ppm: u32,
        /// Lower clamp.
        min: Amount,
        /// Upper clamp.
        max: Amount,
    },
}

impl FeePolicy {
    /// Configured fee receiver.
    pub fn receiver(&self) -> Option<&Address> {
        match self {
            Self::Nil => None,
            Self::Fixed { receiver, .. } | Self::Ratio { receiver, .. } => receiver.as_ref(),
        }
    }

    /// Evaluate the fee for a base amount.
    ///
    /// A zero base under a ratio policy charges the minimum.
    pub fn fee(&self, base: Amount) -> Result<Amount, CredregError> {
        match self {
            Self::Nil => Ok(Amount::ZERO),
            Self::Fixed { amount, .. } => Ok(*amount),
            Self::Ratio {
                ratio_ppm,
                min,
                max,
                ..
            } => {
                if *ratio_ppm == 0 {
                    return Ok(Amount::ZERO);
                }
                if base.is_zero() {
                    return Ok(*min);
                }
                let scaled = base
                    .value()
                    .checked_mul(u128::from(*ratio_ppm))
                    .ok_or_else(|| CredregError::Overflow(format!("{base} * {ratio_ppm}ppm")))?
                    / 1_000_000;
                let scaled = Amount::new(scaled);
                if scaled < *min {
                    Ok(*min)
                } else if scaled > *max {
                    Ok(*max)
                } else {
                    Ok(scaled)
                }
            }
        }
    }
}
