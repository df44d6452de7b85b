//! # State Keys
//!
//! Deterministic key construction for every state the registry reads or
//! writes. The credential keys are a stable, persisted format:
//!
//! ```text
//! credential:<contract>:design
//! credential:<contract>:<templateID>:template
//! credential:<contract>:<templateID>:<credentialID>:credential
//! credential:<contract>:<holder>:holder-did
//! ```
//!
//! Components never contain `:` (addresses are alphanumeric, identifiers
//! reject it), so a key splits back into its components unambiguously.
//!
//! The host ledger keys at the bottom of this module address the account,
//! contract-account, balance and currency states the processors consult.

use credreg_core::identity::{MAX_CREDENTIAL_ID_LEN, MAX_TEMPLATE_ID_LEN};
use credreg_core::{check_identifier, Address, CredregError, CurrencyId};
use thiserror::Error;

/// Namespace prefix of every credential-registry key.
pub const CREDENTIAL_PREFIX: &str = "credential";
/// Suffix of a design key.
pub const DESIGN_SUFFIX: &str = "design";
/// Suffix of a template key.
pub const TEMPLATE_SUFFIX: &str = "template";
/// Suffix of a credential key.
pub const CREDENTIAL_SUFFIX: &str = "credential";
/// Suffix of a holder DID key.
pub const HOLDER_DID_SUFFIX: &str = "holder-did";

// ─── Builders ────────────────────────────────────────────────────────

/// `credential:<contract>:design`
pub fn design_key(contract: &Address) -> String {
    format!("{CREDENTIAL_PREFIX}:{contract}:{DESIGN_SUFFIX}")
}

/// `credential:<contract>:<templateID>:template`
pub fn template_key(contract: &Address, template_id: &str) -> String {
    format!("{CREDENTIAL_PREFIX}:{contract}:{template_id}:{TEMPLATE_SUFFIX}")
}

/// `credential:<contract>:<templateID>:<credentialID>:credential`
pub fn credential_key(contract: &Address, template_id: &str, credential_id: &str) -> String {
    format!("{CREDENTIAL_PREFIX}:{contract}:{template_id}:{credential_id}:{CREDENTIAL_SUFFIX}")
}

/// `credential:<contract>:<holder>:holder-did`
pub fn holder_did_key(contract: &Address, holder: &Address) -> String {
    format!("{CREDENTIAL_PREFIX}:{contract}:{holder}:{HOLDER_DID_SUFFIX}")
}

// ─── Predicates ──────────────────────────────────────────────────────

fn has_shape(key: &str, suffix: &str) -> bool {
    key.strip_prefix(CREDENTIAL_PREFIX)
        .and_then(|rest| rest.strip_prefix(':'))
        .and_then(|rest| rest.strip_suffix(suffix))
        .is_some_and(|rest| rest.ends_with(':'))
}

/// Whether `key` names a design.
pub fn is_design_key(key: &str) -> bool {
    has_shape(key, DESIGN_SUFFIX)
}

/// Whether `key` names a template.
pub fn is_template_key(key: &str) -> bool {
    has_shape(key, TEMPLATE_SUFFIX)
}

/// Whether `key` names a credential.
pub fn is_credential_key(key: &str) -> bool {
    has_shape(key, CREDENTIAL_SUFFIX)
}

/// Whether `key` names a holder DID.
pub fn is_holder_did_key(key: &str) -> bool {
    has_shape(key, HOLDER_DID_SUFFIX)
}

// ─── Parsing ─────────────────────────────────────────────────────────

/// A parsed credential-registry key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateKey {
    /// A design key.
    Design {
        /// Contract account.
        contract: Address,
    },
    /// A template key.
    Template {
        /// Contract account.
        contract: Address,
        /// Template id.
        template_id: String,
    },
    /// A credential key.
    Credential {
        /// Contract account.
        contract: Address,
        /// Template id.
        template_id: String,
        /// Credential id.
        credential_id: String,
    },
    /// A holder DID key.
    HolderDid {
        /// Contract account.
        contract: Address,
        /// Holder account.
        holder: Address,
    },
}

impl StateKey {
    /// Render the key string.
    pub fn to_key(&self) -> String {
        match self {
            Self::Design { contract } => design_key(contract),
            Self::Template {
                contract,
                template_id,
            } => template_key(contract, template_id),
            Self::Credential {
                contract,
                template_id,
                credential_id,
            } => credential_key(contract, template_id, credential_id),
            Self::HolderDid { contract, holder } => holder_did_key(contract, holder),
        }
    }
}

/// Key parsing failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The key is not in the credential namespace or has an unknown shape.
    #[error("not a credential state key: {0:?}")]
    UnknownShape(String),

    /// A component failed validation.
    #[error("invalid component in state key {key:?}: {source}")]
    InvalidComponent {
        /// The key being parsed.
        key: String,
        /// Component error.
        source: CredregError,
    },
}

/// Split a `credential:` key back into its components.
pub fn parse_state_key(key: &str) -> Result<StateKey, KeyError> {
    let parts: Vec<&str> = key.split(':').collect();
    if parts.first() != Some(&CREDENTIAL_PREFIX) {
        return Err(KeyError::UnknownShape(key.to_string()));
    }
    let invalid = |source: CredregError| KeyError::InvalidComponent {
        key: key.to_string(),
        source,
    };
    let contract = parts
        .get(1)
        .ok_or_else(|| KeyError::UnknownShape(key.to_string()))
        .and_then(|c| Address::new(*c).map_err(invalid))?;

    match parts.as_slice() {
        [_, _, DESIGN_SUFFIX] => Ok(StateKey::Design { contract }),
        [_, _, template_id, TEMPLATE_SUFFIX] => {
            check_identifier("template_id", template_id, MAX_TEMPLATE_ID_LEN).map_err(invalid)?;
            Ok(StateKey::Template {
                contract,
                template_id: template_id.to_string(),
            })
        }
        [_, _, holder, HOLDER_DID_SUFFIX] => Ok(StateKey::HolderDid {
            contract,
            holder: Address::new(*holder).map_err(invalid)?,
        }),
        [_, _, template_id, credential_id, CREDENTIAL_SUFFIX] => {
            check_identifier("template_id", template_id, MAX_TEMPLATE_ID_LEN).map_err(invalid)?;
            check_identifier("credential_id", credential_id, MAX_CREDENTIAL_ID_LEN)
                .map_err(invalid)?;
            Ok(StateKey::Credential {
                contract,
                template_id: template_id.to_string(),
                credential_id: credential_id.to_string(),
            })
        }
        _ => Err(KeyError::UnknownShape(key.to_string())),
    }
}

// ─── Host Ledger Keys ────────────────────────────────────────────────

/// Key of an account's key set.
pub fn account_key(address: &Address) -> String {
    format!("{address}:account")
}

/// Key of a contract account's owner, operators and active flag.
pub fn contract_account_key(address: &Address) -> String {
    format!("{address}:contractaccount")
}

/// Key of an account's balance in one currency.
pub fn balance_key(address: &Address, currency: &CurrencyId) -> String {
    format!("{address}-{currency}:balance")
}

/// Key of a currency's design (fee policy).
pub fn currency_key(currency: &CurrencyId) -> String {
    format!("currencydesign:{currency}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract() -> Address {
        Address::new("contractmca").unwrap()
    }

    #[test]
    fn test_key_formats() {
        let c = contract();
        let h = Address::new("holdermca").unwrap();
        assert_eq!(design_key(&c), "credential:contractmca:design");
        assert_eq!(template_key(&c, "t1"), "credential:contractmca:t1:template");
        assert_eq!(
            credential_key(&c, "t1", "c1"),
            "credential:contractmca:t1:c1:credential"
        );
        assert_eq!(
            holder_did_key(&c, &h),
            "credential:contractmca:holdermca:holder-did"
        );
    }

    #[test]
    fn test_predicates() {
        let c = contract();
        assert!(is_design_key(&design_key(&c)));
        assert!(is_template_key(&template_key(&c, "t")));
        assert!(is_credential_key(&credential_key(&c, "t", "x")));
        assert!(!is_design_key(&template_key(&c, "t")));
        assert!(!is_credential_key("credential"));
        assert!(!is_design_key("other:contractmca:design"));
    }

    #[test]
    fn test_parse_roundtrip_every_shape() {
        let c = contract();
        let keys = [
            StateKey::Design { contract: c.clone() },
            StateKey::Template {
                contract: c.clone(),
                template_id: "t1".to_string(),
            },
            StateKey::Credential {
                contract: c.clone(),
                template_id: "t1".to_string(),
                credential_id: "c1".to_string(),
            },
            StateKey::HolderDid {
                contract: c,
                holder: Address::new("holdermca").unwrap(),
            },
        ];
        for k in keys {
            assert_eq!(parse_state_key(&k.to_key()).unwrap(), k);
        }
    }

    #[test]
    fn test_parse_rejects_foreign_and_malformed() {
        assert!(parse_state_key("contractmca:account").is_err());
        assert!(parse_state_key("credential:contractmca").is_err());
        assert!(parse_state_key("credential:contractmca:t1:c1:c2:credential").is_err());
        assert!(matches!(
            parse_state_key("credential:bad:design"),
            Err(KeyError::InvalidComponent { .. })
        ));
    }

    #[test]
    fn test_host_keys() {
        let a = contract();
        let cid = CurrencyId::new("MCC").unwrap();
        assert_eq!(account_key(&a), "contractmca:account");
        assert_eq!(contract_account_key(&a), "contractmca:contractaccount");
        assert_eq!(balance_key(&a, &cid), "contractmca-MCC:balance");
        assert_eq!(currency_key(&cid), "currencydesign:MCC");
    }
}
