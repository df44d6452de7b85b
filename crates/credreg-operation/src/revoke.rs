//! # Revoke (batched)
//!
//! Revokes one active credential per item. The credential row stays in
//! state with its holder cleared and `is_active = false`; value, DID,
//! window and ids are kept for audit history and the id can be issued
//! again.
//!
//! The item's holder must be the holder on record. Decrementing a holder
//! that is missing from the design's index is fatal: it means committed
//! state already disagrees with the credential being revoked.
//!
//! Item bytes: `contract ++ holder ++ template_id ++ credential_id ++ currency`.
//! Fact bytes: `token ++ sender ++ items`.

use std::collections::HashSet;

use credreg_core::identity::{MAX_CREDENTIAL_ID_LEN, MAX_TEMPLATE_ID_LEN};
use credreg_core::{check_identifier, Address, Canonical, CanonicalWriter, CurrencyId};
use credreg_state::keys::credential_key;
use credreg_state::{Credential, CredentialStatus, LifecycleError, StateValue};
use serde::{Deserialize, Serialize};

use crate::batch::BatchScratch;
use crate::error::{FactError, Fatal, ProcessError, Rejection};
use crate::fact::FactToken;
use crate::fee::{self, FeeItem};
use crate::merge::StateMergeValue;
use crate::reader::{read_typed, require_currency, require_operable_contract, require_plain_account, StateReader};

// ─── Item ────────────────────────────────────────────────────────────

/// One credential to revoke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeItem {
    /// Contract the design is registered on.
    pub contract: Address,
    /// Current holder of the credential.
    pub holder: Address,
    /// Template id.
    pub template_id: String,
    /// Credential id.
    pub credential_id: String,
    /// Currency the fee is paid in.
    pub currency: CurrencyId,
}

impl RevokeItem {
    /// State key of the targeted credential.
    pub fn credential_key(&self) -> String {
        credential_key(&self.contract, &self.template_id, &self.credential_id)
    }

    /// Item-level validation.
    pub fn validate(&self) -> Result<(), FactError> {
        check_identifier("template_id", &self.template_id, MAX_TEMPLATE_ID_LEN)?;
        check_identifier("credential_id", &self.credential_id, MAX_CREDENTIAL_ID_LEN)?;
        if self.holder == self.contract {
            return Err(FactError::SameAddress {
                what: "holder",
                other: "contract",
                address: self.holder.clone(),
            });
        }
        Ok(())
    }
}

impl Canonical for RevokeItem {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put(&self.contract)
            .put(&self.holder)
            .put_str(&self.template_id)
            .put_str(&self.credential_id)
            .put(&self.currency);
    }
}

impl FeeItem for RevokeItem {
    fn currency(&self) -> &CurrencyId {
        &self.currency
    }
}

// ─── Fact ────────────────────────────────────────────────────────────

/// Revoke a batch of credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeFact {
    /// Fact token.
    pub token: FactToken,
    /// Owner or operator of every targeted contract.
    pub sender: Address,
    /// Items, processed in order.
    pub items: Vec<RevokeItem>,
}

impl RevokeFact {
    /// Fact-level validation against the configured item cap.
    pub fn validate(&self, max_items: usize) -> Result<(), FactError> {
        self.token.validate()?;
        if self.items.is_empty() {
            return Err(FactError::EmptyItems);
        }
        if self.items.len() > max_items {
            return Err(FactError::TooManyItems {
                count: self.items.len(),
                max: max_items,
            });
        }
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            item.validate()?;
            if item.contract == self.sender {
                return Err(FactError::SameAddress {
                    what: "contract",
                    other: "sender",
                    address: item.contract.clone(),
                });
            }
            let key = item.credential_key();
            if !seen.insert(key.clone()) {
                return Err(FactError::DuplicateItem(key));
            }
        }
        Ok(())
    }
}

impl Canonical for RevokeFact {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put(&self.token).put(&self.sender).put_all(&self.items);
    }
}

// ─── Processing ──────────────────────────────────────────────────────

struct RevokeItemProcessor<'a> {
    sender: &'a Address,
    item: &'a RevokeItem,
}

impl RevokeItemProcessor<'_> {
    /// State checks; returns the active credential being revoked.
    fn check(
        &self,
        reader: &dyn StateReader,
        scratch: &mut BatchScratch,
    ) -> Result<Credential, ProcessError> {
        let item = self.item;
        require_operable_contract(reader, self.sender, &item.contract)?;
        let policy = scratch.designs.load(reader, &item.contract)?;
        if !policy.contains_template(&item.template_id) {
            return Err(Rejection::TemplateNotRegistered {
                contract: item.contract.clone(),
                template_id: item.template_id.clone(),
            }
            .into());
        }
        require_plain_account(reader, "holder", &item.holder)?;

        let key = item.credential_key();
        let stored = read_typed(reader, &key, "credential", |v| match v {
            StateValue::Credential {
                credential,
                is_active,
            } => Ok((credential, is_active)),
            other => Err(other),
        })?;
        let lifecycle_error = |source| Rejection::Lifecycle {
            credential_id: item.credential_id.clone(),
            source,
        };
        let credential = match stored {
            Some((credential, is_active)) => {
                CredentialStatus::from_stored(Some(is_active))
                    .revoke()
                    .map_err(lifecycle_error)?;
                credential
            }
            None => {
                return Err(lifecycle_error(LifecycleError::InvalidTransition {
                    from: CredentialStatus::Nonexistent,
                    to: CredentialStatus::Revoked,
                })
                .into())
            }
        };

        match &credential.holder {
            Some(actual) if actual == &item.holder => {}
            Some(actual) => {
                return Err(Rejection::HolderMismatch {
                    credential_id: item.credential_id.clone(),
                    claimed: item.holder.clone(),
                    actual: actual.clone(),
                }
                .into())
            }
            None => {
                return Err(Fatal::UnexpectedValue {
                    key,
                    expected: "active credential with a holder",
                    found: "credential without holder",
                }
                .into())
            }
        }

        require_currency(reader, &item.currency)?;
        tracing::debug!(credential = %key, holder = %item.holder, "revoke item accepted");
        Ok(credential)
    }

    fn process(
        &self,
        reader: &dyn StateReader,
        scratch: &mut BatchScratch,
    ) -> Result<(), ProcessError> {
        let credential = self.check(reader, scratch)?;
        let item = self.item;

        scratch
            .designs
            .load(reader, &item.contract)?
            .record_revoke(&item.holder)
            .map_err(|source| Fatal::Design {
                contract: item.contract.clone(),
                source,
            })?;

        scratch.directives.push(StateMergeValue::set(
            item.credential_key(),
            StateValue::Credential {
                credential: credential.revoked(),
                is_active: false,
            },
        ));
        Ok(())
    }
}

fn item_processors(fact: &RevokeFact) -> impl Iterator<Item = RevokeItemProcessor<'_>> {
    fact.items.iter().map(|item| RevokeItemProcessor {
        sender: &fact.sender,
        item,
    })
}

/// Validate every item against current state.
pub fn pre_process(
    fact: &RevokeFact,
    reader: &dyn StateReader,
    scratch: &mut BatchScratch,
) -> Result<(), ProcessError> {
    for p in item_processors(fact) {
        p.check(reader, scratch)?;
    }
    Ok(())
}

/// Build credential, design and fee directives for the batch.
pub fn process(
    fact: &RevokeFact,
    reader: &dyn StateReader,
    scratch: &mut BatchScratch,
) -> Result<(), ProcessError> {
    for p in item_processors(fact) {
        p.process(reader, scratch)?;
    }
    let BatchScratch {
        designs,
        directives,
    } = scratch;
    designs.emit(directives)?;
    let fees = fee::charge(reader, &fact.sender, &fact.items)?;
    directives.extend(fees);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use credreg_core::CanonicalBytes;

    fn addr(s: &str) -> Address {
        Address::new(format!("{s}mca")).unwrap()
    }

    fn item(id: &str) -> RevokeItem {
        RevokeItem {
            contract: addr("contract"),
            holder: addr("holder"),
            template_id: "tpl".to_string(),
            credential_id: id.to_string(),
            currency: CurrencyId::new("MCC").unwrap(),
        }
    }

    fn fact(items: Vec<RevokeItem>) -> RevokeFact {
        RevokeFact {
            token: FactToken::from_bytes(b"t".to_vec()),
            sender: addr("owner"),
            items,
        }
    }

    #[test]
    fn test_valid_batch() {
        fact(vec![item("a"), item("b")]).validate(5).unwrap();
    }

    #[test]
    fn test_batch_bounds() {
        assert_eq!(fact(vec![]).validate(5), Err(FactError::EmptyItems));
        assert!(matches!(
            fact(vec![item("a"), item("b"), item("c")]).validate(2),
            Err(FactError::TooManyItems { count: 3, max: 2 })
        ));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        assert!(matches!(
            fact(vec![item("a"), item("a")]).validate(5),
            Err(FactError::DuplicateItem(_))
        ));
    }

    #[test]
    fn test_identifier_chars_checked() {
        let mut i = item("a");
        i.credential_id = "a:b".to_string();
        assert!(i.validate().is_err());
        i.credential_id = String::new();
        assert!(i.validate().is_err());
    }

    #[test]
    fn test_item_canonical_field_order() {
        let bytes = CanonicalBytes::new(&item("a"));
        assert_eq!(bytes.as_bytes(), b"contractmcaholdermcatplaMCC");
    }
}
