//! # Issue (batched)
//!
//! Issues one credential per item. Each item targets a
//! `(contract, template id, credential id)` key that must be absent or
//! revoked; an active credential is never overwritten.
//!
//! ## Processing
//!
//! Items run strictly in list order. Each item emits its credential and
//! holder-DID directives and records the issuance on the working copy of
//! its design's policy. After the last item every touched design is
//! emitted once, then the fee directives for all items.
//!
//! Item bytes: `contract ++ holder ++ template_id ++ credential_id ++ value
//! ++ valid_from ++ valid_until ++ did ++ currency`.
//! Fact bytes: `token ++ sender ++ items`.

use std::collections::HashSet;

use credreg_core::{Address, Canonical, CanonicalWriter, CurrencyId};
use credreg_state::keys::{credential_key, holder_did_key};
use credreg_state::{Credential, CredentialStatus, StateValue};
use serde::{Deserialize, Serialize};

use crate::batch::BatchScratch;
use crate::error::{FactError, Fatal, ProcessError, Rejection};
use crate::fact::FactToken;
use crate::fee::{self, FeeItem};
use crate::merge::StateMergeValue;
use crate::reader::{read_typed, require_currency, require_operable_contract, require_plain_account, StateReader};

// ─── Item ────────────────────────────────────────────────────────────

/// One credential to issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueItem {
    /// Contract the design is registered on.
    pub contract: Address,
    /// Receiving account.
    pub holder: Address,
    /// Registered template id.
    pub template_id: String,
    /// Credential id.
    pub credential_id: String,
    /// Opaque payload.
    pub value: String,
    /// Start of validity.
    pub valid_from: u64,
    /// End of validity.
    pub valid_until: u64,
    /// Holder DID.
    pub did: String,
    /// Currency the fee is paid in.
    pub currency: CurrencyId,
}

impl IssueItem {
    /// The active credential this item creates.
    pub fn credential(&self) -> Credential {
        Credential {
            holder: Some(self.holder.clone()),
            template_id: self.template_id.clone(),
            credential_id: self.credential_id.clone(),
            value: self.value.clone(),
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            did: self.did.clone(),
        }
    }

    /// State key of the targeted credential.
    pub fn credential_key(&self) -> String {
        credential_key(&self.contract, &self.template_id, &self.credential_id)
    }

    /// Item-level validation.
    pub fn validate(&self) -> Result<(), FactError> {
        self.credential().validate()?;
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

impl Canonical for IssueItem {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put(&self.contract)
            .put(&self.holder)
            .put_str(&self.template_id)
            .put_str(&self.credential_id)
            .put_str(&self.value)
            .put_u64(self.valid_from)
            .put_u64(self.valid_until)
            .put_str(&self.did)
            .put(&self.currency);
    }
}

impl FeeItem for IssueItem {
    fn currency(&self) -> &CurrencyId {
        &self.currency
    }
}

// ─── Fact ────────────────────────────────────────────────────────────

/// Issue a batch of credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFact {
    /// Fact token.
    pub token: FactToken,
    /// Owner or operator of every targeted contract.
    pub sender: Address,
    /// Items, processed in order.
    pub items: Vec<IssueItem>,
}

impl IssueFact {
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

impl Canonical for IssueFact {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put(&self.token).put(&self.sender).put_all(&self.items);
    }
}

// ─── Processing ──────────────────────────────────────────────────────

/// Checks and effects of one item, borrowed from the fact.
struct IssueItemProcessor<'a> {
    sender: &'a Address,
    item: &'a IssueItem,
}

impl IssueItemProcessor<'_> {
    /// State checks; leaves the item's design loaded in `scratch`.
    fn check(
        &self,
        reader: &dyn StateReader,
        scratch: &mut BatchScratch,
    ) -> Result<(), ProcessError> {
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
            StateValue::Credential { is_active, .. } => Ok(is_active),
            other => Err(other),
        })?;
        CredentialStatus::from_stored(stored)
            .issue()
            .map_err(|source| Rejection::Lifecycle {
                credential_id: item.credential_id.clone(),
                source,
            })?;

        require_currency(reader, &item.currency)?;
        tracing::debug!(credential = %key, holder = %item.holder, "issue item accepted");
        Ok(())
    }

    fn process(
        &self,
        reader: &dyn StateReader,
        scratch: &mut BatchScratch,
    ) -> Result<(), ProcessError> {
        self.check(reader, scratch)?;
        let item = self.item;

        scratch
            .designs
            .load(reader, &item.contract)?
            .record_issue(&item.holder)
            .map_err(|source| Fatal::Design {
                contract: item.contract.clone(),
                source,
            })?;

        scratch.directives.push(StateMergeValue::set(
            item.credential_key(),
            StateValue::Credential {
                credential: item.credential(),
                is_active: true,
            },
        ));
        scratch.directives.push(StateMergeValue::set(
            holder_did_key(&item.contract, &item.holder),
            StateValue::HolderDid {
                did: item.did.clone(),
            },
        ));
        Ok(())
    }
}

fn item_processors(fact: &IssueFact) -> impl Iterator<Item = IssueItemProcessor<'_>> {
    fact.items.iter().map(|item| IssueItemProcessor {
        sender: &fact.sender,
        item,
    })
}

/// Validate every item against current state.
pub fn pre_process(
    fact: &IssueFact,
    reader: &dyn StateReader,
    scratch: &mut BatchScratch,
) -> Result<(), ProcessError> {
    for p in item_processors(fact) {
        p.check(reader, scratch)?;
    }
    Ok(())
}

/// Build credential, holder-DID, design and fee directives for the batch.
pub fn process(
    fact: &IssueFact,
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
    use credreg_state::EntityError;

    fn addr(s: &str) -> Address {
        Address::new(format!("{s}mca")).unwrap()
    }

    fn item(id: &str) -> IssueItem {
        IssueItem {
            contract: addr("contract"),
            holder: addr("holder"),
            template_id: "tpl".to_string(),
            credential_id: id.to_string(),
            value: "v".to_string(),
            valid_from: 10,
            valid_until: 20,
            did: "did:ex:1".to_string(),
            currency: CurrencyId::new("MCC").unwrap(),
        }
    }

    fn fact(items: Vec<IssueItem>) -> IssueFact {
        IssueFact {
            token: FactToken::from_bytes(b"t".to_vec()),
            sender: addr("owner"),
            items,
        }
    }

    #[test]
    fn test_valid_batch() {
        fact(vec![item("a"), item("b")]).validate(10).unwrap();
    }

    #[test]
    fn test_empty_and_oversized_batches() {
        assert_eq!(fact(vec![]).validate(10), Err(FactError::EmptyItems));
        assert_eq!(
            fact(vec![item("a"), item("b")]).validate(1),
            Err(FactError::TooManyItems { count: 2, max: 1 })
        );
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = fact(vec![item("a"), item("a")]).validate(10).unwrap_err();
        assert!(matches!(err, FactError::DuplicateItem(_)));
    }

    #[test]
    fn test_same_id_under_other_template_is_distinct() {
        let mut other = item("a");
        other.template_id = "tpl2".to_string();
        fact(vec![item("a"), other]).validate(10).unwrap();
    }

    #[test]
    fn test_item_contract_equal_to_sender_rejected() {
        let mut i = item("a");
        i.contract = addr("owner");
        assert!(matches!(
            fact(vec![i]).validate(10),
            Err(FactError::SameAddress { what: "contract", .. })
        ));
    }

    #[test]
    fn test_holder_equal_to_contract_rejected() {
        let mut i = item("a");
        i.holder = i.contract.clone();
        assert!(matches!(
            i.validate(),
            Err(FactError::SameAddress { what: "holder", .. })
        ));
    }

    #[test]
    fn test_window_must_be_increasing() {
        let mut i = item("a");
        i.valid_until = i.valid_from;
        assert!(matches!(
            i.validate(),
            Err(FactError::Entity(EntityError::InvalidWindow { .. }))
        ));
    }

    #[test]
    fn test_item_order_changes_hash() {
        let a = crate::fact::OperationFact::from(fact(vec![item("a"), item("b")]));
        let b = crate::fact::OperationFact::from(fact(vec![item("b"), item("a")]));
        assert_ne!(a.hash(), b.hash());
    }
}
