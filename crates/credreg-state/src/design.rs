//! # Design, Policy and Holder
//!
//! A `Design` is the per-contract registration of the credential service.
//! It bundles one `Policy`: the registered template ids, the holder index
//! and the aggregate active-credential counter.
//!
//! ## Invariants
//!
//! - The template list is append-only and free of duplicates.
//! - Every listed holder has a positive count and appears once.
//! - `credential_count` equals the sum of the holders' counts.
//!
//! A stored design is never field-mutated. Processors take an owned copy of
//! the policy, apply `record_issue` / `record_revoke` in item order, then
//! wrap the result in a fresh `Design` and validate it.

use std::collections::HashSet;

use credreg_core::identity::MAX_TEMPLATE_ID_LEN;
use credreg_core::{check_identifier, Address, Canonical, CanonicalWriter};
use serde::{Deserialize, Serialize};

use crate::error::EntityError;

// ─── Holder ──────────────────────────────────────────────────────────

/// An address and its count of active credentials under one design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holder {
    /// Holder account.
    pub address: Address,
    /// Number of currently active credentials held.
    pub credential_count: u64,
}

impl Holder {
    /// Create a holder entry.
    pub fn new(address: Address, credential_count: u64) -> Self {
        Self {
            address,
            credential_count,
        }
    }
}

impl Canonical for Holder {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put(&self.address).put_u64(self.credential_count);
    }
}

// ─── Policy ──────────────────────────────────────────────────────────

/// Template list, holder index and active-credential counter of a design.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    template_ids: Vec<String>,
    holders: Vec<Holder>,
    credential_count: u64,
}

impl Policy {
    /// A policy with no templates, no holders and a zero count.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble a policy from its parts. Call [`Policy::validate`] before
    /// storing it.
    pub fn from_parts(template_ids: Vec<String>, holders: Vec<Holder>, credential_count: u64) -> Self {
        Self {
            template_ids,
            holders,
            credential_count,
        }
    }

    /// Registered template ids in registration order.
    pub fn template_ids(&self) -> &[String] {
        &self.template_ids
    }

    /// Holders in first-issuance order.
    pub fn holders(&self) -> &[Holder] {
        &self.holders
    }

    /// Aggregate active-credential count.
    pub fn credential_count(&self) -> u64 {
        self.credential_count
    }

    /// Whether `template_id` is registered. An empty list registers nothing.
    pub fn contains_template(&self, template_id: &str) -> bool {
        self.template_ids.iter().any(|t| t == template_id)
    }

    /// Active-credential count for `address`, or `None` if not listed.
    pub fn holder_count(&self, address: &Address) -> Option<u64> {
        self.holders
            .iter()
            .find(|h| &h.address == address)
            .map(|h| h.credential_count)
    }

    /// Append a template id.
    pub fn add_template(&mut self, template_id: String) -> Result<(), EntityError> {
        if self.contains_template(&template_id) {
            return Err(EntityError::DuplicateTemplate(template_id));
        }
        self.template_ids.push(template_id);
        Ok(())
    }

    /// Account for one newly active credential held by `holder`.
    pub fn record_issue(&mut self, holder: &Address) -> Result<(), EntityError> {
        self.credential_count = self
            .credential_count
            .checked_add(1)
            .ok_or(EntityError::CounterOverflow)?;
        match self.holders.iter_mut().find(|h| &h.address == holder) {
            Some(h) => {
                h.credential_count = h
                    .credential_count
                    .checked_add(1)
                    .ok_or(EntityError::CounterOverflow)?;
            }
            None => self.holders.push(Holder::new(holder.clone(), 1)),
        }
        Ok(())
    }

    /// Account for one credential held by `holder` becoming inactive.
    ///
    /// A holder whose count reaches zero is removed; the remaining holders
    /// keep their order.
    pub fn record_revoke(&mut self, holder: &Address) -> Result<(), EntityError> {
        if self.credential_count < 1 {
            return Err(EntityError::CounterUnderflow);
        }
        let idx = self
            .holders
            .iter()
            .position(|h| &h.address == holder)
            .ok_or_else(|| EntityError::HolderNotFound(holder.clone()))?;
        let entry = &mut self.holders[idx];
        entry.credential_count = entry
            .credential_count
            .checked_sub(1)
            .ok_or(EntityError::CounterUnderflow)?;
        if entry.credential_count == 0 {
            self.holders.remove(idx);
        }
        self.credential_count -= 1;
        Ok(())
    }

    /// Check the policy invariants.
    pub fn validate(&self) -> Result<(), EntityError> {
        let mut seen = HashSet::with_capacity(self.template_ids.len());
        for t in &self.template_ids {
            check_identifier("template_id", t, MAX_TEMPLATE_ID_LEN)?;
            if !seen.insert(t.as_str()) {
                return Err(EntityError::DuplicateTemplate(t.clone()));
            }
        }

        let mut holders = HashSet::with_capacity(self.holders.len());
        let mut holder_total: u64 = 0;
        for h in &self.holders {
            if !holders.insert(&h.address) {
                return Err(EntityError::DuplicateHolder(h.address.clone()));
            }
            if h.credential_count == 0 {
                return Err(EntityError::EmptyHolder(h.address.clone()));
            }
            holder_total = holder_total
                .checked_add(h.credential_count)
                .ok_or(EntityError::CounterOverflow)?;
        }
        if holder_total != self.credential_count {
            return Err(EntityError::CountMismatch {
                recorded: self.credential_count,
                holder_total,
            });
        }
        Ok(())
    }
}

impl Canonical for Policy {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put_all(&self.template_ids)
            .put_all(&self.holders)
            .put_u64(self.credential_count);
    }
}

// ─── Design ──────────────────────────────────────────────────────────

/// The credential service registered on a contract account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Design {
    policy: Policy,
}

impl Design {
    /// Wrap a policy.
    pub fn new(policy: Policy) -> Self {
        Self { policy }
    }

    /// The design's policy.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Check the policy invariants.
    pub fn validate(&self) -> Result<(), EntityError> {
        self.policy.validate()
    }
}

impl Canonical for Design {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put(&self.policy);
    }
}
