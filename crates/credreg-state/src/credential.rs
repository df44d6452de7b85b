//! # Credential Entity
//!
//! One issued (or previously issued, now revoked) claim, keyed by
//! `(contract, template id, credential id)`.
//!
//! The activity flag is not part of the entity: it is stored beside it in
//! [`StateValue::Credential`](crate::value::StateValue), and an inactive row
//! carries no holder.

use credreg_core::identity::{
    MAX_CREDENTIAL_ID_LEN, MAX_DID_LEN, MAX_TEMPLATE_ID_LEN, MAX_VALUE_LEN,
};
use credreg_core::{check_identifier, check_length, Address, Canonical, CanonicalWriter};
use serde::{Deserialize, Serialize};

use crate::error::EntityError;

/// An issued credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Current holder; `None` once revoked.
    pub holder: Option<Address>,
    /// Template the credential was issued under.
    pub template_id: String,
    /// Credential id, unique within the template.
    pub credential_id: String,
    /// Opaque value payload.
    pub value: String,
    /// Start of the validity window.
    pub valid_from: u64,
    /// End of the validity window (exclusive of `valid_from`).
    pub valid_until: u64,
    /// DID of the holder at issuance.
    pub did: String,
}

impl Credential {
    /// Check field bounds and the validity window.
    pub fn validate(&self) -> Result<(), EntityError> {
        check_identifier("template_id", &self.template_id, MAX_TEMPLATE_ID_LEN)?;
        check_identifier("credential_id", &self.credential_id, MAX_CREDENTIAL_ID_LEN)?;
        check_length("value", &self.value, 1, MAX_VALUE_LEN)?;
        check_length("did", &self.did, 1, MAX_DID_LEN)?;
        if self.valid_until <= self.valid_from {
            return Err(EntityError::InvalidWindow {
                valid_from: self.valid_from,
                valid_until: self.valid_until,
            });
        }
        Ok(())
    }

    /// The same credential with its holder cleared, as kept after revocation.
    pub fn revoked(&self) -> Self {
        Self {
            holder: None,
            ..self.clone()
        }
    }
}

impl Canonical for Credential {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put_opt(self.holder.as_ref())
            .put_str(&self.template_id)
            .put_str(&self.credential_id)
            .put_str(&self.value)
            .put_u64(self.valid_from)
            .put_u64(self.valid_until)
            .put_str(&self.did);
    }
}
