//! # Template Entity
//!
//! An immutable credential schema definition. Templates are created by
//! AddTemplate and never updated or deleted.

use credreg_core::identity::{
    MAX_DESCRIPTION_LEN, MAX_DISPLAY_NAME_LEN, MAX_SUBJECT_KEY_LEN, MAX_TEMPLATE_ID_LEN,
    MAX_TEMPLATE_NAME_LEN,
};
use credreg_core::{check_identifier, check_length, Address, Canonical, CanonicalWriter, Date};
use serde::{Deserialize, Serialize};

use crate::error::EntityError;

/// A registered credential template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Template id, unique within a design.
    pub template_id: String,
    /// Short template name.
    pub template_name: String,
    /// First day the template is in service.
    pub service_date: Date,
    /// Last day the template is in service.
    pub expiration_date: Date,
    /// Whether issued credentials may be shared.
    pub shareable: bool,
    /// Whether issued credentials may be audited by several parties.
    pub multi_audit: bool,
    /// Human-facing display name.
    pub display_name: String,
    /// Reference to the subject-key schema.
    pub subject_key: String,
    /// Free-text description.
    pub description: String,
    /// Account that authored the template.
    pub creator: Address,
}

impl Template {
    /// Check field bounds and the service window.
    pub fn validate(&self) -> Result<(), EntityError> {
        check_identifier("template_id", &self.template_id, MAX_TEMPLATE_ID_LEN)?;
        check_length("template_name", &self.template_name, 1, MAX_TEMPLATE_NAME_LEN)?;
        check_length("display_name", &self.display_name, 1, MAX_DISPLAY_NAME_LEN)?;
        check_length("subject_key", &self.subject_key, 1, MAX_SUBJECT_KEY_LEN)?;
        check_length("description", &self.description, 1, MAX_DESCRIPTION_LEN)?;
        if self.expiration_date < self.service_date {
            return Err(EntityError::ExpirationBeforeService {
                service: self.service_date,
                expiration: self.expiration_date,
            });
        }
        Ok(())
    }
}

impl Canonical for Template {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put_str(&self.template_id)
            .put_str(&self.template_name)
            .put(&self.service_date)
            .put(&self.expiration_date)
            .put_flag(self.shareable)
            .put_flag(self.multi_audit)
            .put_str(&self.display_name)
            .put_str(&self.subject_key)
            .put_str(&self.description)
            .put(&self.creator);
    }
}
