//! # AddTemplate
//!
//! Appends a template id to a registered design and stores the immutable
//! [`Template`] beside it.
//!
//! Fact bytes: `token ++ sender ++ contract ++ template_id ++ template_name
//! ++ service_date ++ expiration_date ++ shareable ++ multi_audit
//! ++ display_name ++ subject_key ++ description ++ creator ++ currency`.

use credreg_core::{Address, Canonical, CanonicalWriter, CurrencyId, Date};
use credreg_state::keys::{design_key, template_key};
use credreg_state::{Design, StateValue, Template};
use serde::{Deserialize, Serialize};

use crate::batch::BatchScratch;
use crate::error::{FactError, Fatal, ProcessError, Rejection};
use crate::fact::FactToken;
use crate::fee::{self, FeeItem};
use crate::merge::StateMergeValue;
use crate::reader::{load_design, require_currency, require_owned_contract, require_plain_account, StateReader};

/// Add a template to the design registered on `contract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddTemplateFact {
    /// Fact token.
    pub token: FactToken,
    /// Contract owner.
    pub sender: Address,
    /// Contract the design is registered on.
    pub contract: Address,
    /// New template id.
    pub template_id: String,
    /// Template name.
    pub template_name: String,
    /// First day in service.
    pub service_date: Date,
    /// Last day in service.
    pub expiration_date: Date,
    /// Shareable flag.
    pub shareable: bool,
    /// Multi-audit flag.
    pub multi_audit: bool,
    /// Display name.
    pub display_name: String,
    /// Subject-key schema reference.
    pub subject_key: String,
    /// Description.
    pub description: String,
    /// Template author.
    pub creator: Address,
    /// Currency the fee is paid in.
    pub currency: CurrencyId,
}

impl AddTemplateFact {
    /// The template this fact creates.
    pub fn template(&self) -> Template {
        Template {
            template_id: self.template_id.clone(),
            template_name: self.template_name.clone(),
            service_date: self.service_date,
            expiration_date: self.expiration_date,
            shareable: self.shareable,
            multi_audit: self.multi_audit,
            display_name: self.display_name.clone(),
            subject_key: self.subject_key.clone(),
            description: self.description.clone(),
            creator: self.creator.clone(),
        }
    }

    /// Fact-level validation.
    pub fn validate(&self) -> Result<(), FactError> {
        self.token.validate()?;
        if self.sender == self.contract {
            return Err(FactError::SameAddress {
                what: "contract",
                other: "sender",
                address: self.contract.clone(),
            });
        }
        if self.creator == self.contract {
            return Err(FactError::SameAddress {
                what: "creator",
                other: "contract",
                address: self.creator.clone(),
            });
        }
        self.template().validate()?;
        Ok(())
    }
}

impl Canonical for AddTemplateFact {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put(&self.token)
            .put(&self.sender)
            .put(&self.contract)
            .put_str(&self.template_id)
            .put_str(&self.template_name)
            .put(&self.service_date)
            .put(&self.expiration_date)
            .put_flag(self.shareable)
            .put_flag(self.multi_audit)
            .put_str(&self.display_name)
            .put_str(&self.subject_key)
            .put_str(&self.description)
            .put(&self.creator)
            .put(&self.currency);
    }
}

impl FeeItem for AddTemplateFact {
    fn currency(&self) -> &CurrencyId {
        &self.currency
    }
}

fn check(fact: &AddTemplateFact, reader: &dyn StateReader) -> Result<Design, ProcessError> {
    require_plain_account(reader, "creator", &fact.creator)?;
    let record = require_owned_contract(reader, &fact.sender, &fact.contract)?;
    if !record.is_active {
        return Err(Rejection::ContractNotActive(fact.contract.clone()).into());
    }
    let design = load_design(reader, &fact.contract)?
        .ok_or_else(|| Rejection::DesignNotFound(fact.contract.clone()))?;
    if design.policy().contains_template(&fact.template_id) {
        return Err(Rejection::TemplateExists {
            contract: fact.contract.clone(),
            template_id: fact.template_id.clone(),
        }
        .into());
    }
    require_currency(reader, &fact.currency)?;
    Ok(design)
}

/// Validate an AddTemplate against current state.
pub fn pre_process(fact: &AddTemplateFact, reader: &dyn StateReader) -> Result<(), ProcessError> {
    check(fact, reader).map(|_| ())
}

/// Build the extended design, the template and the fee debit.
pub fn process(
    fact: &AddTemplateFact,
    reader: &dyn StateReader,
    scratch: &mut BatchScratch,
) -> Result<(), ProcessError> {
    let design = check(fact, reader)?;

    let mut policy = design.policy().clone();
    let design_error = |source| Fatal::Design {
        contract: fact.contract.clone(),
        source,
    };
    policy
        .add_template(fact.template_id.clone())
        .map_err(design_error)?;
    let design = Design::new(policy);
    design.validate().map_err(design_error)?;

    let template = fact.template();
    template.validate().map_err(Rejection::InvalidTemplate)?;

    scratch.directives.push(StateMergeValue::set(
        design_key(&fact.contract),
        StateValue::Design(design),
    ));
    scratch.directives.push(StateMergeValue::set(
        template_key(&fact.contract, &fact.template_id),
        StateValue::Template(template),
    ));
    let fees = fee::charge(reader, &fact.sender, [fact])?;
    scratch.directives.extend(fees);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use credreg_state::EntityError;

    fn addr(s: &str) -> Address {
        Address::new(format!("{s}mca")).unwrap()
    }

    fn fact() -> AddTemplateFact {
        AddTemplateFact {
            token: FactToken::from_bytes(b"tok".to_vec()),
            sender: addr("owner"),
            contract: addr("contract"),
            template_id: "tpl1".to_string(),
            template_name: "Degree".to_string(),
            service_date: Date::parse("2024-01-01").unwrap(),
            expiration_date: Date::parse("2025-01-01").unwrap(),
            shareable: true,
            multi_audit: false,
            display_name: "Degree".to_string(),
            subject_key: "subject".to_string(),
            description: "university degree".to_string(),
            creator: addr("creator"),
            currency: CurrencyId::new("MCC").unwrap(),
        }
    }

    #[test]
    fn test_valid_fact() {
        fact().validate().unwrap();
    }

    #[test]
    fn test_creator_must_differ_from_contract() {
        let mut f = fact();
        f.creator = f.contract.clone();
        assert!(matches!(
            f.validate(),
            Err(FactError::SameAddress { what: "creator", .. })
        ));
    }

    #[test]
    fn test_expiration_before_service_rejected() {
        let mut f = fact();
        f.expiration_date = Date::parse("2023-12-31").unwrap();
        assert!(matches!(
            f.validate(),
            Err(FactError::Entity(EntityError::ExpirationBeforeService { .. }))
        ));
    }

    #[test]
    fn test_same_day_window_allowed() {
        let mut f = fact();
        f.expiration_date = f.service_date;
        f.validate().unwrap();
    }

    #[test]
    fn test_oversized_name_rejected() {
        let mut f = fact();
        f.template_name = "x".repeat(21);
        assert!(f.validate().is_err());
    }

    #[test]
    fn test_flags_change_hash() {
        let a = crate::fact::OperationFact::from(fact());
        let mut g = fact();
        g.multi_audit = true;
        let b = crate::fact::OperationFact::from(g);
        assert_ne!(a.hash(), b.hash());
    }
}
