//! # RegisterModel
//!
//! Registers the credential service on a contract account: stores an empty
//! design and marks the contract active. A contract can be registered at
//! most once.
//!
//! Fact bytes: `token ++ sender ++ contract ++ currency`.

use credreg_core::{Address, Canonical, CanonicalWriter, CurrencyId};
use credreg_state::keys::{contract_account_key, design_key};
use credreg_state::{ContractAccountRecord, Design, Policy, StateValue};
use serde::{Deserialize, Serialize};

use crate::batch::BatchScratch;
use crate::error::{FactError, Fatal, ProcessError, Rejection};
use crate::fact::FactToken;
use crate::fee::{self, FeeItem};
use crate::merge::StateMergeValue;
use crate::reader::{load_design, require_currency, require_owned_contract, StateReader};

/// Register a credential service on `contract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterModelFact {
    /// Fact token.
    pub token: FactToken,
    /// Contract owner.
    pub sender: Address,
    /// Contract account to register the service on.
    pub contract: Address,
    /// Currency the fee is paid in.
    pub currency: CurrencyId,
}

impl RegisterModelFact {
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
        Ok(())
    }
}

impl Canonical for RegisterModelFact {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put(&self.token)
            .put(&self.sender)
            .put(&self.contract)
            .put(&self.currency);
    }
}

impl FeeItem for RegisterModelFact {
    fn currency(&self) -> &CurrencyId {
        &self.currency
    }
}

/// State checks shared by pre-process and process.
fn check(
    fact: &RegisterModelFact,
    reader: &dyn StateReader,
) -> Result<ContractAccountRecord, ProcessError> {
    let record = require_owned_contract(reader, &fact.sender, &fact.contract)?;
    if record.is_active || load_design(reader, &fact.contract)?.is_some() {
        return Err(Rejection::AlreadyRegistered(fact.contract.clone()).into());
    }
    require_currency(reader, &fact.currency)?;
    Ok(record)
}

/// Validate a RegisterModel against current state.
pub fn pre_process(fact: &RegisterModelFact, reader: &dyn StateReader) -> Result<(), ProcessError> {
    check(fact, reader).map(|_| ())
}

/// Build the new design, the activated contract record and the fee debit.
pub fn process(
    fact: &RegisterModelFact,
    reader: &dyn StateReader,
    scratch: &mut BatchScratch,
) -> Result<(), ProcessError> {
    let record = check(fact, reader)?;

    let design = Design::new(Policy::empty());
    design.validate().map_err(|source| Fatal::Design {
        contract: fact.contract.clone(),
        source,
    })?;

    scratch.directives.push(StateMergeValue::set(
        design_key(&fact.contract),
        StateValue::Design(design),
    ));
    scratch.directives.push(StateMergeValue::set(
        contract_account_key(&fact.contract),
        StateValue::ContractAccount(record.activated()),
    ));
    let fees = fee::charge(reader, &fact.sender, [fact])?;
    scratch.directives.extend(fees);
    Ok(())
}
