//! # Batch Scratch
//!
//! Per-operation working state for the processors. Items that share a
//! design work against a single in-memory copy of its policy, so later
//! items see earlier items' holder and counter changes. At the end of the
//! batch every touched design is rebuilt, re-validated and emitted once,
//! in the order the batch first touched it.

use credreg_core::Address;
use credreg_state::keys::design_key;
use credreg_state::{Design, Policy, StateValue};

use crate::error::{Fatal, ProcessError, Rejection};
use crate::merge::StateMergeValue;
use crate::pool::Reset;
use crate::reader::{load_design, StateReader};

/// Working copies of the designs touched by one operation.
#[derive(Debug, Default)]
pub struct TouchedDesigns {
    entries: Vec<(Address, Policy)>,
}

impl TouchedDesigns {
    /// The working policy for `contract`, reading its design on first touch.
    pub fn load(
        &mut self,
        reader: &dyn StateReader,
        contract: &Address,
    ) -> Result<&mut Policy, ProcessError> {
        let idx = match self.entries.iter().position(|(c, _)| c == contract) {
            Some(idx) => idx,
            None => {
                let design = load_design(reader, contract)?
                    .ok_or_else(|| Rejection::DesignNotFound(contract.clone()))?;
                self.entries.push((contract.clone(), design.policy().clone()));
                self.entries.len() - 1
            }
        };
        Ok(&mut self.entries[idx].1)
    }

    /// Number of designs touched.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no design was touched.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuild each touched design and append one directive per design.
    ///
    /// A rebuilt design that fails validation means the batch contradicts
    /// committed state.
    pub fn emit(&mut self, out: &mut Vec<StateMergeValue>) -> Result<(), ProcessError> {
        for (contract, policy) in self.entries.drain(..) {
            let design = Design::new(policy);
            design.validate().map_err(|source| Fatal::Design {
                contract: contract.clone(),
                source,
            })?;
            out.push(StateMergeValue::set(
                design_key(&contract),
                StateValue::Design(design),
            ));
        }
        Ok(())
    }
}

/// Pooled buffer used by every processor call.
#[derive(Debug, Default)]
pub struct BatchScratch {
    /// Designs touched so far.
    pub designs: TouchedDesigns,
    /// Directives built so far.
    pub directives: Vec<StateMergeValue>,
}

impl BatchScratch {
    /// Move the built directives out, leaving the buffer's allocation behind.
    pub fn take_directives(&mut self) -> Vec<StateMergeValue> {
        std::mem::take(&mut self.directives)
    }
}

impl Reset for BatchScratch {
    fn reset(&mut self) {
        self.designs.entries.clear();
        self.directives.clear();
    }
}
