//! # Operation Processor
//!
//! The single entry point the host engine calls. Dispatches on the closed
//! [`OperationFact`] union to the four kind-specific processors.
//!
//! ## Pipeline
//!
//! 1. `pre_process`: fact validation, sender account, signature threshold,
//!    then the kind's state checks. Never produces directives.
//! 2. `process`: re-runs the kind's state checks against the reader it is
//!    given and returns the complete directive list, or an error and no
//!    directives at all.
//!
//! Every call works in a buffer taken from the processor's pool; the buffer
//! is reset and returned before the call returns.
//!
//! ## Block sessions
//!
//! A [`BlockSession`] wraps the processor for one proposed block and admits
//! at most one credential operation per sender to `process`. A sender's slot
//! is taken even when its operation is rejected.

use std::collections::HashSet;

use credreg_core::Address;

use crate::batch::BatchScratch;
use crate::config::ProcessorConfig;
use crate::error::{ProcessError, Rejection};
use crate::fact::{Operation, OperationFact};
use crate::merge::StateMergeValue;
use crate::pool::ProcessorPool;
use crate::reader::{check_fact_signs, require_plain_account, StateReader};
use crate::{add_template, issue, register_model, revoke};

/// Dispatches operations to the kind-specific processors.
#[derive(Debug)]
pub struct OperationProcessor {
    config: ProcessorConfig,
    pool: ProcessorPool<BatchScratch>,
}

impl OperationProcessor {
    /// A processor with the given configuration.
    pub fn new(config: ProcessorConfig) -> Self {
        let pool = ProcessorPool::new("batch", config.pool_capacity);
        Self { config, pool }
    }

    /// Active configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Idle pooled buffers.
    pub fn idle_buffers(&self) -> usize {
        self.pool.idle()
    }

    /// Validate an operation against current state without producing
    /// directives.
    pub fn pre_process(
        &self,
        op: &Operation,
        reader: &dyn StateReader,
    ) -> Result<(), ProcessError> {
        let result = self.run_pre_process(op, reader);
        match &result {
            Ok(()) => tracing::debug!(kind = %op.fact.kind(), fact_hash = %op.hash(), "operation pre-processed"),
            Err(e) => log_failure(op, "pre_process", e),
        }
        result
    }

    /// Compute the directives that apply the operation.
    pub fn process(
        &self,
        op: &Operation,
        reader: &dyn StateReader,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let result = self.run_process(op, reader);
        match &result {
            Ok(directives) => tracing::info!(
                kind = %op.fact.kind(),
                fact_hash = %op.hash(),
                directives = directives.len(),
                "operation processed"
            ),
            Err(e) => log_failure(op, "process", e),
        }
        result
    }

    fn run_pre_process(&self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        op.fact.validate(&self.config)?;
        let sender = require_plain_account(reader, "sender", op.fact.sender())?;
        check_fact_signs(&sender, op, self.config.network_id_bytes())?;

        match &op.fact {
            OperationFact::RegisterModel(f) => register_model::pre_process(f, reader),
            OperationFact::AddTemplate(f) => add_template::pre_process(f, reader),
            OperationFact::Issue(f) => {
                let mut scratch = self.pool.acquire();
                issue::pre_process(f, reader, &mut scratch)
            }
            OperationFact::Revoke(f) => {
                let mut scratch = self.pool.acquire();
                revoke::pre_process(f, reader, &mut scratch)
            }
        }
    }

    fn run_process(
        &self,
        op: &Operation,
        reader: &dyn StateReader,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        op.fact.validate(&self.config)?;
        require_plain_account(reader, "sender", op.fact.sender())?;

        let mut scratch = self.pool.acquire();
        match &op.fact {
            OperationFact::RegisterModel(f) => register_model::process(f, reader, &mut scratch)?,
            OperationFact::AddTemplate(f) => add_template::process(f, reader, &mut scratch)?,
            OperationFact::Issue(f) => issue::process(f, reader, &mut scratch)?,
            OperationFact::Revoke(f) => revoke::process(f, reader, &mut scratch)?,
        }
        Ok(scratch.take_directives())
    }
}

fn log_failure(op: &Operation, phase: &'static str, err: &ProcessError) {
    if err.is_fatal() {
        tracing::error!(phase, kind = %op.fact.kind(), fact_hash = %op.hash(), error = %err, "fatal processing error");
    } else {
        tracing::warn!(phase, kind = %op.fact.kind(), fact_hash = %op.hash(), error = %err, "operation rejected");
    }
}

// ─── Block Session ───────────────────────────────────────────────────

/// Per-block processing scope enforcing one credential operation per sender.
#[derive(Debug)]
pub struct BlockSession<'p> {
    processor: &'p OperationProcessor,
    senders: HashSet<Address>,
}

impl<'p> BlockSession<'p> {
    /// Open a session for a new proposed block.
    pub fn open(processor: &'p OperationProcessor) -> Self {
        Self {
            processor,
            senders: HashSet::new(),
        }
    }

    /// The underlying processor.
    pub fn processor(&self) -> &'p OperationProcessor {
        self.processor
    }

    /// See [`OperationProcessor::pre_process`].
    pub fn pre_process(
        &self,
        op: &Operation,
        reader: &dyn StateReader,
    ) -> Result<(), ProcessError> {
        self.processor.pre_process(op, reader)
    }

    /// Process the operation unless its sender already has one in this
    /// session. The sender's slot is claimed before processing, so a
    /// rejected operation still uses it up.
    pub fn process(
        &mut self,
        op: &Operation,
        reader: &dyn StateReader,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let sender = op.fact.sender();
        if !self.senders.insert(sender.clone()) {
            let err: ProcessError = Rejection::DuplicateSender(sender.clone()).into();
            tracing::warn!(sender = %sender, error = %err, "operation rejected");
            return Err(err);
        }
        self.processor.process(op, reader)
    }

    /// Whether `sender` already has an operation in this session.
    pub fn has_sender(&self, sender: &Address) -> bool {
        self.senders.contains(sender)
    }

    /// End the block; the session can be reused for the next one.
    pub fn close(&mut self) {
        tracing::debug!(senders = self.senders.len(), "block session closed");
        self.senders.clear();
    }
}
