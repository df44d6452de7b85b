//! # credreg-operation — Credential Registry Operations
//!
//! The operation-processing core of the credential registry.
//!
//! - **Facts** (`fact.rs`): the four fact kinds as a closed union, fact
//!   tokens, hashing over canonical bytes, and signed operations.
//!
//! - **Processors** (`register_model.rs`, `add_template.rs`, `issue.rs`,
//!   `revoke.rs`): one `pre_process`/`process` pair per kind. Issue and
//!   Revoke are batched; items sharing a design are coalesced into a single
//!   design update.
//!
//! - **Fee calculator** (`fee.rs`): per-currency fee accumulation and
//!   balance settlement shared by every kind.
//!
//! - **Dispatcher** (`processor.rs`): `OperationProcessor` and the
//!   per-block `BlockSession`.
//!
//! - **Pool** (`pool.rs`, `batch.rs`): reusable per-operation buffers,
//!   reset on release.
//!
//! - **Host boundary** (`reader.rs`, `merge.rs`, `memory.rs`): the state
//!   reader, the state-merge directives `process` returns, and an in-memory
//!   ledger that commits them.
//!
//! ## Contract with the host
//!
//! Processors never write state. `process` returns either the complete
//! directive list for the operation or an error and nothing; the host
//! commits the list atomically. Errors are tiered (see `error.rs`) so the
//! host can tell a rejected operation from an inconsistent ledger.

pub mod add_template;
pub mod batch;
pub mod config;
pub mod error;
pub mod fact;
pub mod fee;
pub mod issue;
pub mod memory;
pub mod merge;
pub mod pool;
pub mod processor;
pub mod reader;
pub mod register_model;
pub mod revoke;

// ─── Facts ──────────────────────────────────────────────────────────

pub use add_template::AddTemplateFact;
pub use fact::{FactSign, FactToken, Operation, OperationFact, OperationKind};
pub use issue::{IssueFact, IssueItem};
pub use register_model::RegisterModelFact;
pub use revoke::{RevokeFact, RevokeItem};

// ─── Processing ─────────────────────────────────────────────────────

pub use config::{ConfigError, ProcessorConfig};
pub use error::{FactError, Fatal, ProcessError, Rejection};
pub use fee::{FeeItem, RequiredFee};
pub use processor::{BlockSession, OperationProcessor};

// ─── Host boundary ──────────────────────────────────────────────────

pub use memory::{CommitError, MemoryLedger};
pub use merge::{MergeValue, StateMergeValue};
pub use reader::{ReadError, StateReader};
