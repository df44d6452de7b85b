//! # Processing Errors — Three Tiers
//!
//! Every failure of `pre_process` or `process` is one of three tiers:
//!
//! - [`ProcessError::Invalid`]: the fact itself is malformed (bad lengths,
//!   empty batches, duplicate item keys). Detected before any state read.
//! - [`ProcessError::Rejected`]: a state precondition does not hold (missing
//!   account, not owner, unknown template, insufficient balance). The
//!   operation is not applied; the block containing it stays valid.
//! - [`ProcessError::Fatal`]: committed state is inconsistent with the fact
//!   being applied (holder missing from the index, wrong value type under a
//!   key, failed state read).
//!
//! No tier ever applies part of an operation: a failed `process` returns no
//! directives at all.

use credreg_core::{Address, Amount, CredregError, CurrencyId};
use credreg_state::{EntityError, LifecycleError};
use thiserror::Error;

use crate::reader::ReadError;

/// Failure of a pre-process or process call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// Fact-level format error.
    #[error("invalid fact: {0}")]
    Invalid(#[from] FactError),

    /// State-precondition failure.
    #[error("operation rejected: {0}")]
    Rejected(#[from] Rejection),

    /// Invariant violation or internal error.
    #[error("fatal processing error: {0}")]
    Fatal(#[from] Fatal),
}

impl ProcessError {
    /// Whether this error is an invariant violation rather than a rejection.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// Fact-level format errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FactError {
    /// A field failed value validation.
    #[error(transparent)]
    Value(#[from] CredregError),

    /// An embedded entity failed validation.
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// The fact token is empty or oversized.
    #[error("fact token length {0} outside 1..=100")]
    Token(usize),

    /// Two addresses that must differ are equal.
    #[error("{what} must differ from {other}: {address}")]
    SameAddress {
        /// The constrained field.
        what: &'static str,
        /// The field it must differ from.
        other: &'static str,
        /// The shared address.
        address: Address,
    },

    /// A batched fact has no items.
    #[error("empty items")]
    EmptyItems,

    /// A batched fact exceeds the configured item cap.
    #[error("{count} items exceed the maximum of {max}")]
    TooManyItems {
        /// Items in the fact.
        count: usize,
        /// Configured cap.
        max: usize,
    },

    /// Two items target the same credential.
    #[error("duplicate credential item: {0}")]
    DuplicateItem(String),
}

/// State-precondition failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// An account does not exist.
    #[error("{role} account not found: {address}")]
    AccountNotFound {
        /// Role of the account in the fact.
        role: &'static str,
        /// Address looked up.
        address: Address,
    },

    /// An account that must be a plain account is a contract account.
    #[error("{role} is a contract account: {address}")]
    IsContractAccount {
        /// Role of the account in the fact.
        role: &'static str,
        /// Address looked up.
        address: Address,
    },

    /// The target contract account does not exist.
    #[error("contract account not found: {0}")]
    ContractNotFound(Address),

    /// The sender does not own the contract.
    #[error("sender {sender} is not the owner of contract {contract}")]
    NotOwner {
        /// Fact sender.
        sender: Address,
        /// Target contract.
        contract: Address,
    },

    /// The sender is neither owner nor operator of the contract.
    #[error("sender {sender} is neither the owner nor an operator of contract {contract}")]
    NotOwnerOrOperator {
        /// Fact sender.
        sender: Address,
        /// Target contract.
        contract: Address,
    },

    /// A credential service is already registered on the contract.
    #[error("credential service already registered on {0}")]
    AlreadyRegistered(Address),

    /// The contract has no active credential service.
    #[error("contract {0} has no active credential service")]
    ContractNotActive(Address),

    /// No design is stored for the contract.
    #[error("credential service design not found for {0}")]
    DesignNotFound(Address),

    /// The template id is already registered.
    #[error("template {template_id:?} already registered on {contract}")]
    TemplateExists {
        /// Target contract.
        contract: Address,
        /// Template id.
        template_id: String,
    },

    /// The template id is not registered in the design.
    #[error("template not registered: {template_id:?} on {contract}")]
    TemplateNotRegistered {
        /// Target contract.
        contract: Address,
        /// Template id.
        template_id: String,
    },

    /// The credential's lifecycle does not permit the transition.
    #[error("credential {credential_id:?}: {source}")]
    Lifecycle {
        /// Credential id.
        credential_id: String,
        /// Transition error.
        source: LifecycleError,
    },

    /// A revoke item's holder differs from the credential's holder.
    #[error("credential {credential_id:?} is held by {actual}, not {claimed}")]
    HolderMismatch {
        /// Credential id.
        credential_id: String,
        /// Holder named in the item.
        claimed: Address,
        /// Holder on record.
        actual: Address,
    },

    /// The currency has no stored design.
    #[error("currency not found: {0}")]
    CurrencyNotFound(CurrencyId),

    /// The currency's fee receiver has no balance state.
    #[error("fee receiver {receiver} has no {currency} balance")]
    FeeReceiverNotFound {
        /// Currency.
        currency: CurrencyId,
        /// Configured receiver.
        receiver: Address,
    },

    /// The sender cannot cover the required fee.
    #[error("insufficient {currency} balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Currency.
        currency: CurrencyId,
        /// Required amount.
        required: Amount,
        /// Available amount.
        available: Amount,
    },

    /// Fee evaluation failed.
    #[error("fee evaluation failed for {currency}: {source}")]
    Fee {
        /// Currency.
        currency: CurrencyId,
        /// Arithmetic error.
        source: CredregError,
    },

    /// The sign set does not satisfy the sender's key threshold.
    #[error("invalid signing: {0}")]
    InvalidSigning(String),

    /// The rebuilt template failed validation.
    #[error("invalid template: {0}")]
    InvalidTemplate(EntityError),

    /// A second credential operation from the same sender in one block.
    #[error("violates only one sender in proposal: {0}")]
    DuplicateSender(Address),
}

/// Invariant violations and internal failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fatal {
    /// The state reader failed.
    #[error(transparent)]
    Read(#[from] ReadError),

    /// A key holds a value of the wrong variant.
    #[error("unexpected state value under {key}: expected {expected}, found {found}")]
    UnexpectedValue {
        /// Key read.
        key: String,
        /// Expected variant.
        expected: &'static str,
        /// Variant found.
        found: &'static str,
    },

    /// A design's holder index or counter contradicts the fact.
    #[error("design invariant violated for {contract}: {source}")]
    Design {
        /// Contract whose design is inconsistent.
        contract: Address,
        /// Entity error.
        source: EntityError,
    },

    /// Balance arithmetic overflowed.
    #[error(transparent)]
    Arithmetic(#[from] CredregError),
}
