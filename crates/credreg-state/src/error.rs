//! Entity invariant errors.

use credreg_core::{Address, CredregError, Date};
use thiserror::Error;

/// An entity failed its `validate()` invariant, or a policy mutation would
/// break one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    /// A field failed value-level validation.
    #[error(transparent)]
    Value(#[from] CredregError),

    /// `valid_until` must be strictly greater than `valid_from`.
    #[error("credential validity window empty: valid_from {valid_from} >= valid_until {valid_until}")]
    InvalidWindow {
        /// Start of the window.
        valid_from: u64,
        /// End of the window.
        valid_until: u64,
    },

    /// A template's expiration date precedes its service date.
    #[error("template expiration {expiration} precedes service date {service}")]
    ExpirationBeforeService {
        /// Service start date.
        service: Date,
        /// Expiration date.
        expiration: Date,
    },

    /// The template id is already registered in the policy.
    #[error("template {0:?} already registered")]
    DuplicateTemplate(String),

    /// The same holder address appears twice in a policy.
    #[error("holder {0} listed more than once")]
    DuplicateHolder(Address),

    /// A holder with a zero count was left in the list.
    #[error("holder {0} has zero credentials but is still listed")]
    EmptyHolder(Address),

    /// The aggregate counter disagrees with the per-holder counts.
    #[error("credential count {recorded} does not match holder total {holder_total}")]
    CountMismatch {
        /// The policy's aggregate counter.
        recorded: u64,
        /// Sum of the holders' counts.
        holder_total: u64,
    },

    /// The holder to decrement is not in the policy's holder list.
    #[error("holder {0} not found in policy holders")]
    HolderNotFound(Address),

    /// A decrement was attempted with no active credentials recorded.
    #[error("no active credentials to revoke")]
    CounterUnderflow,

    /// An increment overflowed a counter.
    #[error("credential counter overflow")]
    CounterOverflow,
}
