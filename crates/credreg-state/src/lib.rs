//! # credreg-state — Entities, Lifecycle and State Namespace
//!
//! Defines everything the credential registry stores and how it is keyed.
//!
//! ## Entities
//!
//! - **Design / Policy / Holder** (`design.rs`): one design per contract,
//!   carrying the append-only template list, the holder index and the
//!   active-credential counter.
//!
//! - **Template** (`template.rs`): immutable credential schema.
//!
//! - **Credential** (`credential.rs`): an issued claim. Never deleted;
//!   revocation clears its holder and flips the stored activity flag.
//!
//! ## Lifecycle
//!
//! `CredentialStatus` (`lifecycle.rs`) validates every issue and revoke
//! transition: `Nonexistent → Active → Revoked → Active → …`.
//!
//! ## Namespace
//!
//! `keys.rs` builds, recognizes and parses the persisted key strings;
//! `value.rs` defines the closed `StateValue` union stored under them,
//! including the host ledger records the processors consult.
//!
//! ## Design
//!
//! Entities are plain values. Every one exposes `validate()` and a
//! `Canonical` implementation whose field order is part of the stored
//! format. Nothing here reads or writes state; that is the processors' job.

pub mod credential;
pub mod design;
pub mod error;
pub mod keys;
pub mod lifecycle;
pub mod template;
pub mod value;

// ─── Entity re-exports ──────────────────────────────────────────────

pub use credential::Credential;
pub use design::{Design, Holder, Policy};
pub use error::EntityError;
pub use template::Template;

// ─── Lifecycle re-exports ───────────────────────────────────────────

pub use lifecycle::{CredentialStatus, LifecycleError};

// ─── Namespace re-exports ───────────────────────────────────────────

pub use keys::{parse_state_key, KeyError, StateKey};
pub use value::{
    AccountKey, AccountRecord, BalanceRecord, ContractAccountRecord, CurrencyRecord, FeePolicy,
    StateValue,
};
