//! # credreg-core — Foundational Types for the Credential Registry
//!
//! This crate is the bedrock of the credential registry workspace. It defines
//! the primitive value types every fact, entity and state value is built
//! from. Every other crate in the workspace depends on `credreg-core`; it
//! depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for host primitives.** `Address`, `CurrencyId`,
//!    `Date`, `Amount` all have validated constructors. No bare strings for
//!    account addresses or currencies.
//!
//! 2. **`CanonicalBytes` newtype.** ALL hashing and signing flows through
//!    `CanonicalBytes::new()`, which drives a type's fixed field order. No
//!    ad-hoc byte assembly reaches the digest function.
//!
//! 3. **`sha256_digest()` accepts only `&CanonicalBytes`.** Compile-time
//!    enforcement that every fact hash is computed over canonical bytes.
//!
//! 4. **Checked amounts.** `Amount` arithmetic never wraps.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `credreg-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod amount;
pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use amount::Amount;
pub use canonical::{Canonical, CanonicalBytes, CanonicalWriter};
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{CredregError, CryptoError};
pub use identity::{check_identifier, check_length, Address, CurrencyId};
pub use temporal::Date;
