//! # credreg-crypto — Cryptographic Primitives
//!
//! Provides Ed25519 signing and verification for the signatures attached to
//! credential-registry operations. Hashing lives in `credreg-core`
//! (`sha256_digest` over `CanonicalBytes`); this crate only signs.
//!
//! ## Crate Policy
//!
//! - Depends only on `credreg-core` internally.
//! - No mocking of cryptographic operations in tests: all tests use real
//!   `CanonicalBytes`, real SHA-256, real Ed25519.

pub mod ed25519;

pub use ed25519::{signing_message, verify, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
