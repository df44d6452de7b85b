//! # Identity Newtypes and Field Validators
//!
//! Newtype wrappers for the host ledger's account addresses and currency
//! ids, plus the shared validators for credential-registry identifier and
//! free-text fields.
//!
//! ## Security Invariant
//!
//! Type-level distinction between an `Address` and a `CurrencyId` prevents
//! one from being substituted for the other. Identifier strings are
//! validated before they can be embedded in a `:`-separated state key, so
//! no identifier can forge a key in another namespace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::canonical::{Canonical, CanonicalWriter};
use crate::error::CredregError;

/// Address type suffix shared by every account address.
pub const ADDRESS_SUFFIX: &str = "mca";

/// Characters forbidden in template and credential identifiers.
pub const FORBIDDEN_ID_CHARS: &[char] = &[':', '/', '?', '#', '[', ']', '$', '@'];

// ─── Length Bounds ───────────────────────────────────────────────────

/// Maximum length of a template id.
pub const MAX_TEMPLATE_ID_LEN: usize = 20;
/// Maximum length of a credential id.
pub const MAX_CREDENTIAL_ID_LEN: usize = 20;
/// Maximum length of a template name.
pub const MAX_TEMPLATE_NAME_LEN: usize = 20;
/// Maximum length of a template display name.
pub const MAX_DISPLAY_NAME_LEN: usize = 20;
/// Maximum length of a template subject key.
pub const MAX_SUBJECT_KEY_LEN: usize = 256;
/// Maximum length of a template description.
pub const MAX_DESCRIPTION_LEN: usize = 1024;
/// Maximum length of a credential value payload.
pub const MAX_VALUE_LEN: usize = 1024;
/// Maximum length of a DID string.
pub const MAX_DID_LEN: usize = 1024;

// ─── Address ─────────────────────────────────────────────────────────

/// A validated host-ledger account address.
///
/// 3..=100 characters, ending with the [`ADDRESS_SUFFIX`]; the body before
/// the suffix is non-empty ASCII alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Minimum address length including the suffix.
    pub const MIN_LEN: usize = 3;
    /// Maximum address length including the suffix.
    pub const MAX_LEN: usize = 100;

    /// Parse and validate an address string.
    pub fn new(s: impl Into<String>) -> Result<Self, CredregError> {
        let s = s.into();
        check_length("address", &s, Self::MIN_LEN, Self::MAX_LEN)?;
        let Some(body) = s.strip_suffix(ADDRESS_SUFFIX) else {
            return Err(CredregError::InvalidFormat {
                field: "address",
                value: s,
                reason: "missing address type suffix",
            });
        };
        if body.is_empty() {
            return Err(CredregError::InvalidFormat {
                field: "address",
                value: s,
                reason: "empty address body",
            });
        }
        if !body.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CredregError::InvalidFormat {
                field: "address",
                value: s,
                reason: "body must be ascii alphanumeric",
            });
        }
        Ok(Self(s))
    }

    /// The full address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = CredregError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = CredregError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}

impl Canonical for Address {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put_str(&self.0);
    }
}

// ─── Currency ────────────────────────────────────────────────────────

/// A validated currency identifier.
///
/// 3..=10 characters matching `^[A-Z0-9][A-Z0-9_.!$*@]*[A-Z0-9]$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyId(String);

impl CurrencyId {
    /// Minimum currency id length.
    pub const MIN_LEN: usize = 3;
    /// Maximum currency id length.
    pub const MAX_LEN: usize = 10;

    /// Parse and validate a currency id.
    pub fn new(s: impl Into<String>) -> Result<Self, CredregError> {
        let s = s.into();
        check_length("currency", &s, Self::MIN_LEN, Self::MAX_LEN)?;
        let edge = |c: char| c.is_ascii_uppercase() || c.is_ascii_digit();
        let inner = |c: char| edge(c) || "_.!$*@".contains(c);
        let first_last_ok = s.chars().next().is_some_and(edge) && s.chars().last().is_some_and(edge);
        if !first_last_ok || !s.chars().all(inner) {
            return Err(CredregError::InvalidFormat {
                field: "currency",
                value: s,
                reason: "must match [A-Z0-9][A-Z0-9_.!$*@]*[A-Z0-9]",
            });
        }
        Ok(Self(s))
    }

    /// The currency id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyId {
    type Err = CredregError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyId {
    type Error = CredregError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CurrencyId> for String {
    fn from(c: CurrencyId) -> Self {
        c.0
    }
}

impl Canonical for CurrencyId {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put_str(&self.0);
    }
}

// ─── Field Validators ────────────────────────────────────────────────

/// Check that `value` has a character length in `min..=max`.
pub fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), CredregError> {
    let actual = value.chars().count();
    if actual < min || actual > max {
        return Err(CredregError::InvalidLength {
            field,
            min,
            max,
            actual,
        });
    }
    Ok(())
}

/// Validate a template or credential identifier.
///
/// Identifiers are 1..=`max` characters with no whitespace and none of
/// [`FORBIDDEN_ID_CHARS`], so they can be embedded in a state key.
pub fn check_identifier(field: &'static str, value: &str, max: usize) -> Result<(), CredregError> {
    check_length(field, value, 1, max)?;
    if value.chars().any(|c| c.is_whitespace() || FORBIDDEN_ID_CHARS.contains(&c)) {
        return Err(CredregError::InvalidFormat {
            field,
            value: value.to_string(),
            reason: "contains whitespace or a reserved character",
        });
    }
    Ok(())
}
