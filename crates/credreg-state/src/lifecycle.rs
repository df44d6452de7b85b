//! # Credential Lifecycle State Machine
//!
//! Models the status of a credential id under one `(contract, template)`.
//!
//! ## States
//!
//! ```text
//! Nonexistent ──issue──▶ Active ──revoke──▶ Revoked
//!                          ▲                   │
//!                          └──────issue────────┘
//! ```
//!
//! The cycle is unbounded. A credential row, once created, is never removed:
//! `Nonexistent` only describes an id that has never been issued.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Credential Status ───────────────────────────────────────────────

/// The lifecycle status of a credential id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialStatus {
    /// No row has ever been stored for this id.
    Nonexistent,
    /// The credential is currently held.
    Active,
    /// The credential was revoked and may be reissued.
    Revoked,
}

impl CredentialStatus {
    /// Status of a stored row given its activity flag, or `Nonexistent`.
    pub fn from_stored(is_active: Option<bool>) -> Self {
        match is_active {
            None => Self::Nonexistent,
            Some(true) => Self::Active,
            Some(false) => Self::Revoked,
        }
    }

    /// Whether the credential is currently active.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Transition for an Issue item (NONEXISTENT or REVOKED → ACTIVE).
    pub fn issue(self) -> Result<Self, LifecycleError> {
        match self {
            Self::Nonexistent | Self::Revoked => Ok(Self::Active),
            Self::Active => Err(LifecycleError::InvalidTransition {
                from: self,
                to: Self::Active,
            }),
        }
    }

    /// Transition for a Revoke item (ACTIVE → REVOKED).
    pub fn revoke(self) -> Result<Self, LifecycleError> {
        match self {
            Self::Active => Ok(Self::Revoked),
            Self::Nonexistent | Self::Revoked => Err(LifecycleError::InvalidTransition {
                from: self,
                to: Self::Revoked,
            }),
        }
    }
}

impl std::fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Nonexistent => "NONEXISTENT",
            Self::Active => "ACTIVE",
            Self::Revoked => "REVOKED",
        };
        f.write_str(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from credential lifecycle transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// Attempted transition is not valid from the current status.
    #[error("invalid credential transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status.
        from: CredentialStatus,
        /// Attempted target status.
        to: CredentialStatus,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_from_nonexistent() {
        assert_eq!(
            CredentialStatus::Nonexistent.issue().unwrap(),
            CredentialStatus::Active
        );
    }

    #[test]
    fn test_full_cycle() {
        let s = CredentialStatus::Nonexistent.issue().unwrap();
        let s = s.revoke().unwrap();
        assert_eq!(s, CredentialStatus::Revoked);
        let s = s.issue().unwrap();
        assert!(s.is_active());
    }

    #[test]
    fn test_reissue_active_rejected() {
        let err = CredentialStatus::Active.issue().unwrap_err();
        assert_eq!(err.to_string(), "invalid credential transition: ACTIVE -> ACTIVE");
    }

    #[test]
    fn test_revoke_inactive_rejected() {
        assert!(CredentialStatus::Nonexistent.revoke().is_err());
        assert!(CredentialStatus::Revoked.revoke().is_err());
    }

    #[test]
    fn test_from_stored() {
        assert_eq!(CredentialStatus::from_stored(None), CredentialStatus::Nonexistent);
        assert_eq!(CredentialStatus::from_stored(Some(true)), CredentialStatus::Active);
        assert_eq!(CredentialStatus::from_stored(Some(false)), CredentialStatus::Revoked);
    }
}
