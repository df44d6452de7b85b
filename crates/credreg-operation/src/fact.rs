//! # Facts and Operations
//!
//! A fact is the canonical, hashable, signer-attributed description of an
//! intended operation. Its hash is SHA-256 over `token ++ fields`, with the
//! fields in the fixed order each fact type declares; reordering them
//! changes the hash and breaks every signature collected over it.
//!
//! An [`Operation`] pairs a fact with the signatures collected over
//! `network_id ++ fact_hash`. The four fact kinds form the closed
//! [`OperationFact`] union dispatched by the operation processor.

use credreg_core::{sha256_digest, Address, Canonical, CanonicalBytes, CanonicalWriter, ContentDigest};
use credreg_crypto::{signing_message, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::add_template::AddTemplateFact;
use crate::config::ProcessorConfig;
use crate::error::FactError;
use crate::issue::IssueFact;
use crate::register_model::RegisterModelFact;
use crate::revoke::RevokeFact;

/// Maximum fact token length in bytes.
pub const MAX_TOKEN_LEN: usize = 100;

// ─── Token ───────────────────────────────────────────────────────────

/// Caller-supplied nonce that makes otherwise identical facts distinct.
///
/// Serializes as a lowercase hex string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FactToken(Vec<u8>);

impl FactToken {
    /// A fresh 16-byte token from a random UUID.
    pub fn random() -> Self {
        Self(Uuid::new_v4().as_bytes().to_vec())
    }

    /// Wrap explicit token bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw token bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Check the token length.
    pub fn validate(&self) -> Result<(), FactError> {
        if self.0.is_empty() || self.0.len() > MAX_TOKEN_LEN {
            return Err(FactError::Token(self.0.len()));
        }
        Ok(())
    }

    fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Debug for FactToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FactToken({})", self.to_hex())
    }
}

impl Canonical for FactToken {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put_bytes(&self.0);
    }
}

impl Serialize for FactToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FactToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        if hex.len() % 2 != 0 || !hex.is_ascii() {
            return Err(serde::de::Error::custom("token hex must have even ascii length"));
        }
        (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
            .collect::<Result<Vec<u8>, _>>()
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

// ─── Operation Kind ──────────────────────────────────────────────────

/// The four credential operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Register a credential service on a contract.
    RegisterModel,
    /// Add a template to a registered service.
    AddTemplate,
    /// Issue credentials (batched).
    Issue,
    /// Revoke credentials (batched).
    Revoke,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::RegisterModel => "REGISTER_MODEL",
            Self::AddTemplate => "ADD_TEMPLATE",
            Self::Issue => "ISSUE",
            Self::Revoke => "REVOKE",
        };
        f.write_str(s)
    }
}

// ─── Operation Fact ──────────────────────────────────────────────────

/// A fact of one of the four operation kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationFact {
    /// See [`RegisterModelFact`].
    RegisterModel(RegisterModelFact),
    /// See [`AddTemplateFact`].
    AddTemplate(AddTemplateFact),
    /// See [`IssueFact`].
    Issue(IssueFact),
    /// See [`RevokeFact`].
    Revoke(RevokeFact),
}

impl OperationFact {
    /// The operation kind.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::RegisterModel(_) => OperationKind::RegisterModel,
            Self::AddTemplate(_) => OperationKind::AddTemplate,
            Self::Issue(_) => OperationKind::Issue,
            Self::Revoke(_) => OperationKind::Revoke,
        }
    }

    /// The account that signs and pays for the operation.
    pub fn sender(&self) -> &Address {
        match self {
            Self::RegisterModel(f) => &f.sender,
            Self::AddTemplate(f) => &f.sender,
            Self::Issue(f) => &f.sender,
            Self::Revoke(f) => &f.sender,
        }
    }

    /// SHA-256 over the fact's canonical bytes.
    pub fn hash(&self) -> ContentDigest {
        sha256_digest(&CanonicalBytes::new(self))
    }

    /// Fact-level format validation. Reads no state.
    pub fn validate(&self, config: &ProcessorConfig) -> Result<(), FactError> {
        match self {
            Self::RegisterModel(f) => f.validate(),
            Self::AddTemplate(f) => f.validate(),
            Self::Issue(f) => f.validate(config.max_issue_items),
            Self::Revoke(f) => f.validate(config.max_revoke_items),
        }
    }
}

impl Canonical for OperationFact {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        match self {
            Self::RegisterModel(f) => f.write_canonical(w),
            Self::AddTemplate(f) => f.write_canonical(w),
            Self::Issue(f) => f.write_canonical(w),
            Self::Revoke(f) => f.write_canonical(w),
        }
    }
}

impl From<RegisterModelFact> for OperationFact {
    fn from(f: RegisterModelFact) -> Self {
        Self::RegisterModel(f)
    }
}

impl From<AddTemplateFact> for OperationFact {
    fn from(f: AddTemplateFact) -> Self {
        Self::AddTemplate(f)
    }
}

impl From<IssueFact> for OperationFact {
    fn from(f: IssueFact) -> Self {
        Self::Issue(f)
    }
}

impl From<RevokeFact> for OperationFact {
    fn from(f: RevokeFact) -> Self {
        Self::Revoke(f)
    }
}

// ─── Operation ───────────────────────────────────────────────────────

/// A signature over a fact by one account key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSign {
    /// Signing key.
    pub signer: Ed25519PublicKey,
    /// Signature over `network_id ++ fact_hash`.
    pub signature: Ed25519Signature,
}

/// A fact plus its collected signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// The fact.
    pub fact: OperationFact,
    /// Collected signatures.
    #[serde(default)]
    pub signs: Vec<FactSign>,
}

impl Operation {
    /// An unsigned operation.
    pub fn new(fact: impl Into<OperationFact>) -> Self {
        Self {
            fact: fact.into(),
            signs: Vec::new(),
        }
    }

    /// Sign the fact and append the signature.
    pub fn sign(&mut self, key: &Ed25519KeyPair, network_id: &[u8]) {
        let message = signing_message(network_id, &self.fact.hash());
        self.signs.push(FactSign {
            signer: key.public_key(),
            signature: key.sign(&message),
        });
    }

    /// Builder form of [`Operation::sign`].
    pub fn signed_by(mut self, key: &Ed25519KeyPair, network_id: &[u8]) -> Self {
        self.sign(key, network_id);
        self
    }

    /// The fact hash.
    pub fn hash(&self) -> ContentDigest {
        self.fact.hash()
    }
}
