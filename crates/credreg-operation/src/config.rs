//! # Processor Configuration
//!
//! Settings shared by every processor. Loadable from YAML; every field has a
//! default so an empty document is a valid configuration.
//!
//! ```yaml
//! network_id: credreg
//! max_issue_items: 1000
//! max_revoke_items: 1000
//! pool_capacity: 16
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound accepted for the per-operation item caps.
pub const ITEM_CAP_LIMIT: usize = 5000;

/// Processor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Bytes prefixed to every fact hash before signing.
    pub network_id: String,
    /// Maximum items in one Issue operation.
    pub max_issue_items: usize,
    /// Maximum items in one Revoke operation.
    pub max_revoke_items: usize,
    /// Maximum idle scratch buffers kept per pool.
    pub pool_capacity: usize,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            network_id: "credreg".to_string(),
            max_issue_items: 1000,
            max_revoke_items: 1000,
            pool_capacity: 16,
        }
    }
}

/// Configuration load or validation failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config path.
        path: String,
        /// IO error.
        source: std::io::Error,
    },

    /// The YAML did not parse.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ProcessorConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network_id.is_empty() {
            return Err(ConfigError::Invalid("network_id must not be empty".to_string()));
        }
        for (name, cap) in [
            ("max_issue_items", self.max_issue_items),
            ("max_revoke_items", self.max_revoke_items),
        ] {
            if cap == 0 || cap > ITEM_CAP_LIMIT {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be in 1..={ITEM_CAP_LIMIT}, got {cap}"
                )));
            }
        }
        Ok(())
    }

    /// The network id as signing-message bytes.
    pub fn network_id_bytes(&self) -> &[u8] {
        self.network_id.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ProcessorConfig::default();
        assert_eq!(c.network_id, "credreg");
        assert_eq!(c.max_issue_items, 1000);
        assert_eq!(c.max_revoke_items, 1000);
        c.validate().unwrap();
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let c = ProcessorConfig::from_yaml_str("max_issue_items: 10\n").unwrap();
        assert_eq!(c.max_issue_items, 10);
        assert_eq!(c.max_revoke_items, 1000);
        assert_eq!(c.network_id, "credreg");
    }

    #[test]
    fn test_out_of_range_caps_rejected() {
        assert!(ProcessorConfig::from_yaml_str("max_issue_items: 0\n").is_err());
        assert!(ProcessorConfig::from_yaml_str("max_revoke_items: 5001\n").is_err());
        assert!(ProcessorConfig::from_yaml_str("network_id: \"\"\n").is_err());
    }

    #[test]
    fn test_unparseable_yaml() {
        assert!(matches!(
            ProcessorConfig::from_yaml_str("max_issue_items: [1]\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
