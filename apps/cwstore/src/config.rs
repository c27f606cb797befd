//! # Configuration
//!
//! Optional TOML configuration. Every field has a default, so an absent file
//! and an empty file behave the same. Command line flags take precedence.
//!
//! ```toml
//! horizon = 1.0
//! policy = "revision"   # revision | choice | random
//! seed = 42             # seeds the random policy
//! ```

use crate::error::{AppError, AppResult};
use crate::files::{MAX_CONFIG_FILE_SIZE, read_text_file};
use cwstore_core::PolicyKind;
use cwstore_core::primitives::DEFAULT_HORIZON;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Evidential horizon `k` used by truth-value inference.
    pub horizon: f64,
    /// Policy used when a boundary query finds duplicate evidence.
    pub policy: PolicyKind,
    /// Seed for the random policy; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            policy: PolicyKind::default(),
            seed: None,
        }
    }
}

impl Config {
    /// Parse and validate a configuration document.
    pub fn from_toml_str(source: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(source).map_err(|source| AppError::Parse {
            what: "configuration".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let config = Self::from_toml_str(&read_text_file(path, MAX_CONFIG_FILE_SIZE)?)?;
        tracing::debug!(path = %path.display(), ?config, "configuration loaded");
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if !self.horizon.is_finite() || self.horizon <= 0.0 {
            return Err(AppError::InvalidConfig(format!(
                "horizon must be finite and positive, got {}",
                self.horizon
            )));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").expect("parse"), Config::default());
        assert_eq!(Config::load(None).expect("load"), Config::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config = Config::from_toml_str("horizon = 2.5\npolicy = \"random\"\nseed = 7\n")
            .expect("parse");
        assert_eq!(config.horizon, 2.5);
        assert_eq!(config.policy, PolicyKind::Random);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            Config::from_toml_str("horizon = 0.0"),
            Err(AppError::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_toml_str("policy = \"vote\""),
            Err(AppError::Parse { .. })
        ));
        assert!(matches!(
            Config::from_toml_str("colour = \"blue\""),
            Err(AppError::Parse { .. })
        ));
    }
}
