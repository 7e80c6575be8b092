pub mod observability_config;
pub mod storage_config;
pub mod temporal_config;

use serde::{Deserialize, Serialize};

pub use observability_config::ObservabilityConfig;
pub use storage_config::StorageConfig;
pub use temporal_config::TemporalConfig;

use crate::errors::{TemporaError, TemporaResult};

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TemporaConfig {
    pub storage: StorageConfig,
    pub temporal: TemporalConfig,
    pub observability: ObservabilityConfig,
}

impl TemporaConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load and validate a config file.
    pub fn from_file(path: &std::path::Path) -> TemporaResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| TemporaError::ConfigError(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml(&raw).map_err(|e| TemporaError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TemporaResult<()> {
        if self.storage.read_pool_size == 0 {
            return Err(TemporaError::ConfigError(
                "storage.read_pool_size must be at least 1".into(),
            ));
        }
        if self.temporal.max_batch_operations == 0 {
            return Err(TemporaError::ConfigError(
                "temporal.max_batch_operations must be at least 1".into(),
            ));
        }
        if self.temporal.clock_skew_tolerance_ms < 0 {
            return Err(TemporaError::ConfigError(
                "temporal.clock_skew_tolerance_ms cannot be negative".into(),
            ));
        }
        Ok(())
    }
}
