//! # Engine Configuration
//!
//! Tunables for the sale engine. Read from the `[engine]` section of the
//! API's TOML file.
//!
//! ```toml
//! [engine]
//! invoice_retry_limit = 5
//! transaction_timeout_secs = 10
//! hook_timeout_ms = 2000
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::InvalidEngineConfig;

/// Sale engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Invoice candidates tried before giving up.
    #[serde(default = "default_invoice_retry_limit")]
    pub invoice_retry_limit: u32,

    /// Upper bound on one sale's unit of work, lock wait included.
    #[serde(default = "default_transaction_timeout")]
    pub transaction_timeout_secs: u64,

    /// Upper bound on each post-commit hook.
    #[serde(default = "default_hook_timeout")]
    pub hook_timeout_ms: u64,
}

fn default_invoice_retry_limit() -> u32 {
    5
}

fn default_transaction_timeout() -> u64 {
    10
}

fn default_hook_timeout() -> u64 {
    2000
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            invoice_retry_limit: default_invoice_retry_limit(),
            transaction_timeout_secs: default_transaction_timeout(),
            hook_timeout_ms: default_hook_timeout(),
        }
    }
}

impl EngineConfig {
    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_secs(self.transaction_timeout_secs)
    }

    pub fn hook_timeout(&self) -> Duration {
        Duration::from_millis(self.hook_timeout_ms)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), InvalidEngineConfig> {
        if self.invoice_retry_limit == 0 {
            return Err(InvalidEngineConfig(
                "invoice_retry_limit must be greater than 0".into(),
            ));
        }

        if self.transaction_timeout_secs == 0 {
            return Err(InvalidEngineConfig(
                "transaction_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.hook_timeout_ms == 0 {
            return Err(InvalidEngineConfig(
                "hook_timeout_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.invoice_retry_limit, 5);
        assert_eq!(config.transaction_timeout(), Duration::from_secs(10));
        assert_eq!(config.hook_timeout(), Duration::from_millis(2000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str("invoice_retry_limit = 3").unwrap();
        assert_eq!(config.invoice_retry_limit, 3);
        assert_eq!(config.transaction_timeout_secs, 10);
    }

    #[test]
    fn test_validation() {
        let mut config = EngineConfig::default();
        config.invoice_retry_limit = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.hook_timeout_ms = 0;
        assert!(config.validate().is_err());
    }
}
