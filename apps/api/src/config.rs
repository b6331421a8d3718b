//! # API Configuration
//!
//! ## Load Order (later overrides earlier)
//! 1. Defaults (this file)
//! 2. Config file (`api.toml`): `--config`, `BAZAAR_CONFIG`, or the
//!    platform config directory
//! 3. Environment variables (`BAZAAR_*`)
//!
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "/var/lib/bazaar/bazaar.db"
//! max_connections = 5
//!
//! [auth]
//! jwt_secret = "change-me"
//!
//! [engine]
//! invoice_retry_limit = 5
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use bazaar_db::DbConfig;
use bazaar_sales::{EngineConfig, InvalidEngineConfig};

/// Secret used when none is configured. Fine for local runs only.
pub const DEV_JWT_SECRET: &str = "bazaar-dev-secret-change-in-production";

/// API server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub engine: EngineConfig,
}

/// `[server]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

/// `[database]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("bazaar.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// `[auth]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Lifetime of tokens minted by `JwtManager::issue`.
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_secs: i64,
}

fn default_jwt_secret() -> String {
    DEV_JWT_SECRET.to_string()
}

fn default_token_lifetime() -> i64 {
    3600
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            jwt_secret: default_jwt_secret(),
            token_lifetime_secs: default_token_lifetime(),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Engine(#[from] InvalidEngineConfig),
}

impl ApiConfig {
    /// Loads configuration from file, environment, and defaults.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var("BAZAAR_CONFIG").ok().map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading API config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        if config.auth.jwt_secret == DEV_JWT_SECRET {
            warn!("Using the development JWT secret; set BAZAAR_JWT_SECRET");
        }

        Ok(config)
    }

    /// Applies `BAZAAR_*` overrides read through `var`.
    fn apply_overrides<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = var("BAZAAR_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Some(port) = var("BAZAAR_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BAZAAR_PORT".to_string()))?;
        }

        if let Some(path) = var("BAZAAR_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(secret) = var("BAZAAR_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Some(limit) = var("BAZAAR_INVOICE_RETRY_LIMIT") {
            self.engine.invoice_retry_limit = limit.parse().map_err(|_| {
                ConfigError::InvalidValue("BAZAAR_INVOICE_RETRY_LIMIT".to_string())
            })?;
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue("server.port".to_string()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections".to_string(),
            ));
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::InvalidValue("auth.jwt_secret".to_string()));
        }

        if self.auth.token_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "auth.token_lifetime_secs".to_string(),
            ));
        }

        self.engine.validate()?;
        Ok(())
    }

    /// `bind_addr:port`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind_addr, self.server.port)
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bazaar", "pos")
            .map(|dirs| dirs.config_dir().join("api.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = ApiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let config: ApiConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [engine]
            invoice_retry_limit = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr, "127.0.0.1");
        assert_eq!(config.engine.invoice_retry_limit, 2);
        assert_eq!(config.engine.hook_timeout_ms, 2000);
        assert_eq!(config.auth.jwt_secret, DEV_JWT_SECRET);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("BAZAAR_PORT", "9100"),
            ("BAZAAR_DATABASE_PATH", "/tmp/other.db"),
            ("BAZAAR_JWT_SECRET", "s3cret"),
            ("BAZAAR_INVOICE_RETRY_LIMIT", "9"),
        ]
        .into_iter()
        .collect();

        let mut config = ApiConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.database.path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.engine.invoice_retry_limit, 9);
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = ApiConfig::default();
        let err = config
            .apply_overrides(|k| (k == "BAZAAR_PORT").then(|| "not-a-port".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref v) if v == "BAZAAR_PORT"));
    }

    #[test]
    fn test_validation() {
        let mut config = ApiConfig::default();
        config.auth.jwt_secret.clear();
        assert!(config.validate().is_err());

        let mut config = ApiConfig::default();
        config.engine.transaction_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Engine(_))));
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.toml");
        std::fs::write(&path, "[database]\nmax_connections = 3\n").unwrap();

        let config = ApiConfig::load(Some(path)).unwrap();
        assert_eq!(config.database.max_connections, 3);
    }
}
