//! TOML-based configuration for the authentication service
//!
//! This module provides declarative configuration for the HTTP server and the
//! token authentication layer via a TOML file (`shop.toml`).
//!
//! The HMAC secret is never stored in the file itself: `[auth].secret_key_env`
//! names the environment variable that holds it. The secret is resolved once
//! at startup and handed to [`TokenCodec`](crate::auth::jwt::TokenCodec).

use crate::auth::jwt::MAX_TOKEN_LIFETIME_DAYS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Root configuration structure loaded from shop.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the token signing secret
    #[serde(default = "default_secret_key_env")]
    pub secret_key_env: String,

    /// How long an issued token stays valid
    #[serde(default = "default_token_lifetime_days")]
    pub token_lifetime_days: i64,

    /// Scheme expected in front of the token in the `Authorization` header
    #[serde(default = "default_header_prefix")]
    pub header_prefix: String,
}

fn default_secret_key_env() -> String {
    "SECRET_KEY".to_string()
}

fn default_token_lifetime_days() -> i64 {
    60
}

fn default_header_prefix() -> String {
    "Token".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key_env: default_secret_key_env(),
            token_lifetime_days: default_token_lifetime_days(),
            header_prefix: default_header_prefix(),
        }
    }
}

impl AuthConfig {
    /// Token lifetime as a duration, bounded to `1..=MAX_TOKEN_LIFETIME_DAYS` days
    pub fn token_lifetime(&self) -> Result<chrono::Duration, ConfigError> {
        let days = self.token_lifetime_days;
        if !(1..=MAX_TOKEN_LIFETIME_DAYS).contains(&days) {
            return Err(ConfigError::ValidationError(format!(
                "auth.token_lifetime_days must be between 1 and {}, got {}",
                MAX_TOKEN_LIFETIME_DAYS, days
            )));
        }

        chrono::Duration::try_days(days).ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "auth.token_lifetime_days is out of range: {}",
                days
            ))
        })
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading.
///
/// All of these are fatal at startup; none is produced while serving requests.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),

    #[error("Secret key is empty")]
    EmptySecret,
}

impl ShopConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: ShopConfig = toml::from_str(&content)?;

        config.validate()?;
        debug!("Loaded configuration from {:?}", path);

        Ok(config)
    }

    /// Validate the configuration for internal consistency and env var availability
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.token_lifetime()?;

        let prefix = &self.auth.header_prefix;
        if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "auth.header_prefix must be a single non-empty word, got {:?}",
                prefix
            )));
        }

        self.secret_key().map(|_| ())
    }

    /// Get the token signing secret from the environment
    pub fn secret_key(&self) -> Result<String, ConfigError> {
        let secret = std::env::var(&self.auth.secret_key_env)
            .map_err(|_| ConfigError::MissingEnvVar(self.auth.secret_key_env.clone()))?;

        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        Ok(secret)
    }

    /// Socket address the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_with_secret_env(env: &str) -> String {
        format!(
            r#"
[server]
host = "0.0.0.0"
port = 8080
log_level = "debug"
log_format = "json"

[auth]
secret_key_env = "{env}"
token_lifetime_days = 30
header_prefix = "Token"
"#
        )
    }

    #[test]
    fn test_parse_config() {
        let config: ShopConfig =
            toml::from_str(&config_with_secret_env("UNUSED")).expect("Failed to parse config");

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.auth.token_lifetime_days, 30);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config: ShopConfig = toml::from_str("").expect("empty config should parse");

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.log_format, LogFormat::Pretty);
        assert_eq!(config.auth.secret_key_env, "SECRET_KEY");
        assert_eq!(config.auth.token_lifetime_days, 60);
        assert_eq!(config.auth.header_prefix, "Token");
        assert_eq!(
            config.auth.token_lifetime().expect("default lifetime"),
            chrono::Duration::days(60)
        );
    }

    #[test]
    fn test_load_from_file() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("SHOP_TEST_LOAD_SECRET", "file-test-secret");
        }

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(config_with_secret_env("SHOP_TEST_LOAD_SECRET").as_bytes())
            .expect("write config");

        let config = ShopConfig::load(file.path()).expect("config should load");
        assert_eq!(config.secret_key().expect("secret"), "file-test-secret");
    }

    #[test]
    fn test_load_missing_file() {
        let result = ShopConfig::load("/definitely/not/here/shop.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"[server\nport = ").expect("write config");

        let result = ShopConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validation_missing_secret_env() {
        let config: ShopConfig =
            toml::from_str(&config_with_secret_env("SHOP_TEST_NEVER_SET_SECRET")).unwrap();

        let result = config.validate();
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref name)) if name == "SHOP_TEST_NEVER_SET_SECRET")
        );
    }

    #[test]
    fn test_validation_empty_secret() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("SHOP_TEST_EMPTY_SECRET", "");
        }
        let config: ShopConfig =
            toml::from_str(&config_with_secret_env("SHOP_TEST_EMPTY_SECRET")).unwrap();

        assert!(matches!(config.validate(), Err(ConfigError::EmptySecret)));
    }

    #[test]
    fn test_validation_rejects_non_positive_lifetime() {
        let mut config = ShopConfig::default();
        config.auth.token_lifetime_days = 0;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_oversized_lifetime() {
        let config: ShopConfig = toml::from_str(&format!(
            "[auth]\ntoken_lifetime_days = {}\n",
            i64::MAX
        ))
        .expect("should parse");

        assert!(matches!(
            config.auth.token_lifetime(),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = ShopConfig::default();
        config.auth.token_lifetime_days = MAX_TOKEN_LIFETIME_DAYS + 1;
        assert!(config.auth.token_lifetime().is_err());

        config.auth.token_lifetime_days = MAX_TOKEN_LIFETIME_DAYS;
        assert_eq!(
            config.auth.token_lifetime().expect("lifetime at the limit"),
            chrono::Duration::days(MAX_TOKEN_LIFETIME_DAYS)
        );
    }

    #[test]
    fn test_validation_rejects_prefix_with_whitespace() {
        let mut config = ShopConfig::default();
        config.auth.header_prefix = "Token Bearer".to_string();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        config.auth.header_prefix = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
