//! Server configuration.

use agora_core::{Identity, RoleLabel};
use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Service name.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Server host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Debug mode.
    #[serde(default)]
    pub debug: bool,

    /// Token configuration.
    #[serde(default)]
    pub token: TokenSettings,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Users installed in the directory at startup.
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

/// Token configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenSettings {
    /// Signing secret.
    #[serde(default = "default_token_secret")]
    pub secret: String,

    /// Token issuer.
    #[serde(default = "default_service_name")]
    pub issuer: String,

    /// Access token lifetime in minutes.
    #[serde(default = "default_access_token_expire_minutes")]
    pub access_token_expire_minutes: i64,

    /// Refresh token lifetime in days.
    #[serde(default = "default_refresh_token_expire_days")]
    pub refresh_token_expire_days: i64,
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            secret: default_token_secret(),
            issuer: default_service_name(),
            access_token_expire_minutes: default_access_token_expire_minutes(),
            refresh_token_expire_days: default_refresh_token_expire_days(),
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format (json, pretty).
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

/// User installed at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedUser {
    /// User key.
    pub key: String,
    /// Role label.
    pub role: RoleLabel,
}

impl From<SeedUser> for Identity {
    fn from(seed: SeedUser) -> Self {
        Identity::new(seed.key, seed.role)
    }
}

/// Longest accepted access token lifetime (one day).
pub const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 24 * 60;

/// Longest accepted refresh token lifetime.
pub const MAX_REFRESH_TOKEN_EXPIRE_DAYS: i64 = 365;

fn default_service_name() -> String {
    "agora".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_token_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_access_token_expire_minutes() -> i64 {
    30
}

fn default_refresh_token_expire_days() -> i64 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl ServerConfig {
    /// Loads configuration from files and environment.
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .set_default("service_name", default_service_name())?
            .set_default("host", default_host())?
            .set_default("port", default_port())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("AGORA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let server_config: ServerConfig = config.try_deserialize()?;
        server_config.validate()?;

        Ok(server_config)
    }

    /// Validates the configuration.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("Invalid port: 0");
        }

        if self.token.secret.is_empty() {
            anyhow::bail!("Token secret must not be empty");
        }

        let access = self.token.access_token_expire_minutes;
        if !(1..=MAX_ACCESS_TOKEN_EXPIRE_MINUTES).contains(&access) {
            anyhow::bail!(
                "Access token lifetime must be between 1 and {} minutes, got {}",
                MAX_ACCESS_TOKEN_EXPIRE_MINUTES,
                access
            );
        }

        let refresh = self.token.refresh_token_expire_days;
        if !(1..=MAX_REFRESH_TOKEN_EXPIRE_DAYS).contains(&refresh) {
            anyhow::bail!(
                "Refresh token lifetime must be between 1 and {} days, got {}",
                MAX_REFRESH_TOKEN_EXPIRE_DAYS,
                refresh
            );
        }

        Ok(())
    }

    /// Returns true when the built-in token secret is used outside debug mode.
    pub fn uses_default_secret(&self) -> bool {
        !self.debug && self.token.secret == default_token_secret()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            host: default_host(),
            port: default_port(),
            debug: false,
            token: TokenSettings::default(),
            telemetry: TelemetryConfig::default(),
            users: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.token.access_token_expire_minutes, 30);
        assert_eq!(config.token.refresh_token_expire_days, 7);
        assert!(!config.debug);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ServerConfig::default();
        assert!(config.validate().is_ok());

        config.port = 0;
        assert!(config.validate().is_err());

        config.port = 8080;
        config.token.access_token_expire_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oversized_lifetimes_rejected() {
        let mut config = ServerConfig::default();
        config.token.access_token_expire_minutes = 1_000_000_000_000_000;
        assert!(config.validate().is_err());

        config.token.access_token_expire_minutes = MAX_ACCESS_TOKEN_EXPIRE_MINUTES;
        assert!(config.validate().is_ok());

        config.token.refresh_token_expire_days = MAX_REFRESH_TOKEN_EXPIRE_DAYS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_secret_detection() {
        let mut config = ServerConfig::default();
        assert!(config.uses_default_secret());

        config.debug = true;
        assert!(!config.uses_default_secret());

        config.debug = false;
        config.token.secret = "rotated".to_string();
        assert!(!config.uses_default_secret());
    }

    #[test]
    fn test_seed_users_deserialize() {
        let config: ServerConfig = serde_json::from_str(
            r#"{"users": [{"key": "root", "role": "super_admin"}]}"#,
        )
        .unwrap();

        let identity = Identity::from(config.users[0].clone());
        assert_eq!(identity.role, RoleLabel::SuperAdmin);
        assert_eq!(config.telemetry.log_format, "pretty");
    }
}
