use std::env;

use auth::AuthSettings;
use auth::DEFAULT_ACCESS_TOKEN_TTL_MINUTES;
use auth::DEFAULT_REFRESH_TOKEN_TTL_DAYS;
use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::principal::models::SessionMode;
use crate::principal::models::ADMIN_ROLE;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub seed: Option<SeedConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Signing material and lifetimes for access and refresh tokens.
#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    #[serde(default)]
    pub key: String,
    pub issuer: String,
    pub audience: String,
    #[serde(default = "default_access_token_ttl_minutes")]
    pub access_token_ttl_minutes: i64,
    #[serde(default = "default_refresh_token_ttl_days")]
    pub refresh_token_ttl_days: i64,
}

/// Request authentication settings.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default)]
    pub mode: SessionMode,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
    #[serde(default)]
    pub secure_cookies: bool,
}

/// Bootstrap administrator created at startup when missing.
#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_full_name")]
    pub admin_full_name: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
}

fn default_access_token_ttl_minutes() -> i64 {
    DEFAULT_ACCESS_TOKEN_TTL_MINUTES
}

fn default_refresh_token_ttl_days() -> i64 {
    DEFAULT_REFRESH_TOKEN_TTL_DAYS
}

fn default_login_path() -> String {
    "/auth/login".to_string()
}

pub fn default_public_paths() -> Vec<String> {
    [
        "/auth/login",
        "/auth/register",
        "/auth/refresh-token",
        "/",
        "/home",
        "/home/privacy",
        "/css/",
        "/js/",
        "/lib/",
        "/favicon.ico",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_email() -> String {
    "admin@bacha.local".to_string()
}

fn default_admin_full_name() -> String {
    "System Administrator".to_string()
}

fn default_admin_password() -> String {
    "123".to_string()
}

fn default_admin_role() -> String {
    ADMIN_ROLE.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: SessionMode::default(),
            login_path: default_login_path(),
            public_paths: default_public_paths(),
            secure_cookies: false,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            admin_email: default_admin_email(),
            admin_full_name: default_admin_full_name(),
            admin_password: default_admin_password(),
            admin_role: default_admin_role(),
        }
    }
}

impl JwtConfig {
    /// Settings for the authenticator built from this section.
    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            signing_key: self.key.clone(),
            issuer: self.issuer.clone(),
            audience: self.audience.clone(),
            access_token_ttl: Duration::minutes(self.access_token_ttl_minutes),
            refresh_token_ttl: Duration::days(self.refresh_token_ttl_days),
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__KEY, DATABASE__URL, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        Self::load_layered(&run_mode, Self::environment())
    }

    /// Unprefixed variables with __ as separator. Example: JWT__KEY=... overrides jwt.key
    fn environment() -> Environment {
        Environment::default().separator("__")
    }

    fn load_layered(run_mode: &str, environment: Environment) -> Result<Self, ConfigError> {
        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(environment)
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject configurations the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.key.trim().is_empty() {
            return Err(ConfigError::Message(
                "jwt.key is required (set JWT__KEY)".to_string(),
            ));
        }
        if self.jwt.access_token_ttl_minutes <= 0 || self.jwt.refresh_token_ttl_days <= 0 {
            return Err(ConfigError::Message(
                "jwt token lifetimes must be positive".to_string(),
            ));
        }
        if !self.session.login_path.starts_with('/') {
            return Err(ConfigError::Message(
                "session.login_path must be an absolute path".to_string(),
            ));
        }
        Ok(())
    }
}
