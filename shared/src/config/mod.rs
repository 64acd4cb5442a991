//! Configuration module with business-specific sub-modules
//!
//! - `auth` - JWT signing, lifetimes and audience/issuer settings
//! - `database` - MySQL connection pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `server` - HTTP server and CORS configuration
//!
//! [`AppConfig::load`] layers built-in defaults, optional TOML files and
//! `GK__SECTION__KEY` environment variables, in that order.

pub mod auth;
pub mod database;
pub mod environment;
pub mod server;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use auth::{AuthConfig, JwtConfig};
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use server::{CorsConfig, ServerConfig};

/// Prefix for environment variable overrides, e.g. `GK__AUTH__JWT__SECRET`
pub const ENV_PREFIX: &str = "GK";

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Defaults tuned for an environment
    pub fn for_environment(environment: Environment) -> Self {
        let server = match environment {
            Environment::Development => ServerConfig {
                host: String::from("127.0.0.1"),
                cors: CorsConfig::development(),
                ..Default::default()
            },
            _ => ServerConfig::default(),
        };

        Self {
            environment,
            server,
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load configuration from the working directory and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."))
    }

    /// Load configuration, looking for TOML files in `config_dir`
    ///
    /// Sources, lowest priority first:
    /// 1. Defaults for the environment named by `ENVIRONMENT`
    /// 2. `config.toml`
    /// 3. `config.<environment>.toml`
    /// 4. `GK__SECTION__KEY` environment variables
    pub fn load_from(config_dir: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let environment = Environment::from_env().map_err(ConfigError::Invalid)?;
        let settings = Self::file_sources(config_dir, environment)?
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_settings(settings)
    }

    /// Load configuration from defaults and TOML files only
    pub fn load_files(config_dir: &Path, environment: Environment) -> Result<Self, ConfigError> {
        Self::from_settings(Self::file_sources(config_dir, environment)?.build()?)
    }

    fn file_sources(
        config_dir: &Path,
        environment: Environment,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let defaults = config::Config::try_from(&Self::for_environment(environment))?;

        Ok(config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(config_dir.join("config.toml")).required(false))
            .add_source(
                config::File::from(PathBuf::from(config_dir).join(environment.config_file()))
                    .required(false),
            ))
    }

    fn from_settings(settings: config::Config) -> Result<Self, ConfigError> {
        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server must not start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let jwt = &self.auth.jwt;

        if jwt.secret.trim().is_empty() {
            return Err(ConfigError::Invalid("auth.jwt.secret must not be empty".into()));
        }
        if self.environment.is_production() && jwt.is_using_default_secret() {
            return Err(ConfigError::Invalid(
                "auth.jwt.secret must be set explicitly in production".into(),
            ));
        }
        if jwt.access_token_expiry <= 0 || jwt.refresh_token_expiry <= 0 {
            return Err(ConfigError::Invalid("token lifetimes must be positive".into()));
        }

        Ok(())
    }
}
