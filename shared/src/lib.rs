//! Shared configuration and common types for the Gatekeeper server
//!
//! This crate provides functionality used across all server crates:
//! - Configuration types and the layered configuration loader
//! - The JSON error envelope returned by the HTTP layer

pub mod config;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, ConfigError, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    LogFormat, LoggingConfig, ServerConfig,
};
pub use types::{ErrorResponse, HealthResponse, HealthStatus};
