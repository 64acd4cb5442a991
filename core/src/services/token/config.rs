//! Configuration for the token service

use chrono::Duration;
use jsonwebtoken::Algorithm;

use gk_shared::config::JwtConfig;

use crate::domain::entities::token::TokenKind;
use crate::errors::DomainError;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// JWT signing algorithm, one of the HMAC family
    pub algorithm: Algorithm,
    /// Default access token lifetime
    pub access_token_ttl: Duration,
    /// Default refresh token lifetime
    pub refresh_token_ttl: Duration,
    /// `iss` written on encode and required on decode
    pub issuer: Option<String>,
    /// `aud` written on encode
    pub audience: Option<String>,
    /// Audiences accepted on decode; `audience` is used when empty
    pub allowed_audiences: Vec<String>,
    /// Clock skew tolerated on `exp`, in seconds
    pub leeway: u64,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret-please-change-in-production".to_string(),
            algorithm: Algorithm::HS256,
            access_token_ttl: Duration::minutes(30),
            refresh_token_ttl: Duration::days(7),
            issuer: Some("gatekeeper".to_string()),
            audience: Some("gatekeeper-api".to_string()),
            allowed_audiences: Vec::new(),
            leeway: 0,
        }
    }
}

impl TokenServiceConfig {
    /// Default configuration signed with `secret`
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            ..Default::default()
        }
    }

    /// Default lifetime for a token kind
    pub fn ttl_for(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_token_ttl,
            TokenKind::Refresh => self.refresh_token_ttl,
        }
    }

    /// Audiences a decoded token may carry
    pub fn accepted_audiences(&self) -> Vec<String> {
        if self.allowed_audiences.is_empty() {
            self.audience.iter().cloned().collect()
        } else {
            self.allowed_audiences.clone()
        }
    }
}

impl TryFrom<&JwtConfig> for TokenServiceConfig {
    type Error = DomainError;

    fn try_from(config: &JwtConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            jwt_secret: config.secret.clone(),
            algorithm: parse_algorithm(&config.algorithm)?,
            access_token_ttl: lifetime("access_token_expiry", config.access_token_expiry)?,
            refresh_token_ttl: lifetime("refresh_token_expiry", config.refresh_token_expiry)?,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            allowed_audiences: config.allowed_audiences.clone(),
            leeway: config.leeway,
        })
    }
}

fn lifetime(name: &str, seconds: i64) -> Result<Duration, DomainError> {
    Duration::try_seconds(seconds).ok_or_else(|| DomainError::Configuration {
        message: format!("{} of {} seconds is out of range", name, seconds),
    })
}

/// Parses an HMAC algorithm name
pub fn parse_algorithm(name: &str) -> Result<Algorithm, DomainError> {
    match name.to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(DomainError::Configuration {
            message: format!("unsupported signing algorithm `{}`", other),
        }),
    }
}
