//! Token and store error types
//!
//! `TokenError` is the closed set of ways a presented token can fail. Every
//! variant carries a stable machine code that the presentation layer maps to
//! an HTTP status.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Why a token was rejected as invalid
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidTokenReason {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("expected {expected} token, got {actual}")]
    WrongType { expected: String, actual: String },

    #[error("missing required claim `{0}`")]
    MissingClaim(&'static str),

    #[error("unknown token type `{0}`")]
    UnknownType(String),

    #[error("token {0} is not tracked")]
    Untracked(String),
}

/// Token validation and management failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token: {0}")]
    Invalid(InvalidTokenReason),

    #[error("Token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },

    #[error("Token {token_id} was revoked at {revoked_at}")]
    Revoked {
        token_id: String,
        revoked_at: DateTime<Utc>,
    },

    #[error("Token store failure: {message}")]
    Persistence { message: String },
}

impl TokenError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::Invalid(_) => "INVALID_TOKEN",
            TokenError::Expired { .. } => "EXPIRED_TOKEN",
            TokenError::Revoked { .. } => "REVOKED_TOKEN",
            TokenError::Persistence { .. } => "PERSISTENCE_FAILURE",
        }
    }

    /// Whether the failure says something about the credential itself,
    /// as opposed to the store behind it
    pub fn is_credential_error(&self) -> bool {
        !matches!(self, TokenError::Persistence { .. })
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        TokenError::Invalid(InvalidTokenReason::Malformed(detail.into()))
    }

    pub fn missing_claim(claim: &'static str) -> Self {
        TokenError::Invalid(InvalidTokenReason::MissingClaim(claim))
    }
}

impl From<InvalidTokenReason> for TokenError {
    fn from(reason: InvalidTokenReason) -> Self {
        TokenError::Invalid(reason)
    }
}

/// Errors returned by token store implementations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Token {token_id} already exists")]
    Duplicate { token_id: String },
}

impl From<RepositoryError> for TokenError {
    fn from(err: RepositoryError) -> Self {
        TokenError::Persistence {
            message: err.to_string(),
        }
    }
}
