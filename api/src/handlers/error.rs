//! Mapping of token and domain failures to HTTP responses
//!
//! Credential failures become `401` with a `WWW-Authenticate: Bearer`
//! challenge. Store failures become a bare `500` that carries no detail about
//! the presented credential.

use actix_web::{
    http::{header, header::HeaderValue, StatusCode},
    HttpResponse, ResponseError,
};
use gk_core::errors::{DomainError, InvalidTokenReason, TokenError};
use gk_shared::types::response::ErrorResponse;
use thiserror::Error;

/// Realm used when none is configured
pub const DEFAULT_REALM: &str = "api";

/// Errors returned by handlers, middleware and extractors
#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable bearer credential on the request
    #[error("Missing bearer credential")]
    MissingCredential { realm: String },

    /// The presented credential was rejected
    #[error("{message}")]
    InvalidCredential {
        realm: String,
        code: &'static str,
        message: String,
    },

    #[error("User account is not active")]
    InactiveUser,

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn missing_credential(realm: &str) -> Self {
        ApiError::MissingCredential {
            realm: realm.to_string(),
        }
    }

    /// Maps a token failure; persistence failures become `Internal`
    pub fn from_token_error(realm: &str, err: TokenError) -> Self {
        match err {
            TokenError::Persistence { message } => ApiError::Internal(message),
            other => ApiError::InvalidCredential {
                realm: realm.to_string(),
                code: other.code(),
                message: describe(&other),
            },
        }
    }

    pub fn from_domain_error(realm: &str, err: DomainError) -> Self {
        match err {
            DomainError::Token(token) => Self::from_token_error(realm, token),
            DomainError::Validation { message } => ApiError::BadRequest(message),
            DomainError::Configuration { message } | DomainError::Internal { message } => {
                ApiError::Internal(message)
            }
        }
    }

    /// 401 for a subject that no longer resolves to a user
    pub fn unknown_subject(realm: &str) -> Self {
        ApiError::InvalidCredential {
            realm: realm.to_string(),
            code: "INVALID_TOKEN",
            message: "Token subject is unknown".to_string(),
        }
    }

    fn challenge(&self) -> Option<String> {
        match self {
            ApiError::MissingCredential { realm } => {
                Some(format!("Bearer realm=\"{}\"", quote_safe(realm)))
            }
            ApiError::InvalidCredential { realm, message, .. } => Some(format!(
                "Bearer realm=\"{}\", error=\"invalid_token\", error_description=\"{}\"",
                quote_safe(realm),
                quote_safe(message)
            )),
            _ => None,
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            ApiError::MissingCredential { .. } => {
                ErrorResponse::new("INVALID_TOKEN", "Missing bearer credential")
            }
            ApiError::InvalidCredential { code, message, .. } => {
                ErrorResponse::new(*code, message.clone())
            }
            ApiError::InactiveUser => ErrorResponse::new("INACTIVE_USER", "User account is not active"),
            ApiError::BadRequest(message) => ErrorResponse::new("INVALID_REQUEST", message.clone()),
            ApiError::Internal(_) => {
                ErrorResponse::new("internal_error", "An internal error occurred")
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingCredential { .. } | ApiError::InvalidCredential { .. } => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::InactiveUser => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal(message) = self {
            tracing::error!(error = %message, "Request failed with internal error");
        }

        let mut response = HttpResponse::build(self.status_code());
        if let Some(value) = self
            .challenge()
            .and_then(|challenge| HeaderValue::from_str(&challenge).ok())
        {
            response.insert_header((header::WWW_AUTHENTICATE, value));
        }
        response.json(self.body())
    }
}

/// Client-facing description of a token failure
///
/// A store miss is reported like any other invalid token so the response
/// does not reveal whether a `jti` was ever issued.
fn describe(err: &TokenError) -> String {
    match err {
        TokenError::Invalid(InvalidTokenReason::Untracked(_)) => "Invalid token".to_string(),
        TokenError::Expired { .. } => "Token has expired".to_string(),
        TokenError::Revoked { .. } => "Token has been revoked".to_string(),
        other => other.to_string(),
    }
}

/// Strips characters that cannot appear in a quoted header parameter
fn quote_safe(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control() && *c != '"' && *c != '\\')
        .collect()
}
