//! Authentication route handlers
//!
//! Thin wrappers over the token service:
//! - Token refresh
//! - Logout of the current session
//! - Logout of every session
//! - Listing live sessions

pub mod logout;
pub mod refresh;
pub mod sessions;

use gk_core::errors::TokenError;
use serde::de::DeserializeOwned;

use crate::handlers::error::ApiError;

/// Parses an optional JSON body
///
/// Only an empty body counts as absent. Anything else must parse, whatever
/// the declared content type, so a request field is never silently dropped.
pub(crate) fn optional_json<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| ApiError::BadRequest(format!("Invalid request body: {}", err)))
}

/// Maps a failure on a token supplied in a request body
///
/// The body token is not the request's credential, so validity failures are
/// a bad request rather than a `401`.
pub(crate) fn body_token_error(err: TokenError) -> ApiError {
    match err {
        TokenError::Persistence { message } => ApiError::Internal(message),
        other => ApiError::BadRequest(format!("Invalid refresh token: {}", other.code())),
    }
}
