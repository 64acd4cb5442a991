use actix_web::{web, HttpResponse};
use gk_core::repositories::TokenRepository;

use crate::app::AppState;
use crate::dto::auth::{RefreshTokenRequest, RefreshTokenResponse};
use crate::handlers::error::ApiError;

/// Handler for POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new access token. The refresh token is
/// not rotated.
///
/// # Request Body
///
/// ```json
/// {
///     "refresh_token": "string"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "access_token": "eyJ...",
///     "token_type": "bearer",
///     "expires_in": 1800
/// }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Invalid, expired or revoked refresh token
/// - 500 Internal Server Error: Token store unavailable
pub async fn refresh_token<R>(
    state: web::Data<AppState<R>>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, ApiError>
where
    R: TokenRepository + 'static,
{
    let service = &state.token_service;
    let access_token = service
        .refresh(&request.refresh_token)
        .await
        .map_err(|err| ApiError::from_domain_error(&state.realm, err))?;

    let expires_in = service.config().access_token_ttl.num_seconds();
    Ok(HttpResponse::Ok().json(RefreshTokenResponse::bearer(access_token, expires_in)))
}
