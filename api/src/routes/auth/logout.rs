use actix_web::{web, HttpResponse};
use gk_core::{
    domain::entities::TokenKind, errors::TokenError, repositories::TokenRepository,
};
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::dto::auth::{LogoutAllRequest, LogoutAllResponse, LogoutRequest, LogoutResponse};
use crate::handlers::error::ApiError;
use crate::middleware::auth::AuthContext;

use super::{body_token_error, optional_json};

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the access token that authenticated the request and, when given,
/// a refresh token of the same user.
///
/// # Request Body (optional)
///
/// ```json
/// {
///     "refresh_token": "string"
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: Unparseable body, or a refresh token that is invalid,
///   untracked or belongs to someone else. Nothing is revoked.
/// - 401 Unauthorized: Missing or rejected access token
/// - 500 Internal Server Error: Token store unavailable
pub async fn logout<R>(
    state: web::Data<AppState<R>>,
    auth: AuthContext,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError>
where
    R: TokenRepository + 'static,
{
    let service = &state.token_service;
    let request: LogoutRequest = optional_json(&body)?;

    // Check the body token completely before revoking anything
    let mut revoke_refresh = None;
    if let Some(token) = request.refresh_token.as_deref() {
        let payload = service.inspect(token).map_err(body_token_error)?;
        if payload.kind != TokenKind::Refresh || payload.sub != auth.user_id() {
            warn!(sub = %auth.user_id(), jti = %payload.jti, "Logout with a foreign refresh token");
            return Err(ApiError::BadRequest(
                "Refresh token does not belong to the caller".to_string(),
            ));
        }

        match service.validate(token, Some(TokenKind::Refresh)).await {
            Ok(_) => revoke_refresh = Some(token),
            Err(TokenError::Expired { .. }) | Err(TokenError::Revoked { .. }) => {
                debug!(jti = %payload.jti, "Refresh token already unusable");
            }
            Err(err) => return Err(body_token_error(err)),
        }
    }

    if let Some(token) = revoke_refresh {
        service.revoke(token).await.map_err(body_token_error)?;
    }

    service
        .revoke(&auth.token)
        .await
        .map_err(|err| ApiError::from_token_error(&state.realm, err))?;

    info!(sub = %auth.user_id(), jti = %auth.jti(), "User logged out");
    Ok(HttpResponse::Ok().json(LogoutResponse {
        message: "Logged out".to_string(),
    }))
}

/// Handler for POST /api/v1/auth/logout-all
///
/// Revokes every live token of the caller. With `keep_current` the access
/// token used for this request survives.
pub async fn logout_all<R>(
    state: web::Data<AppState<R>>,
    auth: AuthContext,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError>
where
    R: TokenRepository + 'static,
{
    let request: LogoutAllRequest = optional_json(&body)?;
    let exclude = request.keep_current.then(|| auth.jti());

    let revoked = state
        .token_service
        .revoke_all_for_user(auth.user_id(), exclude)
        .await
        .map_err(|err| ApiError::from_token_error(&state.realm, err))?;

    Ok(HttpResponse::Ok().json(LogoutAllResponse { revoked }))
}
