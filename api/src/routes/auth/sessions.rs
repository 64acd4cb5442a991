use actix_web::{web, HttpResponse};
use gk_core::repositories::TokenRepository;

use crate::app::AppState;
use crate::dto::auth::{SessionDto, SessionsResponse};
use crate::handlers::error::ApiError;
use crate::middleware::auth::AuthContext;

/// Handler for GET /api/v1/auth/sessions
///
/// Lists the caller's live tokens, newest first.
pub async fn list_sessions<R>(
    state: web::Data<AppState<R>>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError>
where
    R: TokenRepository + 'static,
{
    let records = state
        .token_service
        .active_sessions(auth.user_id())
        .await
        .map_err(|err| ApiError::from_token_error(&state.realm, err))?;

    let sessions = records
        .into_iter()
        .map(|record| SessionDto::from_record(record, auth.jti()))
        .collect();

    Ok(HttpResponse::Ok().json(SessionsResponse { sessions }))
}
