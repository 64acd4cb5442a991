//! Route registration

pub mod auth;

use actix_web::web;
use gk_core::repositories::TokenRepository;

use crate::handlers::health::health_check;
use crate::middleware::auth::JwtAuth;

/// Registers `/health` and the `/api/v1/auth` routes
///
/// `jwt` guards every route that needs the caller's access token.
pub fn configure<R>(cfg: &mut web::ServiceConfig, jwt: JwtAuth)
where
    R: TokenRepository + 'static,
{
    cfg.route("/health", web::get().to(health_check::<R>)).service(
        web::scope("/api/v1").service(
            web::scope("/auth")
                .route("/refresh", web::post().to(auth::refresh::refresh_token::<R>))
                .route(
                    "/logout",
                    web::post()
                        .to(auth::logout::logout::<R>)
                        .wrap(jwt.clone()),
                )
                .route(
                    "/logout-all",
                    web::post()
                        .to(auth::logout::logout_all::<R>)
                        .wrap(jwt.clone()),
                )
                .route(
                    "/sessions",
                    web::get()
                        .to(auth::sessions::list_sessions::<R>)
                        .wrap(jwt),
                ),
        ),
    );
}
