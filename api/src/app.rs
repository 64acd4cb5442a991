//! Application state and factory
//!
//! This module holds the state shared by the handlers and provides the
//! factory for creating the Actix-web application.

use std::sync::Arc;

use actix_web::{
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error, HttpResponse,
};
use gk_core::{
    repositories::{TokenRepository, UserLookup},
    services::token::TokenService,
};
use gk_infra::database::DatabasePool;
use gk_shared::{config::ServerConfig, types::response::ErrorResponse};
use tracing_actix_web::TracingLogger;

use crate::handlers::error::DEFAULT_REALM;
use crate::middleware::{auth::JwtAuth, cors::create_cors};
use crate::routes;

/// State shared by all handlers
pub struct AppState<R: TokenRepository> {
    pub token_service: Arc<TokenService<R>>,
    /// Resolves token subjects into users for the auth middleware
    pub user_lookup: Option<Arc<dyn UserLookup>>,
    /// Pool probed by the health check
    pub database: Option<DatabasePool>,
    /// Realm advertised in `WWW-Authenticate` challenges
    pub realm: String,
}

impl<R> AppState<R>
where
    R: TokenRepository + 'static,
{
    pub fn new(token_service: Arc<TokenService<R>>) -> Self {
        Self {
            token_service,
            user_lookup: None,
            database: None,
            realm: DEFAULT_REALM.to_string(),
        }
    }

    pub fn with_user_lookup(mut self, lookup: Arc<dyn UserLookup>) -> Self {
        self.user_lookup = Some(lookup);
        self
    }

    pub fn with_database(mut self, pool: DatabasePool) -> Self {
        self.database = Some(pool);
        self
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Authentication middleware backed by this state's token service
    pub fn jwt_auth(&self) -> JwtAuth {
        let auth = JwtAuth::new(self.token_service.clone()).with_realm(self.realm.clone());
        match &self.user_lookup {
            Some(lookup) => auth.with_user_lookup(Arc::clone(lookup)),
            None => auth,
        }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app<R>(
    app_state: web::Data<AppState<R>>,
    server: &ServerConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = Error,
        InitError = (),
    >,
>
where
    R: TokenRepository + 'static,
{
    let jwt = app_state.jwt_auth();

    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().limit(server.max_payload_size))
        // Registered last runs first: tracing wraps CORS
        .wrap(create_cors(&server.cors))
        .wrap(TracingLogger::default())
        .configure(|cfg| routes::configure::<R>(cfg, jwt))
        .default_service(web::route().to(not_found))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        "not_found",
        "The requested resource was not found",
    ))
}
