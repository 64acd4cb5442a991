use std::{sync::Arc, time::Duration};

use actix_web::{web, HttpServer};
use anyhow::Context;
use gk_api::{create_app, telemetry::init_tracing, AppState};
use gk_core::services::token::{TokenService, TokenServiceConfig};
use gk_infra::database::{DatabasePool, MySqlTokenRepository};
use gk_shared::config::AppConfig;
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging)?;

    info!(environment = %config.environment, "Starting Gatekeeper");
    if config.auth.jwt.is_using_default_secret() {
        warn!("Using the default JWT secret; set GK__AUTH__JWT__SECRET");
    }

    let pool = DatabasePool::new(config.database.clone())
        .await
        .context("failed to connect to the token database")?;
    info!(pool = %pool.get_statistics(), "Database pool ready");

    let repository = MySqlTokenRepository::new(pool.get_pool().clone());
    let token_config = TokenServiceConfig::try_from(&config.auth.jwt)?;
    let token_service = Arc::new(TokenService::new(repository, token_config)?);

    let state = web::Data::new(
        AppState::new(token_service)
            .with_database(pool.clone())
            .with_realm(config.auth.realm.clone()),
    );

    let server_config = config.server.clone();
    let bind_address = server_config.bind_address();
    info!("Starting HTTP server at {}", bind_address);

    let mut server = HttpServer::new(move || create_app(state.clone(), &server_config))
        .keep_alive(Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    let result = server.bind(&bind_address)?.run().await;

    info!("Server shutting down, closing database pool");
    pool.close().await;

    result.context("HTTP server failed")
}
