use actix_web::{web, HttpResponse};
use gk_core::repositories::TokenRepository;
use gk_shared::types::response::{HealthResponse, HealthStatus};
use tracing::warn;

use crate::app::AppState;

/// Handler for GET /health
///
/// Pings the database when a pool is configured; an unreachable store
/// answers `503` with a degraded status.
pub async fn health_check<R>(state: web::Data<AppState<R>>) -> HttpResponse
where
    R: TokenRepository + 'static,
{
    let mut health = HealthResponse::new("gatekeeper", env!("CARGO_PKG_VERSION"));

    if let Some(pool) = &state.database {
        let status = match pool.health_check().await {
            Ok(true) => HealthStatus::Healthy,
            Ok(false) => HealthStatus::Unhealthy,
            Err(err) => {
                warn!(error = %err, "Database health check failed");
                HealthStatus::Unhealthy
            }
        };
        health = health.with_database(status);
    }

    if health.status == HealthStatus::Healthy {
        HttpResponse::Ok().json(health)
    } else {
        HttpResponse::ServiceUnavailable().json(health)
    }
}
