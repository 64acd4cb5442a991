//! # Gatekeeper API
//!
//! actix-web surface of the token subsystem: the bearer authentication
//! middleware and extractors, the error-to-response mapping, and thin routes
//! over the token service.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::{create_app, AppState};
