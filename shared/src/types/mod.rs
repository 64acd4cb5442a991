//! Type definitions shared between crates
//!
//! - `response` - error envelope and health check payloads

pub mod response;

pub use response::{ErrorResponse, HealthResponse, HealthStatus};
