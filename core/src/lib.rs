//! # Gatekeeper Core
//!
//! Domain layer of the Gatekeeper token authentication subsystem: token and
//! claim entities, the token codec, the token store contract with an
//! in-memory implementation, and the token service that ties them together.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
