//! Domain layer containing authentication entities.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
