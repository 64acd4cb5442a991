pub mod error;
pub mod health;

pub use error::{ApiError, DEFAULT_REALM};
