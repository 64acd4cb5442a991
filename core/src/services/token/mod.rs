//! Token service module for JWT management
//!
//! This module handles all token-related operations including:
//! - JWT encoding and decoding (`codec`)
//! - Issuance backed by a persisted record per token
//! - Validation against the record (revocation)
//! - Refresh, revoke and revoke-all

mod codec;
mod config;
mod service;

#[cfg(test)]
mod tests;

pub use codec::{DecodeOptions, TokenCodec};
pub use config::{parse_algorithm, TokenServiceConfig};
pub use service::TokenService;
