//! Domain entities representing core authentication objects.

pub mod claims;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use claims::{ClaimSet, CustomClaims, TokenPayload, MAX_CUSTOM_CLAIMS, RESERVED_CLAIMS};
pub use token::{TokenKind, TokenPair, TokenRecord};
pub use user::User;
