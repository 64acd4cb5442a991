pub mod auth;
pub mod cors;

pub use auth::{
    extract_bearer_token, AccessTokenValidator, ActiveUser, AuthContext, JwtAuth,
    JwtAuthMiddleware, OptionalAuth,
};
pub use cors::create_cors;
