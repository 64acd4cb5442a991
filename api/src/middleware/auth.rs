//! Bearer authentication middleware for protecting API endpoints.
//!
//! The middleware extracts the bearer credential from the `Authorization`
//! header, validates it as an access token against the token store and, when
//! a [`UserLookup`] is configured, resolves the token's subject into a user.
//! The result is injected into the request as an [`AuthContext`].
//!
//! Rejections are rendered by [`ApiError`]: validity failures become `401`
//! with a `WWW-Authenticate` challenge, store failures become `500`.

use actix_web::{
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use async_trait::async_trait;
use futures_util::future::LocalBoxFuture;
use gk_core::{
    domain::entities::{TokenKind, TokenPayload, User},
    errors::TokenError,
    repositories::{TokenRepository, UserLookup},
    services::token::TokenService,
};
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
};
use tracing::{debug, error, warn};

use crate::handlers::error::{ApiError, DEFAULT_REALM};

/// Validates access tokens on behalf of the middleware
///
/// Implemented for every [`TokenService`], so the middleware does not need to
/// know which token store backs the service.
#[async_trait]
pub trait AccessTokenValidator: Send + Sync {
    async fn validate_access(&self, token: &str) -> Result<TokenPayload, TokenError>;
}

#[async_trait]
impl<R> AccessTokenValidator for TokenService<R>
where
    R: TokenRepository + 'static,
{
    async fn validate_access(&self, token: &str) -> Result<TokenPayload, TokenError> {
        self.validate(token, Some(TokenKind::Access)).await
    }
}

/// Authentication context injected into requests
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Claims of the validated access token
    pub claims: TokenPayload,
    /// Resolved user, when a user lookup is configured
    pub user: Option<User>,
    /// The presented access token
    pub token: String,
}

impl AuthContext {
    /// The token subject
    pub fn user_id(&self) -> &str {
        &self.claims.sub
    }

    /// The access token's `jti`
    pub fn jti(&self) -> &str {
        &self.claims.jti
    }
}

/// Bearer authentication middleware factory
#[derive(Clone)]
pub struct JwtAuth {
    validator: Arc<dyn AccessTokenValidator>,
    user_lookup: Option<Arc<dyn UserLookup>>,
    realm: String,
}

impl JwtAuth {
    /// Creates the middleware around an access token validator
    pub fn new(validator: Arc<dyn AccessTokenValidator>) -> Self {
        Self {
            validator,
            user_lookup: None,
            realm: DEFAULT_REALM.to_string(),
        }
    }

    /// Resolve each token's subject through `lookup`
    pub fn with_user_lookup(mut self, lookup: Arc<dyn UserLookup>) -> Self {
        self.user_lookup = Some(lookup);
        self
    }

    /// Realm advertised in the `WWW-Authenticate` challenge
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Validates `token` and resolves its subject
    pub async fn authenticate(&self, token: String) -> Result<AuthContext, ApiError> {
        let claims = self
            .validator
            .validate_access(&token)
            .await
            .map_err(|err| ApiError::from_token_error(&self.realm, err))?;

        let user = match &self.user_lookup {
            None => None,
            Some(lookup) => match lookup.find_user(&claims.sub).await {
                Ok(Some(user)) => Some(user),
                Ok(None) => {
                    warn!(sub = %claims.sub, jti = %claims.jti, "Token subject does not resolve to a user");
                    return Err(ApiError::unknown_subject(&self.realm));
                }
                Err(err) => {
                    error!(sub = %claims.sub, error = %err, "User lookup failed");
                    return Err(ApiError::Internal(err.to_string()));
                }
            },
        };

        debug!(sub = %claims.sub, jti = %claims.jti, "Request authenticated");
        Ok(AuthContext { claims, user, token })
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            auth: Rc::new(self.clone()),
        }))
    }
}

/// Bearer authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    auth: Rc<JwtAuth>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let auth = Rc::clone(&self.auth);

        Box::pin(async move {
            let token = match extract_bearer_token(req.headers()) {
                Some(token) => token,
                None => {
                    let err = ApiError::missing_credential(auth.realm());
                    return Ok(req.error_response(err).map_into_right_body());
                }
            };

            match auth.authenticate(token).await {
                Ok(context) => {
                    req.extensions_mut().insert(context);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(err) => Ok(req.error_response(err).map_into_right_body()),
            }
        })
    }
}

/// Extracts the credential of a `Bearer` Authorization header
///
/// The scheme is matched case-insensitively; an empty credential is treated
/// as absent.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, credential) = value.trim().split_once(' ')?;
    let credential = credential.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || credential.is_empty() {
        return None;
    }
    Some(credential.to_string())
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::missing_credential(DEFAULT_REALM).into());

        ready(result)
    }
}

/// Extractor for optional authentication
pub struct OptionalAuth(pub Option<AuthContext>);

impl FromRequest for OptionalAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let auth = req.extensions().get::<AuthContext>().cloned();
        ready(Ok(OptionalAuth(auth)))
    }
}

/// Extractor requiring an authenticated, active user
///
/// Needs [`JwtAuth`] configured with a user lookup. A disabled account is
/// refused with `403`.
pub struct ActiveUser(pub User);

impl FromRequest for ActiveUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let extensions = req.extensions();
        let result = match extensions.get::<AuthContext>() {
            None => Err(ApiError::missing_credential(DEFAULT_REALM)),
            Some(AuthContext { user: None, .. }) => Err(ApiError::Internal(
                "active user required but no user lookup is configured".to_string(),
            )),
            Some(AuthContext { user: Some(user), .. }) if !user.is_active => {
                warn!(sub = %user.id, "Inactive user refused");
                Err(ApiError::InactiveUser)
            }
            Some(AuthContext { user: Some(user), .. }) => Ok(ActiveUser(user.clone())),
        };

        ready(result.map_err(Error::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    fn headers_with(value: &str) -> HeaderMap {
        let req = test::TestRequest::default()
            .insert_header((AUTHORIZATION, value))
            .to_http_request();
        req.headers().clone()
    }

    #[::core::prelude::v1::test]
    fn test_extract_bearer_token() {
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer test_token_123")),
            Some("test_token_123".to_string())
        );
        assert_eq!(
            extract_bearer_token(&headers_with("bearer abc")),
            Some("abc".to_string())
        );

        assert_eq!(extract_bearer_token(&headers_with("test_token_123")), None);
        assert_eq!(extract_bearer_token(&headers_with("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer_token(&headers_with("Bearer   ")), None);

        let req = test::TestRequest::default().to_http_request();
        assert_eq!(extract_bearer_token(req.headers()), None);
    }

    #[actix_web::test]
    async fn test_auth_context_extractor_requires_context() {
        let req = test::TestRequest::default().to_http_request();
        let result = AuthContext::extract(&req).await;
        assert!(result.is_err());

        let OptionalAuth(auth) = OptionalAuth::extract(&req).await.unwrap();
        assert!(auth.is_none());
    }
}
