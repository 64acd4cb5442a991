//! Main token service implementation

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use crate::domain::entities::claims::{ClaimSet, TokenPayload};
use crate::domain::entities::token::{TokenKind, TokenPair, TokenRecord};
use crate::errors::{DomainError, DomainResult, InvalidTokenReason, RepositoryError, TokenError};
use crate::repositories::TokenRepository;

use super::codec::{DecodeOptions, TokenCodec};
use super::config::TokenServiceConfig;

/// Issues, validates, refreshes and revokes tokens
///
/// Every issued token has exactly one record in the repository. A token is
/// valid only when its signature and expiry check out *and* its record
/// exists and is not revoked. The repository handle is injected; the service
/// itself holds no mutable state.
pub struct TokenService<R: TokenRepository> {
    pub(crate) repository: R,
    config: TokenServiceConfig,
    codec: TokenCodec,
}

impl<R: TokenRepository> TokenService<R> {
    /// Creates a new token service instance
    ///
    /// # Arguments
    ///
    /// * `repository` - Token repository for persistence
    /// * `config` - Token service configuration
    ///
    /// # Returns
    ///
    /// A new `TokenService` instance or a configuration error if the signing
    /// keys cannot be built
    pub fn new(repository: R, config: TokenServiceConfig) -> DomainResult<Self> {
        let codec = TokenCodec::new(&config)?;
        Ok(Self {
            repository,
            config,
            codec,
        })
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Issues a signed token and records it
    ///
    /// # Arguments
    ///
    /// * `claims` - Subject and custom claims
    /// * `kind` - Access or refresh
    /// * `ttl` - Lifetime; `None` uses the configured default for `kind`
    ///
    /// # Returns
    ///
    /// The token string, only once its record has been persisted. A store
    /// failure yields `TokenError::Persistence` and no token.
    pub async fn issue(
        &self,
        claims: &ClaimSet,
        kind: TokenKind,
        ttl: Option<Duration>,
    ) -> DomainResult<String> {
        self.issue_at(claims, kind, ttl, Utc::now()).await
    }

    /// Same as [`issue`](Self::issue) with an explicit issuance time
    pub async fn issue_at(
        &self,
        claims: &ClaimSet,
        kind: TokenKind,
        ttl: Option<Duration>,
        now: DateTime<Utc>,
    ) -> DomainResult<String> {
        if claims.sub.trim().is_empty() {
            return Err(DomainError::Validation {
                message: "token subject must not be empty".to_string(),
            });
        }

        let ttl = ttl.unwrap_or_else(|| self.config.ttl_for(kind));
        if ttl <= Duration::zero() {
            return Err(DomainError::Validation {
                message: "token lifetime must be positive".to_string(),
            });
        }

        let payload = self.codec.build_payload(claims, kind, ttl, now)?;
        let token = self.codec.encode(&payload)?;

        self.repository
            .create(TokenRecord::from_payload(&payload))
            .await
            .map_err(|err| DomainError::Token(store_failure("create", err)))?;

        info!(jti = %payload.jti, sub = %payload.sub, kind = %kind, "Token issued");
        Ok(token)
    }

    /// Issues an access and a refresh token for the same claims
    ///
    /// The two tokens are independent records; revoking one leaves the other
    /// untouched.
    pub async fn create_pair(&self, claims: &ClaimSet) -> DomainResult<TokenPair> {
        let access_token = self.issue(claims, TokenKind::Access, None).await?;
        let refresh_token = self.issue(claims, TokenKind::Refresh, None).await?;

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_ttl.num_seconds(),
            self.config.refresh_token_ttl.num_seconds(),
        ))
    }

    /// Validates a presented token
    ///
    /// Checks run in order: signature and format, expiry, `type`, then the
    /// store record. An expired token is therefore reported as expired even
    /// when it was also revoked.
    ///
    /// # Arguments
    ///
    /// * `token` - The compact token string
    /// * `expected_kind` - Required `type` claim, if any
    pub async fn validate(
        &self,
        token: &str,
        expected_kind: Option<TokenKind>,
    ) -> Result<TokenPayload, TokenError> {
        let payload = self
            .codec
            .decode(token, DecodeOptions::strict())
            .map_err(|err| {
                debug!(error = %err, "Token rejected by codec");
                err
            })?;

        if let Some(expected) = expected_kind {
            if payload.kind != expected {
                warn!(jti = %payload.jti, expected = %expected, actual = %payload.kind, "Token of wrong type presented");
                return Err(TokenError::Invalid(InvalidTokenReason::WrongType {
                    expected: expected.to_string(),
                    actual: payload.kind.to_string(),
                }));
            }
        }

        match self.find_record(&payload.jti).await? {
            None => {
                warn!(jti = %payload.jti, sub = %payload.sub, "Untracked token presented");
                Err(TokenError::Invalid(InvalidTokenReason::Untracked(payload.jti)))
            }
            Some(record) if record.revoked => {
                warn!(jti = %payload.jti, sub = %payload.sub, "Revoked token presented");
                Err(TokenError::Revoked {
                    token_id: record.token_id,
                    revoked_at: record.updated_at,
                })
            }
            Some(_) => Ok(payload),
        }
    }

    /// Exchanges a refresh token for a new access token
    ///
    /// The refresh token is neither rotated nor revoked; it stays usable until
    /// it expires or is revoked explicitly.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<String> {
        let payload = self.validate(refresh_token, Some(TokenKind::Refresh)).await?;
        let access_token = self
            .issue(&ClaimSet::new(payload.sub.clone()), TokenKind::Access, None)
            .await?;

        debug!(sub = %payload.sub, refresh_jti = %payload.jti, "Access token refreshed");
        Ok(access_token)
    }

    /// Revokes a token
    ///
    /// Expired tokens can still be revoked. Revoking an already revoked token
    /// is a no-op. A token without a store record is `Invalid`.
    pub async fn revoke(&self, token: &str) -> Result<(), TokenError> {
        let payload = self.codec.decode(token, DecodeOptions::allow_expired())?;

        let record = self
            .find_record(&payload.jti)
            .await?
            .ok_or_else(|| TokenError::Invalid(InvalidTokenReason::Untracked(payload.jti.clone())))?;

        if record.revoked {
            debug!(jti = %payload.jti, "Token already revoked");
            return Ok(());
        }

        let changed = self
            .repository
            .revoke_one(&payload.sub, &payload.jti)
            .await
            .map_err(|err| store_failure("revoke_one", err))?;

        if changed {
            info!(jti = %payload.jti, sub = %payload.sub, "Token revoked");
        }
        Ok(())
    }

    /// Revokes every live token of a user
    ///
    /// # Arguments
    ///
    /// * `user_id` - The token owner
    /// * `exclude_token_id` - A `jti` to keep, e.g. the caller's current token
    ///
    /// # Returns
    ///
    /// The number of tokens this call revoked
    pub async fn revoke_all_for_user(
        &self,
        user_id: &str,
        exclude_token_id: Option<&str>,
    ) -> Result<u64, TokenError> {
        let revoked = self
            .repository
            .revoke_all(user_id, exclude_token_id)
            .await
            .map_err(|err| store_failure("revoke_all", err))?;

        info!(sub = %user_id, revoked, excluded = ?exclude_token_id, "Revoked all tokens for user");
        Ok(revoked)
    }

    /// Decodes a signature-valid token without consulting the store,
    /// tolerating expiry
    pub fn inspect(&self, token: &str) -> Result<TokenPayload, TokenError> {
        self.codec.decode(token, DecodeOptions::allow_expired())
    }

    /// Live (not revoked, not expired) tokens of a user, newest first
    pub async fn active_sessions(&self, user_id: &str) -> Result<Vec<TokenRecord>, TokenError> {
        self.repository
            .get_active_by_user_id(user_id)
            .await
            .map_err(|err| store_failure("get_active_by_user_id", err))
    }

    /// The user's most recent live refresh token record
    pub async fn active_refresh_token(
        &self,
        user_id: &str,
    ) -> Result<Option<TokenRecord>, TokenError> {
        self.repository
            .get_active_refresh_for_user(user_id)
            .await
            .map_err(|err| store_failure("get_active_refresh_for_user", err))
    }

    async fn find_record(&self, token_id: &str) -> Result<Option<TokenRecord>, TokenError> {
        self.repository
            .get_by_token_id(token_id)
            .await
            .map_err(|err| store_failure("get_by_token_id", err))
    }
}

fn store_failure(operation: &str, err: RepositoryError) -> TokenError {
    error!(operation, error = %err, "Token store operation failed");
    err.into()
}
