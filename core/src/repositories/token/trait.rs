//! Token repository trait defining the interface for token record persistence.
//!
//! Every method maps to a single round trip against the backing store. Revocation
//! is predicate-based (`... AND revoked = FALSE`) so concurrent callers never
//! double-apply a flip and never observe an error for a row someone else already
//! revoked.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::token::TokenRecord;
use crate::errors::RepositoryError;

/// Repository trait for token record persistence operations
///
/// # Example Implementation
/// ```no_run
/// use async_trait::async_trait;
/// use gk_core::domain::entities::token::TokenRecord;
/// use gk_core::errors::RepositoryError;
/// use gk_core::repositories::TokenRepository;
///
/// struct PostgresTokenRepository {
///     // database connection pool
/// }
///
/// #[async_trait]
/// impl TokenRepository for PostgresTokenRepository {
///     async fn create(&self, record: TokenRecord) -> Result<TokenRecord, RepositoryError> {
///         // INSERT INTO tokens ...
///         Ok(record)
///     }
///
///     // ... other methods
/// #   async fn get_by_token_id(&self, _: &str) -> Result<Option<TokenRecord>, RepositoryError> { Ok(None) }
/// #   async fn get_by_user_id(&self, _: &str) -> Result<Vec<TokenRecord>, RepositoryError> { Ok(vec![]) }
/// #   async fn get_active_refresh_for_user(&self, _: &str) -> Result<Option<TokenRecord>, RepositoryError> { Ok(None) }
/// #   async fn revoke_one(&self, _: &str, _: &str) -> Result<bool, RepositoryError> { Ok(false) }
/// #   async fn revoke_all(&self, _: &str, _: Option<&str>) -> Result<u64, RepositoryError> { Ok(0) }
/// }
/// ```
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Persist the record of a newly issued token
    ///
    /// # Returns
    /// * `Ok(TokenRecord)` - The stored record
    /// * `Err(RepositoryError::Duplicate)` - A record with the same `token_id` exists
    /// * `Err(RepositoryError::Database)` - Storage fault
    async fn create(&self, record: TokenRecord) -> Result<TokenRecord, RepositoryError>;

    /// Find a record by its token ID (`jti`)
    async fn get_by_token_id(&self, token_id: &str) -> Result<Option<TokenRecord>, RepositoryError>;

    /// All records for a user, newest first
    async fn get_by_user_id(&self, user_id: &str) -> Result<Vec<TokenRecord>, RepositoryError>;

    /// Most recently created refresh token of the user that is neither
    /// revoked nor expired
    async fn get_active_refresh_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<TokenRecord>, RepositoryError>;

    /// Revoke one token of a user
    ///
    /// # Returns
    /// * `Ok(true)` - The record was flipped to revoked
    /// * `Ok(false)` - No matching non-revoked record (silent no-op)
    /// * `Err(RepositoryError)` - Storage fault
    async fn revoke_one(&self, user_id: &str, token_id: &str) -> Result<bool, RepositoryError>;

    /// Revoke every non-revoked token of a user in one bulk update
    ///
    /// # Arguments
    /// * `user_id` - Owner of the tokens
    /// * `exclude_token_id` - Token to leave untouched, typically the caller's own
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of records flipped by this call
    async fn revoke_all(
        &self,
        user_id: &str,
        exclude_token_id: Option<&str>,
    ) -> Result<u64, RepositoryError>;

    /// Check whether a token is tracked, not revoked and not expired
    async fn is_token_active(&self, token_id: &str) -> Result<bool, RepositoryError> {
        match self.get_by_token_id(token_id).await? {
            Some(record) => Ok(record.is_active()),
            None => Ok(false),
        }
    }

    /// Active records for a user, newest first
    async fn get_active_by_user_id(&self, user_id: &str) -> Result<Vec<TokenRecord>, RepositoryError> {
        let records = self.get_by_user_id(user_id).await?;
        Ok(records.into_iter().filter(TokenRecord::is_active).collect())
    }
}

#[async_trait]
impl<R> TokenRepository for Arc<R>
where
    R: TokenRepository + ?Sized,
{
    async fn create(&self, record: TokenRecord) -> Result<TokenRecord, RepositoryError> {
        (**self).create(record).await
    }

    async fn get_by_token_id(&self, token_id: &str) -> Result<Option<TokenRecord>, RepositoryError> {
        (**self).get_by_token_id(token_id).await
    }

    async fn get_by_user_id(&self, user_id: &str) -> Result<Vec<TokenRecord>, RepositoryError> {
        (**self).get_by_user_id(user_id).await
    }

    async fn get_active_refresh_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<TokenRecord>, RepositoryError> {
        (**self).get_active_refresh_for_user(user_id).await
    }

    async fn revoke_one(&self, user_id: &str, token_id: &str) -> Result<bool, RepositoryError> {
        (**self).revoke_one(user_id, token_id).await
    }

    async fn revoke_all(
        &self,
        user_id: &str,
        exclude_token_id: Option<&str>,
    ) -> Result<u64, RepositoryError> {
        (**self).revoke_all(user_id, exclude_token_id).await
    }
}
