//! User lookup trait used to resolve a token's subject into a user.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::user::User;
use crate::errors::RepositoryError;

/// Resolves users by ID
///
/// The authentication layer calls this after a token validated, so an
/// implementation is free to hit a database, a cache or a remote service.
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Find a user by the `sub` claim of their token
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - The subject no longer resolves
    /// * `Err(RepositoryError)` - Lookup failed
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, RepositoryError>;
}

#[async_trait]
impl<L> UserLookup for Arc<L>
where
    L: UserLookup + ?Sized,
{
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, RepositoryError> {
        (**self).find_user(user_id).await
    }
}
