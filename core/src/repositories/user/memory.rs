//! In-memory implementation of UserLookup

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::user::User;
use crate::errors::RepositoryError;

use super::r#trait::UserLookup;

/// User directory backed by a process-local map
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    /// Remove a user, returning it if present
    pub async fn remove(&self, user_id: &str) -> Option<User> {
        self.users.write().await.remove(user_id)
    }
}

#[async_trait]
impl UserLookup for InMemoryUserRepository {
    async fn find_user(&self, user_id: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }
}
