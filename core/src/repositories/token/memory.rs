//! In-memory implementation of TokenRepository
//!
//! Each operation takes the lock exactly once, so a revoke is as atomic as the
//! single `UPDATE` statement of the SQL store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::token::{TokenKind, TokenRecord};
use crate::errors::RepositoryError;

use super::r#trait::TokenRepository;

/// Token repository backed by a process-local map
#[derive(Clone, Default)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<String, TokenRecord>>>,
}

impl InMemoryTokenRepository {
    /// Create a new, empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }

    /// Remove every record
    pub async fn clear(&self) {
        self.tokens.write().await.clear();
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn create(&self, record: TokenRecord) -> Result<TokenRecord, RepositoryError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&record.token_id) {
            return Err(RepositoryError::Duplicate {
                token_id: record.token_id,
            });
        }

        tokens.insert(record.token_id.clone(), record.clone());
        Ok(record)
    }

    async fn get_by_token_id(&self, token_id: &str) -> Result<Option<TokenRecord>, RepositoryError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(token_id).cloned())
    }

    async fn get_by_user_id(&self, user_id: &str) -> Result<Vec<TokenRecord>, RepositoryError> {
        let tokens = self.tokens.read().await;
        let mut records: Vec<TokenRecord> = tokens
            .values()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn get_active_refresh_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<TokenRecord>, RepositoryError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|record| {
                record.user_id == user_id
                    && record.token_kind == TokenKind::Refresh
                    && record.is_active()
            })
            .max_by_key(|record| record.created_at)
            .cloned())
    }

    async fn revoke_one(&self, user_id: &str, token_id: &str) -> Result<bool, RepositoryError> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(token_id) {
            Some(record) if record.user_id == user_id => Ok(record.revoke()),
            _ => Ok(false),
        }
    }

    async fn revoke_all(
        &self,
        user_id: &str,
        exclude_token_id: Option<&str>,
    ) -> Result<u64, RepositoryError> {
        let mut tokens = self.tokens.write().await;
        let now = Utc::now();

        let revoked = tokens
            .values_mut()
            .filter(|record| record.user_id == user_id)
            .filter(|record| exclude_token_id != Some(record.token_id.as_str()))
            .filter_map(|record| record.revoke_at(now).then_some(()))
            .count();

        Ok(revoked as u64)
    }
}
