
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::token::TokenRecord;
use crate::errors::RepositoryError;
use crate::repositories::{InMemoryTokenRepository, TokenRepository};
use crate::services::token::{TokenService, TokenServiceConfig};

pub(super) const SECRET: &str = "test-secret-for-token-service";

pub(super) fn config() -> TokenServiceConfig {
    TokenServiceConfig::with_secret(SECRET)
}

/// Service over a shared in-memory store, so tests can inspect records
pub(super) fn service() -> (
    TokenService<Arc<InMemoryTokenRepository>>,
    Arc<InMemoryTokenRepository>,
) {
    let repository = Arc::new(InMemoryTokenRepository::new());
    let service = TokenService::new(Arc::clone(&repository), config()).unwrap();
    (service, repository)
}

/// Store double whose reads and writes can be made to fail
#[derive(Default)]
pub(super) struct FailingTokenRepository {
    inner: InMemoryTokenRepository,
    fail_writes: bool,
    fail_reads: bool,
}

impl FailingTokenRepository {
    pub(super) fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    pub(super) fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Default::default()
        }
    }

    fn check(&self, failing: bool) -> Result<(), RepositoryError> {
        if failing {
            Err(RepositoryError::Database("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TokenRepository for FailingTokenRepository {
    async fn create(&self, record: TokenRecord) -> Result<TokenRecord, RepositoryError> {
        self.check(self.fail_writes)?;
        self.inner.create(record).await
    }

    async fn get_by_token_id(&self, token_id: &str) -> Result<Option<TokenRecord>, RepositoryError> {
        self.check(self.fail_reads)?;
        self.inner.get_by_token_id(token_id).await
    }

    async fn get_by_user_id(&self, user_id: &str) -> Result<Vec<TokenRecord>, RepositoryError> {
        self.check(self.fail_reads)?;
        self.inner.get_by_user_id(user_id).await
    }

    async fn get_active_refresh_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<TokenRecord>, RepositoryError> {
        self.check(self.fail_reads)?;
        self.inner.get_active_refresh_for_user(user_id).await
    }

    async fn revoke_one(&self, user_id: &str, token_id: &str) -> Result<bool, RepositoryError> {
        self.check(self.fail_writes)?;
        self.inner.revoke_one(user_id, token_id).await
    }

    async fn revoke_all(
        &self,
        user_id: &str,
        exclude_token_id: Option<&str>,
    ) -> Result<u64, RepositoryError> {
        self.check(self.fail_writes)?;
        self.inner.revoke_all(user_id, exclude_token_id).await
    }
}
