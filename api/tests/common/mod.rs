//! Shared fixtures for API integration tests

#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use actix_web::web;
use async_trait::async_trait;
use gk_api::AppState;
use gk_core::{
    domain::entities::{ClaimSet, TokenKind, TokenPair, TokenRecord},
    errors::RepositoryError,
    repositories::{InMemoryTokenRepository, TokenRepository},
    services::token::{TokenService, TokenServiceConfig},
};

pub const SECRET: &str = "api-test-secret";

/// In-memory store that can be switched into a failing state
#[derive(Default)]
pub struct SwitchableStore {
    inner: InMemoryTokenRepository,
    down: AtomicBool,
}

impl SwitchableStore {
    pub fn take_down(&self) {
        self.down.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.down.load(Ordering::SeqCst) {
            Err(RepositoryError::Database(
                "connection refused (db.internal:3306)".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TokenRepository for SwitchableStore {
    async fn create(&self, record: TokenRecord) -> Result<TokenRecord, RepositoryError> {
        self.check()?;
        self.inner.create(record).await
    }

    async fn get_by_token_id(&self, token_id: &str) -> Result<Option<TokenRecord>, RepositoryError> {
        self.check()?;
        self.inner.get_by_token_id(token_id).await
    }

    async fn get_by_user_id(&self, user_id: &str) -> Result<Vec<TokenRecord>, RepositoryError> {
        self.check()?;
        self.inner.get_by_user_id(user_id).await
    }

    async fn get_active_refresh_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<TokenRecord>, RepositoryError> {
        self.check()?;
        self.inner.get_active_refresh_for_user(user_id).await
    }

    async fn revoke_one(&self, user_id: &str, token_id: &str) -> Result<bool, RepositoryError> {
        self.check()?;
        self.inner.revoke_one(user_id, token_id).await
    }

    async fn revoke_all(
        &self,
        user_id: &str,
        exclude_token_id: Option<&str>,
    ) -> Result<u64, RepositoryError> {
        self.check()?;
        self.inner.revoke_all(user_id, exclude_token_id).await
    }
}

pub type TestStore = Arc<SwitchableStore>;

pub fn token_service(store: &TestStore) -> Arc<TokenService<TestStore>> {
    let config = TokenServiceConfig::with_secret(SECRET);
    Arc::new(TokenService::new(Arc::clone(store), config).unwrap())
}

/// Application state over a fresh store
pub fn state() -> (web::Data<AppState<TestStore>>, TestStore) {
    let store = TestStore::default();
    let state = AppState::new(token_service(&store));
    (web::Data::new(state), store)
}

pub async fn login(state: &AppState<TestStore>, user_id: &str) -> TokenPair {
    state
        .token_service
        .create_pair(&ClaimSet::new(user_id))
        .await
        .unwrap()
}

pub async fn access_token(state: &AppState<TestStore>, user_id: &str) -> String {
    state
        .token_service
        .issue(&ClaimSet::new(user_id), TokenKind::Access, None)
        .await
        .unwrap()
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {}", token),
    )
}
