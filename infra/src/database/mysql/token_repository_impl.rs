//! MySQL implementation of the TokenRepository trait.
//!
//! Each method is one statement against the `tokens` table. Revocations are
//! predicate-based updates (`AND revoked = FALSE`), so concurrent revokes of
//! the same rows never double-count and never fail.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, MySqlPool, Row};

use gk_core::domain::entities::token::{TokenKind, TokenRecord};
use gk_core::errors::RepositoryError;
use gk_core::repositories::TokenRepository;

use crate::database::schema::TOKEN_COLUMNS;

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to TokenRecord entity
    fn row_to_record(row: &MySqlRow) -> Result<TokenRecord, RepositoryError> {
        let token_kind: String = row.try_get("token_kind").map_err(column_error("token_kind"))?;

        Ok(TokenRecord {
            token_id: row.try_get("token_id").map_err(column_error("token_id"))?,
            user_id: row.try_get("user_id").map_err(column_error("user_id"))?,
            token_kind: token_kind
                .parse::<TokenKind>()
                .map_err(RepositoryError::Database)?,
            revoked: row.try_get("revoked").map_err(column_error("revoked"))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(column_error("expires_at"))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(column_error("created_at"))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(column_error("updated_at"))?,
        })
    }
}

fn column_error(column: &'static str) -> impl Fn(sqlx::Error) -> RepositoryError {
    move |e| RepositoryError::Database(format!("Failed to get {}: {}", column, e))
}

fn query_error(action: &'static str) -> impl Fn(sqlx::Error) -> RepositoryError {
    move |e| RepositoryError::Database(format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn create(&self, record: TokenRecord) -> Result<TokenRecord, RepositoryError> {
        let query = r#"
            INSERT INTO tokens (
                token_id, user_id, token_kind, revoked, expires_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&record.token_id)
            .bind(&record.user_id)
            .bind(record.token_kind.as_str())
            .bind(record.revoked)
            .bind(record.expires_at)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    RepositoryError::Duplicate {
                        token_id: record.token_id.clone(),
                    }
                }
                other => RepositoryError::Database(format!("Failed to save token: {}", other)),
            })?;

        Ok(record)
    }

    async fn get_by_token_id(&self, token_id: &str) -> Result<Option<TokenRecord>, RepositoryError> {
        let query = format!("SELECT {} FROM tokens WHERE token_id = ? LIMIT 1", TOKEN_COLUMNS);

        let result = sqlx::query(&query)
            .bind(token_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("find token"))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_user_id(&self, user_id: &str) -> Result<Vec<TokenRecord>, RepositoryError> {
        let query = format!(
            "SELECT {} FROM tokens WHERE user_id = ? ORDER BY created_at DESC",
            TOKEN_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("find user tokens"))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn get_active_refresh_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<TokenRecord>, RepositoryError> {
        let query = format!(
            r#"
            SELECT {}
            FROM tokens
            WHERE user_id = ?
                AND token_kind = ?
                AND revoked = FALSE
                AND expires_at > ?
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            TOKEN_COLUMNS
        );

        let result = sqlx::query(&query)
            .bind(user_id)
            .bind(TokenKind::Refresh.as_str())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error("find active refresh token"))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn revoke_one(&self, user_id: &str, token_id: &str) -> Result<bool, RepositoryError> {
        let query = r#"
            UPDATE tokens
            SET revoked = TRUE, updated_at = ?
            WHERE token_id = ? AND user_id = ? AND revoked = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(Utc::now())
            .bind(token_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(query_error("revoke token"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all(
        &self,
        user_id: &str,
        exclude_token_id: Option<&str>,
    ) -> Result<u64, RepositoryError> {
        let query = r#"
            UPDATE tokens
            SET revoked = TRUE, updated_at = ?
            WHERE user_id = ?
                AND revoked = FALSE
                AND (? IS NULL OR token_id <> ?)
        "#;

        let result = sqlx::query(query)
            .bind(Utc::now())
            .bind(user_id)
            .bind(exclude_token_id)
            .bind(exclude_token_id)
            .execute(&self.pool)
            .await
            .map_err(query_error("revoke user tokens"))?;

        Ok(result.rows_affected())
    }
}
