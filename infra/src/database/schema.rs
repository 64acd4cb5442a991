//! Schema of the token store

/// Name of the table holding one row per issued token
pub const TOKENS_TABLE: &str = "tokens";

/// DDL for the `tokens` table, shared with `migrations/0001_create_tokens.sql`
pub const CREATE_TOKENS_TABLE: &str = include_str!("../../migrations/0001_create_tokens.sql");

/// Columns selected when loading a record, in `row_to_record` order
pub(crate) const TOKEN_COLUMNS: &str =
    "token_id, user_id, token_kind, revoked, expires_at, created_at, updated_at";
