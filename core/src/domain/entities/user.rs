//! User entity resolved from a token's subject.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user as seen by the authentication layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier, matches the `sub` claim of the user's tokens
    pub id: String,

    pub username: String,

    /// Disabled accounts keep valid tokens but are refused by handlers that
    /// require an active user
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new, active user
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            username: username.into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Disables the account
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    /// Re-enables the account
    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Utc::now();
    }
}
