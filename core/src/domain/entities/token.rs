//! Token entities for stateful JWT authentication.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::claims::TokenPayload;

/// Kind of credential a token represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived credential presented on every request
    Access,
    /// Longer-lived credential exchanged for new access tokens
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(TokenKind::Access),
            "refresh" => Ok(TokenKind::Refresh),
            other => Err(format!("Invalid token kind: {}", other)),
        }
    }
}

/// Persisted state of one issued token
///
/// Exactly one record exists per signed token string, keyed by its `jti`.
/// `revoked` only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Unique token identifier (the `jti` claim)
    pub token_id: String,

    /// Subject the token was issued to
    pub user_id: String,

    pub token_kind: TokenKind,

    pub revoked: bool,

    pub expires_at: DateTime<Utc>,

    pub created_at: DateTime<Utc>,

    /// Last state change; equals the revocation time once revoked
    pub updated_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Builds the record for a freshly encoded payload
    pub fn from_payload(payload: &TokenPayload) -> Self {
        let issued_at = payload.issued_at();
        Self {
            token_id: payload.jti.clone(),
            user_id: payload.sub.clone(),
            token_kind: payload.kind,
            revoked: false,
            expires_at: payload.expires_at(),
            created_at: issued_at,
            updated_at: issued_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Not revoked and not expired
    pub fn is_active(&self) -> bool {
        !self.revoked && !self.is_expired()
    }

    /// Marks the record revoked. Returns `false` if it already was.
    pub fn revoke(&mut self) -> bool {
        self.revoke_at(Utc::now())
    }

    pub fn revoke_at(&mut self, now: DateTime<Utc>) -> bool {
        if self.revoked {
            return false;
        }
        self.revoked = true;
        self.updated_at = now;
        true
    }
}

/// Access and refresh token issued together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,

    pub refresh_token: String,

    /// Always "bearer"
    pub token_type: String,

    /// Access token lifetime in seconds
    pub access_expires_in: i64,

    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_in: i64,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
            access_expires_in,
            refresh_expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::claims::CustomClaims;
    use chrono::Duration;

    fn payload(kind: TokenKind, iat: i64, exp: i64) -> TokenPayload {
        TokenPayload {
            sub: "user-1".into(),
            jti: "jti-1".into(),
            kind,
            iat,
            exp,
            iss: None,
            aud: None,
            custom: CustomClaims::new(),
        }
    }

    #[test]
    fn test_token_kind_strings() {
        assert_eq!(TokenKind::Access.to_string(), "access");
        assert_eq!("refresh".parse::<TokenKind>().unwrap(), TokenKind::Refresh);
        assert!("Access".parse::<TokenKind>().is_err());
        assert_eq!(serde_json::to_string(&TokenKind::Refresh).unwrap(), "\"refresh\"");
    }

    #[test]
    fn test_record_from_payload() {
        let now = Utc::now().timestamp();
        let record = TokenRecord::from_payload(&payload(TokenKind::Refresh, now, now + 60));

        assert_eq!(record.token_id, "jti-1");
        assert_eq!(record.user_id, "user-1");
        assert_eq!(record.token_kind, TokenKind::Refresh);
        assert!(record.expires_at > record.created_at);
        assert_eq!(record.created_at, record.updated_at);
        assert!(record.is_active());
    }

    #[test]
    fn test_revoke_is_monotonic() {
        let now = Utc::now().timestamp();
        let mut record = TokenRecord::from_payload(&payload(TokenKind::Access, now, now + 60));

        let first = Utc::now() + Duration::seconds(1);
        assert!(record.revoke_at(first));
        assert!(record.revoked);
        assert_eq!(record.updated_at, first);

        assert!(!record.revoke_at(first + Duration::seconds(5)));
        assert_eq!(record.updated_at, first);
        assert!(!record.is_active());
    }

    #[test]
    fn test_expired_record_is_inactive() {
        let now = Utc::now().timestamp();
        let record = TokenRecord::from_payload(&payload(TokenKind::Access, now - 120, now - 60));
        assert!(record.is_expired());
        assert!(!record.revoked);
        assert!(!record.is_active());
    }

    #[test]
    fn test_token_pair_is_bearer() {
        let pair = TokenPair::new("a".into(), "r".into(), 1800, 604800);
        assert_eq!(pair.token_type, "bearer");
        assert_eq!(pair.access_expires_in, 1800);
    }
}
