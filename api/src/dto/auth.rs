use chrono::{DateTime, Utc};
use gk_core::domain::entities::{TokenKind, TokenRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub token_type: String, // always "bearer"
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl RefreshTokenResponse {
    pub fn bearer(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoutRequest {
    /// Refresh token to revoke along with the presented access token
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoutAllRequest {
    /// Keep the access token used for this request alive
    #[serde(default)]
    pub keep_current: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutAllResponse {
    pub revoked: u64,
}

/// One live token of the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDto {
    pub token_id: String,
    pub token_kind: TokenKind,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Whether this is the access token that made the request
    pub current: bool,
}

impl SessionDto {
    pub fn from_record(record: TokenRecord, current_jti: &str) -> Self {
        Self {
            current: record.token_id == current_jti,
            token_id: record.token_id,
            token_kind: record.token_kind,
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionDto>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logout_request_refresh_token_is_optional() {
        let request: LogoutRequest = serde_json::from_str("{}").unwrap();
        assert!(request.refresh_token.is_none());

        let request: LogoutAllRequest = serde_json::from_str("{}").unwrap();
        assert!(!request.keep_current);
    }

    #[test]
    fn test_session_marks_current_token() {
        let now = Utc::now();
        let record = TokenRecord {
            token_id: "jti-1".into(),
            user_id: "u1".into(),
            token_kind: TokenKind::Access,
            revoked: false,
            expires_at: now,
            created_at: now,
            updated_at: now,
        };

        let session = SessionDto::from_record(record.clone(), "jti-1");
        assert!(session.current);
        assert!(!SessionDto::from_record(record, "jti-2").current);

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["token_kind"], "access");
    }
}
