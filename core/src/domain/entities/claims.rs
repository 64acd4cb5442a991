//! Claim sets and the structured JWT payload.
//!
//! Callers hand the service a [`ClaimSet`] (subject plus custom claims); the
//! codec turns it into a [`TokenPayload`] carrying the standard claims.
//! Custom claims live in a bounded map that cannot shadow a standard claim.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{DomainError, DomainResult, InvalidTokenReason, TokenError};

use super::token::TokenKind;

/// Maximum number of custom claims a token may carry
pub const MAX_CUSTOM_CLAIMS: usize = 32;

/// Claim names owned by the codec
pub const RESERVED_CLAIMS: [&str; 8] = ["sub", "jti", "type", "iat", "exp", "nbf", "iss", "aud"];

/// Caller-supplied claims, written at the top level of the payload
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CustomClaims(BTreeMap<String, Value>);

impl CustomClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a claim
    ///
    /// # Errors
    ///
    /// `DomainError::Validation` when the name is reserved or empty, or when
    /// the map is already full.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> DomainResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(DomainError::Validation {
                message: "claim name must not be empty".to_string(),
            });
        }
        if RESERVED_CLAIMS.contains(&name.as_str()) {
            return Err(DomainError::Validation {
                message: format!("claim `{}` is reserved", name),
            });
        }
        if !self.0.contains_key(&name) && self.0.len() >= MAX_CUSTOM_CLAIMS {
            return Err(DomainError::Validation {
                message: format!("at most {} custom claims are allowed", MAX_CUSTOM_CLAIMS),
            });
        }

        self.0.insert(name, value.into());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Rebuilds custom claims from a decoded payload. Registered claim names
    /// the codec does not model (such as `nbf`) are dropped.
    fn from_decoded(map: BTreeMap<String, Value>) -> Result<Self, TokenError> {
        let claims: BTreeMap<String, Value> = map
            .into_iter()
            .filter(|(name, _)| !RESERVED_CLAIMS.contains(&name.as_str()))
            .collect();

        if claims.len() > MAX_CUSTOM_CLAIMS {
            return Err(TokenError::malformed("too many custom claims"));
        }
        Ok(Self(claims))
    }
}

impl TryFrom<serde_json::Map<String, Value>> for CustomClaims {
    type Error = DomainError;

    fn try_from(map: serde_json::Map<String, Value>) -> Result<Self, Self::Error> {
        let mut claims = CustomClaims::new();
        for (name, value) in map {
            claims.insert(name, value)?;
        }
        Ok(claims)
    }
}

/// Input to token issuance
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimSet {
    /// Subject (user ID)
    pub sub: String,
    pub custom: CustomClaims,
}

impl ClaimSet {
    pub fn new(sub: impl Into<String>) -> Self {
        Self {
            sub: sub.into(),
            custom: CustomClaims::new(),
        }
    }

    /// Builder-style variant of [`CustomClaims::insert`]
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> DomainResult<Self> {
        self.custom.insert(name, value)?;
        Ok(self)
    }

    pub fn with_custom(mut self, custom: CustomClaims) -> Self {
        self.custom = custom;
        self
    }
}

/// Decoded or about-to-be-encoded JWT payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenPayload {
    /// Subject (user ID)
    pub sub: String,

    /// JWT ID, the key of the token's store record
    pub jti: String,

    #[serde(rename = "type")]
    pub kind: TokenKind,

    /// Issued at (epoch seconds)
    pub iat: i64,

    /// Expiration (epoch seconds)
    pub exp: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,

    #[serde(flatten)]
    pub custom: CustomClaims,
}

impl TokenPayload {
    pub fn issued_at(&self) -> DateTime<Utc> {
        timestamp(self.iat).unwrap_or_default()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        timestamp(self.exp).unwrap_or_default()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp < now.timestamp()
    }
}

/// Payload as found on the wire, before the mandatory claims are checked
#[derive(Debug, Deserialize)]
pub(crate) struct WirePayload {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    jti: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    aud: Option<String>,
    #[serde(flatten)]
    custom: BTreeMap<String, Value>,
}

impl TryFrom<WirePayload> for TokenPayload {
    type Error = TokenError;

    fn try_from(wire: WirePayload) -> Result<Self, Self::Error> {
        let sub = wire
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or(TokenError::missing_claim("sub"))?;
        let jti = wire
            .jti
            .filter(|jti| !jti.is_empty())
            .ok_or(TokenError::missing_claim("jti"))?;
        let kind = wire.kind.ok_or(TokenError::missing_claim("type"))?;
        let kind = kind
            .parse::<TokenKind>()
            .map_err(|_| TokenError::Invalid(InvalidTokenReason::UnknownType(kind)))?;
        let iat = wire.iat.ok_or(TokenError::missing_claim("iat"))?;
        let exp = wire.exp.ok_or(TokenError::missing_claim("exp"))?;

        if timestamp(iat).is_none() || timestamp(exp).is_none() {
            return Err(TokenError::malformed("timestamp out of range"));
        }

        Ok(Self {
            sub,
            jti,
            kind,
            iat,
            exp,
            iss: wire.iss,
            aud: wire.aud,
            custom: CustomClaims::from_decoded(wire.custom)?,
        })
    }
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}
