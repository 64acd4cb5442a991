//! JWT encoding and decoding
//!
//! The codec owns the signing keys and the claim rules shared by every token:
//! it injects `jti`, `type`, `iat`, `exp`, `iss` and `aud` on the way out and
//! checks signature, issuer, audience and expiry on the way in. It never
//! touches the token store.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::domain::entities::claims::{ClaimSet, TokenPayload, WirePayload};
use crate::domain::entities::token::TokenKind;
use crate::errors::{DomainError, DomainResult, TokenError};

use super::config::TokenServiceConfig;

/// Checks applied when decoding a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub verify_signature: bool,
    pub verify_exp: bool,
}

impl DecodeOptions {
    /// Signature and expiry both checked
    pub const fn strict() -> Self {
        Self {
            verify_signature: true,
            verify_exp: true,
        }
    }

    /// Signature checked, expiry ignored
    pub const fn allow_expired() -> Self {
        Self {
            verify_signature: true,
            verify_exp: false,
        }
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self::strict()
    }
}

/// Signs and verifies compact JWS tokens
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
    audience: Option<String>,
    accepted_audiences: Vec<String>,
    leeway: u64,
}

impl TokenCodec {
    /// Creates a codec from service configuration
    ///
    /// # Errors
    ///
    /// `DomainError::Configuration` for an empty secret or a non-HMAC algorithm
    pub fn new(config: &TokenServiceConfig) -> DomainResult<Self> {
        if config.jwt_secret.is_empty() {
            return Err(DomainError::Configuration {
                message: "JWT secret must not be empty".to_string(),
            });
        }
        if !matches!(
            config.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(DomainError::Configuration {
                message: format!("unsupported signing algorithm {:?}", config.algorithm),
            });
        }

        Ok(Self {
            algorithm: config.algorithm,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            accepted_audiences: config.accepted_audiences(),
            leeway: config.leeway,
        })
    }

    /// Builds the payload for a new token issued at `now`
    ///
    /// A fresh UUID v4 becomes the `jti`. Caller claims can never override a
    /// standard claim since [`ClaimSet`] rejects reserved names.
    ///
    /// # Errors
    ///
    /// `DomainError::Validation` when `now + ttl` is not a representable time
    pub fn build_payload(
        &self,
        claims: &ClaimSet,
        kind: TokenKind,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> DomainResult<TokenPayload> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| DomainError::Validation {
                message: "token lifetime is out of range".to_string(),
            })?;

        Ok(TokenPayload {
            sub: claims.sub.clone(),
            jti: Uuid::new_v4().to_string(),
            kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            custom: claims.custom.clone(),
        })
    }

    /// Signs a payload into a compact token string
    pub fn encode(&self, payload: &TokenPayload) -> DomainResult<String> {
        encode(&Header::new(self.algorithm), payload, &self.encoding_key).map_err(|e| {
            DomainError::Internal {
                message: format!("Failed to sign token: {}", e),
            }
        })
    }

    /// Decodes a token against the current time
    pub fn decode(&self, token: &str, options: DecodeOptions) -> Result<TokenPayload, TokenError> {
        self.decode_at(token, options, Utc::now())
    }

    /// Decodes a token as of `now`
    ///
    /// The signature is verified before expiry, so an expired token with a
    /// bad signature is `Invalid`, never `Expired`.
    pub fn decode_at(
        &self,
        token: &str,
        options: DecodeOptions,
        now: DateTime<Utc>,
    ) -> Result<TokenPayload, TokenError> {
        let data = decode::<WirePayload>(token, &self.decoding_key, &self.validation(options))
            .map_err(map_jwt_error)?;
        let payload = TokenPayload::try_from(data.claims)?;

        let leeway = i64::try_from(self.leeway).unwrap_or(i64::MAX);
        if options.verify_exp && payload.exp.saturating_add(leeway) < now.timestamp() {
            return Err(TokenError::Expired {
                expired_at: payload.expires_at(),
            });
        }

        Ok(payload)
    }

    fn validation(&self, options: DecodeOptions) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked in `decode_at` against the caller's clock
        validation.validate_exp = false;
        validation.leeway = self.leeway;

        let mut required = vec!["exp"];
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer.as_str()]);
            required.push("iss");
        }
        if self.accepted_audiences.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(self.accepted_audiences.as_slice());
            required.push("aud");
        }
        validation.set_required_spec_claims(required.as_slice());

        if !options.verify_signature {
            validation.insecure_disable_signature_validation();
        }
        validation
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> TokenError {
    let detail = match err.kind() {
        ErrorKind::InvalidSignature => "signature mismatch".to_string(),
        ErrorKind::InvalidIssuer => "issuer mismatch".to_string(),
        ErrorKind::InvalidAudience => "audience mismatch".to_string(),
        ErrorKind::InvalidAlgorithm => "algorithm mismatch".to_string(),
        ErrorKind::MissingRequiredClaim(claim) => format!("missing required claim `{}`", claim),
        _ => err.to_string(),
    };
    TokenError::malformed(detail)
}
