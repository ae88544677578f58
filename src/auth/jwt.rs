use crate::utils::toml_config::ConfigError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The only algorithm tokens are signed with and the only one accepted on decode.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Default validity horizon for freshly issued tokens.
pub const DEFAULT_TOKEN_LIFETIME_DAYS: i64 = 60;

/// Upper bound on the token lifetime accepted by [`TokenCodec::new`].
pub const MAX_TOKEN_LIFETIME_DAYS: i64 = 36_500;

/// Opaque subject reference carried in the `id` claim.
///
/// The codec never interprets it; it only has to survive a JSON round trip
/// unchanged. Integer keys serialize as JSON numbers, anything else as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Subject {
    Numeric(i64),
    Text(String),
}

impl From<i64> for Subject {
    fn from(id: i64) -> Self {
        Subject::Numeric(id)
    }
}

impl From<&str> for Subject {
    fn from(id: &str) -> Self {
        Subject::Text(id.to_string())
    }
}

impl From<String> for Subject {
    fn from(id: String) -> Self {
        Subject::Text(id)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Numeric(id) => write!(f, "{}", id),
            Subject::Text(id) => f.write_str(id),
        }
    }
}

/// Decoded token payload. Both fields are required; a token missing either
/// one, or carrying them with the wrong JSON type, does not decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "id")]
    pub subject: Subject,
    /// Unix timestamp (seconds) after which the token is rejected
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

/// Why a token failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Bad signature, malformed structure, wrong algorithm or bad claims.
    #[error("Invalid token")]
    Invalid,

    /// Signature checks out but `exp` has passed.
    #[error("Token expired")]
    Expired,
}

/// Signs and verifies session tokens with a process-wide HMAC secret.
///
/// Tokens use the standard `header.payload.signature` encoding with
/// `{"alg":"HS256","typ":"JWT"}` headers. The payload is readable by anyone
/// holding the token; only its integrity is protected.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenCodec {
    /// Creates a codec for the given secret and token lifetime.
    ///
    /// # Errors
    /// Returns [`ConfigError::EmptySecret`] for an empty secret and
    /// [`ConfigError::ValidationError`] for a lifetime that is not positive or
    /// exceeds [`MAX_TOKEN_LIFETIME_DAYS`].
    pub fn new(secret: &[u8], lifetime: Duration) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if lifetime <= Duration::zero() {
            return Err(ConfigError::ValidationError(
                "token lifetime must be positive".to_string(),
            ));
        }
        if lifetime.num_days() > MAX_TOKEN_LIFETIME_DAYS {
            return Err(ConfigError::ValidationError(format!(
                "token lifetime must not exceed {} days",
                MAX_TOKEN_LIFETIME_DAYS
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime,
        })
    }

    /// Codec with the default 60 day lifetime.
    pub fn with_default_lifetime(secret: &[u8]) -> Result<Self, ConfigError> {
        Self::new(secret, Duration::days(DEFAULT_TOKEN_LIFETIME_DAYS))
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issues a token for `subject` valid until now plus the configured lifetime.
    pub fn encode(&self, subject: &Subject) -> Result<String, TokenError> {
        self.encode_at(subject, Utc::now())
    }

    /// Issues a token as if the current time were `now`.
    ///
    /// Fails with [`TokenError::Invalid`] when the expiry is not representable.
    pub fn encode_at(&self, subject: &Subject, now: DateTime<Utc>) -> Result<String, TokenError> {
        let expires_at = now.checked_add_signed(self.lifetime).ok_or_else(|| {
            tracing::error!("Token expiry overflows the supported date range");
            TokenError::Invalid
        })?;

        let claims = TokenClaims {
            subject: subject.clone(),
            expires_at: expires_at.timestamp(),
        };
        self.sign(&claims)
    }

    /// Signs an arbitrary claims set. Used by [`encode_at`](Self::encode_at)
    /// and by tooling that needs tokens with a specific expiry.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        encode(&Header::new(TOKEN_ALGORITHM), claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign token: {}", e);
            TokenError::Invalid
        })
    }

    /// Verifies a token's signature and expiry against the current time.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.decode_at(token, Utc::now())
    }

    /// Verifies a token as if the current time were `now`.
    ///
    /// The algorithm is pinned to HS256 regardless of what the token header
    /// declares; `none` and asymmetric algorithms are rejected as invalid.
    /// Expiry is only evaluated once the signature has been verified.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // exp is checked below against the supplied clock, with zero leeway.
        // Presence and type of id/exp are enforced by TokenClaims itself, which
        // also admits pre-epoch (negative) expiries.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?;

        if claims.expires_at <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &TOKEN_ALGORITHM)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
