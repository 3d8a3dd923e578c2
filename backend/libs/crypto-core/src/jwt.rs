/// Identity token issuance and verification for tracer-study services
///
/// Tokens are HS256-signed JWTs carrying the subject (user id) and the
/// subject's role identifier. The signing secret and default lifetime are
/// fixed when the [`TokenService`] is constructed and never change afterwards,
/// so a single instance can be shared freely across request tasks.
///
/// ## Verification Model
///
/// - **Stateless**: verification never touches storage. A token is valid
///   until `exp`; there is no revocation list.
/// - **Strict expiry**: a token is expired once `now > exp`. No leeway.
/// - **Typed failures**: callers get [`TokenError::Malformed`],
///   [`TokenError::Expired`] or [`TokenError::InvalidSignature`] so the
///   specific cause can be logged, even though the wire response is uniform.
///
/// ## Usage
///
/// ```rust
/// use chrono::Duration;
/// use crypto_core::jwt::TokenService;
///
/// let tokens = TokenService::new(b"a-very-long-and-random-signing-secret!", Duration::minutes(30));
/// let token = tokens.issue(42, 8, Duration::minutes(30)).unwrap();
/// let verified = tokens.verify(&token).unwrap();
///
/// assert_eq!(verified.subject_id, 42);
/// assert_eq!(verified.role_id, 8);
/// ```
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// Constants
// ============================================================================

/// JWT algorithm used for every token this service issues or accepts
pub const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

// ============================================================================
// Data Structures
// ============================================================================

/// Claims as they are serialized inside the token payload
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (numeric user id rendered as a string)
    pub sub: String,
    /// Role identifier of the subject
    pub role_id: u32,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

/// Identity extracted from a token that passed signature and expiry checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject_id: u64,
    pub role_id: u32,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Token failures
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// The string is not a JWT, or its payload lacks the expected fields.
    #[error("token is malformed")]
    Malformed,
    /// `now` is past the token's `exp`.
    #[error("token has expired")]
    Expired,
    /// The signature does not match the configured secret.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// The requested lifetime is zero or negative.
    #[error("token lifetime must be positive")]
    InvalidTtl,
    /// Signing failed.
    #[error("failed to sign token")]
    Encoding,
}

impl TokenError {
    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::Expired => "expired",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::InvalidTtl => "invalid_ttl",
            TokenError::Encoding => "encoding",
        }
    }
}

// ============================================================================
// Token Service
// ============================================================================

/// Issues and verifies identity tokens with a fixed symmetric secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &JWT_ALGORITHM)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service from a symmetric secret and default lifetime
    pub fn new(secret: impl AsRef<[u8]>, default_ttl: Duration) -> Self {
        let secret = secret.as_ref();

        // Expiry is checked by hand against an explicit clock so that
        // verification can be evaluated at any instant.
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // ------------------------------------------------------------------------
    // Issuance
    // ------------------------------------------------------------------------

    /// Issue a token valid for `ttl` from now
    pub fn issue(&self, subject_id: u64, role_id: u32, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(subject_id, role_id, ttl, Utc::now())
    }

    /// Issue a token with the configured default lifetime
    pub fn issue_with_default_ttl(&self, subject_id: u64, role_id: u32) -> Result<String, TokenError> {
        self.issue(subject_id, role_id, self.default_ttl)
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        subject_id: u64,
        role_id: u32,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if ttl <= Duration::zero() {
            return Err(TokenError::InvalidTtl);
        }

        let claims = Claims {
            sub: subject_id.to_string(),
            role_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Encoding)
    }

    // ------------------------------------------------------------------------
    // Verification
    // ------------------------------------------------------------------------

    /// Verify a token against the current time
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`
    ///
    /// Signature is checked before the payload is inspected, so a tampered
    /// token is always reported as [`TokenError::InvalidSignature`].
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedToken, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| classify(e.kind()))?;
        let claims = data.claims;

        let subject_id = claims
            .sub
            .parse::<u64>()
            .map_err(|_| TokenError::Malformed)?;

        if now.timestamp() > claims.exp {
            debug!(
                subject_id,
                expired_at = %timestamp_display(claims.exp),
                "Token expired"
            );
            return Err(TokenError::Expired);
        }

        Ok(VerifiedToken {
            subject_id,
            role_id: claims.role_id,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}

fn timestamp_display(ts: i64) -> String {
    Utc.timestamp_opt(ts, 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

// ============================================================================
// Tests
// ============================================================================
