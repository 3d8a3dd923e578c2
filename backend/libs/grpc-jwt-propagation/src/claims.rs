//! Per-request identity derived from a verified token

use crate::roles::RoleId;
use crypto_core::jwt::VerifiedToken;

/// Identity of the caller, attached to request extensions by the gate
///
/// Lives only as long as the request it was derived from. Handlers read it
/// through [`crate::AuthContextExt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// Subject (user id)
    pub subject_id: u64,
    /// Role identifier carried by the token
    pub role_id: RoleId,
    /// Issued at (Unix timestamp, seconds)
    pub issued_at: i64,
    /// Expiration time (Unix timestamp, seconds)
    pub expires_at: i64,
}

impl From<VerifiedToken> for AuthContext {
    fn from(token: VerifiedToken) -> Self {
        Self {
            subject_id: token.subject_id,
            role_id: token.role_id,
            issued_at: token.issued_at,
            expires_at: token.expires_at,
        }
    }
}
