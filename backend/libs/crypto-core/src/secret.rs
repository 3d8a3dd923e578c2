//! Signing secret strength checks
//!
//! HS256 is only as strong as its shared secret. Services call
//! [`ensure_signing_secret`] at startup before building a token service.

use anyhow::{bail, Result};

const MIN_SECRET_LENGTH: usize = 32; // 256 bits minimum
const RECOMMENDED_SECRET_LENGTH: usize = 64;
const MIN_ENTROPY_BITS_PER_BYTE: f64 = 4.0;
const STRONG_ENTROPY_BITS_PER_BYTE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretStrength {
    /// Reject in production
    Weak,
    /// Usable, logged as a warning
    Acceptable,
    Strong,
}

/// Classify a symmetric secret
///
/// - shorter than 32 bytes: weak
/// - Shannon entropy below 4 bits/byte: weak
/// - runs of 4 repeated or sequential bytes: weak
/// - 64+ bytes with entropy of at least 5 bits/byte: strong
pub fn validate_secret_strength(secret: &str) -> SecretStrength {
    let bytes = secret.as_bytes();

    if bytes.len() < MIN_SECRET_LENGTH {
        return SecretStrength::Weak;
    }

    let entropy = shannon_entropy(bytes);
    if entropy < MIN_ENTROPY_BITS_PER_BYTE || has_obvious_patterns(bytes) {
        return SecretStrength::Weak;
    }

    if bytes.len() >= RECOMMENDED_SECRET_LENGTH && entropy >= STRONG_ENTROPY_BITS_PER_BYTE {
        SecretStrength::Strong
    } else {
        SecretStrength::Acceptable
    }
}

/// Startup gate for a signing secret
///
/// Empty secrets are always rejected. Weak secrets are rejected when
/// `strict` is set and tolerated otherwise; the caller decides how loudly to
/// report the returned strength.
pub fn ensure_signing_secret(secret: &str, strict: bool) -> Result<SecretStrength> {
    if secret.is_empty() {
        bail!("JWT signing secret is empty");
    }

    let strength = validate_secret_strength(secret);
    if strict && strength == SecretStrength::Weak {
        bail!(
            "JWT signing secret is too weak: need at least {} random bytes",
            MIN_SECRET_LENGTH
        );
    }

    Ok(strength)
}

/// Bits per byte, 0 to 8
fn shannon_entropy(data: &[u8]) -> f64 {
    let mut freq = [0u32; 256];
    for &byte in data {
        freq[byte as usize] += 1;
    }

    let len = data.len() as f64;
    freq.iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

fn has_obvious_patterns(data: &[u8]) -> bool {
    let mut repeated = 1;
    let mut sequential = 1;

    for window in data.windows(2) {
        repeated = if window[0] == window[1] { repeated + 1 } else { 1 };
        sequential = if window[1] as i16 - window[0] as i16 == 1 {
            sequential + 1
        } else {
            1
        };

        if repeated >= 4 || sequential >= 4 {
            return true;
        }
    }

    false
}
