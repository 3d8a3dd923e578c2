//! Cryptographic primitives shared by the tracer-study services.
//!
//! - [`jwt`]: HS256 identity token issuance and verification
//! - [`secret`]: strength checks for symmetric signing secrets

pub mod jwt;
pub mod secret;

pub use jwt::{Claims, TokenError, TokenService, VerifiedToken};
pub use secret::{validate_secret_strength, SecretStrength};
