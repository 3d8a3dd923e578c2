/// Authorization wiring
///
/// Turns `AuthConfig` into the `Gate` every RPC passes through.
use crate::config::AuthConfig;
use anyhow::Context;
use crypto_core::jwt::TokenService;
use crypto_core::secret::ensure_signing_secret;
use crypto_core::SecretStrength;
use grpc_jwt_propagation::{Gate, RouteRoleRegistry};
use tracing::{info, warn};

/// Build the gate; a weak secret is fatal when `strict_secret` is set
pub fn build_gate(config: &AuthConfig, strict_secret: bool) -> anyhow::Result<Gate> {
    match ensure_signing_secret(&config.jwt_secret, strict_secret)? {
        SecretStrength::Weak => warn!("JWT_SECRET_KEY is weak; use at least 32 random bytes"),
        SecretStrength::Acceptable => info!("JWT_SECRET_KEY strength is acceptable"),
        SecretStrength::Strong => info!("JWT_SECRET_KEY strength is strong"),
    }

    let ttl = chrono::Duration::from_std(config.token_duration)
        .context("JWT_TOKEN_DURATION is out of range")?;
    let tokens = TokenService::new(config.jwt_secret.as_bytes(), ttl);

    let registry = match &config.role_table_path {
        Some(path) => RouteRoleRegistry::from_json_file(path)
            .with_context(|| format!("Failed to load route-role table from {}", path.display()))?,
        None => RouteRoleRegistry::preset(config.role_table),
    };

    for (route, roles) in registry.entries() {
        info!(route, roles = %roles, "Protected route");
    }
    info!(
        routes = registry.len(),
        unlisted_policy = ?config.unlisted_policy,
        "Route-role table loaded"
    );

    Ok(Gate::new(tokens, registry).with_unlisted_policy(config.unlisted_policy))
}
