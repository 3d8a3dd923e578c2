//! Role-Based Authorization for gRPC Microservices
//!
//! This library enforces route-level access control in front of every RPC a
//! service exposes, and forwards the caller's token to upstream services.
//!
//! ## Core Components
//!
//! - **RouteRoleRegistry**: Immutable table of `/<package>.<Service>/<Method>` to permitted roles
//! - **Gate**: Pure allow/deny decision from route, token and clock
//! - **AuthorizationLayer**: Tower layer running the gate before dispatch
//! - **AuthContext / AuthContextExt**: Verified identity exposed to handlers
//! - **JwtClientInterceptor**: Copies the caller's raw token onto outgoing calls
//!
//! ## Request Pipeline
//!
//! 1. Extract the `authorization` metadata value (raw, no `Bearer ` prefix handling)
//! 2. Verify it with `crypto_core::jwt::TokenService`
//! 3. Look up the route; unlisted routes carry no role restriction
//! 4. Dispatch with `AuthContext` in the request extensions, or reject
//!
//! Rejections never reach the handler. Token failures surface as
//! `Status::unauthenticated` with a uniform message; a valid token without a
//! permitted role surfaces as `Status::permission_denied`.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use chrono::Duration;
//! use crypto_core::jwt::TokenService;
//! use grpc_jwt_propagation::{AuthorizationLayer, Gate, RoleTablePreset, RouteRoleRegistry};
//!
//! let tokens = TokenService::new(b"signing-secret-from-environment!!", Duration::minutes(30));
//! let registry = RouteRoleRegistry::preset(RoleTablePreset::PostAdmin);
//! let layer = AuthorizationLayer::new(Gate::new(tokens, registry));
//!
//! // tonic::transport::Server::builder().layer(layer).add_service(...)
//! ```

mod claims;
mod client;
mod extensions;
mod roles;
mod server;

pub use claims::AuthContext;
pub use client::JwtClientInterceptor;
pub use extensions::AuthContextExt;
pub use roles::{
    role, route_key, RegistryError, RoleId, RoleSet, RoleTablePreset, RouteRoleRegistry,
    RouteRoleRegistryBuilder, PACKAGE,
};
pub use server::{
    AuthorizationLayer, AuthorizationService, Gate, GateDecision, Rejection, UnlistedRoutePolicy,
};

/// Metadata key carrying the raw token, inbound and outbound
pub const AUTHORIZATION_METADATA_KEY: &str = "authorization";

// Re-export tonic Status for convenience
pub use tonic::Status;
