//! Server-side Authorization Gate
//!
//! Runs in front of every RPC: extracts the raw `authorization` metadata
//! value, verifies it, checks the caller's role against the route table and
//! either dispatches with an [`AuthContext`] in the request extensions or
//! answers with a gRPC error without touching the handler.
//!
//! Implemented as a tower layer: the route key is the request path, which
//! tonic interceptors do not receive.

use crate::claims::AuthContext;
use crate::roles::{RoleId, RouteRoleRegistry};
use crate::AUTHORIZATION_METADATA_KEY;
use chrono::{DateTime, Utc};
use crypto_core::jwt::{TokenError, TokenService};
use futures::future::BoxFuture;
use std::str::FromStr;
use std::sync::Arc;
use std::task::{Context, Poll};
use tonic::body::BoxBody;
use tonic::Status;
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Uniform message for every token failure
const UNAUTHENTICATED_MESSAGE: &str = "missing or invalid authorization token";
const PERMISSION_DENIED_MESSAGE: &str = "role is not permitted to call this method";

// ============================================================================
// Decision
// ============================================================================

/// What to do with routes that have no entry in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnlistedRoutePolicy {
    /// No token needed. A valid token, if present, still yields an AuthContext.
    #[default]
    AllowAnonymous,
    /// Any verified token is enough; role is not checked.
    RequireAuthentication,
}

impl FromStr for UnlistedRoutePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow-anonymous" | "allow_anonymous" => Ok(UnlistedRoutePolicy::AllowAnonymous),
            "require-authentication" | "require_authentication" => {
                Ok(UnlistedRoutePolicy::RequireAuthentication)
            }
            other => Err(format!("unknown unlisted route policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No `authorization` metadata on a protected route
    MissingToken,
    /// Token present but failed verification
    InvalidToken(TokenError),
    /// Token verified but the role is not in the route's RoleSet
    PermissionDenied { role_id: RoleId },
}

impl Rejection {
    /// Label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::MissingToken => "missing_token",
            Rejection::InvalidToken(err) => err.kind(),
            Rejection::PermissionDenied { .. } => "permission_denied",
        }
    }

    /// Caller-facing status; all token failures share one message
    pub fn to_status(&self) -> Status {
        match self {
            Rejection::MissingToken | Rejection::InvalidToken(_) => {
                Status::unauthenticated(UNAUTHENTICATED_MESSAGE)
            }
            Rejection::PermissionDenied { .. } => Status::permission_denied(PERMISSION_DENIED_MESSAGE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Dispatch; the context is absent for anonymous calls to unlisted routes
    Allowed(Option<AuthContext>),
    Rejected(Rejection),
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allowed(_))
    }
}

// ============================================================================
// Gate
// ============================================================================

/// Immutable authorization policy shared by all in-flight requests
#[derive(Debug)]
pub struct Gate {
    tokens: TokenService,
    registry: RouteRoleRegistry,
    unlisted: UnlistedRoutePolicy,
}

impl Gate {
    pub fn new(tokens: TokenService, registry: RouteRoleRegistry) -> Self {
        Self {
            tokens,
            registry,
            unlisted: UnlistedRoutePolicy::default(),
        }
    }

    pub fn with_unlisted_policy(mut self, policy: UnlistedRoutePolicy) -> Self {
        self.unlisted = policy;
        self
    }

    pub fn registry(&self) -> &RouteRoleRegistry {
        &self.registry
    }

    /// Role check alone: unlisted routes permit every role
    pub fn authorize(&self, route: &str, role: RoleId) -> bool {
        self.registry
            .required_roles(route)
            .map_or(true, |roles| roles.contains(role))
    }

    /// Full decision for one call
    ///
    /// `token` is the raw metadata value, `None` when absent.
    pub fn decide(&self, route: &str, token: Option<&str>, now: DateTime<Utc>) -> GateDecision {
        let required = self.registry.required_roles(route);

        if required.is_none() && self.unlisted == UnlistedRoutePolicy::AllowAnonymous {
            let ctx = token.and_then(|t| match self.tokens.verify_at(t, now) {
                Ok(verified) => Some(AuthContext::from(verified)),
                Err(err) => {
                    debug!(route, kind = err.kind(), "Ignoring invalid token on unlisted route");
                    None
                }
            });
            return GateDecision::Allowed(ctx);
        }

        let Some(token) = token else {
            return GateDecision::Rejected(Rejection::MissingToken);
        };

        let ctx = match self.tokens.verify_at(token, now) {
            Ok(verified) => AuthContext::from(verified),
            Err(err) => return GateDecision::Rejected(Rejection::InvalidToken(err)),
        };

        match required {
            Some(roles) if !roles.contains(ctx.role_id) => {
                GateDecision::Rejected(Rejection::PermissionDenied { role_id: ctx.role_id })
            }
            _ => GateDecision::Allowed(Some(ctx)),
        }
    }

    /// Decide for an incoming HTTP/2 request and log the outcome
    fn check<B>(&self, request: &http::Request<B>) -> GateDecision {
        let route = request.uri().path();
        let raw = request.headers().get(AUTHORIZATION_METADATA_KEY);

        // A header that is not visible ASCII cannot be a token.
        let decision = match raw.map(|v| v.to_str()) {
            Some(Err(_)) if self.registry.required_roles(route).is_some()
                || self.unlisted == UnlistedRoutePolicy::RequireAuthentication =>
            {
                GateDecision::Rejected(Rejection::InvalidToken(TokenError::Malformed))
            }
            Some(Err(_)) => GateDecision::Allowed(None),
            Some(Ok(token)) => self.decide(route, Some(token), Utc::now()),
            None => self.decide(route, None, Utc::now()),
        };

        match &decision {
            GateDecision::Allowed(Some(ctx)) => debug!(
                route,
                subject_id = ctx.subject_id,
                role_id = ctx.role_id,
                "Request authorized"
            ),
            GateDecision::Allowed(None) => debug!(route, "Anonymous request on unlisted route"),
            GateDecision::Rejected(Rejection::PermissionDenied { role_id }) => warn!(
                route,
                role_id,
                kind = "permission_denied",
                "Request rejected"
            ),
            GateDecision::Rejected(rejection) => {
                warn!(route, kind = rejection.kind(), "Request rejected")
            }
        }

        decision
    }
}

// ============================================================================
// Tower integration
// ============================================================================

/// Layer wrapping a gRPC router with the [`Gate`]
#[derive(Debug, Clone)]
pub struct AuthorizationLayer {
    gate: Arc<Gate>,
}

impl AuthorizationLayer {
    pub fn new(gate: Gate) -> Self {
        Self {
            gate: Arc::new(gate),
        }
    }

    pub fn from_shared(gate: Arc<Gate>) -> Self {
        Self { gate }
    }
}

impl<S> Layer<S> for AuthorizationLayer {
    type Service = AuthorizationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthorizationService {
            inner,
            gate: Arc::clone(&self.gate),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthorizationService<S> {
    inner: S,
    gate: Arc<Gate>,
}

impl<S, ReqBody> Service<http::Request<ReqBody>> for AuthorizationService<S>
where
    S: Service<http::Request<ReqBody>, Response = http::Response<BoxBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = http::Response<BoxBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: http::Request<ReqBody>) -> Self::Future {
        match self.gate.check(&request) {
            GateDecision::Allowed(ctx) => {
                if let Some(ctx) = ctx {
                    request.extensions_mut().insert(ctx);
                }

                // The ready service is the one that was polled; leave a fresh
                // clone behind for the next call.
                let clone = self.inner.clone();
                let mut inner = std::mem::replace(&mut self.inner, clone);
                Box::pin(async move { inner.call(request).await })
            }
            GateDecision::Rejected(rejection) => {
                let response = status_response(rejection.to_status());
                Box::pin(futures::future::ready(Ok::<_, S::Error>(response)))
            }
        }
    }
}

/// Trailers-only gRPC response carrying `status`
fn status_response(status: Status) -> http::Response<BoxBody> {
    let mut response = http::Response::new(tonic::body::empty_body());
    let headers = response.headers_mut();
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/grpc"),
    );
    if status.add_header(headers).is_err() {
        warn!("Failed to encode gRPC status headers");
    }
    response
}
