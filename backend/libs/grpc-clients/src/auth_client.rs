//! AuthService Client
//!
//! Resolves the profile of the user behind a token by calling the
//! Authentication service's `GetCurrentUser`. The caller's token is forwarded
//! unchanged as `authorization` metadata.
//!
//! - No caching: every call goes upstream.
//! - No retries: failures are returned to the caller as-is.
//! - Bounded: each call is capped by the smaller of the caller's remaining
//!   deadline and the configured request timeout.
//! - Cancellable: dropping the returned future abandons the upstream call.

use crate::config::GrpcConfig;
use crate::tracer_study_grpc::{auth_service_client::AuthServiceClient, Empty, User};
use async_trait::async_trait;
use grpc_jwt_propagation::JwtClientInterceptor;
use std::time::{Duration, Instant};
use thiserror::Error;
use tonic::transport::Channel;
use tonic::{Code, Status};
use tracing::{debug, warn};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(2000);

#[derive(Debug, Error)]
pub enum IdentityError {
    /// Token cannot be carried as metadata
    #[error("authorization token cannot be forwarded")]
    InvalidToken,

    /// Transport failure or error status from the Authentication service
    #[error("auth service call failed: {0}")]
    Upstream(#[from] Status),

    /// Upstream answered without a user
    #[error("auth service returned no user profile")]
    EmptyProfile,
}

/// Source of the caller's profile
///
/// Handlers depend on this trait so tests can substitute the upstream call.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Profile of the user identified by `token`
    ///
    /// `deadline` is the time the caller has left, if it set one.
    async fn current_user(&self, token: &str, deadline: Option<Duration>) -> Result<User, IdentityError>;
}

/// AuthService client over a shared channel
#[derive(Clone, Debug)]
pub struct AuthClient {
    channel: Channel,
    request_timeout: Duration,
}

impl AuthClient {
    /// Create from Channel directly (typically created with connect_lazy())
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Create from configuration without connecting
    pub fn from_config(config: &GrpcConfig) -> anyhow::Result<Self> {
        tracing::info!("Creating auth service gRPC client: {}", config.auth_service_url);

        let channel = config.lazy_channel(&config.auth_service_url)?;
        Ok(Self::new(channel).with_request_timeout(config.request_timeout()))
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Time budget for one call
    pub fn effective_timeout(&self, deadline: Option<Duration>) -> Duration {
        deadline.map_or(self.request_timeout, |d| d.min(self.request_timeout))
    }
}

#[async_trait]
impl IdentityProvider for AuthClient {
    async fn current_user(&self, token: &str, deadline: Option<Duration>) -> Result<User, IdentityError> {
        let interceptor = JwtClientInterceptor::new(token).map_err(|_| IdentityError::InvalidToken)?;
        let mut client = AuthServiceClient::with_interceptor(self.channel.clone(), interceptor);

        let timeout = self.effective_timeout(deadline);
        let mut request = tonic::Request::new(Empty {});
        request.set_timeout(timeout);

        debug!(timeout_ms = timeout.as_millis() as u64, "Calling AuthService.GetCurrentUser");

        let started = Instant::now();
        let response = match tokio::time::timeout(timeout, client.get_current_user(request)).await {
            Ok(result) => result.map_err(|status| budget_status(status, started.elapsed() >= timeout)),
            Err(_) => Err(Status::deadline_exceeded("auth service call timed out")),
        }
        .map_err(|status| {
            warn!(code = ?status.code(), "AuthService.GetCurrentUser failed: {}", status.message());
            IdentityError::Upstream(status)
        })?;

        response.into_inner().data.ok_or(IdentityError::EmptyProfile)
    }
}

/// tonic reports its own request timeout as `Cancelled`
fn budget_status(status: Status, budget_spent: bool) -> Status {
    if budget_spent && status.code() == Code::Cancelled {
        Status::deadline_exceeded("auth service call timed out")
    } else {
        status
    }
}
