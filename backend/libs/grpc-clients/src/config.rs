/// gRPC Configuration
///
/// Endpoint and timeout settings for upstream gRPC calls, loaded from the
/// environment with development defaults.
use anyhow::{bail, Context, Result};
use std::env;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

#[derive(Debug, Clone)]
pub struct GrpcConfig {
    /// Auth Service endpoint
    pub auth_service_url: String,

    /// gRPC connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// Upper bound for a single upstream call, in milliseconds
    pub request_timeout_ms: u64,

    /// HTTP/2 keep-alive interval in seconds
    pub keepalive_interval_secs: u64,

    /// HTTP/2 keep-alive timeout in seconds
    pub keepalive_timeout_secs: u64,
}

impl GrpcConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to development defaults. A variable that is
    /// set must hold a positive integer.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            auth_service_url: env::var("GRPC_AUTH_SERVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8082".to_string()),
            connection_timeout_secs: positive_env("GRPC_CONNECTION_TIMEOUT_SECS", 10)?,
            request_timeout_ms: positive_env("GRPC_REQUEST_TIMEOUT_MS", 2000)?,
            keepalive_interval_secs: positive_env("GRPC_KEEPALIVE_INTERVAL_SECS", 30)?,
            keepalive_timeout_secs: positive_env("GRPC_KEEPALIVE_TIMEOUT_SECS", 10)?,
        })
    }

    /// Configuration for development/testing
    pub fn development() -> Self {
        Self {
            auth_service_url: "http://127.0.0.1:8082".to_string(),
            connection_timeout_secs: 10,
            request_timeout_ms: 2000,
            keepalive_interval_secs: 30,
            keepalive_timeout_secs: 10,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Build a tonic Endpoint from URL with connect timeout and keepalive
    ///
    /// The per-call bound is set on each request by the client.
    pub fn make_endpoint(&self, url: &str) -> Result<Endpoint> {
        let endpoint = Endpoint::from_shared(url.to_string())
            .with_context(|| format!("Invalid gRPC endpoint URL: {url}"))?
            .connect_timeout(Duration::from_secs(self.connection_timeout_secs))
            .http2_keep_alive_interval(Duration::from_secs(self.keepalive_interval_secs))
            .keep_alive_timeout(Duration::from_secs(self.keepalive_timeout_secs))
            .tcp_nodelay(true);

        Ok(endpoint)
    }

    /// Channel that connects on first use, so startup never blocks on upstreams
    pub fn lazy_channel(&self, url: &str) -> Result<Channel> {
        Ok(self.make_endpoint(url)?.connect_lazy())
    }
}

fn positive_env(key: &str, default: u64) -> Result<u64> {
    let Ok(raw) = env::var(key) else {
        return Ok(default);
    };
    let value: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("Invalid {key}: {raw:?}"))?;
    if value == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(value)
}
