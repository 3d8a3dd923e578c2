/// Configuration management for Post Service
///
/// Everything is read from environment variables (optionally seeded from a
/// `.env` file by `main`). Only `JWT_SECRET_KEY` is mandatory.
use anyhow::{anyhow, bail, Context, Result};
use grpc_clients::GrpcConfig;
use grpc_jwt_propagation::{RoleTablePreset, UnlistedRoutePolicy};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub upstream: GrpcConfig,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub service_name: String,
    /// Server host to bind to
    pub host: String,
    /// gRPC port to bind to
    pub port: u16,
    /// Upper bound on draining in-flight calls at shutdown
    pub shutdown_grace: Duration,
}

/// Token verification and route authorization settings
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_duration: Duration,
    pub role_table: RoleTablePreset,
    /// JSON file replacing the preset table
    pub role_table_path: Option<PathBuf>,
    pub unlisted_policy: UnlistedRoutePolicy,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_duration", &self.token_duration)
            .field("role_table", &self.role_table)
            .field("role_table_path", &self.role_table_path)
            .field("unlisted_policy", &self.unlisted_policy)
            .finish()
    }
}

/// Database configuration
#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

/// Image storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub root: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET_KEY")
            .context("JWT_SECRET_KEY must be set")?;

        let token_duration = match std::env::var("JWT_TOKEN_DURATION") {
            Ok(raw) => parse_duration(&raw)
                .with_context(|| format!("Invalid JWT_TOKEN_DURATION: {raw}"))?,
            Err(_) => Duration::from_secs(30 * 60),
        };

        let role_table = match std::env::var("ROUTE_ROLE_TABLE") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("Invalid ROUTE_ROLE_TABLE: {raw}"))?,
            Err(_) => RoleTablePreset::default(),
        };

        let unlisted_policy = match std::env::var("UNLISTED_ROUTE_POLICY") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| anyhow!("Invalid UNLISTED_ROUTE_POLICY: {e}"))?,
            Err(_) => UnlistedRoutePolicy::default(),
        };

        Ok(Config {
            app: AppConfig {
                env: env_or("APP_ENV", "development"),
                service_name: env_or("SERVICE_NAME", "tracer-study-post-service"),
                host: env_or("GRPC_HOST", "0.0.0.0"),
                port: parse_env("PORT_GRPC", 8081)?,
                shutdown_grace: Duration::from_secs(parse_env("SHUTDOWN_GRACE_SECS", 30)?),
            },
            auth: AuthConfig {
                jwt_secret,
                token_duration,
                role_table,
                role_table_path: std::env::var("ROUTE_ROLE_TABLE_PATH")
                    .ok()
                    .filter(|p| !p.trim().is_empty())
                    .map(PathBuf::from),
                unlisted_policy,
            },
            database: DatabaseConfig {
                url: env_or("DATABASE_URL", "postgres://localhost/tracer_study"),
                max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
                min_connections: parse_env("DB_MIN_CONNECTIONS", 1)?,
                connect_timeout_secs: parse_env("DB_CONNECT_TIMEOUT_SECS", 5)?,
                acquire_timeout_secs: parse_env("DB_ACQUIRE_TIMEOUT_SECS", 10)?,
            },
            storage: StorageConfig {
                root: PathBuf::from(env_or("STORAGE_PATH", "./uploads/")),
            },
            upstream: GrpcConfig::from_env().context("Invalid upstream gRPC configuration")?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }

    pub fn grpc_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .app
            .host
            .trim()
            .parse()
            .with_context(|| format!("Invalid GRPC_HOST: {}", self.app.host))?;
        Ok(SocketAddr::new(ip, self.app.port))
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional numeric variable; a present but invalid value is an error
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid {key}={raw}: {e}")),
        Err(_) => Ok(default),
    }
}

/// Durations like `30m`, `12h`, `45s` or plain seconds
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    let (digits, multiplier) = match raw.char_indices().last() {
        Some((idx, 's')) => (&raw[..idx], 1),
        Some((idx, 'm')) => (&raw[..idx], 60),
        Some((idx, 'h')) => (&raw[..idx], 60 * 60),
        Some(_) => (raw, 1),
        None => bail!("empty duration"),
    };

    let value: u64 = digits.parse().with_context(|| format!("not a number: {digits}"))?;
    let secs = value
        .checked_mul(multiplier)
        .ok_or_else(|| anyhow!("duration overflow: {raw}"))?;
    if secs == 0 {
        bail!("duration must be positive");
    }
    Ok(Duration::from_secs(secs))
}
