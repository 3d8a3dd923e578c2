/// Error types for Post Service
///
/// Every failure a handler can hit is an `AppError`; `to_status` is the only
/// place that decides what a gRPC caller gets to see.
use grpc_clients::IdentityError;
use thiserror::Error;
use tonic::Status;

/// Result type for post-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Request failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Image storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Caller identity could not be resolved upstream
    #[error("Identity service unavailable: {0}")]
    UpstreamUnavailable(#[from] IdentityError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// gRPC status for this error; internal details are not exposed
    pub fn to_status(&self) -> Status {
        match self {
            AppError::NotFound(msg) => Status::not_found(msg.clone()),
            AppError::Validation(msg) => Status::invalid_argument(msg.clone()),
            AppError::UpstreamUnavailable(_) => {
                Status::internal("failed to resolve caller identity")
            }
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal(_) => {
                Status::internal("internal server error")
            }
        }
    }

    /// Whether the error is the caller's fault rather than ours
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::NotFound(_) | AppError::Validation(_))
    }
}

/// Log `err` at the level it deserves and convert it for the wire
pub fn map_app_error(err: AppError, context: &str) -> Status {
    if err.is_client_error() {
        tracing::warn!(context, "Rejected request: {}", err);
    } else {
        tracing::error!(context, error = %err, "Request failed");
    }
    err.to_status()
}
