/// Post Service Library
///
/// gRPC PostService and CommentService for the tracer study platform. Every
/// call passes the route-role authorization layer; writes that record an
/// author resolve the caller through the Authentication service.
///
/// # Modules
///
/// - `auth`: builds the authorization gate from configuration
/// - `config`: Configuration management
/// - `db`: Repositories, connection pool and migrations
/// - `error`: Error types and their gRPC mapping
/// - `grpc`: RPC handlers and server assembly
/// - `models`: Posts and comments
/// - `services`: Business logic, image storage and slugs
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod grpc;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
