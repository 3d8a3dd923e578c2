/// Database access layer
///
/// This module provides:
/// - Connection pooling and schema migrations
/// - Repository traits the services depend on
/// - PostgreSQL repository implementations
pub mod comment_repo;
pub mod post_repo;

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::models::{Comment, NewComment, NewPost, Post, PostChanges};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{error, info};

pub use comment_repo::PgCommentRepository;
pub use post_repo::PgPostRepository;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Post persistence
///
/// Soft-deleted posts are invisible to every method.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// All posts, newest first
    async fn find_all(&self) -> Result<Vec<Post>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>>;

    async fn create(&self, post: NewPost) -> Result<Post>;

    /// Apply `changes`; `None` when the post does not exist
    async fn update(&self, id: i64, changes: PostChanges) -> Result<Option<Post>>;

    /// Soft delete; `false` when the post does not exist
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Add one to the visitor counter; `None` when the post does not exist
    async fn increment_visitors(&self, id: i64) -> Result<Option<Post>>;
}

/// Comment persistence
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// All comments, newest first
    async fn find_all(&self) -> Result<Vec<Comment>>;

    /// Comments of one post, newest first
    async fn find_by_post_id(&self, post_id: i64) -> Result<Vec<Comment>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>>;

    async fn create(&self, comment: NewComment) -> Result<Comment>;

    /// Soft delete; `false` when the comment does not exist
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// Create the PostgreSQL pool and verify it answers
pub async fn create_pool(config: &DatabaseConfig) -> std::result::Result<PgPool, sqlx::Error> {
    info!(
        max_connections = config.max_connections,
        "Creating database pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    match tokio::time::timeout(
        Duration::from_secs(config.connect_timeout_secs),
        sqlx::query("SELECT 1").execute(&pool),
    )
    .await
    {
        Ok(Ok(_)) => {
            info!("Database pool created and verified successfully");
            Ok(pool)
        }
        Ok(Err(e)) => {
            error!(error = %e, "Database connection verification failed");
            Err(e)
        }
        Err(_) => {
            error!(
                timeout_secs = config.connect_timeout_secs,
                "Database connection verification timeout"
            );
            Err(sqlx::Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "Database verification timeout",
            )))
        }
    }
}

/// Run pending migrations
pub async fn migrate(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}
