use super::CommentRepository;
use crate::error::Result;
use crate::models::{Comment, NewComment};
use async_trait::async_trait;
use sqlx::PgPool;

/// Create a new comment on a post
pub async fn create_comment(
    pool: &PgPool,
    comment: &NewComment,
) -> std::result::Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (post_id, comment_id, name, content, level)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, post_id, comment_id, name, content, level, created_at, updated_at, deleted_at
        "#,
    )
    .bind(comment.post_id)
    .bind(comment.comment_id)
    .bind(&comment.name)
    .bind(&comment.content)
    .bind(comment.level)
    .fetch_one(pool)
    .await
}

/// Get all comments (excluding soft-deleted)
pub async fn get_comments(pool: &PgPool) -> std::result::Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, post_id, comment_id, name, content, level, created_at, updated_at, deleted_at
        FROM comments
        WHERE deleted_at IS NULL
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Get all comments for a post (excluding soft-deleted)
pub async fn get_comments_by_post(
    pool: &PgPool,
    post_id: i64,
) -> std::result::Result<Vec<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, post_id, comment_id, name, content, level, created_at, updated_at, deleted_at
        FROM comments
        WHERE post_id = $1 AND deleted_at IS NULL
        ORDER BY created_at DESC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
}

/// Get a single comment by ID
pub async fn get_comment_by_id(
    pool: &PgPool,
    comment_id: i64,
) -> std::result::Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        SELECT id, post_id, comment_id, name, content, level, created_at, updated_at, deleted_at
        FROM comments
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(comment_id)
    .fetch_optional(pool)
    .await
}

/// Soft delete a comment
pub async fn delete_comment(pool: &PgPool, comment_id: i64) -> std::result::Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE comments
        SET deleted_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(comment_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// PostgreSQL-backed `CommentRepository`
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn find_all(&self) -> Result<Vec<Comment>> {
        Ok(get_comments(&self.pool).await?)
    }

    async fn find_by_post_id(&self, post_id: i64) -> Result<Vec<Comment>> {
        Ok(get_comments_by_post(&self.pool, post_id).await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        Ok(get_comment_by_id(&self.pool, id).await?)
    }

    async fn create(&self, comment: NewComment) -> Result<Comment> {
        Ok(create_comment(&self.pool, &comment).await?)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(delete_comment(&self.pool, id).await?)
    }
}
