use super::PostRepository;
use crate::error::Result;
use crate::models::{NewPost, Post, PostChanges};
use async_trait::async_trait;
use sqlx::PgPool;

const POST_COLUMNS: &str = "id, title, slug, content, image_path, image_caption, type, \
     is_featured, visitors, created_by, updated_by, tags, created_at, updated_at, deleted_at";

/// Get all posts (excluding soft-deleted), newest first
pub async fn get_posts(pool: &PgPool) -> std::result::Result<Vec<Post>, sqlx::Error> {
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE deleted_at IS NULL ORDER BY created_at DESC"
    );
    sqlx::query_as::<_, Post>(&sql).fetch_all(pool).await
}

/// Get a single post by ID
pub async fn get_post_by_id(
    pool: &PgPool,
    post_id: i64,
) -> std::result::Result<Option<Post>, sqlx::Error> {
    let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1 AND deleted_at IS NULL");
    sqlx::query_as::<_, Post>(&sql)
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

/// Insert a post; the creator is also recorded as the last editor
pub async fn create_post(pool: &PgPool, post: &NewPost) -> std::result::Result<Post, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO posts (title, slug, content, image_path, image_caption, type,
                           is_featured, visitors, created_by, updated_by, tags)
        VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $8, $9)
        RETURNING {POST_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Post>(&sql)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(&post.image_path)
        .bind(&post.image_caption)
        .bind(&post.post_type)
        .bind(post.is_featured)
        .bind(&post.created_by)
        .bind(&post.tags)
        .fetch_one(pool)
        .await
}

/// Update the columns present in `changes`
pub async fn update_post(
    pool: &PgPool,
    post_id: i64,
    changes: &PostChanges,
) -> std::result::Result<Option<Post>, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE posts
        SET title = COALESCE($2, title),
            slug = COALESCE($3, slug),
            content = COALESCE($4, content),
            image_path = COALESCE($5, image_path),
            image_caption = COALESCE($6, image_caption),
            type = COALESCE($7, type),
            is_featured = COALESCE($8, is_featured),
            tags = COALESCE($9, tags),
            updated_by = $10,
            updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {POST_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Post>(&sql)
        .bind(post_id)
        .bind(&changes.title)
        .bind(&changes.slug)
        .bind(&changes.content)
        .bind(&changes.image_path)
        .bind(&changes.image_caption)
        .bind(&changes.post_type)
        .bind(changes.is_featured)
        .bind(&changes.tags)
        .bind(&changes.updated_by)
        .fetch_optional(pool)
        .await
}

/// Soft delete a post
pub async fn delete_post(pool: &PgPool, post_id: i64) -> std::result::Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE posts
        SET deleted_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(post_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Increment the visitor counter atomically
pub async fn increment_visitors(
    pool: &PgPool,
    post_id: i64,
) -> std::result::Result<Option<Post>, sqlx::Error> {
    let sql = format!(
        r#"
        UPDATE posts
        SET visitors = visitors + 1
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING {POST_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Post>(&sql)
        .bind(post_id)
        .fetch_optional(pool)
        .await
}

/// PostgreSQL-backed `PostRepository`
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>> {
        Ok(get_posts(&self.pool).await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>> {
        Ok(get_post_by_id(&self.pool, id).await?)
    }

    async fn create(&self, post: NewPost) -> Result<Post> {
        Ok(create_post(&self.pool, &post).await?)
    }

    async fn update(&self, id: i64, changes: PostChanges) -> Result<Option<Post>> {
        Ok(update_post(&self.pool, id, &changes).await?)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(delete_post(&self.pool, id).await?)
    }

    async fn increment_visitors(&self, id: i64) -> Result<Option<Post>> {
        Ok(increment_visitors(&self.pool, id).await?)
    }
}
