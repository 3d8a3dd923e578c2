/// Data models for post-service
///
/// - `Post` / `Comment`: rows as stored, soft-deleted rows carry `deleted_at`
/// - `NewPost` / `PostChanges` / `NewComment`: repository write inputs
/// - `PostInput` / `ImageUpload`: what a create or update request asks for
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image_path: String,
    pub image_caption: String,
    #[sqlx(rename = "type")]
    pub post_type: String,
    pub is_featured: i32,
    pub visitors: i64,
    pub created_by: String,
    pub updated_by: String,
    pub tags: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image_path: String,
    pub image_caption: String,
    pub post_type: String,
    pub is_featured: i32,
    pub created_by: String,
    pub tags: String,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub image_path: Option<String>,
    pub image_caption: Option<String>,
    pub post_type: Option<String>,
    pub is_featured: Option<i32>,
    pub tags: Option<String>,
    pub updated_by: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Fields of a create or update request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub image: Option<ImageUpload>,
    pub image_caption: String,
    pub post_type: String,
    pub is_featured: i32,
    pub tags: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    /// Parent comment, 0 for a top-level comment
    pub comment_id: i64,
    pub name: String,
    pub content: String,
    pub level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub post_id: i64,
    pub comment_id: i64,
    pub name: String,
    pub content: String,
    pub level: i32,
}
