//! In-memory repositories with switchable write failures

use async_trait::async_trait;
use chrono::{Duration, Utc};
use post_service::db::{CommentRepository, PostRepository};
use post_service::error::{AppError, Result};
use post_service::models::{Comment, NewComment, NewPost, Post, PostChanges};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

fn write_failure() -> AppError {
    AppError::Database(sqlx::Error::Protocol("connection reset".to_string()))
}

#[derive(Default)]
pub struct MemoryPostRepository {
    rows: Mutex<Vec<Post>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryPostRepository {
    /// Rows including soft-deleted ones
    pub fn rows(&self) -> Vec<Post> {
        self.rows.lock().unwrap().clone()
    }

    /// Number of successful writes
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(write_failure());
        }
        Ok(())
    }

    fn live_mut<'a>(rows: &'a mut [Post], id: i64) -> Option<&'a mut Post> {
        rows.iter_mut()
            .find(|p| p.id == id && p.deleted_at.is_none())
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn find_all(&self) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.deleted_at.is_none())
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id && p.deleted_at.is_none())
            .cloned())
    }

    async fn create(&self, post: NewPost) -> Result<Post> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        // Distinct, increasing creation times
        let now = Utc::now() + Duration::milliseconds(id);
        let row = Post {
            id,
            title: post.title,
            slug: post.slug,
            content: post.content,
            image_path: post.image_path,
            image_caption: post.image_caption,
            post_type: post.post_type,
            is_featured: post.is_featured,
            visitors: 0,
            updated_by: post.created_by.clone(),
            created_by: post.created_by,
            tags: post.tags,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        rows.push(row.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(row)
    }

    async fn update(&self, id: i64, changes: PostChanges) -> Result<Option<Post>> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let Some(post) = Self::live_mut(&mut rows, id) else {
            return Ok(None);
        };

        if let Some(v) = changes.title {
            post.title = v;
        }
        if let Some(v) = changes.slug {
            post.slug = v;
        }
        if let Some(v) = changes.content {
            post.content = v;
        }
        if let Some(v) = changes.image_path {
            post.image_path = v;
        }
        if let Some(v) = changes.image_caption {
            post.image_caption = v;
        }
        if let Some(v) = changes.post_type {
            post.post_type = v;
        }
        if let Some(v) = changes.is_featured {
            post.is_featured = v;
        }
        if let Some(v) = changes.tags {
            post.tags = v;
        }
        post.updated_by = changes.updated_by;
        post.updated_at = Utc::now();

        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(post.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let Some(post) = Self::live_mut(&mut rows, id) else {
            return Ok(false);
        };
        post.deleted_at = Some(Utc::now());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn increment_visitors(&self, id: i64) -> Result<Option<Post>> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let Some(post) = Self::live_mut(&mut rows, id) else {
            return Ok(None);
        };
        post.visitors += 1;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(Some(post.clone()))
    }
}

#[derive(Default)]
pub struct MemoryCommentRepository {
    rows: Mutex<Vec<Comment>>,
}

impl MemoryCommentRepository {
    pub fn rows(&self) -> Vec<Comment> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn find_all(&self) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.deleted_at.is_none())
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn find_by_post_id(&self, post_id: i64) -> Result<Vec<Comment>> {
        let mut comments = self.find_all().await?;
        comments.retain(|c| c.post_id == post_id);
        Ok(comments)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id && c.deleted_at.is_none())
            .cloned())
    }

    async fn create(&self, comment: NewComment) -> Result<Comment> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        let now = Utc::now() + Duration::milliseconds(id);
        let row = Comment {
            id,
            post_id: comment.post_id,
            comment_id: comment.comment_id,
            name: comment.name,
            content: comment.content,
            level: comment.level,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|c| c.id == id && c.deleted_at.is_none())
        {
            Some(comment) => {
                comment.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
