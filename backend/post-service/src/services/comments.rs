/// Comment service - top-level comments, threaded replies and removal
use crate::db::{CommentRepository, PostRepository};
use crate::error::{AppError, Result};
use crate::models::{Comment, NewComment};
use std::sync::Arc;
use tracing::info;

/// Author and text of a new comment or reply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentInput {
    pub name: String,
    pub content: String,
}

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    pub async fn list(&self) -> Result<Vec<Comment>> {
        self.comments.find_all().await
    }

    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        self.comments.find_by_post_id(post_id).await
    }

    pub async fn get(&self, id: i64) -> Result<Comment> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("comment not found".to_string()))
    }

    /// Top-level comment on an existing post
    pub async fn create(&self, post_id: i64, input: CommentInput) -> Result<Comment> {
        validate(&input)?;
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(AppError::NotFound("post not found".to_string()));
        }

        let comment = self
            .comments
            .create(NewComment {
                post_id,
                comment_id: 0,
                name: input.name,
                content: input.content,
                level: 0,
            })
            .await?;

        info!(comment_id = comment.id, post_id, "Comment created");
        Ok(comment)
    }

    /// Reply one level below `parent_id`, on the parent's post
    pub async fn reply(&self, parent_id: i64, input: CommentInput) -> Result<Comment> {
        validate(&input)?;
        let parent = self
            .comments
            .find_by_id(parent_id)
            .await?
            .ok_or_else(|| AppError::NotFound("parent comment not found".to_string()))?;

        let comment = self
            .comments
            .create(NewComment {
                post_id: parent.post_id,
                comment_id: parent.id,
                name: input.name,
                content: input.content,
                level: parent.level + 1,
            })
            .await?;

        info!(
            comment_id = comment.id,
            parent_id,
            level = comment.level,
            "Reply created"
        );
        Ok(comment)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.comments.delete(id).await? {
            return Err(AppError::NotFound("comment not found".to_string()));
        }
        info!(comment_id = id, "Comment deleted");
        Ok(())
    }
}

fn validate(input: &CommentInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    if input.content.trim().is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }
    Ok(())
}
