//! gRPC surface of the service
//!
//! - `posts` / `comments`: PostService and CommentService implementations
//! - `server`: server assembly behind the authorization layer
//! - `deadline`: inbound `grpc-timeout` handling

pub mod comments;
pub mod deadline;
pub mod posts;
pub mod server;

pub mod tracer_study_grpc {
    tonic::include_proto!("tracer_study_grpc");
}

pub use comments::CommentServiceImpl;
pub use posts::PostServiceImpl;
pub use server::{serve, start_grpc_server, AppState};

use crate::error::{AppError, Result};
use crate::models::{Comment, Post};
use chrono::{DateTime, Utc};

/// HTTP-style status numbers carried in response bodies
pub(crate) mod code {
    pub const OK: u32 = 200;
    pub const CREATED: u32 = 201;
}

pub(crate) fn timestamp(dt: DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: dt.timestamp(),
        nanos: dt.timestamp_subsec_nanos() as i32,
    }
}

/// Wire ids are unsigned; storage ids are `BIGINT`
pub(crate) fn parse_id(id: u64, what: &str) -> Result<i64> {
    i64::try_from(id).map_err(|_| AppError::Validation(format!("{what} is out of range")))
}

impl From<Post> for tracer_study_grpc::Post {
    fn from(post: Post) -> Self {
        Self {
            id: post.id as u64,
            title: post.title,
            slug: post.slug,
            content: post.content,
            image_path: post.image_path,
            image_caption: post.image_caption,
            r#type: post.post_type,
            is_featured: post.is_featured.max(0) as u32,
            visitors: post.visitors.max(0) as u64,
            created_by: post.created_by,
            updated_by: post.updated_by,
            created_at: Some(timestamp(post.created_at)),
            updated_at: Some(timestamp(post.updated_at)),
            tags: post.tags,
        }
    }
}

impl From<Comment> for tracer_study_grpc::Comment {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id as u64,
            post_id: comment.post_id as u64,
            comment_id: comment.comment_id as u64,
            name: comment.name,
            content: comment.content,
            level: comment.level.max(0) as u32,
            created_at: Some(timestamp(comment.created_at)),
            updated_at: Some(timestamp(comment.updated_at)),
        }
    }
}
