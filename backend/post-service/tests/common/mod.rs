//! Test doubles for post-service integration tests
#![allow(dead_code)]

pub mod fake_images;
pub mod memory_repos;
pub mod mock_identity;

use fake_images::FakeImageStore;
use memory_repos::{MemoryCommentRepository, MemoryPostRepository};
use mock_identity::MockIdentity;
use post_service::services::{CommentService, PostService};
use std::sync::Arc;

/// Services wired to in-memory collaborators, with handles to inspect them
pub struct Fixture {
    pub posts: Arc<MemoryPostRepository>,
    pub comments: Arc<MemoryCommentRepository>,
    pub images: Arc<FakeImageStore>,
    pub identity: Arc<MockIdentity>,
    pub post_service: Arc<PostService>,
    pub comment_service: Arc<CommentService>,
}

impl Fixture {
    pub fn new(identity: MockIdentity) -> Self {
        let posts = Arc::new(MemoryPostRepository::default());
        let comments = Arc::new(MemoryCommentRepository::default());
        let images = Arc::new(FakeImageStore::default());
        let identity = Arc::new(identity);

        let post_service = Arc::new(PostService::new(
            posts.clone(),
            images.clone(),
            identity.clone(),
        ));
        let comment_service = Arc::new(CommentService::new(comments.clone(), posts.clone()));

        Self {
            posts,
            comments,
            images,
            identity,
            post_service,
            comment_service,
        }
    }

    pub fn with_user(username: &str) -> Self {
        Self::new(MockIdentity::returning(username))
    }
}
