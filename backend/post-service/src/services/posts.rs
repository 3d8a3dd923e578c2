/// Post service - handles post creation, retrieval, and management
///
/// Writes that record an author resolve the caller through the
/// Authentication service first; if that fails nothing is stored.
use super::slug::slugify;
use super::storage::ImageStore;
use crate::db::PostRepository;
use crate::error::{AppError, Result};
use crate::models::{ImageUpload, NewPost, Post, PostChanges, PostInput};
use grpc_clients::{IdentityProvider, User};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Caller credentials forwarded to the Authentication service
#[derive(Debug, Clone, Copy)]
pub struct Caller<'a> {
    /// Raw `authorization` value as received
    pub token: &'a str,
    /// Time left before the inbound call's deadline
    pub deadline: Option<Duration>,
}

pub struct PostService {
    repo: Arc<dyn PostRepository>,
    images: Arc<dyn ImageStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl PostService {
    pub fn new(
        repo: Arc<dyn PostRepository>,
        images: Arc<dyn ImageStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            repo,
            images,
            identity,
        }
    }

    pub async fn list(&self) -> Result<Vec<Post>> {
        self.repo.find_all().await
    }

    pub async fn get(&self, id: i64) -> Result<Post> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("post not found".to_string()))
    }

    pub async fn create(&self, caller: Caller<'_>, input: PostInput) -> Result<Post> {
        if input.title.trim().is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }
        if input.content.trim().is_empty() {
            return Err(AppError::Validation("content is required".to_string()));
        }

        let user = self.resolve_caller(caller).await?;
        let image_path = self.store_image(input.image.as_ref()).await?;

        let new_post = NewPost {
            slug: slugify(&input.title),
            title: input.title,
            content: input.content,
            image_path: image_path.clone().unwrap_or_default(),
            image_caption: input.image_caption,
            post_type: input.post_type,
            is_featured: input.is_featured,
            created_by: user.username,
            tags: input.tags,
        };

        match self.repo.create(new_post).await {
            Ok(post) => {
                info!(post_id = post.id, created_by = %post.created_by, "Post created");
                Ok(post)
            }
            Err(err) => {
                self.discard_image(image_path.as_deref()).await;
                Err(err)
            }
        }
    }

    /// Apply the non-empty fields of `input` to post `id`
    pub async fn update(&self, caller: Caller<'_>, id: i64, input: PostInput) -> Result<Post> {
        let existing = self.get(id).await?;
        let user = self.resolve_caller(caller).await?;
        let new_image = self.store_image(input.image.as_ref()).await?;

        let changes = changes_for(&existing, input, new_image.clone(), user.username);

        let result = match self.repo.update(id, changes).await {
            Ok(Some(post)) => Ok(post),
            Ok(None) => Err(AppError::NotFound("post not found".to_string())),
            Err(err) => Err(err),
        };

        match result {
            Ok(post) => {
                if new_image.is_some() {
                    self.discard_image(non_empty(&existing.image_path)).await;
                }
                info!(post_id = post.id, updated_by = %post.updated_by, "Post updated");
                Ok(post)
            }
            Err(err) => {
                self.discard_image(new_image.as_deref()).await;
                Err(err)
            }
        }
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let existing = self.get(id).await?;

        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("post not found".to_string()));
        }
        self.discard_image(non_empty(&existing.image_path)).await;

        info!(post_id = id, "Post deleted");
        Ok(())
    }

    pub async fn add_visitor(&self, id: i64) -> Result<Post> {
        self.repo
            .increment_visitors(id)
            .await?
            .ok_or_else(|| AppError::NotFound("post not found".to_string()))
    }

    async fn resolve_caller(&self, caller: Caller<'_>) -> Result<User> {
        self.identity
            .current_user(caller.token, caller.deadline)
            .await
            .map_err(|err| {
                warn!(error = %err, "Could not resolve caller identity");
                AppError::from(err)
            })
    }

    async fn store_image(&self, image: Option<&ImageUpload>) -> Result<Option<String>> {
        match image {
            Some(upload) if !upload.bytes.is_empty() => {
                let name = self.images.save(&upload.filename, &upload.bytes).await?;
                Ok(Some(name))
            }
            _ => Ok(None),
        }
    }

    /// Best-effort removal; a leftover file is logged, not fatal
    async fn discard_image(&self, stored_name: Option<&str>) {
        if let Some(name) = stored_name {
            if let Err(err) = self.images.delete(name).await {
                warn!(image = %name, error = %err, "Failed to delete image");
            }
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

fn non_empty_owned(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Empty strings and a zero `is_featured` mean "keep the current value"
fn changes_for(
    existing: &Post,
    input: PostInput,
    image_path: Option<String>,
    updated_by: String,
) -> PostChanges {
    let slug = (!input.title.is_empty() && input.title != existing.title)
        .then(|| slugify(&input.title));

    PostChanges {
        title: non_empty_owned(input.title),
        slug,
        content: non_empty_owned(input.content),
        image_path,
        image_caption: non_empty_owned(input.image_caption),
        post_type: non_empty_owned(input.post_type),
        is_featured: (input.is_featured != 0).then_some(input.is_featured),
        tags: non_empty_owned(input.tags),
        updated_by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post() -> Post {
        Post {
            id: 1,
            title: "Alumni Gathering".into(),
            slug: "alumni-gathering".into(),
            content: "See you there".into(),
            image_path: "1-old.png".into(),
            image_caption: "old".into(),
            post_type: "news".into(),
            is_featured: 1,
            visitors: 3,
            created_by: "admin".into(),
            updated_by: "admin".into(),
            tags: "event".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_changes_skip_empty_fields() {
        let changes = changes_for(&post(), PostInput::default(), None, "editor".into());

        assert_eq!(
            changes,
            PostChanges {
                updated_by: "editor".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_slug_regenerated_only_on_title_change() {
        let same_title = PostInput {
            title: "Alumni Gathering".into(),
            ..Default::default()
        };
        assert_eq!(changes_for(&post(), same_title, None, "e".into()).slug, None);

        let new_title = PostInput {
            title: "Alumni Gathering 2025".into(),
            ..Default::default()
        };
        assert_eq!(
            changes_for(&post(), new_title, None, "e".into()).slug.as_deref(),
            Some("alumni-gathering-2025")
        );
    }

    #[test]
    fn test_changes_carry_new_image() {
        let changes = changes_for(&post(), PostInput::default(), Some("2-new.png".into()), "e".into());
        assert_eq!(changes.image_path.as_deref(), Some("2-new.png"));
    }

    mod mocked {
        use super::*;
        use async_trait::async_trait;
        use grpc_clients::IdentityError;
        use mockall::mock;
        use tonic::Status;

        mock! {
            Identity {}
            #[async_trait]
            impl IdentityProvider for Identity {
                async fn current_user(&self, token: &str, deadline: Option<Duration>) -> std::result::Result<User, IdentityError>;
            }
        }

        mock! {
            Repo {}
            #[async_trait]
            impl PostRepository for Repo {
                async fn find_all(&self) -> Result<Vec<Post>>;
                async fn find_by_id(&self, id: i64) -> Result<Option<Post>>;
                async fn create(&self, post: NewPost) -> Result<Post>;
                async fn update(&self, id: i64, changes: PostChanges) -> Result<Option<Post>>;
                async fn delete(&self, id: i64) -> Result<bool>;
                async fn increment_visitors(&self, id: i64) -> Result<Option<Post>>;
            }
        }

        mock! {
            Images {}
            #[async_trait]
            impl ImageStore for Images {
                async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String>;
                async fn delete(&self, stored_name: &str) -> Result<()>;
            }
        }

        fn input() -> PostInput {
            PostInput {
                title: "Job Fair".into(),
                content: "Details".into(),
                image: Some(ImageUpload {
                    filename: "a.png".into(),
                    bytes: vec![1, 2, 3],
                }),
                ..Default::default()
            }
        }

        #[tokio::test]
        async fn test_identity_failure_touches_nothing() {
            let mut identity = MockIdentity::new();
            identity
                .expect_current_user()
                .times(1)
                .returning(|_, _| Err(IdentityError::Upstream(Status::unavailable("down"))));
            let mut repo = MockRepo::new();
            repo.expect_create().never();
            let mut images = MockImages::new();
            images.expect_save().never();

            let service = PostService::new(Arc::new(repo), Arc::new(images), Arc::new(identity));
            let caller = Caller {
                token: "t",
                deadline: None,
            };

            let err = service.create(caller, input()).await.unwrap_err();
            assert!(matches!(err, AppError::UpstreamUnavailable(_)));
        }

        #[tokio::test]
        async fn test_token_and_deadline_passed_through() {
            let mut identity = MockIdentity::new();
            identity
                .expect_current_user()
                .withf(|token, deadline| {
                    token == "raw-token" && *deadline == Some(Duration::from_millis(250))
                })
                .times(1)
                .returning(|_, _| {
                    Ok(User {
                        id: 1,
                        username: "rina".into(),
                        ..Default::default()
                    })
                });
            let mut repo = MockRepo::new();
            repo.expect_create()
                .withf(|p| p.created_by == "rina" && p.slug == "job-fair" && p.image_path == "1-a.png")
                .times(1)
                .returning(|p| {
                    let mut row = post();
                    row.created_by = p.created_by;
                    Ok(row)
                });
            let mut images = MockImages::new();
            images
                .expect_save()
                .times(1)
                .returning(|name, _| Ok(format!("1-{name}")));

            let service = PostService::new(Arc::new(repo), Arc::new(images), Arc::new(identity));
            let caller = Caller {
                token: "raw-token",
                deadline: Some(Duration::from_millis(250)),
            };

            let created = service.create(caller, input()).await.unwrap();
            assert_eq!(created.created_by, "rina");
        }
    }
}
