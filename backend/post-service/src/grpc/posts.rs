// PostService gRPC implementation
use super::tracer_study_grpc::post_service_server::PostService as PostServiceRpc;
use super::tracer_study_grpc::{
    CreatePostRequest, DeletePostResponse, Empty, GetAllPostsResponse, GetPostByIdRequest,
    GetPostResponse,
};
use super::{code, deadline, parse_id};
use crate::error::{map_app_error, AppError};
use crate::models::{ImageUpload, PostInput};
use crate::services::{Caller, PostService};
use grpc_jwt_propagation::AuthContextExt;
use std::sync::Arc;
use tonic::{Request, Response, Status};

pub struct PostServiceImpl {
    posts: Arc<PostService>,
}

impl PostServiceImpl {
    pub fn new(posts: Arc<PostService>) -> Self {
        Self { posts }
    }
}

fn post_input(req: CreatePostRequest) -> Result<PostInput, AppError> {
    let is_featured = i32::try_from(req.is_featured)
        .map_err(|_| AppError::Validation("is_featured is out of range".to_string()))?;
    let image = (!req.image_buffer.is_empty()).then(|| ImageUpload {
        filename: req.image_filename,
        bytes: req.image_buffer,
    });

    Ok(PostInput {
        title: req.title,
        content: req.content,
        image,
        image_caption: req.image_caption,
        post_type: req.r#type,
        is_featured,
        tags: req.tags,
    })
}

#[tonic::async_trait]
impl PostServiceRpc for PostServiceImpl {
    async fn get_all_posts(
        &self,
        _request: Request<Empty>,
    ) -> Result<Response<GetAllPostsResponse>, Status> {
        let posts = self
            .posts
            .list()
            .await
            .map_err(|e| map_app_error(e, "get_all_posts"))?;

        tracing::info!(count = posts.len(), "gRPC: Listed posts");

        Ok(Response::new(GetAllPostsResponse {
            code: code::OK,
            message: "get all post success".to_string(),
            data: posts.into_iter().map(Into::into).collect(),
        }))
    }

    async fn get_post_by_id(
        &self,
        request: Request<GetPostByIdRequest>,
    ) -> Result<Response<GetPostResponse>, Status> {
        let id = parse_id(request.into_inner().id, "id")
            .map_err(|e| map_app_error(e, "get_post_by_id"))?;

        let post = self
            .posts
            .get(id)
            .await
            .map_err(|e| map_app_error(e, "get_post_by_id"))?;

        Ok(Response::new(GetPostResponse {
            code: code::OK,
            message: "get post success".to_string(),
            data: Some(post.into()),
        }))
    }

    async fn create_post(
        &self,
        request: Request<CreatePostRequest>,
    ) -> Result<Response<GetPostResponse>, Status> {
        let token = request.access_token()?.to_owned();
        let caller = Caller {
            token: &token,
            deadline: deadline::remaining(request.metadata()),
        };
        let input = post_input(request.into_inner()).map_err(|e| map_app_error(e, "create_post"))?;

        let post = self
            .posts
            .create(caller, input)
            .await
            .map_err(|e| map_app_error(e, "create_post"))?;

        Ok(Response::new(GetPostResponse {
            code: code::OK,
            message: "create post success".to_string(),
            data: Some(post.into()),
        }))
    }

    async fn update_post(
        &self,
        request: Request<CreatePostRequest>,
    ) -> Result<Response<GetPostResponse>, Status> {
        let token = request.access_token()?.to_owned();
        let caller = Caller {
            token: &token,
            deadline: deadline::remaining(request.metadata()),
        };
        let req = request.into_inner();
        let id = parse_id(req.id, "id").map_err(|e| map_app_error(e, "update_post"))?;
        let input = post_input(req).map_err(|e| map_app_error(e, "update_post"))?;

        let post = self
            .posts
            .update(caller, id, input)
            .await
            .map_err(|e| map_app_error(e, "update_post"))?;

        Ok(Response::new(GetPostResponse {
            code: code::OK,
            message: "update post success".to_string(),
            data: Some(post.into()),
        }))
    }

    async fn delete_post(
        &self,
        request: Request<GetPostByIdRequest>,
    ) -> Result<Response<DeletePostResponse>, Status> {
        let id = parse_id(request.into_inner().id, "id")
            .map_err(|e| map_app_error(e, "delete_post"))?;

        self.posts
            .delete(id)
            .await
            .map_err(|e| map_app_error(e, "delete_post"))?;

        Ok(Response::new(DeletePostResponse {
            code: code::OK,
            message: "delete post success".to_string(),
        }))
    }

    async fn add_visitor(
        &self,
        request: Request<GetPostByIdRequest>,
    ) -> Result<Response<GetPostResponse>, Status> {
        let id = parse_id(request.into_inner().id, "id")
            .map_err(|e| map_app_error(e, "add_visitor"))?;

        let post = self
            .posts
            .add_visitor(id)
            .await
            .map_err(|e| map_app_error(e, "add_visitor"))?;

        Ok(Response::new(GetPostResponse {
            code: code::OK,
            message: "increment visitor success".to_string(),
            data: Some(post.into()),
        }))
    }
}
