// CommentService gRPC implementation
use super::tracer_study_grpc::comment_service_server::CommentService as CommentServiceRpc;
use super::tracer_study_grpc::{
    Comment, DeleteCommentResponse, Empty, GetAllCommentsResponse, GetCommentByIdRequest,
    GetCommentResponse, GetCommentsByPostIdRequest,
};
use super::{code, parse_id};
use crate::error::map_app_error;
use crate::services::{CommentInput, CommentService};
use std::sync::Arc;
use tonic::{Request, Response, Status};

pub struct CommentServiceImpl {
    comments: Arc<CommentService>,
}

impl CommentServiceImpl {
    pub fn new(comments: Arc<CommentService>) -> Self {
        Self { comments }
    }
}

#[tonic::async_trait]
impl CommentServiceRpc for CommentServiceImpl {
    async fn get_all_comments(
        &self,
        _request: Request<Empty>,
    ) -> Result<Response<GetAllCommentsResponse>, Status> {
        let comments = self
            .comments
            .list()
            .await
            .map_err(|e| map_app_error(e, "get_all_comments"))?;

        Ok(Response::new(GetAllCommentsResponse {
            code: code::OK,
            message: "get all comments success".to_string(),
            data: comments.into_iter().map(Into::into).collect(),
        }))
    }

    async fn get_comments_by_post_id(
        &self,
        request: Request<GetCommentsByPostIdRequest>,
    ) -> Result<Response<GetAllCommentsResponse>, Status> {
        let post_id = parse_id(request.into_inner().post_id, "post_id")
            .map_err(|e| map_app_error(e, "get_comments_by_post_id"))?;

        let comments = self
            .comments
            .list_for_post(post_id)
            .await
            .map_err(|e| map_app_error(e, "get_comments_by_post_id"))?;

        Ok(Response::new(GetAllCommentsResponse {
            code: code::OK,
            message: "get comments by post id success".to_string(),
            data: comments.into_iter().map(Into::into).collect(),
        }))
    }

    async fn get_comment_by_id(
        &self,
        request: Request<GetCommentByIdRequest>,
    ) -> Result<Response<GetCommentResponse>, Status> {
        let id = parse_id(request.into_inner().id, "id")
            .map_err(|e| map_app_error(e, "get_comment_by_id"))?;

        let comment = self
            .comments
            .get(id)
            .await
            .map_err(|e| map_app_error(e, "get_comment_by_id"))?;

        Ok(Response::new(GetCommentResponse {
            code: code::OK,
            message: "get comment success".to_string(),
            data: Some(comment.into()),
        }))
    }

    async fn create_comment(
        &self,
        request: Request<Comment>,
    ) -> Result<Response<GetCommentResponse>, Status> {
        let req = request.into_inner();
        let post_id =
            parse_id(req.post_id, "post_id").map_err(|e| map_app_error(e, "create_comment"))?;

        let comment = self
            .comments
            .create(
                post_id,
                CommentInput {
                    name: req.name,
                    content: req.content,
                },
            )
            .await
            .map_err(|e| map_app_error(e, "create_comment"))?;

        Ok(Response::new(GetCommentResponse {
            code: code::CREATED,
            message: "create comment success".to_string(),
            data: Some(comment.into()),
        }))
    }

    async fn reply_comment(
        &self,
        request: Request<Comment>,
    ) -> Result<Response<GetCommentResponse>, Status> {
        let req = request.into_inner();
        let parent_id =
            parse_id(req.comment_id, "comment_id").map_err(|e| map_app_error(e, "reply_comment"))?;

        let comment = self
            .comments
            .reply(
                parent_id,
                CommentInput {
                    name: req.name,
                    content: req.content,
                },
            )
            .await
            .map_err(|e| map_app_error(e, "reply_comment"))?;

        Ok(Response::new(GetCommentResponse {
            code: code::CREATED,
            message: "reply comment success".to_string(),
            data: Some(comment.into()),
        }))
    }

    async fn delete_comment(
        &self,
        request: Request<GetCommentByIdRequest>,
    ) -> Result<Response<DeleteCommentResponse>, Status> {
        let id = parse_id(request.into_inner().id, "id")
            .map_err(|e| map_app_error(e, "delete_comment"))?;

        self.comments
            .delete(id)
            .await
            .map_err(|e| map_app_error(e, "delete_comment"))?;

        Ok(Response::new(DeleteCommentResponse {
            code: code::OK,
            message: "delete comment success".to_string(),
        }))
    }
}
