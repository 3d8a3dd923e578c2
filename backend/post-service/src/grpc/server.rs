// gRPC server assembly
use super::tracer_study_grpc::comment_service_server::CommentServiceServer;
use super::tracer_study_grpc::post_service_server::PostServiceServer;
use super::{CommentServiceImpl, PostServiceImpl};
use crate::services::{CommentService, PostService};
use anyhow::Context;
use grpc_jwt_propagation::{AuthorizationLayer, Gate};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic_health::server::health_reporter;

/// Everything the RPC handlers and the authorization layer share
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub gate: Arc<Gate>,
}

/// Bind `addr` and serve until a shutdown notification arrives
pub async fn start_grpc_server(
    addr: SocketAddr,
    state: AppState,
    mut shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind gRPC listener on {addr}"))?;

    tracing::info!("Starting gRPC server at {}", addr);

    serve(listener, state, async move {
        // Wait for shutdown notification; ignore errors if sender dropped.
        let _ = shutdown.recv().await;
    })
    .await
}

/// Serve PostService, CommentService and health checks on `listener`
///
/// Every call passes through the authorization layer before dispatch. Once
/// `signal` resolves the server stops accepting connections and returns
/// when in-flight calls have finished.
pub async fn serve<F>(listener: TcpListener, state: AppState, signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let (mut health, health_service) = health_reporter();
    health
        .set_serving::<PostServiceServer<PostServiceImpl>>()
        .await;
    health
        .set_serving::<CommentServiceServer<CommentServiceImpl>>()
        .await;

    tracing::info!(
        protected_routes = state.gate.registry().len(),
        "Authorization layer installed"
    );

    Server::builder()
        .layer(AuthorizationLayer::from_shared(state.gate.clone()))
        .add_service(health_service)
        .add_service(PostServiceServer::new(PostServiceImpl::new(
            state.posts.clone(),
        )))
        .add_service(CommentServiceServer::new(CommentServiceImpl::new(
            state.comments.clone(),
        )))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), signal)
        .await
        .context("gRPC server terminated with an error")?;

    tracing::info!("gRPC server stopped");
    Ok(())
}
