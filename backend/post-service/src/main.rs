use anyhow::Context;
use grpc_clients::{AuthClient, IdentityProvider};
use post_service::auth::build_gate;
use post_service::config::Config;
use post_service::db::{self, PgCommentRepository, PgPostRepository};
use post_service::grpc::{start_grpc_server, AppState};
use post_service::services::{CommentService, LocalImageStore, PostService};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,sqlx=warn,h2=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Post Service
///
/// Serves `tracer_study_grpc.PostService` and `tracer_study_grpc.CommentService`
/// plus `grpc.health.v1.Health` on `GRPC_HOST:PORT_GRPC`. Dependencies:
///
/// - PostgreSQL for posts and comments
/// - Local filesystem for post images
/// - Authentication service for the caller's profile
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        service = %config.app.service_name,
        env = %config.app.env,
        "Starting post service"
    );

    let gate = Arc::new(build_gate(&config.auth, config.is_production())?);

    let pool = db::create_pool(&config.database)
        .await
        .context("Failed to connect to PostgreSQL")?;
    db::migrate(&pool)
        .await
        .context("Failed to run database migrations")?;

    let images = Arc::new(
        LocalImageStore::init(config.storage.root.clone())
            .await
            .context("Failed to prepare image storage")?,
    );
    let identity: Arc<dyn IdentityProvider> = Arc::new(
        AuthClient::from_config(&config.upstream).context("Failed to create auth client")?,
    );

    let posts_repo = Arc::new(PgPostRepository::new(pool.clone()));
    let comments_repo = Arc::new(PgCommentRepository::new(pool.clone()));

    let state = AppState {
        posts: Arc::new(PostService::new(posts_repo.clone(), images, identity)),
        comments: Arc::new(CommentService::new(comments_repo, posts_repo)),
        gate,
    };

    let addr = config.grpc_addr()?;
    let (shutdown_tx, _) = broadcast::channel(1);
    let mut server = tokio::spawn(start_grpc_server(addr, state, shutdown_tx.subscribe()));

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let result = tokio::select! {
        joined = &mut server => joined.context("gRPC server task panicked")?,
        _ = &mut shutdown => {
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(());

            match tokio::time::timeout(config.app.shutdown_grace, &mut server).await {
                Ok(joined) => joined.context("gRPC server task panicked")?,
                Err(_) => {
                    tracing::warn!(
                        grace_secs = config.app.shutdown_grace.as_secs(),
                        "In-flight calls did not finish in time; aborting"
                    );
                    server.abort();
                    Ok(())
                }
            }
        }
    };

    pool.close().await;
    tracing::info!("Post service shutting down");
    result
}
