//! zapis server binary: wires config, database, services, and the router.

use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zapis_api::AppState;
use zapis_common::{Config, FeedCache, LocalStorage, StorageBackend};
use zapis_core::{
    CommentService, FollowingService, GroupService, PostService, TimelineService, UserService,
};
use zapis_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zapis=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "starting zapis"
    );

    let db = Arc::new(zapis_db::init(&config).await?);
    zapis_db::migrate(&db).await?;
    tracing::info!("database ready");

    let storage: Arc<dyn StorageBackend> = Arc::new(LocalStorage::new(
        config.storage.files_path.clone(),
        config.storage.files_url.clone(),
    ));

    let users = UserRepository::new(db.clone());
    let groups = GroupRepository::new(db.clone());
    let posts = PostRepository::new(db.clone());
    let comments = CommentRepository::new(db.clone());
    let follows = FollowRepository::new(db);

    let state = AppState {
        users: UserService::new(users.clone()),
        groups: GroupService::new(groups.clone()),
        posts: PostService::new(posts.clone(), groups.clone(), storage),
        comments: CommentService::new(comments.clone(), posts.clone()),
        following: FollowingService::new(follows.clone(), users.clone()),
        timeline: TimelineService::new(posts, groups, users, comments, follows),
        feed_cache: FeedCache::with_ttl(Duration::from_secs(config.cache.feed_ttl_secs)),
    };

    let app = zapis_api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install terminate handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
