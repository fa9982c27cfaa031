use speed_challenge::{router, AppConfig, AppState, FileScoreRepository, ScoreService};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "speed_challenge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    info!(data_dir = %config.data_dir.display(), "Starting speed challenge server");

    let repository = FileScoreRepository::open(&config.data_dir)
        .await
        .expect("Failed to prepare data directory");
    let score_service = Arc::new(ScoreService::new(Arc::new(repository)));
    let app_state = AppState::new(score_service, config.game.clone());

    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr.as_str())
        .await
        .expect("Failed to bind listener");
    info!(addr = %config.bind_addr, "Server running");
    axum::serve(listener, app).await.expect("Server error");
}
