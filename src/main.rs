use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use familiada::{api, auth, config::EngineConfig, engine::Engine};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "familiada=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Familiada answer judge...");

    let config = EngineConfig::from_env();
    let auth_config = Arc::new(auth::AuthConfig::from_env());

    // No partial engine: a missing model or question bank stops startup here
    let engine = match Engine::bootstrap(&config).await {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            tracing::error!("Engine failed to start: {}", e);
            std::process::exit(1);
        }
    };

    let app = api::router(engine, auth_config)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
