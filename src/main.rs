// region:    --- Imports
use auction_market::config::AppConfig;
use auction_market::database::DatabaseManager;
use auction_market::handlers;
use auction_market::state::AppState;
use axum::extract::DefaultBodyLimit;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = Arc::new(AppConfig::from_env()?);

    let db = Arc::new(DatabaseManager::new(&config.database_url).await?);
    if let Err(e) = db.initialize_database().await {
        error!("{:<12} --> Database initialization failed: {:?}", "Main", e);
        return Err(e.into());
    }
    db.seed_defaults(&config.admin_email, &config.admin_password)
        .await?;
    info!("{:<12} --> Database ready", "Main");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 16MB cap, matching the image upload limit
    let routes_all = handlers::router(AppState::new(db, Arc::clone(&config)))
        .layer(cors)
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024));

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
