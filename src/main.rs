use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use recap::api::{create_session_router, ApiAppState};
use recap::config::Config;
use recap::oauth::{
    create_oauth_router, run_state_cleanup, GoogleOAuthConfig, OAuthAppState, StateManager,
};
use recap::store::SessionStore;
use recap::summarize::Summarizer;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

const STATE_CLEANUP_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recap=info".into()),
        )
        .init();

    info!("Recap starting...");

    // Fail fast on incomplete configuration
    let config = Config::from_env().context("Configuration error")?;
    info!(
        port = config.port,
        frontend_origin = %config.frontend_origin,
        callback_mode = ?config.callback_mode,
        "Configuration loaded"
    );

    // Process-local session state; lost on restart by design
    let store = Arc::new(SessionStore::new());
    let state_manager = StateManager::new(config.state_ttl_secs);
    tokio::spawn(run_state_cleanup(
        state_manager.clone(),
        STATE_CLEANUP_INTERVAL_SECS,
    ));

    let google = GoogleOAuthConfig::from_config(&config);
    let summarizer = Arc::new(Summarizer::new(
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    ));

    let oauth_router = create_oauth_router(OAuthAppState {
        store: Arc::clone(&store),
        state_manager,
        google: google.clone(),
        youtube_base_url: recap::youtube::BASE_URL.to_string(),
        frontend_origin: config.frontend_origin.clone(),
        callback_mode: config.callback_mode,
    });

    let api_router = create_session_router(ApiAppState {
        store: Arc::clone(&store),
        google,
        summarizer,
        youtube_base_url: recap::youtube::BASE_URL.to_string(),
        max_videos: config.max_videos,
        max_comments: config.max_comments,
    });

    // CORS restricted to the single configured frontend origin
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_origin
                .parse::<HeaderValue>()
                .context("RECAP_FRONTEND_ORIGIN is not a valid origin")?,
        )
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    let app = oauth_router.merge(api_router).layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .context("Failed to bind HTTP port")?;
    info!(port = config.port, "Recap listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "HTTP server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    info!("Recap stopped");

    Ok(())
}
