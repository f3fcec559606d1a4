//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use roost_core::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::constants::API_PREFIX;
use crate::handlers::{health, media, timeline, tweet};
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    tracing::info!(
        max_request_body_bytes = config.max_request_body_bytes(),
        max_form_file_bytes = config.max_form_file_bytes(),
        "Body limits configured"
    );

    let app = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .nest(API_PREFIX, twitter_routes())
        // Multipart bodies over the server limit surface as a 413 stream error
        .layer(DefaultBodyLimit::max(config.max_request_body_bytes()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

fn twitter_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/statuses/user_timeline", get(timeline::user_timeline))
        .route("/statuses/mentions_timeline", get(timeline::mentions_timeline))
        .route("/statuses/hash", get(timeline::hash))
        .route("/statuses/update", post(tweet::update))
        .route("/statuses/update_with_media", post(tweet::update_with_media))
        .route("/statuses/destroy/{id}", post(tweet::destroy))
        .route("/media/upload", post(media::upload))
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
