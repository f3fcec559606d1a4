//! Application setup and initialization

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use roost_client::TwitterClient;
use roost_core::Config;
use roost_services::{build_cache, TwitterProxy};

use crate::state::AppState;
use crate::telemetry;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    let log_format = std::env::var("LOG_FORMAT").ok();
    telemetry::init_telemetry(telemetry::json_requested(log_format.as_deref()))
        .context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.base.environment,
        screen_name = %config.proxy.screen_name,
        cache = ?config.cache,
        "Configuration loaded and validated successfully"
    );

    let remote = TwitterClient::new(&config.remote).context("Failed to build Twitter client")?;
    let cache = build_cache(&config.cache);
    let proxy = TwitterProxy::new(Arc::new(remote), cache, config.proxy.clone());
    let state = Arc::new(AppState::new(proxy, config.clone()));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
