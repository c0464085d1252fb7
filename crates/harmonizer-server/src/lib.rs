//! Harmonizer Server
//!
//! HTTP surface for governance rule extraction: single-text extraction,
//! document uploads, a static category summary, and a health check.

#![warn(missing_docs)]

pub mod config;
pub mod cors;
pub mod handlers;

use config::{ConfigError, ServerConfig};
use cors::CorsPolicy;
use handlers::{create_router, AppState};
use harmonizer_extractor::RuleExtractor;
use harmonizer_llm::build_provider;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the extractor described by `config`, seed rules included
pub fn build_extractor(config: &ServerConfig) -> Result<Arc<RuleExtractor>, ServerError> {
    let provider = build_provider(&config.provider).map_err(ConfigError::Provider)?;
    let extractor = Arc::new(RuleExtractor::new(provider, config.extractor.clone()));

    for seed in &config.seed_rules {
        extractor
            .seed_memory(seed.id.as_str(), seed.yaml.as_str())
            .map_err(|e| ServerError::Server(e.to_string()))?;
    }
    if !config.seed_rules.is_empty() {
        info!("Seeded {} rules", config.seed_rules.len());
    }

    Ok(extractor)
}

/// Start the HTTP server
///
/// Builds the provider and extractor, serves until Ctrl-C, then clears rule
/// memory.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    // RUST_LOG overrides the default level
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    info!("Starting Harmonizer server");
    info!("Bind address: {}", config.bind_addr());
    info!("Allowed origins: {:?}", config.allowed_origins);

    let extractor = build_extractor(&config)?;
    let app = create_router(
        AppState::new(Arc::clone(&extractor)),
        CorsPolicy::new(&config.allowed_origins),
    );

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    let memory = extractor.memory();
    let cleared = memory
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clear();
    info!("Shut down; cleared {} rules from memory", cleared);

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
