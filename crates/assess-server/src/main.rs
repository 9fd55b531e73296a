//! Assessment server
//!
//! Serves the assessment engine over HTTP together with health checks and
//! Prometheus metrics.

use anyhow::Result;
use assess_lib::{
    health::HealthRegistry,
    observability::{AssessMetrics, StructuredLogger},
    Assessor, FileCatalog, MemorySink, PricingCatalog, StaticCatalog,
};
use assess_server::{api, config::ServerConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting assess-server");

    let config = ServerConfig::load()?;
    info!(
        instance = %config.instance_name,
        duplicate_policy = %config.duplicate_policy,
        persistence_policy = %config.persistence_policy,
        sink_capacity = config.sink_capacity,
        "Service configured"
    );

    let health_registry = HealthRegistry::new();

    let metrics = AssessMetrics::new();
    let logger = StructuredLogger::new(&config.instance_name);

    let catalog: Arc<dyn PricingCatalog> = match &config.catalog_path {
        Some(path) => Arc::new(FileCatalog::new(path)),
        None => Arc::new(StaticCatalog::reference()),
    };
    let sink = Arc::new(MemorySink::with_capacity(
        config.duplicate_policy,
        config.sink_capacity,
    ));

    logger.log_startup(SERVICE_VERSION, &catalog.describe());

    let assessor = Assessor::new(catalog, sink)
        .with_persistence_policy(config.persistence_policy)
        .with_logger(logger.clone());

    // A broken catalog file is reported through health, not a startup failure
    health_registry
        .observe_pricing(&assessor.pricing().await)
        .await;

    let app_state = Arc::new(api::AppState::new(
        health_registry.clone(),
        metrics,
        Arc::new(assessor),
    ));

    health_registry.set_ready(true).await;

    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    api_handle.abort();
    info!("Shutting down");

    Ok(())
}
