//! Service configuration

use anyhow::{Context, Result};
use assess_lib::{sink::DEFAULT_SINK_CAPACITY, DuplicatePolicy, PersistencePolicy};
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::path::PathBuf;

/// Assessment service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Instance name attached to structured log events
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Port for the assessment API, health and metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Pricing snapshot file; the built-in reference catalog is used when unset
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    #[serde(default)]
    pub persistence_policy: PersistencePolicy,

    /// Assessments kept in memory before the oldest is evicted
    #[serde(default = "default_sink_capacity")]
    pub sink_capacity: usize,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "vm-assessor".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_sink_capacity() -> usize {
    DEFAULT_SINK_CAPACITY
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            api_port: default_api_port(),
            catalog_path: None,
            duplicate_policy: DuplicatePolicy::default(),
            persistence_policy: PersistencePolicy::default(),
            sink_capacity: default_sink_capacity(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `ASSESS_*` environment variables
    pub fn load() -> Result<Self> {
        Self::from_builder(
            config::Config::builder()
                .add_source(config::Environment::with_prefix("ASSESS").try_parsing(true)),
        )
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config = builder.build().context("Failed to build configuration")?;
        config
            .try_deserialize()
            .context("Invalid ASSESS_* configuration")
    }
}
