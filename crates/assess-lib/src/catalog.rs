//! Pricing catalog providers
//!
//! The engine only ever sees a read-only [`PricingSnapshot`]; where it comes
//! from (a built-in reference list, a JSON file refreshed by an external job)
//! is the provider's concern.

use crate::error::CatalogError;
use crate::models::{InstanceOffer, PricingSnapshot, ProviderCatalog};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Source of per-provider instance offers
#[async_trait]
pub trait PricingCatalog: Send + Sync {
    /// Snapshot used for one assessment run
    async fn snapshot(&self) -> Result<PricingSnapshot, CatalogError>;

    /// Short description for logs and health output
    fn describe(&self) -> String;
}

/// Catalog backed by an in-memory snapshot
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    snapshot: PricingSnapshot,
}

impl StaticCatalog {
    pub fn new(snapshot: PricingSnapshot) -> Self {
        Self { snapshot }
    }

    /// On-demand Linux list prices for common general-purpose and memory-optimized sizes
    pub fn reference() -> Self {
        let mut snapshot = PricingSnapshot::new();

        snapshot.insert(
            "aws".to_string(),
            ProviderCatalog {
                region: "us-east-1".to_string(),
                instances: vec![
                    InstanceOffer::new("t3.medium", "General purpose", 2.0, 4.0, 0.0416),
                    InstanceOffer::new("m5.large", "General purpose", 2.0, 8.0, 0.096),
                    InstanceOffer::new("m5.xlarge", "General purpose", 4.0, 16.0, 0.192),
                    InstanceOffer::new("m5.2xlarge", "General purpose", 8.0, 32.0, 0.384),
                    InstanceOffer::new("m5.4xlarge", "General purpose", 16.0, 64.0, 0.768),
                    InstanceOffer::new("r5.4xlarge", "Memory optimized", 16.0, 128.0, 1.008),
                    InstanceOffer::new("m5.8xlarge", "General purpose", 32.0, 128.0, 1.536),
                    InstanceOffer::new("r5.8xlarge", "Memory optimized", 32.0, 256.0, 2.016),
                ],
            },
        );

        snapshot.insert(
            "azure".to_string(),
            ProviderCatalog {
                region: "eastus".to_string(),
                instances: vec![
                    InstanceOffer::new("B2s", "Burstable", 2.0, 4.0, 0.0416),
                    InstanceOffer::new("D2s_v5", "General purpose", 2.0, 8.0, 0.096),
                    InstanceOffer::new("D4s_v5", "General purpose", 4.0, 16.0, 0.192),
                    InstanceOffer::new("D8s_v5", "General purpose", 8.0, 32.0, 0.384),
                    InstanceOffer::new("D16s_v5", "General purpose", 16.0, 64.0, 0.768),
                    InstanceOffer::new("E16s_v5", "Memory optimized", 16.0, 128.0, 1.008),
                    InstanceOffer::new("D32s_v5", "General purpose", 32.0, 128.0, 1.536),
                    InstanceOffer::new("E32s_v5", "Memory optimized", 32.0, 256.0, 2.016),
                ],
            },
        );

        snapshot.insert(
            "gcp".to_string(),
            ProviderCatalog {
                region: "us-east1".to_string(),
                instances: vec![
                    InstanceOffer::new("e2-medium", "General Purpose", 2.0, 4.0, 0.0335),
                    InstanceOffer::new("e2-standard-2", "General Purpose", 2.0, 8.0, 0.067),
                    InstanceOffer::new("e2-standard-4", "General Purpose", 4.0, 16.0, 0.134),
                    InstanceOffer::new("e2-standard-8", "General Purpose", 8.0, 32.0, 0.268),
                    InstanceOffer::new("e2-standard-16", "General Purpose", 16.0, 64.0, 0.536),
                    InstanceOffer::new("n2-highmem-16", "Memory Optimized", 16.0, 128.0, 1.048),
                    InstanceOffer::new("e2-standard-32", "General Purpose", 32.0, 128.0, 1.072),
                    InstanceOffer::new("n2-highmem-32", "Memory Optimized", 32.0, 256.0, 2.096),
                ],
            },
        );

        Self { snapshot }
    }
}

#[async_trait]
impl PricingCatalog for StaticCatalog {
    async fn snapshot(&self) -> Result<PricingSnapshot, CatalogError> {
        Ok(self.snapshot.clone())
    }

    fn describe(&self) -> String {
        format!("static ({} providers)", self.snapshot.len())
    }
}

/// Catalog read from a JSON file on every snapshot
///
/// The file maps provider names to `{region, instances}` and is expected to
/// be refreshed out of band by a pricing importer.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl PricingCatalog for FileCatalog {
    async fn snapshot(&self) -> Result<PricingSnapshot, CatalogError> {
        let path = self.path.display().to_string();
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;

        let snapshot: PricingSnapshot =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse { path, source })?;

        debug!(
            path = %self.path.display(),
            providers = snapshot.len(),
            "Loaded pricing catalog"
        );
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        format!("file ({})", self.path.display())
    }
}
