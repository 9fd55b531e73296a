//! Assessment library for VM-to-cloud migration planning
//!
//! This crate provides the core functionality for:
//! - Normalizing inventory exports (RVTools, Azure Migrate, generic) into VM records
//! - Fleet analyses: summary, compute, memory, storage and licensing
//! - Readiness and migration-complexity classification
//! - Best-fit cost estimation per cloud provider and spend projection
//! - Health checks and observability

pub mod analysis;
pub mod catalog;
pub mod cost;
pub mod engine;
pub mod error;
pub mod health;
pub mod ingest;
pub mod models;
pub mod observability;
pub mod projection;
pub mod readiness;
pub mod recommend;
pub mod sink;

pub use catalog::{FileCatalog, PricingCatalog, StaticCatalog};
pub use engine::{
    evaluate, AssessmentRequest, AssessmentResult, Assessor, Persistence, PersistencePolicy,
};
pub use error::{AssessError, CatalogError, SinkError};
pub use health::{
    Component, ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use ingest::{detect_source, Normalizer, RawTable, Workbook};
pub use models::*;
pub use observability::{AssessMetrics, StructuredLogger};
pub use sink::{DuplicatePolicy, MemorySink, MetricsSink, NullSink};
