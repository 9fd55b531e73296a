//! Assessment engine
//!
//! [`evaluate`] is the pure core: VM set, optional disk table and a pricing
//! snapshot in, [`AssessmentResult`] out. [`Assessor`] wraps it with the
//! async collaborators: the catalog is read before evaluation and the sink is
//! called after it.

use crate::analysis::{
    analyze_compute, analyze_licensing, analyze_memory, analyze_storage, summarize,
    ComputeAnalysis, InfrastructureSummary, LicensingAnalysis, MemoryAnalysis, StorageAnalysis,
};
use crate::catalog::PricingCatalog;
use crate::cost::{estimate_costs, CostEstimates};
use crate::error::{AssessError, SinkError};
use crate::ingest::{detect_source, disk_sheet, Normalizer, RawTable, Workbook};
use crate::models::{CustomerContext, PricingSnapshot, SourceKind, VmSet};
use crate::observability::{AssessMetrics, StructuredLogger};
use crate::projection::{project_spend, SpendProjection};
use crate::readiness::{assess_complexity, assess_readiness, MigrationComplexity, ReadinessAssessment};
use crate::recommend::{synthesize, Recommendation};
use crate::sink::MetricsSink;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;


/// Complete output of one assessment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub assessment_id: String,
    pub source_type: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub summary: InfrastructureSummary,
    pub compute_analysis: ComputeAnalysis,
    pub memory_analysis: MemoryAnalysis,
    pub storage_analysis: Option<StorageAnalysis>,
    pub licensing_analysis: LicensingAnalysis,
    pub readiness: ReadinessAssessment,
    pub cost_estimates: CostEstimates,
    pub migration_complexity: MigrationComplexity,
    pub predicted_spend: SpendProjection,
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// What the sink did with this result; not part of the JSON form
    #[serde(skip)]
    pub persistence: Persistence,
}

/// Outcome of handing a result to the metrics sink
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Persistence {
    /// No sink was called, e.g. a result from [`evaluate`] or decoded from JSON
    #[default]
    Skipped,
    Recorded,
    /// The sink failed and the result carries its warning instead
    Failed(String),
}

impl AssessmentResult {
    /// VMs priced at a fallback offer, summed over providers
    pub fn fallback_vms(&self) -> usize {
        self.cost_estimates.values().map(|e| e.fallback_vms).sum()
    }
}

/// Wire form of an assessment submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub sheets: Workbook,
    #[serde(flatten)]
    pub context: CustomerContext,
}

/// Run every analysis over a normalized VM set
///
/// Deterministic: the same inputs always give the same result.
pub fn evaluate(
    assessment_id: &str,
    source: SourceKind,
    vms: &VmSet,
    disks: Option<&RawTable>,
    snapshot: &PricingSnapshot,
) -> AssessmentResult {
    let summary = summarize(vms);
    let compute_analysis = analyze_compute(vms);
    let memory_analysis = analyze_memory(vms);
    let storage_analysis = disks.map(analyze_storage);
    let licensing_analysis = analyze_licensing(vms);
    let readiness = assess_readiness(vms);
    let migration_complexity = assess_complexity(vms);
    let cost_estimates = estimate_costs(vms, snapshot);
    let predicted_spend = project_spend(summary.total_vcpus, summary.total_memory_gb);
    let recommendations = synthesize(&compute_analysis, &migration_complexity, &licensing_analysis);

    AssessmentResult {
        assessment_id: assessment_id.to_string(),
        source_type: source,
        customer_id: None,
        summary,
        compute_analysis,
        memory_analysis,
        storage_analysis,
        licensing_analysis,
        readiness,
        cost_estimates,
        migration_complexity,
        predicted_spend,
        recommendations,
        warnings: Vec::new(),
        persistence: Persistence::Skipped,
    }
}

/// What the assessor does when the sink is unavailable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistencePolicy {
    /// Return the result with a warning attached
    #[default]
    Warn,
    /// Fail the assessment
    Abort,
}

impl FromStr for PersistencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(PersistencePolicy::Warn),
            "abort" => Ok(PersistencePolicy::Abort),
            other => Err(format!("unknown persistence policy: {}", other)),
        }
    }
}

impl fmt::Display for PersistencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistencePolicy::Warn => f.write_str("warn"),
            PersistencePolicy::Abort => f.write_str("abort"),
        }
    }
}

/// Engine entry point shared by the server and the CLI
pub struct Assessor {
    catalog: Arc<dyn PricingCatalog>,
    sink: Arc<dyn MetricsSink>,
    normalizer: Normalizer,
    persistence_policy: PersistencePolicy,
    metrics: AssessMetrics,
    logger: StructuredLogger,
}

impl Assessor {
    pub fn new(catalog: Arc<dyn PricingCatalog>, sink: Arc<dyn MetricsSink>) -> Self {
        Self {
            catalog,
            sink,
            normalizer: Normalizer::new(),
            persistence_policy: PersistencePolicy::default(),
            metrics: AssessMetrics::new(),
            logger: StructuredLogger::default(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_persistence_policy(mut self, policy: PersistencePolicy) -> Self {
        self.persistence_policy = policy;
        self
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn persistence_policy(&self) -> PersistencePolicy {
        self.persistence_policy
    }

    pub fn catalog(&self) -> &Arc<dyn PricingCatalog> {
        &self.catalog
    }

    /// Current pricing snapshot
    pub async fn pricing(&self) -> Result<PricingSnapshot, AssessError> {
        let snapshot = self.catalog.snapshot().await?;
        self.logger.log_catalog_loaded(
            &self.catalog.describe(),
            snapshot.len(),
            snapshot.values().map(|c| c.instances.len()).sum(),
        );
        Ok(snapshot)
    }

    /// Assess a workbook after detecting its source kind from sheet names
    pub async fn assess_detected(
        &self,
        workbook: &Workbook,
        context: CustomerContext,
    ) -> Result<AssessmentResult, AssessError> {
        let source = detect_source(workbook);
        debug!(source = %source, "Detected workbook source kind");
        self.assess(workbook, source, context).await
    }

    /// Assess a workbook of a declared source kind
    #[instrument(skip_all, fields(source = %source))]
    pub async fn assess(
        &self,
        workbook: &Workbook,
        source: SourceKind,
        context: CustomerContext,
    ) -> Result<AssessmentResult, AssessError> {
        let started = Instant::now();
        let outcome = self.run(workbook, source, context).await;

        match &outcome {
            Ok(result) => {
                let elapsed = started.elapsed();
                self.metrics.observe_assessment_latency(elapsed.as_secs_f64());
                self.metrics.record_assessment(
                    source.as_str(),
                    result.summary.total_vms,
                    result.fallback_vms(),
                );
                self.logger.log_assessment_completed(
                    &result.assessment_id,
                    source.as_str(),
                    result.customer_id.as_deref(),
                    result.summary.total_vms,
                    result.summary.powered_on_vms,
                    result.cost_estimates.len(),
                    result.fallback_vms(),
                    elapsed.as_millis() as u64,
                );
            }
            Err(err) => {
                self.metrics.inc_assessment_errors(err.code());
                self.logger
                    .log_assessment_failed(source.as_str(), err.code(), &err.to_string());
            }
        }

        outcome
    }

    async fn run(
        &self,
        workbook: &Workbook,
        source: SourceKind,
        context: CustomerContext,
    ) -> Result<AssessmentResult, AssessError> {
        let snapshot = self.pricing().await?;

        let vms = self.normalizer.normalize(workbook, source);
        let disks = disk_sheet(workbook, source).map(|(_, table)| table);
        let assessment_id = Uuid::new_v4().to_string();

        let mut result = evaluate(&assessment_id, source, &vms, disks, &snapshot);
        result.customer_id = context.customer_id.clone();

        match self.sink.record(&vms, &assessment_id, source, &context).await {
            Ok(None) => result.persistence = Persistence::Recorded,
            Ok(Some(warning)) => {
                result.persistence = Persistence::Recorded;
                self.push_warning(&mut result, warning);
            }
            Err(err @ SinkError::Conflict { .. }) => return Err(AssessError::Conflict(err)),
            Err(err @ SinkError::Unavailable(_)) => match self.persistence_policy {
                PersistencePolicy::Warn => {
                    let warning = err.to_string();
                    result.persistence = Persistence::Failed(warning.clone());
                    self.push_warning(&mut result, warning);
                }
                PersistencePolicy::Abort => return Err(AssessError::Persistence(err)),
            },
        }

        Ok(result)
    }

    fn push_warning(&self, result: &mut AssessmentResult, warning: String) {
        self.metrics.inc_sink_warnings();
        self.logger.log_sink_warning(&result.assessment_id, &warning);
        result.warnings.push(warning);
    }
}
