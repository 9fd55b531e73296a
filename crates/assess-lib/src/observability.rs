//! Observability infrastructure for the assessment service
//!
//! Provides:
//! - Prometheus metrics (assessment latency, assessments by source, VMs assessed, fallback matches)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for assessment latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<AssessMetricsInner> = OnceLock::new();

struct AssessMetricsInner {
    assessment_latency_seconds: Histogram,
    assessments_total: IntCounterVec,
    vms_assessed_total: IntCounter,
    fallback_matches_total: IntCounter,
    sink_warnings_total: IntCounter,
    assessment_errors_total: IntCounterVec,
}

impl AssessMetricsInner {
    fn new() -> Self {
        Self {
            assessment_latency_seconds: register_histogram!(
                "vm_assessor_assessment_latency_seconds",
                "Time spent producing one assessment, catalog and sink included",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register assessment_latency_seconds"),

            assessments_total: register_int_counter_vec!(
                "vm_assessor_assessments_total",
                "Completed assessments by source kind",
                &["source"]
            )
            .expect("Failed to register assessments_total"),

            vms_assessed_total: register_int_counter!(
                "vm_assessor_vms_assessed_total",
                "Total number of VM records assessed"
            )
            .expect("Failed to register vms_assessed_total"),

            fallback_matches_total: register_int_counter!(
                "vm_assessor_fallback_matches_total",
                "VMs priced at the largest offer because no offer covered them"
            )
            .expect("Failed to register fallback_matches_total"),

            sink_warnings_total: register_int_counter!(
                "vm_assessor_sink_warnings_total",
                "Warnings returned by the metrics sink"
            )
            .expect("Failed to register sink_warnings_total"),

            assessment_errors_total: register_int_counter_vec!(
                "vm_assessor_assessment_errors_total",
                "Failed assessments by error code",
                &["code"]
            )
            .expect("Failed to register assessment_errors_total"),
        }
    }
}

/// Assessment metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct AssessMetrics {
    _private: (),
}

impl Default for AssessMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AssessMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AssessMetricsInner {
        GLOBAL_METRICS.get_or_init(AssessMetricsInner::new)
    }

    pub fn observe_assessment_latency(&self, duration_secs: f64) {
        self.inner().assessment_latency_seconds.observe(duration_secs);
    }

    /// Count a completed assessment and the VMs it covered
    pub fn record_assessment(&self, source: &str, vm_count: usize, fallback_vms: usize) {
        let inner = self.inner();
        inner.assessments_total.with_label_values(&[source]).inc();
        inner.vms_assessed_total.inc_by(vm_count as u64);
        inner.fallback_matches_total.inc_by(fallback_vms as u64);
    }

    pub fn inc_sink_warnings(&self) {
        self.inner().sink_warnings_total.inc();
    }

    pub fn inc_assessment_errors(&self, code: &str) {
        self.inner()
            .assessment_errors_total
            .with_label_values(&[code])
            .inc();
    }
}

/// Structured logger for assessment events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    instance_name: String,
}

impl Default for StructuredLogger {
    fn default() -> Self {
        Self::new("vm-assessor")
    }
}

impl StructuredLogger {
    pub fn new(instance_name: impl Into<String>) -> Self {
        Self {
            instance_name: instance_name.into(),
        }
    }

    pub fn instance_name(&self) -> &str {
        &self.instance_name
    }

    /// Log a completed assessment
    #[allow(clippy::too_many_arguments)]
    pub fn log_assessment_completed(
        &self,
        assessment_id: &str,
        source: &str,
        customer_id: Option<&str>,
        total_vms: usize,
        powered_on_vms: usize,
        providers: usize,
        fallback_vms: usize,
        duration_ms: u64,
    ) {
        info!(
            event = "assessment_completed",
            instance = %self.instance_name,
            assessment_id = %assessment_id,
            source = %source,
            customer_id = ?customer_id,
            total_vms = total_vms,
            powered_on_vms = powered_on_vms,
            providers = providers,
            fallback_vms = fallback_vms,
            duration_ms = duration_ms,
            "Assessment completed"
        );
    }

    /// Log a warning returned by the metrics sink
    pub fn log_sink_warning(&self, assessment_id: &str, warning: &str) {
        warn!(
            event = "sink_warning",
            instance = %self.instance_name,
            assessment_id = %assessment_id,
            warning = %warning,
            "Metrics sink reported a warning"
        );
    }

    /// Log a failed assessment
    pub fn log_assessment_failed(&self, source: &str, code: &str, error: &str) {
        warn!(
            event = "assessment_failed",
            instance = %self.instance_name,
            source = %source,
            code = %code,
            error = %error,
            "Assessment failed"
        );
    }

    /// Log a pricing snapshot fetch
    pub fn log_catalog_loaded(&self, catalog: &str, providers: usize, offers: usize) {
        info!(
            event = "catalog_loaded",
            instance = %self.instance_name,
            catalog = %catalog,
            providers = providers,
            offers = offers,
            "Pricing catalog loaded"
        );
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, catalog: &str) {
        info!(
            event = "service_started",
            instance = %self.instance_name,
            service_version = %version,
            catalog = %catalog,
            "Assessment service started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance_name,
            reason = %reason,
            "Assessment service shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assess_metrics_creation() {
        // Handles share the global registry, so creating several is fine
        let metrics = AssessMetrics::new();
        let again = AssessMetrics::new();

        metrics.observe_assessment_latency(0.004);
        metrics.record_assessment("rvtools", 12, 1);
        again.inc_sink_warnings();
        again.inc_assessment_errors("duplicate_submission");
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("assessor-1");
        assert_eq!(logger.instance_name(), "assessor-1");
        logger.log_sink_warning("a-1", "overwriting existing assessment for acme/RV-001");
    }
}
