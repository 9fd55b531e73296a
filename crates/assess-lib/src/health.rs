//! Component health for the assessment service
//!
//! The server tracks three components: the pricing catalog, the metrics sink
//! and the engine. Health is derived from call outcomes, and each outcome only
//! touches the components that call actually reached.

use crate::engine::{AssessmentResult, Persistence};
use crate::error::AssessError;
use crate::models::PricingSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A tracked part of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Catalog,
    Sink,
    Engine,
}

impl Component {
    pub const ALL: [Component; 3] = [Component::Catalog, Component::Sink, Component::Engine];

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Catalog => "catalog",
            Component::Sink => "sink",
            Component::Engine => "engine",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered from best to worst, so the overall status is the maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Assessments still complete, e.g. with sink warnings attached
    Degraded,
    Unhealthy,
}

impl ComponentStatus {
    pub fn is_operational(&self) -> bool {
        *self != ComponentStatus::Unhealthy
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    fn new(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn healthy() -> Self {
        Self::new(ComponentStatus::Healthy, None)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::new(ComponentStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::new(ComponentStatus::Unhealthy, Some(message.into()))
    }
}

/// Body of `/healthz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: BTreeMap<Component, ComponentHealth>,
}

/// Body of `/readyz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

type Effects = Vec<(Component, ComponentHealth)>;

fn catalog_failure(err: &AssessError) -> Effects {
    match err {
        AssessError::Catalog(err) => vec![(Component::Catalog, ComponentHealth::unhealthy(err.to_string()))],
        _ => Vec::new(),
    }
}

/// A pricing lookup only reaches the catalog
fn pricing_effects(outcome: &Result<PricingSnapshot, AssessError>) -> Effects {
    match outcome {
        Ok(_) => vec![(Component::Catalog, ComponentHealth::healthy())],
        Err(err) => catalog_failure(err),
    }
}

/// The sink is only judged when the assessor actually called it
fn assessment_effects(outcome: &Result<AssessmentResult, AssessError>) -> Effects {
    match outcome {
        Ok(result) => {
            let mut effects = vec![
                (Component::Catalog, ComponentHealth::healthy()),
                (Component::Engine, ComponentHealth::healthy()),
            ];
            match &result.persistence {
                Persistence::Recorded => effects.push((Component::Sink, ComponentHealth::healthy())),
                Persistence::Failed(message) => {
                    effects.push((Component::Sink, ComponentHealth::degraded(message.clone())))
                }
                Persistence::Skipped => {}
            }
            effects
        }
        // A conflict is a policy answer from a working sink
        Err(AssessError::Conflict(_)) => vec![
            (Component::Catalog, ComponentHealth::healthy()),
            (Component::Sink, ComponentHealth::healthy()),
        ],
        Err(AssessError::Persistence(err)) => vec![
            (Component::Catalog, ComponentHealth::healthy()),
            (Component::Sink, ComponentHealth::degraded(err.to_string())),
        ],
        Err(err) => catalog_failure(err),
    }
}

#[derive(Debug)]
struct HealthState {
    components: BTreeMap<Component, ComponentHealth>,
    ready: bool,
}

/// Shared health view behind `/healthz` and `/readyz`
#[derive(Debug, Clone)]
pub struct HealthRegistry {
    state: Arc<RwLock<HealthState>>,
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthRegistry {
    /// Every component starts healthy; the service starts not ready
    pub fn new() -> Self {
        let components = Component::ALL
            .into_iter()
            .map(|component| (component, ComponentHealth::healthy()))
            .collect();
        Self {
            state: Arc::new(RwLock::new(HealthState {
                components,
                ready: false,
            })),
        }
    }

    pub async fn set(&self, component: Component, health: ComponentHealth) {
        self.apply(vec![(component, health)]).await;
    }

    pub async fn set_ready(&self, ready: bool) {
        self.state.write().await.ready = ready;
    }

    /// Reflect a catalog snapshot lookup
    pub async fn observe_pricing(&self, outcome: &Result<PricingSnapshot, AssessError>) {
        self.apply(pricing_effects(outcome)).await;
    }

    /// Reflect a finished assessment
    pub async fn observe_assessment(&self, outcome: &Result<AssessmentResult, AssessError>) {
        self.apply(assessment_effects(outcome)).await;
    }

    async fn apply(&self, effects: Effects) {
        if effects.is_empty() {
            return;
        }
        let mut state = self.state.write().await;
        state.components.extend(effects);
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.state.read().await.components.clone();
        let status = components
            .values()
            .map(|health| health.status)
            .max()
            .unwrap_or(ComponentStatus::Healthy);
        HealthResponse { status, components }
    }

    /// Ready once started, unless a component is unhealthy
    pub async fn readiness(&self) -> ReadinessResponse {
        let state = self.state.read().await;

        if !state.ready {
            return ReadinessResponse {
                ready: false,
                reason: Some("Service not yet initialized".to_string()),
            };
        }

        let failed = state
            .components
            .iter()
            .find(|(_, health)| !health.status.is_operational());
        match failed {
            Some((component, health)) => ReadinessResponse {
                ready: false,
                reason: Some(match &health.message {
                    Some(message) => format!("{} unhealthy: {}", component, message),
                    None => format!("{} unhealthy", component),
                }),
            },
            None => ReadinessResponse {
                ready: true,
                reason: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CatalogError, SinkError};
    use crate::models::{SourceKind, VmSet};

    fn result(persistence: Persistence) -> AssessmentResult {
        let mut result = crate::engine::evaluate(
            "a-1",
            SourceKind::Generic,
            &VmSet::default(),
            None,
            &PricingSnapshot::new(),
        );
        result.persistence = persistence;
        result
    }

    fn catalog_error() -> AssessError {
        AssessError::Catalog(CatalogError::Io {
            path: "/missing/pricing.json".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })
    }

    async fn status(registry: &HealthRegistry, component: Component) -> ComponentStatus {
        registry.health().await.components[&component].status
    }

    #[tokio::test]
    async fn test_all_components_start_healthy() {
        let health = HealthRegistry::new().health().await;

        assert_eq!(health.status, ComponentStatus::Healthy);
        assert_eq!(health.components.keys().copied().collect::<Vec<_>>(), Component::ALL);
    }

    #[tokio::test]
    async fn test_overall_status_is_worst_component() {
        let registry = HealthRegistry::new();
        registry.set(Component::Sink, ComponentHealth::degraded("slow")).await;
        assert_eq!(registry.health().await.status, ComponentStatus::Degraded);

        registry.set(Component::Catalog, ComponentHealth::unhealthy("Pricing file missing")).await;
        assert_eq!(registry.health().await.status, ComponentStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_health_serializes_component_names() {
        let json = serde_json::to_value(HealthRegistry::new().health().await).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["components"]["catalog"]["status"], "healthy");
        assert!(json["components"]["sink"].is_object());
        assert!(json["components"]["engine"].is_object());
    }

    #[tokio::test]
    async fn test_pricing_only_touches_catalog() {
        let registry = HealthRegistry::new();
        registry.set(Component::Sink, ComponentHealth::degraded("sink unavailable")).await;

        registry.observe_pricing(&Ok(PricingSnapshot::new())).await;
        assert_eq!(status(&registry, Component::Sink).await, ComponentStatus::Degraded);
        assert_eq!(status(&registry, Component::Catalog).await, ComponentStatus::Healthy);

        registry.observe_pricing(&Err(catalog_error())).await;
        assert_eq!(status(&registry, Component::Catalog).await, ComponentStatus::Unhealthy);
        assert_eq!(status(&registry, Component::Sink).await, ComponentStatus::Degraded);
    }

    #[tokio::test]
    async fn test_recorded_assessment_restores_sink() {
        let registry = HealthRegistry::new();
        registry.set(Component::Sink, ComponentHealth::degraded("sink unavailable")).await;
        registry.set(Component::Catalog, ComponentHealth::unhealthy("Pricing file missing")).await;

        registry.observe_assessment(&Ok(result(Persistence::Recorded))).await;
        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
    }

    #[tokio::test]
    async fn test_assessment_without_sink_call_leaves_sink_alone() {
        let registry = HealthRegistry::new();
        registry.set(Component::Sink, ComponentHealth::degraded("sink unavailable")).await;

        registry.observe_assessment(&Ok(result(Persistence::Skipped))).await;
        assert_eq!(status(&registry, Component::Sink).await, ComponentStatus::Degraded);
    }

    #[tokio::test]
    async fn test_sink_warning_degrades_sink() {
        let registry = HealthRegistry::new();

        registry
            .observe_assessment(&Ok(result(Persistence::Failed("connection refused".to_string()))))
            .await;
        let health = registry.health().await;
        assert_eq!(health.status, ComponentStatus::Degraded);
        assert_eq!(
            health.components[&Component::Sink].message.as_deref(),
            Some("connection refused")
        );
    }

    #[tokio::test]
    async fn test_assessment_errors() {
        let registry = HealthRegistry::new();

        registry
            .observe_assessment(&Err(AssessError::Persistence(SinkError::Unavailable(
                "connection refused".to_string(),
            ))))
            .await;
        assert_eq!(status(&registry, Component::Sink).await, ComponentStatus::Degraded);

        registry
            .observe_assessment(&Err(AssessError::Conflict(SinkError::Conflict {
                customer_id: "acme".to_string(),
                document_code: "RV-001".to_string(),
            })))
            .await;
        assert_eq!(status(&registry, Component::Sink).await, ComponentStatus::Healthy);

        registry.observe_assessment(&Err(catalog_error())).await;
        assert_eq!(status(&registry, Component::Catalog).await, ComponentStatus::Unhealthy);

        registry
            .observe_assessment(&Err(AssessError::UnknownSource("hyperv".to_string())))
            .await;
        assert_eq!(status(&registry, Component::Catalog).await, ComponentStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_readiness_not_ready_initially() {
        let readiness = HealthRegistry::new().readiness().await;

        assert!(!readiness.ready);
        assert_eq!(readiness.reason.as_deref(), Some("Service not yet initialized"));
    }

    #[tokio::test]
    async fn test_sink_degradation_keeps_service_ready() {
        let registry = HealthRegistry::new();
        registry.set_ready(true).await;
        registry.set(Component::Sink, ComponentHealth::degraded("sink unavailable")).await;

        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_unhealthy_catalog_is_not_ready() {
        let registry = HealthRegistry::new();
        registry.set_ready(true).await;
        registry.observe_pricing(&Err(catalog_error())).await;

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert!(readiness.reason.unwrap().starts_with("catalog unhealthy: "));
    }
}
