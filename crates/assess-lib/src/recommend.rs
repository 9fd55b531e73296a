//! Recommendation synthesis from analysis outputs

use crate::analysis::{ComputeAnalysis, LicensingAnalysis};
use crate::readiness::MigrationComplexity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub severity: Severity,
    pub category: String,
    pub title: String,
    pub description: String,
}

impl Recommendation {
    fn new(severity: Severity, category: &str, title: &str, description: String) -> Self {
        Self {
            severity,
            category: category.to_string(),
            title: title.to_string(),
            description,
        }
    }
}

/// Build the ordered recommendation list; each rule fires independently
pub fn synthesize(
    compute: &ComputeAnalysis,
    complexity: &MigrationComplexity,
    licensing: &LicensingAnalysis,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if compute.right_sizing_candidates > 0 {
        recommendations.push(Recommendation::new(
            Severity::Success,
            "Cost Optimization",
            "Right-sizing Opportunity",
            format!(
                "{} VMs can be right-sized to smaller instances, saving 30-50% on compute costs.",
                compute.right_sizing_candidates
            ),
        ));
    }

    if complexity.legacy_os_vms > 0 {
        recommendations.push(Recommendation::new(
            Severity::Warning,
            "Migration Planning",
            "Legacy Operating Systems",
            format!(
                "{} VMs run end-of-life operating systems and need an upgrade or rehost plan before migration.",
                complexity.legacy_os_vms
            ),
        ));
    }

    if licensing.windows_vms > 0 {
        recommendations.push(Recommendation::new(
            Severity::Info,
            "Licensing",
            "Azure Hybrid Benefit",
            format!(
                "Apply Azure Hybrid Benefit to {} Windows VMs for up to 40% cost savings.",
                licensing.windows_vms
            ),
        ));
    }

    recommendations
}
