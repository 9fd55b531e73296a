//! Predicted spend trend
//!
//! A fixed linear cost model over current resource totals and a fixed growth
//! curve. This is a deterministic stand-in for a forecasting model: no
//! history, no fitting, no external data.

use crate::models::round2;
use serde::{Deserialize, Serialize};

/// Monthly cost per vCPU in the base model
pub const COST_PER_VCPU: f64 = 5.0;

/// Monthly cost per GB of memory in the base model
pub const COST_PER_MEMORY_GB: f64 = 2.0;

/// Cumulative growth factor for months 1..=12
const MONTHLY_GROWTH_FACTORS: [f64; 12] = [
    1.02, 1.04, 1.06, 1.08, 1.10, 1.12, 1.15, 1.18, 1.21, 1.24, 1.27, 1.30,
];

pub const AVERAGE_MONTHLY_GROWTH_RATE: &str = "2.5%";

pub const SPEND_INSIGHTS: &str = "Based on current resource consumption, a steady growth in cloud spend is projected. Consider optimizing underutilized resources to mitigate this trend.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendProjection {
    pub base_monthly_cost: f64,
    pub next_3_months: Vec<f64>,
    pub next_6_months: Vec<f64>,
    pub next_12_months: Vec<f64>,
    pub average_monthly_growth_rate: String,
    pub insights: String,
}

/// Project spend from total vCPUs and total memory (GB)
pub fn project_spend(total_vcpus: u64, total_memory_gb: u64) -> SpendProjection {
    let base = total_vcpus as f64 * COST_PER_VCPU + total_memory_gb as f64 * COST_PER_MEMORY_GB;
    let horizon = |months: usize| -> Vec<f64> {
        MONTHLY_GROWTH_FACTORS[..months]
            .iter()
            .map(|factor| round2(base * factor))
            .collect()
    };

    SpendProjection {
        base_monthly_cost: round2(base),
        next_3_months: horizon(3),
        next_6_months: horizon(6),
        next_12_months: horizon(12),
        average_monthly_growth_rate: AVERAGE_MONTHLY_GROWTH_RATE.to_string(),
        insights: SPEND_INSIGHTS.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_values() {
        // 10 vCPU * 5 + 50 GB * 2 = 150
        let projection = project_spend(10, 50);
        assert_eq!(projection.base_monthly_cost, 150.0);
        assert_eq!(projection.next_3_months, vec![153.0, 156.0, 159.0]);
        assert_eq!(projection.next_6_months.len(), 6);
        assert_eq!(projection.next_6_months[5], 168.0);
        assert_eq!(projection.next_12_months.len(), 12);
        assert_eq!(projection.next_12_months[11], 195.0);
        assert_eq!(projection.average_monthly_growth_rate, "2.5%");
    }

    #[test]
    fn test_horizons_share_a_curve() {
        let projection = project_spend(7, 13);
        assert_eq!(projection.next_3_months[..], projection.next_6_months[..3]);
        assert_eq!(projection.next_6_months[..], projection.next_12_months[..6]);
        assert!(projection.next_12_months.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_empty_fleet_projects_zero() {
        let projection = project_spend(0, 0);
        assert_eq!(projection.base_monthly_cost, 0.0);
        assert!(projection.next_12_months.iter().all(|v| *v == 0.0));
    }
}
