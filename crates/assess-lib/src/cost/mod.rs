//! Per-provider cost estimation
//!
//! For every provider in the catalog snapshot each powered-on VM is matched
//! to its best-fit offer and billed at a fixed 730 hours per month.

mod matcher;

pub use matcher::{BestFitMatcher, Selection};

use crate::models::{round2, PricingSnapshot, ProviderCatalog, VmSet, HOURS_PER_MONTH};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Number of VM-to-instance mappings kept per provider
pub const INSTANCE_MAPPING_SAMPLE: usize = 5;

/// Note attached to providers whose catalog has no usable offers
pub const EMPTY_CATALOG_NOTE: &str = "no instances in catalog";

/// One VM's chosen instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceMapping {
    pub vm: String,
    pub instance_type: String,
    pub cost_per_hour: f64,
    pub fallback: bool,
}

/// Fleet cost for one provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderEstimate {
    pub region: String,
    pub monthly_cost: f64,
    pub annual_cost: f64,
    pub vm_count: usize,
    pub fallback_vms: usize,
    pub instance_mapping: Vec<InstanceMapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Estimates keyed by provider
pub type CostEstimates = BTreeMap<String, ProviderEstimate>;

/// Estimate fleet cost for every provider in the snapshot
pub fn estimate_costs(vms: &VmSet, snapshot: &PricingSnapshot) -> CostEstimates {
    snapshot
        .iter()
        .map(|(provider, catalog)| (provider.clone(), estimate_provider(provider, vms, catalog)))
        .collect()
}

/// Estimate fleet cost against a single provider catalog
pub fn estimate_provider(provider: &str, vms: &VmSet, catalog: &ProviderCatalog) -> ProviderEstimate {
    let matcher = BestFitMatcher::new(&catalog.instances);
    let mut estimate = ProviderEstimate {
        region: catalog.region.clone(),
        ..Default::default()
    };

    if matcher.is_empty() {
        estimate.note = Some(EMPTY_CATALOG_NOTE.to_string());
        return estimate;
    }

    let mut monthly = 0.0;
    for vm in vms.powered_on() {
        let Some(selection) = matcher.select(vm) else {
            continue;
        };
        let offer = selection.offer();

        monthly += offer.cost_per_hour * HOURS_PER_MONTH;
        estimate.vm_count += 1;
        if selection.is_fallback() {
            estimate.fallback_vms += 1;
            debug!(
                provider = %provider,
                vm = %vm.name,
                cpu_count = vm.cpu_count,
                memory_mb = vm.memory_mb,
                instance_type = %offer.instance_type,
                "VM exceeds every offer, using largest instance"
            );
        }

        if estimate.instance_mapping.len() < INSTANCE_MAPPING_SAMPLE {
            estimate.instance_mapping.push(InstanceMapping {
                vm: vm.name.clone(),
                instance_type: offer.instance_type.clone(),
                cost_per_hour: offer.cost_per_hour,
                fallback: selection.is_fallback(),
            });
        }
    }

    estimate.monthly_cost = round2(monthly);
    estimate.annual_cost = round2(estimate.monthly_cost * 12.0);
    estimate
}
