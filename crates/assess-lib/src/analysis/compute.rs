//! Compute and memory allocation analysis over powered-on VMs

use crate::models::VmSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// VMs with more vCPUs than this are right-sizing candidates
pub const CPU_RIGHT_SIZING_THRESHOLD: u32 = 8;

/// VMs with at least this many vCPUs count as high-CPU
pub const HIGH_CPU_THRESHOLD: u32 = 16;

/// VMs with more memory than this (GB) are right-sizing candidates
pub const MEMORY_RIGHT_SIZING_THRESHOLD_GB: f64 = 32.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputeAnalysis {
    /// vCPU count -> number of VMs
    pub cpu_distribution: BTreeMap<u32, usize>,
    pub right_sizing_candidates: usize,
    pub high_cpu_vms: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDistribution {
    pub small_vms_2gb: usize,
    pub medium_vms_4_8gb: usize,
    pub large_vms_16gb: usize,
    pub xlarge_vms_32gb_plus: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryAnalysis {
    pub total_allocated_memory_gb: u64,
    pub avg_memory_per_vm_gb: u64,
    pub right_sizing_candidates: usize,
    pub memory_distribution: MemoryDistribution,
}

pub fn analyze_compute(vms: &VmSet) -> ComputeAnalysis {
    let mut analysis = ComputeAnalysis::default();

    for vm in vms.powered_on() {
        *analysis.cpu_distribution.entry(vm.cpu_count).or_insert(0) += 1;
        if vm.cpu_count > CPU_RIGHT_SIZING_THRESHOLD {
            analysis.right_sizing_candidates += 1;
        }
        if vm.cpu_count >= HIGH_CPU_THRESHOLD {
            analysis.high_cpu_vms += 1;
        }
    }

    analysis
}

pub fn analyze_memory(vms: &VmSet) -> MemoryAnalysis {
    let mut analysis = MemoryAnalysis::default();
    let mut total_mb: u64 = 0;
    let mut count: u64 = 0;

    for vm in vms.powered_on() {
        total_mb = total_mb.saturating_add(vm.memory_mb);
        count += 1;

        let gb = vm.memory_gb();
        if gb > MEMORY_RIGHT_SIZING_THRESHOLD_GB {
            analysis.right_sizing_candidates += 1;
        }

        let bucket = &mut analysis.memory_distribution;
        if gb <= 2.0 {
            bucket.small_vms_2gb += 1;
        } else if gb <= 8.0 {
            bucket.medium_vms_4_8gb += 1;
        } else if gb <= 16.0 {
            bucket.large_vms_16gb += 1;
        } else {
            bucket.xlarge_vms_32gb_plus += 1;
        }
    }

    analysis.total_allocated_memory_gb = total_mb / 1024;
    if count > 0 {
        analysis.avg_memory_per_vm_gb = total_mb / count / 1024;
    }

    analysis
}
