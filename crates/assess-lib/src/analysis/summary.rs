//! Infrastructure summary

use crate::models::{round2, VmSet};
use serde::{Deserialize, Serialize};

/// Fleet-level counts and resource totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureSummary {
    pub total_vms: usize,
    pub powered_on_vms: usize,
    pub total_vcpus: u64,
    pub total_memory_gb: u64,
    pub avg_cpu_per_vm: f64,
    pub avg_memory_per_vm_gb: f64,
}

/// Summarize the fleet; resource totals cover powered-on VMs only.
/// Totals saturate at `u64::MAX`.
pub fn summarize(vms: &VmSet) -> InfrastructureSummary {
    let (powered_on, total_vcpus, total_memory_mb) = vms
        .powered_on()
        .fold((0usize, 0u64, 0u64), |(n, cpu, mem), vm| {
            (
                n + 1,
                cpu.saturating_add(vm.cpu_count as u64),
                mem.saturating_add(vm.memory_mb),
            )
        });

    let (avg_cpu_per_vm, avg_memory_per_vm_gb) = if powered_on > 0 {
        (
            round2(total_vcpus as f64 / powered_on as f64),
            round2(total_memory_mb as f64 / 1024.0 / powered_on as f64),
        )
    } else {
        (0.0, 0.0)
    };

    InfrastructureSummary {
        total_vms: vms.len(),
        powered_on_vms: powered_on,
        total_vcpus,
        total_memory_gb: total_memory_mb / 1024,
        avg_cpu_per_vm,
        avg_memory_per_vm_gb,
    }
}
