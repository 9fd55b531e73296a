//! Cloud readiness tiers and migration complexity
//!
//! Both classifications run over the full VM set, powered-off machines
//! included: a VM that is off today still has to be migrated.

use crate::models::{round2, VmRecord, VmSet};
use serde::{Deserialize, Serialize};

/// Upper bounds for the `ready` tier
pub const READY_MAX_CPU: u32 = 4;
pub const READY_MAX_MEMORY_GB: f64 = 16.0;

/// Upper bounds for the `needs_work` tier; its lower bounds are the `ready` maxima
pub const NEEDS_WORK_MAX_CPU: u32 = 8;
pub const NEEDS_WORK_MAX_MEMORY_GB: f64 = 64.0;

/// Thresholds above which a VM counts as high-resource
pub const HIGH_RESOURCE_CPU: u32 = 16;
pub const HIGH_RESOURCE_MEMORY_GB: f64 = 128.0;

/// OS labels (lower-case substrings) that indicate an end-of-life platform
pub const LEGACY_OS_PATTERNS: &[&str] = &["windows server 2008", "windows server 2003", "rhel 5"];

/// Number of legacy VMs listed as examples
pub const LEGACY_EXAMPLE_LIMIT: usize = 5;

/// Complexity points per high-resource VM
const HIGH_RESOURCE_SCORE: u32 = 3;

/// Complexity points per legacy-OS VM
const LEGACY_OS_SCORE: u32 = 5;

/// Coarse migration-difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessTier {
    Ready,
    NeedsWork,
    Complex,
}

impl ReadinessTier {
    /// Classify a VM; tiers are tried in order and anything that fits
    /// neither `ready` nor `needs_work` is `complex`
    pub fn classify(vm: &VmRecord) -> Self {
        let cpu = vm.cpu_count;
        let memory_gb = vm.memory_gb();
        if cpu <= READY_MAX_CPU && memory_gb <= READY_MAX_MEMORY_GB {
            ReadinessTier::Ready
        } else if (READY_MAX_CPU + 1..=NEEDS_WORK_MAX_CPU).contains(&cpu)
            && memory_gb > READY_MAX_MEMORY_GB
            && memory_gb <= NEEDS_WORK_MAX_MEMORY_GB
        {
            ReadinessTier::NeedsWork
        } else {
            ReadinessTier::Complex
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadinessAssessment {
    pub ready: usize,
    pub needs_work: usize,
    pub complex: usize,
    pub readiness_percentage: f64,
}

impl ReadinessAssessment {
    pub fn total(&self) -> usize {
        self.ready + self.needs_work + self.complex
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyVm {
    pub name: String,
    pub os: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationComplexity {
    pub high_resource_vms: usize,
    pub legacy_os_vms: usize,
    pub legacy_os_examples: Vec<LegacyVm>,
    pub total_complexity_score: u32,
}

pub fn assess_readiness(vms: &VmSet) -> ReadinessAssessment {
    let mut assessment = ReadinessAssessment::default();

    for vm in vms.iter() {
        match ReadinessTier::classify(vm) {
            ReadinessTier::Ready => assessment.ready += 1,
            ReadinessTier::NeedsWork => assessment.needs_work += 1,
            ReadinessTier::Complex => assessment.complex += 1,
        }
    }

    if !vms.is_empty() {
        assessment.readiness_percentage =
            round2(assessment.ready as f64 / vms.len() as f64 * 100.0);
    }

    assessment
}

/// Whether an OS label is on the legacy list
pub fn is_legacy_os(os: &str) -> bool {
    let lower = os.to_lowercase();
    LEGACY_OS_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

pub fn is_high_resource(vm: &VmRecord) -> bool {
    vm.cpu_count > HIGH_RESOURCE_CPU || vm.memory_gb() > HIGH_RESOURCE_MEMORY_GB
}

pub fn assess_complexity(vms: &VmSet) -> MigrationComplexity {
    let mut complexity = MigrationComplexity::default();

    for vm in vms.iter() {
        if is_high_resource(vm) {
            complexity.high_resource_vms += 1;
            complexity.total_complexity_score += HIGH_RESOURCE_SCORE;
        }

        if is_legacy_os(&vm.os) {
            complexity.legacy_os_vms += 1;
            complexity.total_complexity_score += LEGACY_OS_SCORE;
            if complexity.legacy_os_examples.len() < LEGACY_EXAMPLE_LIMIT {
                complexity.legacy_os_examples.push(LegacyVm {
                    name: vm.name.clone(),
                    os: vm.os.clone(),
                });
            }
        }
    }

    complexity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PowerState;

    fn vm(name: &str, cpu: u32, memory_gb: u64, os: &str) -> VmRecord {
        VmRecord {
            id: name.to_string(),
            name: name.to_string(),
            cpu_count: cpu,
            memory_mb: memory_gb * 1024,
            power_state: PowerState::On,
            os: os.to_string(),
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ReadinessTier::classify(&vm("a", 4, 16, "")), ReadinessTier::Ready);
        assert_eq!(ReadinessTier::classify(&vm("b", 5, 17, "")), ReadinessTier::NeedsWork);
        assert_eq!(ReadinessTier::classify(&vm("c", 8, 64, "")), ReadinessTier::NeedsWork);
        assert_eq!(ReadinessTier::classify(&vm("d", 9, 8, "")), ReadinessTier::Complex);
        assert_eq!(ReadinessTier::classify(&vm("e", 2, 65, "")), ReadinessTier::Complex);
    }

    #[test]
    fn test_gaps_between_tiers_are_complex() {
        // needs_work requires both resources in its band
        assert_eq!(ReadinessTier::classify(&vm("f", 2, 32, "")), ReadinessTier::Complex);
        assert_eq!(ReadinessTier::classify(&vm("g", 8, 8, "")), ReadinessTier::Complex);
        assert_eq!(ReadinessTier::classify(&vm("h", 5, 16, "")), ReadinessTier::Complex);
    }

    #[test]
    fn test_eight_cpus_needs_work_only_with_mid_memory() {
        assert_eq!(ReadinessTier::classify(&vm("a", 8, 8, "")), ReadinessTier::Complex);
        assert_eq!(ReadinessTier::classify(&vm("b", 8, 16, "")), ReadinessTier::Complex);
        assert_eq!(ReadinessTier::classify(&vm("c", 8, 17, "")), ReadinessTier::NeedsWork);
        assert_eq!(ReadinessTier::classify(&vm("d", 8, 64, "")), ReadinessTier::NeedsWork);
        assert_eq!(ReadinessTier::classify(&vm("e", 8, 65, "")), ReadinessTier::Complex);
    }

    #[test]
    fn test_fractional_memory_at_band_edges() {
        let mut just_over_ready = vm("a", 6, 16, "");
        just_over_ready.memory_mb += 1;
        assert_eq!(ReadinessTier::classify(&just_over_ready), ReadinessTier::NeedsWork);

        let mut just_over_needs_work = vm("b", 6, 64, "");
        just_over_needs_work.memory_mb += 1;
        assert_eq!(ReadinessTier::classify(&just_over_needs_work), ReadinessTier::Complex);
    }

    #[test]
    fn test_tiers_partition_the_set() {
        let mut vms = Vec::new();
        for cpu in [0, 1, 4, 5, 8, 9, 16, 17, 64] {
            for gb in [0, 1, 16, 17, 32, 64, 65, 128, 129] {
                vms.push(vm("x", cpu, gb, ""));
            }
        }
        let mut off = vm("off", 2, 4, "");
        off.power_state = PowerState::Off;
        vms.push(off);

        let set = VmSet::new(vms);
        let readiness = assess_readiness(&set);
        assert_eq!(readiness.total(), set.len());
    }

    #[test]
    fn test_readiness_percentage() {
        let set = VmSet::new(vec![
            vm("a", 2, 4, ""),
            vm("b", 2, 4, ""),
            vm("c", 32, 256, ""),
        ]);
        let readiness = assess_readiness(&set);
        assert_eq!(readiness.ready, 2);
        assert_eq!(readiness.complex, 1);
        assert_eq!(readiness.readiness_percentage, 66.67);
        assert_eq!(assess_readiness(&VmSet::default()).readiness_percentage, 0.0);
    }

    #[test]
    fn test_migration_complexity() {
        let set = VmSet::new(vec![
            vm("legacy-1", 2, 4, "Microsoft Windows Server 2008 R2 (64-bit)"),
            vm("legacy-2", 2, 4, "RHEL 5.11"),
            vm("big", 24, 64, "Ubuntu Linux"),
            vm("huge-legacy", 8, 256, "Windows Server 2003 Standard"),
            vm("edge", 16, 128, "Windows Server 2019"),
        ]);

        let complexity = assess_complexity(&set);
        assert_eq!(complexity.high_resource_vms, 2);
        assert_eq!(complexity.legacy_os_vms, 3);
        assert_eq!(complexity.total_complexity_score, 2 * 3 + 3 * 5);
        let names: Vec<&str> = complexity
            .legacy_os_examples
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, vec!["legacy-1", "legacy-2", "huge-legacy"]);
    }

    #[test]
    fn test_legacy_examples_are_capped() {
        let set = VmSet::new(
            (0..8)
                .map(|i| vm(&format!("old-{}", i), 2, 4, "Windows Server 2003"))
                .collect(),
        );
        let complexity = assess_complexity(&set);
        assert_eq!(complexity.legacy_os_vms, 8);
        assert_eq!(complexity.legacy_os_examples.len(), LEGACY_EXAMPLE_LIMIT);
        assert_eq!(complexity.legacy_os_examples[0].name, "old-0");
        assert_eq!(complexity.legacy_os_examples[4].name, "old-4");
    }
}
