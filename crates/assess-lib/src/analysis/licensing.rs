//! OS licensing breakdown over the full VM set

use crate::models::VmSet;
use serde::{Deserialize, Serialize};

/// Number of OS labels reported in the distribution
pub const OS_DISTRIBUTION_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsCount {
    pub os: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensingAnalysis {
    pub windows_vms: usize,
    pub linux_vms: usize,
    pub other_os: usize,
    /// All Windows VMs are assumed eligible
    pub hybrid_benefit_eligible: usize,
    pub os_distribution: Vec<OsCount>,
}

/// OS family of a free-text label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    Linux,
    Other,
}

impl OsFamily {
    pub fn classify(os: &str) -> Self {
        let lower = os.to_lowercase();
        if lower.contains("windows") {
            OsFamily::Windows
        } else if lower.contains("linux") {
            OsFamily::Linux
        } else {
            OsFamily::Other
        }
    }
}

pub fn analyze_licensing(vms: &VmSet) -> LicensingAnalysis {
    let mut analysis = LicensingAnalysis::default();
    // First-appearance order is kept so equal counts rank deterministically
    let mut labels: Vec<OsCount> = Vec::new();

    for vm in vms.iter() {
        match OsFamily::classify(&vm.os) {
            OsFamily::Windows => analysis.windows_vms += 1,
            OsFamily::Linux => analysis.linux_vms += 1,
            OsFamily::Other => analysis.other_os += 1,
        }

        match labels.iter_mut().find(|entry| entry.os == vm.os) {
            Some(entry) => entry.count += 1,
            None => labels.push(OsCount {
                os: vm.os.clone(),
                count: 1,
            }),
        }
    }

    labels.sort_by(|a, b| b.count.cmp(&a.count));
    labels.truncate(OS_DISTRIBUTION_LIMIT);

    analysis.hybrid_benefit_eligible = analysis.windows_vms;
    analysis.os_distribution = labels;
    analysis
}
