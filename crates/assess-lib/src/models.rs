//! Core data models for the assessment engine

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Fixed number of hours billed per month
pub const HOURS_PER_MONTH: f64 = 730.0;

/// Declared kind of an inventory export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Rvtools,
    AzureMigrate,
    Generic,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Rvtools => "rvtools",
            SourceKind::AzureMigrate => "azure-migrate",
            SourceKind::Generic => "generic",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = crate::error::AssessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rvtools" => Ok(SourceKind::Rvtools),
            "azure-migrate" | "azmigrate" | "azure_migrate" => Ok(SourceKind::AzureMigrate),
            "generic" => Ok(SourceKind::Generic),
            other => Err(crate::error::AssessError::UnknownSource(other.to_string())),
        }
    }
}

/// Power state of a virtual machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    pub fn is_on(&self) -> bool {
        matches!(self, PowerState::On)
    }
}

/// Canonical VM record produced by the normalizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmRecord {
    pub id: String,
    pub name: String,
    pub cpu_count: u32,
    pub memory_mb: u64,
    pub power_state: PowerState,
    pub os: String,
}

impl VmRecord {
    /// Memory in gigabytes, used for threshold comparisons
    pub fn memory_gb(&self) -> f64 {
        self.memory_mb as f64 / 1024.0
    }

    pub fn is_on(&self) -> bool {
        self.power_state.is_on()
    }
}

/// Ordered set of canonical VM records for one assessment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VmSet {
    vms: Vec<VmRecord>,
}

impl VmSet {
    pub fn new(vms: Vec<VmRecord>) -> Self {
        Self { vms }
    }

    pub fn len(&self) -> usize {
        self.vms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VmRecord> {
        self.vms.iter()
    }

    /// Powered-on subset
    pub fn powered_on(&self) -> impl Iterator<Item = &VmRecord> {
        self.vms.iter().filter(|vm| vm.is_on())
    }

    pub fn as_slice(&self) -> &[VmRecord] {
        &self.vms
    }
}

impl FromIterator<VmRecord> for VmSet {
    fn from_iter<I: IntoIterator<Item = VmRecord>>(iter: I) -> Self {
        Self {
            vms: iter.into_iter().collect(),
        }
    }
}

/// A priced instance type from a provider catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceOffer {
    #[serde(rename = "type")]
    pub instance_type: String,
    #[serde(default)]
    pub family: String,
    pub cpu: f64,
    #[serde(alias = "memory")]
    pub memory_gb: f64,
    #[serde(alias = "cost_hourly")]
    pub cost_per_hour: f64,
}

impl InstanceOffer {
    pub fn new(
        instance_type: impl Into<String>,
        family: impl Into<String>,
        cpu: f64,
        memory_gb: f64,
        cost_per_hour: f64,
    ) -> Self {
        Self {
            instance_type: instance_type.into(),
            family: family.into(),
            cpu,
            memory_gb,
            cost_per_hour,
        }
    }

    /// Whether this offer covers the VM's CPU and memory demand
    pub fn fits(&self, vm: &VmRecord) -> bool {
        self.cpu >= vm.cpu_count as f64 && self.memory_gb >= vm.memory_gb()
    }
}

/// Instance list for one provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderCatalog {
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub instances: Vec<InstanceOffer>,
}

/// Read-only catalog snapshot for one assessment run, keyed by provider
pub type PricingSnapshot = BTreeMap<String, ProviderCatalog>;

/// Caller-supplied context forwarded to the metrics sink
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_code: Option<String>,
}

impl CustomerContext {
    pub fn new(customer_id: impl Into<String>, document_code: impl Into<String>) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            document_code: Some(document_code.into()),
        }
    }
}

/// Round a monetary value to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
