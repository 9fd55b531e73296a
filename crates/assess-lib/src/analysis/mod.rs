//! Stateless metric aggregators over a VM set
//!
//! Each aggregator is a pure function of the VM set (or a disk table) and
//! none depends on another's output.

mod compute;
mod licensing;
mod storage;
mod summary;

pub use compute::{
    analyze_compute, analyze_memory, ComputeAnalysis, MemoryAnalysis, MemoryDistribution,
    CPU_RIGHT_SIZING_THRESHOLD, HIGH_CPU_THRESHOLD, MEMORY_RIGHT_SIZING_THRESHOLD_GB,
};
pub use licensing::{analyze_licensing, LicensingAnalysis, OsCount, OsFamily, OS_DISTRIBUTION_LIMIT};
pub use storage::{analyze_storage, StorageAnalysis, StorageTotals, NO_CAPACITY_DATA};
pub use summary::{summarize, InfrastructureSummary};
