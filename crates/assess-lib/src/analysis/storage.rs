//! Storage totals from a disk sheet

use crate::ingest::{cell_number, resolve_column, Matcher, RawTable};
use crate::models::round2;
use serde::{Deserialize, Serialize};

/// Marker returned when no capacity column exists
pub const NO_CAPACITY_DATA: &str = "no capacity data";

/// Capacity columns (megabytes) in priority order
const CAPACITY_COLUMNS: &[Matcher] = &[
    Matcher::Exact("Capacity MB"),
    Matcher::Exact("Capacity MiB"),
    Matcher::Exact("Provisioned MB"),
    Matcher::Exact("Size MB"),
    Matcher::Exact("Disk size (MB)"),
    Matcher::Contains("capacity"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageTotals {
    pub capacity_column: String,
    pub disk_count: usize,
    pub total_storage_gb: u64,
    pub total_storage_tb: u64,
    pub avg_disk_size_gb: f64,
}

/// Storage result; absence of capacity data is distinct from zero capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StorageAnalysis {
    Measured(StorageTotals),
    Unavailable { error: String },
}

impl StorageAnalysis {
    pub fn no_capacity_data() -> Self {
        StorageAnalysis::Unavailable {
            error: NO_CAPACITY_DATA.to_string(),
        }
    }

    pub fn totals(&self) -> Option<&StorageTotals> {
        match self {
            StorageAnalysis::Measured(totals) => Some(totals),
            StorageAnalysis::Unavailable { .. } => None,
        }
    }
}

pub fn analyze_storage(disks: &RawTable) -> StorageAnalysis {
    let Some(column) = resolve_column(CAPACITY_COLUMNS, disks.columns()) else {
        return StorageAnalysis::no_capacity_data();
    };

    let total_mb: f64 = disks
        .rows()
        .iter()
        .filter_map(|row| row.get(column).and_then(cell_number))
        .map(|mb| mb.max(0.0))
        .sum();
    let disk_count = disks.len();

    StorageAnalysis::Measured(StorageTotals {
        capacity_column: column.to_string(),
        disk_count,
        total_storage_gb: (total_mb / 1024.0) as u64,
        total_storage_tb: (total_mb / (1024.0 * 1024.0)) as u64,
        avg_disk_size_gb: if disk_count > 0 {
            round2(total_mb / disk_count as f64 / 1024.0)
        } else {
            0.0
        },
    })
}
