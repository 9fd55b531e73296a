//! Ingestion of inventory exports
//!
//! This module provides:
//! - Workbook/table types for raw sheet data
//! - Declarative column rules per source kind
//! - Normalization into canonical VM records and source detection

mod normalizer;
mod rules;
mod workbook;

pub use normalizer::{
    detect_source, disk_sheet, inventory_sheet, parse_power_state, FieldDefaults, Normalizer,
    DEFAULT_CPU_COUNT, DEFAULT_MEMORY_MB, UNKNOWN_OS,
};
pub use rules::{canonical, resolve_column, ColumnRules, Field, Matcher, MemoryUnit};
pub use workbook::{RawTable, Workbook};

pub(crate) use workbook::cell_number;
