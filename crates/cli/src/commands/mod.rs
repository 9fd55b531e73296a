//! Subcommand implementations

pub mod assess;
pub mod catalog;
pub mod detect;

use anyhow::{Context, Result};
use assess_lib::{FileCatalog, PricingCatalog, StaticCatalog, Workbook};
use std::path::Path;
use std::sync::Arc;

/// Read a workbook from a JSON file of `{sheet: [rows]}`
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read workbook {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse workbook {}", path.display()))
}

/// Pricing catalog from a file, or the built-in reference prices
pub fn catalog_for(path: Option<&Path>) -> Arc<dyn PricingCatalog> {
    match path {
        Some(path) => Arc::new(FileCatalog::new(path)),
        None => Arc::new(StaticCatalog::reference()),
    }
}
