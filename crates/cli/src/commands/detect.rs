//! Source-kind detection

use anyhow::Result;
use assess_lib::{
    detect_source,
    ingest::{disk_sheet, inventory_sheet},
};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

use super::load_workbook;
use crate::output::{print_json, print_table, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct SheetRow {
    #[tabled(rename = "Sheet")]
    sheet: String,
    #[tabled(rename = "Rows")]
    rows: usize,
    #[tabled(rename = "Columns")]
    columns: usize,
    #[tabled(rename = "Role")]
    role: String,
}

#[derive(Debug, Serialize)]
struct Detection {
    source_type: String,
    sheets: Vec<SheetRow>,
}

/// Report the detected source kind and what each sheet is used for
pub fn detect(input: &Path, format: OutputFormat) -> Result<()> {
    let workbook = load_workbook(input)?;
    let kind = detect_source(&workbook);
    let inventory = inventory_sheet(&workbook, kind).map(|(name, _)| name.to_string());
    let disks = disk_sheet(&workbook, kind).map(|(name, _)| name.to_string());

    let sheets = workbook
        .sheets()
        .map(|(name, table)| {
            let role = if inventory.as_deref() == Some(name) {
                "inventory"
            } else if disks.as_deref() == Some(name) {
                "disks"
            } else {
                "-"
            };
            SheetRow {
                sheet: name.to_string(),
                rows: table.len(),
                columns: table.columns().len(),
                role: role.to_string(),
            }
        })
        .collect();

    let detection = Detection {
        source_type: kind.to_string(),
        sheets,
    };

    match format {
        OutputFormat::Json => print_json(&detection)?,
        OutputFormat::Table => {
            println!("Detected source:        {}", detection.source_type.cyan().bold());
            print_table(&detection.sheets);
        }
    }

    Ok(())
}
