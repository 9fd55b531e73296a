//! Tabular input as delivered by the ingestion front door
//!
//! A workbook is an ordered set of named sheets; each sheet is a list of
//! row objects. Column order is the order in which columns are first seen.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One sheet of rows keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Map<String, Value>>", into = "Vec<Map<String, Value>>")]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl RawTable {
    pub fn from_rows(rows: Vec<Map<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value for a row and column, `None` when the row lacks the column
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

impl From<Vec<Map<String, Value>>> for RawTable {
    fn from(rows: Vec<Map<String, Value>>) -> Self {
        Self::from_rows(rows)
    }
}

impl From<RawTable> for Vec<Map<String, Value>> {
    fn from(table: RawTable) -> Self {
        table.rows
    }
}

/// Ordered collection of named sheets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Workbook {
    sheets: Vec<(String, RawTable)>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a sheet
    pub fn with_sheet(mut self, name: impl Into<String>, table: RawTable) -> Self {
        let name = name.into();
        match self.sheets.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = table,
            None => self.sheets.push((name, table)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(name, _)| name.as_str())
    }

    pub fn sheets(&self) -> impl Iterator<Item = (&str, &RawTable)> {
        self.sheets.iter().map(|(name, table)| (name.as_str(), table))
    }

    /// Sheet by case-insensitive name
    pub fn sheet(&self, name: &str) -> Option<(&str, &RawTable)> {
        self.sheets()
            .find(|(sheet_name, _)| sheet_name.eq_ignore_ascii_case(name))
    }

    /// First sheet whose lower-cased name contains any of the fragments
    pub fn sheet_containing(&self, fragments: &[&str]) -> Option<(&str, &RawTable)> {
        self.sheets().find(|(name, _)| {
            let lower = name.to_lowercase();
            fragments.iter().any(|f| lower.contains(f))
        })
    }

    pub fn first_sheet(&self) -> Option<(&str, &RawTable)> {
        self.sheets().next()
    }
}

impl From<Map<String, Value>> for Workbook {
    fn from(map: Map<String, Value>) -> Self {
        let sheets = map
            .into_iter()
            .map(|(name, value)| {
                // Non-tabular sheets are read as empty tables
                let rows = match value {
                    Value::Array(items) => items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::Object(row) => Some(row),
                            _ => None,
                        })
                        .collect(),
                    _ => Vec::new(),
                };
                (name, RawTable::from_rows(rows))
            })
            .collect();
        Self { sheets }
    }
}

impl From<Workbook> for Map<String, Value> {
    fn from(workbook: Workbook) -> Self {
        workbook
            .sheets
            .into_iter()
            .map(|(name, table)| {
                let rows: Vec<Map<String, Value>> = table.into();
                (name, Value::Array(rows.into_iter().map(Value::Object).collect()))
            })
            .collect()
    }
}

/// Numeric reading of a cell; accepts numbers and numeric strings
pub(crate) fn cell_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                None
            } else {
                cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
            }
        }
        _ => None,
    }
}

/// Textual reading of a cell; blank strings and nulls read as `None`
pub(crate) fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}
