//! Output formatting utilities

use assess_lib::recommend::Severity;
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a table from a list of rows
pub fn print_table<T: Tabled>(rows: &[T]) {
    if rows.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a section heading
pub fn print_heading(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "-".repeat(50));
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a USD amount
pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Format an hourly price with enough precision for list prices
pub fn format_hourly(amount: f64) -> String {
    format!("${:.4}/h", amount)
}

/// Color a recommendation severity
pub fn color_severity(severity: Severity) -> String {
    let label = severity.as_str();
    match severity {
        Severity::Success => label.green().to_string(),
        Severity::Info => label.blue().to_string(),
        Severity::Warning => label.yellow().to_string(),
    }
}

/// Color a readiness percentage
pub fn color_percentage(percentage: f64) -> String {
    let formatted = format!("{:.1}%", percentage);
    if percentage >= 70.0 {
        formatted.green().to_string()
    } else if percentage >= 40.0 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(167.9), "$167.90");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_hourly(0.0416), "$0.0416/h");
    }

    #[test]
    fn test_color_severity_keeps_label() {
        colored::control::set_override(false);
        assert_eq!(color_severity(Severity::Warning), "warning");
        assert_eq!(color_percentage(50.0), "50.0%");
    }
}
