//! CLI integration tests

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn vma(args: &[&str], home: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vma"))
        .args(args)
        .env("HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("VMA_API_URL")
        .output()
        .expect("Failed to execute command")
}

fn write_rvtools_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("rvtools.json");
    std::fs::write(
        &path,
        r#"{
            "vInfo": [
                {"VM": "web-01", "Powerstate": "poweredOn", "CPUs": 2, "Memory": 4096,
                 "OS according to the configuration file": "Ubuntu Linux (64-bit)"},
                {"VM": "sql-01", "Powerstate": "poweredOn", "CPUs": 16, "Memory": 32768,
                 "OS according to the configuration file": "Microsoft Windows Server 2008 R2 (64-bit)"}
            ],
            "vDisk": [
                {"VM": "web-01", "Capacity MB": 40960},
                {"VM": "sql-01", "Capacity MB": 204800}
            ]
        }"#,
    )
    .unwrap();
    path
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    let output = vma(&["--help"], home.path());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("VM migration assessments"), "Should show app description");
    assert!(stdout.contains("assess"), "Should show assess command");
    assert!(stdout.contains("detect"), "Should show detect command");
    assert!(stdout.contains("catalog"), "Should show catalog command");
    assert!(stdout.contains("submit"), "Should show submit command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    let output = vma(&["--version"], home.path());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("vma"), "Should show binary name");
}

#[test]
fn test_assess_help_lists_options() {
    let home = TempDir::new().unwrap();
    let output = vma(&["assess", "--help"], home.path());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--source"));
    assert!(stdout.contains("--catalog"));
    assert!(stdout.contains("--customer"));
    assert!(stdout.contains("--document-code"));
}

#[test]
fn test_assess_json_output() {
    let home = TempDir::new().unwrap();
    let input = write_rvtools_workbook(home.path());

    let output = vma(
        &["assess", input.to_str().unwrap(), "--format", "json", "--customer", "acme"],
        home.path(),
    );
    assert!(
        output.status.success(),
        "assess failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["source_type"], "rvtools");
    assert_eq!(result["customer_id"], "acme");
    assert_eq!(result["summary"]["total_vms"], 2);
    assert_eq!(result["storage_analysis"]["total_storage_gb"], 240);
    assert_eq!(result["readiness"]["ready"], 1);
    assert_eq!(result["readiness"]["complex"], 1);
    assert_eq!(result["cost_estimates"]["aws"]["vm_count"], 2);
}

#[test]
fn test_assess_table_output() {
    let home = TempDir::new().unwrap();
    let input = write_rvtools_workbook(home.path());

    let output = vma(&["assess", input.to_str().unwrap()], home.path());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Migration Assessment"));
    assert!(stdout.contains("Estimated Cloud Cost"));
    assert!(stdout.contains("Right-sizing Opportunity"));
}

#[test]
fn test_assess_with_catalog_file() {
    let home = TempDir::new().unwrap();
    let input = write_rvtools_workbook(home.path());
    let catalog = home.path().join("pricing.json");
    std::fs::write(
        &catalog,
        r#"{"aws": {"region": "us-east-1", "instances": [
            {"type": "t3.medium", "cpu": 2, "memory_gb": 4, "cost_per_hour": 0.04},
            {"type": "m5.xlarge", "cpu": 4, "memory_gb": 16, "cost_per_hour": 0.19}
        ]}}"#,
    )
    .unwrap();

    let output = vma(
        &[
            "assess",
            input.to_str().unwrap(),
            "--catalog",
            catalog.to_str().unwrap(),
            "--format",
            "json",
        ],
        home.path(),
    );
    assert!(output.status.success());

    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["cost_estimates"]["aws"]["monthly_cost"], 167.9);
    assert_eq!(result["cost_estimates"]["aws"]["fallback_vms"], 1);
    assert!(result["cost_estimates"]["azure"].is_null());
}

#[test]
fn test_assess_missing_file_fails() {
    let home = TempDir::new().unwrap();
    let output = vma(&["assess", "/nonexistent/workbook.json"], home.path());

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read workbook"));
}

#[test]
fn test_detect_json_output() {
    let home = TempDir::new().unwrap();
    let input = write_rvtools_workbook(home.path());

    let output = vma(&["detect", input.to_str().unwrap(), "--format", "json"], home.path());
    assert!(output.status.success());

    let detection: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(detection["source_type"], "rvtools");
    assert_eq!(detection["sheets"][0]["sheet"], "vInfo");
    assert_eq!(detection["sheets"][0]["rows"], 2);
    assert_eq!(detection["sheets"][0]["role"], "inventory");
    assert_eq!(detection["sheets"][1]["role"], "disks");
}

#[test]
fn test_catalog_show_single_provider() {
    let home = TempDir::new().unwrap();
    let output = vma(
        &["catalog", "show", "--provider", "gcp", "--format", "json"],
        home.path(),
    );
    assert!(output.status.success());

    let snapshot: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot.as_object().unwrap().len(), 1);
    assert_eq!(snapshot["gcp"]["region"], "us-east1");
}

#[test]
fn test_catalog_show_unknown_provider_fails() {
    let home = TempDir::new().unwrap();
    let output = vma(&["catalog", "show", "--provider", "oracle"], home.path());
    assert!(!output.status.success());
}

#[test]
fn test_config_file_sets_default_format() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".config").join("vma");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.json"), r#"{"default_format": "json"}"#).unwrap();
    let input = write_rvtools_workbook(home.path());

    let output = vma(&["detect", input.to_str().unwrap()], home.path());
    assert!(output.status.success());
    let detection: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(detection["source_type"], "rvtools");
}
