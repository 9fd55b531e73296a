//! Assessment commands: local runs and server submissions

use anyhow::{Context, Result};
use assess_lib::{
    analysis::StorageAnalysis, AssessmentRequest, AssessmentResult, Assessor, CustomerContext,
    NullSink, SourceKind,
};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use tabled::Tabled;
use tracing::debug;

use super::{catalog_for, load_workbook};
use crate::client::ApiClient;
use crate::output::{
    color_percentage, color_severity, format_currency, print_heading, print_json, print_success,
    print_table, print_warning, OutputFormat,
};

#[derive(Tabled)]
struct CostRow {
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Region")]
    region: String,
    #[tabled(rename = "VMs")]
    vms: usize,
    #[tabled(rename = "Fallback")]
    fallback: usize,
    #[tabled(rename = "Monthly")]
    monthly: String,
    #[tabled(rename = "Annual")]
    annual: String,
}

#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Finding")]
    description: String,
}

/// Assess a workbook file in-process
pub async fn assess_local(
    input: &Path,
    source: Option<SourceKind>,
    catalog: Option<&Path>,
    context: CustomerContext,
    format: OutputFormat,
) -> Result<()> {
    let workbook = load_workbook(input)?;
    let assessor = Assessor::new(catalog_for(catalog), Arc::new(NullSink));
    debug!(catalog = %assessor.catalog().describe(), "Running local assessment");

    let result = match source {
        Some(kind) => assessor.assess(&workbook, kind, context).await,
        None => assessor.assess_detected(&workbook, context).await,
    }
    .context("Assessment failed")?;

    print_assessment(&result, format)
}

/// Submit a workbook file to the assessment server
pub async fn submit(
    client: &ApiClient,
    input: &Path,
    source: Option<SourceKind>,
    context: CustomerContext,
    format: OutputFormat,
) -> Result<()> {
    let request = AssessmentRequest {
        sheets: load_workbook(input)?,
        context,
    };
    let result = client.submit_assessment(&request, source).await?;

    if format == OutputFormat::Table {
        print_success(&format!("Submitted assessment {}", result.assessment_id));
    }
    print_assessment(&result, format)
}

/// Render an assessment result
pub fn print_assessment(result: &AssessmentResult, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(result);
    }

    println!("{}", "Migration Assessment".bold());
    println!("{}", "=".repeat(50));
    println!("Assessment:             {}", result.assessment_id.cyan());
    println!("Source:                 {}", result.source_type);
    if let Some(customer) = &result.customer_id {
        println!("Customer:               {}", customer);
    }

    let summary = &result.summary;
    print_heading("Infrastructure");
    println!(
        "VMs:                    {} ({} powered on)",
        summary.total_vms, summary.powered_on_vms
    );
    println!(
        "vCPUs / Memory:         {} / {} GB",
        summary.total_vcpus, summary.total_memory_gb
    );
    println!(
        "Average per VM:         {:.2} vCPU, {:.2} GB",
        summary.avg_cpu_per_vm, summary.avg_memory_per_vm_gb
    );
    match &result.storage_analysis {
        Some(StorageAnalysis::Measured(totals)) => println!(
            "Storage:                {} GB across {} disks",
            totals.total_storage_gb, totals.disk_count
        ),
        Some(StorageAnalysis::Unavailable { error }) => {
            println!("Storage:                {}", error.dimmed())
        }
        None => {}
    }
    let licensing = &result.licensing_analysis;
    println!(
        "Operating systems:      {} Windows, {} Linux, {} other",
        licensing.windows_vms, licensing.linux_vms, licensing.other_os
    );

    let readiness = &result.readiness;
    print_heading("Readiness");
    println!(
        "Ready / Needs work / Complex: {} / {} / {}",
        readiness.ready.to_string().green(),
        readiness.needs_work.to_string().yellow(),
        readiness.complex.to_string().red()
    );
    println!(
        "Readiness:              {}",
        color_percentage(readiness.readiness_percentage)
    );
    println!(
        "Complexity score:       {}",
        result.migration_complexity.total_complexity_score
    );

    print_heading("Estimated Cloud Cost");
    let rows: Vec<CostRow> = result
        .cost_estimates
        .iter()
        .map(|(provider, estimate)| CostRow {
            provider: provider.clone(),
            region: estimate.region.clone(),
            vms: estimate.vm_count,
            fallback: estimate.fallback_vms,
            monthly: format_currency(estimate.monthly_cost),
            annual: format_currency(estimate.annual_cost),
        })
        .collect();
    print_table(&rows);

    let spend = &result.predicted_spend;
    print_heading("Spend Projection");
    println!("Base monthly:           {}", format_currency(spend.base_monthly_cost));
    for (label, horizon) in [
        ("3 months", &spend.next_3_months),
        ("6 months", &spend.next_6_months),
        ("12 months", &spend.next_12_months),
    ] {
        if let Some(last) = horizon.last() {
            println!("In {:<20}{}", format!("{}:", label), format_currency(*last));
        }
    }

    if !result.recommendations.is_empty() {
        print_heading("Recommendations");
        let rows: Vec<RecommendationRow> = result
            .recommendations
            .iter()
            .map(|rec| RecommendationRow {
                severity: color_severity(rec.severity),
                category: rec.category.clone(),
                description: format!("{}: {}", rec.title, rec.description),
            })
            .collect();
        print_table(&rows);
    }

    for warning in &result.warnings {
        print_warning(warning);
    }

    Ok(())
}
