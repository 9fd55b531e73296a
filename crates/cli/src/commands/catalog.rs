//! Pricing catalog inspection

use anyhow::{Context, Result};
use assess_lib::PricingSnapshot;
use colored::Colorize;
use tabled::Tabled;

use crate::output::{format_hourly, print_heading, print_info, print_json, print_table, OutputFormat};

#[derive(Tabled)]
struct OfferRow {
    #[tabled(rename = "Type")]
    instance_type: String,
    #[tabled(rename = "Family")]
    family: String,
    #[tabled(rename = "vCPU")]
    cpu: f64,
    #[tabled(rename = "Memory (GB)")]
    memory_gb: f64,
    #[tabled(rename = "Price")]
    price: String,
}

/// Show the offers of a pricing snapshot, optionally for a single provider
pub fn show(
    mut snapshot: PricingSnapshot,
    origin: &str,
    provider: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    if let Some(provider) = provider {
        let key = provider.to_lowercase();
        let selected = snapshot
            .remove(&key)
            .with_context(|| format!("Provider {} not in catalog", provider))?;
        snapshot = PricingSnapshot::from([(key, selected)]);
    }

    match format {
        OutputFormat::Json => print_json(&snapshot)?,
        OutputFormat::Table => {
            print_info(&format!("Catalog: {}", origin));
            for (name, provider_catalog) in &snapshot {
                print_heading(&format!("{} ({})", name.to_uppercase(), provider_catalog.region.cyan()));
                let rows: Vec<OfferRow> = provider_catalog
                    .instances
                    .iter()
                    .map(|offer| OfferRow {
                        instance_type: offer.instance_type.clone(),
                        family: offer.family.clone(),
                        cpu: offer.cpu,
                        memory_gb: offer.memory_gb,
                        price: format_hourly(offer.cost_per_hour),
                    })
                    .collect();
                print_table(&rows);
            }
        }
    }

    Ok(())
}
