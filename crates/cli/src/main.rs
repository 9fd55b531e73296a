//! VM Migration Assessment CLI
//!
//! Runs assessments locally from JSON workbooks, inspects pricing catalogs
//! and submits workbooks to a running assessment server.

mod client;
mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use assess_lib::{CustomerContext, SourceKind};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// VM Migration Assessment CLI
#[derive(Parser)]
#[command(name = "vma")]
#[command(author, version, about = "CLI for VM migration assessments", long_about = None)]
pub struct Cli {
    /// Assessment server URL (can also be set via VMA_API_URL env var)
    #[arg(long, env = "VMA_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assess a workbook locally
    Assess {
        /// Workbook JSON file ({"sheet": [rows]})
        input: PathBuf,

        #[command(flatten)]
        submission: SubmissionArgs,

        /// Pricing snapshot file (uses built-in reference prices if not specified)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Detect the source kind of a workbook
    Detect {
        /// Workbook JSON file
        input: PathBuf,
    },

    /// Inspect pricing catalogs
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Submit a workbook to the assessment server
    Submit {
        /// Workbook JSON file
        input: PathBuf,

        #[command(flatten)]
        submission: SubmissionArgs,
    },
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Show catalog offers
    Show {
        /// Pricing snapshot file (uses built-in reference prices if not specified)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Only show one provider (aws, azure, gcp)
        #[arg(long)]
        provider: Option<String>,

        /// Fetch the catalog from the assessment server instead
        #[arg(long, conflicts_with = "catalog")]
        remote: bool,
    },
}

#[derive(Args)]
pub struct SubmissionArgs {
    /// Source kind of the workbook
    #[arg(long, short, value_enum, default_value = "auto")]
    pub source: SourceArg,

    /// Customer identifier used for duplicate detection
    #[arg(long)]
    pub customer: Option<String>,

    /// Document code used for duplicate detection
    #[arg(long)]
    pub document_code: Option<String>,
}

impl SubmissionArgs {
    fn context(&self) -> CustomerContext {
        CustomerContext {
            customer_id: self.customer.clone(),
            document_code: self.document_code.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceArg {
    /// Detect from sheet names
    Auto,
    Rvtools,
    AzureMigrate,
    Generic,
}

impl SourceArg {
    fn kind(self) -> Option<SourceKind> {
        match self {
            SourceArg::Auto => None,
            SourceArg::Rvtools => Some(SourceKind::Rvtools),
            SourceArg::AzureMigrate => Some(SourceKind::AzureMigrate),
            SourceArg::Generic => Some(SourceKind::Generic),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = config::Config::load()?;
    let format = config.resolve_format(cli.format);

    match cli.command {
        Commands::Assess {
            input,
            submission,
            catalog,
        } => {
            let catalog = catalog.or_else(|| config.catalog_path.clone());
            commands::assess::assess_local(
                &input,
                submission.source.kind(),
                catalog.as_deref(),
                submission.context(),
                format,
            )
            .await?;
        }
        Commands::Detect { input } => {
            commands::detect::detect(&input, format)?;
        }
        Commands::Catalog(CatalogCommands::Show {
            catalog,
            provider,
            remote,
        }) => {
            let (snapshot, origin) = if remote {
                let api_url = config.resolve_api_url(cli.api_url.as_deref());
                let client = client::ApiClient::new(&api_url)?;
                (client.pricing().await?, api_url)
            } else {
                let catalog = catalog.or_else(|| config.catalog_path.clone());
                let catalog = commands::catalog_for(catalog.as_deref());
                let snapshot = catalog
                    .snapshot()
                    .await
                    .with_context(|| format!("Failed to load catalog {}", catalog.describe()))?;
                (snapshot, catalog.describe())
            };
            commands::catalog::show(snapshot, &origin, provider.as_deref(), format)?;
        }
        Commands::Submit { input, submission } => {
            let client = client::ApiClient::new(&config.resolve_api_url(cli.api_url.as_deref()))?;
            commands::assess::submit(
                &client,
                &input,
                submission.source.kind(),
                submission.context(),
                format,
            )
            .await?;
        }
    }

    Ok(())
}
