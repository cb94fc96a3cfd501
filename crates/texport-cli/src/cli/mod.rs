//! CLI for the TEXPORT bulk export client.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use texport_core::{Client, Config};

use commands::{run_assets_export, run_scan_report, run_vulns_export, run_was_export};

/// Top-level CLI for the TEXPORT bulk export client.
#[derive(Debug, Parser)]
#[command(name = "texport")]
#[command(about = "TEXPORT: bulk export client for chunked scan-data APIs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a vulnerability export and emit records as NDJSON.
    VulnsExport {
        /// Assets per chunk requested from the server.
        #[arg(long, default_value = "50", value_name = "N")]
        num_assets: u64,
        /// Write records here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run an asset export and emit records as NDJSON.
    AssetsExport {
        /// Records per chunk requested from the server.
        #[arg(long, default_value = "100", value_name = "N")]
        chunk_size: u64,
        /// Write records here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Export a scan report and save it to a file.
    ScanReport {
        /// Numeric scan identifier.
        scan_id: u64,
        /// Report format: pdf, csv or nessus.
        #[arg(long, default_value = "pdf")]
        format: String,
        /// Destination file for the report.
        output: PathBuf,
    },

    /// Export a single web application scan result.
    WasExport {
        /// Web application scan identifier.
        scan_id: String,
        /// Write the export here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let config = Config::from_env()?;
        tracing::debug!("connecting to {}", config.base_url);
        let client = Client::new(config)?;

        match cli.command {
            CliCommand::VulnsExport { num_assets, output } => {
                run_vulns_export(&client, num_assets, output.as_deref())?;
            }
            CliCommand::AssetsExport { chunk_size, output } => {
                run_assets_export(&client, chunk_size, output.as_deref())?;
            }
            CliCommand::ScanReport {
                scan_id,
                format,
                output,
            } => run_scan_report(&client, scan_id, &format, &output)?,
            CliCommand::WasExport { scan_id, output } => {
                run_was_export(&client, &scan_id, output.as_deref())?;
            }
        }

        Ok(())
    }
}
