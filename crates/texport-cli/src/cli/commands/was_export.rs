//! `texport was-export` – export one web application scan result.

use anyhow::Result;
use std::io::{self, Write};
use std::path::Path;
use texport_core::Client;

pub fn run_was_export(client: &Client, scan_id: &str, output: Option<&Path>) -> Result<()> {
    let config = client.config();
    let bytes = client.web_app_scans().export(
        scan_id,
        config.export_timeout,
        config.poll_interval,
        output,
    )?;
    match output {
        Some(path) => eprintln!(
            "Saved export for scan {scan_id} to {} ({} bytes).",
            path.display(),
            bytes.len()
        ),
        None => io::stdout().write_all(&bytes)?,
    }
    Ok(())
}
