//! `texport scan-report` – export a scan report to a local file.

use anyhow::Result;
use std::path::Path;
use texport_core::Client;

pub fn run_scan_report(client: &Client, scan_id: u64, format: &str, output: &Path) -> Result<()> {
    let config = client.config();
    let bytes = client.scans().export(
        scan_id,
        format,
        config.export_timeout,
        config.poll_interval,
        Some(output),
    )?;
    eprintln!(
        "Saved {format} report for scan {scan_id} to {} ({} bytes).",
        output.display(),
        bytes.len()
    );
    Ok(())
}
