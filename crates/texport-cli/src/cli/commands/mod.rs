//! CLI command handlers, one file per command.

mod assets_export;
mod scan_report;
mod vulns_export;
mod was_export;

pub use assets_export::run_assets_export;
pub use scan_report::run_scan_report;
pub use vulns_export::run_vulns_export;
pub use was_export::run_was_export;

use anyhow::Result;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// NDJSON sink: the given file, or stdout when no path was passed.
pub(super) fn record_sink(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}
