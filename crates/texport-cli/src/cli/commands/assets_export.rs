//! `texport assets-export` – stream an asset export as NDJSON.

use anyhow::Result;
use serde_json::json;
use std::io::Write;
use std::path::Path;
use texport_core::{Client, Error};

use super::record_sink;

pub fn run_assets_export(client: &Client, chunk_size: u64, output: Option<&Path>) -> Result<()> {
    let mut sink = record_sink(output)?;
    let mut count: u64 = 0;

    let job = client
        .asset_exports()
        .export(&json!({ "chunk_size": chunk_size }), |record| {
            let line = serde_json::to_string(&record).map_err(|e| Error::Parse(e.to_string()))?;
            writeln!(sink, "{line}").map_err(Error::Io)?;
            count += 1;
            Ok(())
        })?;

    sink.flush()?;
    eprintln!(
        "Exported {count} asset records ({} chunks).",
        job.chunks_available.len()
    );
    if !job.chunks_failed.is_empty() {
        eprintln!("Warning: server reported failed chunks: {:?}", job.chunks_failed);
    }
    Ok(())
}
