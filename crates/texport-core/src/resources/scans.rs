//! Scan management and single-file report export.
//!
//! Reports are not chunked: requesting an export yields a file id, a
//! dedicated status endpoint reports `loading` until the file is `ready`,
//! and the download endpoint then serves the binary artifact.

use std::path::Path;
use std::time::Duration;

use serde_json::{json, Value};

use crate::client::Client;
use crate::error::{Error, Result};
use crate::poll::poll_until;

/// Report formats the server will render. Validated before any request.
pub const EXPORT_FORMATS: [&str; 3] = ["pdf", "csv", "nessus"];

#[derive(Clone, Copy)]
pub struct Scans<'a> {
    client: &'a Client,
}

impl<'a> Scans<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn list(&self) -> Result<Value> {
        self.client.get("/scans", &[])
    }

    pub fn create(&self, params: &Value) -> Result<Value> {
        self.client.post("/scans", Some(params))
    }

    pub fn launch(&self, scan_id: u64) -> Result<Value> {
        self.client.post(&format!("/scans/{scan_id}/launch"), None)
    }

    pub fn latest_status(&self, scan_id: u64) -> Result<Value> {
        self.client.get(&format!("/scans/{scan_id}/latest-status"), &[])
    }

    /// Requests a report export and returns the file id to poll.
    pub fn export_request(&self, scan_id: u64, format: &str) -> Result<u64> {
        if !EXPORT_FORMATS.contains(&format) {
            return Err(Error::Config(format!(
                "unsupported format {format:?} (expected one of {})",
                EXPORT_FORMATS.join(", ")
            )));
        }
        let response = self
            .client
            .post(&format!("/scans/{scan_id}/export"), Some(&json!({ "format": format })))?;
        response
            .get("file")
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::Parse("export response is missing file id".into()))
    }

    /// Readiness of a requested report: `loading` until `ready`.
    pub fn export_status(&self, scan_id: u64, file_id: u64) -> Result<String> {
        let value = self
            .client
            .get(&format!("/scans/{scan_id}/export/{file_id}/status"), &[])?;
        value
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Parse("export status response is missing status".into()))
    }

    /// Downloads the rendered report.
    pub fn download(&self, scan_id: u64, file_id: u64) -> Result<Vec<u8>> {
        self.client
            .get_raw(&format!("/scans/{scan_id}/export/{file_id}/download"), &[])
    }

    /// Full report export: request, poll the status endpoint until
    /// `ready`, download. When `save_path` is given the bytes are also
    /// written there verbatim; the caller owns path safety. Returns the
    /// report bytes either way.
    pub fn export(
        &self,
        scan_id: u64,
        format: &str,
        timeout: Duration,
        poll_interval: Duration,
        save_path: Option<&Path>,
    ) -> Result<Vec<u8>> {
        let file_id = self.export_request(scan_id, format)?;
        let label = format!("scan {scan_id} report {file_id}");
        poll_until(
            &*self.client.time(),
            timeout,
            poll_interval,
            &label,
            || Ok((self.export_status(scan_id, file_id)? == "ready").then_some(())),
        )?;
        let bytes = self.download(scan_id, file_id)?;
        if let Some(path) = save_path {
            std::fs::write(path, &bytes)?;
        }
        Ok(bytes)
    }
}
