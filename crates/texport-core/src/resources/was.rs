//! Web Application Scanning endpoints.
//!
//! Three distinct surfaces: scan configuration management with paginated
//! findings, a chunked bulk findings export, and a per-scan single-file
//! export whose readiness is probed through the download endpoint itself
//! (the WAS API has no separate status endpoint for it).

use std::path::Path;
use std::time::Duration;

use serde_json::{json, Value};

use super::validate_path_segment;
use super::vulns::{export_uuid, job_from_value, records_from_value};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::export::{ExportDomain, ExportJob, ExportWorkflow, Record, RecordStream};
use crate::pagination::{Page, Paginator};
use crate::poll::poll_until;

/// Scan statuses with no further transitions.
pub const TERMINAL_SCAN_STATUSES: [&str; 4] = ["completed", "failed", "cancelled", "error"];

#[derive(Clone, Copy)]
pub struct WebAppScans<'a> {
    client: &'a Client,
}

impl<'a> WebAppScans<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Creates a scan configuration for a target URL.
    pub fn create_config(&self, name: &str, target: &str) -> Result<Value> {
        self.client.post(
            "/was/v2/configs",
            Some(&json!({ "name": name, "target": target })),
        )
    }

    /// Launches a scan for an existing configuration.
    pub fn launch(&self, config_id: &str) -> Result<Value> {
        validate_path_segment(config_id, "config_id")?;
        self.client
            .post(&format!("/was/v2/configs/{config_id}/scans"), None)
    }

    pub fn scan_status(&self, config_id: &str, scan_id: &str) -> Result<Value> {
        validate_path_segment(config_id, "config_id")?;
        validate_path_segment(scan_id, "scan_id")?;
        self.client
            .get(&format!("/was/v2/configs/{config_id}/scans/{scan_id}"), &[])
    }

    /// Polls the scan status until it reaches one of
    /// [`TERMINAL_SCAN_STATUSES`], returning the final status payload.
    /// Bounded by `timeout`; a scan stuck in `running` raises `Timeout`
    /// rather than waiting forever.
    pub fn wait_until_complete(
        &self,
        config_id: &str,
        scan_id: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Value> {
        validate_path_segment(config_id, "config_id")?;
        validate_path_segment(scan_id, "scan_id")?;
        let label = format!("WAS scan {scan_id}");
        poll_until(&*self.client.time(), timeout, poll_interval, &label, || {
            let value = self.scan_status(config_id, scan_id)?;
            let terminal = value
                .get("status")
                .and_then(Value::as_str)
                .is_some_and(|s| TERMINAL_SCAN_STATUSES.contains(&s));
            Ok(terminal.then_some(value))
        })
    }

    /// One raw findings page, unpaginated.
    pub fn findings(&self, config_id: &str, params: &[(&str, &str)]) -> Result<Value> {
        validate_path_segment(config_id, "config_id")?;
        self.client
            .get(&format!("/was/v2/configs/{config_id}/findings"), params)
    }

    /// Lazy paginated traversal over all findings of a configuration.
    /// `limit` is capped at the engine's hard maximum of 200.
    pub fn findings_pages(
        &self,
        config_id: &str,
        limit: u64,
    ) -> Result<Paginator<impl Fn(u64, u64) -> Result<Page> + 'a>> {
        validate_path_segment(config_id, "config_id")?;
        let client = self.client;
        let path = format!("/was/v2/configs/{config_id}/findings");
        Ok(Paginator::new(limit, move |offset, limit| {
            let value = client.get(
                &path,
                &[("offset", &offset.to_string()), ("limit", &limit.to_string())],
            )?;
            Ok(Page::from_value(&value, "items"))
        }))
    }

    /// Chunked bulk export of findings across configurations.
    pub fn findings_export(&self) -> WasFindingsExport<'a> {
        WasFindingsExport {
            client: self.client,
        }
    }

    // Per-scan single-file export.

    /// Asks the server to assemble the export artifact for one scan.
    pub fn export_scan(&self, scan_id: &str) -> Result<Value> {
        validate_path_segment(scan_id, "scan_id")?;
        self.client
            .put(&format!("/was/v2/scans/{scan_id}/export"), None)
    }

    /// Downloads the export artifact. 404 while the server is still
    /// assembling it surfaces as an `Api` error with that status.
    pub fn download_scan_export(&self, scan_id: &str) -> Result<Vec<u8>> {
        validate_path_segment(scan_id, "scan_id")?;
        self.client
            .get_raw(&format!("/was/v2/scans/{scan_id}/export/download"), &[])
    }

    /// Polls the download endpoint until the artifact exists: a 404 means
    /// "not ready", any success means "ready". The successful probe's
    /// payload IS the artifact; it is returned directly, never discarded
    /// and re-fetched, so exactly one successful download hits the wire.
    pub fn wait_and_download(
        &self,
        scan_id: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Vec<u8>> {
        validate_path_segment(scan_id, "scan_id")?;
        let label = format!("WAS scan {scan_id} export");
        poll_until(&*self.client.time(), timeout, poll_interval, &label, || {
            match self.download_scan_export(scan_id) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(Error::Api {
                    status: Some(404), ..
                }) => Ok(None),
                Err(e) => Err(e),
            }
        })
    }

    /// Full per-scan export: initiate, wait on the download probe, and
    /// optionally persist the artifact verbatim to `save_path`.
    pub fn export(
        &self,
        scan_id: &str,
        timeout: Duration,
        poll_interval: Duration,
        save_path: Option<&Path>,
    ) -> Result<Vec<u8>> {
        self.export_scan(scan_id)?;
        let bytes = self.wait_and_download(scan_id, timeout, poll_interval)?;
        if let Some(path) = save_path {
            std::fs::write(path, &bytes)?;
        }
        Ok(bytes)
    }
}

/// `/was/v1/export/vulns` family: chunked export of WAS findings.
#[derive(Clone, Copy)]
pub struct WasFindingsExport<'a> {
    client: &'a Client,
}

impl<'a> WasFindingsExport<'a> {
    fn workflow(&self) -> ExportWorkflow<Self> {
        ExportWorkflow::with_time_source(*self, self.client.time())
    }

    pub fn initiate(&self, body: &Value) -> Result<String> {
        self.workflow().initiate(body)
    }

    pub fn status(&self, export_uuid: &str) -> Result<ExportJob> {
        self.fetch_status(export_uuid)
    }

    pub fn download_chunk(&self, export_uuid: &str, chunk_id: u64) -> Result<Vec<Record>> {
        self.fetch_chunk(export_uuid, chunk_id)
    }

    pub fn wait_for_completion(&self, export_uuid: &str) -> Result<ExportJob> {
        let config = self.client.config();
        self.workflow()
            .wait_for_completion(export_uuid, config.export_timeout, config.poll_interval)
    }

    pub fn stream<F>(&self, export_uuid: &str, consumer: F) -> Result<ExportJob>
    where
        F: FnMut(Record) -> Result<()>,
    {
        self.workflow().stream(export_uuid, consumer)
    }

    pub fn records(&self, export_uuid: &str) -> RecordStream<Self> {
        self.workflow().records(export_uuid)
    }

    pub fn export<F>(&self, body: &Value, consumer: F) -> Result<ExportJob>
    where
        F: FnMut(Record) -> Result<()>,
    {
        let config = self.client.config();
        self.workflow()
            .export(body, config.export_timeout, config.poll_interval, consumer)
    }
}

impl ExportDomain for WasFindingsExport<'_> {
    fn describe(&self, job_id: &str) -> String {
        format!("WAS findings export {job_id}")
    }

    fn initiate(&self, body: &Value) -> Result<String> {
        let response = self.client.post("/was/v1/export/vulns", Some(body))?;
        export_uuid(&response)
    }

    fn fetch_status(&self, job_id: &str) -> Result<ExportJob> {
        validate_path_segment(job_id, "export_uuid")?;
        let value = self
            .client
            .get(&format!("/was/v1/export/vulns/{job_id}/status"), &[])?;
        job_from_value(value)
    }

    fn fetch_chunk(&self, job_id: &str, chunk_id: u64) -> Result<Vec<Record>> {
        validate_path_segment(job_id, "export_uuid")?;
        let value = self
            .client
            .get(&format!("/was/v1/export/vulns/{job_id}/chunks/{chunk_id}"), &[])?;
        records_from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::{client_with, json_response, raw_response};

    #[test]
    fn wait_and_download_treats_404_as_not_ready_and_keeps_the_payload() {
        let (client, transport, time) = client_with(vec![
            json_response(200, r#"{"scan_id":"s-1","status":"exporting"}"#),
            raw_response(404, b"not found"),
            raw_response(200, b"PK\x03\x04 archive"),
        ]);

        let bytes = client
            .web_app_scans()
            .export("s-1", Duration::from_secs(60), Duration::from_secs(2), None)
            .unwrap();

        assert_eq!(bytes, b"PK\x03\x04 archive");
        assert_eq!(time.slept(), vec![Duration::from_secs(2)]);
        // One PUT, then the probe: one 404 and exactly one successful GET.
        // The payload comes from the probe itself; no second download.
        assert_eq!(
            transport.request_paths(),
            vec![
                "/was/v2/scans/s-1/export",
                "/was/v2/scans/s-1/export/download",
                "/was/v2/scans/s-1/export/download",
            ]
        );
    }

    #[test]
    fn probe_errors_other_than_404_abort_the_wait() {
        let (client, _transport, time) = client_with(vec![raw_response(403, b"forbidden")]);

        let err = client
            .web_app_scans()
            .wait_and_download("s-1", Duration::from_secs(60), Duration::from_secs(2))
            .unwrap_err();

        assert_eq!(err.status(), Some(403));
        assert!(time.slept().is_empty());
    }

    #[test]
    fn findings_pages_caps_the_limit_and_maps_items() {
        let (client, transport, _time) = client_with(vec![json_response(
            200,
            r#"{"items":[{"name":"XSS"},{"name":"SQLi"}],"total":2}"#,
        )]);

        let was = client.web_app_scans();
        let paginator = was.findings_pages("cfg-1", 500).unwrap();
        assert_eq!(paginator.limit(), 200);

        let names: Vec<String> = paginator
            .iter()
            .map(|r| r.unwrap()["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["XSS", "SQLi"]);

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].path, "/was/v2/configs/cfg-1/findings");
        assert_eq!(
            requests[0].query,
            vec![
                ("offset".to_string(), "0".to_string()),
                ("limit".to_string(), "200".to_string())
            ]
        );
    }

    #[test]
    fn bulk_findings_export_uses_the_v1_paths() {
        let (client, transport, _time) = client_with(vec![
            json_response(200, r#"{"export_uuid":"wexp-1"}"#),
            json_response(200, r#"{"status":"FINISHED","chunks_available":[0]}"#),
            json_response(200, r#"{"status":"FINISHED","chunks_available":[0]}"#),
            json_response(200, r#"[{"vuln_id":"v-001"},{"vuln_id":"v-002"}]"#),
        ]);

        let export = client.web_app_scans().findings_export();
        let mut count = 0;
        let job = export
            .export(&json!({"severity": "high"}), |_record| {
                count += 1;
                Ok(())
            })
            .unwrap();

        assert!(job.is_finished());
        assert_eq!(count, 2);
        assert_eq!(
            transport.request_paths(),
            vec![
                "/was/v1/export/vulns",
                "/was/v1/export/vulns/wexp-1/status",
                "/was/v1/export/vulns/wexp-1/status",
                "/was/v1/export/vulns/wexp-1/chunks/0",
            ]
        );
    }

    #[test]
    fn wait_until_complete_polls_through_running_to_completed() {
        let (client, transport, time) = client_with(vec![
            json_response(200, r#"{"scan_id":"s-1","status":"running"}"#),
            json_response(200, r#"{"scan_id":"s-1","status":"completed"}"#),
        ]);

        let value = client
            .web_app_scans()
            .wait_until_complete("cfg-1", "s-1", Duration::from_secs(60), Duration::from_secs(2))
            .unwrap();

        assert_eq!(value["status"], "completed");
        assert_eq!(time.slept(), vec![Duration::from_secs(2)]);
        assert_eq!(
            transport.request_paths(),
            vec![
                "/was/v2/configs/cfg-1/scans/s-1",
                "/was/v2/configs/cfg-1/scans/s-1",
            ]
        );
    }

    #[test]
    fn wait_until_complete_stops_on_every_terminal_status() {
        for status in ["completed", "failed", "cancelled", "error"] {
            let (client, _transport, time) = client_with(vec![json_response(
                200,
                &format!(r#"{{"status":"{status}"}}"#),
            )]);

            let value = client
                .web_app_scans()
                .wait_until_complete("cfg-1", "s-1", Duration::from_secs(60), Duration::from_secs(2))
                .unwrap();

            assert_eq!(value["status"], status, "{status}");
            assert!(time.slept().is_empty(), "{status}");
        }
    }

    #[test]
    fn wait_until_complete_times_out_while_the_scan_runs() {
        let (client, _transport, _time) = client_with(vec![
            json_response(200, r#"{"status":"running"}"#),
            json_response(200, r#"{"status":"running"}"#),
            json_response(200, r#"{"status":"running"}"#),
        ]);

        let err = client
            .web_app_scans()
            .wait_until_complete("cfg-1", "s-1", Duration::from_secs(5), Duration::from_secs(2))
            .unwrap_err();

        assert!(matches!(err, Error::Timeout { .. }));
        assert!(err.to_string().contains("WAS scan s-1"), "{err}");
    }

    #[test]
    fn create_config_and_launch_hit_the_v2_config_endpoints() {
        let (client, transport, _time) = client_with(vec![
            json_response(200, r#"{"config_id":"cfg-1"}"#),
            json_response(200, r#"{"scan_id":"s-1"}"#),
        ]);

        let was = client.web_app_scans();
        was.create_config("My App", "https://example.com").unwrap();
        was.launch("cfg-1").unwrap();

        assert_eq!(
            transport.request_paths(),
            vec!["/was/v2/configs", "/was/v2/configs/cfg-1/scans"]
        );
    }
}
