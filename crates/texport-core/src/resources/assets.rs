//! Bulk asset export endpoints.
//!
//! Same chunked-export protocol as vulnerabilities; only the paths differ
//! (initiate lives under `/assets/v2/`, the rest under `/assets/`).

use serde_json::Value;

use super::validate_path_segment;
use super::vulns::{export_uuid, job_from_value, records_from_value};
use crate::client::Client;
use crate::error::Result;
use crate::export::{ExportDomain, ExportJob, ExportWorkflow, Record, RecordStream};

#[derive(Clone, Copy)]
pub struct AssetExports<'a> {
    client: &'a Client,
}

impl<'a> AssetExports<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn workflow(&self) -> ExportWorkflow<Self> {
        ExportWorkflow::with_time_source(*self, self.client.time())
    }

    /// Starts an export; `body` carries parameters such as `chunk_size`.
    pub fn initiate(&self, body: &Value) -> Result<String> {
        self.workflow().initiate(body)
    }

    pub fn status(&self, export_uuid: &str) -> Result<ExportJob> {
        self.fetch_status(export_uuid)
    }

    pub fn download_chunk(&self, export_uuid: &str, chunk_id: u64) -> Result<Vec<Record>> {
        self.fetch_chunk(export_uuid, chunk_id)
    }

    pub fn cancel(&self, export_uuid: &str) -> Result<Value> {
        validate_path_segment(export_uuid, "export_uuid")?;
        self.client
            .post(&format!("/assets/export/{export_uuid}/cancel"), None)
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

impl ExportDomain for AssetExports<'_> {
    fn describe(&self, job_id: &str) -> String {
        format!("asset export {job_id}")
    }

    fn initiate(&self, body: &Value) -> Result<String> {
        let response = self.client.post("/assets/v2/export", Some(body))?;
        export_uuid(&response)
    }

    fn fetch_status(&self, job_id: &str) -> Result<ExportJob> {
        validate_path_segment(job_id, "export_uuid")?;
        let value = self
            .client
            .get(&format!("/assets/export/{job_id}/status"), &[])?;
        job_from_value(value)
    }

    fn fetch_chunk(&self, job_id: &str, chunk_id: u64) -> Result<Vec<Record>> {
        validate_path_segment(job_id, "export_uuid")?;
        let value = self
            .client
            .get(&format!("/assets/export/{job_id}/chunks/{chunk_id}"), &[])?;
        records_from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::{client_with, json_response};
    use serde_json::json;

    #[test]
    fn initiate_uses_the_v2_path_but_status_does_not() {
        let (client, transport, _time) = client_with(vec![
            json_response(200, r#"{"export_uuid":"as-1"}"#),
            json_response(200, r#"{"status":"QUEUED"}"#),
        ]);

        let assets = client.asset_exports();
        let id = assets.initiate(&json!({"chunk_size": 100})).unwrap();
        assert_eq!(id, "as-1");
        assert!(!assets.status("as-1").unwrap().status.is_terminal());

        assert_eq!(
            transport.request_paths(),
            vec!["/assets/v2/export", "/assets/export/as-1/status"]
        );
    }

    #[test]
    fn records_iterator_walks_chunks_lazily() {
        let (client, transport, _time) = client_with(vec![
            json_response(200, r#"{"status":"FINISHED","chunks_available":[7]}"#),
            json_response(200, r#"[{"hostname":"db01"},{"hostname":"db02"}]"#),
        ]);

        let hosts: Vec<String> = client
            .asset_exports()
            .records("as-1")
            .map(|r| r.unwrap()["hostname"].as_str().unwrap().to_string())
            .collect();

        assert_eq!(hosts, vec!["db01", "db02"]);
        assert_eq!(
            transport.request_paths(),
            vec!["/assets/export/as-1/status", "/assets/export/as-1/chunks/7"]
        );
    }
}
