//! Bulk vulnerability export endpoints.

use serde_json::Value;

use super::validate_path_segment;
use crate::client::Client;
use crate::error::{Error, Result};
use crate::export::{ExportDomain, ExportJob, ExportWorkflow, Record, RecordStream};

/// `/vulns/export` family. Chunked-export domain for vulnerability data.
#[derive(Clone, Copy)]
pub struct VulnExports<'a> {
    client: &'a Client,
}

impl<'a> VulnExports<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    fn workflow(&self) -> ExportWorkflow<Self> {
        ExportWorkflow::with_time_source(*self, self.client.time())
    }

    /// Starts an export; `body` carries request parameters such as
    /// `num_assets` and `filters`.
    pub fn initiate(&self, body: &Value) -> Result<String> {
        self.workflow().initiate(body)
    }

    /// Fresh status snapshot for a job.
    pub fn status(&self, export_uuid: &str) -> Result<ExportJob> {
        self.fetch_status(export_uuid)
    }

    /// Records of a single chunk.
    pub fn download_chunk(&self, export_uuid: &str, chunk_id: u64) -> Result<Vec<Record>> {
        self.fetch_chunk(export_uuid, chunk_id)
    }

    /// Requests cancellation of an in-progress export.
    pub fn cancel(&self, export_uuid: &str) -> Result<Value> {
        validate_path_segment(export_uuid, "export_uuid")?;
        self.client
            .post(&format!("/vulns/export/{export_uuid}/cancel"), None)
    }

    /// Polls until FINISHED (or CANCELLED); ERROR raises immediately.
    /// Timeout and interval come from the client configuration.
    pub fn wait_for_completion(&self, export_uuid: &str) -> Result<ExportJob> {
        let config = self.client.config();
        self.workflow()
            .wait_for_completion(export_uuid, config.export_timeout, config.poll_interval)
    }

    /// Streams all records to `consumer`, one chunk in memory at a time.
    pub fn stream<F>(&self, export_uuid: &str, consumer: F) -> Result<ExportJob>
    where
        F: FnMut(Record) -> Result<()>,
    {
        self.workflow().stream(export_uuid, consumer)
    }

    /// Lazy, restartable record iterator over a completed export.
    pub fn records(&self, export_uuid: &str) -> RecordStream<Self> {
        self.workflow().records(export_uuid)
    }

    /// Initiate, wait, stream: the whole lifecycle in one call.
    pub fn export<F>(&self, body: &Value, consumer: F) -> Result<ExportJob>
    where
        F: FnMut(Record) -> Result<()>,
    {
        let config = self.client.config();
        self.workflow()
            .export(body, config.export_timeout, config.poll_interval, consumer)
    }
}

impl ExportDomain for VulnExports<'_> {
    fn describe(&self, job_id: &str) -> String {
        format!("vulnerability export {job_id}")
    }

    fn initiate(&self, body: &Value) -> Result<String> {
        let response = self.client.post("/vulns/export", Some(body))?;
        export_uuid(&response)
    }

    fn fetch_status(&self, job_id: &str) -> Result<ExportJob> {
        validate_path_segment(job_id, "export_uuid")?;
        let value = self.client.get(&format!("/vulns/export/{job_id}/status"), &[])?;
        job_from_value(value)
    }

    fn fetch_chunk(&self, job_id: &str, chunk_id: u64) -> Result<Vec<Record>> {
        validate_path_segment(job_id, "export_uuid")?;
        let value = self
            .client
            .get(&format!("/vulns/export/{job_id}/chunks/{chunk_id}"), &[])?;
        records_from_value(value)
    }
}

/// Pulls the job identifier out of an initiate response.
pub(crate) fn export_uuid(response: &Value) -> Result<String> {
    response
        .get("export_uuid")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::Parse("initiate response is missing export_uuid".into()))
}

pub(crate) fn job_from_value(value: Value) -> Result<ExportJob> {
    serde_json::from_value(value).map_err(|e| Error::Parse(format!("bad export status: {e}")))
}

pub(crate) fn records_from_value(value: Value) -> Result<Vec<Record>> {
    serde_json::from_value(value).map_err(|e| Error::Parse(format!("bad chunk payload: {e}")))
}
