//! Domain-generic export orchestration.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::job::{ExportJob, ExportStatus};
use crate::error::{Error, Result};
use crate::poll::poll_until;
use crate::time::{MonotonicClock, TimeSource};

/// A single record from an export chunk. Field mapping into typed models
/// is deliberately left to consumers.
pub type Record = Value;

/// The three endpoint operations an export domain must supply. Everything
/// else (polling, chunk iteration, streaming) is shared.
pub trait ExportDomain {
    /// Human-readable name for one job, used in timeout and failure
    /// messages ("vulnerability export 1234", ...).
    fn describe(&self, job_id: &str) -> String;

    /// Starts a new export job and returns its identifier.
    fn initiate(&self, body: &Value) -> Result<String>;

    /// Fetches a fresh status snapshot.
    fn fetch_status(&self, job_id: &str) -> Result<ExportJob>;

    /// Downloads one chunk's records.
    fn fetch_chunk(&self, job_id: &str, chunk_id: u64) -> Result<Vec<Record>>;
}

/// Drives the lifecycle of export jobs for one domain.
///
/// Stateless across calls: each method works from fresh status fetches, so
/// one workflow may serve concurrent jobs.
pub struct ExportWorkflow<D> {
    domain: D,
    time: Arc<dyn TimeSource>,
}

impl<D: ExportDomain> ExportWorkflow<D> {
    pub fn new(domain: D) -> Self {
        Self::with_time_source(domain, Arc::new(MonotonicClock))
    }

    pub fn with_time_source(domain: D, time: Arc<dyn TimeSource>) -> Self {
        Self { domain, time }
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    /// Starts a new export job.
    pub fn initiate(&self, body: &Value) -> Result<String> {
        let job_id = self.domain.initiate(body)?;
        tracing::debug!(job = %self.domain.describe(&job_id), "export initiated");
        Ok(job_id)
    }

    /// Polls the status endpoint until the job reaches a terminal state.
    ///
    /// FINISHED and CANCELLED both return the snapshot, so a cancelled job
    /// never spins out the full timeout; callers that care distinguish them
    /// via [`ExportJob::status`]. ERROR short-circuits immediately with an
    /// API error naming the job, without consuming the remaining budget.
    pub fn wait_for_completion(
        &self,
        job_id: &str,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<ExportJob> {
        let label = self.domain.describe(job_id);
        poll_until(&*self.time, timeout, poll_interval, &label, || {
            let job = self.domain.fetch_status(job_id)?;
            match job.status {
                ExportStatus::Error => Err(Error::api(format!("{label} failed"))),
                ExportStatus::Finished | ExportStatus::Cancelled => Ok(Some(job)),
                ExportStatus::Queued | ExportStatus::Processing => Ok(None),
            }
        })
    }

    /// Streams every record of every available chunk to `consumer`, in the
    /// order the server listed the chunks. At most one chunk's records are
    /// in memory at a time. Any error (fetch or consumer) aborts the whole
    /// call; a partially consumed iteration cannot be resumed.
    ///
    /// Returns the status snapshot the iteration was based on, which also
    /// carries `chunks_failed` / `chunks_cancelled` for the caller.
    pub fn stream<F>(&self, job_id: &str, mut consumer: F) -> Result<ExportJob>
    where
        F: FnMut(Record) -> Result<()>,
    {
        let job = self.domain.fetch_status(job_id)?;
        for &chunk_id in &job.chunks_available {
            let records = self.domain.fetch_chunk(job_id, chunk_id)?;
            tracing::debug!(
                job = %self.domain.describe(job_id),
                chunk_id,
                records = records.len(),
                "streaming chunk"
            );
            for record in records {
                consumer(record)?;
            }
        }
        Ok(job)
    }

    /// Returns a lazy, restartable record stream. Each call starts an
    /// independent traversal that re-fetches the status snapshot on first
    /// demand and re-walks the chunk list from the start; nothing is
    /// cached across traversals.
    pub fn records(&self, job_id: &str) -> RecordStream<D>
    where
        D: Clone,
    {
        RecordStream {
            domain: self.domain.clone(),
            job_id: job_id.to_string(),
            chunks: None,
            current: Vec::new().into_iter(),
            failed: false,
        }
    }

    /// Full lifecycle in one call: initiate, wait, stream.
    pub fn export<F>(
        &self,
        body: &Value,
        timeout: Duration,
        poll_interval: Duration,
        consumer: F,
    ) -> Result<ExportJob>
    where
        F: FnMut(Record) -> Result<()>,
    {
        let job_id = self.initiate(body)?;
        self.wait_for_completion(&job_id, timeout, poll_interval)?;
        self.stream(&job_id, consumer)
    }
}

/// One lazy traversal over an export's chunks.
///
/// The status snapshot is fetched on the first `next` call; chunks are
/// downloaded one at a time as their records are demanded. After an error
/// the stream is fused.
pub struct RecordStream<D> {
    domain: D,
    job_id: String,
    chunks: Option<std::vec::IntoIter<u64>>,
    current: std::vec::IntoIter<Record>,
    failed: bool,
}

impl<D: ExportDomain> Iterator for RecordStream<D> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.chunks.is_none() {
            match self.domain.fetch_status(&self.job_id) {
                Ok(job) => self.chunks = Some(job.chunks_available.into_iter()),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
        loop {
            if let Some(record) = self.current.next() {
                return Some(Ok(record));
            }
            let chunk_id = match self.chunks.as_mut().and_then(Iterator::next) {
                Some(id) => id,
                None => return None,
            };
            match self.domain.fetch_chunk(&self.job_id, chunk_id) {
                Ok(records) => self.current = records.into_iter(),
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
