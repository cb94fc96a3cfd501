//! Export job status snapshot.

use serde::{Deserialize, Serialize};

/// Lifecycle status as reported by the server. The client never infers a
/// transition locally; every observation comes from a fresh status fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportStatus {
    Queued,
    Processing,
    Finished,
    Error,
    Cancelled,
}

impl ExportStatus {
    /// True for states with no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExportStatus::Finished | ExportStatus::Error | ExportStatus::Cancelled
        )
    }
}

/// One status snapshot of an export job.
///
/// Chunk ids keep the server's order. `chunks_failed` and
/// `chunks_cancelled` are surfaced as-is and never redriven; redrive
/// policy belongs to the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportJob {
    #[serde(default)]
    pub uuid: Option<String>,
    pub status: ExportStatus,
    #[serde(default)]
    pub chunks_available: Vec<u64>,
    #[serde(default)]
    pub chunks_failed: Vec<u64>,
    #[serde(default)]
    pub chunks_cancelled: Vec<u64>,
}

impl ExportJob {
    pub fn is_finished(&self) -> bool {
        self.status == ExportStatus::Finished
    }

    pub fn is_error(&self) -> bool {
        self.status == ExportStatus::Error
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == ExportStatus::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_a_full_status_payload() {
        let job: ExportJob = serde_json::from_value(json!({
            "uuid": "abc-123",
            "status": "FINISHED",
            "chunks_available": [2, 0, 1],
            "chunks_failed": [3],
            "chunks_cancelled": []
        }))
        .unwrap();

        assert!(job.is_finished());
        assert_eq!(job.uuid.as_deref(), Some("abc-123"));
        // Server order is preserved, not sorted.
        assert_eq!(job.chunks_available, vec![2, 0, 1]);
        assert_eq!(job.chunks_failed, vec![3]);
    }

    #[test]
    fn missing_chunk_arrays_default_to_empty() {
        let job: ExportJob = serde_json::from_value(json!({ "status": "QUEUED" })).unwrap();
        assert!(job.chunks_available.is_empty());
        assert!(!job.status.is_terminal());
    }

    #[test]
    fn unknown_status_is_a_deserialization_error() {
        let result = serde_json::from_value::<ExportJob>(json!({ "status": "EXPLODED" }));
        assert!(result.is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(ExportStatus::Finished.is_terminal());
        assert!(ExportStatus::Error.is_terminal());
        assert!(ExportStatus::Cancelled.is_terminal());
        assert!(!ExportStatus::Queued.is_terminal());
        assert!(!ExportStatus::Processing.is_terminal());
    }
}
