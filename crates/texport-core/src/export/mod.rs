//! Asynchronous chunked export lifecycle.
//!
//! One shared workflow (initiate, await completion, stream chunks) driven
//! through the [`ExportDomain`] trait; each export domain (vulnerabilities,
//! assets, WAS findings) supplies only its three endpoint operations.

mod job;
mod workflow;

pub use job::{ExportJob, ExportStatus};
pub use workflow::{ExportDomain, ExportWorkflow, Record, RecordStream};
