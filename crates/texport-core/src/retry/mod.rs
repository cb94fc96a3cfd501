//! Retry and backoff policy for the HTTP transport.
//!
//! Transient failures (429, 5xx, transport errors) are absorbed here up to
//! a bounded attempt count; everything else passes straight through to the
//! caller for classification.

mod policy;
mod run;

pub use policy::{RetryDecision, RetryPolicy, RETRYABLE_STATUS_CODES};
pub use run::RetryingTransport;
