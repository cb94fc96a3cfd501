//! Error taxonomy for the TEXPORT client.
//!
//! Transient conditions (429, 5xx, connection failures) are absorbed by the
//! retry layer; everything surfaced here is terminal for the call that
//! raised it.

use std::time::Duration;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP 401. Never retried.
    #[error("authentication failed; verify your access key and secret key")]
    Authentication,

    /// HTTP 429 after the retry budget is spent.
    #[error("rate limit exceeded after {attempts} attempts (HTTP {status}): {body}")]
    RateLimit {
        status: u32,
        body: String,
        attempts: u32,
    },

    /// Terminal non-2xx response, or a job that reported ERROR status.
    #[error("{message}")]
    Api {
        status: Option<u32>,
        body: Option<String>,
        message: String,
    },

    /// A bounded wait expired before the probed operation completed.
    #[error("{label} timed out after {}s", .timeout.as_secs())]
    Timeout { label: String, timeout: Duration },

    /// Transport-level failure (connect, DNS, reset) with retries exhausted.
    #[error("connection failed: {0}")]
    Connection(#[from] curl::Error),

    /// Response body could not be parsed. Surfaced immediately, never retried.
    #[error("failed to parse API response: {0}")]
    Parse(String),

    /// Invalid configuration or request parameters, detected before any
    /// request is made.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Local file persistence failed (e.g. save_path unwritable).
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Terminal API error from a raw response.
    pub(crate) fn api_status(status: u32, body: &[u8]) -> Self {
        let body = String::from_utf8_lossy(body).into_owned();
        let message = if body.is_empty() {
            format!("API request failed with status {status}")
        } else {
            format!("API request failed with status {status}: {body}")
        };
        Error::Api {
            status: Some(status),
            body: Some(body),
            message,
        }
    }

    /// Terminal API error with a custom message and no HTTP context
    /// (e.g. an export job that reported ERROR).
    pub(crate) fn api(message: impl Into<String>) -> Self {
        Error::Api {
            status: None,
            body: None,
            message: message.into(),
        }
    }

    /// Parse failure carrying a bounded prefix of the offending body.
    pub(crate) fn parse_body(context: &str, body: &[u8]) -> Self {
        let prefix: String = String::from_utf8_lossy(body).chars().take(120).collect();
        Error::Parse(format!("{context}: {prefix}"))
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u32> {
        match self {
            Error::RateLimit { status, .. } => Some(*status),
            Error::Api { status, .. } => *status,
            Error::Authentication => Some(401),
            _ => None,
        }
    }
}
