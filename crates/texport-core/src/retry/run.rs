//! Retrying wrapper around a [`Transport`].

use std::sync::Arc;

use super::policy::{RetryDecision, RetryPolicy};
use crate::error::{Error, Result};
use crate::time::TimeSource;
use crate::transport::{Request, Response, Transport};

/// Drives the retry policy over an inner transport.
///
/// Holds no mutable state between calls; the attempt counter lives on the
/// stack of each `execute`, so one instance may serve concurrent callers.
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
    time: Arc<dyn TimeSource>,
}

impl<T: Transport> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy, time: Arc<dyn TimeSource>) -> Self {
        Self {
            inner,
            policy,
            time,
        }
    }
}

impl<T: Transport> Transport for RetryingTransport<T> {
    fn execute(&self, request: &Request) -> Result<Response> {
        let mut attempt = 1u32;
        loop {
            match self.inner.execute(request) {
                Ok(response) => match self.policy.decide(attempt, &response) {
                    RetryDecision::Return => return Ok(response),
                    RetryDecision::Exhausted => {
                        tracing::warn!(
                            status = response.status,
                            attempts = attempt,
                            path = %request.path,
                            "retries exhausted"
                        );
                        return Err(exhausted(&response, attempt));
                    }
                    RetryDecision::RetryAfter(delay) => {
                        tracing::debug!(
                            status = response.status,
                            attempt,
                            delay_secs = delay.as_secs(),
                            path = %request.path,
                            "retryable response, backing off"
                        );
                        self.time.sleep(delay);
                        attempt += 1;
                    }
                },
                Err(Error::Connection(cause)) => {
                    match self.policy.backoff_for_failure(attempt) {
                        None => return Err(Error::Connection(cause)),
                        Some(delay) => {
                            tracing::debug!(
                                error = %cause,
                                attempt,
                                delay_secs = delay.as_secs(),
                                path = %request.path,
                                "transport failure, backing off"
                            );
                            self.time.sleep(delay);
                            attempt += 1;
                        }
                    }
                }
                // Non-transport errors (path resolution etc.) are terminal.
                Err(other) => return Err(other),
            }
        }
    }
}

fn exhausted(response: &Response, attempts: u32) -> Error {
    let body = String::from_utf8_lossy(&response.body).into_owned();
    if response.status == 429 {
        return Error::RateLimit {
            status: response.status,
            body,
            attempts,
        };
    }
    Error::Api {
        status: Some(response.status),
        message: format!(
            "request failed after {attempts} attempts (HTTP {}): {body}",
            response.status
        ),
        body: Some(body),
    }
}
