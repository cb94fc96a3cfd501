//! API client: configured transport plus JSON request helpers.

use std::sync::Arc;

use serde_json::Value;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::resources::{AssetExports, Scans, VulnExports, WebAppScans, Workbenches};
use crate::retry::{RetryPolicy, RetryingTransport};
use crate::time::{MonotonicClock, TimeSource};
use crate::transport::{CurlTransport, Method, Request, Response, Transport};

/// Entry point for the API.
///
/// Owns the retrying transport and the credentials; resources borrow the
/// client and hold no state of their own, so independent workflows can run
/// concurrently against one client.
pub struct Client {
    config: Config,
    transport: Box<dyn Transport>,
    time: Arc<dyn TimeSource>,
}

impl Client {
    /// Builds a client over the blocking curl transport wrapped in the
    /// configured retry policy.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let time: Arc<dyn TimeSource> = Arc::new(MonotonicClock);
        let transport = RetryingTransport::new(
            CurlTransport::new(
                config.base_url.clone(),
                config.open_timeout,
                config.timeout,
            ),
            RetryPolicy::new(config.max_retries),
            time.clone(),
        );
        Ok(Self {
            config,
            transport: Box::new(transport),
            time,
        })
    }

    /// Client over an arbitrary transport and time source. Unit tests use
    /// this with scripted doubles.
    pub(crate) fn with_parts(
        config: Config,
        transport: Box<dyn Transport>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            transport,
            time,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn time(&self) -> Arc<dyn TimeSource> {
        self.time.clone()
    }

    // Resource accessors.

    pub fn vuln_exports(&self) -> VulnExports<'_> {
        VulnExports::new(self)
    }

    pub fn asset_exports(&self) -> AssetExports<'_> {
        AssetExports::new(self)
    }

    pub fn scans(&self) -> Scans<'_> {
        Scans::new(self)
    }

    pub fn web_app_scans(&self) -> WebAppScans<'_> {
        WebAppScans::new(self)
    }

    pub fn workbenches(&self) -> Workbenches<'_> {
        Workbenches::new(self)
    }

    // JSON helpers. 2xx parses the body; 401 maps to Authentication, 429 to
    // RateLimit, anything else non-2xx to Api. Transient statuses normally
    // never reach this layer; the retry transport absorbs them.

    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let response = self.perform(Method::Get, path, query, None)?;
        parse_json(&self.interpret(response)?.body)
    }

    /// GET returning the raw body, for binary artifacts (PDF, archives).
    pub fn get_raw(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let response = self.perform(Method::Get, path, query, None)?;
        Ok(self.interpret(response)?.body)
    }

    pub fn post(&self, path: &str, body: Option<&Value>) -> Result<Value> {
        let response = self.perform(Method::Post, path, &[], body)?;
        parse_json(&self.interpret(response)?.body)
    }

    pub fn put(&self, path: &str, body: Option<&Value>) -> Result<Value> {
        let response = self.perform(Method::Put, path, &[], body)?;
        parse_json(&self.interpret(response)?.body)
    }

    fn perform(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Response> {
        let mut request = Request::new(method, path)
            .header(
                "X-ApiKeys",
                &format!(
                    "accessKey={};secretKey={};",
                    self.config.access_key, self.config.secret_key
                ),
            )
            .header("Accept", "application/json");
        for (name, value) in query {
            request = request.query(name, value);
        }
        if let Some(body) = body {
            request = request
                .header("Content-Type", "application/json")
                .body(serde_json::to_vec(body).map_err(|e| Error::Parse(e.to_string()))?);
        }

        // Headers are never logged; the API key header stays out of traces.
        tracing::debug!(method = method.as_str(), path, "api request");
        let response = self.transport.execute(&request)?;
        tracing::debug!(method = method.as_str(), path, status = response.status, "api response");
        Ok(response)
    }

    fn interpret(&self, response: Response) -> Result<Response> {
        match response.status {
            200..=299 => Ok(response),
            401 => Err(Error::Authentication),
            429 => Err(Error::RateLimit {
                status: 429,
                body: String::from_utf8_lossy(&response.body).into_owned(),
                attempts: 1,
            }),
            status => Err(Error::api_status(status, &response.body)),
        }
    }
}

/// Empty bodies read as JSON null (some endpoints return 200 with nothing).
fn parse_json(body: &[u8]) -> Result<Value> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|_| Error::parse_body("invalid JSON", body))
}
