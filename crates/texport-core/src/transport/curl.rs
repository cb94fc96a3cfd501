//! Blocking curl transport.
//!
//! One `curl::easy::Easy` handle per request: headers are captured with a
//! header callback, the body with a write callback, and transport-level
//! failures surface as `Error::Connection` so the retry layer can treat
//! them like retryable statuses.

use ::curl::easy::{Easy, List};
use std::str;
use std::time::Duration;
use url::Url;

use super::{Method, Request, Response, Transport};
use crate::error::{Error, Result};

/// Production transport backed by libcurl.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    base_url: Url,
    connect_timeout: Duration,
    timeout: Duration,
}

impl CurlTransport {
    pub fn new(base_url: Url, connect_timeout: Duration, timeout: Duration) -> Self {
        Self {
            base_url,
            connect_timeout,
            timeout,
        }
    }

    fn resolve(&self, request: &Request) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&request.path)
            .map_err(|e| Error::Config(format!("invalid request path {:?}: {e}", request.path)))?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &request.query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}

impl Transport for CurlTransport {
    fn execute(&self, request: &Request) -> Result<Response> {
        let url = self.resolve(request)?;

        let mut easy = Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        match request.method {
            Method::Get => {}
            Method::Post => easy.post(true)?,
            Method::Put => easy.custom_request("PUT")?,
        }
        if let Some(body) = &request.body {
            easy.post_fields_copy(body)?;
        } else if request.method == Method::Post {
            easy.post_fields_copy(b"")?;
        }

        if !request.headers.is_empty() {
            let mut list = List::new();
            for (name, value) in &request.headers {
                list.append(&format!("{}: {}", name.trim(), value.trim()))?;
            }
            easy.http_headers(list)?;
        }

        let mut headers: Vec<(String, String)> = Vec::new();
        let mut body: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(line) = str::from_utf8(data) {
                    let line = line.trim_end();
                    // A new status line means a redirect was followed; only
                    // the final response's headers are kept.
                    if line.starts_with("HTTP/") {
                        headers.clear();
                    } else if let Some((name, value)) = line.split_once(':') {
                        headers.push((name.trim().to_string(), value.trim().to_string()));
                    }
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
