//! Vulnerability workbench endpoints.
//!
//! Read-only aggregated views over scan results; all endpoints are plain
//! GETs with optional filter parameters (`date_range`, severity filters).

use serde_json::Value;

use super::validate_path_segment;
use crate::client::Client;
use crate::error::Result;

#[derive(Clone, Copy)]
pub struct Workbenches<'a> {
    client: &'a Client,
}

impl<'a> Workbenches<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Lists vulnerabilities from the workbench.
    pub fn vulnerabilities(&self, params: &[(&str, &str)]) -> Result<Value> {
        self.client.get("/workbenches/vulnerabilities", params)
    }

    /// Detailed information for one vulnerability plugin.
    pub fn vulnerability_info(&self, plugin_id: u64, params: &[(&str, &str)]) -> Result<Value> {
        self.client.get(
            &format!("/workbenches/vulnerabilities/{plugin_id}/info"),
            params,
        )
    }

    /// Plugin outputs for one vulnerability.
    pub fn vulnerability_outputs(&self, plugin_id: u64, params: &[(&str, &str)]) -> Result<Value> {
        self.client.get(
            &format!("/workbenches/vulnerabilities/{plugin_id}/outputs"),
            params,
        )
    }

    /// Lists assets from the workbench.
    pub fn assets(&self, params: &[(&str, &str)]) -> Result<Value> {
        self.client.get("/workbenches/assets", params)
    }

    /// Detailed information for one asset.
    pub fn asset_info(&self, asset_id: &str, params: &[(&str, &str)]) -> Result<Value> {
        validate_path_segment(asset_id, "asset_id")?;
        self.client
            .get(&format!("/workbenches/assets/{asset_id}/info"), params)
    }

    /// Vulnerabilities observed on one asset.
    pub fn asset_vulnerabilities(&self, asset_id: &str, params: &[(&str, &str)]) -> Result<Value> {
        validate_path_segment(asset_id, "asset_id")?;
        self.client.get(
            &format!("/workbenches/assets/{asset_id}/vulnerabilities"),
            params,
        )
    }
}
