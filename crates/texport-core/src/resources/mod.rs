//! API resources: thin endpoint surfaces over the client, with the export
//! domains wired into the shared workflow.

mod assets;
mod scans;
mod vulns;
mod was;
mod workbenches;

pub use assets::AssetExports;
pub use scans::Scans;
pub use vulns::VulnExports;
pub use was::{WasFindingsExport, WebAppScans};
pub use workbenches::Workbenches;

use crate::error::{Error, Result};

/// Rejects values that would break out of their URL path segment. Checked
/// before any request is made.
pub(crate) fn validate_path_segment(value: &str, name: &str) -> Result<()> {
    let clean = !value.is_empty()
        && !value
            .chars()
            .any(|c| c == '/' || c == '?' || c == '#' || c.is_whitespace());
    if clean {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{name} is not a valid path segment: {value:?}"
        )))
    }
}
