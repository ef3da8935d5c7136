use anyhow::Result;

use crate::report::finding::ScanReport;

/// Render a scan report as pretty-printed JSON
pub fn render(report: &ScanReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
