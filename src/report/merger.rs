use crate::report::finding::{Finding, Severity};

/// Drop findings below `min_severity`, then sort them
pub fn merge_findings(mut findings: Vec<Finding>, min_severity: Option<Severity>) -> Vec<Finding> {
    if let Some(min) = min_severity {
        findings.retain(|f| f.severity >= min);
    }

    // Sort by severity (high first), then by host, then by source
    findings.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.host.cmp(&b.host))
            .then_with(|| a.source.cmp(&b.source))
    });

    findings
}
