use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Severity of a disclosure, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

impl Severity {
    /// Lowest rung of the scale
    pub const LOWEST: Severity = Severity::Info;

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "HIGH" => Some(Severity::High),
            "MEDIUM" => Some(Severity::Medium),
            "LOW" => Some(Severity::Low),
            "INFO" | "INFORMATION" => Some(Severity::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
            Severity::Info => "INFO",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confidence of a disclosure, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    Tentative,
    Firm,
    Certain,
}

impl Confidence {
    /// Lowest rung of the scale
    pub const LOWEST: Confidence = Confidence::Tentative;

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CERTAIN" => Some(Confidence::Certain),
            "FIRM" => Some(Confidence::Firm),
            "TENTATIVE" => Some(Confidence::Tentative),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Tentative => "TENTATIVE",
            Confidence::Firm => "FIRM",
            Confidence::Certain => "CERTAIN",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Byte range to highlight in the raw response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
}

/// One consolidated finding: every match of a response that revealed
/// at least one version string not yet reported for its host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Deterministic ID (hash-based) e.g. "VSC-a1b2c3d4"
    pub id: String,

    /// Host the response was retrieved from
    pub host: String,

    /// Capture the response came from (file, and line for .jsonl captures)
    pub source: Option<String>,

    /// Overall severity (highest of the matches)
    pub severity: Severity,

    /// Overall confidence (highest of the matches)
    pub confidence: Confidence,

    /// Short title
    pub title: String,

    /// Rendered explanation plus one bullet per match
    pub detail: String,

    /// Highlight ranges, one per match, in ranked order
    pub highlights: Vec<Highlight>,

    /// Full matched text of each match, in ranked order
    pub evidence: Vec<String>,
}

impl Finding {
    /// Generate a deterministic ID based on the host and the matched strings
    pub fn generate_id<'a>(host: &str, evidence: impl IntoIterator<Item = &'a [u8]>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(host.as_bytes());
        for raw in evidence {
            hasher.update([0u8]);
            hasher.update(raw);
        }
        let result = hasher.finalize();
        let hex = format!("{:x}", result);
        format!("VSC-{}", &hex[..8])
    }
}

/// The complete scan report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// verscout version
    pub version: String,

    /// When the scan was performed
    pub timestamp: String,

    /// Root path that was scanned
    pub scan_path: PathBuf,

    /// Responses run through the rules
    pub responses_scanned: usize,

    /// Capture files or lines that could not be read
    pub responses_skipped: usize,

    /// Raw rule matches before consolidation
    pub raw_matches: usize,

    /// Distinct hosts among the scanned responses, with or without findings
    pub hosts: usize,

    /// Duration in milliseconds
    pub duration_ms: u64,

    /// All findings, sorted by severity (high first)
    pub findings: Vec<Finding>,

    /// Summary counts
    pub summary: ScanSummary,
}

impl ScanReport {
    /// Check if there are findings at or above a severity threshold
    pub fn has_findings_at_or_above(&self, threshold: Severity) -> bool {
        self.findings.iter().any(|f| f.severity >= threshold)
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl ScanSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = ScanSummary {
            total: findings.len(),
            ..ScanSummary::default()
        };
        for f in findings {
            match f.severity {
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn finding(host: &str, severity: Severity, source: &str) -> Finding {
        Finding {
            id: Finding::generate_id(host, [source.as_bytes()]),
            host: host.to_string(),
            source: Some(source.to_string()),
            severity,
            confidence: Confidence::Firm,
            title: "t".to_string(),
            detail: String::new(),
            highlights: vec![Highlight { start: 0, end: 1 }],
            evidence: vec![source.to_string()],
        }
    }

    #[test]
    fn test_scales_are_ordered() {
        assert!(Severity::Info < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Confidence::Tentative < Confidence::Firm);
        assert!(Confidence::Firm < Confidence::Certain);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(Severity::parse("information"), Some(Severity::Info));
        assert_eq!(Severity::parse(" high "), Some(Severity::High));
        assert_eq!(Severity::parse("critical"), None);
        assert_eq!(Confidence::parse("firm"), Some(Confidence::Firm));
        assert_eq!(Confidence::parse("sure"), None);
    }

    #[test]
    fn test_generate_id_is_deterministic() {
        let a = Finding::generate_id("example.com", [b"Apache/2.2.4".as_slice(), b"PHP/5.6".as_slice()]);
        let b = Finding::generate_id("example.com", [b"Apache/2.2.4".as_slice(), b"PHP/5.6".as_slice()]);
        let c = Finding::generate_id("example.org", [b"Apache/2.2.4".as_slice(), b"PHP/5.6".as_slice()]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("VSC-"));
        assert_eq!(a.len(), 12);
    }

    #[test]
    fn test_summary_counts() {
        let findings = vec![
            finding("a", Severity::High, "1"),
            finding("a", Severity::Info, "2"),
            finding("b", Severity::Info, "3"),
        ];
        let summary = ScanSummary::from_findings(&findings);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.high, 1);
        assert_eq!(summary.info, 2);
        assert_eq!(summary.low, 0);
    }
}
