pub mod capture;
pub mod file_walker;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Result};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::cli::ScanArgs;
use crate::config::VerscoutConfig;
use crate::consolidate::{ConsolidationEngine, Match};
use crate::matcher::MatchScanner;
use crate::report::finding::{Finding, ScanReport, ScanSummary, Severity};
use crate::report::merger;
use crate::rules;
use capture::CapturedResponse;

/// The scan pipeline. Discovers captures, runs the rules over every
/// response and consolidates the hits per host.
pub struct Scanner {
    /// Capture file or directory to scan
    scan_path: PathBuf,
    matcher: MatchScanner,
    engine: ConsolidationEngine,
    /// Maximum capture file size (bytes)
    max_file_size: u64,
    /// Include patterns
    include: Vec<String>,
    /// Exclude patterns
    exclude: Vec<String>,
    /// Findings below this are left out of the report
    min_severity: Option<Severity>,
    /// Output format from CLI or config
    format: String,
}

/// What consolidation produced for a set of responses
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub findings: Vec<Finding>,
    pub raw_matches: usize,
    /// Distinct hosts among the responses, with or without hits
    pub hosts: usize,
    /// Responses whose matches the engine rejected
    pub rejected: usize,
}

impl Scanner {
    pub fn new(args: &ScanArgs) -> Result<Self> {
        let scan_path = std::fs::canonicalize(&args.path)?;

        let config = VerscoutConfig::resolve(&scan_path, args.no_config);
        let rules = rules::configured_rules(&args.rules, &args.disable_rule, &config.rules)?;

        // Merge patterns from config and CLI
        let mut exclude = args.exclude.clone();
        exclude.extend(config.scan.exclude.clone());
        let mut include = args.include.clone();
        include.extend(config.scan.include.clone());

        let min_severity = match args.min_severity.as_ref().or(config.output.min_severity.as_ref()) {
            Some(name) => Some(
                Severity::parse(name).ok_or_else(|| anyhow!("unknown severity '{}'", name))?,
            ),
            None => None,
        };

        Ok(Scanner {
            scan_path,
            matcher: MatchScanner::new(rules),
            engine: ConsolidationEngine::default(),
            max_file_size: args.max_file_size.unwrap_or(config.scan.max_file_size),
            include,
            exclude,
            min_severity,
            format: args.format.clone().unwrap_or(config.output.format),
        })
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Run the full scan pipeline
    pub fn run(&self) -> Result<ScanReport> {
        let start = Instant::now();
        let root = capture_root(&self.scan_path);

        // Step 1: Discover capture files
        info!("Discovering captures in {}", self.scan_path.display());
        let paths = file_walker::walk_captures(
            &self.scan_path,
            &self.include,
            &self.exclude,
            self.max_file_size,
        )?;
        info!("Found {} capture files", paths.len());

        // Step 2: Read captures (parallel, order preserved)
        let read: Vec<_> = paths
            .par_iter()
            .map(|path| match capture::read_capture(&root, path) {
                Ok(r) => r,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    (Vec::new(), 1)
                }
            })
            .collect();

        let responses_skipped: usize = read.iter().map(|(_, skipped)| skipped).sum();
        let responses: Vec<CapturedResponse> =
            read.into_iter().flat_map(|(responses, _)| responses).collect();
        let responses_scanned = responses.len();
        info!("Read {} responses ({} skipped)", responses_scanned, responses_skipped);

        // Steps 3-4: Match and consolidate
        let outcome = scan_responses(&self.matcher, &self.engine, responses);
        info!(
            "Raw matches: {}, findings: {}",
            outcome.raw_matches,
            outcome.findings.len()
        );

        // Step 5: Filter and sort
        let findings = merger::merge_findings(outcome.findings, self.min_severity);

        let duration = start.elapsed();
        let summary = ScanSummary::from_findings(&findings);

        Ok(ScanReport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            scan_path: self.scan_path.clone(),
            responses_scanned,
            responses_skipped: responses_skipped + outcome.rejected,
            raw_matches: outcome.raw_matches,
            hosts: outcome.hosts,
            duration_ms: duration.as_millis() as u64,
            findings,
            summary,
        })
    }
}

/// Paths of captures are taken relative to this. A single raw capture keeps
/// its parent directory, which names its host.
fn capture_root(scan_path: &Path) -> PathBuf {
    if !scan_path.is_file() {
        return scan_path.to_path_buf();
    }
    let parent = scan_path.parent();
    parent
        .and_then(Path::parent)
        .or(parent)
        .map(PathBuf::from)
        .unwrap_or_default()
}

/// Match every response, then consolidate host by host.
///
/// Hosts are consolidated in parallel; the responses of one host go through
/// the engine in the order given, so the same input always yields the same
/// findings.
pub fn scan_responses(
    matcher: &MatchScanner,
    engine: &ConsolidationEngine,
    responses: Vec<CapturedResponse>,
) -> ScanOutcome {
    let matched: Vec<(CapturedResponse, Vec<Match>)> = responses
        .into_par_iter()
        .map(|response| {
            let matches = matcher.scan(&response.content);
            (response, matches)
        })
        .collect();

    let raw_matches: usize = matched.iter().map(|(_, m)| m.len()).sum();

    let mut by_host: BTreeMap<String, Vec<(CapturedResponse, Vec<Match>)>> = BTreeMap::new();
    for (response, matches) in matched {
        by_host
            .entry(response.host.clone())
            .or_default()
            .push((response, matches));
    }
    let hosts = by_host.len();
    debug!("Consolidating {} hosts", hosts);

    let per_host: Vec<(Vec<Finding>, usize)> = by_host
        .into_par_iter()
        .map(|(host, batches)| {
            let mut findings = Vec::new();
            let mut rejected = 0;
            for (response, matches) in batches {
                match engine.process_response(&host, response.content.len(), matches) {
                    Ok(Some(mut finding)) => {
                        finding.source = Some(response.source);
                        findings.push(finding);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Skipping {}: {}", response.source, e);
                        rejected += 1;
                    }
                }
            }
            (findings, rejected)
        })
        .collect();

    let mut outcome = ScanOutcome {
        raw_matches,
        hosts,
        ..ScanOutcome::default()
    };
    for (findings, rejected) in per_host {
        outcome.findings.extend(findings);
        outcome.rejected += rejected;
    }
    outcome
}
