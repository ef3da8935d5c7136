//! Version disclosure rules: the built-in set plus user rule files.

pub mod defaults;
pub mod listing;

use std::path::{Path, PathBuf};

use regex::bytes::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::RulesConfig;
use crate::report::finding::{Confidence, Severity};

/// A rule that cannot be loaded
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("cannot read rule file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse rule file {origin}: {source}")]
    Toml {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("rule '{match_type}' has an invalid pattern: {source}")]
    Pattern {
        match_type: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule '{match_type}' uses group {group}, but the pattern has only {available}")]
    Group {
        match_type: String,
        group: usize,
        available: usize,
    },

    #[error("rule '{match_type}' has an unknown severity '{value}'")]
    Severity { match_type: String, value: String },

    #[error("rule '{match_type}' has an unknown confidence '{value}'")]
    Confidence { match_type: String, value: String },
}

/// One version disclosure signature
#[derive(Debug, Clone)]
pub struct MatchRule {
    /// Name reported for every hit, e.g. "Server header"
    pub match_type: String,
    /// Matched against the raw response bytes
    pub pattern: Regex,
    /// Capture group holding the interesting part (0 = whole hit)
    pub group: usize,
    pub severity: Option<Severity>,
    pub confidence: Option<Confidence>,
    /// "built-in" or the file the rule was loaded from
    pub origin: String,
}

impl MatchRule {
    /// Compile a rule. Without an explicit `group`, the first capture group
    /// is used if the pattern has one, otherwise the whole hit.
    pub fn new(
        match_type: &str,
        pattern: &str,
        group: Option<usize>,
        severity: Option<Severity>,
        confidence: Option<Confidence>,
        origin: &str,
    ) -> Result<Self, RuleError> {
        let regex = Regex::new(pattern).map_err(|source| RuleError::Pattern {
            match_type: match_type.to_string(),
            source,
        })?;
        // captures_len counts the implicit whole-match group
        let available = regex.captures_len() - 1;
        let group = group.unwrap_or(if available > 0 { 1 } else { 0 });
        if group > available {
            return Err(RuleError::Group {
                match_type: match_type.to_string(),
                group,
                available,
            });
        }
        Ok(MatchRule {
            match_type: match_type.to_string(),
            pattern: regex,
            group,
            severity,
            confidence,
            origin: origin.to_string(),
        })
    }
}

/// Rule file layout:
///
/// ```toml
/// [[rule]]
/// type = "Varnish"
/// pattern = '(?im)^Via:.*(varnish/[0-9.]+)'
/// group = 1
/// severity = "LOW"
/// confidence = "FIRM"
/// ```
#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default, rename = "rule")]
    rules: Vec<RuleEntry>,
}

#[derive(Debug, Deserialize)]
struct RuleEntry {
    #[serde(rename = "type")]
    match_type: String,
    pattern: String,
    #[serde(default)]
    group: Option<usize>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    confidence: Option<String>,
}

impl RuleEntry {
    fn into_rule(self, origin: &str) -> Result<MatchRule, RuleError> {
        let severity = match self.severity {
            Some(value) => Some(Severity::parse(&value).ok_or_else(|| RuleError::Severity {
                match_type: self.match_type.clone(),
                value,
            })?),
            None => None,
        };
        let confidence = match self.confidence {
            Some(value) => Some(Confidence::parse(&value).ok_or_else(|| {
                RuleError::Confidence {
                    match_type: self.match_type.clone(),
                    value,
                }
            })?),
            None => None,
        };
        MatchRule::new(
            &self.match_type,
            &self.pattern,
            self.group,
            severity,
            confidence,
            origin,
        )
    }
}

/// Parse rules from TOML text; `origin` names the source in errors and listings
pub fn parse_rules(content: &str, origin: &str) -> Result<Vec<MatchRule>, RuleError> {
    let file: RuleFile = toml::from_str(content).map_err(|source| RuleError::Toml {
        origin: origin.to_string(),
        source,
    })?;
    file.rules
        .into_iter()
        .map(|entry| entry.into_rule(origin))
        .collect()
}

/// Load rules from a TOML rule file
pub fn load_rule_file(path: &Path) -> Result<Vec<MatchRule>, RuleError> {
    let content = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rules = parse_rules(&content, &path.display().to_string())?;
    debug!("Loaded {} rules from {}", rules.len(), path.display());
    Ok(rules)
}

/// Build the effective rule set: built-in rules minus `disable`, then every
/// rule file in order.
pub fn effective_rules(files: &[PathBuf], disable: &[String]) -> Result<Vec<MatchRule>, RuleError> {
    let mut rules: Vec<MatchRule> = defaults::builtin_rules()
        .into_iter()
        .filter(|r| !disable.iter().any(|d| r.match_type.eq_ignore_ascii_case(d)))
        .collect();
    for path in files {
        rules.extend(load_rule_file(path)?);
    }
    info!("Loaded {} rules", rules.len());
    Ok(rules)
}

/// Merge rule settings from the command line and the config file.
///
/// Command line rule files load before the config's, and a type disabled in
/// either place is dropped.
pub fn configured_rules(
    files: &[PathBuf],
    disable: &[String],
    config: &RulesConfig,
) -> Result<Vec<MatchRule>, RuleError> {
    let mut rule_files = files.to_vec();
    rule_files.extend(config.files.iter().cloned());
    let mut disabled = disable.to_vec();
    disabled.extend(config.disable.iter().cloned());
    effective_rules(&rule_files, &disabled)
}
