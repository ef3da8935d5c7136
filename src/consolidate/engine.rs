use std::sync::Arc;

use tracing::debug;

use crate::consolidate::aggregate::aggregate;
use crate::consolidate::memory::{HostMemory, InMemoryHostStore};
use crate::consolidate::ranker::{highlight_ranges, rank};
use crate::consolidate::render::{render, FINDING_TITLE};
use crate::consolidate::{ConsolidateError, Match};
use crate::report::finding::Finding;

/// Decides, per response, whether its matches make a new finding and
/// builds that finding.
///
/// Shared by all worker threads; the host memory is the only state.
pub struct ConsolidationEngine {
    memory: Arc<dyn HostMemory>,
}

impl Default for ConsolidationEngine {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryHostStore::new()))
    }
}

impl ConsolidationEngine {
    pub fn new(memory: Arc<dyn HostMemory>) -> Self {
        ConsolidationEngine { memory }
    }

    pub fn memory(&self) -> &dyn HostMemory {
        self.memory.as_ref()
    }

    /// Like [`process`](Self::process), but first checks every match against
    /// the length of the response it came from.
    pub fn process_response(
        &self,
        host: &str,
        response_len: usize,
        matches: Vec<Match>,
    ) -> Result<Option<Finding>, ConsolidateError> {
        for m in &matches {
            m.check_bounds(response_len)?;
        }
        self.process(host, matches)
    }

    /// Consolidate the matches of one response.
    ///
    /// Every matched string is remembered for the host. A finding is returned
    /// only if at least one of them had not been seen before, and it then
    /// covers the whole batch, previously seen strings included. A rejected
    /// batch leaves the host memory untouched.
    pub fn process(
        &self,
        host: &str,
        matches: Vec<Match>,
    ) -> Result<Option<Finding>, ConsolidateError> {
        if matches.is_empty() {
            return Ok(None);
        }
        if host.trim().is_empty() {
            return Err(ConsolidateError::MissingHost);
        }
        for m in &matches {
            m.check_bounds(usize::MAX)?;
        }

        debug!("Processing {} matches for {}", matches.len(), host);

        let ranked = rank(matches);
        let highlights = highlight_ranges(&ranked);

        let raw: Vec<&[u8]> = ranked.iter().map(|m| m.raw.as_slice()).collect();
        let novel = self.memory.record_novel(host, &raw);

        for m in &ranked {
            debug!("  match: {}", m);
        }

        if !novel {
            debug!("Nothing new for {}", host);
            return Ok(None);
        }
        debug!("New version disclosure for {}", host);

        let (severity, confidence) = aggregate(&ranked);

        Ok(Some(Finding {
            id: Finding::generate_id(host, raw.iter().copied()),
            host: host.to_string(),
            source: None,
            severity,
            confidence,
            title: FINDING_TITLE.to_string(),
            detail: render(&ranked),
            highlights,
            evidence: ranked.iter().map(|m| m.full_match.clone()).collect(),
        }))
    }
}
