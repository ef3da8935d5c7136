//! Consolidation of raw rule matches into per-response findings.
//!
//! A response may trip several rules at once. The engine turns that batch into
//! at most one [`Finding`](crate::report::finding::Finding), and only when the
//! batch reveals something not already reported for the host.

pub mod aggregate;
pub mod engine;
pub mod memory;
pub mod ranker;
pub mod render;

use thiserror::Error;

use crate::report::finding::{Confidence, Severity};

pub use engine::ConsolidationEngine;

/// A single rule hit inside one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Which rule fired, e.g. "Server header"
    pub match_type: String,
    /// Byte offset of the hit in the response
    pub start: usize,
    /// Byte offset one past the end of the hit
    pub end: usize,
    /// Exact bytes of the hit; two hits are the same disclosure only if
    /// these are equal
    pub raw: Vec<u8>,
    /// Text of the hit, for display
    pub full_match: String,
    /// The meaningful part of the hit (the rule's capture group)
    pub capture: String,
    pub severity: Option<Severity>,
    pub confidence: Option<Confidence>,
}

impl Match {
    /// Check the offsets against the response they were taken from
    pub fn check_bounds(&self, response_len: usize) -> Result<(), ConsolidateError> {
        if self.start >= self.end {
            return Err(ConsolidateError::EmptyRange {
                match_type: self.match_type.clone(),
                start: self.start,
                end: self.end,
            });
        }
        if self.end > response_len {
            return Err(ConsolidateError::OutOfBounds {
                match_type: self.match_type.clone(),
                end: self.end,
                response_len,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}..{}] {:?}",
            self.match_type, self.start, self.end, self.full_match
        )
    }
}

/// A batch the engine refuses to consolidate
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsolidateError {
    #[error("batch has no host")]
    MissingHost,

    #[error("match '{match_type}' has an empty range {start}..{end}")]
    EmptyRange {
        match_type: String,
        start: usize,
        end: usize,
    },

    #[error("match '{match_type}' ends at {end}, past the response length {response_len}")]
    OutOfBounds {
        match_type: String,
        end: usize,
        response_len: usize,
    },
}
