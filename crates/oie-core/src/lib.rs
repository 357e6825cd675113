//! OIE Core - Sequence model, shared types and configuration
//!
//! This crate defines the abstractions shared by the extraction pipeline:
//! - Layered sequences (parallel annotation layers over one sentence)
//! - Tagged sentences (word / part-of-speech / chunk)
//! - Spans in sequence coordinates
//! - Common error types
//! - Configuration management

pub mod config;
pub mod sentence;
pub mod sequence;

pub use config::{
    ConfigError, EngineConfig, ExtractorConfig, LoggingConfig, OieConfig, PatternRule,
    DEFAULT_MAX_TABLE_SIZE,
};
pub use sentence::{LayerRole, SentenceError, TaggedSentence};
pub use sequence::{LayeredSequence, SequenceError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for OIE operations
#[derive(Error, Debug)]
pub enum OieError {
    #[error("Invalid pattern {name}: {reason}")]
    InvalidPattern { name: String, reason: String },

    #[error("Matching failed for pattern {name}: {reason}")]
    MatchFailed { name: String, reason: String },

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Sentence(#[from] SentenceError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for OieError {
    fn from(err: ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OieError>;

// ============================================================================
// Spans
// ============================================================================

/// Half-open range `[start, end)` of sequence positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} after end {end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if the spans share at least one position
    pub fn overlaps(&self, other: &Span) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, position: usize) -> bool {
        self.start <= position && position < self.end
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_overlaps() {
        let a = Span::new(0, 3);
        assert!(a.overlaps(&Span::new(2, 5)));
        assert!(!a.overlaps(&Span::new(3, 5)));
        assert!(!Span::new(2, 2).overlaps(&a));
        assert!(!a.overlaps(&Span::new(1, 1)));
        assert!(!Span::new(0, 0).overlaps(&Span::new(0, 0)));
    }

    #[test]
    fn test_span_contains_and_len() {
        let span = Span::new(1, 4);
        assert_eq!(span.len(), 3);
        assert!(span.contains(1));
        assert!(!span.contains(4));
        assert!(Span::new(2, 2).is_empty());
        assert_eq!(span.to_string(), "[1, 4)");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: OieError = ConfigError::MissingRequired("name".to_string()).into();
        assert!(err.to_string().contains("name"));
    }
}
