//! OIE Extractor - Pattern-driven span extraction
//!
//! Runs named layered patterns over tagged sentences and reports the
//! matched spans. Downstream argument/relation extraction, ranking and
//! indexing consume these spans.

use serde::{Deserialize, Serialize};

use oie_core::{LayeredSequence, Result, Span};

/// A span matched by a named rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    /// Name of the rule that matched
    pub rule: String,
    /// Matched range in sequence positions
    pub span: Span,
    /// Capture groups 1..n; `None` where a group did not participate
    pub groups: Vec<Option<Span>>,
    pub confidence: f32,
}

/// Trait for span extractors
pub trait SpanExtractor: Send + Sync {
    fn extract(&self, sequence: &LayeredSequence) -> Result<Vec<PatternMatch>>;
}

pub mod metrics;
pub mod pattern;

pub use metrics::{GoldSpan, SpanMetrics};
pub use pattern::PatternExtractor;
