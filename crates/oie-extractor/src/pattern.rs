//! Rule-based span extraction
//!
//! Compiles a list of named layered patterns once and applies all of them
//! to each sentence.

use oie_core::{
    EngineConfig, LayeredSequence, OieConfig, OieError, PatternRule, Result, Span,
};
use oie_pattern::{LayeredPattern, PatternError};

use crate::{PatternMatch, SpanExtractor};

struct CompiledRule {
    rule: PatternRule,
    pattern: LayeredPattern,
}

/// Extractor running a fixed set of compiled pattern rules
pub struct PatternExtractor {
    rules: Vec<CompiledRule>,
    /// Keep overlapping matches instead of resolving them
    allow_overlaps: bool,
}

impl PatternExtractor {
    /// Compile every rule; the first failure is reported with its rule name
    pub fn from_rules(
        rules: impl IntoIterator<Item = PatternRule>,
        engine: &EngineConfig,
    ) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let pattern = LayeredPattern::compile_with(&rule.pattern, engine).map_err(|e| {
                    OieError::InvalidPattern {
                        name: rule.name.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(CompiledRule { rule, pattern })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Compiled {} extraction rules", rules.len());

        Ok(Self {
            rules,
            allow_overlaps: false,
        })
    }

    /// Build from the `[extractor]` and `[engine]` configuration sections
    pub fn from_config(config: &OieConfig) -> Result<Self> {
        Ok(Self::from_rules(config.extractor.patterns.iter().cloned(), &config.engine)?
            .with_overlaps(config.extractor.allow_overlaps))
    }

    pub fn with_overlaps(mut self, allow_overlaps: bool) -> Self {
        self.allow_overlaps = allow_overlaps;
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in evaluation order
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.rule.name.as_str())
    }

    /// All non-empty matches of one rule, left to right
    fn matches_for(
        &self,
        compiled: &CompiledRule,
        sequence: &LayeredSequence,
    ) -> Result<Vec<PatternMatch>> {
        let mut matcher = match compiled.pattern.matcher(sequence) {
            Ok(matcher) => matcher,
            Err(PatternError::LayerMismatch { layer }) => {
                tracing::warn!(
                    "Skipping rule {}: sequence has no {:?} layer",
                    compiled.rule.name,
                    layer
                );
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(OieError::MatchFailed {
                    name: compiled.rule.name.clone(),
                    reason: e.to_string(),
                })
            }
        };

        let mut matches = Vec::new();
        while matcher.find() {
            let Some(span) = matcher.range() else {
                continue;
            };
            if span.is_empty() {
                continue;
            }

            let groups = (1..=matcher.group_count())
                .map(|i| matcher.group(i))
                .collect();
            matches.push(PatternMatch {
                rule: compiled.rule.name.clone(),
                span,
                groups,
                confidence: compiled.rule.confidence,
            });
        }

        Ok(matches)
    }

    /// Keep non-overlapping matches, preferring longer then more confident spans
    fn resolve_overlaps(&self, mut matches: Vec<PatternMatch>) -> Vec<PatternMatch> {
        matches.sort_by(|a, b| {
            b.span
                .len()
                .cmp(&a.span.len())
                .then(b.confidence.total_cmp(&a.confidence))
                .then(a.span.start.cmp(&b.span.start))
        });

        let mut kept: Vec<PatternMatch> = Vec::new();
        for candidate in matches {
            if !kept.iter().any(|k| k.span.overlaps(&candidate.span)) {
                kept.push(candidate);
            }
        }
        kept
    }
}

impl SpanExtractor for PatternExtractor {
    fn extract(&self, sequence: &LayeredSequence) -> Result<Vec<PatternMatch>> {
        let mut matches = Vec::new();
        for compiled in &self.rules {
            matches.extend(self.matches_for(compiled, sequence)?);
        }

        if !self.allow_overlaps {
            matches = self.resolve_overlaps(matches);
        }

        // Sort by position
        matches.sort_by_key(|m| (m.span.start, m.span.end));
        Ok(matches)
    }
}

/// Span of the first match of `pattern` in `sequence`, if any
pub fn first_match(pattern: &LayeredPattern, sequence: &LayeredSequence) -> Result<Option<Span>> {
    let mut matcher = pattern
        .matcher(sequence)
        .map_err(|e| OieError::MatchFailed {
            name: pattern.source().to_string(),
            reason: e.to_string(),
        })?;
    Ok(if matcher.find() { matcher.range() } else { None })
}

// ============================================================================
// Tests
// ============================================================================
