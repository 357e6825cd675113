//! Quality Metrics module
//!
//! Precision, recall and F1 of extracted spans against gold annotations.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use oie_core::Span;

use crate::PatternMatch;

// ============================================================================
// Span Metrics
// ============================================================================

/// Metrics for span extraction evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanMetrics {
    /// Predicted spans present in the gold standard
    pub true_positives: usize,
    /// Predicted spans absent from the gold standard
    pub false_positives: usize,
    /// Gold spans never predicted
    pub false_negatives: usize,
    /// Total spans in gold standard
    pub gold_total: usize,
    /// Total spans predicted
    pub predicted_total: usize,
}

impl SpanMetrics {
    /// Calculate precision (TP / (TP + FP))
    pub fn precision(&self) -> f32 {
        if self.true_positives + self.false_positives == 0 {
            0.0
        } else {
            self.true_positives as f32 / (self.true_positives + self.false_positives) as f32
        }
    }

    /// Calculate recall (TP / (TP + FN))
    pub fn recall(&self) -> f32 {
        if self.true_positives + self.false_negatives == 0 {
            0.0
        } else {
            self.true_positives as f32 / (self.true_positives + self.false_negatives) as f32
        }
    }

    /// Calculate F1 score (2 * P * R / (P + R))
    pub fn f1_score(&self) -> f32 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Evaluate predictions for one sentence; rule and span must both match
    pub fn evaluate(predicted: &[PatternMatch], gold: &[GoldSpan]) -> Self {
        let predicted_set: HashSet<GoldSpan> = predicted.iter().map(GoldSpan::from).collect();
        let gold_set: HashSet<GoldSpan> = gold.iter().cloned().collect();

        let true_positives = predicted_set.intersection(&gold_set).count();

        Self {
            true_positives,
            false_positives: predicted_set.len() - true_positives,
            false_negatives: gold_set.len() - true_positives,
            gold_total: gold_set.len(),
            predicted_total: predicted_set.len(),
        }
    }

    /// Accumulate another sentence's counts
    pub fn add(&mut self, other: &SpanMetrics) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
        self.gold_total += other.gold_total;
        self.predicted_total += other.predicted_total;
    }

    /// Print a summary report
    pub fn report(&self) -> String {
        format!(
            "Precision: {:.1}%\n\
             Recall:    {:.1}%\n\
             F1 Score:  {:.1}%\n\
             Gold: {} | Predicted: {} | TP: {} | FP: {} | FN: {}\n",
            self.precision() * 100.0,
            self.recall() * 100.0,
            self.f1_score() * 100.0,
            self.gold_total,
            self.predicted_total,
            self.true_positives,
            self.false_positives,
            self.false_negatives,
        )
    }
}

// ============================================================================
// Gold Standard Types
// ============================================================================

/// A gold standard span for evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GoldSpan {
    pub rule: String,
    pub span: Span,
}

impl GoldSpan {
    pub fn new(rule: impl Into<String>, span: Span) -> Self {
        Self {
            rule: rule.into(),
            span,
        }
    }
}

impl From<&PatternMatch> for GoldSpan {
    fn from(m: &PatternMatch) -> Self {
        Self {
            rule: m.rule.clone(),
            span: m.span,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
