//! Layered pattern compiler
//!
//! Compiles a pattern over annotation layers into a character-level regular
//! expression. Every `value_layer` token becomes a character class listing
//! the codes of all tuples carrying `value` on `layer`; meta-characters are
//! copied as they are and keep their regex meaning.
//!
//! ```text
//! pattern:     the_word NN_pos
//! layers:      [word, pos]     alphabets: {the, ?} x {NN, ?}
//! rewritten:   [\x{10000}-\x{10001}][\x{10000}\x{10002}]
//! ```

use std::collections::{BTreeSet, HashMap};

use regex::{Regex, RegexBuilder};

use oie_core::{EngineConfig, LayeredSequence};

use crate::encoder::{code_char, Encoder, Symbol, CODE_WIDTH};
use crate::error::{PatternError, Result};
use crate::matcher::LayeredMatcher;
use crate::tokenizer::{tokenize_indexed, Token};

/// A compiled, immutable layered pattern.
///
/// Safe to share across threads; each [`matcher`](Self::matcher) call
/// returns an independent cursor.
#[derive(Debug, Clone)]
pub struct LayeredPattern {
    source: String,
    /// Referenced layers in first-seen order; defines tuple positions
    layers: Vec<String>,
    encoder: Encoder,
    expression: String,
    regex: Regex,
    /// `^(?:expression)$`, used for whole-sequence matches
    full: Regex,
}

impl LayeredPattern {
    /// Compile with default engine limits
    pub fn compile(pattern: &str) -> Result<Self> {
        Self::compile_with(pattern, &EngineConfig::default())
    }

    /// Compile with explicit engine limits
    pub fn compile_with(pattern: &str, config: &EngineConfig) -> Result<Self> {
        let tokens = tokenize_indexed(pattern)?;
        reject_negated_classes(&tokens)?;

        let (layers, literals) = collect_alphabets(&tokens);
        let encoder = Encoder::with_limit(literals, config.max_table_size)?;

        let layer_index: HashMap<&str, usize> = layers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let mut expression = String::new();
        for (_, token) in &tokens {
            match token {
                Token::Symbol { value, layer } => {
                    let slot = layer_index.get(layer.as_str()).copied().ok_or_else(|| {
                        PatternError::InternalEncoding(format!("layer {layer:?} was not collected"))
                    })?;
                    let codes = encoder.encode_class(slot, &Symbol::literal(value.as_str()))?;
                    if codes.is_empty() {
                        return Err(PatternError::InternalEncoding(format!(
                            "no codes for {value:?} on layer {layer:?}"
                        )));
                    }
                    push_class(&mut expression, &codes)?;
                }
                Token::Meta(c) => expression.push(*c),
            }
        }

        let regex = build_regex(&expression, config)?;
        let full = build_regex(&format!("^(?:{expression})$"), config)?;

        tracing::debug!(
            "Compiled pattern {:?}: layers {:?}, table size {}, expression {} bytes",
            pattern,
            layers,
            encoder.size(),
            expression.len()
        );

        Ok(Self {
            source: pattern.to_string(),
            layers,
            encoder,
            expression,
            regex,
            full,
        })
    }

    /// Original pattern text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Layers referenced by the pattern, in tuple order
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// The rewritten character-level expression
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Number of capturing groups, excluding the whole match
    pub fn group_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }

    pub(crate) fn full_regex(&self) -> &Regex {
        &self.full
    }

    /// Encode a sequence as one character per position.
    ///
    /// Fails with [`PatternError::LayerMismatch`] if the sequence lacks a
    /// referenced layer.
    pub fn encode_sequence(&self, sequence: &LayeredSequence) -> Result<String> {
        // Resolve layer columns once, not per position
        let columns = self
            .layers
            .iter()
            .map(|layer| {
                sequence
                    .layer(layer)
                    .ok_or_else(|| PatternError::LayerMismatch {
                        layer: layer.clone(),
                    })
            })
            .collect::<Result<Vec<&[String]>>>()?;

        let mut encoded = String::with_capacity(sequence.len() * CODE_WIDTH);
        let mut tuple: Vec<&str> = Vec::with_capacity(columns.len());
        for i in 0..sequence.len() {
            tuple.clear();
            tuple.extend(columns.iter().map(|column| column[i].as_str()));
            encoded.push(self.encoder.encode_char(&tuple)?);
        }

        debug_assert_eq!(encoded.len(), sequence.len() * CODE_WIDTH);
        Ok(encoded)
    }

    /// Bind a fresh matcher to `sequence`
    pub fn matcher(&self, sequence: &LayeredSequence) -> Result<LayeredMatcher<'_>> {
        let encoded = self.encode_sequence(sequence)?;
        Ok(LayeredMatcher::new(self, encoded))
    }
}

impl std::str::FromStr for LayeredPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self> {
        Self::compile(s)
    }
}

impl std::fmt::Display for LayeredPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// `[^` cannot be expressed once values are collapsed into codes
fn reject_negated_classes(tokens: &[(usize, Token)]) -> Result<()> {
    for pair in tokens.windows(2) {
        let (offset, open) = &pair[0];
        let (_, caret) = &pair[1];
        if open.is_meta('[') && caret.is_meta('^') {
            return Err(PatternError::Unsupported {
                construct: "[^".to_string(),
                offset: *offset,
                reason: "negated character classes are not supported",
            });
        }
    }
    Ok(())
}

/// Referenced layers in first-seen order and the literals used with each
fn collect_alphabets(tokens: &[(usize, Token)]) -> (Vec<String>, Vec<BTreeSet<String>>) {
    let mut layers: Vec<String> = Vec::new();
    let mut literals: Vec<BTreeSet<String>> = Vec::new();

    for (_, token) in tokens {
        if let Token::Symbol { value, layer } = token {
            let slot = match layers.iter().position(|l| l == layer) {
                Some(slot) => slot,
                None => {
                    layers.push(layer.clone());
                    literals.push(BTreeSet::new());
                    layers.len() - 1
                }
            };
            literals[slot].insert(value.clone());
        }
    }

    (layers, literals)
}

/// Append a character class of `codes` (ascending), collapsing runs into ranges
fn push_class(expression: &mut String, codes: &[u32]) -> Result<()> {
    expression.push('[');

    let mut i = 0;
    while i < codes.len() {
        let mut j = i;
        while j + 1 < codes.len() && codes[j + 1] == codes[j] + 1 {
            j += 1;
        }

        let lo = code_char(codes[i])? as u32;
        if i == j {
            expression.push_str(&format!("\\x{{{lo:X}}}"));
        } else {
            let hi = code_char(codes[j])? as u32;
            expression.push_str(&format!("\\x{{{lo:X}}}-\\x{{{hi:X}}}"));
        }
        i = j + 1;
    }

    expression.push(']');
    Ok(())
}

fn build_regex(expression: &str, config: &EngineConfig) -> Result<Regex> {
    RegexBuilder::new(expression)
        .size_limit(config.regex_size_limit)
        .build()
        .map_err(PatternError::Compile)
}

// ============================================================================
// Tests
// ============================================================================
