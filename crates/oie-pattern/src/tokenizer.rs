//! Pattern tokenizer
//!
//! Splits a layered pattern into `value_layer` pairs and single
//! meta-characters. Whitespace separates tokens and is dropped.
//!
//! | Token            | Shape                                                  |
//! |------------------|--------------------------------------------------------|
//! | symbol/layer     | `VALUE_LAYER`, VALUE in letters, digits, ``-.,:;?!"'`$``; LAYER in letters, digits, `-` |
//! | meta-character   | one of `( [ { \ ^ $ \| ] } ) ? * + . : = ! < >`         |
//!
//! `-` is never a meta-character. At each offset a pair is tried before a
//! meta-character, so `?:the_word` lexes as the single pair `("?:the", "word")`;
//! write `(?: the_word )` to get a non-capturing group.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PatternError, Result};

/// Meta-characters passed through to the rewritten expression
pub const META_CHARS: &[char] = &[
    '(', '[', '{', '\\', '^', '$', '|', ']', '}', ')', '?', '*', '+', '.', ':', '=', '!', '<',
    '>',
];

static PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^([\p{L}\p{N}\-.,:;?!"'`$]+)_([\p{L}\p{N}\-]+)"#)
        .expect("symbol/layer pattern is valid")
});

/// Characters of context shown on each side of a tokenization error
const CONTEXT_CHARS: usize = 8;

/// One lexical unit of a layered pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// The position's value on `layer` must equal `value`
    Symbol { value: String, layer: String },
    Meta(char),
}

impl Token {
    pub fn symbol(value: impl Into<String>, layer: impl Into<String>) -> Self {
        Self::Symbol {
            value: value.into(),
            layer: layer.into(),
        }
    }

    pub fn is_meta(&self, c: char) -> bool {
        matches!(self, Self::Meta(m) if *m == c)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Symbol { value, layer } => write!(f, "{value}_{layer}"),
            Self::Meta(c) => write!(f, "{c}"),
        }
    }
}

/// Tokenize a pattern string
pub fn tokenize(pattern: &str) -> Result<Vec<Token>> {
    Ok(tokenize_indexed(pattern)?
        .into_iter()
        .map(|(_, token)| token)
        .collect())
}

/// Tokenize a pattern string, keeping each token's byte offset
pub fn tokenize_indexed(pattern: &str) -> Result<Vec<(usize, Token)>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(ch) = pattern[pos..].chars().next() {
        if let Some(caps) = PAIR.captures(&pattern[pos..]) {
            tokens.push((pos, Token::symbol(&caps[1], &caps[2])));
            pos += caps[0].len();
            continue;
        }

        if META_CHARS.contains(&ch) {
            tokens.push((pos, Token::Meta(ch)));
        } else if !ch.is_whitespace() {
            return Err(PatternError::Tokenize {
                ch,
                offset: pos,
                context: context(pattern, pos),
            });
        }
        pos += ch.len_utf8();
    }

    Ok(tokens)
}

fn context(pattern: &str, pos: usize) -> String {
    let start = pattern[..pos]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let end = pattern[pos..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map(|(i, _)| pos + i)
        .unwrap_or(pattern.len());
    pattern[start..end].to_string()
}
