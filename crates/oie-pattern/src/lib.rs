//! OIE Pattern - Layered-sequence pattern matching
//!
//! Compiles patterns over parallel annotation layers (word, part-of-speech,
//! chunk tag, ...) and scans layered sequences for matching subsequences.
//!
//! A pattern such as `DT_pos ? JJ_pos * NN_pos +` is tokenized into
//! `value_layer` pairs and regex meta-characters. The literals the pattern
//! uses on each layer, plus an UNKNOWN symbol, form per-layer alphabets whose
//! Cartesian product is numbered by an [`Encoder`]. Each pair is rewritten to
//! a character class over those numbers and the result is compiled with the
//! `regex` crate. At match time every sequence position is encoded as one
//! character, so regex offsets map straight back to positions.
//!
//! ```
//! use oie_core::TaggedSentence;
//! use oie_pattern::LayeredPattern;
//!
//! let sentence = TaggedSentence::parse("the/DT/B-NP cat/NN/I-NP").unwrap();
//! let pattern = LayeredPattern::compile("the_word NN_pos").unwrap();
//! let mut matcher = pattern.matcher(&sentence.to_sequence().unwrap()).unwrap();
//! assert!(matcher.find());
//! assert_eq!((matcher.start(), matcher.end()), (Some(0), Some(2)));
//! ```

pub mod compiler;
pub mod encoder;
pub mod error;
pub mod matcher;
pub mod tokenizer;

pub use compiler::LayeredPattern;
pub use encoder::{Encoder, Symbol, MAX_TABLE_SIZE, UNKNOWN};
pub use error::{PatternError, Result};
pub use matcher::LayeredMatcher;
pub use tokenizer::{tokenize, Token};

/// Compile a pattern with default engine limits
pub fn compile(pattern: &str) -> Result<LayeredPattern> {
    LayeredPattern::compile(pattern)
}
