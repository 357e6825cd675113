//! Pattern engine errors

use thiserror::Error;

/// Errors raised while compiling a layered pattern or matching it
#[derive(Error, Debug)]
pub enum PatternError {
    /// Input that is neither a `value_layer` pair, a meta-character nor whitespace
    #[error("Unexpected character {ch:?} at offset {offset} in pattern near {context:?}")]
    Tokenize {
        ch: char,
        offset: usize,
        context: String,
    },

    /// A construct the encoding cannot represent
    #[error("Unsupported construct {construct:?} at offset {offset}: {reason}")]
    Unsupported {
        construct: String,
        offset: usize,
        reason: &'static str,
    },

    /// The layer alphabets need more codes than allowed
    #[error("Encoding table needs {required} entries, limit is {max}")]
    Capacity { required: u128, max: usize },

    /// The rewritten expression was rejected by the regex engine
    #[error("Rewritten pattern failed to compile: {0}")]
    Compile(#[source] regex::Error),

    /// The sequence lacks a layer the pattern references
    #[error("Sequence has no layer {layer:?} required by the pattern")]
    LayerMismatch { layer: String },

    /// Tuple arity differs from the number of encoded layers
    #[error("Expected {expected} layer values, got {actual}")]
    Arity { expected: usize, actual: usize },

    /// A caller supplied the reserved UNKNOWN spelling as a value
    #[error("Value {value:?} is reserved for unknown symbols")]
    ReservedValue { value: String },

    #[error("Layer index {index} out of range for {layers} layers")]
    LayerIndex { index: usize, layers: usize },

    /// Encoder invariant broken; never reported as "no match"
    #[error("Internal encoding error: {0}")]
    InternalEncoding(String),
}

pub type Result<T> = std::result::Result<T, PatternError>;
