//! Alphabet encoder
//!
//! Maps tuples of per-layer values onto a dense range of integer codes so
//! that one sequence position becomes one character of an ordinary string.
//!
//! Each layer's alphabet is the set of literals a pattern mentions plus
//! [`Symbol::Unknown`], which stands for every other value. Tuples are
//! numbered in mixed-radix order over the alphabets (first layer varies
//! slowest), so the table is a bijection `A1 x .. x Ak -> [0, size)` that is
//! computed rather than stored.
//!
//! Codes are rendered as characters starting at `U+10000`. Every scalar value
//! in `U+10000..=U+10FFFF` is four bytes long in UTF-8, so a byte offset into
//! an encoded string divided by [`CODE_WIDTH`] is a sequence position.

use std::collections::{BTreeSet, HashMap};

use crate::error::{PatternError, Result};

/// Default maximum number of table entries
pub const MAX_TABLE_SIZE: usize = oie_core::DEFAULT_MAX_TABLE_SIZE;

/// Number of distinct codes representable as fixed-width characters
pub const CODE_SPACE: usize = 0x10_0000;

/// UTF-8 width of every encoded character
pub const CODE_WIDTH: usize = 4;

/// Display spelling of [`Symbol::Unknown`]; callers may not use it as a value
pub const UNKNOWN: &str = "<UNKNOWN>";

const CODE_BASE: u32 = 0x1_0000;

/// Character for a table code
pub fn code_char(code: u32) -> Result<char> {
    if code as usize >= CODE_SPACE {
        return Err(PatternError::InternalEncoding(format!(
            "code {code} outside the character code space"
        )));
    }
    char::from_u32(CODE_BASE + code)
        .ok_or_else(|| PatternError::InternalEncoding(format!("code {code} is not a character")))
}

/// Table code for an encoded character
pub fn char_code(c: char) -> Option<u32> {
    (c as u32)
        .checked_sub(CODE_BASE)
        .filter(|&code| (code as usize) < CODE_SPACE)
}

// ============================================================================
// Symbols
// ============================================================================

/// A member of one layer's alphabet
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Literal(String),
    /// Any value the pattern does not mention for this layer
    Unknown,
}

impl Symbol {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Unknown => write!(f, "{UNKNOWN}"),
        }
    }
}

#[derive(Debug, Clone)]
struct Alphabet {
    /// Sorted literals followed by `Symbol::Unknown`
    symbols: Vec<Symbol>,
    lookup: HashMap<String, usize>,
}

impl Alphabet {
    fn new(literals: BTreeSet<String>) -> Self {
        let lookup = literals
            .iter()
            .enumerate()
            .map(|(i, value)| (value.clone(), i))
            .collect();
        let mut symbols: Vec<Symbol> = literals.into_iter().map(Symbol::Literal).collect();
        symbols.push(Symbol::Unknown);
        Self { symbols, lookup }
    }

    fn radix(&self) -> usize {
        self.symbols.len()
    }

    fn unknown_index(&self) -> usize {
        self.symbols.len() - 1
    }

    /// Index of a value with unknown-folding
    fn fold(&self, value: &str) -> usize {
        self.lookup
            .get(value)
            .copied()
            .unwrap_or_else(|| self.unknown_index())
    }

    fn position(&self, symbol: &Symbol) -> Option<usize> {
        match symbol {
            Symbol::Literal(value) => self.lookup.get(value).copied(),
            Symbol::Unknown => Some(self.unknown_index()),
        }
    }
}

// ============================================================================
// Encoder
// ============================================================================

/// Bijective encoding of per-layer value tuples into integer codes
#[derive(Debug, Clone)]
pub struct Encoder {
    alphabets: Vec<Alphabet>,
    strides: Vec<usize>,
    size: usize,
    max_table_size: usize,
}

impl Encoder {
    /// Build an encoder with the default [`MAX_TABLE_SIZE`]
    pub fn new<I, L, S>(layers: I) -> Result<Self>
    where
        I: IntoIterator<Item = L>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_limit(layers, MAX_TABLE_SIZE)
    }

    /// Build an encoder from per-layer literal sets (UNKNOWN is added here).
    ///
    /// `max_table_size` is capped at [`CODE_SPACE`]. Fails with
    /// [`PatternError::Capacity`] when the product of the alphabet sizes
    /// exceeds it.
    pub fn with_limit<I, L, S>(layers: I, max_table_size: usize) -> Result<Self>
    where
        I: IntoIterator<Item = L>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let max_table_size = max_table_size.min(CODE_SPACE);

        let mut alphabets = Vec::new();
        for literals in layers {
            let mut set = BTreeSet::new();
            for value in literals {
                let value = value.into();
                if value == UNKNOWN {
                    return Err(PatternError::ReservedValue { value });
                }
                set.insert(value);
            }
            alphabets.push(Alphabet::new(set));
        }

        let required = alphabets
            .iter()
            .fold(1u128, |acc, a| acc.saturating_mul(a.radix() as u128));
        if required > max_table_size as u128 {
            return Err(PatternError::Capacity {
                required,
                max: max_table_size,
            });
        }
        let size = required as usize;

        let mut strides = vec![1; alphabets.len()];
        for i in (0..alphabets.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * alphabets[i + 1].radix();
        }

        tracing::debug!(
            "Built encoder: {} layers, table size {} (limit {})",
            alphabets.len(),
            size,
            max_table_size
        );

        Ok(Self {
            alphabets,
            strides,
            size,
            max_table_size,
        })
    }

    /// Number of layers in each tuple
    pub fn layer_count(&self) -> usize {
        self.alphabets.len()
    }

    /// Number of table entries (product of alphabet sizes)
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn max_table_size(&self) -> usize {
        self.max_table_size
    }

    /// Alphabet of a layer: sorted literals, then `Symbol::Unknown`
    pub fn alphabet(&self, layer: usize) -> Option<&[Symbol]> {
        self.alphabets.get(layer).map(|a| a.symbols.as_slice())
    }

    /// Encode a tuple of concrete values, folding unmentioned values to UNKNOWN
    pub fn encode<S: AsRef<str>>(&self, tuple: &[S]) -> Result<u32> {
        self.check_arity(tuple.len())?;

        let mut code = 0usize;
        for ((value, alphabet), stride) in tuple.iter().zip(&self.alphabets).zip(&self.strides) {
            let value: &str = value.as_ref();
            if value == UNKNOWN {
                return Err(PatternError::ReservedValue {
                    value: value.to_string(),
                });
            }
            code += alphabet.fold(value) * stride;
        }

        self.checked_code(code)
    }

    /// Encode a tuple and render it as a character
    pub fn encode_char<S: AsRef<str>>(&self, tuple: &[S]) -> Result<char> {
        code_char(self.encode(tuple)?)
    }

    /// Code of an exact alphabet tuple; no folding is applied
    pub fn encode_symbols(&self, tuple: &[Symbol]) -> Result<u32> {
        self.check_arity(tuple.len())?;

        let mut code = 0usize;
        for (layer, symbol) in tuple.iter().enumerate() {
            let index = self.alphabets[layer].position(symbol).ok_or_else(|| {
                PatternError::InternalEncoding(format!(
                    "symbol {symbol} is not in the alphabet of layer {layer}"
                ))
            })?;
            code += index * self.strides[layer];
        }

        self.checked_code(code)
    }

    /// Tuple for a code
    pub fn decode(&self, code: u32) -> Result<Vec<&Symbol>> {
        let code = self.checked_code(code as usize)? as usize;
        Ok(self
            .alphabets
            .iter()
            .zip(&self.strides)
            .map(|(alphabet, stride)| &alphabet.symbols[(code / stride) % alphabet.radix()])
            .collect())
    }

    /// Every code whose tuple holds `symbol` at `layer`, in ascending order.
    ///
    /// Empty when `symbol` is not in that layer's alphabet.
    pub fn encode_class(&self, layer: usize, symbol: &Symbol) -> Result<Vec<u32>> {
        let alphabet = self.alphabets.get(layer).ok_or(PatternError::LayerIndex {
            index: layer,
            layers: self.alphabets.len(),
        })?;

        let Some(index) = alphabet.position(symbol) else {
            return Ok(Vec::new());
        };

        let stride = self.strides[layer];
        let radix = alphabet.radix();
        Ok((0..self.size)
            .filter(|code| (code / stride) % radix == index)
            .map(|code| code as u32)
            .collect())
    }

    fn check_arity(&self, actual: usize) -> Result<()> {
        if actual != self.alphabets.len() {
            return Err(PatternError::Arity {
                expected: self.alphabets.len(),
                actual,
            });
        }
        Ok(())
    }

    fn checked_code(&self, code: usize) -> Result<u32> {
        if code >= self.size {
            return Err(PatternError::InternalEncoding(format!(
                "code {code} outside table of size {}",
                self.size
            )));
        }
        Ok(code as u32)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn word_pos() -> Encoder {
        Encoder::new(vec![vec!["the", "a"], vec!["NN"]]).unwrap()
    }

    #[test]
    fn test_table_size_includes_unknown() {
        let encoder = word_pos();
        assert_eq!(encoder.layer_count(), 2);
        assert_eq!(encoder.size(), 3 * 2);
        assert_eq!(
            encoder.alphabet(0).unwrap(),
            &[Symbol::literal("a"), Symbol::literal("the"), Symbol::Unknown]
        );
    }

    #[test]
    fn test_encode_is_bijective() {
        let encoder = word_pos();
        let mut seen = std::collections::HashSet::new();
        for word in ["a", "the", "dog"] {
            for pos in ["NN", "VB"] {
                seen.insert(encoder.encode(&[word, pos]).unwrap());
            }
        }
        assert_eq!(seen.len(), encoder.size());
        assert!(seen.iter().all(|&code| (code as usize) < encoder.size()));
    }

    #[test]
    fn test_unknown_folding() {
        let encoder = word_pos();
        let folded = encoder.encode(&["dog", "NN"]).unwrap();
        assert_eq!(folded, encoder.encode(&["cat", "NN"]).unwrap());
        assert_eq!(
            folded,
            encoder
                .encode_symbols(&[Symbol::Unknown, Symbol::literal("NN")])
                .unwrap()
        );
        assert_eq!(
            encoder.encode(&["the", "NN"]).unwrap(),
            encoder.encode(&["the", "NN"]).unwrap()
        );
    }

    #[test]
    fn test_decode_roundtrip() {
        let encoder = word_pos();
        let code = encoder.encode(&["the", "JJ"]).unwrap();
        let tuple = encoder.decode(code).unwrap();
        assert_eq!(tuple, vec![&Symbol::literal("the"), &Symbol::Unknown]);
        assert!(encoder.decode(encoder.size() as u32).is_err());
    }

    #[test]
    fn test_encode_rejects_bad_arity() {
        let encoder = word_pos();
        assert!(matches!(
            encoder.encode(&["the"]),
            Err(PatternError::Arity {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_reserved_value_rejected() {
        let encoder = word_pos();
        assert!(matches!(
            encoder.encode(&[UNKNOWN, "NN"]),
            Err(PatternError::ReservedValue { .. })
        ));
        assert!(matches!(
            Encoder::new(vec![vec![UNKNOWN]]),
            Err(PatternError::ReservedValue { .. })
        ));
    }

    #[test]
    fn test_encode_class_sizes() {
        let encoder = word_pos();
        let the = encoder.encode_class(0, &Symbol::literal("the")).unwrap();
        assert_eq!(the.len(), 2);
        let nn = encoder.encode_class(1, &Symbol::literal("NN")).unwrap();
        assert_eq!(nn.len(), 3);
        assert!(nn.contains(&encoder.encode(&["the", "NN"]).unwrap()));
        assert!(nn.contains(&encoder.encode(&["dog", "NN"]).unwrap()));
        assert!(!nn.contains(&encoder.encode(&["dog", "VB"]).unwrap()));
    }

    #[test]
    fn test_encode_class_missing_symbol_is_empty() {
        let encoder = word_pos();
        assert!(encoder
            .encode_class(0, &Symbol::literal("zebra"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_encode_class_layer_out_of_range() {
        let encoder = word_pos();
        assert!(matches!(
            encoder.encode_class(2, &Symbol::Unknown),
            Err(PatternError::LayerIndex {
                index: 2,
                layers: 2
            })
        ));
    }

    #[test]
    fn test_capacity_boundary() {
        // 3 literals + UNKNOWN = 4, twice: 16 entries
        let at_limit = Encoder::with_limit(vec![vec!["a", "b", "c"], vec!["x", "y", "z"]], 16);
        assert_eq!(at_limit.unwrap().size(), 16);

        let over = Encoder::with_limit(vec![vec!["a", "b", "c", "d"], vec!["x", "y", "z"]], 16);
        assert!(matches!(
            over,
            Err(PatternError::Capacity {
                required: 20,
                max: 16
            })
        ));
    }

    #[test]
    fn test_capacity_default_limit() {
        // 255 literals + UNKNOWN = 256; 256 * 256 = 65536
        let layer: Vec<String> = (0..255).map(|i| format!("v{i}")).collect();
        let encoder = Encoder::new(vec![layer.clone(), layer.clone()]).unwrap();
        assert_eq!(encoder.size(), MAX_TABLE_SIZE);

        let mut wider = layer.clone();
        wider.push("extra".to_string());
        assert!(matches!(
            Encoder::new(vec![wider, layer]),
            Err(PatternError::Capacity { .. })
        ));
    }

    #[test]
    fn test_no_layers() {
        let encoder = Encoder::new(Vec::<Vec<String>>::new()).unwrap();
        assert_eq!(encoder.size(), 1);
        let empty: [&str; 0] = [];
        assert_eq!(encoder.encode(&empty).unwrap(), 0);
    }

    #[test]
    fn test_code_chars_are_fixed_width() {
        for code in [0u32, 1, 0xFFFF, (CODE_SPACE - 1) as u32] {
            let c = code_char(code).unwrap();
            assert_eq!(c.len_utf8(), CODE_WIDTH);
            assert_eq!(char_code(c), Some(code));
        }
        assert!(code_char(CODE_SPACE as u32).is_err());
        assert_eq!(char_code('a'), None);
    }
}
