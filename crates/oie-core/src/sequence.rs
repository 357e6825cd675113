//! Layered sequences
//!
//! A fixed-length sequence of positions carrying one string value per
//! named layer (e.g. `word`, `pos`, `chunk`). Layers are added once and
//! never modified afterwards.

use std::collections::HashMap;
use std::ops::Range;

use thiserror::Error;

/// Errors raised while building or reading a [`LayeredSequence`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("Layer already exists: {0}")]
    DuplicateLayer(String),

    #[error("Layer {layer} has {actual} values, sequence length is {expected}")]
    LengthMismatch {
        layer: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    #[error("Index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid range {start}..{end} for sequence of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },
}

/// Immutable multi-layer sequence read by the pattern engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayeredSequence {
    len: usize,
    /// Layers in insertion order
    layers: Vec<(String, Vec<String>)>,
    /// Layer name -> slot in `layers`
    index: HashMap<String, usize>,
}

impl LayeredSequence {
    /// Create an empty sequence of the given length with no layers
    pub fn new(len: usize) -> Self {
        Self {
            len,
            layers: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add a layer. Fails if the name is taken or the value count differs
    /// from the sequence length.
    pub fn add_layer<S>(
        &mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Result<(), SequenceError>
    where
        S: Into<String>,
    {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(SequenceError::DuplicateLayer(name));
        }

        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.len() != self.len {
            return Err(SequenceError::LengthMismatch {
                layer: name,
                expected: self.len,
                actual: values.len(),
            });
        }

        self.index.insert(name.clone(), self.layers.len());
        self.layers.push((name, values));
        Ok(())
    }

    /// Builder form of [`add_layer`](Self::add_layer)
    pub fn with_layer<S>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Result<Self, SequenceError>
    where
        S: Into<String>,
    {
        self.add_layer(name, values)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn has_layer(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All values of a layer, or `None` if the layer is absent
    pub fn layer(&self, name: &str) -> Option<&[String]> {
        self.index
            .get(name)
            .map(|&slot| self.layers[slot].1.as_slice())
    }

    /// Value of `name` at `index`
    pub fn get(&self, name: &str, index: usize) -> Result<&str, SequenceError> {
        let values = self
            .layer(name)
            .ok_or_else(|| SequenceError::UnknownLayer(name.to_string()))?;

        values
            .get(index)
            .map(String::as_str)
            .ok_or(SequenceError::IndexOutOfRange {
                index,
                len: self.len,
            })
    }

    /// Layer names in insertion order
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|(name, _)| name.as_str())
    }

    /// Copy a contiguous range into a new, independent sequence
    pub fn subsequence(&self, range: Range<usize>) -> Result<Self, SequenceError> {
        if range.start > range.end || range.end > self.len {
            return Err(SequenceError::InvalidRange {
                start: range.start,
                end: range.end,
                len: self.len,
            });
        }

        let mut sub = Self::new(range.len());
        for (name, values) in &self.layers {
            sub.add_layer(name.clone(), values[range.clone()].iter().cloned())?;
        }
        Ok(sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> LayeredSequence {
        LayeredSequence::new(3)
            .with_layer("word", ["the", "cat", "sat"])
            .unwrap()
            .with_layer("pos", ["DT", "NN", "VBD"])
            .unwrap()
    }

    #[test]
    fn test_get_values() {
        let seq = sample();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.get("word", 1).unwrap(), "cat");
        assert_eq!(seq.get("pos", 2).unwrap(), "VBD");
        assert!(seq.has_layer("pos"));
        assert!(!seq.has_layer("chunk"));
    }

    #[test]
    fn test_get_errors() {
        let seq = sample();
        assert_eq!(
            seq.get("chunk", 0),
            Err(SequenceError::UnknownLayer("chunk".to_string()))
        );
        assert_eq!(
            seq.get("word", 3),
            Err(SequenceError::IndexOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn test_duplicate_layer_rejected() {
        let mut seq = sample();
        let err = seq.add_layer("word", ["a", "b", "c"]).unwrap_err();
        assert_eq!(err, SequenceError::DuplicateLayer("word".to_string()));
        // Original values untouched
        assert_eq!(seq.get("word", 0).unwrap(), "the");
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut seq = LayeredSequence::new(2);
        let err = seq.add_layer("word", ["only"]).unwrap_err();
        assert!(matches!(
            err,
            SequenceError::LengthMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
        assert!(!seq.has_layer("word"));
    }

    #[test]
    fn test_layer_names_in_order() {
        let seq = sample();
        let names: Vec<&str> = seq.layer_names().collect();
        assert_eq!(names, vec!["word", "pos"]);
    }

    #[test]
    fn test_subsequence() {
        let seq = sample();
        let sub = seq.subsequence(1..3).unwrap();
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.get("word", 0).unwrap(), "cat");
        assert_eq!(sub.get("pos", 1).unwrap(), "VBD");

        let empty = seq.subsequence(3..3).unwrap();
        assert!(empty.is_empty());
        assert!(empty.has_layer("word"));

        assert!(seq.subsequence(2..4).is_err());
    }

    proptest! {
        #[test]
        fn prop_subsequence_slices_every_layer(
            words in proptest::collection::vec("[a-z]{1,4}", 0..12),
            a in 0usize..12,
            b in 0usize..12,
        ) {
            let len = words.len();
            let tags: Vec<String> = words.iter().map(|w| w.to_uppercase()).collect();
            let seq = LayeredSequence::new(len)
                .with_layer("word", words.clone())
                .unwrap()
                .with_layer("pos", tags.clone())
                .unwrap();

            let (start, end) = (a.min(b).min(len), a.max(b).min(len));
            let sub = seq.subsequence(start..end).unwrap();
            prop_assert_eq!(sub.len(), end - start);
            for i in 0..sub.len() {
                prop_assert_eq!(sub.get("word", i).unwrap(), words[start + i].as_str());
                prop_assert_eq!(sub.get("pos", i).unwrap(), tags[start + i].as_str());
            }
        }
    }
}
