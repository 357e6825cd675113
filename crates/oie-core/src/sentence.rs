//! Tagged sentences
//!
//! A sentence carrying word, part-of-speech and phrase-chunk annotations,
//! as produced by an upstream tagger/chunker. Sentences are converted once
//! into a [`LayeredSequence`] and reused for every pattern matched against
//! them.

use serde::{Deserialize, Serialize};

use crate::sequence::{LayeredSequence, SequenceError};
use crate::Span;

// ============================================================================
// Layer Roles
// ============================================================================

/// Annotation layers a tagged sentence provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerRole {
    Word,
    Pos,
    Chunk,
}

impl LayerRole {
    pub const ALL: [LayerRole; 3] = [Self::Word, Self::Pos, Self::Chunk];

    /// Layer name used in patterns (`the_word`, `NN_pos`, `B-NP_chunk`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Pos => "pos",
            Self::Chunk => "chunk",
        }
    }
}

impl std::fmt::Display for LayerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LayerRole {
    type Err = SentenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "word" => Ok(Self::Word),
            "pos" => Ok(Self::Pos),
            "chunk" => Ok(Self::Chunk),
            _ => Err(SentenceError::UnknownRole(s.to_string())),
        }
    }
}

// ============================================================================
// Tagged Sentence
// ============================================================================

/// Errors building a [`TaggedSentence`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SentenceError {
    #[error("Token, POS and chunk counts differ: {tokens}/{pos}/{chunks}")]
    LengthMismatch {
        tokens: usize,
        pos: usize,
        chunks: usize,
    },

    #[error("Malformed tagged token {token:?}: expected word/POS/CHUNK")]
    MalformedToken { token: String },

    #[error("Unknown layer role: {0}")]
    UnknownRole(String),

    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

/// A POS-tagged and chunked sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSentence {
    pub tokens: Vec<String>,
    pub pos_tags: Vec<String>,
    pub chunk_tags: Vec<String>,
}

impl TaggedSentence {
    /// Build from parallel annotation vectors
    pub fn new(
        tokens: Vec<String>,
        pos_tags: Vec<String>,
        chunk_tags: Vec<String>,
    ) -> Result<Self, SentenceError> {
        if tokens.len() != pos_tags.len() || tokens.len() != chunk_tags.len() {
            return Err(SentenceError::LengthMismatch {
                tokens: tokens.len(),
                pos: pos_tags.len(),
                chunks: chunk_tags.len(),
            });
        }

        Ok(Self {
            tokens,
            pos_tags,
            chunk_tags,
        })
    }

    /// Parse a line of whitespace-separated `word/POS/CHUNK` triples.
    ///
    /// The last two slashes separate the tags, so words may contain `/`
    /// (`1/2/CD/B-NP` is the word `1/2`).
    pub fn parse(line: &str) -> Result<Self, SentenceError> {
        let mut tokens = Vec::new();
        let mut pos_tags = Vec::new();
        let mut chunk_tags = Vec::new();

        for raw in line.split_whitespace() {
            let mut parts = raw.rsplitn(3, '/');
            let (chunk, pos, word) = match (parts.next(), parts.next(), parts.next()) {
                (Some(chunk), Some(pos), Some(word))
                    if !chunk.is_empty() && !pos.is_empty() && !word.is_empty() =>
                {
                    (chunk, pos, word)
                }
                _ => {
                    return Err(SentenceError::MalformedToken {
                        token: raw.to_string(),
                    })
                }
            };

            tokens.push(word.to_string());
            pos_tags.push(pos.to_string());
            chunk_tags.push(chunk.to_string());
        }

        Self::new(tokens, pos_tags, chunk_tags)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Values of one annotation layer
    pub fn layer(&self, role: LayerRole) -> &[String] {
        match role {
            LayerRole::Word => &self.tokens,
            LayerRole::Pos => &self.pos_tags,
            LayerRole::Chunk => &self.chunk_tags,
        }
    }

    /// Build the layered sequence with `word`, `pos` and `chunk` layers
    pub fn to_sequence(&self) -> Result<LayeredSequence, SentenceError> {
        let mut seq = LayeredSequence::new(self.len());
        for role in LayerRole::ALL {
            seq.add_layer(role.as_str(), self.layer(role).iter().cloned())?;
        }
        Ok(seq)
    }

    /// Space-joined words covered by a span (clamped to the sentence)
    pub fn words(&self, span: Span) -> String {
        let end = span.end.min(self.len());
        let start = span.start.min(end);
        self.tokens[start..end].join(" ")
    }
}
