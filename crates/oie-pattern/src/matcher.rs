//! Match cursor over an encoded sequence
//!
//! Positions are reported in sequence units: each position is one
//! [`CODE_WIDTH`]-byte character of the encoded string, so a byte offset
//! divided by the width is the element index.

use regex::CaptureLocations;

use oie_core::Span;

use crate::compiler::LayeredPattern;
use crate::encoder::CODE_WIDTH;

/// Stateful matcher bound to one encoded sequence. Not shared across threads;
/// create one per sequence with [`LayeredPattern::matcher`].
#[derive(Debug)]
pub struct LayeredMatcher<'p> {
    pattern: &'p LayeredPattern,
    encoded: String,
    /// Byte offset where the next `find` starts; `None` once exhausted
    cursor: Option<usize>,
    /// Capture locations of the last successful match
    last: Option<CaptureLocations>,
}

impl<'p> LayeredMatcher<'p> {
    pub(crate) fn new(pattern: &'p LayeredPattern, encoded: String) -> Self {
        Self {
            pattern,
            encoded,
            cursor: Some(0),
            last: None,
        }
    }

    /// Advance to the next non-overlapping match. Returns `false` when none
    /// is left; the group accessors then return `None`.
    pub fn find(&mut self) -> bool {
        let Some(at) = self.cursor else {
            self.last = None;
            return false;
        };

        let regex = self.pattern.regex();
        let mut locs = regex.capture_locations();
        match regex.captures_read_at(&mut locs, &self.encoded, at) {
            Some(m) => {
                // An empty match must not be found again at the same place
                let next = if m.start() == m.end() {
                    m.end() + CODE_WIDTH
                } else {
                    m.end()
                };
                self.cursor = (next <= self.encoded.len()).then_some(next);
                tracing::trace!(
                    "Pattern {:?} matched positions {}..{}",
                    self.pattern.source(),
                    m.start() / CODE_WIDTH,
                    m.end() / CODE_WIDTH
                );
                self.last = Some(locs);
                true
            }
            None => {
                self.cursor = None;
                self.last = None;
                false
            }
        }
    }

    /// Reset and search from sequence `position`. Re-invoking at later
    /// positions enumerates overlapping matches.
    pub fn find_from(&mut self, position: usize) -> bool {
        let at = position.saturating_mul(CODE_WIDTH);
        self.cursor = (at <= self.encoded.len()).then_some(at);
        self.find()
    }

    /// Whether the whole sequence matches. Updates the groups but not the
    /// `find` cursor.
    pub fn matches(&mut self) -> bool {
        let full = self.pattern.full_regex();
        let mut locs = full.capture_locations();
        if full.captures_read(&mut locs, &self.encoded).is_some() {
            self.last = Some(locs);
            true
        } else {
            self.last = None;
            false
        }
    }

    /// Rewind to the start of the sequence and forget the last match
    pub fn reset(&mut self) {
        self.cursor = Some(0);
        self.last = None;
    }

    /// Range of the last match
    pub fn range(&self) -> Option<Span> {
        self.group(0)
    }

    pub fn start(&self) -> Option<usize> {
        self.range().map(|span| span.start)
    }

    pub fn end(&self) -> Option<usize> {
        self.range().map(|span| span.end)
    }

    /// Range of capture group `index` in the last match; group 0 is the whole
    /// match. `None` if the group did not participate or does not exist.
    pub fn group(&self, index: usize) -> Option<Span> {
        let (start, end) = self.last.as_ref()?.get(index)?;
        Some(Span::new(start / CODE_WIDTH, end / CODE_WIDTH))
    }

    pub fn start_group(&self, index: usize) -> Option<usize> {
        self.group(index).map(|span| span.start)
    }

    pub fn end_group(&self, index: usize) -> Option<usize> {
        self.group(index).map(|span| span.end)
    }

    pub fn group_count(&self) -> usize {
        self.pattern.group_count()
    }

    /// Length of the bound sequence
    pub fn len(&self) -> usize {
        self.encoded.len() / CODE_WIDTH
    }

    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }

    /// The encoded sequence, one character per position
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub fn pattern(&self) -> &'p LayeredPattern {
        self.pattern
    }
}

impl Iterator for LayeredMatcher<'_> {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        if self.find() {
            self.range()
        } else {
            None
        }
    }
}
