//! Entity tag candidates.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Where an entity tag came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TagSource {
    /// Exact keyword match against the entity index.
    Keyword,
    /// Keyword match within a bounded edit distance.
    Fuzzy {
        /// Character edit distance between the window and the indexed key.
        distance: usize,
    },
    /// Named capture of a regex entity.
    Regex,
}

/// A candidate entity found in an utterance.
///
/// Token ranges are half-open: `start..end`.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityTag {
    /// Entity type this tag proposes.
    pub entity_type: Arc<str>,
    /// Utterance text covered by the tag.
    pub surface: String,
    /// Canonical value the surface stands for.
    pub canonical: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// First token index.
    pub start: usize,
    /// One past the last token index.
    pub end: usize,
    /// Character offset where the tag starts.
    pub char_start: usize,
    /// Character offset where the tag ends.
    pub char_end: usize,
    /// How the tag was produced.
    pub source: TagSource,
}

impl EntityTag {
    /// Returns the number of tokens covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the tag covers no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns the token range.
    #[must_use]
    pub fn tokens(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns the character range.
    #[must_use]
    pub fn chars(&self) -> Range<usize> {
        self.char_start..self.char_end
    }

    /// Returns true if the token ranges of the two tags intersect.
    #[must_use]
    pub fn overlaps(&self, other: &EntityTag) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns confidence weighted by span length.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn coverage(&self) -> f64 {
        self.confidence * self.len() as f64
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={:?} [{}..{}] ({:.2})",
            self.entity_type, self.surface, self.start, self.end, self.confidence
        )
    }
}
