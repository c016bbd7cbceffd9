//! Tokens and tokenized utterances.
//!
//! All offsets are character positions in the original text, never bytes.
//! [`Utterance`] keeps the mapping needed to go back and forth.

use std::fmt;
use std::ops::Range;

/// A single token of an utterance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    /// The token text exactly as it appears in the utterance.
    pub text: String,
    /// Character offset of the first character.
    pub start: usize,
    /// Character offset one past the last character.
    pub end: usize,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Returns the case-folded token text used for index lookups.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.text.to_lowercase()
    }

    /// Returns the character span of this token.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}..{}", self.text, self.start, self.end)
    }
}

/// An utterance together with its tokens.
#[derive(Clone, Debug)]
pub struct Utterance {
    text: String,
    tokens: Vec<Token>,
    /// Byte offset of every character, plus one trailing entry for `text.len()`.
    char_bytes: Vec<usize>,
}

impl Utterance {
    /// Creates an utterance from its text and the tokens produced for it.
    #[must_use]
    pub fn new(text: impl Into<String>, tokens: Vec<Token>) -> Self {
        let text = text.into();
        let char_bytes = text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(text.len()))
            .collect();
        Self {
            text,
            tokens,
            char_bytes,
        }
    }

    /// Returns the original text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the tokens.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns the number of tokens.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the utterance produced no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the number of characters in the text.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.char_bytes.len() - 1
    }

    /// Converts a byte offset (as reported by `regex`) into a character offset.
    #[must_use]
    pub fn byte_to_char(&self, byte: usize) -> usize {
        match self.char_bytes.binary_search(&byte) {
            Ok(index) | Err(index) => index,
        }
    }

    /// Returns the original text between two character offsets.
    ///
    /// Offsets past the end are clamped.
    #[must_use]
    pub fn slice_chars(&self, start: usize, end: usize) -> &str {
        let last = self.char_len();
        let start = start.min(last);
        let end = end.clamp(start, last);
        &self.text[self.char_bytes[start]..self.char_bytes[end]]
    }

    /// Returns the character span covered by the half-open token range.
    ///
    /// Returns `None` if the range is empty or out of bounds.
    #[must_use]
    pub fn token_char_span(&self, tokens: Range<usize>) -> Option<Range<usize>> {
        if tokens.start >= tokens.end || tokens.end > self.tokens.len() {
            return None;
        }
        Some(self.tokens[tokens.start].start..self.tokens[tokens.end - 1].end)
    }

    /// Returns the original text covered by the half-open token range.
    #[must_use]
    pub fn span_text(&self, tokens: Range<usize>) -> &str {
        match self.token_char_span(tokens) {
            Some(chars) => self.slice_chars(chars.start, chars.end),
            None => "",
        }
    }

    /// Returns the normalized lookup key for a token window: case-folded
    /// token texts joined by single spaces.
    #[must_use]
    pub fn window_key(&self, tokens: Range<usize>) -> String {
        let end = tokens.end.min(self.tokens.len());
        let start = tokens.start.min(end);
        self.tokens[start..end]
            .iter()
            .map(Token::normalized)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Returns the smallest token range enclosing a character span.
    ///
    /// Returns `None` if no token intersects the span.
    #[must_use]
    pub fn enclosing_tokens(&self, chars: Range<usize>) -> Option<Range<usize>> {
        let first = self.tokens.iter().position(|t| t.end > chars.start)?;
        let last = self.tokens.iter().rposition(|t| t.start < chars.end)?;
        if first > last {
            return None;
        }
        Some(first..last + 1)
    }

    /// Returns the text with the given character spans removed and
    /// whitespace collapsed.
    #[must_use]
    pub fn remainder(&self, removed: &[Range<usize>]) -> String {
        let kept: String = self
            .text
            .chars()
            .enumerate()
            .filter(|(i, _)| !removed.iter().any(|span| span.contains(i)))
            .map(|(_, c)| c)
            .collect();
        kept.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
