//! Syntax highlighting for the REPL.
//!
//! Only command lines are coloured. Utterances are shown as typed.

use std::borrow::Cow;

use crate::command::INTENT_SECTIONS;

/// Highlighter for the Parley command language.
pub struct ParleyHighlighter;

impl ParleyHighlighter {
    /// Creates a new highlighter.
    pub const fn new() -> Self {
        Self
    }

    /// Highlight a line of input.
    #[allow(clippy::unused_self)]
    pub fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            return Cow::Owned(format!("\x1b[2;3m{line}\x1b[0m")); // dim italic
        }
        if !trimmed.starts_with(':') {
            return Cow::Borrowed(line);
        }

        let is_intent = trimmed.starts_with(":intent ");
        let is_regex = trimmed.starts_with(":regex ");
        let mut result = String::with_capacity(line.len() * 2);
        let mut first = true;
        let mut offset = 0;

        for piece in split_keep_whitespace(line) {
            let start = offset;
            offset += piece.len();
            if piece.trim().is_empty() {
                result.push_str(piece);
                continue;
            }
            if first {
                result.push_str("\x1b[1;36m"); // bold cyan
                result.push_str(piece);
                result.push_str("\x1b[0m");
                first = false;
            } else if is_regex {
                result.push_str("\x1b[33m"); // yellow
                result.push_str(&line[start..]);
                result.push_str("\x1b[0m");
                break;
            } else if is_intent && INTENT_SECTIONS.contains(&piece) {
                result.push_str("\x1b[1;35m"); // bold magenta
                result.push_str(piece);
                result.push_str("\x1b[0m");
            } else if piece.chars().all(|c| c.is_ascii_digit()) {
                result.push_str("\x1b[35m"); // magenta
                result.push_str(piece);
                result.push_str("\x1b[0m");
            } else {
                result.push_str(piece);
            }
        }

        Cow::Owned(result)
    }
}

/// Splits into alternating runs of whitespace and non-whitespace.
fn split_keep_whitespace(line: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (i, c) in line.char_indices() {
        let space = c.is_whitespace();
        if in_space.is_some_and(|s| s != space) {
            pieces.push(&line[start..i]);
            start = i;
        }
        in_space = Some(space);
    }
    if start < line.len() {
        pieces.push(&line[start..]);
    }
    pieces
}
