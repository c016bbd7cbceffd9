//! Utterance tokenization.
//!
//! Converts raw text into tokens carrying their character offsets.

use std::fmt;

use crate::token::{Token, Utterance};

/// Splits text into tokens.
///
/// Implementations must not reorder or silently drop non-whitespace text:
/// every offset is later used to slice the original utterance.
pub trait Tokenizer: Send + Sync + fmt::Debug {
    /// Tokenizes a raw input string.
    fn tokenize(&self, text: &str) -> Vec<Token>;

    /// Tokenizes and wraps the result into an [`Utterance`].
    fn utterance(&self, text: &str) -> Utterance {
        Utterance::new(text, self.tokenize(text))
    }
}

/// Default tokenizer for English text.
///
/// - Words are runs of alphanumerics and apostrophes (`don't` is one token)
/// - `.` and `,` between digits stay inside the word (`3.14`, `1,000`)
/// - Any other non-whitespace character is a token of its own
/// - Case is preserved; lookups fold case themselves
#[derive(Clone, Copy, Debug, Default)]
pub struct EnglishTokenizer;

impl EnglishTokenizer {
    /// Creates a new tokenizer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn is_word_char(ch: char) -> bool {
        ch.is_alphanumeric() || ch == '\'' || ch == '_'
    }
}

impl Tokenizer for EnglishTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let chars: Vec<char> = text.chars().collect();
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut current_start = 0;

        for (i, &ch) in chars.iter().enumerate() {
            let inside_number = matches!(ch, '.' | ',')
                && !current.is_empty()
                && current.chars().last().is_some_and(|c| c.is_ascii_digit())
                && chars.get(i + 1).is_some_and(char::is_ascii_digit);

            if Self::is_word_char(ch) || inside_number {
                if current.is_empty() {
                    current_start = i;
                }
                current.push(ch);
                continue;
            }

            // Anything else ends the current word
            if !current.is_empty() {
                tokens.push(Token::new(std::mem::take(&mut current), current_start, i));
            }

            if !ch.is_whitespace() {
                tokens.push(Token::new(ch.to_string(), i, i + 1));
            }
        }

        // Flush final word
        if !current.is_empty() {
            tokens.push(Token::new(current, current_start, chars.len()));
        }

        tokens
    }
}
