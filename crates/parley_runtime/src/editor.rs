//! Terminal input for the REPL.
//!
//! [`LineEditor`] is what the REPL reads from. [`RustylineEditor`] backs it
//! with rustyline: history, hints from history, completion of command words
//! and registered names, and `\` line continuation. Tests drive the REPL
//! with scripted editors instead.

use std::borrow::Cow;

use parley_foundation::{Error, ErrorKind, Result};
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator as RLValidator};

use crate::command::{COMMAND_NAMES, INTENT_SECTIONS};
use crate::highlight::ParleyHighlighter;

/// Outcome of one read.
#[derive(Debug)]
pub enum ReadResult {
    /// The entered text, without the trailing newline.
    Line(String),
    /// Ctrl+C: drop the pending input.
    Interrupted,
    /// Ctrl+D or end of a script: leave the loop.
    Eof,
}

/// Source of REPL input lines.
pub trait LineEditor {
    /// Shows `prompt` and waits for a line.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the terminal cannot be read.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Reads the next part of a line that ended in `\`.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the terminal cannot be read.
    fn read_continuation(&mut self, prompt: &str) -> Result<ReadResult> {
        self.read_line(prompt)
    }

    /// Records an evaluated line.
    fn add_history(&mut self, line: &str);

    /// Set completions beyond the command words: domain names, intent
    /// names, and entity types.
    fn set_keywords(&mut self, keywords: Vec<String>);
}

/// Everything rustyline asks of a helper, wired to Parley's command language.
#[derive(Helper, Completer, Hinter, RLValidator)]
struct ParleyHelper {
    #[rustyline(Completer)]
    completer: ParleyCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
    #[rustyline(Validator)]
    validator: ContinuationValidator,
    highlighter: ParleyHighlighter,
}

impl Highlighter for ParleyHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        // Domain name in green, the "> " plain
        match prompt.strip_suffix("> ") {
            Some(domain) if default => Cow::Owned(format!("\x1b[32m{domain}\x1b[0m> ")),
            _ => Cow::Borrowed(prompt),
        }
    }

    fn highlight_char(&self, line: &str, _pos: usize, _kind: CmdKind) -> bool {
        line.trim_start().starts_with([':', '#'])
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[90m{hint}\x1b[0m"))
    }
}

/// Completer for command words, registry names, and file paths.
struct ParleyCompleter {
    file_completer: FilenameCompleter,
    keywords: Vec<String>,
}

impl ParleyCompleter {
    fn new() -> Self {
        Self {
            file_completer: FilenameCompleter::new(),
            keywords: Vec::new(),
        }
    }

    fn candidates(&self, line: &str, word: &str) -> Vec<Pair> {
        let at_start = line.trim_start().len() == word.len();
        let pool: Box<dyn Iterator<Item = &str> + '_> = if at_start {
            Box::new(COMMAND_NAMES.iter().copied())
        } else if line.trim_start().starts_with(":intent ") {
            Box::new(
                INTENT_SECTIONS
                    .iter()
                    .copied()
                    .chain(self.keywords.iter().map(String::as_str)),
            )
        } else {
            Box::new(self.keywords.iter().map(String::as_str))
        };

        pool.filter(|kw| kw.starts_with(word))
            .map(|kw| Pair {
                display: kw.to_string(),
                replacement: kw.to_string(),
            })
            .collect()
    }
}

impl Completer for ParleyCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let head = line[..pos].trim_start();
        if head.starts_with(":save ") || head.starts_with(":load ") {
            return self.file_completer.complete(line, pos, ctx);
        }

        // Utterances get no completion
        if !head.starts_with(':') {
            return Ok((pos, Vec::new()));
        }

        let start = line[..pos]
            .rfind(char::is_whitespace)
            .map_or(0, |i| i + 1);
        let word = &line[start..pos];

        Ok((start, self.candidates(&line[..pos], word)))
    }
}

/// Keeps reading while the input ends in a backslash.
#[derive(Default)]
struct ContinuationValidator;

impl Validator for ContinuationValidator {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        if ctx.input().trim_end().ends_with('\\') {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

/// History entries kept per session.
const HISTORY_SIZE: usize = 1000;

fn terminal_error(e: &ReadlineError) -> Error {
    Error::new(ErrorKind::Internal(format!("terminal: {e}")))
}

/// Interactive editor on the controlling terminal.
pub struct RustylineEditor {
    editor: Editor<ParleyHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Sets up the terminal editor.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the terminal cannot be configured.
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(HISTORY_SIZE)
            .map_err(|e| terminal_error(&e))?
            .build();

        let helper = ParleyHelper {
            completer: ParleyCompleter::new(),
            hinter: HistoryHinter::new(),
            validator: ContinuationValidator,
            highlighter: ParleyHighlighter::new(),
        };

        let mut editor = Editor::with_config(config).map_err(|e| terminal_error(&e))?;
        editor.set_helper(Some(helper));

        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(terminal_error(&e)),
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            tracing::debug!(error = %e, "history entry not recorded");
        }
    }

    fn set_keywords(&mut self, keywords: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.completer.keywords = keywords;
        }
    }
}
