//! The main REPL implementation.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use parley_foundation::{Error, ErrorContext, ErrorKind, Result};
use parley_intent::IntentResult;

use crate::command::Command;
use crate::editor::{LineEditor, ReadResult, RustylineEditor};
use crate::session::Session;

/// What evaluating one line produced.
#[derive(Debug)]
pub enum Response {
    /// Nothing to show (blank or comment line).
    Nothing,
    /// A status or listing message.
    Message(String),
    /// Ranked interpretations of an utterance, best first.
    Results(Vec<IntentResult>),
    /// The user asked to leave.
    Quit,
}

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// Session state (engine, current domain).
    session: Session,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Continuation prompt (for input ending in `\`).
    continuation_prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new() -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor.
    pub fn with_editor(editor: E) -> Self {
        Self {
            editor,
            session: Session::new(),
            show_banner: true,
            continuation_prompt: ".. ".to_string(),
        }
    }

    /// Sets the session for this REPL.
    #[must_use]
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Returns a reference to the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns a mutable reference to the session.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Runs the REPL loop until `:quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }
        self.refresh_keywords();

        loop {
            match self.read_eval_print() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => print_error(&e),
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let Some(input) = self.read_input()? else {
            return Ok(false); // EOF
        };

        if input.trim().is_empty() {
            return Ok(true);
        }

        self.editor.add_history(&input);

        match self.eval(&input) {
            Ok(Response::Quit) => return Ok(false),
            Ok(response) => print_response(&response),
            Err(e) => print_error(&e),
        }
        self.refresh_keywords();

        Ok(true)
    }

    /// Reads one logical line, following trailing-backslash continuations.
    fn read_input(&mut self) -> Result<Option<String>> {
        let prompt = format!("{}> ", self.session.domain());
        let mut input = match self.editor.read_line(&prompt)? {
            ReadResult::Line(line) => line,
            ReadResult::Interrupted => {
                println!();
                return Ok(Some(String::new()));
            }
            ReadResult::Eof => return Ok(None),
        };

        while let Some(head) = continued(&input) {
            let head = head.to_string();
            match self.editor.read_continuation(&self.continuation_prompt)? {
                ReadResult::Line(line) => {
                    input = head;
                    input.push(' ');
                    input.push_str(line.trim_start());
                }
                ReadResult::Interrupted => {
                    println!("\nInput cancelled.");
                    return Ok(Some(String::new()));
                }
                ReadResult::Eof => {
                    return Err(Error::new(ErrorKind::Internal(
                        "unexpected EOF in continued input".to_string(),
                    )));
                }
            }
        }

        Ok(Some(input))
    }

    /// Evaluates one line and returns what it produced.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not a valid command or the command
    /// fails.
    pub fn eval(&mut self, input: &str) -> Result<Response> {
        match Command::parse(input)? {
            Some(command) => self.execute(command),
            None => Ok(Response::Nothing),
        }
    }

    /// Evaluates a script, one logical line at a time.
    ///
    /// Stops at `:quit` or at the first failing line. The error carries the
    /// line number in its context.
    ///
    /// # Errors
    ///
    /// Returns the first error a line produces.
    pub fn eval_source(&mut self, source: &str) -> Result<Vec<Response>> {
        let mut responses = Vec::new();
        for (number, line) in logical_lines(source) {
            let response = self.eval(&line).map_err(|e| {
                let domain = e.context.as_ref().and_then(|c| c.domain.clone());
                let mut context = ErrorContext::new().with_operation(format!("line {number}"));
                context.domain = domain;
                e.with_context(context)
            })?;
            let quit = matches!(response, Response::Quit);
            responses.push(response);
            if quit {
                break;
            }
        }
        Ok(responses)
    }

    /// Evaluates a script file and prints what each line produced.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line fails.
    pub fn eval_file(&mut self, path: &Path) -> Result<()> {
        let source = fs::read_to_string(path).map_err(|e| {
            Error::new(ErrorKind::IoError(format!(
                "failed to read {}: {e}",
                path.display()
            )))
        })?;
        tracing::debug!(path = %path.display(), "evaluating script");
        for response in self.eval_source(&source)? {
            print_response(&response);
        }
        Ok(())
    }

    fn execute(&mut self, command: Command) -> Result<Response> {
        let domain = self.session.domain().to_string();
        let engine = self.session.engine();

        let message = match command {
            Command::Domain(name) => {
                if engine.register_domain(&name) {
                    format!("registered domain '{name}'")
                } else {
                    format!("domain '{name}' already exists")
                }
            }
            Command::Use(name) => {
                self.session.use_domain(&name);
                format!("using domain '{name}'")
            }
            Command::Entity {
                entity_type,
                surface,
            } => {
                if engine.register_entity(&surface, &entity_type, &domain) {
                    format!("{entity_type}: '{surface}'")
                } else {
                    format!("{entity_type}: '{surface}' already registered")
                }
            }
            Command::Alias {
                entity_type,
                canonical,
                surface,
            } => {
                if engine.register_entity_alias(&surface, &canonical, &entity_type, &domain) {
                    format!("{entity_type}: '{surface}' -> '{canonical}'")
                } else {
                    format!("{entity_type}: '{surface}' already registered")
                }
            }
            Command::Regex(pattern) => {
                let types = engine.register_regex_entity(&pattern, &domain)?;
                if types.is_empty() {
                    "pattern has no named groups and will not tag anything".to_string()
                } else {
                    format!("regex entity: {}", join(types))
                }
            }
            Command::Intent(definition) => {
                let shown = definition.to_string();
                engine.register_intent_parser(definition, &domain)?;
                format!("intent: {shown}")
            }
            Command::DropIntent(names) => {
                let dropped = engine.drop_intent_parser(&domain, &names);
                format!("dropped {dropped} intent(s)")
            }
            Command::DropEntity(entity_type) => {
                if engine.drop_entity(&domain, &entity_type) {
                    format!("dropped entity type '{entity_type}'")
                } else {
                    format!("no entity type '{entity_type}' in '{domain}'")
                }
            }
            Command::DropRegex(entity_type) => {
                if engine.drop_regex_entity(&domain, &entity_type) {
                    format!("dropped regex entity '{entity_type}'")
                } else {
                    format!("no regex entity '{entity_type}' in '{domain}'")
                }
            }
            Command::DropDomain(name) => {
                if engine.drop_domain(&name) {
                    self.session.forget_domain(&name);
                    format!("dropped domain '{name}'")
                } else if engine.has_domain(&name) {
                    format!("domain '{name}' cannot be dropped")
                } else {
                    format!("no domain '{name}'")
                }
            }
            Command::Domains => engine
                .domains()
                .into_iter()
                .map(|name| {
                    let marker = if name == domain { "*" } else { " " };
                    format!("{marker} {name}")
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Command::Intents => {
                let intents = engine.intent_parsers(&domain);
                if intents.is_empty() {
                    format!("no intents in '{domain}'")
                } else {
                    intents
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            Command::Entities => {
                let keywords = engine.entity_types(&domain);
                let patterns = engine.regex_patterns(&domain);
                let mut lines = vec![format!("keyword: {}", join(keywords))];
                lines.extend(patterns.into_iter().map(|p| format!("regex: {p}")));
                lines.join("\n")
            }
            Command::Top(count) => {
                self.session.set_top(count);
                format!("showing {count} result(s)")
            }
            Command::Save(path) => {
                self.session.save(&path)?;
                format!("saved to {}", path.display())
            }
            Command::Load(path) => {
                self.session.load(&path)?;
                format!("loaded {}", path.display())
            }
            Command::Stats => {
                let stats = engine.stats_snapshot();
                format!(
                    "domains tagged: {}\ntaggings resolved: {}\nscoring invocations: {}",
                    stats.domains_tagged, stats.taggings_resolved, stats.scoring_invocations
                )
            }
            Command::Help => help_text(),
            Command::Quit => return Ok(Response::Quit),
            Command::Utterance(text) => {
                let results = engine.determine_intent(&text, self.session.top()).collect();
                return Ok(Response::Results(results));
            }
        };

        Ok(Response::Message(message))
    }

    /// Offers the current registry names for completion.
    fn refresh_keywords(&mut self) {
        let engine = self.session.engine();
        let domain = self.session.domain();
        let mut keywords = engine.domains();
        keywords.extend(engine.intent_parsers(domain).into_iter().map(|d| d.name));
        keywords.extend(engine.entity_types(domain));
        keywords.extend(engine.regex_entity_types(domain));
        keywords.sort();
        keywords.dedup();
        self.editor.set_keywords(keywords);
    }

    /// Prints the welcome banner.
    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        println!("\x1b[1;36m");
        println!("  ___          _           ");
        println!(" | _ \\__ _ _ _| |___ _  _  ");
        println!(" |  _/ _` | '_| / -_) || | ");
        println!(" |_| \\__,_|_| |_\\___|\\_, | ");
        println!("                     |__/  ");
        println!("\x1b[0m");
        println!("Welcome to Parley v{}", env!("CARGO_PKG_VERSION"));
        println!("Type an utterance to interpret it, or :help for commands. Ctrl+D exits.\n");

        // Flush to ensure banner appears
        let _ = io::stdout().flush();
    }
}

/// Returns the line without its trailing backslash, if it has one.
fn continued(line: &str) -> Option<&str> {
    line.trim_end().strip_suffix('\\').map(str::trim_end)
}

/// Joins backslash-continued lines, numbering each by its first line.
fn logical_lines(source: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (index, raw) in source.lines().enumerate() {
        let (number, mut text) = match pending.take() {
            Some((number, mut text)) => {
                text.push(' ');
                text.push_str(raw.trim_start());
                (number, text)
            }
            None => (index + 1, raw.to_string()),
        };
        if let Some(head) = continued(&text) {
            text = head.to_string();
            pending = Some((number, text));
        } else {
            lines.push((number, text));
        }
    }
    if let Some(last) = pending {
        lines.push(last);
    }
    lines
}

fn join(items: impl IntoIterator<Item = String>) -> String {
    let items: Vec<String> = items.into_iter().collect();
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

fn help_text() -> String {
    const USAGE: &[(&str, &str)] = &[
        (":domain NAME", "register a domain"),
        (":use NAME", "switch the current domain"),
        (":entity TYPE SURFACE...", "register a keyword entity"),
        (":alias TYPE CANONICAL SURFACE...", "register another spelling"),
        (":regex PATTERN", "register a regex entity (named groups)"),
        (
            ":intent NAME [require T..] [optional T..] [one-of T..] [exclude T..]",
            "register an intent",
        ),
        (":drop-intent NAME...", "remove intents"),
        (":drop-entity TYPE", "remove an entity type"),
        (":drop-regex TYPE", "remove a regex entity type"),
        (":drop-domain NAME", "remove a domain"),
        (":domains", "list domains"),
        (":intents", "list intents in the current domain"),
        (":entities", "list entity types in the current domain"),
        (":top N", "set how many results to show"),
        (":save PATH", "write a snapshot"),
        (":load PATH", "replace the engine with a snapshot"),
        (":stats", "show work counters"),
        (":help", "show this help"),
        (":quit", "exit"),
    ];

    let mut text = String::from(
        "Type an utterance to see its ranked interpretations.\n\
         Registration commands act on the current domain, shown in the prompt.\n\
         End a line with \\ to continue it on the next.\n\n",
    );
    for (usage, effect) in USAGE {
        text.push_str(&format!("    {usage}\n        {effect}\n"));
    }
    text
}

fn print_response(response: &Response) {
    match response {
        Response::Nothing | Response::Quit => {}
        Response::Message(message) => println!("{message}"),
        Response::Results(results) if results.is_empty() => {
            println!("\x1b[2mno intent recognized\x1b[0m");
        }
        Response::Results(results) => {
            for (rank, result) in results.iter().enumerate() {
                println!("\x1b[1m{}.\x1b[0m {result}", rank + 1);
            }
        }
    }
}

/// Prints an error to stderr.
fn print_error(error: &Error) {
    match &error.context {
        Some(context) => eprintln!("\x1b[31mError: {error} {context}\x1b[0m"),
        None => eprintln!("\x1b[31mError: {error}\x1b[0m"),
    }
}
