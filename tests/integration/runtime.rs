//! Persistence and the command surface

use std::collections::VecDeque;
use std::sync::Arc;

use parley::engine::IntentEngine;
use parley::foundation::{EnglishTokenizer, Result};
use parley::runtime::{LineEditor, ReadResult, Repl, Response, from_bytes, to_bytes};

/// Editor fed from a fixed list of lines.
struct ScriptedEditor {
    lines: VecDeque<String>,
}

impl ScriptedEditor {
    fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| (*l).to_string()).collect(),
        }
    }
}

impl LineEditor for ScriptedEditor {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
        Ok(self
            .lines
            .pop_front()
            .map_or(ReadResult::Eof, ReadResult::Line))
    }

    fn add_history(&mut self, _line: &str) {}

    fn set_keywords(&mut self, _keywords: Vec<String>) {}
}

fn repl(lines: &[&str]) -> Repl<ScriptedEditor> {
    Repl::with_editor(ScriptedEditor::new(lines)).without_banner()
}

const SCRIPT: &str = r"
# travel domain
:use travel
:entity City paris
:alias City new york big apple
:regex in (?P<Days>\d+) days
:intent Fly require City optional Days
";

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn snapshot_bytes_rebuild_the_engine() {
    let mut repl = repl(&[]);
    repl.eval_source(SCRIPT).unwrap();
    let engine = repl.session().engine();

    let bytes = to_bytes(&engine.snapshot()).unwrap();
    let restored =
        IntentEngine::from_snapshot(&from_bytes(&bytes).unwrap(), Arc::new(EnglishTokenizer::new()))
            .unwrap();

    let text = "fly to the big apple in 3 days";
    let original = engine.best_intent(text).unwrap();
    let reloaded = restored.best_intent(text).unwrap();
    assert_eq!(original.to_string(), reloaded.to_string());
    assert_eq!(reloaded.get("City").unwrap().canonical, "new york");
    assert_eq!(reloaded.value("Days"), Some("3"));
}

#[test]
fn save_and_load_through_commands() {
    let path = std::env::temp_dir().join("parley_integration_roundtrip.msgpack");
    let path_arg = path.display().to_string();

    let mut writer = repl(&[]);
    writer.eval_source(SCRIPT).unwrap();
    writer.eval(&format!(":save {path_arg}")).unwrap();

    let mut reader = repl(&[]);
    reader.eval(&format!(":load {path_arg}")).unwrap();
    reader.eval(":use travel").unwrap();
    let Response::Results(results) = reader.eval("paris please").unwrap() else {
        panic!("expected results");
    };
    assert_eq!(results[0].intent_type, "Fly");

    let _ = std::fs::remove_file(&path);
}

// =============================================================================
// Commands
// =============================================================================

#[test]
fn run_drives_the_session_until_eof() {
    let mut repl = repl(&[
        ":use music",
        ":entity Genre jazz",
        ":intent Play require Genre",
        "some jazz",
        ":bogus",
        ":top 1",
    ]);
    repl.run().unwrap();

    let session = repl.session();
    assert_eq!(session.domain(), "music");
    assert_eq!(session.top(), 1);
    assert_eq!(session.engine().intent_parsers("music").len(), 1);
}

#[test]
fn quit_stops_the_loop() {
    let mut repl = repl(&[":use music", ":quit", ":use movies"]);
    repl.run().unwrap();
    assert_eq!(repl.session().domain(), "music");
    assert!(!repl.session().engine().has_domain("movies"));
}

#[test]
fn script_errors_name_the_line() {
    let mut repl = repl(&[]);
    let err = repl
        .eval_source(":use travel\n:regex (?P<Broken>\n")
        .unwrap_err();
    assert!(err.is_invalid_pattern());
    let context = err.context.unwrap();
    assert_eq!(context.operation.as_deref(), Some("line 2"));
    assert_eq!(context.domain.as_deref(), Some("travel"));
}
