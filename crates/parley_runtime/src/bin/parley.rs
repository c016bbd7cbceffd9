//! Parley CLI entry point.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use parley_engine::IntentEngine;
use parley_foundation::EngineConfig;
use parley_runtime::{Repl, Session};
use tracing_subscriber::EnvFilter;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    files: Vec<PathBuf>,
    batch_mode: bool,
    show_help: bool,
    show_version: bool,
    max_edit_distance: Option<usize>,
    max_window: Option<usize>,
    top: Option<usize>,
}

fn main() -> ExitCode {
    init_tracing();
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr, filtered by `PARLEY_LOG`, then `RUST_LOG`, else warnings only.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("PARLEY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_count(flag: &str, value: Option<&String>) -> Result<usize, Box<dyn std::error::Error>> {
    let value = value.ok_or_else(|| format!("{flag} requires a value"))?;
    Ok(value
        .parse()
        .map_err(|_| format!("invalid {flag} value: {value}"))?)
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            flag @ ("--max-edit-distance" | "--max-window" | "--top") => {
                i += 1;
                let count = parse_count(flag, args.get(i))?;
                match flag {
                    "--max-edit-distance" => config.max_edit_distance = Some(count),
                    "--max-window" => config.max_window = Some(count),
                    _ => config.top = Some(count),
                }
            }
            arg if arg.starts_with('-') => {
                return Err(format!("unknown option: {arg}").into());
            }
            path => config.files.push(PathBuf::from(path)),
        }
        i += 1;
    }

    Ok(config)
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("parley {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut engine_config = EngineConfig::default();
    if let Some(distance) = config.max_edit_distance {
        engine_config = engine_config.with_max_edit_distance(distance);
    }
    if let Some(window) = config.max_window {
        engine_config = engine_config.with_max_window(window);
    }

    let mut session = Session::with_engine(IntentEngine::with_config(engine_config)?);
    if let Some(top) = config.top {
        session.set_top(top);
    }

    let mut repl = Repl::new()?.with_session(session);

    for file in &config.files {
        repl.eval_file(file)?;
    }

    if config.batch_mode {
        return Ok(());
    }

    // Scripts already set the context, so skip the banner
    if !config.files.is_empty() {
        repl = repl.without_banner();
    }

    repl.run()?;
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mParley\x1b[0m - Intent recognition over registered entities and intents

\x1b[1mUSAGE:\x1b[0m
    parley [OPTIONS] [FILES...]

\x1b[1mARGUMENTS:\x1b[0m
    [FILES...]    Scripts of REPL commands to run before starting the REPL

\x1b[1mOPTIONS:\x1b[0m
    -h, --help                 Print help information
    -V, --version              Print version information
    -b, --batch                Run scripts and exit (no REPL)
    --max-edit-distance N      Fuzzy matching distance (default 1, 0 disables)
    --max-window N             Longest entity in tokens (default 5)
    --top N                    Results shown per utterance (default 3)

\x1b[1mENVIRONMENT:\x1b[0m
    PARLEY_LOG, RUST_LOG       Log filter, e.g. PARLEY_LOG=parley_engine=debug

\x1b[1mEXAMPLES:\x1b[0m
    parley                          Start interactive REPL
    parley weather.parley           Run weather.parley, then start REPL
    parley -b --top 1 test.parley   Run test.parley and exit

\x1b[1mREPL:\x1b[0m
    Type an utterance to see its ranked interpretations.
    :help                Show commands
    Ctrl+D               Exit REPL
    Ctrl+C               Cancel current input"
    );
}
