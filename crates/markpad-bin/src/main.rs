//! markpad: command line front end for the editor core.
//!
//! `find` / `replace` drive the search engine over a file; `keys` replays a
//! Vim key script through the modal dispatcher; `commands` lists the
//! registered Vim commands of a mode.

mod host;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use core_actions::{CommandRegistry, VimDispatcher};
use core_config::{Config, load_from};
use core_events::parse_key_script;
use core_search::{NavigateDirection, SearchEngine, SearchMatch, SearchOptions};
use core_state::VimMode;
use host::{ReplayReport, ScriptHost};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Instant;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

const LOG_FILE_NAME: &str = "markpad.log";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "markpad", version, about = "Markdown editor core tools")]
struct Args {
    /// Configuration file path (overrides discovery of `markpad.toml`).
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every match of a term.
    Find {
        file: PathBuf,
        term: String,
        #[command(flatten)]
        search: SearchFlags,
        /// Emit the matches as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Replace matches of a term and print (or write back) the result.
    Replace {
        file: PathBuf,
        term: String,
        replacement: String,
        #[command(flatten)]
        search: SearchFlags,
        /// Replace only the n-th match (1-based) instead of all of them.
        #[arg(long)]
        nth: Option<usize>,
        #[arg(long)]
        in_place: bool,
    },
    /// Replay a Vim key script (`dd`, `3j`, `<Esc>`, `<C-r>`) over a file.
    Keys {
        file: PathBuf,
        script: String,
        /// Starting caret byte offset.
        #[arg(long, default_value_t = 0)]
        caret: usize,
        #[arg(long)]
        in_place: bool,
    },
    /// List the registered commands of a mode.
    Commands {
        #[arg(long, value_enum, default_value_t = ModeArg::Normal)]
        mode: ModeArg,
    },
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct SearchFlags {
    /// Match case exactly.
    #[arg(short = 'c', long)]
    case_sensitive: bool,
    /// Treat the term as a regular expression.
    #[arg(short = 'r', long = "regex")]
    regex: bool,
    /// Only match whole words.
    #[arg(short = 'w', long)]
    whole_word: bool,
}

impl SearchFlags {
    /// Flags switch options on over the configured defaults.
    fn resolve(self, defaults: SearchOptions) -> SearchOptions {
        SearchOptions {
            case_sensitive: defaults.case_sensitive || self.case_sensitive,
            use_regex: defaults.use_regex || self.regex,
            whole_word: defaults.whole_word || self.whole_word,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ModeArg {
    Normal,
    Insert,
    Visual,
    Command,
}

impl From<ModeArg> for VimMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Normal => VimMode::Normal,
            ModeArg::Insert => VimMode::Insert,
            ModeArg::Visual => VimMode::Visual,
            ModeArg::Command => VimMode::Command,
        }
    }
}

#[derive(Serialize, Debug)]
struct MatchRecord<'a> {
    line: usize,
    column: usize,
    #[serde(flatten)]
    found: &'a SearchMatch,
}

#[derive(Serialize, Debug)]
struct FindReport<'a> {
    term: &'a str,
    options: SearchOptions,
    pattern_fallback: bool,
    matches: Vec<MatchRecord<'a>>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging()?;
    install_panic_hook();
    info!(target: "runtime", command = ?args.command, "startup");

    let config = load_from(args.config.clone())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.command {
        Command::Find {
            file,
            term,
            search,
            json,
        } => {
            let doc = read_document(&file)?;
            let options = search.resolve(config.search_defaults());
            run_find(&doc, &term, options, json, &mut out)?;
        }
        Command::Replace {
            file,
            term,
            replacement,
            search,
            nth,
            in_place,
        } => {
            let doc = read_document(&file)?;
            let options = search.resolve(config.search_defaults());
            let (new_doc, count) = run_replace(&doc, &term, &replacement, options, nth);
            eprintln!("{count} replacement{}", if count == 1 { "" } else { "s" });
            emit(&file, &new_doc, in_place, &mut out)?;
        }
        Command::Keys {
            file,
            script,
            caret,
            in_place,
        } => {
            let doc = read_document(&file)?;
            let report = run_keys(&doc, &script, caret, &config)?;
            eprintln!("-- {} -- caret {}", report.mode, report.caret);
            for message in &report.messages {
                eprintln!("{message}");
            }
            if let Some(saved) = &report.saved {
                write_document(&file, saved)?;
            }
            emit(&file, &report.value, in_place, &mut out)?;
        }
        Command::Commands { mode } => {
            for cmd in CommandRegistry::global().commands(mode.into()) {
                writeln!(out, "{:<12}{}", cmd.key, cmd.description)?;
            }
        }
    }
    Ok(())
}

/// File logging is opt-in: without a usable `RUST_LOG` nothing is installed
/// and no `markpad.log` is created. An existing log is appended to.
fn configure_logging() -> Result<Option<WorkerGuard>> {
    let Ok(filter) = tracing_subscriber::EnvFilter::try_from_default_env() else {
        return Ok(None);
    };
    let file_appender = tracing_appender::rolling::never(".", LOG_FILE_NAME);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Ok(Some(guard)),
        // Global subscriber already installed; dropping the guard shuts the writer down.
        Err(_) => Ok(None),
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

fn read_document(path: &Path) -> Result<String> {
    let doc = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    tracing::debug!(target: "io", file = %path.display(), size_bytes = doc.len(), "file_read_ok");
    Ok(doc)
}

fn write_document(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
    info!(target: "io", file = %path.display(), size_bytes = content.len(), "file_write_ok");
    Ok(())
}

fn emit(path: &Path, content: &str, in_place: bool, out: &mut impl Write) -> Result<()> {
    if in_place {
        write_document(path, content)
    } else {
        out.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn run_find(
    doc: &str,
    term: &str,
    options: SearchOptions,
    json: bool,
    out: &mut impl Write,
) -> Result<usize> {
    let mut engine = SearchEngine::new(options);
    engine.set_search_term(term, doc);
    if engine.pattern_fallback() {
        warn!(target: "search.pattern", term, "searching_literally");
    }
    let records: Vec<_> = engine
        .matches()
        .iter()
        .map(|m| {
            let span = core_text::line_span(doc, m.index);
            MatchRecord {
                line: span.index + 1,
                column: core_text::column(doc, m.index) + 1,
                found: m,
            }
        })
        .collect();
    if json {
        let report = FindReport {
            term,
            options,
            pattern_fallback: engine.pattern_fallback(),
            matches: records,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(engine.matches().len());
    }
    for r in &records {
        writeln!(out, "{}:{}: {}", r.line, r.column, r.found.text)?;
    }
    writeln!(out, "{}", engine.match_counter())?;
    Ok(engine.matches().len())
}

/// Returns the new document and the number of replacements made.
fn run_replace(
    doc: &str,
    term: &str,
    replacement: &str,
    options: SearchOptions,
    nth: Option<usize>,
) -> (String, usize) {
    let mut engine = SearchEngine::new(options);
    engine.set_search_term(term, doc);
    engine.set_replace_term(replacement);
    let result = match nth {
        Some(n) => {
            if n == 0 || n > engine.matches().len() {
                return (doc.to_string(), 0);
            }
            for _ in 1..n {
                engine.navigate(NavigateDirection::Next);
            }
            engine.replace_one(doc)
        }
        None => engine.replace_all(doc),
    };
    if !result.success {
        return (doc.to_string(), 0);
    }
    let count = if nth.is_some() {
        1
    } else {
        result.replacement_count
    };
    (result.new_document, count)
}

fn run_keys(doc: &str, script: &str, caret: usize, config: &Config) -> Result<ReplayReport> {
    let keys = parse_key_script(script).context("parsing key script")?;
    let mut vim = VimDispatcher::from_config(config);
    let mut host = ScriptHost::new(doc, caret);
    let report = host.replay(&mut vim, &keys, Instant::now());
    info!(
        target: "runtime",
        keys = keys.len(),
        mode = %report.mode,
        requests = report.requests.len(),
        "replay_complete"
    );
    Ok(report)
}
