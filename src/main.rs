//! Marktype - replay key presses against a markdown text buffer.
//!
//! # Usage
//!
//! ```bash
//! marktype --text "- milk" Enter =eggs Enter Enter
//! marktype --file notes.md --select 0..12 Tab
//! marktype --print-keymap
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use marktype::config::{
    Config, IndentSpec, clear_config, global_config_path, load_config, local_override_path,
    save_config,
};
use marktype::editor::{Direction, EditorBuffer};
use marktype::input::{KeyPress, Keymap, Platform, parse_combo};
use marktype::session::{KeyOutcome, Session};

/// Replay key presses against a markdown text buffer
#[derive(Parser, Debug)]
#[command(name = "marktype", version, about, long_about = None)]
struct Cli {
    /// Steps to replay: a key combo (`Enter`, `Shift+Tab`, `*`), `:undo`,
    /// `:redo`, or `=TEXT` to type text without interception
    #[arg(value_name = "STEP", allow_hyphen_values = true)]
    steps: Vec<String>,

    /// Extra config file layered over the global and local ones
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Indent width in spaces
    #[arg(long, value_name = "N")]
    indent: Option<usize>,

    /// Initial text
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,

    /// Read the initial text from a file
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Initial selection as byte offsets, `A` or `A..B` (default: end of text)
    #[arg(long, value_name = "A[..B]")]
    select: Option<String>,

    /// Print the effective key bindings and exit
    #[arg(long)]
    print_keymap: bool,

    /// Save command-line settings as global defaults
    #[arg(long)]
    save: bool,

    /// Clear saved global defaults
    #[arg(long)]
    clear: bool,
}

fn parse_selection(spec: &str) -> Result<(usize, usize)> {
    let parse = |part: &str| {
        part.trim()
            .parse::<usize>()
            .with_context(|| format!("Invalid offset {part:?} in --select"))
    };
    match spec.split_once("..") {
        Some((start, end)) => Ok((parse(start)?, parse(end)?)),
        None => {
            let at = parse(spec)?;
            Ok((at, at))
        }
    }
}

/// What a plain text field does with a key nobody intercepted. Returns
/// whether the text changed.
fn native_default(buffer: &mut EditorBuffer, press: &KeyPress) -> bool {
    if press.ctrl || press.meta || press.alt {
        return false;
    }
    match press.key.as_str() {
        "Enter" => buffer.insert_char('\n'),
        "Tab" => buffer.insert_char('\t'),
        "Backspace" => return buffer.delete_back(),
        "Delete" => return buffer.delete_forward(),
        "ArrowLeft" => buffer.move_caret(Direction::Left),
        "ArrowRight" => buffer.move_caret(Direction::Right),
        "ArrowUp" => buffer.move_caret(Direction::Up),
        "ArrowDown" => buffer.move_caret(Direction::Down),
        "Home" => buffer.move_home(),
        "End" => buffer.move_end(),
        _ => {
            let Some(c) = press.as_char() else {
                return false;
            };
            let c = if press.shift { c.to_ascii_uppercase() } else { c };
            buffer.insert_char(c);
            return true;
        }
    }
    matches!(press.key.as_str(), "Enter" | "Tab")
}

fn run_step(session: &mut Session<EditorBuffer>, step: &str, platform: Platform) -> Result<()> {
    match step {
        ":undo" => {
            session.undo();
        }
        ":redo" => {
            session.redo();
        }
        _ => {
            if let Some(text) = step.strip_prefix('=') {
                session.surface_mut().insert_str(text);
                session.native_input();
                return Ok(());
            }
            let press = parse_combo(step, platform)
                .with_context(|| format!("Invalid step {step:?}"))?
                .press();
            let outcome = session.handle_key(&press)?;
            tracing::debug!(step, ?outcome, "replayed step");
            if outcome == KeyOutcome::Ignored && native_default(session.surface_mut(), &press) {
                session.native_input();
            }
        }
    }
    Ok(())
}

fn print_keymap(keymap: &Keymap) -> Result<()> {
    let bindings: Vec<_> = keymap
        .bindings()
        .iter()
        .map(|b| json!({ "combo": b.combo.to_string(), "action": b.action }))
        .collect();
    let out = serde_json::to_string_pretty(&bindings).context("Failed to serialize keymap")?;
    println!("{out}");
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_config = Config {
        indent: cli.indent.map(IndentSpec::Width),
        ..Config::default()
    };

    if cli.clear {
        clear_config(&global_path)?;
    }
    if cli.save {
        save_config(&global_path, &cli_config)?;
    }

    let mut file_config = if cli.clear {
        Config::default()
    } else {
        load_config(&global_path)?.union(&load_config(&local_path)?)
    };
    if let Some(path) = &cli.config {
        if !path.exists() {
            anyhow::bail!("Config not found: {}", path.display());
        }
        file_config = file_config.union(&load_config(path)?);
    }
    let effective = file_config.union(&cli_config);

    let platform = Platform::current();
    let keymap = effective
        .keymap(platform)
        .context("Invalid key bindings")?;
    if cli.print_keymap {
        return print_keymap(&keymap);
    }
    let options = effective.options().context("Invalid indent setting")?;

    let text = match (&cli.text, &cli.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => String::new(),
    };
    let (start, end) = match &cli.select {
        Some(spec) => parse_selection(spec)?,
        None => (text.len(), text.len()),
    };
    let mut buffer = EditorBuffer::from_text(&text);
    buffer.select(start, end).context("Invalid --select")?;

    let mut session = Session::new(buffer, options, keymap);
    for step in &cli.steps {
        run_step(&mut session, step, platform)?;
    }

    let state = session.snapshot();
    let history = session.manager().history();
    let out = json!({
        "value": state.text(),
        "selectionStart": state.selection_start(),
        "selectionEnd": state.selection_end(),
        "history": { "index": history.index(), "len": history.len() },
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("Failed to serialize state")?
    );
    Ok(())
}
