// Ergokey CLI
// Replays physical key events through the virtual keyboard and prints the result

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info};

use ergokey_core::{
    AutocorrectPipeline, DocumentHandle, Geometry, KeyOutcome, KeyboardEmulation, KeyboardView,
    Layer, LayerState, LayerTransitionEngine, LayoutDocument, MagicWordExpander, MagicWordTable,
    RuleSet, Settings, TextBufferEditor, TransitionTable,
};

/// Virtual alternative-keyboard emulator
#[derive(Parser, Debug)]
#[command(name = "ergokey")]
#[command(author = "ergokey contributors")]
#[command(version = "0.3.0")]
#[command(about = "Replay key events through a virtual alternative keyboard", long_about = None)]
struct Args {
    /// Settings file (default: ~/.config/ergokey/settings.toml)
    #[arg(short, long, value_name = "SETTINGS")]
    settings: Option<PathBuf>,

    /// Layout document (JSON)
    #[arg(short, long, value_name = "LAYOUT")]
    layout: Option<PathBuf>,

    /// Magic-word table (JSON)
    #[arg(short, long, value_name = "MAGIC")]
    magic: Option<PathBuf>,

    /// Autocorrect rule set (TOML) replacing the built-in one
    #[arg(short, long, value_name = "RULES")]
    rules: Option<PathBuf>,

    /// Layer transition table (TOML) replacing the built-in one
    #[arg(short, long, value_name = "TRANSITIONS")]
    transitions: Option<PathBuf>,

    /// Keyboard geometry: iso or ergodox
    #[arg(short, long)]
    geometry: Option<Geometry>,

    /// Enable the extended layout variant
    #[arg(short, long)]
    plus: bool,

    /// Print the key grid of a layer instead of replaying events
    #[arg(long, value_name = "LAYER")]
    show: Option<Layer>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Events after `--`: `KeyA` taps a key, `+ShiftLeft` presses, `-ShiftLeft` releases
    events: Vec<String>,
}

/// A single replayed key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event<'a> {
    Tap(&'a str),
    Down(&'a str),
    Up(&'a str),
}

impl<'a> Event<'a> {
    fn parse(text: &'a str) -> Result<Self> {
        let event = if let Some(code) = text.strip_prefix('+') {
            Event::Down(code)
        } else if let Some(code) = text.strip_prefix('-') {
            Event::Up(code)
        } else {
            Event::Tap(text)
        };
        match event {
            Event::Tap("") | Event::Down("") | Event::Up("") => {
                bail!("empty key code in event '{}'", text)
            }
            _ => Ok(event),
        }
    }
}

fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.settings {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::load_default().context("loading default settings")?,
    };
    if let Some(geometry) = args.geometry {
        settings.set_geometry(geometry);
    }
    if args.plus {
        settings.set_plus(true);
    }
    Ok(settings)
}

fn build_emulation(args: &Args, settings: &Settings) -> Result<KeyboardEmulation> {
    let layout_path = args
        .layout
        .clone()
        .or_else(|| settings.document())
        .context("no layout document: pass --layout or set [layout] document")?;
    let document = LayoutDocument::from_file(&layout_path)
        .with_context(|| format!("loading layout from {}", layout_path.display()))?;
    info!("Loaded layout '{}' from {}", document.name(), layout_path.display());

    let table = match args.magic.clone().or_else(|| settings.magic_words()) {
        Some(path) => MagicWordTable::from_file(&path)
            .with_context(|| format!("loading magic words from {}", path.display()))?,
        None => MagicWordTable::new(),
    };
    debug!("{} magic words", table.len());

    let autocorrect = match args.rules.clone().or_else(|| settings.rules()) {
        Some(path) => RuleSet::from_file(&path)
            .and_then(|rules| rules.compile())
            .with_context(|| format!("loading rules from {}", path.display()))?,
        None => AutocorrectPipeline::builtin().context("compiling built-in rules")?,
    };
    debug!(
        "Autocorrect rules: {}",
        autocorrect.labels().collect::<Vec<_>>().join(", ")
    );

    let transitions = match &args.transitions {
        Some(path) => TransitionTable::from_file(path)
            .with_context(|| format!("loading transitions from {}", path.display()))?,
        None => TransitionTable::builtin().context("loading built-in transitions")?,
    };

    Ok(KeyboardEmulation::new(
        DocumentHandle::with_document(document),
        settings.layer_state(),
    )
    .with_transitions(LayerTransitionEngine::new(transitions))
    .with_editor(TextBufferEditor::new(
        MagicWordExpander::new(table),
        autocorrect,
    )))
}

fn replay(emulation: &mut KeyboardEmulation, events: &[String]) -> Result<()> {
    for text in events {
        match Event::parse(text)? {
            Event::Down(code) => report(code, emulation.key_down(code)),
            Event::Up(code) => {
                emulation.key_up(code);
            }
            Event::Tap(code) => {
                report(code, emulation.key_down(code));
                emulation.key_up(code);
            }
        }
    }
    Ok(())
}

fn report(code: &str, outcome: KeyOutcome) {
    match outcome {
        KeyOutcome::Unmapped => log::warn!("{}: no key on this geometry", code),
        outcome => debug!("{} -> {:?}", code, outcome),
    }
}

/// Render a layer as one text line per keyboard row
fn render_grid(view: &KeyboardView) -> String {
    let mut out = format!("{} [{} / {}]\n", view.name, view.geometry, view.layer);
    for row in view.row_numbers() {
        let caps: Vec<String> = view
            .row(row)
            .into_iter()
            .map(|cap| {
                let label = cap.label.display();
                let label = if label.is_empty() { " ".to_string() } else { label };
                if cap.held {
                    format!("[{}]", label)
                } else {
                    format!(" {} ", label)
                }
            })
            .collect();
        out.push_str(caps.join(" ").trim_end());
        out.push('\n');
    }
    out
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let settings = load_settings(&args)?;
    let mut emulation = build_emulation(&args, &settings)?;

    if let Some(layer) = args.show {
        let document = emulation
            .document()
            .get()
            .context("layout document is not loaded")?;
        let state = LayerState {
            layer,
            ..emulation.state().clone()
        };
        print!("{}", render_grid(&KeyboardView::build(&document, &state)));
        return Ok(());
    }

    replay(&mut emulation, &args.events)?;
    info!("Final layer: {}", emulation.layer());
    println!("{}", emulation.buffer().text());
    Ok(())
}
