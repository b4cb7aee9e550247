// Ergokey TUI
// Interactive terminal surface: type through the virtual keyboard and watch its layers

#[path = "../tui/mod.rs"]
mod tui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use ergokey_core::{
    DocumentHandle, Geometry, KeyboardEmulation, LayoutDocument, MagicWordExpander,
    MagicWordTable, RuleSet, Settings, TextBufferEditor,
};

/// Interactive virtual alternative keyboard
#[derive(Parser, Debug)]
#[command(name = "ergokey-tui")]
#[command(author = "ergokey contributors")]
#[command(version = "0.3.0")]
#[command(about = "Type through a virtual alternative keyboard", long_about = None)]
struct Args {
    /// Settings file (default: ~/.config/ergokey/settings.toml)
    #[arg(short, long, value_name = "SETTINGS")]
    settings: Option<PathBuf>,

    /// Layout document (JSON)
    #[arg(short, long, value_name = "LAYOUT")]
    layout: Option<PathBuf>,

    /// Keyboard geometry: iso or ergodox
    #[arg(short, long)]
    geometry: Option<Geometry>,

    /// Start in plus mode
    #[arg(short, long)]
    plus: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    // Logs would corrupt the alternate screen unless explicitly requested
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Off)
        .parse_default_env()
        .init();

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

    let layout_path = args
        .layout
        .or_else(|| settings.document())
        .context("no layout document: pass --layout or set [layout] document")?;
    let document = LayoutDocument::from_file(&layout_path)
        .with_context(|| format!("loading layout from {}", layout_path.display()))?;

    let table = match settings.magic_words() {
        Some(path) => MagicWordTable::from_file(&path)
            .with_context(|| format!("loading magic words from {}", path.display()))?,
        None => MagicWordTable::new(),
    };
    let rules = match settings.rules() {
        Some(path) => RuleSet::from_file(&path)
            .with_context(|| format!("loading rules from {}", path.display()))?,
        None => RuleSet::builtin().context("loading built-in rules")?,
    };

    let emulation = KeyboardEmulation::new(
        DocumentHandle::with_document(document),
        settings.layer_state(),
    )
    .with_editor(TextBufferEditor::new(
        MagicWordExpander::new(table),
        rules.compile().context("compiling autocorrect rules")?,
    ));

    tui::run(emulation, settings).context("running terminal interface")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["ergokey-tui", "-l", "/tmp/ergopti.json", "-g", "ergodox", "-p"]);

        assert_eq!(args.layout, Some(PathBuf::from("/tmp/ergopti.json")));
        assert_eq!(args.geometry, Some(Geometry::Ergodox));
        assert!(args.plus);
        assert!(args.settings.is_none());
    }
}
