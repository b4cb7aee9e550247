// Ergokey Layer Transition Engine
// Click-driven layer switching through a versioned, data-driven transition table

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::layer::{Geometry, Layer, TransitionConfig};
use crate::layout::LayoutDocument;

/// Key present on every layer of a well-formed document; a layer without
/// content for it is not displayable.
pub const PLACEHOLDER_KEY: &str = "Option";

const BUILTIN_TRANSITIONS: &str = include_str!("../data/transitions.toml");

/// Errors that can occur when loading a transition table
#[derive(Debug, thiserror::Error)]
pub enum TransitionTableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

/// Per-key transition: current layer -> new layer, with a fallback
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransitionRule {
    pub default: Layer,
    #[serde(flatten)]
    pub by_layer: HashMap<Layer, Layer>,
}

impl TransitionRule {
    pub fn target(&self, current: Layer) -> Layer {
        self.by_layer.get(&current).copied().unwrap_or(self.default)
    }
}

/// Special-case rule evaluated after the table lookup.
///
/// Pressing `key` while on `exit`'s source layer (`enter`) leaves to `exit`;
/// otherwise, from any layer in `from` (every layer when empty), it enters
/// `enter`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Shortcut {
    pub key: String,
    pub enter: Layer,
    #[serde(default)]
    pub from: Vec<Layer>,
    #[serde(default)]
    pub exit: Option<Layer>,
    #[serde(default)]
    pub plus_only: bool,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

impl Shortcut {
    fn applies_to(&self, key: &str, config: TransitionConfig) -> bool {
        self.key == key
            && (!self.plus_only || config.plus)
            && self.geometry.map_or(true, |g| g == config.geometry)
    }

    fn target(&self, current: Layer) -> Option<Layer> {
        if current == self.enter {
            if let Some(exit) = self.exit {
                return Some(exit);
            }
        }
        if self.from.is_empty() || self.from.contains(&current) {
            return Some(self.enter);
        }
        None
    }
}

/// Versioned transition data for one layout version
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionTable {
    pub version: String,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
    #[serde(default)]
    pub mappings: IndexMap<String, TransitionRule>,
    #[serde(default)]
    pub shortcuts: Vec<Shortcut>,
}

impl TransitionTable {
    /// Transition data of the current layout version
    pub fn builtin() -> Result<Self, TransitionTableError> {
        Self::from_toml(BUILTIN_TRANSITIONS)
    }

    pub fn from_toml(content: &str) -> Result<Self, TransitionTableError> {
        toml::from_str(content).map_err(|e| TransitionTableError::TomlParse(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TransitionTableError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::builtin().unwrap_or_else(|err| {
            log::error!("Built-in transition table unavailable: {}", err);
            Self {
                version: String::new(),
                aliases: HashMap::new(),
                mappings: IndexMap::new(),
                shortcuts: Vec::new(),
            }
        })
    }
}

/// Outcome of a layer transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerChange {
    /// The layer stays the same; nothing to redraw
    Unchanged,
    Changed { from: Layer, to: Layer },
}

impl LayerChange {
    pub fn is_changed(&self) -> bool {
        matches!(self, LayerChange::Changed { .. })
    }

    /// Layer in effect after the transition
    pub fn layer(&self, current: Layer) -> Layer {
        match self {
            LayerChange::Unchanged => current,
            LayerChange::Changed { to, .. } => *to,
        }
    }
}

/// Computes the next layer when a key of the virtual keyboard is clicked
#[derive(Debug, Clone, Default)]
pub struct LayerTransitionEngine {
    table: TransitionTable,
}

impl LayerTransitionEngine {
    pub fn new(table: TransitionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Logical identity of a pressed key for transition purposes
    pub fn canonical_key<'a>(&self, pressed: &'a str, config: TransitionConfig) -> Cow<'a, str> {
        // Right Ctrl is a second Shift on ISO boards in plus mode
        if pressed == "RCtrl" && config.plus && config.geometry == Geometry::Iso {
            return Cow::Borrowed("Shift");
        }
        match self.table.aliases.get(pressed) {
            Some(alias) => Cow::Owned(alias.clone()),
            None => Cow::Borrowed(pressed),
        }
    }

    /// Candidate layer before validation against the document
    pub fn candidate(&self, pressed: &str, current: Layer, config: TransitionConfig) -> Layer {
        let key = self.canonical_key(pressed, config);

        let mut next = self
            .table
            .mappings
            .get(key.as_ref())
            .map_or(current, |rule| rule.target(current));

        for shortcut in &self.table.shortcuts {
            if !shortcut.applies_to(&key, config) {
                continue;
            }
            if let Some(target) = shortcut.target(current) {
                next = target;
            }
        }
        next
    }

    /// Next layer after clicking `pressed` while on `current`.
    ///
    /// Without a document the keyboard is inert and nothing changes.
    pub fn next_layer(
        &self,
        pressed: &str,
        current: Layer,
        config: TransitionConfig,
        document: Option<&LayoutDocument>,
    ) -> LayerChange {
        let Some(document) = document else {
            return LayerChange::Unchanged;
        };

        let mut next = self.candidate(pressed, current, config);
        if next != Layer::Visuel
            && document
                .layer_content(PLACEHOLDER_KEY, next, config.plus)
                .is_none()
        {
            log::debug!("Layer {} has no content in '{}', showing Visuel", next, document.name());
            next = Layer::Visuel;
        }

        if next == current {
            LayerChange::Unchanged
        } else {
            log::debug!("Layer transition {} -> {} (key {})", current, next, pressed);
            LayerChange::Changed {
                from: current,
                to: next,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso(plus: bool) -> TransitionConfig {
        TransitionConfig {
            geometry: Geometry::Iso,
            plus,
        }
    }

    fn ergodox(plus: bool) -> TransitionConfig {
        TransitionConfig {
            geometry: Geometry::Ergodox,
            plus,
        }
    }

    #[test]
    fn test_builtin_table_loads() {
        let table = TransitionTable::builtin().unwrap();
        assert_eq!(table.version, "2.2");
        assert_eq!(table.mappings.len(), 4);
        assert_eq!(table.mappings["Shift"].target(Layer::Comma), Layer::Shift);
        assert_eq!(table.mappings["Shift"].target(Layer::AGrave), Layer::Shift);
    }

    #[test]
    fn test_default_table_is_builtin() {
        assert_eq!(TransitionTable::default(), TransitionTable::builtin().unwrap());
    }

    #[test]
    fn test_shift_mapping() {
        let engine = LayerTransitionEngine::default();
        assert_eq!(engine.candidate("LShift", Layer::Primary, iso(false)), Layer::Shift);
        assert_eq!(engine.candidate("RShift", Layer::Shift, iso(false)), Layer::Visuel);
        assert_eq!(engine.candidate("LShift", Layer::AltGr, iso(false)), Layer::ShiftAltGr);
        assert_eq!(engine.candidate("LShift", Layer::Trema, iso(false)), Layer::TremaShift);
    }

    #[test]
    fn test_right_ctrl_canonicalisation() {
        let engine = LayerTransitionEngine::default();
        assert_eq!(engine.canonical_key("RCtrl", iso(true)), "Shift");
        assert_eq!(engine.canonical_key("RCtrl", iso(false)), "RCtrl");
        assert_eq!(engine.canonical_key("RCtrl", ergodox(true)), "RCtrl");
        assert_eq!(engine.candidate("RCtrl", Layer::Primary, iso(true)), Layer::Shift);
        assert_eq!(engine.candidate("RCtrl", Layer::Primary, iso(false)), Layer::Ctrl);
    }

    #[test]
    fn test_ralt_from_shift_is_shift_altgr() {
        let engine = LayerTransitionEngine::default();
        for config in [iso(false), iso(true), ergodox(false), ergodox(true)] {
            assert_eq!(engine.candidate("RAlt", Layer::Shift, config), Layer::ShiftAltGr);
        }
    }

    #[test]
    fn test_unmapped_key_keeps_layer() {
        let engine = LayerTransitionEngine::default();
        assert_eq!(engine.candidate("q", Layer::AltGr, iso(true)), Layer::AltGr);
    }

    #[test]
    fn test_dead_key_shortcuts() {
        let engine = LayerTransitionEngine::default();
        assert_eq!(engine.candidate("Circonflexe", Layer::Visuel, iso(false)), Layer::Circonflexe);
        assert_eq!(engine.candidate("Trema", Layer::Primary, iso(false)), Layer::Trema);
        assert_eq!(engine.candidate("Trema", Layer::Shift, iso(false)), Layer::Shift);
        assert_eq!(engine.candidate("e", Layer::ShiftAltGr, iso(false)), Layer::Exposant);
        assert_eq!(engine.candidate("u", Layer::ShiftAltGr, iso(false)), Layer::Greek);
        assert_eq!(engine.candidate("à", Layer::ShiftAltGr, iso(true)), Layer::Indice);
    }

    #[test]
    fn test_plus_toggles() {
        let engine = LayerTransitionEngine::default();
        assert_eq!(engine.candidate(",", Layer::Primary, iso(true)), Layer::Comma);
        assert_eq!(engine.candidate(",", Layer::Primary, iso(false)), Layer::Primary);
        assert_eq!(engine.candidate("à", Layer::Shift, iso(true)), Layer::AGrave);
        assert_eq!(engine.candidate("à", Layer::AGrave, iso(true)), Layer::Visuel);
        assert_eq!(engine.candidate("CapsLock", Layer::AltGr, iso(true)), Layer::Ctrl);
        assert_eq!(engine.candidate("CapsLock", Layer::Ctrl, iso(true)), Layer::Visuel);
        assert_eq!(engine.candidate("Space", Layer::Primary, ergodox(true)), Layer::Layer);
        assert_eq!(engine.candidate("Space", Layer::Layer, ergodox(true)), Layer::Visuel);
        assert_eq!(engine.candidate("Space", Layer::Primary, iso(true)), Layer::Primary);
        assert_eq!(engine.candidate("LAlt", Layer::Shift, iso(true)), Layer::Layer);
        assert_eq!(engine.candidate("LAlt", Layer::Layer, iso(true)), Layer::Visuel);
        assert_eq!(engine.candidate("LAlt", Layer::Shift, ergodox(true)), Layer::Shift);
    }

    #[test]
    fn test_no_document_is_inert() {
        let engine = LayerTransitionEngine::default();
        assert_eq!(
            engine.next_layer("LShift", Layer::Primary, iso(false), None),
            LayerChange::Unchanged
        );
    }

    #[test]
    fn test_custom_table_from_toml() {
        let table = TransitionTable::from_toml(
            r#"
version = "1.0"

[mappings.LShift]
default = "Shift"
Shift = "Primary"
"#,
        )
        .unwrap();
        let engine = LayerTransitionEngine::new(table);
        assert_eq!(engine.candidate("LShift", Layer::Shift, iso(false)), Layer::Primary);
        assert_eq!(engine.candidate("RAlt", Layer::Shift, iso(false)), Layer::Shift);
    }

    #[test]
    fn test_invalid_table_is_rejected() {
        let err = TransitionTable::from_toml("version = 2\n").unwrap_err();
        assert!(matches!(err, TransitionTableError::TomlParse(_)));
    }
}
