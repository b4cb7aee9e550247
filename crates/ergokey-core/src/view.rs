// Ergokey Keyboard View
// Pure render model of the virtual keyboard for a layer state

use smallvec::SmallVec;

use crate::layer::{Geometry, Layer, LayerState};
use crate::layout::{KeyContent, KeyPosition, LayoutDocument};
use crate::resolver::MAGIC_SYMBOL;

/// Rows from this one down hold the thumb cluster, which never shows `+` content
const THUMB_ROW: u8 = 6;

/// Key category whose caps show two symbols in the overview
const PUNCTUATION_KIND: &str = "ponctuation";

/// Modifier keys shown as held
pub type HeldKeys = SmallVec<[&'static str; 4]>;

/// What a key cap displays
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KeyLabel {
    /// Nothing defined on this layer
    #[default]
    Empty,
    Text(String),
    /// AltGr symbol over the primary one
    Stacked { altgr: String, primary: String },
}

impl KeyLabel {
    /// Single-line rendering
    pub fn display(&self) -> String {
        match self {
            KeyLabel::Empty => String::new(),
            KeyLabel::Text(text) => text.clone(),
            KeyLabel::Stacked { altgr, primary } => format!("{}{}", altgr, primary),
        }
    }
}

/// One rendered key
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCap {
    pub row: u8,
    pub column: u8,
    pub key: String,
    pub finger: Option<String>,
    pub hand: Option<String>,
    pub kind: Option<String>,
    pub size: f32,
    pub label: KeyLabel,
    pub style: Option<String>,
    /// The label comes from the `+` variant
    pub plus: bool,
    /// Drawn as pressed for the current layer
    pub held: bool,
}

/// Everything a renderer needs to draw the keyboard for one state
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardView {
    pub name: String,
    pub geometry: Geometry,
    pub layer: Layer,
    pub plus: bool,
    pub color: String,
    /// Keys react to clicks
    pub clickable: bool,
    pub keys: Vec<KeyCap>,
}

impl KeyboardView {
    /// Build the view of `document` for `state`. Pure and idempotent.
    pub fn build(document: &LayoutDocument, state: &LayerState) -> Self {
        let held = Self::highlighted_keys(state);
        let keys = document
            .positions(state.geometry)
            .iter()
            .map(|position| {
                let mut cap = key_cap(document, position, state);
                cap.held = held.iter().any(|key| *key == cap.key);
                post_process(&mut cap, document, state);
                cap
            })
            .collect();

        Self {
            name: document.name().to_string(),
            geometry: state.geometry,
            layer: state.layer,
            plus: state.plus,
            color: state.color.clone(),
            clickable: state.controls,
            keys,
        }
    }

    /// Modifier keys drawn as held while `state.layer` is active
    pub fn highlighted_keys(state: &LayerState) -> HeldKeys {
        let iso = state.geometry == Geometry::Iso;
        let mut held = HeldKeys::new();

        match state.layer {
            Layer::Shift | Layer::CirconflexeShift | Layer::TremaShift | Layer::GreekShift => {
                held.extend(["LShift", "RShift"]);
            }
            Layer::ShiftAltGr => held.extend(["LShift", "RShift", "RAlt"]),
            Layer::AltGr => held.push("RAlt"),
            Layer::Ctrl => {
                held.push("LCtrl");
                if !iso {
                    held.push("RCtrl");
                } else if state.plus {
                    held.push("CapsLock");
                } else {
                    held.push("RCtrl");
                }
            }
            Layer::Layer => held.push(if iso { "LAlt" } else { "Space" }),
            _ => {}
        }

        // Right Ctrl doubles as Shift on ISO boards in plus mode
        if state.plus && iso && held.contains(&"LShift") {
            held.push("RCtrl");
        }
        held
    }

    pub fn key(&self, key: &str) -> Option<&KeyCap> {
        self.keys.iter().find(|cap| cap.key == key)
    }

    pub fn at(&self, row: u8, column: u8) -> Option<&KeyCap> {
        self.keys
            .iter()
            .find(|cap| cap.row == row && cap.column == column)
    }

    /// Distinct row numbers, ascending
    pub fn row_numbers(&self) -> Vec<u8> {
        let mut rows: Vec<u8> = self.keys.iter().map(|cap| cap.row).collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }

    /// Keys of `row`, ordered by column
    pub fn row(&self, row: u8) -> Vec<&KeyCap> {
        let mut caps: Vec<&KeyCap> = self.keys.iter().filter(|cap| cap.row == row).collect();
        caps.sort_by_key(|cap| cap.column);
        caps
    }
}

fn key_cap(document: &LayoutDocument, position: &KeyPosition, state: &LayerState) -> KeyCap {
    let content = document.content(&position.key);
    let (label, plus) = content.map_or((KeyLabel::Empty, false), |content| {
        label_for(content, state, position.row)
    });

    KeyCap {
        row: position.row,
        column: position.column,
        key: position.key.clone(),
        finger: position.finger.clone(),
        hand: position.hand.clone(),
        kind: content.and_then(KeyContent::kind).map(str::to_string),
        size: position.size,
        label,
        style: content.and_then(|content| style_for(content, state)),
        plus,
        held: false,
    }
}

fn label_for(content: &KeyContent, state: &LayerState, row: u8) -> (KeyLabel, bool) {
    let shown = if state.layer == Layer::Visuel {
        if content.kind() == Some(PUNCTUATION_KIND) {
            let altgr = content.get(Layer::AltGr.as_str()).unwrap_or_default();
            let primary = content.get(Layer::Primary.as_str()).unwrap_or_default();
            return (
                KeyLabel::Stacked {
                    altgr: altgr.to_string(),
                    primary: primary.to_string(),
                },
                false,
            );
        }
        Layer::Primary
    } else {
        if content.get(state.layer.as_str()).is_none() {
            return (KeyLabel::Empty, false);
        }
        state.layer
    };

    if state.plus && row < THUMB_ROW {
        if let Some(extended) = content.get(&shown.content_key(true)) {
            return (KeyLabel::Text(extended.to_string()), true);
        }
    }
    let label = content
        .get(shown.as_str())
        .map_or(KeyLabel::Empty, |text| KeyLabel::Text(text.to_string()));
    (label, false)
}

fn style_for(content: &KeyContent, state: &LayerState) -> Option<String> {
    if state.layer == Layer::Visuel {
        if let Some(style) = content.get(&Layer::Primary.style_key(false)) {
            return Some(style.to_string());
        }
    }
    content.style(state.layer, state.plus).map(str::to_string)
}

fn post_process(cap: &mut KeyCap, document: &LayoutDocument, state: &LayerState) {
    let iso = state.geometry == Geometry::Iso;
    match (state.layer, cap.key.as_str()) {
        (Layer::Visuel, "Space") if iso => {
            let name = if state.plus {
                format!("{} +", document.name())
            } else {
                document.name().to_string()
            };
            cap.label = KeyLabel::Text(name);
        }
        (Layer::Visuel, "magique") if state.plus => {
            cap.label = KeyLabel::Text(MAGIC_SYMBOL.to_string());
        }
        (Layer::Layer, "LAlt") if iso && state.plus => {
            cap.label = KeyLabel::Text("Layer".to_string());
        }
        (Layer::Layer, "Space") if !iso && state.plus => {
            cap.label = KeyLabel::Text("Layer".to_string());
        }
        _ => {}
    }
}

/// Receives a fresh view each time the active layer changes
pub trait LayerObserver {
    fn layer_changed(&mut self, view: &KeyboardView);
}

impl<F> LayerObserver for F
where
    F: FnMut(&KeyboardView),
{
    fn layer_changed(&mut self, view: &KeyboardView) {
        (*self)(view)
    }
}
