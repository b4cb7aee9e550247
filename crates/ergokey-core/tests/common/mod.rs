// Shared fixtures for ergokey integration tests
#![allow(dead_code)]

use ergokey_core::{
    AutocorrectPipeline, DocumentHandle, Geometry, KeyOutcome, KeyboardEmulation, LayerState,
    LayoutDocument, MagicWordExpander, MagicWordTable, TextBufferEditor,
};

/// Small layout covering both geometries, plus variants, dead keys and the
/// `Option` placeholder (missing on the R layer on purpose).
pub const LAYOUT: &str = r#"{
    "name": "Ergopti",
    "iso": [
        {"row": 1, "column": 0, "key": "Option"},
        {"row": 3, "column": 1, "key": "a", "code": "KeyA", "finger": 2, "hand": "left"},
        {"row": 3, "column": 2, "key": "e", "code": "KeyE", "finger": 3, "hand": "left"},
        {"row": 3, "column": 3, "key": "d", "code": "KeyD", "finger": 4, "hand": "left"},
        {"row": 3, "column": 4, "key": "t", "code": "KeyT", "finger": 5, "hand": "left"},
        {"row": 3, "column": 5, "key": "s", "code": "KeyS", "finger": 5, "hand": "left"},
        {"row": 4, "column": 1, "key": "c", "code": "KeyC", "finger": 2, "hand": "left"},
        {"row": 4, "column": 2, "key": "x", "code": "KeyX", "finger": 3, "hand": "left"},
        {"row": 4, "column": 3, "key": ",", "code": "Comma", "finger": 4, "hand": "right"},
        {"row": 4, "column": 4, "key": "'", "code": "Quote", "finger": 5, "hand": "right"},
        {"row": 4, "column": 5, "key": "magique", "code": "KeyM", "finger": 2, "hand": "right"},
        {"row": 2, "column": 13, "key": "BackSpace", "code": "Backspace", "size": 2},
        {"row": 2, "column": 14, "key": "Delete", "code": "Delete"},
        {"row": 3, "column": 13, "key": "Enter", "code": "Enter", "size": 1.5},
        {"row": 3, "column": 0, "key": "Tab", "code": "Tab", "size": 1.5},
        {"row": 4, "column": 0, "key": "CapsLock", "code": "CapsLock", "size": 1.75},
        {"row": 5, "column": 0, "key": "LShift", "code": "ShiftLeft"},
        {"row": 5, "column": 12, "key": "RShift", "code": "ShiftRight"},
        {"row": 6, "column": 0, "key": "LCtrl", "code": "ControlLeft"},
        {"row": 6, "column": 2, "key": "LAlt", "code": "AltLeft"},
        {"row": 6, "column": 3, "key": "Space", "code": "Space", "size": 6},
        {"row": 6, "column": 4, "key": "RAlt", "code": "AltRight"},
        {"row": 6, "column": 6, "key": "RCtrl", "code": "ControlRight"}
    ],
    "ergodox": [
        {"row": 1, "column": 0, "key": "Option"},
        {"row": 3, "column": 2, "key": "a", "code": "KeyA"},
        {"row": 3, "column": 3, "key": "e", "code": "KeyE"},
        {"row": 3, "column": 4, "key": "d", "code": "KeyD"},
        {"row": 3, "column": 5, "key": "t", "code": "KeyT"},
        {"row": 3, "column": 6, "key": "s", "code": "KeyS"},
        {"row": 4, "column": 2, "key": "c", "code": "KeyC"},
        {"row": 4, "column": 9, "key": "magique", "code": "KeyM"},
        {"row": 5, "column": 1, "key": "LShift", "code": "ShiftLeft"},
        {"row": 7, "column": 3, "key": "Space", "code": "Space"},
        {"row": 7, "column": 4, "key": "RAlt", "code": "AltRight"},
        {"row": 7, "column": 8, "key": "BackSpace", "code": "Backspace"}
    ],
    "keys": [
        {"key": "Option", "type": "special", "Primary": "⚙", "Shift": "⚙", "AltGr": "⚙",
         "ShiftAltGr": "⚙", "Ctrl": "⚙", "Circonflexe": "⚙", "CirconflexeShift": "⚙",
         "Trema": "⚙", "Exposant": "⚙", "Greek": "⚙", "À": "⚙", ",": "⚙", "Layer": "⚙"},
        {"key": "a", "type": "lettre", "Primary": "a", "Primary-style": "vowel", "Shift": "A",
         "AltGr": "æ", "ShiftAltGr": "Æ", "Circonflexe": "â", "CirconflexeShift": "Â",
         "Trema": "ä", "Exposant": "ᵃ", ",": "au"},
        {"key": "e", "type": "lettre", "Primary": "e", "Shift": "E", "Trema": "ë"},
        {"key": "d", "type": "lettre", "Primary": "d", "Shift": "D", "AltGr": "◌̂"},
        {"key": "t", "type": "lettre", "Primary": "t", "Shift": "T", "AltGr": "◌̈"},
        {"key": "s", "type": "lettre", "Primary": "s", "Shift": "S"},
        {"key": "c", "type": "lettre", "Primary": "c", "Shift": "C", ",": "ç"},
        {"key": "x", "type": "lettre", "Primary": "x", "Shift": "X", "ShiftAltGr": "ᵉ"},
        {"key": ",", "type": "ponctuation", "Primary": ",", "AltGr": ";", "Shift": ";"},
        {"key": "'", "type": "ponctuation", "Primary": "'", "AltGr": "’"},
        {"key": "magique", "type": "lettre", "Primary": "j", "Primary+": "★", "Shift": "J"},
        {"key": "BackSpace", "type": "special", "Primary": "⌫"},
        {"key": "Delete", "type": "special", "Primary": "⌦"},
        {"key": "Enter", "type": "special", "Primary": "⏎"},
        {"key": "Tab", "type": "special", "Primary": "↹"},
        {"key": "CapsLock", "type": "special", "Primary": "⇪", "Primary+": "⏎"},
        {"key": "Space", "type": "special", "Primary": "␣", ",": ",<espace-insecable></espace-insecable>"}
    ]
}"#;

pub fn document() -> LayoutDocument {
    LayoutDocument::from_json(LAYOUT).expect("fixture layout parses")
}

pub fn magic_table() -> MagicWordTable {
    MagicWordTable::from_pairs([("a", "ainsi"), ("pe", "peut-être"), ("bcp", "beaucoup")])
}

pub fn editor() -> TextBufferEditor {
    TextBufferEditor::new(
        MagicWordExpander::new(magic_table()),
        AutocorrectPipeline::builtin().expect("built-in rules compile"),
    )
}

/// Emulator with the fixture document already loaded
pub fn emulation(geometry: Geometry, plus: bool) -> KeyboardEmulation {
    KeyboardEmulation::new(
        DocumentHandle::with_document(document()),
        LayerState::new(geometry, plus),
    )
    .with_editor(editor())
}

/// Replay events: `KeyA` taps a key, `+ShiftLeft` presses, `-ShiftLeft` releases
pub fn play(emulation: &mut KeyboardEmulation, events: &[&str]) -> Vec<KeyOutcome> {
    let mut outcomes = Vec::new();
    for event in events {
        if let Some(code) = event.strip_prefix('+') {
            outcomes.push(emulation.key_down(code));
        } else if let Some(code) = event.strip_prefix('-') {
            emulation.key_up(code);
        } else {
            outcomes.push(emulation.key_down(event));
            emulation.key_up(event);
        }
    }
    outcomes
}

pub fn text(emulation: &KeyboardEmulation) -> &str {
    emulation.buffer().text()
}
