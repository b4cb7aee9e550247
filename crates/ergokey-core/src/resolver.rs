// Ergokey Keystroke Resolver
// Maps (geometry, physical code, active layer) to a raw token and classifies it

use crate::layer::{Geometry, Layer};
use crate::layout::LayoutDocument;
use crate::modifier::{Flag, ModifierState};

/// Content of the autocorrect / magic key
pub const MAGIC_SYMBOL: &str = "★";

/// Raw result of resolving a physical key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Key identifier the physical code maps to
    pub key: String,
    /// Content of the key on the active layer, if defined
    pub raw: Option<String>,
}

/// Stateless lookup of key contents for physical key codes
#[derive(Debug, Clone, Copy, Default)]
pub struct KeystrokeResolver;

impl KeystrokeResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a physical key press.
    ///
    /// Returns `None` when the code has no position on `geometry`; a mapped
    /// key without content on `layer` resolves with `raw == None`.
    pub fn resolve(
        &self,
        document: &LayoutDocument,
        geometry: Geometry,
        code: &str,
        layer: Layer,
        plus: bool,
    ) -> Option<Resolution> {
        let position = document.key_for_code(geometry, code)?;
        let raw = document
            .content(&position.key)
            .and_then(|content| content.layer_content(layer, plus))
            .map(str::to_string);

        log::trace!(
            "Resolved {} -> key '{}' on {}: {:?}",
            code,
            position.key,
            layer,
            raw
        );

        Some(Resolution {
            key: position.key.clone(),
            raw,
        })
    }
}

/// What a resolved keystroke does to the text buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    BackSpace,
    CtrlBackSpace,
    Delete,
    CtrlDelete,
    Enter,
    Tab,
    /// Autocorrect symbol: expand the word before the cursor
    Magic,
}

impl Token {
    /// Classify a resolution, letting key identity override raw content.
    ///
    /// Ctrl-modified deletions win over plain ones. Returns `None` when the
    /// key has nothing to emit on the active layer.
    pub fn classify(resolution: &Resolution, modifiers: &ModifierState, plus: bool) -> Option<Token> {
        let key = resolution.key.as_str();
        let raw = resolution.raw.as_deref();
        let ctrl = modifiers.is_set(Flag::Ctrl);

        let token = if ctrl && key == "BackSpace" {
            Token::CtrlBackSpace
        } else if (ctrl && key == "Delete") || raw.is_some_and(is_ctrl_delete_content) {
            Token::CtrlDelete
        } else if key == "BackSpace" {
            Token::BackSpace
        } else if key == "Delete" {
            Token::Delete
        } else if key == "Enter" || (plus && key == "CapsLock") {
            Token::Enter
        } else if key == "Tab" {
            Token::Tab
        } else {
            match raw? {
                MAGIC_SYMBOL => Token::Magic,
                text => Token::Text(text.to_string()),
            }
        };
        Some(token)
    }
}

fn is_ctrl_delete_content(raw: &str) -> bool {
    raw.trim_matches('"') == "Ctrl + ⌦"
}
