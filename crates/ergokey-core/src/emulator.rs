// Ergokey Keyboard Emulation
// Drives one virtual keyboard instance from physical key events

use crate::deadkey::{compose, DeadKeyKind, DeadKeyResolver};
use crate::editor::{EditReport, TextBuffer, TextBufferEditor};
use crate::layer::{Geometry, Layer, LayerState};
use crate::layout::{DocumentHandle, LayoutDocument};
use crate::modifier::{physical_modifier, Flag, ModifierState};
use crate::resolver::{KeystrokeResolver, Resolution, Token};
use crate::transition::{LayerChange, LayerTransitionEngine};
use crate::view::{KeyboardView, LayerObserver};

/// What a key-down event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// No layout document is loaded yet
    Inert,
    /// The physical code has no key on the active geometry
    Unmapped,
    /// A modifier went down; in plus mode Alt also deletes a character
    Modifier {
        flag: Flag,
        change: LayerChange,
        edit: Option<EditReport>,
    },
    /// Ctrl shortcut left to the host
    Passthrough,
    /// A dead key was armed; nothing was emitted
    DeadKey { kind: DeadKeyKind, change: LayerChange },
    /// The key has nothing to emit on the active layer
    Dropped,
    /// The buffer was edited
    Edited { token: Token, report: EditReport },
}

/// Virtual keyboard instance: layer state, held modifiers and the text buffer.
///
/// Every operation is a no-op while the document handle is empty.
pub struct KeyboardEmulation {
    document: DocumentHandle,
    state: LayerState,
    modifiers: ModifierState,
    buffer: TextBuffer,
    resolver: KeystrokeResolver,
    dead_keys: DeadKeyResolver,
    transitions: LayerTransitionEngine,
    editor: TextBufferEditor,
    observers: Vec<Box<dyn LayerObserver>>,
}

impl KeyboardEmulation {
    pub fn new(document: DocumentHandle, state: LayerState) -> Self {
        Self {
            document,
            state,
            modifiers: ModifierState::new(),
            buffer: TextBuffer::default(),
            resolver: KeystrokeResolver::new(),
            dead_keys: DeadKeyResolver::new(),
            transitions: LayerTransitionEngine::default(),
            editor: TextBufferEditor::default(),
            observers: Vec::new(),
        }
    }

    pub fn with_editor(mut self, editor: TextBufferEditor) -> Self {
        self.editor = editor;
        self
    }

    pub fn with_transitions(mut self, transitions: LayerTransitionEngine) -> Self {
        self.transitions = transitions;
        self
    }

    /// Register an observer notified with a fresh view on every layer change
    pub fn subscribe<O: LayerObserver + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    pub fn document(&self) -> &DocumentHandle {
        &self.document
    }

    pub fn state(&self) -> &LayerState {
        &self.state
    }

    pub fn modifiers(&self) -> &ModifierState {
        &self.modifiers
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }

    pub fn layer(&self) -> Layer {
        self.state.layer
    }

    /// Current view, if a document is loaded
    pub fn view(&self) -> Option<KeyboardView> {
        let document = self.document.get()?;
        Some(KeyboardView::build(&document, &self.state))
    }

    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.state.geometry = geometry;
    }

    /// Switch plus mode; held modifiers are released since their mapping changes
    pub fn set_plus(&mut self, plus: bool) {
        self.state.plus = plus;
        self.modifiers.clear();
        self.sync_layer();
    }

    pub fn set_controls(&mut self, controls: bool) {
        self.state.controls = controls;
    }

    /// Release every modifier and pending composition
    pub fn reset(&mut self) {
        self.modifiers.clear();
        self.sync_layer();
    }

    /// Physical key pressed
    pub fn key_down(&mut self, code: &str) -> KeyOutcome {
        let Some(document) = self.document.get() else {
            return KeyOutcome::Inert;
        };
        let plus = self.state.plus;

        if let Some(flag) = physical_modifier(code, plus) {
            self.modifiers.set(flag, true);
            let change = self.sync_layer_with(&document);
            let edit = (plus && flag == Flag::Alt).then(|| self.edit(&Token::BackSpace, 0));
            return KeyOutcome::Modifier { flag, change, edit };
        }

        let Some(position) = document.key_for_code(self.state.geometry, code) else {
            log::trace!("No key for {} on {}", code, self.state.geometry);
            return KeyOutcome::Unmapped;
        };

        if self.modifiers.is_set(Flag::Ctrl)
            && !self.modifiers.is_set(Flag::AltGr)
            && !is_deletion_key(&position.key)
        {
            return KeyOutcome::Passthrough;
        }

        let layer = self.modifiers.layer();
        let Some(resolution) =
            self.resolver
                .resolve(&document, self.state.geometry, code, layer, plus)
        else {
            return KeyOutcome::Unmapped;
        };

        if let Some(raw) = resolution.raw.as_deref() {
            if let Some(kind) = self.dead_keys.intercept(raw, &mut self.modifiers) {
                let change = self.sync_layer_with(&document);
                return KeyOutcome::DeadKey { kind, change };
            }
        }

        let pending = self.dead_keys.pending(&self.modifiers);
        let token = Token::classify(&resolution, &self.modifiers, plus).or_else(|| {
            pending
                .dead_key()
                .and_then(|kind| self.fallback_composition(&document, &resolution, kind))
        });
        self.dead_keys.settle(&mut self.modifiers);

        let Some(token) = token else {
            self.sync_layer_with(&document);
            return KeyOutcome::Dropped;
        };

        let report = self.edit(&token, pending.chars_to_delete);

        if plus {
            if let Token::Text(text) = &token {
                match text.as_str() {
                    "à" => self.modifiers.arm(Flag::AGrave),
                    "," => self.modifiers.arm(Flag::Comma),
                    _ => {}
                }
            }
        }
        self.sync_layer_with(&document);

        KeyOutcome::Edited { token, report }
    }

    /// Physical key released
    pub fn key_up(&mut self, code: &str) -> LayerChange {
        let Some(document) = self.document.get() else {
            return LayerChange::Unchanged;
        };
        match physical_modifier(code, self.state.plus) {
            Some(flag) => {
                self.modifiers.set(flag, false);
                self.sync_layer_with(&document)
            }
            None => LayerChange::Unchanged,
        }
    }

    /// Key of the displayed keyboard clicked
    pub fn click_key(&mut self, key: &str) -> LayerChange {
        if !self.state.controls {
            return LayerChange::Unchanged;
        }
        let Some(document) = self.document.get() else {
            return LayerChange::Unchanged;
        };
        let change = self.transitions.next_layer(
            key,
            self.state.layer,
            self.state.transition_config(),
            Some(&document),
        );
        if let LayerChange::Changed { to, .. } = change {
            self.state.layer = to;
            self.notify(&document);
        }
        change
    }

    fn edit(&mut self, token: &Token, chars_to_delete: usize) -> EditReport {
        self.editor
            .apply(&mut self.buffer, token, chars_to_delete, self.state.plus)
    }

    /// Compose the accent with the key's base content when its dead-key layer is empty
    fn fallback_composition(
        &self,
        document: &LayoutDocument,
        resolution: &Resolution,
        kind: DeadKeyKind,
    ) -> Option<Token> {
        let base_layer = if self.modifiers.is_set(Flag::Shift) {
            Layer::Shift
        } else {
            Layer::Primary
        };
        let base = document.layer_content(&resolution.key, base_layer, false)?;
        let composed = compose(kind, base)?;
        log::debug!("Composed {:?} + '{}' -> '{}'", kind, base, composed);
        Some(Token::Text(composed.to_string()))
    }

    fn sync_layer(&mut self) -> LayerChange {
        match self.document.get() {
            Some(document) => self.sync_layer_with(&document),
            None => LayerChange::Unchanged,
        }
    }

    /// Re-derive the layer from the modifier flags, notifying on change
    fn sync_layer_with(&mut self, document: &LayoutDocument) -> LayerChange {
        let next = self.modifiers.layer();
        if next == self.state.layer {
            return LayerChange::Unchanged;
        }
        let from = self.state.layer;
        self.state.layer = next;
        log::debug!("Layer {} -> {}", from, next);
        self.notify(document);
        LayerChange::Changed { from, to: next }
    }

    fn notify(&mut self, document: &LayoutDocument) {
        if self.observers.is_empty() {
            return;
        }
        let view = KeyboardView::build(document, &self.state);
        for observer in &mut self.observers {
            observer.layer_changed(&view);
        }
    }
}

/// Keys still handled while Ctrl is held
fn is_deletion_key(key: &str) -> bool {
    matches!(key, "BackSpace" | "Delete")
}
