// Ergokey Core Library
// Layer switching, key resolution and text editing for a virtual alternative keyboard

pub mod autocorrect;
pub mod deadkey;
pub mod editor;
pub mod emulator;
pub mod layer;
pub mod layout;
pub mod magic;
pub mod modifier;
pub mod resolver;
pub mod settings;
pub mod transition;
pub mod view;

pub use autocorrect::{
    AutocorrectPipeline, Correction, DoubledLetterRule, Edit, LiteralRule, RegexRule, RuleSet,
    RuleSetError, Substitution,
};
pub use deadkey::{DeadKeyKind, DeadKeyResolver, PendingComposition};
pub use editor::{EditReport, TextBuffer, TextBufferEditor};
pub use emulator::{KeyOutcome, KeyboardEmulation};
pub use layer::{Geometry, Layer, LayerState, TransitionConfig};
pub use layout::{DocumentHandle, KeyContent, KeyPosition, LayoutDocument, LayoutError};
pub use magic::{Expansion, MagicTableError, MagicWordExpander, MagicWordTable, WordCase};
pub use modifier::{derive_layer, physical_modifier, Flag, ModifierState};
pub use resolver::{KeystrokeResolver, Resolution, Token, MAGIC_SYMBOL};
pub use settings::{Settings, SettingsError};
pub use transition::{
    LayerChange, LayerTransitionEngine, TransitionTable, TransitionTableError, PLACEHOLDER_KEY,
};
pub use view::{KeyCap, KeyLabel, KeyboardView, LayerObserver};
