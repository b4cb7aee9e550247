// Ergokey Dead Key Resolution
// Detects composition markers, arms pending state and settles it on the next keystroke

use std::collections::HashMap;

use crate::modifier::{Flag, ModifierState};

/// Composition armed by a dead-key marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeadKeyKind {
    Circonflexe,
    Trema,
    Exposant,
    Indice,
    Greek,
    R,
    Currency,
}

impl DeadKeyKind {
    /// Marker emitted by the layout for this dead key
    pub fn marker(self) -> &'static str {
        match self {
            Self::Circonflexe => "◌̂",
            Self::Trema => "◌̈",
            Self::Exposant => "ᵉ",
            Self::Indice => "ᵢ",
            Self::Greek => "µ",
            Self::R => "ℝ",
            Self::Currency => "¤",
        }
    }

    /// Flag armed in the modifier state
    pub fn flag(self) -> Flag {
        match self {
            Self::Circonflexe => Flag::Circonflexe,
            Self::Trema => Flag::Trema,
            Self::Exposant => Flag::Exposant,
            Self::Indice => Flag::Indice,
            Self::Greek => Flag::Greek,
            Self::R => Flag::R,
            Self::Currency => Flag::Currency,
        }
    }

    pub fn from_flag(flag: Flag) -> Option<Self> {
        match flag {
            Flag::Circonflexe => Some(Self::Circonflexe),
            Flag::Trema => Some(Self::Trema),
            Flag::Exposant => Some(Self::Exposant),
            Flag::Indice => Some(Self::Indice),
            Flag::Greek => Some(Self::Greek),
            Flag::R => Some(Self::R),
            Flag::Currency => Some(Self::Currency),
            _ => None,
        }
    }

    const ALL: [DeadKeyKind; 7] = [
        Self::Circonflexe,
        Self::Trema,
        Self::Exposant,
        Self::Indice,
        Self::Greek,
        Self::R,
        Self::Currency,
    ];
}

/// What the keystroke being processed must do about a pending composition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingComposition {
    /// Flag pending before this keystroke
    pub flag: Option<Flag>,
    /// Characters to delete before inserting this keystroke's output
    pub chars_to_delete: usize,
}

impl PendingComposition {
    pub fn dead_key(&self) -> Option<DeadKeyKind> {
        self.flag.and_then(DeadKeyKind::from_flag)
    }
}

/// Recognises dead-key markers in resolved tokens
#[derive(Debug, Clone)]
pub struct DeadKeyResolver {
    markers: HashMap<String, DeadKeyKind>,
}

impl Default for DeadKeyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DeadKeyResolver {
    /// Resolver for the built-in marker set
    pub fn new() -> Self {
        let markers = DeadKeyKind::ALL
            .iter()
            .map(|kind| (kind.marker().to_string(), *kind))
            .collect();
        Self { markers }
    }

    pub fn kind_of(&self, token: &str) -> Option<DeadKeyKind> {
        self.markers.get(token).copied()
    }

    /// Arm the dead key named by `token`, if it is a marker.
    ///
    /// Returns the armed kind; the caller must suppress emission for this
    /// keystroke and re-derive the layer.
    pub fn intercept(&self, token: &str, modifiers: &mut ModifierState) -> Option<DeadKeyKind> {
        let kind = self.kind_of(token)?;
        modifiers.arm(kind.flag());
        log::debug!("Dead key {:?} armed", kind);
        Some(kind)
    }

    /// Inspect the pending composition before resolving a keystroke
    pub fn pending(&self, modifiers: &ModifierState) -> PendingComposition {
        match modifiers.pending() {
            Some(flag) => PendingComposition {
                flag: Some(flag),
                chars_to_delete: usize::from(flag.is_punctuation()),
            },
            None => PendingComposition::default(),
        }
    }

    /// Clear the pending composition once the keystroke has been resolved
    pub fn settle(&self, modifiers: &mut ModifierState) -> Option<Flag> {
        modifiers.take_pending()
    }
}

/// Compose an accent with a base letter when the layout defines no content
/// for it on the dead-key layer.
pub fn compose(kind: DeadKeyKind, base: &str) -> Option<char> {
    let mut chars = base.chars();
    let letter = chars.next()?;
    if chars.next().is_some() {
        return None;
    }

    let out = match kind {
        DeadKeyKind::Circonflexe => match letter {
            'a' => 'â',
            'e' => 'ê',
            'i' => 'î',
            'o' => 'ô',
            'u' => 'û',
            'y' => 'ŷ',
            'A' => 'Â',
            'E' => 'Ê',
            'I' => 'Î',
            'O' => 'Ô',
            'U' => 'Û',
            'Y' => 'Ŷ',
            _ => return None,
        },
        DeadKeyKind::Trema => match letter {
            'a' => 'ä',
            'e' => 'ë',
            'i' => 'ï',
            'o' => 'ö',
            'u' => 'ü',
            'y' => 'ÿ',
            'A' => 'Ä',
            'E' => 'Ë',
            'I' => 'Ï',
            'O' => 'Ö',
            'U' => 'Ü',
            'Y' => 'Ÿ',
            _ => return None,
        },
        _ => return None,
    };

    Some(out)
}
