// Ergokey Modifier State
// Raw modifier and composition flags, and the derivation of the effective layer

use std::fmt;

use strum_macros::{EnumIter, IntoStaticStr};

use crate::layer::Layer;

/// A boolean flag tracked by the emulator.
///
/// The first four are held physical modifiers; the rest are composition
/// flags armed by dead keys or by speculatively typed punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[repr(u8)]
pub enum Flag {
    Shift = 0,
    AltGr = 1,
    Alt = 2,
    Ctrl = 3,
    Circonflexe = 4,
    Trema = 5,
    Exposant = 6,
    Indice = 7,
    R = 8,
    Greek = 9,
    Currency = 10,
    #[strum(serialize = "À")]
    AGrave = 11,
    #[strum(serialize = ",")]
    Comma = 12,
}

impl Flag {
    const fn bit(self) -> u16 {
        1 << (self as u8)
    }

    /// True for the punctuation-pending kind, whose character was already typed
    pub fn is_punctuation(self) -> bool {
        matches!(self, Flag::AGrave | Flag::Comma)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &'static str = (*self).into();
        write!(f, "{}", name)
    }
}

/// Composition flags in the order they are checked for a pending one
const COMPOSITION_FLAGS: [Flag; 9] = [
    Flag::Circonflexe,
    Flag::Trema,
    Flag::Exposant,
    Flag::Indice,
    Flag::R,
    Flag::Greek,
    Flag::Currency,
    Flag::AGrave,
    Flag::Comma,
];

const COMPOSITION_MASK: u16 = {
    let mut mask = 0;
    let mut i = 0;
    while i < COMPOSITION_FLAGS.len() {
        mask |= COMPOSITION_FLAGS[i].bit();
        i += 1;
    }
    mask
};

/// Layer derivation priorities: compound conditions first, then single
/// flags. The first entry whose flags are all set wins.
const LAYER_PRIORITIES: &[(&[Flag], Layer)] = &[
    (&[Flag::AltGr, Flag::Shift], Layer::ShiftAltGr),
    (&[Flag::Circonflexe, Flag::Shift], Layer::CirconflexeShift),
    (&[Flag::Trema, Flag::Shift], Layer::TremaShift),
    (&[Flag::Exposant, Flag::Shift], Layer::ExposantShift),
    (&[Flag::Indice, Flag::Shift], Layer::IndiceShift),
    (&[Flag::R, Flag::Shift], Layer::RShift),
    (&[Flag::Greek, Flag::Shift], Layer::GreekShift),
    (&[Flag::Currency, Flag::Shift], Layer::CurrencyShift),
    (&[Flag::AltGr], Layer::AltGr),
    (&[Flag::Shift], Layer::Shift),
    (&[Flag::Ctrl], Layer::Ctrl),
    (&[Flag::Circonflexe], Layer::Circonflexe),
    (&[Flag::Trema], Layer::Trema),
    (&[Flag::Exposant], Layer::Exposant),
    (&[Flag::Indice], Layer::Indice),
    (&[Flag::R], Layer::R),
    (&[Flag::Greek], Layer::Greek),
    (&[Flag::Currency], Layer::Currency),
    (&[Flag::AGrave], Layer::AGrave),
    (&[Flag::Comma], Layer::Comma),
];

/// Raw modifier and composition flags of one emulator instance.
///
/// The state carries no history: the effective layer is a pure function of
/// the flags currently set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModifierState {
    bits: u16,
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self, flag: Flag) -> bool {
        self.bits & flag.bit() != 0
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        if value {
            self.bits |= flag.bit();
        } else {
            self.bits &= !flag.bit();
        }
    }

    /// Arm a composition flag, replacing any other pending one
    pub fn arm(&mut self, flag: Flag) {
        if let Some(previous) = self.pending() {
            if previous != flag {
                log::debug!("Arming {} replaces pending {}", flag, previous);
            }
        }
        self.bits &= !COMPOSITION_MASK;
        self.set(flag, true);
    }

    /// The composition flag currently pending, if any
    pub fn pending(&self) -> Option<Flag> {
        COMPOSITION_FLAGS.iter().copied().find(|f| self.is_set(*f))
    }

    /// Clear and return the pending composition flag
    pub fn take_pending(&mut self) -> Option<Flag> {
        let pending = self.pending()?;
        self.set(pending, false);
        Some(pending)
    }

    /// Release everything, held modifiers included
    pub fn clear(&mut self) {
        self.bits = 0;
    }

    /// Effective layer for the current flags
    pub fn layer(&self) -> Layer {
        derive_layer(self)
    }
}

/// Evaluate the layer priorities against `state`, defaulting to `Primary`
pub fn derive_layer(state: &ModifierState) -> Layer {
    LAYER_PRIORITIES
        .iter()
        .find(|(flags, _)| flags.iter().all(|f| state.is_set(*f)))
        .map(|(_, layer)| *layer)
        .unwrap_or(Layer::Primary)
}

/// Map a physical key code to the held modifier it represents.
///
/// In plus mode the right Ctrl key acts as a second Shift.
pub fn physical_modifier(code: &str, plus: bool) -> Option<Flag> {
    match code {
        "AltRight" | "AltGraph" => Some(Flag::AltGr),
        "ShiftLeft" | "ShiftRight" => Some(Flag::Shift),
        "ControlRight" if plus => Some(Flag::Shift),
        "AltLeft" => Some(Flag::Alt),
        "ControlLeft" | "ControlRight" => Some(Flag::Ctrl),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn state_with(flags: &[Flag]) -> ModifierState {
        let mut state = ModifierState::new();
        for flag in flags {
            state.set(*flag, true);
        }
        state
    }

    #[test]
    fn test_empty_state_is_primary() {
        assert_eq!(ModifierState::new().layer(), Layer::Primary);
    }

    #[test]
    fn test_compound_beats_single() {
        assert_eq!(state_with(&[Flag::Shift, Flag::AltGr]).layer(), Layer::ShiftAltGr);
        assert_eq!(
            state_with(&[Flag::Circonflexe, Flag::Shift]).layer(),
            Layer::CirconflexeShift
        );
        assert_eq!(state_with(&[Flag::Greek, Flag::Shift]).layer(), Layer::GreekShift);
    }

    #[test]
    fn test_single_flag_order() {
        assert_eq!(state_with(&[Flag::AltGr, Flag::Ctrl]).layer(), Layer::AltGr);
        assert_eq!(state_with(&[Flag::Shift, Flag::Ctrl]).layer(), Layer::Shift);
        assert_eq!(state_with(&[Flag::Ctrl, Flag::Trema]).layer(), Layer::Ctrl);
        assert_eq!(state_with(&[Flag::Comma]).layer(), Layer::Comma);
        assert_eq!(state_with(&[Flag::AGrave]).layer(), Layer::AGrave);
    }

    #[test]
    fn test_greek_sits_with_the_dead_key_layers() {
        assert_eq!(state_with(&[Flag::Greek]).layer(), Layer::Greek);
        assert_eq!(state_with(&[Flag::Greek, Flag::AltGr]).layer(), Layer::AltGr);
        assert_eq!(state_with(&[Flag::Greek, Flag::Ctrl]).layer(), Layer::Ctrl);
        assert_eq!(
            state_with(&[Flag::Greek, Flag::Shift, Flag::AltGr]).layer(),
            Layer::ShiftAltGr
        );
    }

    #[test]
    fn test_alt_alone_does_not_change_layer() {
        assert_eq!(state_with(&[Flag::Alt]).layer(), Layer::Primary);
    }

    #[test]
    fn test_derivation_has_no_history() {
        let mut state = ModifierState::new();
        state.set(Flag::Shift, true);
        state.set(Flag::AltGr, true);
        state.set(Flag::Shift, false);
        assert_eq!(state.layer(), state_with(&[Flag::AltGr]).layer());
    }

    #[test]
    fn test_every_flag_combination_yields_expected_layer() {
        let flags: Vec<Flag> = Flag::iter().collect();
        for mask in 0u32..(1 << flags.len()) {
            let mut state = ModifierState::new();
            for (i, flag) in flags.iter().enumerate() {
                state.set(*flag, mask & (1 << i) != 0);
            }
            let layer = state.layer();
            if state.is_set(Flag::AltGr) && state.is_set(Flag::Shift) {
                assert_eq!(layer, Layer::ShiftAltGr);
            }
            let mut without_alt = state;
            without_alt.set(Flag::Alt, false);
            if without_alt == ModifierState::new() {
                assert_eq!(layer, Layer::Primary);
            }
            // Alt never participates in the derivation
            assert_eq!(without_alt.layer(), layer);
        }
    }

    #[test]
    fn test_arm_replaces_previous_pending() {
        let mut state = ModifierState::new();
        state.set(Flag::Shift, true);
        state.arm(Flag::Trema);
        state.arm(Flag::Exposant);
        assert_eq!(state.pending(), Some(Flag::Exposant));
        assert!(state.is_set(Flag::Shift));
        assert_eq!(state.take_pending(), Some(Flag::Exposant));
        assert_eq!(state.pending(), None);
        assert_eq!(state.layer(), Layer::Shift);
    }

    #[test]
    fn test_physical_modifier_mapping() {
        assert_eq!(physical_modifier("AltRight", false), Some(Flag::AltGr));
        assert_eq!(physical_modifier("ShiftLeft", false), Some(Flag::Shift));
        assert_eq!(physical_modifier("ControlRight", false), Some(Flag::Ctrl));
        assert_eq!(physical_modifier("ControlRight", true), Some(Flag::Shift));
        assert_eq!(physical_modifier("ControlLeft", true), Some(Flag::Ctrl));
        assert_eq!(physical_modifier("AltLeft", true), Some(Flag::Alt));
        assert_eq!(physical_modifier("KeyA", true), None);
    }

    #[test]
    fn test_flag_kinds() {
        assert!(Flag::Comma.is_punctuation());
        assert!(!Flag::Trema.is_punctuation());
        assert_eq!(Flag::AGrave.to_string(), "À");
    }
}
