// Ergokey Layer Model
// Named shift-states of the virtual keyboard and the per-instance layer state

use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// A named shift-state of the virtual keyboard.
///
/// The string form of each variant is the name used as a content key in the
/// layout document (`"Shift"`, `"À"`, `","`, ...). `Comma` and `AGrave` also
/// parse from their spelled-out names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, EnumIter, IntoStaticStr, Serialize, Deserialize,
)]
pub enum Layer {
    #[default]
    Primary,
    /// Display-only overview of the primary layer
    Visuel,
    Shift,
    AltGr,
    ShiftAltGr,
    Ctrl,
    Circonflexe,
    CirconflexeShift,
    Trema,
    TremaShift,
    /// Superscript
    Exposant,
    ExposantShift,
    /// Subscript
    Indice,
    IndiceShift,
    Greek,
    GreekShift,
    R,
    RShift,
    Currency,
    CurrencyShift,
    #[strum(to_string = "À", serialize = "AGrave")]
    #[serde(rename = "À", alias = "AGrave")]
    AGrave,
    #[strum(to_string = ",", serialize = "Comma")]
    #[serde(rename = ",", alias = "Comma")]
    Comma,
    /// Navigation layer
    Layer,
}

impl Layer {
    /// Name of this layer as used in layout document content keys
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Content key for this layer, optionally the extended (`+`) variant
    pub fn content_key(self, extended: bool) -> String {
        if extended {
            format!("{}+", self.as_str())
        } else {
            self.as_str().to_string()
        }
    }

    /// Style tag key for this layer (`<layer>-style` or `<layer>+-style`)
    pub fn style_key(self, extended: bool) -> String {
        format!("{}-style", self.content_key(extended))
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Physical arrangement of the keyboard being displayed
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, EnumIter, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Geometry {
    /// Standard row-staggered ISO board
    #[default]
    Iso,
    /// Split ortholinear board with thumb clusters
    Ergodox,
}

impl Geometry {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the renderer needs to know about a virtual keyboard instance.
///
/// `layer` is only ever changed by the transition engine or by the modifier
/// derivation; the other fields are configuration set by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerState {
    pub geometry: Geometry,
    pub layer: Layer,
    pub plus: bool,
    pub color: String,
    pub controls: bool,
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            geometry: Geometry::Iso,
            layer: Layer::Primary,
            plus: false,
            color: "standard".to_string(),
            controls: true,
        }
    }
}

impl LayerState {
    pub fn new(geometry: Geometry, plus: bool) -> Self {
        Self {
            geometry,
            plus,
            ..Self::default()
        }
    }

    /// Configuration subset consumed by the transition engine
    pub fn transition_config(&self) -> TransitionConfig {
        TransitionConfig {
            geometry: self.geometry,
            plus: self.plus,
        }
    }
}

/// Geometry and mode, the inputs of layer transitions besides the key itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionConfig {
    pub geometry: Geometry,
    pub plus: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_layer_names_round_trip() {
        for layer in Layer::iter() {
            assert_eq!(Layer::from_str(layer.as_str()).unwrap(), layer);
        }
    }

    #[test]
    fn test_punctuation_layers_parse_from_aliases() {
        assert_eq!(Layer::from_str("Comma").unwrap(), Layer::Comma);
        assert_eq!(Layer::from_str(",").unwrap(), Layer::Comma);
        assert_eq!(Layer::from_str("AGrave").unwrap(), Layer::AGrave);
        assert_eq!(Layer::AGrave.to_string(), "À");
    }

    #[test]
    fn test_content_keys() {
        assert_eq!(Layer::Shift.content_key(false), "Shift");
        assert_eq!(Layer::Shift.content_key(true), "Shift+");
        assert_eq!(Layer::Comma.style_key(true), ",+-style");
    }

    #[test]
    fn test_geometry_parsing() {
        assert_eq!(Geometry::from_str("iso").unwrap(), Geometry::Iso);
        assert_eq!(Geometry::from_str("ErgoDox").unwrap(), Geometry::Ergodox);
        assert!(Geometry::from_str("ansi").is_err());
        assert_eq!(Geometry::Ergodox.to_string(), "ergodox");
    }
}
