// Ergokey Settings Module
// User configuration: keyboard geometry, plus mode and data file locations

use std::path::{Path, PathBuf};

use crate::layer::{Geometry, LayerState};

/// Settings for an ergokey session
///
/// Loaded from a TOML file (default: ~/.config/ergokey/settings.toml):
///
/// ```toml
/// [keyboard]
/// geometry = "ergodox"
/// plus = "yes"
///
/// [layout]
/// document = "layouts/ergopti.json"
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    geometry: Geometry,
    plus: bool,
    controls: bool,
    color: String,

    /// Layout version the data files describe
    version: Option<String>,
    document: Option<PathBuf>,
    magic_words: Option<PathBuf>,
    rules: Option<PathBuf>,

    /// Path to the settings file (for reload and relative paths)
    source_path: Option<PathBuf>,
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),
}

/// TOML representation for deserializing settings
#[derive(Debug, Clone, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    #[serde(default)]
    keyboard: Option<KeyboardSettings>,

    #[serde(default)]
    layout: Option<LayoutSettings>,

    #[serde(default)]
    autocorrect: Option<AutocorrectSettings>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct KeyboardSettings {
    #[serde(default)]
    geometry: Option<String>,
    #[serde(default)]
    plus: Option<toml::Value>,
    #[serde(default)]
    controls: Option<toml::Value>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct LayoutSettings {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    document: Option<PathBuf>,
    #[serde(default)]
    magic_words: Option<PathBuf>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct AutocorrectSettings {
    #[serde(default)]
    rules: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// Create settings with the default values
    pub fn new() -> Self {
        Self {
            geometry: Geometry::Iso,
            plus: false,
            controls: true,
            color: "standard".to_string(),
            version: None,
            document: None,
            magic_words: None,
            rules: None,
            source_path: None,
        }
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        Ok(settings)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut settings = Self::new();

        if let Some(keyboard) = toml_settings.keyboard {
            if let Some(geometry) = keyboard.geometry {
                settings.geometry = geometry.parse().map_err(|_| {
                    SettingsError::InvalidValue(format!("Unknown geometry '{}'", geometry))
                })?;
            }
            if let Some(plus) = keyboard.plus {
                settings.plus = parse_bool_value(&plus)?;
            }
            if let Some(controls) = keyboard.controls {
                settings.controls = parse_bool_value(&controls)?;
            }
            if let Some(color) = keyboard.color {
                settings.color = color;
            }
        }

        if let Some(layout) = toml_settings.layout {
            settings.version = layout.version;
            settings.document = layout.document;
            settings.magic_words = layout.magic_words;
        }

        if let Some(autocorrect) = toml_settings.autocorrect {
            settings.rules = autocorrect.rules;
        }

        Ok(settings)
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ergokey").join("settings.toml"))
    }

    /// Load from default location (~/.config/ergokey/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        // Return default settings if file doesn't exist
        Ok(Self::new())
    }

    /// Reload settings from the file they were loaded from
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        if let Some(ref path) = self.source_path {
            let new_settings = Self::from_file(path)?;
            *self = new_settings;
            Ok(())
        } else {
            Err(SettingsError::InvalidValue("No source path set".to_string()))
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }

    pub fn plus(&self) -> bool {
        self.plus
    }

    pub fn set_plus(&mut self, plus: bool) {
        self.plus = plus;
    }

    pub fn controls(&self) -> bool {
        self.controls
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Layout document path, resolved against the settings file directory
    pub fn document(&self) -> Option<PathBuf> {
        self.document.as_deref().map(|p| self.resolve(p))
    }

    /// Magic-word table path, resolved against the settings file directory
    pub fn magic_words(&self) -> Option<PathBuf> {
        self.magic_words.as_deref().map(|p| self.resolve(p))
    }

    /// Autocorrect rule-set path, resolved against the settings file directory
    pub fn rules(&self) -> Option<PathBuf> {
        self.rules.as_deref().map(|p| self.resolve(p))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match self.source_path.as_deref().and_then(Path::parent) {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Initial layer state of a keyboard configured by these settings
    pub fn layer_state(&self) -> LayerState {
        LayerState {
            controls: self.controls,
            color: self.color.clone(),
            ..LayerState::new(self.geometry, self.plus)
        }
    }
}

/// Parse a TOML value as a boolean
fn parse_bool_value(value: &toml::Value) -> Result<bool, SettingsError> {
    match value {
        toml::Value::Boolean(b) => Ok(*b),
        toml::Value::Integer(1) => Ok(true),
        toml::Value::Integer(0) => Ok(false),
        toml::Value::String(s) => match s.to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(SettingsError::InvalidValue(format!(
                "Cannot convert '{}' to boolean",
                s
            ))),
        },
        _ => Err(SettingsError::InvalidValue(format!(
            "Cannot convert {:?} to boolean",
            value
        ))),
    }
}

/// Create default settings content for a new installation
pub fn default_settings_content() -> &'static str {
    r#"# Ergokey Settings
# Place this file at: ~/.config/ergokey/settings.toml

[keyboard]
# Physical arrangement: "iso" or "ergodox"
geometry = "iso"
# Extended layout variant with shortcuts and autocorrect
plus = false
# Switch layers by clicking keys of the displayed keyboard
controls = true
color = "standard"

[layout]
# version = "2.2"
# document = "ergopti.json"
# magic_words = "magic.json"

[autocorrect]
# Rule set replacing the built-in one
# rules = "rules.toml"
"#
}
