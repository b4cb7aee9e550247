// Ergokey Layout Document
// Static per-layout data: key positions per geometry and per-key layer contents

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer};

use crate::layer::{Geometry, Layer};

/// Errors that can occur when loading a layout document
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid layout document: {0}")]
    Invalid(String),
}

/// Where a key sits on one geometry, and which physical code produces it
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyPosition {
    pub row: u8,
    pub column: u8,
    /// Key identifier, shared with the `keys` contents table
    pub key: String,
    /// Physical key code (`KeyA`, `ShiftLeft`, ...) when the key exists on a real board
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub finger: Option<String>,
    #[serde(default)]
    pub hand: Option<String>,
    #[serde(default = "default_size", deserialize_with = "size_value")]
    pub size: f32,
}

fn default_size() -> f32 {
    1.0
}

/// Accept both `"2"` and `2` for loosely typed fields
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn size_value<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => Ok(n.as_f64().unwrap_or(1.0) as f32),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f32>()
            .map_err(|e| serde::de::Error::custom(format!("invalid key size '{}': {}", s, e))),
        _ => Ok(default_size()),
    }
}

/// Everything a key can show or emit, indexed by content name.
///
/// Content names are a layer name (`"Shift"`), its extended variant
/// (`"Shift+"`) or a style tag (`"Shift-style"`, `"Shift+-style"`).
#[derive(Debug, Clone, PartialEq)]
pub struct KeyContent {
    key: String,
    kind: Option<String>,
    values: IndexMap<String, String>,
}

impl KeyContent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: None,
            values: IndexMap::new(),
        }
    }

    /// Builder used by tests and by hosts assembling documents in code
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key category (`"ponctuation"`, `"special"`, ...)
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Raw lookup by content name; empty strings count as undefined
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Content of this key on `layer`, preferring the `+` variant in plus mode
    pub fn layer_content(&self, layer: Layer, plus: bool) -> Option<&str> {
        if plus {
            if let Some(extended) = self.get(&layer.content_key(true)) {
                return Some(extended);
            }
        }
        self.get(layer.as_str())
    }

    /// Style tag of this key on `layer`
    pub fn style(&self, layer: Layer, plus: bool) -> Option<&str> {
        if plus {
            if let Some(style) = self.get(&layer.style_key(true)) {
                return Some(style);
            }
        }
        self.get(&layer.style_key(false))
    }
}

#[derive(Debug, Deserialize)]
struct RawKeyContent {
    key: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(flatten)]
    values: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawLayoutDocument {
    name: String,
    #[serde(default)]
    iso: Vec<KeyPosition>,
    #[serde(default)]
    ergodox: Vec<KeyPosition>,
    #[serde(default)]
    keys: Vec<RawKeyContent>,
}

/// Static per-layout data, immutable once loaded
#[derive(Debug, Clone)]
pub struct LayoutDocument {
    name: String,
    positions: IndexMap<Geometry, Vec<KeyPosition>>,
    contents: IndexMap<String, KeyContent>,
    /// (geometry, physical code) -> index into `positions[geometry]`
    by_code: HashMap<(Geometry, String), usize>,
}

impl LayoutDocument {
    /// Assemble a document from already-parsed parts
    pub fn new(
        name: impl Into<String>,
        positions: IndexMap<Geometry, Vec<KeyPosition>>,
        contents: Vec<KeyContent>,
    ) -> Self {
        let mut by_code = HashMap::new();
        for (geometry, list) in &positions {
            for (index, position) in list.iter().enumerate() {
                let Some(code) = &position.code else {
                    continue;
                };
                match by_code.entry((*geometry, code.clone())) {
                    Entry::Vacant(slot) => {
                        slot.insert(index);
                    }
                    Entry::Occupied(_) => log::warn!(
                        "Physical code {} appears more than once on {}, keeping the first one",
                        code,
                        geometry
                    ),
                }
            }
        }

        let contents = contents
            .into_iter()
            .map(|content| (content.key.clone(), content))
            .collect();

        Self {
            name: name.into(),
            positions,
            contents,
            by_code,
        }
    }

    /// Parse a layout document from its JSON representation
    pub fn from_json(content: &str) -> Result<Self, LayoutError> {
        let raw: RawLayoutDocument = serde_json::from_str(content)?;

        if raw.iso.is_empty() && raw.ergodox.is_empty() {
            return Err(LayoutError::Invalid(format!(
                "layout '{}' defines no key positions",
                raw.name
            )));
        }

        let mut positions = IndexMap::new();
        if !raw.iso.is_empty() {
            positions.insert(Geometry::Iso, raw.iso);
        }
        if !raw.ergodox.is_empty() {
            positions.insert(Geometry::Ergodox, raw.ergodox);
        }

        let contents = raw
            .keys
            .into_iter()
            .map(|raw_key| {
                let values = raw_key
                    .values
                    .into_iter()
                    .filter_map(|(name, value)| match value {
                        serde_json::Value::String(s) => Some((name, s)),
                        serde_json::Value::Number(n) => Some((name, n.to_string())),
                        _ => None,
                    })
                    .collect();
                KeyContent {
                    key: raw_key.key,
                    kind: raw_key.kind,
                    values,
                }
            })
            .collect();

        let document = Self::new(raw.name, positions, contents);
        log::debug!(
            "Loaded layout '{}' ({} keys, geometries: {:?})",
            document.name,
            document.contents.len(),
            document.positions.keys().collect::<Vec<_>>()
        );
        Ok(document)
    }

    /// Load a layout document from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LayoutError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All positions of a geometry, in document order
    pub fn positions(&self, geometry: Geometry) -> &[KeyPosition] {
        self.positions
            .get(&geometry)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Position producing the physical `code` on `geometry`
    pub fn key_for_code(&self, geometry: Geometry, code: &str) -> Option<&KeyPosition> {
        let index = *self.by_code.get(&(geometry, code.to_string()))?;
        self.positions.get(&geometry)?.get(index)
    }

    /// Contents of a key identifier
    pub fn content(&self, key: &str) -> Option<&KeyContent> {
        self.contents.get(key)
    }

    /// Shortcut for `content(key)?.layer_content(layer, plus)`
    pub fn layer_content(&self, key: &str, layer: Layer, plus: bool) -> Option<&str> {
        self.content(key)?.layer_content(layer, plus)
    }
}

/// Shared slot for a document that is loaded asynchronously.
///
/// Until a document is set, every consumer treats the keyboard as inert.
#[derive(Debug, Clone, Default)]
pub struct DocumentHandle {
    slot: Arc<RwLock<Option<Arc<LayoutDocument>>>>,
}

impl DocumentHandle {
    /// Create an empty handle (document not yet available)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a handle already holding `document`
    pub fn with_document(document: LayoutDocument) -> Self {
        let handle = Self::empty();
        handle.set(document);
        handle
    }

    /// Publish a loaded document to every holder of this handle
    pub fn set(&self, document: LayoutDocument) {
        *self.slot.write() = Some(Arc::new(document));
    }

    pub fn clear(&self) {
        *self.slot.write() = None;
    }

    /// Snapshot of the current document, if loaded
    pub fn get(&self) -> Option<Arc<LayoutDocument>> {
        self.slot.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.slot.read().is_some()
    }
}
