// Ergokey Magic Word Expander
// Case-aware expansion of the word before the cursor, triggered by the magic key

use std::collections::HashMap;
use std::path::Path;

use crate::editor::TextBuffer;

/// Errors that can occur when loading a magic-word table
#[derive(Debug, thiserror::Error)]
pub enum MagicTableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Word -> expansion table, looked up case-insensitively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MagicWordTable {
    entries: HashMap<String, String>,
}

impl MagicWordTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(word, expansion)| (word.as_ref().to_lowercase(), expansion.into()))
            .collect();
        Self { entries }
    }

    /// Parse a JSON object mapping words to expansions
    pub fn from_json(content: &str) -> Result<Self, MagicTableError> {
        let raw: HashMap<String, String> = serde_json::from_str(content)?;
        Ok(Self::from_pairs(raw))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MagicTableError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn get(&self, word: &str) -> Option<&str> {
        self.entries.get(&word.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Case pattern of the word being expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCase {
    Upper,
    Title,
    Lower,
}

impl WordCase {
    /// Classify a typed word. Single letters always count as lowercase.
    pub fn of(word: &str) -> Self {
        if word.chars().count() <= 1 {
            return WordCase::Lower;
        }
        if word == word.to_uppercase() {
            WordCase::Upper
        } else if word == title_case(word) {
            WordCase::Title
        } else {
            WordCase::Lower
        }
    }

    pub fn apply(self, text: &str) -> String {
        match self {
            WordCase::Upper => text.to_uppercase(),
            WordCase::Title => title_case(text),
            WordCase::Lower => text.to_lowercase(),
        }
    }
}

fn title_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

/// Result of pressing the magic key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// The word before the cursor was replaced
    Replaced { word: String, replacement: String },
    /// No entry: the previous character was repeated
    Repeated(char),
    /// Nothing before the cursor
    Nothing,
}

/// Expands the word before the cursor using a magic-word table
#[derive(Debug, Clone, Default)]
pub struct MagicWordExpander {
    table: MagicWordTable,
}

impl MagicWordExpander {
    pub fn new(table: MagicWordTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &MagicWordTable {
        &self.table
    }

    pub fn expand(&self, buffer: &mut TextBuffer) -> Expansion {
        let before = buffer.before_cursor();
        let word_start = before
            .char_indices()
            .rev()
            .take_while(|(_, c)| !c.is_whitespace())
            .last()
            .map_or(before.len(), |(i, _)| i);
        let word = &before[word_start..];

        if let Some(expansion) = self.table.get(word) {
            let replacement = WordCase::of(word).apply(expansion);
            let word = word.to_string();
            let start = buffer.cursor() - word.chars().count();
            buffer.replace_range(start, buffer.cursor(), &replacement);
            buffer.set_cursor(start + replacement.chars().count());
            log::debug!("Magic expansion '{}' -> '{}'", word, replacement);
            return Expansion::Replaced { word, replacement };
        }

        match before.chars().next_back() {
            Some(previous) => {
                buffer.insert(&previous.to_string());
                Expansion::Repeated(previous)
            }
            None => Expansion::Nothing,
        }
    }
}
