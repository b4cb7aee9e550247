// Ergokey Text Buffer Editor
// Applies resolved tokens to a text buffer and keeps the cursor consistent

use std::sync::LazyLock;

use regex::Regex;

use crate::autocorrect::AutocorrectPipeline;
use crate::magic::{Expansion, MagicWordExpander};
use crate::resolver::Token;

/// Editable text with a cursor expressed in characters.
///
/// Invariant: `0 <= cursor <= text.chars().count()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
}

impl TextBuffer {
    /// Create a buffer, clamping the cursor into the text
    pub fn new(text: impl Into<String>, cursor: usize) -> Self {
        let text = text.into();
        let cursor = cursor.min(text.chars().count());
        Self { text, cursor }
    }

    /// Create a buffer with the cursor at the end
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.len());
    }

    /// Replace the whole content, clamping the cursor
    pub fn set(&mut self, text: impl Into<String>, cursor: usize) {
        *self = Self::new(text, cursor);
    }

    pub fn before_cursor(&self) -> &str {
        &self.text[..self.byte_index(self.cursor)]
    }

    pub fn after_cursor(&self) -> &str {
        &self.text[self.byte_index(self.cursor)..]
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    /// Insert at the cursor and move the cursor past the insertion
    pub fn insert(&mut self, text: &str) {
        let at = self.byte_index(self.cursor);
        self.text.insert_str(at, text);
        self.cursor += text.chars().count();
    }

    /// Delete up to `count` characters before the cursor, returning how many went
    pub fn delete_before(&mut self, count: usize) -> usize {
        let count = count.min(self.cursor);
        let start = self.byte_index(self.cursor - count);
        let end = self.byte_index(self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor -= count;
        count
    }

    /// Delete up to `count` characters after the cursor, returning how many went
    pub fn delete_after(&mut self, count: usize) -> usize {
        let count = count.min(self.len() - self.cursor);
        let start = self.byte_index(self.cursor);
        let end = self.byte_index(self.cursor + count);
        self.text.replace_range(start..end, "");
        count
    }

    /// Replace the characters in `start..end` without touching the cursor
    pub fn replace_range(&mut self, start: usize, end: usize, replacement: &str) {
        let len = self.len();
        let (start, end) = (start.min(len), end.min(len));
        let (start, end) = (self.byte_index(start), self.byte_index(end.max(start)));
        self.text.replace_range(start..end, replacement);
        self.cursor = self.cursor.min(self.len());
    }
}

static NON_BREAKING_SPACE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<espace-insecable></espace-insecable>").expect("valid regex"));
static TAP_HOLD_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<tap-hold>.*</tap-hold>").expect("valid regex"));

/// Strip markup that only exists for display purposes
pub fn clean_markup(text: &str) -> String {
    let text = NON_BREAKING_SPACE_TAG.replace_all(text, " ");
    let text = TAP_HOLD_TAG.replace_all(&text, "");
    text.replace('␣', " ")
}

/// Summary of one applied edit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditReport {
    /// Characters removed for a pending punctuation before applying the token
    pub prefix_deleted: usize,
    /// Magic key outcome, when the token was the magic key
    pub expansion: Option<Expansion>,
    /// Number of autocorrect substitutions applied afterwards
    pub autocorrections: usize,
}

/// Applies tokens to a text buffer, running autocorrect in plus mode
#[derive(Debug, Clone, Default)]
pub struct TextBufferEditor {
    magic: MagicWordExpander,
    autocorrect: AutocorrectPipeline,
}

impl TextBufferEditor {
    pub fn new(magic: MagicWordExpander, autocorrect: AutocorrectPipeline) -> Self {
        Self { magic, autocorrect }
    }

    pub fn magic(&self) -> &MagicWordExpander {
        &self.magic
    }

    pub fn autocorrect(&self) -> &AutocorrectPipeline {
        &self.autocorrect
    }

    /// Apply `token` after deleting `chars_to_delete` characters before the cursor
    pub fn apply(
        &self,
        buffer: &mut TextBuffer,
        token: &Token,
        chars_to_delete: usize,
        plus: bool,
    ) -> EditReport {
        let mut report = EditReport {
            prefix_deleted: buffer.delete_before(chars_to_delete),
            ..EditReport::default()
        };

        match token {
            Token::BackSpace => {
                buffer.delete_before(1);
            }
            Token::CtrlBackSpace => {
                let count = previous_word_len(buffer.before_cursor());
                buffer.delete_before(count);
            }
            Token::Delete => {
                buffer.delete_after(1);
            }
            Token::CtrlDelete => {
                let count = next_word_len(buffer.after_cursor());
                buffer.delete_after(count);
            }
            Token::Enter => buffer.insert("\n"),
            Token::Tab => buffer.insert("\t"),
            Token::Magic => report.expansion = Some(self.magic.expand(buffer)),
            Token::Text(text) => buffer.insert(&clean_markup(text)),
        }

        if plus {
            report.autocorrections = self.autocorrect.apply_to(buffer);
        }
        report
    }
}

/// Characters removed by Ctrl-BackSpace: trailing whitespace then the word before it
fn previous_word_len(before: &str) -> usize {
    let mut chars = before.chars().rev().peekable();
    let mut count = 0;
    while chars.next_if(|c| c.is_whitespace()).is_some() {
        count += 1;
    }
    while chars.next_if(|c| !c.is_whitespace()).is_some() {
        count += 1;
    }
    count
}

/// Characters removed by Ctrl-Delete: the next word then its trailing whitespace
fn next_word_len(after: &str) -> usize {
    let mut chars = after.chars().peekable();
    let mut count = 0;
    while chars.next_if(|c| !c.is_whitespace()).is_some() {
        count += 1;
    }
    while chars.next_if(|c| c.is_whitespace()).is_some() {
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::magic::MagicWordTable;

    fn editor() -> TextBufferEditor {
        TextBufferEditor::new(
            MagicWordExpander::new(MagicWordTable::from_pairs([("a", "ainsi")])),
            AutocorrectPipeline::builtin().unwrap(),
        )
    }

    fn apply(buffer: &mut TextBuffer, token: Token) -> EditReport {
        editor().apply(buffer, &token, 0, false)
    }

    #[test]
    fn test_buffer_clamps_cursor() {
        let buffer = TextBuffer::new("abc", 10);
        assert_eq!(buffer.cursor(), 3);
        assert_eq!(buffer.before_cursor(), "abc");
        assert_eq!(buffer.after_cursor(), "");
    }

    #[test]
    fn test_buffer_counts_characters_not_bytes() {
        let mut buffer = TextBuffer::new("été", 1);
        assert_eq!(buffer.before_cursor(), "é");
        buffer.insert("ô");
        assert_eq!(buffer.text(), "éôté");
        assert_eq!(buffer.cursor(), 2);
        assert_eq!(buffer.delete_before(5), 2);
        assert_eq!(buffer.text(), "té");
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut buffer = TextBuffer::new("abcd", 2);
        apply(&mut buffer, Token::BackSpace);
        assert_eq!((buffer.text(), buffer.cursor()), ("acd", 1));
        apply(&mut buffer, Token::Delete);
        assert_eq!((buffer.text(), buffer.cursor()), ("ad", 1));
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut buffer = TextBuffer::new("abc", 0);
        apply(&mut buffer, Token::BackSpace);
        assert_eq!((buffer.text(), buffer.cursor()), ("abc", 0));
    }

    #[test]
    fn test_ctrl_backspace_removes_previous_word() {
        let mut buffer = TextBuffer::from_text("hello world");
        apply(&mut buffer, Token::CtrlBackSpace);
        assert_eq!(buffer.text(), "hello ");
        assert_eq!(buffer.cursor(), 6);
    }

    #[test]
    fn test_ctrl_backspace_includes_trailing_whitespace() {
        let mut buffer = TextBuffer::new("hello world  !", 13);
        apply(&mut buffer, Token::CtrlBackSpace);
        assert_eq!(buffer.text(), "hello !");
        assert_eq!(buffer.cursor(), 6);
    }

    #[test]
    fn test_ctrl_delete_removes_next_word() {
        let mut buffer = TextBuffer::new("one two three", 4);
        apply(&mut buffer, Token::CtrlDelete);
        assert_eq!(buffer.text(), "one three");
        assert_eq!(buffer.cursor(), 4);
    }

    #[test]
    fn test_enter_and_tab() {
        let mut buffer = TextBuffer::from_text("a");
        apply(&mut buffer, Token::Enter);
        apply(&mut buffer, Token::Tab);
        assert_eq!(buffer.text(), "a\n\t");
        assert_eq!(buffer.cursor(), 3);
    }

    #[test]
    fn test_text_is_cleaned_before_insertion() {
        let mut buffer = TextBuffer::default();
        apply(
            &mut buffer,
            Token::Text("«<espace-insecable></espace-insecable>".to_string()),
        );
        apply(
            &mut buffer,
            Token::Text("x<tap-hold>Ctrl</tap-hold>".to_string()),
        );
        apply(&mut buffer, Token::Text("␣".to_string()));
        assert_eq!(buffer.text(), "« x ");
        assert_eq!(buffer.cursor(), 4);
    }

    #[test]
    fn test_prefix_deletion_happens_first() {
        let mut buffer = TextBuffer::from_text("voilà");
        let report = editor().apply(&mut buffer, &Token::Text("où".to_string()), 1, false);
        assert_eq!(report.prefix_deleted, 1);
        assert_eq!(buffer.text(), "voiloù");
    }

    #[test]
    fn test_magic_token_delegates_to_expander() {
        let mut buffer = TextBuffer::from_text("Il a");
        let report = apply(&mut buffer, Token::Magic);
        assert!(matches!(report.expansion, Some(Expansion::Replaced { .. })));
        assert_eq!(buffer.text(), "Il ainsi");
        assert_eq!(buffer.cursor(), 8);
    }

    #[test]
    fn test_autocorrect_runs_only_in_plus_mode() {
        let mut plain = TextBuffer::from_text("c");
        editor().apply(&mut plain, &Token::Text("'".to_string()), 0, false);
        assert_eq!(plain.text(), "c'");

        let mut plus = TextBuffer::from_text("c");
        let report = editor().apply(&mut plus, &Token::Text("'".to_string()), 0, true);
        assert_eq!(plus.text(), "c’");
        assert_eq!(plus.cursor(), 2);
        assert_eq!(report.autocorrections, 1);
    }
}
