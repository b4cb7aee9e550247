// Ergokey Autocorrect Pipeline
// Ordered text substitutions with position-aware cursor correction

use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use strum_macros::{Display, IntoStaticStr};

use crate::editor::TextBuffer;

const BUILTIN_RULES: &str = include_str!("../data/rules.toml");

/// Errors that can occur when loading an autocorrect rule set
#[derive(Debug, thiserror::Error)]
pub enum RuleSetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// One replacement made by a rule, in characters of the text it was applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub position: usize,
    pub removed: usize,
    pub inserted: usize,
}

impl Edit {
    pub fn delta(&self) -> isize {
        self.inserted as isize - self.removed as isize
    }
}

/// Text produced by a rule together with the edits that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    /// Ascending, non-overlapping
    pub edits: Vec<Edit>,
}

/// A substitution rule of the pipeline
pub trait Substitution: Send + Sync {
    fn label(&self) -> &str;

    /// Rewrite `text`, or `None` when the rule does not match
    fn rewrite(&self, text: &str) -> Option<Rewrite>;
}

/// Build a rewrite from ascending byte ranges and their replacements
fn rewrite_ranges<I>(text: &str, matches: I) -> Option<Rewrite>
where
    I: IntoIterator<Item = (Range<usize>, String)>,
{
    let mut out = String::with_capacity(text.len());
    let mut edits = Vec::new();
    let mut last = 0;
    let mut chars_before = 0;

    for (range, replacement) in matches {
        let skipped = &text[last..range.start];
        chars_before += skipped.chars().count();
        out.push_str(skipped);
        out.push_str(&replacement);

        let removed = text[range.clone()].chars().count();
        edits.push(Edit {
            position: chars_before,
            removed,
            inserted: replacement.chars().count(),
        });
        chars_before += removed;
        last = range.end;
    }

    if edits.is_empty() {
        return None;
    }
    out.push_str(&text[last..]);
    Some(Rewrite { text: out, edits })
}

/// Regular-expression rule; replacements may reference groups as `${n}`
#[derive(Debug, Clone)]
pub struct RegexRule {
    label: String,
    regex: Regex,
    replacement: String,
}

impl RegexRule {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, RuleSetError> {
        let regex = Regex::new(pattern).map_err(|source| RuleSetError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            label: format!("regex:{}", pattern),
            regex,
            replacement: replacement.into(),
        })
    }
}

impl Substitution for RegexRule {
    fn label(&self) -> &str {
        &self.label
    }

    fn rewrite(&self, text: &str) -> Option<Rewrite> {
        let matches = self.regex.captures_iter(text).filter_map(|caps| {
            let whole = caps.get(0)?;
            let mut replacement = String::new();
            caps.expand(&self.replacement, &mut replacement);
            Some((whole.range(), replacement))
        });
        rewrite_ranges(text, matches)
    }
}

/// Exact text replacement
#[derive(Debug, Clone)]
pub struct LiteralRule {
    label: String,
    from: String,
    to: String,
}

impl LiteralRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        Self {
            label: format!("literal:{}", from),
            from,
            to: to.into(),
        }
    }
}

impl Substitution for LiteralRule {
    fn label(&self) -> &str {
        &self.label
    }

    fn rewrite(&self, text: &str) -> Option<Rewrite> {
        if self.from.is_empty() {
            return None;
        }
        let matches = text
            .match_indices(self.from.as_str())
            .map(|(start, found)| (start..start + found.len(), self.to.clone()));
        rewrite_ranges(text, matches)
    }
}

/// A doubled word character followed by `marker` turns the marker into
/// `replacement` (`nnê` -> `nnu`). Letters in `except` are left alone.
#[derive(Debug, Clone)]
pub struct DoubledLetterRule {
    label: String,
    marker: char,
    replacement: String,
    except: String,
}

impl DoubledLetterRule {
    pub fn new(marker: char, replacement: impl Into<String>, except: impl Into<String>) -> Self {
        Self {
            label: format!("doubled:{}", marker),
            marker,
            replacement: replacement.into(),
            except: except.into(),
        }
    }

    fn is_candidate(&self, c: char) -> bool {
        (c.is_alphanumeric() || c == '_') && !self.except.contains(c)
    }
}

impl Substitution for DoubledLetterRule {
    fn label(&self) -> &str {
        &self.label
    }

    fn rewrite(&self, text: &str) -> Option<Rewrite> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut matches = Vec::new();
        let mut i = 0;
        while i + 2 < chars.len() {
            let (_, first) = chars[i];
            let (_, second) = chars[i + 1];
            let (at, third) = chars[i + 2];
            if first == second && third == self.marker && self.is_candidate(first) {
                matches.push((at..at + third.len_utf8(), self.replacement.clone()));
                i += 3;
            } else {
                i += 1;
            }
        }
        rewrite_ranges(text, matches)
    }
}

/// Cursor position after `edits`, counting only edits at or before it.
///
/// A cursor inside a replaced span moves to the end of the replacement.
pub fn correct_cursor(cursor: usize, edits: &[Edit]) -> usize {
    let mut shift: isize = 0;
    for edit in edits {
        if edit.position + edit.removed <= cursor {
            shift += edit.delta();
        } else if edit.position < cursor {
            return (edit.position as isize + shift) as usize + edit.inserted;
        } else {
            break;
        }
    }
    (cursor as isize + shift).max(0) as usize
}

/// Result of running the pipeline over a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub text: String,
    pub cursor: usize,
    /// Total number of replacements made by all rules
    pub edits: usize,
}

/// Ordered list of substitution rules
#[derive(Clone)]
pub struct AutocorrectPipeline {
    rules: Vec<Arc<dyn Substitution>>,
}

impl fmt::Debug for AutocorrectPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| rule.label()))
            .finish()
    }
}

impl Default for AutocorrectPipeline {
    fn default() -> Self {
        Self::builtin().unwrap_or_else(|err| {
            log::error!("Built-in autocorrect rules unavailable: {}", err);
            Self::empty()
        })
    }
}

impl AutocorrectPipeline {
    /// Pipeline without any rule
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Pipeline of the built-in rule set
    pub fn builtin() -> Result<Self, RuleSetError> {
        RuleSet::builtin()?.compile()
    }

    /// Append a rule, run after the existing ones
    pub fn with_rule<S: Substitution + 'static>(mut self, rule: S) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.label())
    }

    /// Run every rule in order over `text`
    pub fn correct(&self, text: &str, cursor: usize) -> Correction {
        let mut correction = Correction {
            text: text.to_string(),
            cursor,
            edits: 0,
        };

        for rule in &self.rules {
            if let Some(rewrite) = rule.rewrite(&correction.text) {
                log::debug!(
                    "Autocorrect {} made {} edit(s)",
                    rule.label(),
                    rewrite.edits.len()
                );
                correction.cursor = correct_cursor(correction.cursor, &rewrite.edits);
                correction.edits += rewrite.edits.len();
                correction.text = rewrite.text;
            }
        }
        correction
    }

    /// Correct a buffer in place, returning the number of replacements
    pub fn apply_to(&self, buffer: &mut TextBuffer) -> usize {
        let correction = self.correct(buffer.text(), buffer.cursor());
        if correction.edits > 0 {
            buffer.set(correction.text, correction.cursor);
        }
        correction.edits
    }
}

/// Purpose of a rule, used for logging and documentation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleGroup {
    Typography,
    DeadKey,
    Sfb,
    Roll,
    #[default]
    Custom,
}

/// Matcher declaration of a rule
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    Regex {
        pattern: String,
        replacement: String,
    },
    Literal {
        from: String,
        to: String,
    },
    Roll {
        from: String,
        to: String,
    },
    DoubledLetter {
        marker: char,
        replacement: String,
        #[serde(default)]
        except: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RuleSpec {
    #[serde(default)]
    pub group: RuleGroup,
    #[serde(flatten)]
    pub kind: RuleKind,
}

/// Versioned, declarative rule set
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    pub version: String,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl RuleSet {
    /// Rules of the current layout version
    pub fn builtin() -> Result<Self, RuleSetError> {
        Self::from_toml(BUILTIN_RULES)
    }

    pub fn from_toml(content: &str) -> Result<Self, RuleSetError> {
        toml::from_str(content).map_err(|e| RuleSetError::TomlParse(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RuleSetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Build the pipeline, expanding rolls into their case variants
    pub fn compile(&self) -> Result<AutocorrectPipeline, RuleSetError> {
        let mut pipeline = AutocorrectPipeline::empty();
        for spec in &self.rules {
            pipeline = match &spec.kind {
                RuleKind::Regex {
                    pattern,
                    replacement,
                } => pipeline.with_rule(RegexRule::new(pattern, replacement.as_str())?),
                RuleKind::Literal { from, to } => {
                    pipeline.with_rule(LiteralRule::new(from.as_str(), to.as_str()))
                }
                RuleKind::Roll { from, to } => roll_variants(from, to)
                    .into_iter()
                    .fold(pipeline, |p, (from, to)| p.with_rule(LiteralRule::new(from, to))),
                RuleKind::DoubledLetter {
                    marker,
                    replacement,
                    except,
                } => pipeline.with_rule(DoubledLetterRule::new(
                    *marker,
                    replacement.as_str(),
                    except.as_str(),
                )),
            };
        }
        log::debug!(
            "Compiled rule set {} into {} rules",
            self.version,
            pipeline.len()
        );
        Ok(pipeline)
    }
}

/// Lower, Title and UPPER variants of a roll, without duplicates or no-ops
pub fn roll_variants(from: &str, to: &str) -> Vec<(String, String)> {
    let candidates = [
        (from.to_lowercase(), to.to_lowercase()),
        (title_case(from), title_case(to)),
        (from.to_uppercase(), to.to_uppercase()),
    ];

    let mut variants: Vec<(String, String)> = Vec::new();
    for (from, to) in candidates {
        if from != to && !variants.iter().any(|(seen, _)| *seen == from) {
            variants.push((from, to));
        }
    }
    variants
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

#[cfg(test)]
mod tests {
    use super::*;

    fn correct(text: &str, cursor: usize) -> (String, usize) {
        let correction = AutocorrectPipeline::builtin().unwrap().correct(text, cursor);
        (correction.text, correction.cursor)
    }

    #[test]
    fn test_builtin_rule_set_loads() {
        let rules = RuleSet::builtin().unwrap();
        assert_eq!(rules.version, "2.2");
        assert_eq!(rules.rules[0].group, RuleGroup::Typography);
        assert!(AutocorrectPipeline::builtin().unwrap().len() > rules.rules.len());
    }

    #[test]
    fn test_typographic_apostrophe() {
        assert_eq!(correct("c'est", 5), ("c’est".to_string(), 5));
        assert_eq!(correct("L'eau", 5), ("L’eau".to_string(), 5));
        assert_eq!(correct("a'b", 3), ("a'b".to_string(), 3));
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let pipeline = AutocorrectPipeline::builtin().unwrap();
        let once = pipeline.correct("c'est l'hc du sx", 16);
        let twice = pipeline.correct(&once.text, once.cursor);
        assert_eq!(twice.text, once.text);
        assert_eq!(twice.cursor, once.cursor);
        assert_eq!(twice.edits, 0);
    }

    #[test]
    fn test_dead_key_vowel_composition() {
        assert_eq!(correct("pêa", 3), ("pâ".to_string(), 2));
        assert_eq!(correct("êo", 2), ("ô".to_string(), 1));
    }

    #[test]
    fn test_accent_marker_composes_with_vowel() {
        assert_eq!(correct("◌̂a", 3), ("â".to_string(), 1));
        assert_eq!(correct("◌̂O", 3), ("Ô".to_string(), 1));
        assert_eq!(correct("◌̈e", 3), ("ë".to_string(), 1));
        assert_eq!(correct("◌̈U", 3), ("Ü".to_string(), 1));
        assert_eq!(correct("na◌̈ive", 7), ("naïve".to_string(), 5));
        // No vowel after the marker: left alone
        assert_eq!(correct("◌̂t", 3), ("◌̂t".to_string(), 3));
    }

    #[test]
    fn test_builtin_pipeline_default_matches_builtin() {
        assert_eq!(
            AutocorrectPipeline::default().labels().collect::<Vec<_>>(),
            AutocorrectPipeline::builtin().unwrap().labels().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_doubled_letter_before_circumflex() {
        assert_eq!(correct("nnê", 3), ("nnu".to_string(), 3));
        assert_eq!(correct("arrê", 4), ("arrê".to_string(), 4));
        assert_eq!(correct("abê", 3), ("abê".to_string(), 3));
    }

    #[test]
    fn test_sfb_rules() {
        assert_eq!(correct("êé", 2), ("aî".to_string(), 2));
        assert_eq!(correct("éê", 2), ("â".to_string(), 1));
        assert_eq!(correct("ê.", 2), ("u.".to_string(), 2));
    }

    #[test]
    fn test_roll_case_variants() {
        assert_eq!(correct("hc", 2).0, "wh");
        assert_eq!(correct("Hc", 2).0, "Wh");
        assert_eq!(correct("HC", 2).0, "WH");
        assert_eq!(correct("hC", 2).0, "hC");
        assert_eq!(correct("Yè", 2).0, "Éi");
    }

    #[test]
    fn test_roll_variants_skip_duplicates() {
        assert_eq!(
            roll_variants("#!", " := "),
            vec![("#!".to_string(), " := ".to_string())]
        );
        assert_eq!(
            roll_variants("p'", "ct"),
            vec![
                ("p'".to_string(), "ct".to_string()),
                ("P'".to_string(), "Ct".to_string()),
            ]
        );
        assert!(roll_variants("eé", "eé").is_empty());
    }

    #[test]
    fn test_cursor_before_edit_is_untouched() {
        assert_eq!(correct("x #!", 1), ("x  := ".to_string(), 1));
    }

    #[test]
    fn test_cursor_after_edits_follows_them() {
        assert_eq!(correct("#!a#!", 3), (" := a := ".to_string(), 5));
    }

    #[test]
    fn test_cursor_inside_match_moves_to_replacement_end() {
        assert_eq!(correct("a#!", 2), ("a := ".to_string(), 5));
    }

    #[test]
    fn test_correct_cursor_fold() {
        let edits = [
            Edit {
                position: 0,
                removed: 2,
                inserted: 1,
            },
            Edit {
                position: 5,
                removed: 1,
                inserted: 3,
            },
        ];
        assert_eq!(correct_cursor(0, &edits), 0);
        assert_eq!(correct_cursor(4, &edits), 3);
        assert_eq!(correct_cursor(6, &edits), 7);
        assert_eq!(correct_cursor(1, &edits), 1);
    }

    #[test]
    fn test_custom_rule_injection() {
        let pipeline = AutocorrectPipeline::empty().with_rule(LiteralRule::new("teh", "the"));
        let correction = pipeline.correct("teh cat", 3);
        assert_eq!(correction.text, "the cat");
        assert_eq!(correction.cursor, 3);
        assert_eq!(correction.edits, 1);
    }

    #[test]
    fn test_apply_to_buffer() {
        let mut buffer = TextBuffer::from_text("d'accord");
        assert_eq!(AutocorrectPipeline::builtin().unwrap().apply_to(&mut buffer), 1);
        assert_eq!(buffer.text(), "d’accord");
        assert_eq!(buffer.cursor(), 8);
    }

    #[test]
    fn test_rule_set_from_toml() {
        let rules = RuleSet::from_toml(
            r#"
version = "1.0"

[[rules]]
group = "roll"
kind = "roll"
from = "qz"
to = "qu"

[[rules]]
kind = "regex"
pattern = "(\\d)x"
replacement = "${1}×"
"#,
        )
        .unwrap();
        assert_eq!(rules.rules[1].group, RuleGroup::Custom);

        let pipeline = rules.compile().unwrap();
        assert_eq!(pipeline.len(), 4);
        assert_eq!(pipeline.correct("Qz 3x", 5).text, "Qu 3×");
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let rules = RuleSet::from_toml(
            r#"
version = "1.0"

[[rules]]
kind = "regex"
pattern = "(unclosed"
replacement = ""
"#,
        )
        .unwrap();
        assert!(matches!(
            rules.compile(),
            Err(RuleSetError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_unknown_top_level_field_is_rejected() {
        let err = RuleSet::from_toml("version = \"1\"\nextra = 1\n").unwrap_err();
        assert!(matches!(err, RuleSetError::TomlParse(_)));
    }
}
