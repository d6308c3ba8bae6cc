//! Render configuration.
//!
//! All thresholds the heuristics use are plain data here so they can be
//! tuned per book without touching traversal code. Every key is optional in
//! the TOML form; missing keys take the defaults below.
//!
//! ```
//! use bookset::config::{RenderConfig, TextAlign};
//!
//! let config = RenderConfig::from_toml(r#"
//!     [lists]
//!     max_items = 12
//!
//!     [typography]
//!     text_align = "left"
//! "#).unwrap();
//! assert_eq!(config.lists.max_items, 12);
//! assert_eq!(config.lists.min_items, 2);
//! assert_eq!(config.typography.text_align, TextAlign::Left);
//! ```

mod text;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use text::TextLabels;

/// Top-level render configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub lists: ListThresholds,
    pub labels: LabelHeuristic,
    pub index: IndexConfig,
    pub typography: Typography,
    /// Display strings; defaults follow the book language when absent.
    pub text: Option<TextLabels>,
}

impl RenderConfig {
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source)
    }
}

/// When a run of list items stays a real list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListThresholds {
    pub min_items: usize,
    pub max_items: usize,
    /// Fraction of items that must pass the short-parallel-item test.
    pub short_ratio: f64,
    pub max_item_chars: usize,
    pub max_item_tokens: usize,
}

impl Default for ListThresholds {
    fn default() -> Self {
        Self {
            min_items: 2,
            max_items: 15,
            short_ratio: 0.6,
            max_item_chars: 120,
            max_item_tokens: 20,
        }
    }
}

/// Tuning for the "Label. Explanation…" detector in demoted list items.
///
/// The word lists are language specific; the defaults target Dutch with a
/// few English forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelHeuristic {
    pub max_tokens: usize,
    /// Finite verbs that make a second token read as a sentence.
    pub verb_like: Vec<String>,
    /// Separable verb particles; a label never ends with one.
    pub particles: Vec<String>,
    /// A label never contains a personal pronoun.
    pub pronouns: Vec<String>,
    /// Endings that mark a later word (of four letters or more) as a finite
    /// verb.
    pub verb_suffixes: Vec<String>,
}

impl Default for LabelHeuristic {
    fn default() -> Self {
        Self {
            max_tokens: 6,
            verb_like: words(&[
                "is", "zijn", "was", "waren", "wordt", "worden", "werd", "werden", "heeft",
                "hebben", "had", "kan", "kunnen", "moet", "moeten", "mag", "mogen", "zal",
                "zullen", "wil", "willen", "gaat", "gaan", "komt", "komen", "maakt", "maken",
                "geeft", "geven", "doet", "doen", "staat", "staan", "ligt", "liggen", "zit",
                "zitten", "blijft", "blijven", "are", "has", "have", "can", "will", "must",
            ]),
            particles: words(&[
                "op", "af", "aan", "uit", "in", "mee", "door", "over", "toe", "terug", "weg",
                "bij", "na", "om", "voor", "samen", "vast", "los", "neer", "open", "dicht",
            ]),
            pronouns: words(&[
                "ik", "je", "jij", "jou", "u", "hij", "zij", "ze", "we", "wij", "jullie",
                "men", "i", "you", "he", "she", "we", "they", "it",
            ]),
            verb_suffixes: words(&["t"]),
        }
    }
}

/// Index/glossary extraction limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Most cross-references kept per term. Zero leaves the index empty.
    pub max_refs: usize,
    pub min_term_chars: usize,
    pub max_term_chars: usize,
    /// Emphasised phrases that are never terms (compared lowercase).
    pub stop_terms: Vec<String>,
    /// Below this many terms the index section is left out of the document.
    pub min_terms: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_refs: 4,
            min_term_chars: 3,
            max_term_chars: 60,
            stop_terms: words(&[
                "let op", "tip", "let op!", "belangrijk", "voorbeeld", "in de praktijk",
                "verdieping", "samenvatting", "opdracht", "note", "example", "important",
                "practice", "deepening",
            ]),
            min_terms: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Justify,
    Left,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Justify => "justify",
            TextAlign::Left => "left",
        }
    }
}

/// Layout modes and advisory typography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typography {
    pub text_align: TextAlign,
    /// Let the compositor hyphenate body text.
    pub hyphenate: bool,
    /// Connector words bound to the following word in flowing text.
    pub connectors: Vec<String>,
    pub join_after_colon: bool,
    /// Render a trailing ':' as '.' when no list follows.
    pub fix_orphan_colons: bool,
    /// Lower-case the first letter of box text that follows a visible label.
    pub lowercase_after_label: bool,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            text_align: TextAlign::Justify,
            hyphenate: true,
            connectors: words(&[
                "zoals", "bijvoorbeeld", "bijv.", "bv.", "o.a.", "namelijk", "such as",
                "for example", "e.g.", "i.e.",
            ]),
            join_after_colon: true,
            fix_orphan_colons: true,
            lowercase_after_label: true,
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        assert_eq!(RenderConfig::from_toml("").unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_index_override() {
        let config = RenderConfig::from_toml(
            r#"
            [index]
            max_refs = 2
            stop_terms = ["zie ook"]
            "#,
        )
        .unwrap();
        assert_eq!(config.index.max_refs, 2);
        assert_eq!(config.index.stop_terms, vec!["zie ook"]);
        assert_eq!(config.index.max_term_chars, 60);
    }

    #[test]
    fn test_text_override_fills_missing_with_defaults() {
        let config = RenderConfig::from_toml(
            r#"
            [text]
            practice_label = "Praktijk:"
            "#,
        )
        .unwrap();
        let text = config.text.unwrap();
        assert_eq!(text.practice_label, "Praktijk:");
        assert_eq!(text.deepening_label, "Verdieping:");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            RenderConfig::from_toml("[lists]\nmin_items = \"two\""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_open_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookset.toml");
        std::fs::write(&path, "[labels]\nmax_tokens = 4\n").unwrap();
        assert_eq!(RenderConfig::open(&path).unwrap().labels.max_tokens, 4);
    }
}
