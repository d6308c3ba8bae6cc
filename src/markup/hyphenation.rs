//! Hyphenation exceptions.
//!
//! Some words must never be broken at certain positions (the compositor's
//! pattern-based hyphenation gets them wrong). The exception table maps a
//! word to the character offsets where breaking is forbidden; a word joiner
//! is inserted at each of those offsets in every case-sensitive, whole-word
//! occurrence.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::{Error, Result};

/// U+2060 WORD JOINER: zero width, forbids a line break at its position.
pub const WORD_JOINER: char = '\u{2060}';

/// An immutable word → forbidden-break-offsets table with its compiled matcher.
#[derive(Debug, Clone, Default)]
pub struct HyphenationExceptions {
    offsets: HashMap<String, Vec<usize>>,
    matcher: Option<Regex>,
}

impl HyphenationExceptions {
    /// Build a table from `(word, offsets)` pairs.
    ///
    /// Offsets are character offsets into the word; offsets at the word
    /// edges or beyond are ignored.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<usize>)>,
        S: Into<String>,
    {
        let mut offsets: HashMap<String, Vec<usize>> = HashMap::new();
        for (word, mut offs) in entries {
            let word: String = word.into();
            let len = word.chars().count();
            offs.retain(|&o| o > 0 && o < len);
            if word.trim().is_empty() || offs.is_empty() {
                continue;
            }
            offs.sort_unstable();
            offs.dedup();
            offsets.insert(word, offs);
        }

        // Longest first so a word never loses to one of its prefixes.
        let mut words: Vec<&String> = offsets.keys().collect();
        words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        let matcher = if words.is_empty() {
            None
        } else {
            let alternation = words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"\b(?:{alternation})\b")).ok()
        };

        Self { offsets, matcher }
    }

    /// Parse the JSON form: `{ "word": [offset, ...] }`.
    pub fn from_json(json: &str) -> Result<Self> {
        let map: BTreeMap<String, Vec<usize>> = serde_json::from_str(json)?;
        Ok(Self::from_entries(map))
    }

    /// Load the JSON form from a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Insert word joiners at the forbidden offsets of every listed word.
    ///
    /// # Examples
    ///
    /// ```
    /// use bookset::markup::HyphenationExceptions;
    ///
    /// let table = HyphenationExceptions::from_entries([("ademhaling", vec![4])]);
    /// assert_eq!(table.apply("De ademhaling stopt."), "De adem\u{2060}haling stopt.");
    /// // Case-sensitive, whole words only.
    /// assert_eq!(table.apply("Ademhaling, ademhalingen"), "Ademhaling, ademhalingen");
    /// ```
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let Some(matcher) = &self.matcher else {
            return Cow::Borrowed(text);
        };

        matcher.replace_all(text, |caps: &regex::Captures| {
            let word = &caps[0];
            match self.offsets.get(word) {
                Some(offsets) => insert_joiners(word, offsets),
                None => word.to_string(),
            }
        })
    }
}

fn insert_joiners(word: &str, offsets: &[usize]) -> String {
    let mut out = String::with_capacity(word.len() + offsets.len() * WORD_JOINER.len_utf8());
    for (i, c) in word.chars().enumerate() {
        if offsets.binary_search(&i).is_ok() {
            out.push(WORD_JOINER);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_offsets() {
        let table = HyphenationExceptions::from_entries([("zorgprofessional", vec![4, 8])]);
        assert_eq!(
            table.apply("zorgprofessional"),
            "zorg\u{2060}prof\u{2060}essional"
        );
    }

    #[test]
    fn test_edge_offsets_ignored() {
        let table = HyphenationExceptions::from_entries([("cel", vec![0, 3, 9])]);
        assert!(table.is_empty());
        assert_eq!(table.apply("cel"), "cel");
    }

    #[test]
    fn test_unicode_offsets_are_chars() {
        let table = HyphenationExceptions::from_entries([("cliënten", vec![4])]);
        assert_eq!(table.apply("de cliënten"), "de clië\u{2060}nten");
    }

    #[test]
    fn test_longer_word_wins() {
        let table = HyphenationExceptions::from_entries([
            ("bloed", vec![2]),
            ("bloedvat", vec![5]),
        ]);
        assert_eq!(table.apply("bloedvat bloed"), "bloed\u{2060}vat bl\u{2060}oed");
    }

    #[test]
    fn test_apply_is_deterministic() {
        let table = HyphenationExceptions::from_json(r#"{"hartslag": [4], "longen": [3]}"#).unwrap();
        let text = "De hartslag en de longen.";
        assert_eq!(table.apply(text), table.apply(text));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_open_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exceptions.json");
        std::fs::write(&path, r#"{"hartslag": [4]}"#).unwrap();
        let table = HyphenationExceptions::open(&path).unwrap();
        assert_eq!(table.apply("hartslag"), "hart\u{2060}slag");
    }
}
