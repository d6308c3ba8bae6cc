//! Display strings.

use serde::{Deserialize, Serialize};

/// Fixed strings the renderer writes into the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextLabels {
    pub practice_label: String,
    pub deepening_label: String,
    pub contents_title: String,
    pub index_title: String,
    pub chapter_prefix: String,
    /// Leaked label prefixes stripped from the start of side-note text
    /// (compared case-insensitively, with or without trailing colon).
    pub leaked_labels: Vec<String>,
}

impl Default for TextLabels {
    fn default() -> Self {
        Self::dutch()
    }
}

impl TextLabels {
    pub fn dutch() -> Self {
        Self {
            practice_label: "In de praktijk:".into(),
            deepening_label: "Verdieping:".into(),
            contents_title: "Inhoud".into(),
            index_title: "Register".into(),
            chapter_prefix: "Hoofdstuk".into(),
            leaked_labels: leaked_labels(),
        }
    }

    pub fn english() -> Self {
        Self {
            practice_label: "In practice:".into(),
            deepening_label: "Deepening:".into(),
            contents_title: "Contents".into(),
            index_title: "Index".into(),
            chapter_prefix: "Chapter".into(),
            leaked_labels: leaked_labels(),
        }
    }

    /// Defaults for a BCP 47 language tag; anything not Dutch gets English.
    pub fn for_language(language: &str) -> Self {
        let primary = language.split(['-', '_']).next().unwrap_or("");
        if primary.eq_ignore_ascii_case("nl") {
            Self::dutch()
        } else {
            Self::english()
        }
    }
}

fn leaked_labels() -> Vec<String> {
    ["In de praktijk", "Verdieping", "In practice", "Practice", "Deepening"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_defaults() {
        assert_eq!(TextLabels::for_language("nl-NL").contents_title, "Inhoud");
        assert_eq!(TextLabels::for_language("NL").index_title, "Register");
        assert_eq!(TextLabels::for_language("en").contents_title, "Contents");
        assert_eq!(TextLabels::for_language("").practice_label, "In practice:");
    }
}
