//! Canonical book content tree.
//!
//! This is the read-only input to rendering: chapters → sections → content
//! blocks, deserialized from the canonical JSON produced upstream. Numbering
//! fields are opaque dotted strings and are only ever displayed, never
//! computed.
//!
//! ## Wire format
//!
//! Blocks are internally tagged by `"type"`. Paragraph text lives in
//! `"basis"` and side notes in `"praktijk"` / `"verdieping"`, matching the
//! canonical JSON:
//!
//! ```
//! use bookset::model::{Book, ContentBlock};
//!
//! let json = r#"{
//!   "meta": { "title": "Anatomie", "level": "N3", "language": "nl" },
//!   "chapters": [{
//!     "number": 1,
//!     "title": "De cel",
//!     "sections": [{
//!       "number": "1.1",
//!       "content": [
//!         { "type": "paragraph", "id": "p1", "basis": "Een cel is klein." }
//!       ]
//!     }]
//!   }]
//! }"#;
//!
//! let book = Book::from_json(json).unwrap();
//! assert_eq!(book.chapters[0].number, "1");
//! assert!(matches!(book.chapters[0].sections[0].content[0], ContentBlock::Paragraph(_)));
//! ```

mod number;
mod slice;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use number::{compare_numbers, opaque_string, parse_number_parts};

/// A complete book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    #[serde(default)]
    pub meta: BookMeta,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

/// Book-level metadata shown on the cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub level: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "nl".to_string()
}

impl Default for BookMeta {
    fn default() -> Self {
        Self {
            title: String::new(),
            level: String::new(),
            language: default_language(),
        }
    }
}

/// A numbered chapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default, deserialize_with = "opaque_string")]
    pub number: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Chapter opener figures, rendered right after the chapter heading.
    #[serde(default)]
    pub images: Vec<Figure>,
}

/// A numbered section within a chapter. Sections are the structural unit
/// the index refers to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default, deserialize_with = "opaque_string")]
    pub number: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// One block of content. Order within a section or subparagraph is reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Paragraph(Paragraph),
    List(ListBlock),
    Steps(StepsBlock),
    Subparagraph(Subparagraph),
    /// Block types this renderer does not know. Skipped.
    #[serde(other)]
    Unknown,
}

impl ContentBlock {
    /// Figures anchored directly to this block.
    pub fn images(&self) -> &[Figure] {
        match self {
            ContentBlock::Paragraph(p) => &p.images,
            ContentBlock::List(l) => &l.images,
            ContentBlock::Steps(s) => &s.images,
            ContentBlock::Subparagraph(_) | ContentBlock::Unknown => &[],
        }
    }
}

/// A prose paragraph with optional attached side notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    #[serde(default, deserialize_with = "opaque_string")]
    pub id: String,
    #[serde(default, alias = "basisText")]
    pub basis: String,
    #[serde(flatten)]
    pub side_notes: SideNotes,
    #[serde(default)]
    pub style_hint: Option<String>,
    /// Upstream layout role, e.g. "bullet" or "step".
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub images: Vec<Figure>,
}

/// The two kinds of side note a paragraph may carry. Plain text only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideNotes {
    #[serde(
        default,
        rename = "praktijk",
        alias = "practice",
        skip_serializing_if = "Option::is_none"
    )]
    pub practice: Option<String>,
    #[serde(
        default,
        rename = "verdieping",
        alias = "deepening",
        skip_serializing_if = "Option::is_none"
    )]
    pub deepening: Option<String>,
}

impl SideNotes {
    /// True if at least one note has visible text.
    pub fn has_any(&self) -> bool {
        [&self.practice, &self.deepening]
            .into_iter()
            .flatten()
            .any(|note| !note.trim().is_empty())
    }
}

/// A bulleted or numbered list. `level` is 1..=3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBlock {
    #[serde(default, deserialize_with = "opaque_string")]
    pub id: String,
    #[serde(default = "default_level")]
    pub level: u8,
    #[serde(default)]
    pub ordered: bool,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub style_hint: Option<String>,
    #[serde(default)]
    pub images: Vec<Figure>,
}

fn default_level() -> u8 {
    1
}

impl Default for ListBlock {
    fn default() -> Self {
        Self {
            id: String::new(),
            level: default_level(),
            ordered: false,
            items: Vec::new(),
            style_hint: None,
            images: Vec::new(),
        }
    }
}

/// A numbered procedure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepsBlock {
    #[serde(default, deserialize_with = "opaque_string")]
    pub id: String,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub images: Vec<Figure>,
}

/// A numbered subparagraph nested inside a section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subparagraph {
    #[serde(default, deserialize_with = "opaque_string")]
    pub id: String,
    #[serde(default, deserialize_with = "opaque_string")]
    pub number: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// An image with optional caption.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Figure {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub figure_number: Option<String>,
}

impl Book {
    /// Parse a book from canonical JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a canonical JSON file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Find a chapter by its displayed number.
    pub fn chapter(&self, number: &str) -> Option<&Chapter> {
        self.chapters
            .iter()
            .find(|ch| ch.number.trim() == number.trim())
    }
}
