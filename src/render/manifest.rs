//! Decision manifest written alongside the markup.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::IndexEntry;

/// What happened to a list-like block (or a merged group of them).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOutcome {
    Kept,
    /// Several consecutive blocks rendered as one list.
    Merged,
    /// Kept as a child of an open parent list.
    Nested,
    /// A deeper-level block with no open parent, kept as a top-level list.
    Promoted,
    Demoted,
    Steps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDecision {
    pub chapter: String,
    pub block_ids: Vec<String>,
    pub outcome: ListOutcome,
    /// Non-empty items considered.
    pub items: usize,
}

/// Side notes of a list-introducing paragraph moved below the list run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredNote {
    pub chapter: String,
    pub block_id: String,
    /// Ids of the list-like blocks the notes were placed after.
    pub placed_after: Vec<String>,
}

/// Everything the renderer decided, for inspection and tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderManifest {
    pub lists: Vec<ListDecision>,
    pub deferred_notes: Vec<DeferredNote>,
    /// Block ids of paragraphs skipped as restated subparagraph headings.
    pub redundant_headings: Vec<String>,
    /// Figure sources whose assets were missing.
    pub missing_figures: Vec<String>,
    pub index: Vec<IndexEntry>,
}

impl RenderManifest {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decisions with the given outcome.
    pub fn lists_with(&self, outcome: ListOutcome) -> impl Iterator<Item = &ListDecision> {
        self.lists.iter().filter(move |d| d.outcome == outcome)
    }
}
