//! Index (register) term extraction.
//!
//! Runs once over the whole book, independent of rendering. Every emphasis
//! span is a candidate term. For each term the sections it occurs in are
//! scored, only the best section per chapter survives, and at most
//! `max_refs` sections are kept, shown in reading order.
//!
//! A section's score is
//! `(emphasised here ? 100 : 0) + frequency + 0.01 * (units - order)`, so a
//! definition site beats plain mentions, more mentions beat fewer, and
//! earlier sections win ties.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::IndexConfig;
use crate::markup::{emphasis_spans, strip_markers};
use crate::model::{Book, ContentBlock};
use crate::render::section_id;

/// A cross-reference target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRef {
    /// Anchor id of the section.
    pub unit_id: String,
    pub chapter: String,
    pub section: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Display form, capitalized.
    pub term: String,
    /// Targets in reading order.
    pub refs: Vec<IndexRef>,
}

/// Extracted index, sorted by term.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub entries: Vec<IndexEntry>,
}

impl Index {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a term case-insensitively.
    pub fn get(&self, term: &str) -> Option<&IndexEntry> {
        let key = term.to_lowercase();
        self.entries.iter().find(|e| e.term.to_lowercase() == key)
    }

    /// Term → unit ids.
    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        self.entries
            .iter()
            .map(|e| {
                (
                    e.term.clone(),
                    e.refs.iter().map(|r| r.unit_id.clone()).collect(),
                )
            })
            .collect()
    }
}

/// One section, flattened for scanning.
struct Unit {
    chapter: String,
    section: String,
    /// Visible text, lowercase.
    text: String,
    /// Emphasised terms in this section, normalized and lowercase.
    emphasis: HashSet<String>,
}

struct Candidate {
    order: usize,
    score: f64,
}

fn collect_strings<'a>(blocks: &'a [ContentBlock], out: &mut Vec<&'a str>) {
    for block in blocks {
        match block {
            ContentBlock::Paragraph(p) => {
                out.push(&p.basis);
                out.extend(p.side_notes.practice.as_deref());
                out.extend(p.side_notes.deepening.as_deref());
            }
            ContentBlock::List(l) => out.extend(l.items.iter().map(String::as_str)),
            ContentBlock::Steps(s) => out.extend(s.items.iter().map(String::as_str)),
            ContentBlock::Subparagraph(sp) => {
                out.push(&sp.title);
                collect_strings(&sp.content, out);
            }
            ContentBlock::Unknown => {}
        }
        out.extend(block.images().iter().filter_map(|f| f.caption.as_deref()));
    }
}

/// Trim surrounding punctuation from an emphasis span.
fn clean_term(span: &str) -> &str {
    span.trim_matches(|c: char| !c.is_alphanumeric())
}

fn capitalize(term: &str) -> String {
    let mut chars = term.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whole-word occurrences of `needle` in `haystack` (both lowercase).
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack
        .match_indices(needle)
        .filter(|(at, _)| {
            let before = haystack[..*at].chars().next_back();
            let after = haystack[at + needle.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
        .count()
}

fn build_units(book: &Book) -> Vec<Unit> {
    let mut units = Vec::new();
    for chapter in &book.chapters {
        for section in &chapter.sections {
            let mut strings = Vec::new();
            if let Some(title) = &section.title {
                strings.push(title.as_str());
            }
            collect_strings(&section.content, &mut strings);

            let text = strings
                .iter()
                .map(|s| strip_markers(s))
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            let emphasis = strings
                .iter()
                .flat_map(|s| emphasis_spans(s))
                .map(|span| clean_term(&span).to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
            units.push(Unit {
                chapter: chapter.number.clone(),
                section: section.number.clone(),
                text,
                emphasis,
            });
        }
    }
    units
}

/// Candidate terms in first-seen order, deduplicated case-insensitively.
fn candidate_terms(units: &[Unit], book: &Book, config: &IndexConfig) -> Vec<(String, String)> {
    let stop: HashSet<String> = config.stop_terms.iter().map(|t| t.to_lowercase()).collect();
    let mut seen = HashSet::new();
    let mut terms = Vec::new();

    let mut spans = Vec::new();
    for chapter in &book.chapters {
        for section in &chapter.sections {
            let mut strings = Vec::new();
            collect_strings(&section.content, &mut strings);
            spans.extend(strings.iter().flat_map(|s| emphasis_spans(s)));
        }
    }
    debug!("Index: {} emphasis spans in {} sections", spans.len(), units.len());

    for span in &spans {
        let term = clean_term(span);
        let len = term.chars().count();
        if len < config.min_term_chars || len > config.max_term_chars {
            continue;
        }
        let key = term.to_lowercase();
        if stop.contains(&key) || !seen.insert(key.clone()) {
            continue;
        }
        terms.push((key, capitalize(term)));
    }
    terms
}

/// Build the index for a whole book.
///
/// Never fails; a book without emphasis yields an empty index.
pub fn build_index(book: &Book, config: &IndexConfig) -> Index {
    let units = build_units(book);
    let total = units.len();
    let mut entries = Vec::new();

    for (key, display) in candidate_terms(&units, book, config) {
        // Best section per chapter.
        let mut best: HashMap<&str, Candidate> = HashMap::new();
        for (order, unit) in units.iter().enumerate() {
            let frequency = count_occurrences(&unit.text, &key);
            let emphasised = unit.emphasis.contains(&key);
            if frequency == 0 && !emphasised {
                continue;
            }
            let score = if emphasised { 100.0 } else { 0.0 }
                + frequency as f64
                + 0.01 * (total - order) as f64;
            let candidate = Candidate {
                order,
                score,
            };
            let better = best
                .get(unit.chapter.as_str())
                .is_none_or(|current| candidate.score > current.score);
            if better {
                best.insert(&unit.chapter, candidate);
            }
        }

        let mut kept: Vec<Candidate> = best.into_values().collect();
        kept.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.order.cmp(&b.order)));
        kept.truncate(config.max_refs);
        if kept.is_empty() {
            continue;
        }
        kept.sort_by_key(|c| c.order);

        debug!("Index term {:?}: {} refs", display, kept.len());
        entries.push(IndexEntry {
            term: display,
            refs: kept
                .iter()
                .map(|c| {
                    let unit = &units[c.order];
                    IndexRef {
                        unit_id: section_id(&unit.section),
                        chapter: unit.chapter.clone(),
                        section: unit.section.clone(),
                    }
                })
                .collect(),
        });
    }

    entries.sort_by(|a, b| {
        a.term
            .to_lowercase()
            .cmp(&b.term.to_lowercase())
            .then_with(|| a.term.cmp(&b.term))
    });
    Index { entries }
}
