//! Inline marker grammar and text-level rendering.
//!
//! Canonical strings carry a tiny marker language on top of plain text:
//!
//! - `<<BOLD_START>>` / `<<BOLD_END>>` delimit an emphasis span
//! - `<<MICRO_TITLE>>` / `<<MICRO_TITLE_END>>` delimit a forced micro-heading
//! - `<<BOX_SPLIT>>` splits a side note into several visual boxes
//! - a literal newline is either a forced break or incidental whitespace
//!
//! The modules here are pure string transforms:
//!
//! - `escape`: idempotent HTML escaping
//! - `markers`: marker constants and plain-text extraction
//! - `inline`: marker/tag tokenizer and the inline renderer
//! - `micro`: splitting text into micro-title and body segments
//! - `hyphenation`: hyphenation-exception break control
//! - `typography`: advisory non-breaking joins for flowing text
//!
//! Block-level decisions (lists, boxes, document structure) live in
//! [`crate::render`].

mod escape;
mod hyphenation;
mod inline;
mod markers;
mod micro;
mod typography;

pub use escape::escape_html;
pub(crate) use escape::entity_len;
pub use hyphenation::{HyphenationExceptions, WORD_JOINER};
pub use inline::{InlineOptions, InlineRenderer, Token, render_inline, tokenize};
pub use markers::{
    BOLD_END, BOLD_START, BOX_SPLIT, MICRO_TITLE, MICRO_TITLE_END, collapse_whitespace,
    emphasis_spans, normalize_title, strip_markers,
};
pub use micro::{Segment, SegmentKind, segment_micro_titles};
pub use typography::{ConnectorJoiner, NBSP, wrap_lead_phrase};
