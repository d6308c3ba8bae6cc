//! Side-note boxes.
//!
//! Placement (where a box goes relative to lists) is decided by the
//! assembler; this module only turns the notes of one paragraph into box
//! markup, given whether the previous box of the same kind is still being
//! continued.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::TextLabels;
use crate::markup::{
    BOLD_END, BOLD_START, BOX_SPLIT, MICRO_TITLE, MICRO_TITLE_END, escape_html, strip_markers,
    wrap_lead_phrase,
};
use crate::model::SideNotes;

use super::context::RenderContext;

static MD_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").expect("markdown heading regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    Practice,
    Deepening,
}

impl BoxKind {
    pub fn class(self) -> &'static str {
        match self {
            BoxKind::Practice => "box-practice",
            BoxKind::Deepening => "box-deepening",
        }
    }

    pub fn label(self, labels: &TextLabels) -> &str {
        match self {
            BoxKind::Practice => &labels.practice_label,
            BoxKind::Deepening => &labels.deepening_label,
        }
    }
}

/// Box markup for one paragraph and the continuation state after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxRender {
    pub markup: String,
    pub continuation: Option<BoxKind>,
}

/// Render the practice then the deepening note of a paragraph.
///
/// A note of the same kind as `continuation` is drawn as a continued box
/// without its label. Each `BOX_SPLIT` segment becomes its own box; only
/// the first can carry the label.
///
/// # Examples
///
/// ```
/// use bookset::config::RenderConfig;
/// use bookset::model::{BookMeta, SideNotes};
/// use bookset::render::{BoxKind, RenderContext, render_side_notes};
///
/// let ctx = RenderContext::new(&BookMeta::default(), RenderConfig::default());
/// let notes = SideNotes { practice: Some("Bij het wassen let je op de huid.".into()), deepening: None };
///
/// let first = render_side_notes(&notes, None, &ctx);
/// assert!(first.markup.contains("In de praktijk:"));
/// assert_eq!(first.continuation, Some(BoxKind::Practice));
///
/// let second = render_side_notes(&notes, first.continuation, &ctx);
/// assert!(!second.markup.contains("In de praktijk:"));
/// ```
pub fn render_side_notes(
    notes: &SideNotes,
    continuation: Option<BoxKind>,
    ctx: &RenderContext,
) -> BoxRender {
    let mut render = BoxRender {
        markup: String::new(),
        continuation,
    };
    let kinds = [
        (BoxKind::Practice, notes.practice.as_deref()),
        (BoxKind::Deepening, notes.deepening.as_deref()),
    ];
    for (kind, text) in kinds {
        let Some(text) = text else {
            continue;
        };
        let show_label = render.continuation != Some(kind);
        let markup = render_box(kind, text, show_label, ctx);
        if !markup.is_empty() {
            render.markup.push_str(&markup);
            render.continuation = Some(kind);
        }
    }
    render
}

fn render_box(kind: BoxKind, raw: &str, show_label: bool, ctx: &RenderContext) -> String {
    let cleaned = clean_box_text(raw, &ctx.labels);
    let mut out = String::new();

    let segments = cleaned
        .split(BOX_SPLIT)
        .map(str::trim)
        .filter(|s| !strip_markers(s).is_empty());
    for (i, segment) in segments.enumerate() {
        let labelled = show_label && i == 0;
        let text = if labelled && ctx.config.typography.lowercase_after_label {
            lowercase_first_letter(segment)
        } else {
            segment.to_string()
        };
        let mut body = ctx.flowing(&text);
        if ctx.justified() {
            body = wrap_lead_phrase(&body);
        }

        let continued = if labelled { "" } else { " box-continued" };
        out.push_str(&format!(
            r#"<aside class="box {}{continued}"><p>"#,
            kind.class()
        ));
        if labelled {
            out.push_str(&format!(
                r#"<span class="box-label">{}</span> "#,
                escape_html(kind.label(&ctx.labels))
            ));
        }
        out.push_str(&body);
        out.push_str("</p></aside>\n");
    }
    out
}

/// Normalize raw side-note text: drop markdown heading hashes and leaked
/// labels, turn micro-titles into bold runs.
pub fn clean_box_text(raw: &str, labels: &TextLabels) -> String {
    let text = MD_HEADING_RE.replace_all(raw, "");
    let text = text
        .replace(MICRO_TITLE_END, &format!("{BOLD_END} "))
        .replace(MICRO_TITLE, BOLD_START);
    strip_leaked_label(&text, &labels.leaked_labels)
        .trim()
        .to_string()
}

/// Remove a label such as "In de praktijk:" that upstream copied into the
/// note text. Only a label followed by a colon is removed.
fn strip_leaked_label<'t>(text: &'t str, labels: &[String]) -> &'t str {
    let trimmed = text.trim_start();
    let (bold, body) = match trimmed.strip_prefix(BOLD_START) {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };

    for label in labels {
        let label = label.trim().trim_end_matches(':').trim_end();
        if label.is_empty() {
            continue;
        }
        let Some(head) = body.get(..label.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(label) {
            continue;
        }

        let mut rest = body[label.len()..].trim_start();
        let mut colon = false;
        if let Some(r) = rest.strip_prefix(':') {
            colon = true;
            rest = r.trim_start();
        }
        if bold {
            if let Some(r) = rest.strip_prefix(BOLD_END) {
                rest = r.trim_start();
            }
        }
        if !colon {
            if let Some(r) = rest.strip_prefix(':') {
                colon = true;
                rest = r.trim_start();
            }
        }
        if colon {
            return rest;
        }
    }
    text
}

/// Lower-case the first visible letter, unless the first word looks like an
/// abbreviation (two or more capitals or digits).
fn lowercase_first_letter(text: &str) -> String {
    let mut start = 0;
    loop {
        let rest = &text[start..];
        let trimmed = rest.trim_start();
        start += rest.len() - trimmed.len();
        match trimmed.strip_prefix(BOLD_START) {
            Some(_) => start += BOLD_START.len(),
            None => break,
        }
    }

    let rest = &text[start..];
    let first_word = strip_markers(rest.split_whitespace().next().unwrap_or(""));
    let capitals = first_word
        .chars()
        .filter(|c| c.is_uppercase() || c.is_ascii_digit())
        .count();
    if capitals >= 2 {
        return text.to_string();
    }

    let mut chars = rest.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            format!("{}{}{}", &text[..start], first.to_lowercase(), chars.as_str())
        }
        _ => text.to_string(),
    }
}
