//! Pure layout predicates.
//!
//! Each heuristic is a small function over text and a threshold struct so it
//! can be tested and tuned without the traversal around it.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{LabelHeuristic, ListThresholds};
use crate::markup::{MICRO_TITLE, entity_len, strip_markers};
use crate::model::Paragraph;

/// '.', '!' or '?' followed by whitespace or the end of the text.
static SENTENCE_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?](?:\s|$)").expect("sentence end regex"));

/// "Label. Explanation": a short lead, a period, then the rest.
static LABEL_LEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.{1,120}?)\.\s+(\S.*)$").expect("label lead regex"));

/// Abbreviations whose period is not a sentence end.
const ABBREVIATIONS: &[&str] = &[
    "bijv", "bv", "o.a", "ca", "nr", "dr", "mr", "e.g", "i.e", "etc", "vs", "zgn", "incl",
    "excl", "evt", "resp", "fig", "afb",
];

/// A "short parallel item": a fragment, not a sentence.
///
/// No sentence-ending punctuation, at most `max_item_chars` characters and
/// `max_item_tokens` words of visible text.
///
/// # Examples
///
/// ```
/// use bookset::config::ListThresholds;
/// use bookset::render::is_short_parallel_item;
///
/// let t = ListThresholds::default();
/// assert!(is_short_parallel_item("de <<BOLD_START>>celkern<<BOLD_END>>", &t));
/// assert!(!is_short_parallel_item("De celkern stuurt de cel aan.", &t));
/// assert!(is_short_parallel_item("pH 7.4 in bloed", &t));
/// ```
pub fn is_short_parallel_item(text: &str, thresholds: &ListThresholds) -> bool {
    let visible = strip_markers(text);
    if visible.is_empty() {
        return false;
    }
    !SENTENCE_END_RE.is_match(&visible)
        && visible.chars().count() <= thresholds.max_item_chars
        && visible.split_whitespace().count() <= thresholds.max_item_tokens
}

/// Items with visible text.
pub fn non_empty<'a, S: AsRef<str>>(items: &'a [S]) -> Vec<&'a str> {
    items
        .iter()
        .map(AsRef::as_ref)
        .filter(|item| !strip_markers(item).is_empty())
        .collect()
}

fn short_ratio(items: &[&str], thresholds: &ListThresholds) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let short = items
        .iter()
        .filter(|item| is_short_parallel_item(item, thresholds))
        .count();
    short as f64 / items.len() as f64
}

/// The KEEP rule for a top-level list: an item count within bounds and
/// enough short parallel items.
///
/// # Examples
///
/// ```
/// use bookset::config::ListThresholds;
/// use bookset::render::should_keep_list;
///
/// let t = ListThresholds::default();
/// assert!(should_keep_list(&["hart", "longen", "lever"], &t));
/// assert!(!should_keep_list(&["Het hart.", "De longen.", "De lever."], &t));
/// assert!(!should_keep_list(&["hart"], &t));
/// ```
pub fn should_keep_list<S: AsRef<str>>(items: &[S], thresholds: &ListThresholds) -> bool {
    let items = non_empty(items);
    (thresholds.min_items..=thresholds.max_items).contains(&items.len())
        && short_ratio(&items, thresholds) >= thresholds.short_ratio
}

/// The KEEP rule for a list nested under an open parent: a single item is
/// enough.
pub fn should_keep_nested<S: AsRef<str>>(items: &[S], thresholds: &ListThresholds) -> bool {
    let items = non_empty(items);
    (1..=thresholds.max_items).contains(&items.len())
        && short_ratio(&items, thresholds) >= thresholds.short_ratio
}

/// True if every visible item is a short parallel item.
pub fn all_short<S: AsRef<str>>(items: &[S], thresholds: &ListThresholds) -> bool {
    let items = non_empty(items);
    !items.is_empty()
        && items
            .iter()
            .all(|item| is_short_parallel_item(item, thresholds))
}

/// True if the visible text ends with a colon (a list-introducing sentence).
pub fn ends_with_colon(text: &str) -> bool {
    strip_markers(text).ends_with(':')
}

/// Replace the trailing colon of `raw` with a period, keeping any markers
/// or tags that follow it.
///
/// ```
/// use bookset::render::fix_trailing_colon;
///
/// assert_eq!(fix_trailing_colon("Let op:\n"), "Let op.\n");
/// assert_eq!(fix_trailing_colon("<<BOLD_START>>Let op:<<BOLD_END>>"), "<<BOLD_START>>Let op.<<BOLD_END>>");
/// assert_eq!(fix_trailing_colon("tijd: 10 min"), "tijd: 10 min");
/// ```
pub fn fix_trailing_colon(raw: &str) -> String {
    match raw.rfind(':') {
        Some(pos) if strip_markers(&raw[pos + 1..]).is_empty() => {
            format!("{}.{}", &raw[..pos], &raw[pos + 1..])
        }
        _ => raw.to_string(),
    }
}

/// Items of a paragraph that is really a list written inline with
/// semicolons, plus whether it is numbered.
///
/// Only paragraphs marked as list-like qualify: a style hint starting with
/// `_` or mentioning bullets or numbering, or a bullet or step role. The
/// `;` that closes a character reference such as `&amp;` never splits.
pub fn semicolon_list_items(paragraph: &Paragraph) -> Option<(Vec<String>, bool)> {
    let hint = paragraph.style_hint.as_deref().unwrap_or("").to_lowercase();
    let role = paragraph.role.as_deref().unwrap_or("").to_lowercase();
    let numbered = hint.contains("numbered") || role.contains("step");
    let bulleted = hint.starts_with('_') || hint.contains("bullet") || role.contains("bullet");
    if !bulleted && !numbered {
        return None;
    }
    if paragraph.basis.contains(MICRO_TITLE) {
        return None;
    }
    let items: Vec<String> = split_list_semicolons(&paragraph.basis)
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();
    (items.len() >= 2).then_some((items, numbered))
}

/// Split on `;` separators, skipping the ones that end a character reference.
fn split_list_semicolons(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'&' => match entity_len(&text[i..]) {
                Some(len) => i += len,
                None => i += 1,
            },
            b';' => {
                parts.push(&text[start..i]);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Detect a "Label. Explanation…" opening in a demoted list item.
///
/// Returns the raw label and the raw remainder. Deliberately conservative:
/// a false negative only loses a micro-heading, a false positive turns an
/// ordinary sentence into one.
///
/// The label must be capitalized, at most `max_tokens` words, free of
/// pronouns, inner punctuation and known abbreviations, must not have a
/// verb-like second word or any later word with a verb suffix, and must not
/// end in a separable verb particle. The explanation must start with a
/// capital or a digit.
///
/// # Examples
///
/// ```
/// use bookset::config::LabelHeuristic;
/// use bookset::render::split_label_lead;
///
/// let h = LabelHeuristic::default();
/// let (label, rest) = split_label_lead("Handhygiëne. Was altijd je handen.", &h).unwrap();
/// assert_eq!(label, "Handhygiëne");
/// assert_eq!(rest, "Was altijd je handen.");
///
/// assert!(split_label_lead("Je wast je handen. Daarna droog je ze af.", &h).is_none());
/// ```
pub fn split_label_lead(raw: &str, heuristic: &LabelHeuristic) -> Option<(String, String)> {
    let caps = LABEL_LEAD_RE.captures(raw.trim())?;
    let label_raw = caps.get(1)?.as_str();
    let rest_raw = caps.get(2)?.as_str();

    let label = strip_markers(label_raw);
    let rest = strip_markers(rest_raw);
    if label.chars().count() < 3 || rest.is_empty() {
        return None;
    }
    if label.contains([',', ';', ':', '!', '?', '(', ')']) {
        return None;
    }
    if !label.chars().next().is_some_and(char::is_uppercase) {
        return None;
    }
    if !rest
        .chars()
        .find(|c| c.is_alphanumeric())
        .is_some_and(|c| c.is_uppercase() || c.is_ascii_digit())
    {
        return None;
    }

    let tokens: Vec<String> = label.split_whitespace().map(str::to_lowercase).collect();
    if tokens.is_empty() || tokens.len() > heuristic.max_tokens {
        return None;
    }
    let in_list = |word: &str, list: &[String]| list.iter().any(|w| w.eq_ignore_ascii_case(word));

    if tokens.iter().any(|t| in_list(t, &heuristic.pronouns)) {
        return None;
    }
    if tokens.get(1).is_some_and(|t| in_list(t, &heuristic.verb_like)) {
        return None;
    }
    if tokens.iter().skip(1).any(|t| {
        t.chars().count() >= 4
            && heuristic
                .verb_suffixes
                .iter()
                .any(|suffix| !suffix.is_empty() && t.ends_with(suffix.as_str()))
    }) {
        return None;
    }
    let last = tokens.last()?;
    if in_list(last, &heuristic.particles) || ABBREVIATIONS.contains(&last.as_str()) {
        return None;
    }

    Some((label_raw.trim().to_string(), rest_raw.trim().to_string()))
}
