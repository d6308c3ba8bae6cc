//! Marker constants and plain-text extraction.

use std::sync::LazyLock;

use regex::Regex;

pub const BOLD_START: &str = "<<BOLD_START>>";
pub const BOLD_END: &str = "<<BOLD_END>>";
pub const MICRO_TITLE: &str = "<<MICRO_TITLE>>";
pub const MICRO_TITLE_END: &str = "<<MICRO_TITLE_END>>";
pub const BOX_SPLIT: &str = "<<BOX_SPLIT>>";

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<<(?:BOLD_START|BOLD_END|MICRO_TITLE_END|MICRO_TITLE|BOX_SPLIT)>>")
        .expect("marker regex")
});

/// Attributes of a rich-text tag. Every attribute needs a value, so prose
/// such as `a<b en c>d` is never taken for markup.
const TAG_ATTRS: &str = r#"(?:\s+[A-Za-z_:][-A-Za-z0-9_:.]*\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'<>=]+))*\s*"#;

/// Rich-text tags tolerated in canonical strings. Captures the closing
/// slash and the tag name.
pub(crate) static TAG_PATTERN: LazyLock<String> = LazyLock::new(|| {
    format!(
        "<(/?)((?i:strong|b|em|i|u|sup|sub|small|span|a|font|br|p|div|li|ul|ol|h[1-6]\
         |section|blockquote|table|tr|td|th)){TAG_ATTRS}/?>"
    )
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(&TAG_PATTERN).expect("tag regex"));

static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is)<<BOLD_START>>(.*?)(?:<<BOLD_END>>|$)|<(strong|b|em){TAG_ATTRS}>(.*?)</(?:strong|b|em)\s*>"
    ))
    .expect("emphasis regex")
});

/// Collapse runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The visible text of a marked-up string: markers and tags removed,
/// whitespace collapsed.
///
/// # Examples
///
/// ```
/// use bookset::markup::strip_markers;
///
/// assert_eq!(
///     strip_markers("De <<BOLD_START>>cel<<BOLD_END>> is\n<em>klein</em>."),
///     "De cel is klein."
/// );
/// ```
pub fn strip_markers(s: &str) -> String {
    let without_markers = MARKER_RE.replace_all(s, |caps: &regex::Captures| {
        if caps[0].starts_with("<<BOLD") {
            ""
        } else {
            " "
        }
    });
    let without_tags = TAG_RE.replace_all(&without_markers, "");
    collapse_whitespace(&without_tags)
}

/// Normalized form of a title for equality checks: visible text, lowercase.
pub fn normalize_title(s: &str) -> String {
    strip_markers(s).to_lowercase()
}

/// The visible text of every emphasis span in `s`, in order.
///
/// Both bold markers and the `<strong>`, `<b>` and `<em>` tags count. An
/// unterminated bold marker runs to the end of the string.
pub fn emphasis_spans(s: &str) -> Vec<String> {
    EMPHASIS_RE
        .captures_iter(s)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(3)))
        .map(|m| strip_markers(m.as_str()))
        .filter(|span| !span.is_empty())
        .collect()
}
