//! Heading text and stable anchor ids.
//!
//! Titles in the canonical tree often repeat their own number ("1.2 De cel"
//! under number "1.2"). The number is displayed separately, so it is
//! stripped from the title here. Anchor ids are derived from structural
//! numbers, never generated, so cross-references survive re-renders.

use crate::markup::{normalize_title, strip_markers};

/// Generate an anchor slug: ASCII alphanumerics lowercased, every other run
/// of characters collapsed to a single hyphen.
///
/// # Examples
///
/// ```
/// use bookset::render::slugify;
///
/// assert_eq!(slugify("1.2.3"), "1-2-3");
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("  p_12 "), "p-12");
/// ```
pub fn slugify(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn chapter_id(number: &str) -> String {
    format!("ch-{}", slugify(number))
}

pub fn section_id(number: &str) -> String {
    format!("sec-{}", slugify(number))
}

pub fn subparagraph_id(number: &str) -> String {
    format!("sp-{}", slugify(number))
}

/// Anchor for a content block. Block ids are only unique per chapter.
pub fn block_anchor(chapter_number: &str, block_id: &str) -> String {
    format!("b-{}-{}", slugify(chapter_number), slugify(block_id))
}

/// Remove a leading copy of `number` (repeated or not) from `title`.
///
/// The number must end at a boundary: "1.2" is not stripped from
/// "1.20 Bloed", and "1" is not stripped from "1.2 Bloed".
///
/// # Examples
///
/// ```
/// use bookset::render::strip_number_prefix;
///
/// assert_eq!(strip_number_prefix("1.2", "1.2 De cel"), "De cel");
/// assert_eq!(strip_number_prefix("1.2", "1.2. 1.2: De cel"), "De cel");
/// assert_eq!(strip_number_prefix("1.2", "1.20 Bloed"), "1.20 Bloed");
/// assert_eq!(strip_number_prefix("1", "1.2 Bloed"), "1.2 Bloed");
/// ```
pub fn strip_number_prefix(number: &str, title: &str) -> String {
    let number = number.trim();
    let mut rest = title.trim();
    if number.is_empty() {
        return rest.to_string();
    }

    while let Some(after) = rest.strip_prefix(number) {
        if !is_number_boundary(after) {
            break;
        }
        rest = after
            .trim_start_matches(|c: char| {
                c.is_whitespace() || matches!(c, '.' | ':' | ')' | '-' | '–' | '—')
            });
    }
    rest.to_string()
}

fn is_number_boundary(after: &str) -> bool {
    let mut chars = after.chars();
    match chars.next() {
        None => true,
        Some('.') => !chars.next().is_some_and(|c| c.is_ascii_digit()),
        Some(c) => !c.is_alphanumeric(),
    }
}

/// Remove "Hoofdstuk 3" / "Chapter 3" style prefixes, then the bare number.
pub fn strip_chapter_prefix(prefix: &str, number: &str, title: &str) -> String {
    let title = title.trim();
    let prefix = prefix.trim();
    if !prefix.is_empty()
        && title.len() > prefix.len()
        && title.is_char_boundary(prefix.len())
        && title[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        let after = title[prefix.len()..].trim_start();
        let stripped = strip_number_prefix(number, after);
        if stripped != after {
            return stripped;
        }
    }
    strip_number_prefix(number, title)
}

/// Visible heading title with the duplicated number removed.
pub fn heading_title(number: &str, title: &str) -> String {
    strip_number_prefix(number, &strip_markers(title))
}

/// True if `text` just repeats a heading, with or without its number.
///
/// Used to spot paragraphs inside a subparagraph that restate its title.
pub fn is_redundant_heading(text: &str, number: &str, title: &str) -> bool {
    let text = normalize_title(text);
    let title = normalize_title(title);
    if text.is_empty() || title.is_empty() {
        return false;
    }
    let bare_text = strip_number_prefix(number, &text);
    let bare_title = strip_number_prefix(number, &title);
    let trim = |s: &str| s.trim_end_matches(['.', ':']).trim().to_string();
    trim(&bare_text) == trim(&bare_title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("--a..b--"), "a-b");
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("Ü"), "");
    }

    #[test]
    fn test_ids_are_stable() {
        assert_eq!(chapter_id("3"), "ch-3");
        assert_eq!(section_id("3.1"), "sec-3-1");
        assert_eq!(subparagraph_id("3.1.2"), "sp-3-1-2");
        assert_eq!(block_anchor("3", "p_0004"), "b-3-p-0004");
    }

    #[test]
    fn test_strip_number_prefix_keeps_title_without_number() {
        assert_eq!(strip_number_prefix("2.1", "De bloedsomloop"), "De bloedsomloop");
        assert_eq!(strip_number_prefix("", " Titel "), "Titel");
    }

    #[test]
    fn test_strip_number_only_title() {
        assert_eq!(strip_number_prefix("4", "4"), "");
    }

    #[test]
    fn test_strip_chapter_prefix() {
        assert_eq!(strip_chapter_prefix("Hoofdstuk", "3", "Hoofdstuk 3: De cel"), "De cel");
        assert_eq!(strip_chapter_prefix("Hoofdstuk", "3", "3 De cel"), "De cel");
        assert_eq!(strip_chapter_prefix("Hoofdstuk", "3", "Hoofdstukken"), "Hoofdstukken");
    }

    #[test]
    fn test_heading_title_strips_markers() {
        assert_eq!(heading_title("1.1", "1.1 <<BOLD_START>>Cellen<<BOLD_END>>"), "Cellen");
    }

    #[test]
    fn test_redundant_heading() {
        assert!(is_redundant_heading("De celwand", "1.2.1", "De celwand"));
        assert!(is_redundant_heading("1.2.1 De Celwand.", "1.2.1", "De celwand"));
        assert!(is_redundant_heading("<<BOLD_START>>De celwand<<BOLD_END>>", "1.2.1", "1.2.1 De celwand"));
        assert!(!is_redundant_heading("De celwand is stevig.", "1.2.1", "De celwand"));
        assert!(!is_redundant_heading("", "1.2.1", "De celwand"));
    }
}
