//! HTML escaping.

/// Escape text for HTML content and attribute values.
///
/// Character references that are already present (`&amp;`, `&#160;`,
/// `&#x2060;`) are left alone, so escaping already-escaped text is a no-op.
///
/// # Examples
///
/// ```
/// use bookset::markup::escape_html;
///
/// assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
/// assert_eq!(escape_html("a &lt; b &amp; c"), "a &lt; b &amp; c");
/// assert_eq!(escape_html("R&D"), "R&amp;D");
/// ```
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + s.len() / 10);
    for (i, c) in s.char_indices() {
        match c {
            '&' if entity_len(&s[i..]).is_some() => result.push('&'),
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Length of a character reference at the start of `s`, if there is one.
pub(crate) fn entity_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'&') {
        return None;
    }

    let (start, valid): (usize, fn(u8) -> bool) = match (bytes.get(1), bytes.get(2)) {
        (Some(b'#'), Some(b'x' | b'X')) => (3, |b| b.is_ascii_hexdigit()),
        (Some(b'#'), _) => (2, |b| b.is_ascii_digit()),
        (Some(b), _) if b.is_ascii_alphabetic() => (1, |b| b.is_ascii_alphanumeric()),
        _ => return None,
    };

    let body = bytes[start..].iter().take_while(|&&b| valid(b)).count();
    if body == 0 || body > 10 {
        return None;
    }
    (bytes.get(start + body) == Some(&b';')).then_some(start + body + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escape_specials() {
        assert_eq!(escape_html(r#"<a href="x">'"#), "&lt;a href=&quot;x&quot;&gt;&#39;");
    }

    #[test]
    fn test_existing_entities_kept() {
        assert_eq!(escape_html("&amp;&#160;&#x2060;&nbsp;"), "&amp;&#160;&#x2060;&nbsp;");
    }

    #[test]
    fn test_bare_ampersands() {
        assert_eq!(escape_html("& ;"), "&amp; ;");
        assert_eq!(escape_html("&#;"), "&amp;#;");
        assert_eq!(escape_html("&#xZ;"), "&amp;#xZ;");
        assert_eq!(escape_html("AT&T"), "AT&amp;T");
    }

    proptest! {
        #[test]
        fn prop_escape_is_idempotent(s in "[a-z &<>;#\"']{0,40}") {
            let once = escape_html(&s);
            prop_assert_eq!(escape_html(&once), once);
        }
    }
}
