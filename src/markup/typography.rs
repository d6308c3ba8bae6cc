//! Advisory typography for justified, flowing text.
//!
//! Nothing here changes what the reader sees, only where the compositor may
//! break or stretch a line.

use regex::Regex;

/// U+00A0 NO-BREAK SPACE.
pub const NBSP: char = '\u{a0}';

/// Binds connector words ("zoals", "bijvoorbeeld", "such as") and colons to
/// the following word so a connector is never stranded at a line end.
#[derive(Debug, Clone)]
pub struct ConnectorJoiner {
    connectors: Option<Regex>,
    after_colon: bool,
}

impl ConnectorJoiner {
    pub fn new(connectors: &[String], after_colon: bool) -> Self {
        let alternation = connectors
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");
        let connectors = if alternation.is_empty() {
            None
        } else {
            Regex::new(&format!(r"(?i)\b({alternation}) ")).ok()
        };
        Self {
            connectors,
            after_colon,
        }
    }

    /// Apply the joins to already-rendered inline markup.
    ///
    /// Idempotent: joined spaces are no longer plain spaces.
    pub fn apply(&self, rendered: &str) -> String {
        let mut out = match &self.connectors {
            Some(re) => re
                .replace_all(rendered, |caps: &regex::Captures| format!("{}{NBSP}", &caps[1]))
                .into_owned(),
            None => rendered.to_string(),
        };
        if self.after_colon {
            out = out.replace(": ", &format!(":{NBSP}"));
        }
        out
    }
}

/// Wrap the first two words of rendered box text so justification cannot
/// stretch the gap between them.
///
/// A no-op when either word carries markup or the text has fewer than three
/// words.
///
/// # Examples
///
/// ```
/// use bookset::markup::wrap_lead_phrase;
///
/// assert_eq!(
///     wrap_lead_phrase("bij het wassen let je op"),
///     r#"<span class="box-lead">bij het</span> wassen let je op"#
/// );
/// assert_eq!(wrap_lead_phrase("<strong>bij</strong> het wassen"), "<strong>bij</strong> het wassen");
/// ```
pub fn wrap_lead_phrase(rendered: &str) -> String {
    let mut parts = rendered.splitn(3, ' ');
    let (Some(first), Some(second), Some(rest)) = (parts.next(), parts.next(), parts.next())
    else {
        return rendered.to_string();
    };
    if first.is_empty() || second.is_empty() || rest.is_empty() {
        return rendered.to_string();
    }
    if first.contains('<') || second.contains('<') {
        return rendered.to_string();
    }
    format!(r#"<span class="box-lead">{first} {second}</span> {rest}"#)
}
