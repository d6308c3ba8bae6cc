//! Inline marker rendering.
//!
//! Text is first split into [`Token`]s by a single left-to-right scan, then
//! written out by a small state machine that tracks whether an emphasis span
//! is open. Rich-text tags that slip through from upstream generation are
//! tolerated: `<strong>`, `<b>` and `<em>` act as bold markers, `<br>` as a
//! newline, block tags as whitespace, and other known inline tags are
//! dropped. Angle brackets that do not form a known tag stay text.

use std::sync::LazyLock;

use regex::Regex;

use super::escape::escape_html;
use super::hyphenation::HyphenationExceptions;
use super::markers::TAG_PATTERN;
use super::typography::ConnectorJoiner;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"<<(BOLD_START|BOLD_END|MICRO_TITLE_END|MICRO_TITLE|BOX_SPLIT)>>|{}|\r?\n",
        *TAG_PATTERN
    ))
    .expect("token regex")
});

/// A lexical unit of marked-up text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    BoldOpen,
    BoldClose,
    /// A literal newline or `<br>`.
    Break,
    /// Whitespace left behind by a stripped block-level tag.
    Space,
    MicroOpen,
    MicroClose,
    BoxSplit,
}

/// Split marked-up text into tokens. Unknown tags produce no token.
///
/// # Examples
///
/// ```
/// use bookset::markup::{Token, tokenize};
///
/// let tokens = tokenize("a <<BOLD_START>>b<<BOLD_END>>\nc");
/// assert_eq!(
///     tokens,
///     vec![
///         Token::Text("a "),
///         Token::BoldOpen,
///         Token::Text("b"),
///         Token::BoldClose,
///         Token::Break,
///         Token::Text("c"),
///     ]
/// );
/// ```
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in TOKEN_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(Token::Text(&text[last..whole.start()]));
        }
        last = whole.end();

        if let Some(marker) = caps.get(1) {
            tokens.push(match marker.as_str() {
                "BOLD_START" => Token::BoldOpen,
                "BOLD_END" => Token::BoldClose,
                "MICRO_TITLE" => Token::MicroOpen,
                "MICRO_TITLE_END" => Token::MicroClose,
                _ => Token::BoxSplit,
            });
        } else if let Some(name) = caps.get(3) {
            let closing = caps.get(2).is_some_and(|m| !m.as_str().is_empty());
            if let Some(token) = tag_token(name.as_str(), closing) {
                tokens.push(token);
            }
        } else {
            tokens.push(Token::Break);
        }
    }

    if last < text.len() {
        tokens.push(Token::Text(&text[last..]));
    }
    tokens
}

fn tag_token(name: &str, closing: bool) -> Option<Token<'static>> {
    match name.to_ascii_lowercase().as_str() {
        "strong" | "b" | "em" if closing => Some(Token::BoldClose),
        "strong" | "b" | "em" => Some(Token::BoldOpen),
        "br" => Some(Token::Break),
        "p" | "div" | "li" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
        | "section" | "blockquote" | "tr" | "td" | "th" | "table" => Some(Token::Space),
        _ => None,
    }
}

/// Options for a single inline render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineOptions {
    /// Render newlines as forced breaks. When false, newlines collapse to a
    /// space and the flowing-text joins are applied.
    pub preserve_line_breaks: bool,
}

impl InlineOptions {
    pub fn flowing() -> Self {
        Self {
            preserve_line_breaks: false,
        }
    }

    pub fn preserving() -> Self {
        Self {
            preserve_line_breaks: true,
        }
    }
}

/// Renders marked-up strings to HTML inline markup.
///
/// Holds borrowed, immutable per-render tables; cheap to construct.
#[derive(Debug, Clone, Copy)]
pub struct InlineRenderer<'a> {
    hyphenation: Option<&'a HyphenationExceptions>,
    joiner: Option<&'a ConnectorJoiner>,
}

impl Default for InlineRenderer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> InlineRenderer<'a> {
    /// A renderer without hyphenation exceptions or typographic joins.
    pub fn new() -> Self {
        Self {
            hyphenation: None,
            joiner: None,
        }
    }

    pub fn with_hyphenation(mut self, exceptions: &'a HyphenationExceptions) -> Self {
        self.hyphenation = Some(exceptions);
        self
    }

    pub fn with_joiner(mut self, joiner: &'a ConnectorJoiner) -> Self {
        self.joiner = Some(joiner);
        self
    }

    /// Render `text` to inline markup.
    ///
    /// Unmatched `BOLD_START` closes at the end of the string; stray
    /// `BOLD_END` is ignored. Micro-title and box-split markers are dropped
    /// (callers segment on them first).
    pub fn render(&self, text: &str, opts: InlineOptions) -> String {
        let mut writer = InlineWriter::new(opts.preserve_line_breaks);

        for token in tokenize(text) {
            match token {
                Token::Text(t) => match self.hyphenation {
                    Some(exceptions) => writer.write_text(&exceptions.apply(t)),
                    None => writer.write_text(t),
                },
                Token::BoldOpen => writer.open_bold(),
                Token::BoldClose => writer.close_bold(),
                Token::Break => writer.line_break(),
                Token::Space | Token::MicroOpen | Token::MicroClose | Token::BoxSplit => {
                    writer.pending_space = true
                }
            }
        }

        let out = writer.finish();
        match self.joiner {
            Some(joiner) if !opts.preserve_line_breaks => joiner.apply(&out),
            _ => out,
        }
    }
}

/// Render with no exception table and no typographic joins.
///
/// # Examples
///
/// ```
/// use bookset::markup::{InlineOptions, render_inline};
///
/// assert_eq!(
///     render_inline("<<BOLD_START>>Let op<<BOLD_END>>\nheet", InlineOptions::flowing()),
///     "<strong>Let op</strong> heet"
/// );
/// assert_eq!(
///     render_inline("regel 1\nregel 2", InlineOptions::preserving()),
///     "regel 1<br/>regel 2"
/// );
/// ```
pub fn render_inline(text: &str, opts: InlineOptions) -> String {
    InlineRenderer::new().render(text, opts)
}

/// Output state for one inline render.
struct InlineWriter {
    out: String,
    preserve_breaks: bool,
    /// A `<strong>` has been written and not yet closed.
    bold_open: bool,
    /// Bold was requested but no text has followed yet.
    bold_pending: bool,
    pending_space: bool,
    pending_breaks: usize,
    has_content: bool,
}

impl InlineWriter {
    fn new(preserve_breaks: bool) -> Self {
        Self {
            out: String::new(),
            preserve_breaks,
            bold_open: false,
            bold_pending: false,
            pending_space: false,
            pending_breaks: 0,
            has_content: false,
        }
    }

    fn write_text(&mut self, text: &str) {
        if text.starts_with(char::is_whitespace) {
            self.pending_space = true;
        }
        let mut words = text.split_whitespace().peekable();
        while let Some(word) = words.next() {
            self.begin_content();
            self.out.push_str(&escape_html(word));
            if words.peek().is_some() {
                self.pending_space = true;
            }
        }
        if text.ends_with(char::is_whitespace) {
            self.pending_space = true;
        }
    }

    /// Flush pending separators and a pending bold open before content.
    fn begin_content(&mut self) {
        if self.has_content {
            if self.pending_breaks > 0 {
                for _ in 0..self.pending_breaks.min(2) {
                    self.out.push_str("<br/>");
                }
            } else if self.pending_space {
                self.out.push(' ');
            }
        }
        self.pending_breaks = 0;
        self.pending_space = false;

        if self.bold_pending {
            self.out.push_str("<strong>");
            self.bold_open = true;
            self.bold_pending = false;
        }
        self.has_content = true;
    }

    fn open_bold(&mut self) {
        if !self.bold_open {
            self.bold_pending = true;
        }
    }

    fn close_bold(&mut self) {
        if self.bold_open {
            self.out.push_str("</strong>");
            self.bold_open = false;
        }
        self.bold_pending = false;
    }

    fn line_break(&mut self) {
        if self.preserve_breaks {
            self.pending_breaks += 1;
        } else {
            self.pending_space = true;
        }
    }

    fn finish(mut self) -> String {
        if self.bold_open {
            self.out.push_str("</strong>");
        }
        self.out
    }
}
