//! Figure rendering and high-resolution overlay lookup.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;

use crate::error::{Error, Result};
use crate::markup::escape_html;
use crate::model::Figure;

use super::context::RenderContext;

static FIGURE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)*").expect("figure number regex"));

/// Replacement asset paths keyed by figure number ("1.2") or file name.
#[derive(Debug, Clone, Default)]
pub struct FigureOverlays {
    entries: HashMap<String, String>,
}

impl FigureOverlays {
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into().trim().to_string(), v.into()))
                .collect(),
        }
    }

    /// Parse the JSON form: `{ "1.2": "hires/1.2.png", "cel.png": "hires/cel.png" }`.
    pub fn from_json(json: &str) -> Result<Self> {
        let map: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self::from_entries(map))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The asset path to use for `figure`: an overlay by figure number, then
    /// by file name, then by full source path, else the original source.
    ///
    /// ```
    /// use bookset::model::Figure;
    /// use bookset::render::FigureOverlays;
    ///
    /// let overlays = FigureOverlays::from_entries([("1.2", "hires/fig-1-2.png")]);
    /// let figure = Figure {
    ///     src: "img/cel.png".into(),
    ///     figure_number: Some("Afbeelding 1.2:".into()),
    ///     ..Default::default()
    /// };
    /// assert_eq!(overlays.resolve(&figure), "hires/fig-1-2.png");
    /// ```
    pub fn resolve<'a>(&'a self, figure: &'a Figure) -> &'a str {
        let by_number = figure
            .figure_number
            .as_deref()
            .and_then(|n| FIGURE_NUMBER_RE.find(n))
            .and_then(|m| self.entries.get(m.as_str()));
        let by_name = || {
            Path::new(&figure.src)
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| self.entries.get(name))
        };
        by_number
            .or_else(by_name)
            .or_else(|| self.entries.get(figure.src.trim()))
            .map(String::as_str)
            .unwrap_or(&figure.src)
    }
}

/// Result of rendering one figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FigureMarkup {
    Rendered(String),
    /// The asset could not be found; carries the original source.
    Missing(String),
}

fn is_remote(src: &str) -> bool {
    ["http://", "https://", "data:"]
        .iter()
        .any(|scheme| src.starts_with(scheme))
}

fn asset_exists(src: &str, ctx: &RenderContext) -> bool {
    if src.trim().is_empty() {
        return false;
    }
    match &ctx.asset_root {
        Some(_) if is_remote(src) => true,
        Some(root) => root.join(src).exists(),
        None => true,
    }
}

/// Render a figure with its number and caption.
///
/// Assets are only checked when the context has an asset root. A missing
/// asset skips the whole figure, caption included.
pub fn render_figure(figure: &Figure, ctx: &RenderContext) -> FigureMarkup {
    let src = ctx.overlays.resolve(figure);
    if !asset_exists(src, ctx) {
        warn!("Figure asset not found, skipping: {}", figure.src);
        return FigureMarkup::Missing(figure.src.clone());
    }
    if src != figure.src {
        debug!("Figure overlay: {} -> {}", figure.src, src);
    }

    let mut out = String::from(r#"<figure class="figure">"#);
    out.push_str(&format!(
        r#"<img src="{}" alt="{}"/>"#,
        escape_html(src),
        escape_html(&figure.alt)
    ));

    let number = figure
        .figure_number
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let caption = figure
        .caption
        .as_deref()
        .map(|c| ctx.flowing(c))
        .filter(|c| !c.is_empty());
    if number.is_some() || caption.is_some() {
        out.push_str("<figcaption>");
        if let Some(number) = number {
            out.push_str(&format!(
                r#"<span class="figure-number">{}</span>"#,
                escape_html(number)
            ));
            if caption.is_some() {
                out.push(' ');
            }
        }
        if let Some(caption) = caption {
            out.push_str(&caption);
        }
        out.push_str("</figcaption>");
    }
    out.push_str("</figure>\n");
    FigureMarkup::Rendered(out)
}

/// Render a sequence of figures, recording the sources of any that are missing.
pub fn render_figures(figures: &[Figure], ctx: &RenderContext, missing: &mut Vec<String>) -> String {
    let mut out = String::new();
    for figure in figures {
        match render_figure(figure, ctx) {
            FigureMarkup::Rendered(markup) => out.push_str(&markup),
            FigureMarkup::Missing(src) => missing.push(src),
        }
    }
    out
}
