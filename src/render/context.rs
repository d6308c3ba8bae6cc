//! Per-render state shared by every renderer.

use std::path::{Path, PathBuf};

use crate::config::{RenderConfig, TextAlign, TextLabels};
use crate::markup::{ConnectorJoiner, HyphenationExceptions, InlineOptions, InlineRenderer};
use crate::model::BookMeta;

use super::figures::FigureOverlays;

/// Immutable inputs for one document render.
///
/// Built once per book and passed by reference through the traversal.
/// Mutable traversal state (label continuation, collected manifest
/// entries) lives in the assembler, not here.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub config: RenderConfig,
    pub labels: TextLabels,
    pub hyphenation: Option<HyphenationExceptions>,
    pub overlays: FigureOverlays,
    /// Directory figure sources are resolved against for existence checks.
    pub asset_root: Option<PathBuf>,
    pub book_title: String,
    pub book_level: String,
    pub language: String,
    joiner: ConnectorJoiner,
}

impl RenderContext {
    pub fn new(meta: &BookMeta, config: RenderConfig) -> Self {
        let labels = config
            .text
            .clone()
            .unwrap_or_else(|| TextLabels::for_language(&meta.language));
        let joiner = ConnectorJoiner::new(
            &config.typography.connectors,
            config.typography.join_after_colon,
        );
        Self {
            labels,
            hyphenation: None,
            overlays: FigureOverlays::default(),
            asset_root: None,
            book_title: meta.title.clone(),
            book_level: meta.level.clone(),
            language: meta.language.clone(),
            joiner,
            config,
        }
    }

    pub fn with_hyphenation(mut self, exceptions: HyphenationExceptions) -> Self {
        self.hyphenation = Some(exceptions);
        self
    }

    pub fn with_overlays(mut self, overlays: FigureOverlays) -> Self {
        self.overlays = overlays;
        self
    }

    pub fn with_asset_root(mut self, root: impl AsRef<Path>) -> Self {
        self.asset_root = Some(root.as_ref().to_path_buf());
        self
    }

    pub fn text_align(&self) -> TextAlign {
        self.config.typography.text_align
    }

    pub fn justified(&self) -> bool {
        self.text_align() == TextAlign::Justify
    }

    /// Inline renderer carrying this book's hyphenation table and joins.
    pub fn inline(&self) -> InlineRenderer<'_> {
        let renderer = InlineRenderer::new().with_joiner(&self.joiner);
        match &self.hyphenation {
            Some(exceptions) => renderer.with_hyphenation(exceptions),
            None => renderer,
        }
    }

    /// Render flowing body text.
    pub fn flowing(&self, text: &str) -> String {
        self.inline().render(text, InlineOptions::flowing())
    }

    /// Render text whose line breaks are meaningful.
    pub fn preserving(&self, text: &str) -> String {
        self.inline().render(text, InlineOptions::preserving())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(language: &str) -> BookMeta {
        BookMeta {
            title: "Anatomie".into(),
            level: "3".into(),
            language: language.into(),
        }
    }

    #[test]
    fn test_labels_follow_language() {
        let ctx = RenderContext::new(&meta("en"), RenderConfig::default());
        assert_eq!(ctx.labels.practice_label, "In practice:");
    }

    #[test]
    fn test_configured_labels_win() {
        let config = RenderConfig {
            text: Some(TextLabels::dutch()),
            ..Default::default()
        };
        let ctx = RenderContext::new(&meta("en"), config);
        assert_eq!(ctx.labels.practice_label, "In de praktijk:");
    }

    #[test]
    fn test_flowing_applies_joins_and_hyphenation() {
        let ctx = RenderContext::new(&meta("nl"), RenderConfig::default())
            .with_hyphenation(HyphenationExceptions::from_entries([("zuurstof", vec![4])]));
        assert_eq!(
            ctx.flowing("organen zoals de zuurstof"),
            "organen zoals\u{a0}de zuur\u{2060}stof"
        );
        assert_eq!(ctx.preserving("zoals\nde"), "zoals<br/>de");
    }
}
