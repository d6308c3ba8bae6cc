//! Embedded stylesheet.

use super::context::RenderContext;

const BASE_CSS: &str = include_str!("book.css");

/// The document stylesheet: the fixed base rules plus the rules that
/// depend on the render mode.
pub fn stylesheet(ctx: &RenderContext) -> String {
    let hyphens = if ctx.config.typography.hyphenate {
        "auto"
    } else {
        "manual"
    };
    format!(
        "{BASE_CSS}\nhtml {{ hyphens: {hyphens}; }}\nbody {{ text-align: {}; }}\n",
        ctx.text_align().as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::model::BookMeta;

    #[test]
    fn test_mode_rules() {
        let mut config = RenderConfig::default();
        config.typography.hyphenate = false;
        let css = stylesheet(&RenderContext::new(&BookMeta::default(), config));
        assert!(css.contains("html { hyphens: manual; }"));
        assert!(css.contains("body { text-align: justify; }"));
        assert!(css.contains(".box-lead { white-space: nowrap; }"));
    }
}
