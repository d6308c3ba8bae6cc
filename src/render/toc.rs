//! Table of contents.

use crate::markup::escape_html;
use crate::model::Book;

use super::context::RenderContext;
use super::heading::{chapter_id, heading_title, section_id, strip_chapter_prefix};

/// An entry in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Anchor id the entry links to.
    pub id: String,
    pub number: String,
    pub title: String,
    pub children: Vec<TocEntry>,
}

/// Chapters with their titled sections, in reading order.
pub fn build_toc(book: &Book, ctx: &RenderContext) -> Vec<TocEntry> {
    book.chapters
        .iter()
        .map(|chapter| TocEntry {
            id: chapter_id(&chapter.number),
            number: chapter.number.clone(),
            title: strip_chapter_prefix(
                &ctx.labels.chapter_prefix,
                &chapter.number,
                &heading_title("", &chapter.title),
            ),
            children: chapter
                .sections
                .iter()
                .filter_map(|section| {
                    let title = heading_title(&section.number, section.title.as_deref()?);
                    (!title.is_empty()).then(|| TocEntry {
                        id: section_id(&section.number),
                        number: section.number.clone(),
                        title,
                        children: Vec::new(),
                    })
                })
                .collect(),
        })
        .collect()
}

/// Render the contents page. Page numbers are filled in by the compositor
/// from the link targets.
pub fn render_toc(entries: &[TocEntry], ctx: &RenderContext) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let mut out = String::from("<nav class=\"toc\" id=\"toc\">\n");
    out.push_str(&format!(
        "<h1 class=\"toc-title\">{}</h1>\n",
        escape_html(&ctx.labels.contents_title)
    ));
    write_entries(&mut out, entries, 1);
    out.push_str("</nav>\n");
    out
}

fn write_entries(out: &mut String, entries: &[TocEntry], depth: usize) {
    out.push_str(&format!("<ol class=\"toc-level-{depth}\">\n"));
    for entry in entries {
        out.push_str(&format!(
            "<li><a href=\"#{}\"><span class=\"toc-number\">{}</span> {}</a>",
            entry.id,
            escape_html(&entry.number),
            escape_html(&entry.title)
        ));
        if !entry.children.is_empty() {
            out.push('\n');
            write_entries(out, &entry.children, depth + 1);
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ol>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::model::{BookMeta, Chapter, Section};

    fn book() -> Book {
        Book {
            meta: BookMeta::default(),
            chapters: vec![Chapter {
                number: "1".into(),
                title: "Hoofdstuk 1 De cel".into(),
                sections: vec![
                    Section {
                        number: "1.1".into(),
                        title: Some("1.1 Celkern & celwand".into()),
                        content: Vec::new(),
                    },
                    Section {
                        number: "1.2".into(),
                        title: None,
                        content: Vec::new(),
                    },
                ],
                images: Vec::new(),
            }],
        }
    }

    #[test]
    fn test_build_toc_strips_numbers() {
        let ctx = RenderContext::new(&BookMeta::default(), RenderConfig::default());
        let toc = build_toc(&book(), &ctx);
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].id, "ch-1");
        assert_eq!(toc[0].title, "De cel");
        assert_eq!(toc[0].children.len(), 1);
        assert_eq!(toc[0].children[0].title, "Celkern & celwand");
        assert_eq!(toc[0].children[0].id, "sec-1-1");
    }

    #[test]
    fn test_render_toc() {
        let ctx = RenderContext::new(&BookMeta::default(), RenderConfig::default());
        let html = render_toc(&build_toc(&book(), &ctx), &ctx);
        assert!(html.starts_with("<nav class=\"toc\" id=\"toc\">\n<h1 class=\"toc-title\">Inhoud</h1>"));
        assert!(html.contains("<a href=\"#sec-1-1\"><span class=\"toc-number\">1.1</span> Celkern &amp; celwand</a>"));
        assert!(html.contains("<ol class=\"toc-level-2\">"));
    }

    #[test]
    fn test_empty_toc_renders_nothing() {
        let ctx = RenderContext::new(&BookMeta::default(), RenderConfig::default());
        assert!(render_toc(&[], &ctx).is_empty());
    }
}
