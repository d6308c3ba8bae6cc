//! Document assembly.
//!
//! Walks chapters, sections and content blocks in reading order and
//! stitches the output of the list, box and figure renderers into one HTML
//! document for the compositor. The walk over a block sequence threads one
//! piece of state, the box continuation, from block to block.

use std::borrow::Cow;
use std::sync::LazyLock;

use log::{debug, info};
use regex::Regex;

use crate::index::{Index, build_index};
use crate::markup::{SegmentKind, escape_html, segment_micro_titles};
use crate::model::{Book, Chapter, ContentBlock, Paragraph, Section, Subparagraph};

use super::boxes::{BoxKind, render_side_notes};
use super::context::RenderContext;
use super::css::stylesheet;
use super::figures::render_figures;
use super::heading::{
    block_anchor, chapter_id, heading_title, is_redundant_heading, section_id,
    strip_chapter_prefix, subparagraph_id,
};
use super::heuristics::{ends_with_colon, fix_trailing_colon};
use super::lists::{RunBlock, paragraph, render_list_run};
use super::manifest::{DeferredNote, RenderManifest};
use super::toc::{build_toc, render_toc};

static BLANK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("blank line regex"));

/// A rendered document and the decisions made while rendering it.
#[derive(Debug, Clone)]
pub struct RenderedBook {
    pub html: String,
    pub manifest: RenderManifest,
}

/// Render a whole book to a self-contained HTML document.
///
/// # Examples
///
/// ```
/// use bookset::config::RenderConfig;
/// use bookset::model::Book;
/// use bookset::render::{RenderContext, render_book};
///
/// let book = Book::from_json(r#"{
///   "meta": { "title": "Anatomie" },
///   "chapters": [{ "number": 1, "title": "De cel", "sections": [{
///     "number": "1.1", "title": "Bouw",
///     "content": [{ "type": "paragraph", "id": "p1", "basis": "Een cel is klein." }]
///   }]}]
/// }"#).unwrap();
///
/// let ctx = RenderContext::new(&book.meta, RenderConfig::default());
/// let rendered = render_book(&book, &ctx);
/// assert!(rendered.html.contains(r#"<p id="b-1-p1">Een cel is klein.</p>"#));
/// ```
pub fn render_book(book: &Book, ctx: &RenderContext) -> RenderedBook {
    info!(
        "Rendering {:?}: {} chapters",
        ctx.book_title,
        book.chapters.len()
    );
    let mut manifest = RenderManifest::default();
    let index = build_index(book, &ctx.config.index);

    let mut html = String::with_capacity(64 * 1024);
    html.push_str("<!DOCTYPE html>\n");
    html.push_str(&format!("<html lang=\"{}\">\n", escape_html(&ctx.language)));
    html.push_str("<head>\n<meta charset=\"utf-8\"/>\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&ctx.book_title)));
    html.push_str(&format!("<style>\n{}</style>\n", stylesheet(ctx)));
    html.push_str("</head>\n");
    html.push_str(&format!(
        "<body class=\"align-{}\">\n",
        ctx.text_align().as_str()
    ));

    html.push_str(&render_cover(ctx));
    html.push_str(&render_toc(&build_toc(book, ctx), ctx));
    for chapter in &book.chapters {
        html.push_str(&render_chapter(chapter, ctx, &mut manifest));
    }

    let min_terms = ctx.config.index.min_terms.max(1);
    if index.len() >= min_terms {
        html.push_str(&render_index(&index, ctx));
    } else {
        info!(
            "Index left out: {} terms, {} needed",
            index.len(),
            min_terms
        );
    }
    html.push_str("</body>\n</html>\n");

    info!(
        "Rendered {} list decisions, {} deferred notes, {} index terms, {} missing figures",
        manifest.lists.len(),
        manifest.deferred_notes.len(),
        index.len(),
        manifest.missing_figures.len()
    );
    manifest.index = index.entries;
    RenderedBook { html, manifest }
}

fn render_cover(ctx: &RenderContext) -> String {
    if ctx.book_title.trim().is_empty() {
        return String::new();
    }
    let mut out = String::from("<section class=\"cover\">\n");
    out.push_str(&format!(
        "<h1 class=\"cover-title\">{}</h1>\n",
        escape_html(&ctx.book_title)
    ));
    if !ctx.book_level.trim().is_empty() {
        out.push_str(&format!(
            "<p class=\"cover-level\">{}</p>\n",
            escape_html(&ctx.book_level)
        ));
    }
    out.push_str("</section>\n");
    out
}

/// Render one chapter: heading, opener figures, sections.
pub fn render_chapter(chapter: &Chapter, ctx: &RenderContext, manifest: &mut RenderManifest) -> String {
    debug!("Chapter {}: {} sections", chapter.number, chapter.sections.len());
    let title = strip_chapter_prefix(
        &ctx.labels.chapter_prefix,
        &chapter.number,
        &heading_title("", &chapter.title),
    );

    let mut out = format!(
        "<section class=\"chapter\" id=\"{}\">\n",
        chapter_id(&chapter.number)
    );
    out.push_str(&format!(
        "<h1 class=\"chapter-title\"><span class=\"chapter-number\">{} {}</span> {}</h1>\n",
        escape_html(&ctx.labels.chapter_prefix),
        escape_html(&chapter.number),
        escape_html(&title)
    ));
    out.push_str(&render_figures(
        &chapter.images,
        ctx,
        &mut manifest.missing_figures,
    ));

    let mut walker = Walker {
        ctx,
        chapter: &chapter.number,
        manifest,
    };
    for section in &chapter.sections {
        out.push_str(&walker.section(section));
    }
    out.push_str("</section>\n");
    out
}

fn list_like(block: &ContentBlock) -> Option<RunBlock<'_>> {
    match block {
        ContentBlock::List(list) => Some(RunBlock::from_list(list)),
        ContentBlock::Steps(steps) => Some(RunBlock::from_steps(steps)),
        ContentBlock::Paragraph(p) => RunBlock::from_paragraph(p),
        ContentBlock::Subparagraph(_) | ContentBlock::Unknown => None,
    }
}

/// Heading a block sequence sits under, for redundant-paragraph detection.
#[derive(Clone, Copy)]
struct Heading<'a> {
    number: &'a str,
    title: &'a str,
}

/// A rendered list run and what followed from it.
struct RunOutput<'a> {
    markup: String,
    /// Index of the first block after the run.
    end: usize,
    block_ids: Vec<String>,
    /// List-like paragraphs in the run that carry side notes.
    note_hosts: Vec<&'a Paragraph>,
}

struct Walker<'a> {
    ctx: &'a RenderContext,
    chapter: &'a str,
    manifest: &'a mut RenderManifest,
}

impl Walker<'_> {
    fn section(&mut self, section: &Section) -> String {
        let mut out = format!(
            "<section class=\"section\" id=\"{}\">\n",
            section_id(&section.number)
        );
        let title = section
            .title
            .as_deref()
            .map(|t| heading_title(&section.number, t))
            .filter(|t| !t.is_empty());
        if let Some(title) = &title {
            out.push_str(&format!(
                "<h2 class=\"section-title\"><span class=\"section-number\">{}</span> {}</h2>\n",
                escape_html(&section.number),
                escape_html(title)
            ));
        }
        out.push_str(&self.blocks(&section.content, None));
        out.push_str("</section>\n");
        out
    }

    fn subparagraph(&mut self, sp: &Subparagraph) -> String {
        let id = if sp.number.trim().is_empty() {
            block_anchor(self.chapter, &sp.id)
        } else {
            subparagraph_id(&sp.number)
        };
        let mut out = format!("<section class=\"subparagraph\" id=\"{id}\">\n");
        let title = heading_title(&sp.number, &sp.title);
        if !title.is_empty() || !sp.number.is_empty() {
            out.push_str(&format!(
                "<h3 class=\"subparagraph-title\"><span class=\"subparagraph-number\">{}</span> {}</h3>\n",
                escape_html(&sp.number),
                escape_html(&title)
            ));
        }
        let heading = Heading {
            number: &sp.number,
            title: &sp.title,
        };
        out.push_str(&self.blocks(&sp.content, Some(heading)));
        out.push_str("</section>\n");
        out
    }

    /// Render a block sequence. Continuation starts empty and is reset by
    /// anything that is not a note-bearing paragraph.
    fn blocks(&mut self, blocks: &[ContentBlock], heading: Option<Heading<'_>>) -> String {
        let mut out = String::new();
        let mut continuation: Option<BoxKind> = None;
        let mut i = 0;

        while i < blocks.len() {
            if list_like(&blocks[i]).is_some() {
                let run = self.list_run(blocks, i);
                out.push_str(&run.markup);
                continuation = None;
                for host in run.note_hosts {
                    let boxes = render_side_notes(&host.side_notes, continuation, self.ctx);
                    out.push_str(&boxes.markup);
                    continuation = boxes.continuation;
                }
                i = run.end;
                continue;
            }

            match &blocks[i] {
                ContentBlock::Paragraph(_) => {
                    let (markup, next, state) = self.paragraph(blocks, i, heading, continuation);
                    out.push_str(&markup);
                    continuation = state;
                    i = next;
                }
                ContentBlock::Subparagraph(sp) => {
                    out.push_str(&self.subparagraph(sp));
                    continuation = None;
                    i += 1;
                }
                ContentBlock::List(_) | ContentBlock::Steps(_) => i += 1,
                ContentBlock::Unknown => {
                    debug!("Skipping block of unknown type in chapter {}", self.chapter);
                    i += 1;
                }
            }
        }
        out
    }

    /// Render the paragraph at `i` and its notes. Returns the markup, the
    /// index of the next unrendered block and the new continuation.
    fn paragraph(
        &mut self,
        blocks: &[ContentBlock],
        i: usize,
        heading: Option<Heading<'_>>,
        continuation: Option<BoxKind>,
    ) -> (String, usize, Option<BoxKind>) {
        let ContentBlock::Paragraph(original) = &blocks[i] else {
            return (String::new(), i + 1, continuation);
        };

        let has_notes = original.side_notes.has_any();
        let redundant = heading
            .is_some_and(|h| is_redundant_heading(&original.basis, h.number, h.title));
        let p: Cow<'_, Paragraph> = if redundant {
            self.manifest.redundant_headings.push(original.id.clone());
            if !has_notes && original.images.is_empty() {
                debug!("Skipping redundant heading paragraph {}", original.id);
                return (String::new(), i + 1, continuation);
            }
            Cow::Owned(Paragraph {
                basis: String::new(),
                ..original.clone()
            })
        } else {
            Cow::Borrowed(original)
        };

        let next_is_list = blocks.get(i + 1).and_then(list_like).is_some();
        let colon = ends_with_colon(&p.basis);
        let fix_colon = colon && !next_is_list && self.ctx.config.typography.fix_orphan_colons;

        let mut out = self.basis(&p, fix_colon);
        out.push_str(&render_figures(
            &p.images,
            self.ctx,
            &mut self.manifest.missing_figures,
        ));

        if !has_notes {
            let state = if out.is_empty() { continuation } else { None };
            return (out, i + 1, state);
        }

        if colon && next_is_list {
            // Notes never separate a list-introducing sentence from its list.
            let run = self.list_run(blocks, i + 1);
            out.push_str(&run.markup);
            debug!(
                "Deferring notes of {} past list run {:?}",
                p.id, run.block_ids
            );
            self.manifest.deferred_notes.push(DeferredNote {
                chapter: self.chapter.to_string(),
                block_id: p.id.clone(),
                placed_after: run.block_ids,
            });

            let mut state = None;
            let boxes = render_side_notes(&p.side_notes, state, self.ctx);
            out.push_str(&boxes.markup);
            state = boxes.continuation;
            for host in run.note_hosts {
                let boxes = render_side_notes(&host.side_notes, state, self.ctx);
                out.push_str(&boxes.markup);
                state = boxes.continuation;
            }
            return (out, run.end, state);
        }

        let boxes = render_side_notes(&p.side_notes, continuation, self.ctx);
        out.push_str(&boxes.markup);
        (out, i + 1, boxes.continuation)
    }

    /// Paragraph text: one `<p>` per blank-line chunk, micro-titles as
    /// their own heading paragraphs.
    fn basis(&self, p: &Paragraph, fix_colon: bool) -> String {
        let basis: Cow<'_, str> = if fix_colon {
            Cow::Owned(fix_trailing_colon(&p.basis))
        } else {
            Cow::Borrowed(&p.basis)
        };

        let mut anchor = (!p.id.is_empty()).then(|| block_anchor(self.chapter, &p.id));
        let mut out = String::new();
        for chunk in BLANK_LINE_RE.split(&basis) {
            for segment in segment_micro_titles(chunk) {
                let class = match segment.kind {
                    SegmentKind::Title => Some("micro-title"),
                    SegmentKind::Body => None,
                };
                let body = self.ctx.flowing(&segment.text);
                out.push_str(&paragraph(class, &body, &mut anchor));
            }
        }
        out
    }

    /// Collect and render the maximal list run starting at `start`.
    fn list_run<'b>(&mut self, blocks: &'b [ContentBlock], start: usize) -> RunOutput<'b> {
        let mut run = Vec::new();
        let mut note_hosts = Vec::new();
        let mut end = start;
        while let Some(block) = blocks.get(end).and_then(list_like) {
            if let ContentBlock::Paragraph(p) = &blocks[end] {
                if p.side_notes.has_any() {
                    note_hosts.push(p);
                }
            }
            run.push(block);
            end += 1;
        }

        let block_ids = run.iter().map(|b| b.id.to_string()).collect();
        let result = render_list_run(&run, self.chapter, self.ctx);
        self.manifest.lists.extend(result.decisions);
        self.manifest.missing_figures.extend(result.missing_figures);
        RunOutput {
            markup: result.markup,
            end,
            block_ids,
            note_hosts,
        }
    }
}

/// The index section: one line per term with page references.
pub fn render_index(index: &Index, ctx: &RenderContext) -> String {
    let mut out = String::from("<section class=\"index\" id=\"index\">\n");
    out.push_str(&format!(
        "<h1 class=\"index-title\">{}</h1>\n",
        escape_html(&ctx.labels.index_title)
    ));
    for entry in &index.entries {
        out.push_str(&format!(
            "<p class=\"index-entry\">{}",
            escape_html(&entry.term)
        ));
        for target in &entry.refs {
            out.push_str(&format!(
                " <a class=\"index-ref\" href=\"#{}\"></a>",
                target.unit_id
            ));
        }
        out.push_str("</p>\n");
    }
    out.push_str("</section>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::model::{BookMeta, ListBlock, SideNotes};

    fn ctx() -> RenderContext {
        RenderContext::new(&BookMeta::default(), RenderConfig::default())
    }

    fn para(id: &str, basis: &str, practice: Option<&str>) -> ContentBlock {
        ContentBlock::Paragraph(Paragraph {
            id: id.into(),
            basis: basis.into(),
            side_notes: SideNotes {
                practice: practice.map(str::to_string),
                deepening: None,
            },
            ..Default::default()
        })
    }

    fn list(id: &str, items: &[&str]) -> ContentBlock {
        ContentBlock::List(ListBlock {
            id: id.into(),
            items: items.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
    }

    fn walk(blocks: &[ContentBlock], heading: Option<Heading<'_>>) -> (String, RenderManifest) {
        let ctx = ctx();
        let mut manifest = RenderManifest::default();
        let mut walker = Walker {
            ctx: &ctx,
            chapter: "1",
            manifest: &mut manifest,
        };
        let out = walker.blocks(blocks, heading);
        (out, manifest)
    }

    #[test]
    fn test_orphan_colon_fixed() {
        let (out, _) = walk(&[para("p1", "Let op:", None), para("p2", "Daarna.", None)], None);
        assert!(out.contains(">Let op.</p>"));
    }

    #[test]
    fn test_intro_colon_kept_before_list() {
        let (out, _) = walk(&[para("p1", "Let op:", None), list("l1", &["hart", "longen"])], None);
        assert!(out.contains(">Let op:</p>"));
    }

    #[test]
    fn test_notes_deferred_past_list() {
        let (out, manifest) = walk(
            &[
                para("p1", "Je let op:", Some("Vraag het de cliënt.")),
                list("l1", &["hart", "longen"]),
                para("p2", "Verder.", None),
            ],
            None,
        );
        let list_end = out.find("</ul>").unwrap();
        let note = out.find("<aside").unwrap();
        let next = out.find("Verder.").unwrap();
        assert!(list_end < note && note < next);
        assert_eq!(manifest.deferred_notes[0].placed_after, vec!["l1"]);
    }

    #[test]
    fn test_blank_lines_split_paragraphs() {
        let (out, _) = walk(&[para("p1", "Eerste deel.\n\nTweede deel.", None)], None);
        assert_eq!(
            out,
            "<p id=\"b-1-p1\">Eerste deel.</p>\n<p>Tweede deel.</p>\n"
        );
    }

    #[test]
    fn test_micro_title_in_basis() {
        let (out, _) = walk(
            &[para("p1", "<<MICRO_TITLE>>Bloed<<MICRO_TITLE_END>>Het bloed stroomt.", None)],
            None,
        );
        assert_eq!(
            out,
            "<p id=\"b-1-p1\" class=\"micro-title\">Bloed</p>\n<p>Het bloed stroomt.</p>\n"
        );
    }

    #[test]
    fn test_redundant_heading_skipped_or_blanked() {
        let heading = Heading {
            number: "1.1.1",
            title: "De celwand",
        };
        let (out, manifest) = walk(&[para("p1", "1.1.1 De celwand", None)], Some(heading));
        assert!(out.is_empty());
        assert_eq!(manifest.redundant_headings, vec!["p1"]);

        let (out, _) = walk(&[para("p1", "De celwand", Some("Voel de wand."))], Some(heading));
        assert!(!out.contains("De celwand"));
        assert!(out.contains("<aside"));
    }

    #[test]
    fn test_semicolon_paragraph_becomes_list() {
        let block = ContentBlock::Paragraph(Paragraph {
            id: "p1".into(),
            basis: "hart; longen; lever".into(),
            style_hint: Some("Bullets".into()),
            ..Default::default()
        });
        let (out, manifest) = walk(&[block], None);
        assert!(out.starts_with("<ul"));
        assert_eq!(out.matches("<li>").count(), 3);
        assert_eq!(manifest.lists.len(), 1);
    }

    #[test]
    fn test_index_section() {
        let index = Index {
            entries: vec![crate::index::IndexEntry {
                term: "Celkern".into(),
                refs: vec![crate::index::IndexRef {
                    unit_id: "sec-1-1".into(),
                    chapter: "1".into(),
                    section: "1.1".into(),
                }],
            }],
        };
        let html = render_index(&index, &ctx());
        assert!(html.contains("<h1 class=\"index-title\">Register</h1>"));
        assert!(html.contains(
            "<p class=\"index-entry\">Celkern <a class=\"index-ref\" href=\"#sec-1-1\"></a></p>"
        ));
    }
}
