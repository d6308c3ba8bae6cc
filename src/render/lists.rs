//! List classification and demotion.
//!
//! A run is a maximal sequence of list-like blocks with nothing else in
//! between. Each candidate in the run is either kept as a real list
//! (possibly merged with its neighbours or nested under an open parent) or
//! demoted to prose paragraphs. Figures anchored to a block close whatever
//! list is open before they are written.

use log::debug;

use crate::markup::{SegmentKind, segment_micro_titles};
use crate::model::{Figure, ListBlock, Paragraph, StepsBlock};

use super::context::RenderContext;
use super::figures::render_figures;
use super::heading::block_anchor;
use super::heuristics::{
    all_short, non_empty, semicolon_list_items, should_keep_list, should_keep_nested,
    split_label_lead,
};
use super::manifest::{ListDecision, ListOutcome};

/// One list-like block as seen by the classifier.
#[derive(Debug, Clone)]
pub struct RunBlock<'a> {
    pub id: &'a str,
    /// Nesting level, 1..=3.
    pub level: u8,
    pub ordered: bool,
    pub steps: bool,
    pub items: Vec<String>,
    pub images: &'a [Figure],
    /// Original prose for blocks synthesized from a paragraph; used instead
    /// of per-item paragraphs when the block is demoted.
    pub prose: Option<&'a str>,
}

impl<'a> RunBlock<'a> {
    pub fn from_list(list: &'a ListBlock) -> Self {
        Self {
            id: &list.id,
            level: list.level.clamp(1, 3),
            ordered: list.ordered,
            steps: false,
            items: list.items.clone(),
            images: &list.images,
            prose: None,
        }
    }

    pub fn from_steps(steps: &'a StepsBlock) -> Self {
        Self {
            id: &steps.id,
            level: 1,
            ordered: true,
            steps: true,
            items: steps.items.clone(),
            images: &steps.images,
            prose: None,
        }
    }

    /// A paragraph that is a semicolon-separated list in disguise.
    pub fn from_paragraph(paragraph: &'a Paragraph) -> Option<Self> {
        let (items, ordered) = semicolon_list_items(paragraph)?;
        Some(Self {
            id: &paragraph.id,
            level: 1,
            ordered,
            steps: false,
            items,
            images: &paragraph.images,
            prose: Some(&paragraph.basis),
        })
    }

    fn visible_items(&self) -> Vec<&str> {
        non_empty(&self.items)
    }
}

/// Output of one list run.
#[derive(Debug, Clone, Default)]
pub struct ListRun {
    pub markup: String,
    pub decisions: Vec<ListDecision>,
    pub missing_figures: Vec<String>,
}

#[derive(Debug)]
struct KeptList {
    /// Source level; a child nests under a parent one level up.
    level: u8,
    ordered: bool,
    steps: bool,
    anchor: Option<String>,
    items: Vec<KeptItem>,
}

#[derive(Debug)]
struct KeptItem {
    text: String,
    /// Anchor of a merged-in block, on its first item.
    anchor: Option<String>,
    children: Vec<KeptList>,
}

impl KeptList {
    fn new(block: &RunBlock<'_>, items: &[&str], anchor: Option<String>) -> Self {
        Self {
            level: block.level,
            ordered: block.ordered,
            steps: block.steps,
            anchor,
            items: items
                .iter()
                .map(|text| KeptItem {
                    text: text.to_string(),
                    anchor: None,
                    children: Vec::new(),
                })
                .collect(),
        }
    }
}

struct RunWriter<'r> {
    ctx: &'r RenderContext,
    chapter: &'r str,
    out: String,
    /// Open lists; each entry nests under the last item of the one before.
    open: Vec<KeptList>,
    decisions: Vec<ListDecision>,
    missing: Vec<String>,
}

impl<'r> RunWriter<'r> {
    fn anchor(&self, id: &str) -> Option<String> {
        (!id.is_empty()).then(|| block_anchor(self.chapter, id))
    }

    fn decide(&mut self, ids: Vec<String>, outcome: ListOutcome, items: usize) {
        debug!("List {:?} in chapter {}: {:?} ({} items)", ids, self.chapter, outcome, items);
        self.decisions.push(ListDecision {
            chapter: self.chapter.to_string(),
            block_ids: ids,
            outcome,
            items,
        });
    }

    /// Close the innermost open list.
    fn close_one(&mut self) {
        let Some(list) = self.open.pop() else {
            return;
        };
        match self.open.last_mut().and_then(|parent| parent.items.last_mut()) {
            Some(item) => item.children.push(list),
            None => {
                write_list(&mut self.out, &list, 1, self.ctx);
                self.out.push('\n');
            }
        }
    }

    /// Close open lists until the innermost one is shallower than `level`.
    fn close_to(&mut self, level: u8) {
        while self.open.last().is_some_and(|top| top.level >= level) {
            self.close_one();
        }
    }

    fn flush(&mut self) {
        while !self.open.is_empty() {
            self.close_one();
        }
    }

    fn figures(&mut self, images: &[Figure]) {
        if images.is_empty() {
            return;
        }
        self.flush();
        let markup = render_figures(images, self.ctx, &mut self.missing);
        self.out.push_str(&markup);
    }

    fn demote(&mut self, block: &RunBlock<'_>, items: &[&str]) {
        self.flush();
        let mut anchor = self.anchor(block.id);
        if let Some(prose) = block.prose {
            let body = self.ctx.flowing(prose);
            self.out.push_str(&paragraph(None, &body, &mut anchor));
            return;
        }
        for item in items {
            self.out
                .push_str(&render_demoted_item(item, self.ctx, &mut anchor));
        }
    }
}

/// Index of the last block in a mergeable group starting at `start`, or
/// `start` itself when nothing merges.
///
/// Consecutive level-1 blocks of the same kind whose items are all short
/// merge as long as the total stays within the item limit. A block with
/// figures ends the group, since the figure must close the list.
fn merge_group_end(run: &[RunBlock<'_>], start: usize, ctx: &RenderContext) -> usize {
    let thresholds = &ctx.config.lists;
    let first = &run[start];
    if first.level > 1 || first.steps || !all_short(&first.items, thresholds) {
        return start;
    }

    let mut end = start;
    let mut total = first.visible_items().len();
    while run[end].images.is_empty() {
        let Some(next) = run.get(end + 1) else {
            break;
        };
        let count = next.visible_items().len();
        let mergeable = next.level <= 1
            && !next.steps
            && next.ordered == first.ordered
            && count > 0
            && all_short(&next.items, thresholds)
            && total + count <= thresholds.max_items;
        if !mergeable {
            break;
        }
        total += count;
        end += 1;
    }

    if end > start && total >= thresholds.min_items {
        end
    } else {
        start
    }
}

/// Classify and render a run of list-like blocks.
///
/// Steps blocks are always kept as an ordered procedure. Level-1 blocks are
/// merged with their neighbours where possible, otherwise kept or demoted on
/// their own. Deeper blocks nest under an open parent one level up, or are
/// promoted to a top-level list, or demoted.
///
/// Blocks without visible items render nothing but still flush their
/// figures.
pub fn render_list_run(run: &[RunBlock<'_>], chapter: &str, ctx: &RenderContext) -> ListRun {
    let thresholds = &ctx.config.lists;
    let mut w = RunWriter {
        ctx,
        chapter,
        out: String::new(),
        open: Vec::new(),
        decisions: Vec::new(),
        missing: Vec::new(),
    };

    let mut i = 0;
    while i < run.len() {
        let block = &run[i];
        let items = block.visible_items();

        if items.is_empty() {
            debug!("List block {} has no visible items", block.id);
            w.figures(block.images);
            i += 1;
            continue;
        }

        if block.steps {
            w.flush();
            let anchor = w.anchor(block.id);
            w.open.push(KeptList::new(block, &items, anchor));
            w.decide(vec![block.id.to_string()], ListOutcome::Steps, items.len());
        } else if block.level <= 1 {
            let end = merge_group_end(run, i, ctx);
            if end > i {
                let group = &run[i..=end];
                let merged: Vec<&str> = group.iter().flat_map(|b| b.visible_items()).collect();
                w.flush();
                let mut list = KeptList::new(block, &merged, w.anchor(block.id));
                let mut offset = 0;
                for (k, member) in group.iter().enumerate() {
                    if k > 0
                        && let Some(item) = list.items.get_mut(offset)
                    {
                        item.anchor = w.anchor(member.id);
                    }
                    offset += member.visible_items().len();
                }
                w.open.push(list);
                w.decide(
                    group.iter().map(|b| b.id.to_string()).collect(),
                    ListOutcome::Merged,
                    merged.len(),
                );
                w.figures(run[end].images);
                i = end + 1;
                continue;
            }
            if should_keep_list(&items, thresholds) {
                w.flush();
                let anchor = w.anchor(block.id);
                w.open.push(KeptList::new(block, &items, anchor));
                w.decide(vec![block.id.to_string()], ListOutcome::Kept, items.len());
            } else {
                w.demote(block, &items);
                w.decide(vec![block.id.to_string()], ListOutcome::Demoted, items.len());
            }
        } else {
            w.close_to(block.level);
            let has_parent = w
                .open
                .last()
                .is_some_and(|top| top.level + 1 == block.level);
            if has_parent && should_keep_nested(&items, thresholds) {
                let anchor = w.anchor(block.id);
                w.open.push(KeptList::new(block, &items, anchor));
                w.decide(vec![block.id.to_string()], ListOutcome::Nested, items.len());
            } else if should_keep_list(&items, thresholds) {
                w.flush();
                let anchor = w.anchor(block.id);
                w.open.push(KeptList::new(block, &items, anchor));
                w.decide(vec![block.id.to_string()], ListOutcome::Promoted, items.len());
            } else {
                w.demote(block, &items);
                w.decide(vec![block.id.to_string()], ListOutcome::Demoted, items.len());
            }
        }

        w.figures(block.images);
        i += 1;
    }
    w.flush();

    ListRun {
        markup: w.out,
        decisions: w.decisions,
        missing_figures: w.missing,
    }
}

fn write_list(out: &mut String, list: &KeptList, depth: usize, ctx: &RenderContext) {
    let tag = if list.ordered || list.steps { "ol" } else { "ul" };
    let steps = if list.steps { " steps" } else { "" };
    out.push_str(&format!(r#"<{tag} class="list level-{depth}{steps}""#));
    if let Some(anchor) = &list.anchor {
        out.push_str(&format!(r#" id="{anchor}""#));
    }
    out.push('>');
    for item in &list.items {
        match &item.anchor {
            Some(anchor) => out.push_str(&format!(r#"<li id="{anchor}">"#)),
            None => out.push_str("<li>"),
        }
        out.push_str(&ctx.flowing(&item.text));
        for child in &item.children {
            write_list(out, child, depth + 1, ctx);
        }
        out.push_str("</li>");
    }
    out.push_str(&format!("</{tag}>"));
}

pub(super) fn paragraph(class: Option<&str>, body: &str, anchor: &mut Option<String>) -> String {
    if body.is_empty() {
        return String::new();
    }
    let mut out = String::from("<p");
    if let Some(id) = anchor.take() {
        out.push_str(&format!(r#" id="{id}""#));
    }
    if let Some(class) = class {
        out.push_str(&format!(r#" class="{class}""#));
    }
    out.push('>');
    out.push_str(body);
    out.push_str("</p>\n");
    out
}

/// Render one demoted item as prose: micro-titles become headings, and a
/// "Label. Explanation" opening gets its label lifted into a heading.
fn render_demoted_item(item: &str, ctx: &RenderContext, anchor: &mut Option<String>) -> String {
    let mut out = String::new();
    let mut may_have_label = true;
    for segment in segment_micro_titles(item) {
        match segment.kind {
            SegmentKind::Title => {
                out.push_str(&paragraph(
                    Some("micro-title"),
                    &ctx.flowing(&segment.text),
                    anchor,
                ));
            }
            SegmentKind::Body => {
                let lead = if may_have_label {
                    split_label_lead(&segment.text, &ctx.config.labels)
                } else {
                    None
                };
                match lead {
                    Some((label, rest)) => {
                        out.push_str(&paragraph(Some("micro-title"), &ctx.flowing(&label), anchor));
                        out.push_str(&paragraph(Some("list-prose"), &ctx.flowing(&rest), anchor));
                    }
                    None => {
                        out.push_str(&paragraph(
                            Some("list-prose"),
                            &ctx.flowing(&segment.text),
                            anchor,
                        ));
                    }
                }
            }
        }
        may_have_label = false;
    }
    out
}
