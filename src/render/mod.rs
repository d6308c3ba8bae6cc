//! Block-level layout decisions and document assembly.
//!
//! Rendering is a pure function of the book and a [`RenderContext`]:
//!
//! - `heading`: heading text and stable anchor ids
//! - `heuristics`: the small predicates the layout decisions rest on
//! - `lists`: keeping, merging, nesting or demoting list runs
//! - `boxes`: side-note boxes and label continuation
//! - `figures`: figures and overlay lookup
//! - `toc` and `assemble`: the document around it all
//!
//! Nothing here fails. Malformed markers, empty lists and missing assets
//! are recovered from and recorded in the [`RenderManifest`].

mod assemble;
mod boxes;
mod context;
mod css;
mod figures;
mod heading;
mod heuristics;
mod lists;
mod manifest;
mod toc;

pub use assemble::{RenderedBook, render_book, render_chapter, render_index};
pub use boxes::{BoxKind, BoxRender, clean_box_text, render_side_notes};
pub use context::RenderContext;
pub use css::stylesheet;
pub use figures::{FigureMarkup, FigureOverlays, render_figure, render_figures};
pub use heading::{
    block_anchor, chapter_id, heading_title, is_redundant_heading, section_id, slugify,
    strip_chapter_prefix, strip_number_prefix, subparagraph_id,
};
pub use heuristics::{
    all_short, ends_with_colon, fix_trailing_colon, is_short_parallel_item, semicolon_list_items,
    should_keep_list, should_keep_nested, split_label_lead,
};
pub use lists::{ListRun, RunBlock, render_list_run};
pub use manifest::{DeferredNote, ListDecision, ListOutcome, RenderManifest};
pub use toc::{TocEntry, build_toc, render_toc};
