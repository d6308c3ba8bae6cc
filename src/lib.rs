//! # bookset
//!
//! Deterministic typesetting decisions for book content.
//!
//! bookset reads a canonical book tree (chapters, sections, paragraphs,
//! lists, side notes, figures) and writes one self-contained HTML document
//! for a print compositor such as Prince, together with a manifest of the
//! layout decisions it made.
//!
//! ## Features
//!
//! - Inline marker rendering with hyphenation exceptions and advisory joins
//! - List runs kept, merged, nested or demoted to prose by simple heuristics
//! - Side-note boxes that never split a list from its introducing sentence
//! - Index extraction from emphasised terms, one reference per chapter
//! - Subprocess handoff to the compositor with a timeout
//!
//! ## Quick Start
//!
//! ```no_run
//! use bookset::{Book, RenderConfig, RenderContext, render_book};
//!
//! let book = Book::open("book.json").unwrap();
//! let ctx = RenderContext::new(&book.meta, RenderConfig::open("bookset.toml").unwrap());
//! let rendered = render_book(&book, &ctx);
//! std::fs::write("book.html", &rendered.html).unwrap();
//! ```
//!
//! ## Composing a PDF
//!
//! ```no_run
//! use bookset::compositor::{Compositor, PrinceCompositor};
//!
//! let artifact = PrinceCompositor::new("book.pdf")
//!     .compose("<!DOCTYPE html><p>Hallo</p>")
//!     .unwrap();
//! println!("{}", artifact.log);
//! ```

pub mod compositor;
pub mod config;
pub mod error;
pub mod index;
pub mod markup;
pub mod model;
pub mod render;

pub use config::RenderConfig;
pub use error::{Error, Result};
pub use index::{Index, IndexEntry, build_index};
pub use model::Book;
pub use render::{RenderContext, RenderManifest, RenderedBook, render_book};
