//! Benchmarks for the render pipeline.
//!
//! Run with: cargo bench

use criterion::{Criterion, criterion_group, criterion_main};

use bookset::config::{IndexConfig, RenderConfig};
use bookset::markup::{HyphenationExceptions, InlineOptions, InlineRenderer};
use bookset::model::{Book, BookMeta, Chapter, ContentBlock, ListBlock, Paragraph, Section, SideNotes};
use bookset::{RenderContext, build_index, render_book};

const FIXTURE_JSON: &str = include_str!("../tests/fixtures/book.json");

/// A book of `chapters` x 8 sections with paragraphs, notes and lists.
fn synthetic_book(chapters: usize) -> Book {
    let chapters = (1..=chapters)
        .map(|c| Chapter {
            number: c.to_string(),
            title: format!("Hoofdstuk {c} Zorg"),
            sections: (1..=8)
                .map(|s| Section {
                    number: format!("{c}.{s}"),
                    title: Some(format!("Onderwerp {s}")),
                    content: vec![
                        ContentBlock::Paragraph(Paragraph {
                            id: format!("p{s}a"),
                            basis: "De <<BOLD_START>>bloeddruk<<BOLD_END>> meet je bij de \
                                    zorgvrager, bijvoorbeeld voor en na het eten. Let daarbij op:"
                                .into(),
                            side_notes: SideNotes {
                                practice: Some("Bij meneer Bakker meet je elke ochtend.".into()),
                                deepening: None,
                            },
                            ..Default::default()
                        }),
                        ContentBlock::List(ListBlock {
                            id: format!("l{s}"),
                            items: vec!["houding".into(), "rust".into(), "manchet".into()],
                            ..Default::default()
                        }),
                        ContentBlock::Paragraph(Paragraph {
                            id: format!("p{s}b"),
                            basis: "Noteer de waarden in het dossier.\n\nBespreek afwijkingen."
                                .into(),
                            side_notes: SideNotes {
                                practice: None,
                                deepening: Some("De <<BOLD_START>>hartslag<<BOLD_END>> hangt samen met de bloeddruk.".into()),
                            },
                            ..Default::default()
                        }),
                    ],
                })
                .collect(),
            images: Vec::new(),
        })
        .collect();

    Book {
        meta: BookMeta {
            title: "Basiszorg".into(),
            level: "3".into(),
            language: "nl".into(),
        },
        chapters,
    }
}

// ============================================================================
// Parsing
// ============================================================================

fn bench_parse_fixture(c: &mut Criterion) {
    c.bench_function("parse_fixture", |b| {
        b.iter(|| Book::from_json(FIXTURE_JSON).unwrap());
    });
}

// ============================================================================
// Rendering
// ============================================================================

fn bench_render_book(c: &mut Criterion) {
    let book = synthetic_book(12);
    let ctx = RenderContext::new(&book.meta, RenderConfig::default());

    c.bench_function("render_book", |b| {
        b.iter(|| render_book(&book, &ctx));
    });
}

fn bench_build_index(c: &mut Criterion) {
    let book = synthetic_book(12);
    let config = IndexConfig::default();

    c.bench_function("build_index", |b| {
        b.iter(|| build_index(&book, &config));
    });
}

fn bench_inline_with_hyphenation(c: &mut Criterion) {
    let exceptions = HyphenationExceptions::from_entries([
        ("bloeddruk", vec![5]),
        ("zorgvrager", vec![4]),
        ("hartslag", vec![4]),
    ]);
    let renderer = InlineRenderer::new().with_hyphenation(&exceptions);
    let text = "De <<BOLD_START>>bloeddruk<<BOLD_END>> van de zorgvrager stijgt met de hartslag. "
        .repeat(40);

    c.bench_function("inline_with_hyphenation", |b| {
        b.iter(|| renderer.render(&text, InlineOptions::flowing()));
    });
}

criterion_group!(
    benches,
    bench_parse_fixture,
    bench_render_book,
    bench_build_index,
    bench_inline_with_hyphenation,
);
criterion_main!(benches);
