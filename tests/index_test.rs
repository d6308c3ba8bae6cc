//! Index extraction over whole books.

use std::collections::HashSet;

use bookset::config::IndexConfig;
use bookset::model::{Book, Chapter, ContentBlock, Paragraph, Section};
use bookset::{Index, build_index};
use proptest::prelude::*;

fn paragraph(text: &str) -> ContentBlock {
    ContentBlock::Paragraph(Paragraph {
        basis: text.into(),
        ..Default::default()
    })
}

fn section(number: &str, text: &str) -> Section {
    Section {
        number: number.into(),
        title: None,
        content: vec![paragraph(text)],
    }
}

fn chapter(number: usize, sections: Vec<Section>) -> Chapter {
    Chapter {
        number: number.to_string(),
        title: format!("Hoofdstuk {number}"),
        sections,
        images: Vec::new(),
    }
}

fn unit_ids(index: &Index, term: &str) -> Vec<String> {
    index
        .get(term)
        .unwrap_or_else(|| panic!("term {term:?} missing"))
        .refs
        .iter()
        .map(|r| r.unit_id.clone())
        .collect()
}

const EMPHASISED: &str = "De <<BOLD_START>>bloeddruk<<BOLD_END>> meet je met een meter.";

#[test]
fn test_refs_capped_with_one_per_chapter() {
    let plain = "bloeddruk ".repeat(10);
    let mut chapters: Vec<Chapter> = (1..=5)
        .map(|n| chapter(n, vec![section(&format!("{n}.1"), EMPHASISED)]))
        .collect();
    chapters[0].sections.push(section("1.2", &plain));
    let book = Book {
        chapters,
        ..Default::default()
    };

    let index = build_index(&book, &IndexConfig::default());
    let entry = index.get("bloeddruk").unwrap();

    assert_eq!(entry.term, "Bloeddruk");
    assert!(entry.refs.len() <= 4);
    let chapters: HashSet<_> = entry.refs.iter().map(|r| r.chapter.as_str()).collect();
    assert_eq!(chapters.len(), entry.refs.len(), "duplicate chapter in {:?}", entry.refs);
    // The emphasised section beats ten plain mentions in the same chapter.
    assert_eq!(
        unit_ids(&index, "bloeddruk"),
        vec!["sec-1-1", "sec-2-1", "sec-3-1", "sec-4-1"]
    );
}

#[test]
fn test_plain_mentions_add_refs_in_other_chapters() {
    let book = Book {
        chapters: vec![
            chapter(1, vec![section("1.1", EMPHASISED)]),
            chapter(2, vec![section("2.1", "Een hoge bloeddruk is gevaarlijk.")]),
            chapter(3, vec![section("3.1", "Over de bloeddrukmeter.")]),
        ],
        ..Default::default()
    };

    let index = build_index(&book, &IndexConfig::default());
    assert_eq!(unit_ids(&index, "Bloeddruk"), vec!["sec-1-1", "sec-2-1"]);
}

#[test]
fn test_max_refs_configurable() {
    let chapters = (1..=5)
        .map(|n| chapter(n, vec![section(&format!("{n}.1"), EMPHASISED)]))
        .collect();
    let book = Book {
        chapters,
        ..Default::default()
    };
    let config = IndexConfig {
        max_refs: 2,
        ..Default::default()
    };

    let index = build_index(&book, &config);
    assert_eq!(unit_ids(&index, "bloeddruk"), vec!["sec-1-1", "sec-2-1"]);
}

#[test]
fn test_stop_terms_and_labels_excluded() {
    let book = Book {
        chapters: vec![chapter(
            1,
            vec![section(
                "1.1",
                "<<BOLD_START>>Let op:<<BOLD_END>> de <<BOLD_START>>pols<<BOLD_END>> voel je hier. <<BOLD_START>>Tip<<BOLD_END>>",
            )],
        )],
        ..Default::default()
    };

    let index = build_index(&book, &IndexConfig::default());
    let terms: Vec<_> = index.entries.iter().map(|e| e.term.as_str()).collect();
    assert_eq!(terms, vec!["Pols"]);
}

#[test]
fn test_book_without_emphasis_has_empty_index() {
    let book = Book {
        chapters: vec![chapter(1, vec![section("1.1", "Gewone tekst zonder nadruk.")])],
        ..Default::default()
    };
    assert!(build_index(&book, &IndexConfig::default()).is_empty());
}

#[test]
fn test_index_is_deterministic() {
    let chapters = (1..=6)
        .map(|n| {
            let text = format!(
                "<<BOLD_START>>hart<<BOLD_END>> en <<BOLD_START>>long{n}<<BOLD_END>>, {}",
                "hart ".repeat(n)
            );
            chapter(n, vec![section(&format!("{n}.1"), &text)])
        })
        .collect();
    let book = Book {
        chapters,
        ..Default::default()
    };

    let first = build_index(&book, &IndexConfig::default());
    let second = build_index(&book, &IndexConfig::default());
    assert_eq!(first, second);
    assert_eq!(first.to_map(), second.to_map());
}

proptest! {
    #[test]
    fn test_refs_never_exceed_cap(
        layout in prop::collection::vec((1usize..4, any::<bool>()), 1..10),
        max_refs in 1usize..6,
    ) {
        let chapters = layout
            .iter()
            .enumerate()
            .map(|(i, &(sections, emphasised))| {
                let n = i + 1;
                let sections = (1..=sections)
                    .map(|s| {
                        let text = if emphasised && s == 1 {
                            EMPHASISED.to_string()
                        } else {
                            "Meet de bloeddruk twee keer.".to_string()
                        };
                        section(&format!("{n}.{s}"), &text)
                    })
                    .collect();
                chapter(n, sections)
            })
            .collect();
        let book = Book { chapters, ..Default::default() };
        let config = IndexConfig { max_refs, ..Default::default() };

        let index = build_index(&book, &config);
        if let Some(entry) = index.get("bloeddruk") {
            prop_assert!(entry.refs.len() <= max_refs);
            let chapters: HashSet<_> = entry.refs.iter().map(|r| r.chapter.clone()).collect();
            prop_assert_eq!(chapters.len(), entry.refs.len());
        } else {
            prop_assert!(layout.iter().all(|&(_, emphasised)| !emphasised));
        }
    }
}
