//! Chapter slicing for quick previews.

use std::cmp::Ordering;

use crate::error::{Error, Result};

use super::{Book, compare_numbers};

impl Book {
    /// Return a copy of the book containing only one chapter, optionally cut
    /// off after the section numbered `until_section`.
    ///
    /// Sections without a number are dropped when a cut-off is given.
    pub fn slice_chapter(&self, number: &str, until_section: Option<&str>) -> Result<Book> {
        let chapter = self
            .chapter(number)
            .ok_or_else(|| Error::ChapterNotFound(number.to_string()))?;

        let mut chapter = chapter.clone();
        if let Some(until) = until_section.map(str::trim).filter(|s| !s.is_empty()) {
            chapter.sections.retain(|section| {
                !section.number.is_empty()
                    && compare_numbers(&section.number, until) != Ordering::Greater
            });
        }

        Ok(Book {
            meta: self.meta.clone(),
            chapters: vec![chapter],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chapter, Section};

    fn book() -> Book {
        let section = |n: &str| Section {
            number: n.to_string(),
            ..Default::default()
        };
        Book {
            chapters: vec![
                Chapter {
                    number: "1".into(),
                    sections: vec![section("1.1"), section("1.2"), section("1.10")],
                    ..Default::default()
                },
                Chapter {
                    number: "2".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_slice_keeps_single_chapter() {
        let sliced = book().slice_chapter("2", None).unwrap();
        assert_eq!(sliced.chapters.len(), 1);
        assert_eq!(sliced.chapters[0].number, "2");
    }

    #[test]
    fn test_slice_until_section_uses_numeric_order() {
        let sliced = book().slice_chapter("1", Some("1.2")).unwrap();
        let numbers: Vec<_> = sliced.chapters[0]
            .sections
            .iter()
            .map(|s| s.number.as_str())
            .collect();
        assert_eq!(numbers, vec!["1.1", "1.2"]);
    }

    #[test]
    fn test_slice_missing_chapter() {
        assert!(matches!(
            book().slice_chapter("9", None),
            Err(Error::ChapterNotFound(_))
        ));
    }
}
