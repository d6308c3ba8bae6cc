//! Micro-title segmentation.

use super::markers::{MICRO_TITLE, MICRO_TITLE_END, normalize_title};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Title,
    Body,
}

/// A run of text that is either a micro-heading or body text. Text is raw
/// (may still contain bold markers) and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    fn title(text: &str) -> Self {
        Self {
            kind: SegmentKind::Title,
            text: text.trim().to_string(),
        }
    }

    fn body(text: &str) -> Self {
        Self {
            kind: SegmentKind::Body,
            text: text.trim().to_string(),
        }
    }
}

/// Split raw text on `MICRO_TITLE … MICRO_TITLE_END` pairs.
///
/// Empty segments are dropped. Two titles with nothing but whitespace
/// between them that read the same (ignoring markers, case and spacing)
/// collapse into one. An unterminated title marker is dropped and the rest
/// is treated as body text.
///
/// # Examples
///
/// ```
/// use bookset::markup::{SegmentKind, segment_micro_titles};
///
/// let segs = segment_micro_titles(
///     "Intro.<<MICRO_TITLE>>Bloed<<MICRO_TITLE_END>>\n\n<<MICRO_TITLE>>bloed <<MICRO_TITLE_END>>Het bloed stroomt.",
/// );
/// let kinds: Vec<_> = segs.iter().map(|s| s.kind).collect();
/// assert_eq!(kinds, vec![SegmentKind::Body, SegmentKind::Title, SegmentKind::Body]);
/// assert_eq!(segs[1].text, "Bloed");
/// ```
pub fn segment_micro_titles(raw: &str) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut rest = raw;

    loop {
        let Some(start) = rest.find(MICRO_TITLE) else {
            push_body(&mut segments, rest);
            break;
        };
        push_body(&mut segments, &rest[..start]);

        let after_open = &rest[start + MICRO_TITLE.len()..];
        let Some(end) = after_open.find(MICRO_TITLE_END) else {
            push_body(&mut segments, after_open);
            break;
        };

        let title = Segment::title(&after_open[..end]);
        if !title.text.is_empty() && !repeats_previous_title(&segments, &title) {
            segments.push(title);
        }
        rest = &after_open[end + MICRO_TITLE_END.len()..];
    }

    segments
}

fn push_body(segments: &mut Vec<Segment>, text: &str) {
    // A stray end marker carries no meaning on its own.
    let text = text.replace(MICRO_TITLE_END, " ");
    let body = Segment::body(&text);
    if !body.text.is_empty() {
        segments.push(body);
    }
}

fn repeats_previous_title(segments: &[Segment], title: &Segment) -> bool {
    matches!(
        segments.last(),
        Some(prev) if prev.kind == SegmentKind::Title
            && normalize_title(&prev.text) == normalize_title(&title.text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_one_body() {
        let segs = segment_micro_titles("  Gewoon tekst.  ");
        assert_eq!(segs, vec![Segment::body("Gewoon tekst.")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(segment_micro_titles("   ").is_empty());
    }

    #[test]
    fn test_leading_and_trailing_bodies() {
        let segs = segment_micro_titles("Voor<<MICRO_TITLE>>Kop<<MICRO_TITLE_END>>Na");
        assert_eq!(
            segs,
            vec![
                Segment::body("Voor"),
                Segment::title("Kop"),
                Segment::body("Na"),
            ]
        );
    }

    #[test]
    fn test_different_adjacent_titles_kept() {
        let segs = segment_micro_titles(
            "<<MICRO_TITLE>>Een<<MICRO_TITLE_END>><<MICRO_TITLE>>Twee<<MICRO_TITLE_END>>",
        );
        assert_eq!(segs, vec![Segment::title("Een"), Segment::title("Twee")]);
    }

    #[test]
    fn test_duplicate_with_markers_and_case() {
        let segs = segment_micro_titles(
            "<<MICRO_TITLE>><<BOLD_START>>De  Nier<<BOLD_END>><<MICRO_TITLE_END>>\n\n<<MICRO_TITLE>>de nier<<MICRO_TITLE_END>>Tekst",
        );
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].kind, SegmentKind::Title);
        assert_eq!(segs[1], Segment::body("Tekst"));
    }

    #[test]
    fn test_same_title_separated_by_body_kept() {
        let segs = segment_micro_titles(
            "<<MICRO_TITLE>>Kop<<MICRO_TITLE_END>>tekst<<MICRO_TITLE>>Kop<<MICRO_TITLE_END>>",
        );
        assert_eq!(segs.len(), 3);
    }

    #[test]
    fn test_unterminated_title_becomes_body() {
        let segs = segment_micro_titles("Voor <<MICRO_TITLE>>rest van de tekst");
        assert_eq!(
            segs,
            vec![Segment::body("Voor"), Segment::body("rest van de tekst")]
        );
    }
}
