//! Paragraph-coverage classification.
//!
//! Study questions open with a bold token naming the paragraphs they cover
//! (`"12."`, `"5, 6."`, `"7-9."`), and figure captions end with a Spanish
//! phrase such as `(Vea los párrafos 7 a 9)`. Both are reduced to a
//! [`CoverageKind`] plus the list of paragraph numbers involved.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Widest paragraph span a range may cover. Articles are far shorter, so a
/// wider span is a misread token and expands to nothing.
pub const MAX_RANGE_SPAN: u32 = 200;

static CAPTION_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"párrafos?\s(\d+)(?:\s([ya])\s(\d+))?").expect("valid caption regex"));

/// How many paragraphs a question or figure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageKind {
    /// One paragraph, e.g. `"12."`.
    Single,
    /// Two listed paragraphs, e.g. `"5, 6."`.
    Double,
    /// An inclusive span, e.g. `"7-9."`.
    Range,
}

/// A question's paragraph-coverage token, with the trailing period removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    pub kind: CoverageKind,
    /// The token as printed, without the trailing period (`"5, 6"`).
    pub reference: String,
}

impl Coverage {
    /// Classifies a covered-paragraph token.
    ///
    /// ```rust
    /// use wolstudy_core::coverage::{Coverage, CoverageKind};
    ///
    /// let coverage = Coverage::classify("7-9.");
    /// assert_eq!(coverage.kind, CoverageKind::Range);
    /// assert_eq!(coverage.paragraphs(), vec![7, 8, 9]);
    /// ```
    pub fn classify(token: &str) -> Self {
        let token = token.trim();
        let reference = token.strip_suffix('.').unwrap_or(token).trim().to_string();

        let kind = if reference.contains(',') {
            CoverageKind::Double
        } else if reference.contains('-') {
            CoverageKind::Range
        } else {
            CoverageKind::Single
        };

        Self { kind, reference }
    }

    /// Expands the reference into paragraph numbers.
    ///
    /// Pieces that are not numbers are skipped, and a range whose end is
    /// before its start, or that spans more than [`MAX_RANGE_SPAN`]
    /// paragraphs, yields nothing.
    pub fn paragraphs(&self) -> Vec<u32> {
        expand(self.kind, &self.reference)
    }
}

fn expand(kind: CoverageKind, reference: &str) -> Vec<u32> {
    let number = |s: &str| s.trim().parse::<u32>().ok();

    match kind {
        CoverageKind::Single => number(reference).into_iter().collect(),
        CoverageKind::Double => reference.split(',').filter_map(number).collect(),
        CoverageKind::Range => match reference.split_once('-') {
            Some((start, end)) => match (number(start), number(end)) {
                (Some(start), Some(end)) => span(start, end),
                _ => Vec::new(),
            },
            None => Vec::new(),
        },
    }
}

fn span(start: u32, end: u32) -> Vec<u32> {
    if end.saturating_sub(start) >= MAX_RANGE_SPAN {
        tracing::warn!(start, end, "paragraph range is too wide, ignoring it");
        return Vec::new();
    }
    (start..=end).collect()
}

/// Paragraphs a figure relates to, derived from its caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphReference {
    pub type_of_p_coverage: CoverageKind,
    pub p_covered: Vec<u32>,
}

impl ParagraphReference {
    /// Parses the localized caption phrase `párrafo(s) N [y|a M]`.
    ///
    /// `y` lists two paragraphs, `a` spans a range.
    ///
    /// ```rust
    /// use wolstudy_core::coverage::{CoverageKind, ParagraphReference};
    ///
    /// let reference = ParagraphReference::from_caption("Vea los párrafos 3 y 4").unwrap();
    /// assert_eq!(reference.type_of_p_coverage, CoverageKind::Double);
    /// assert_eq!(reference.p_covered, vec![3, 4]);
    /// ```
    pub fn from_caption(text: &str) -> Option<Self> {
        let caps = CAPTION_REFERENCE.captures(text)?;
        let first: u32 = caps.get(1)?.as_str().parse().ok()?;
        let second = caps.get(3).and_then(|m| m.as_str().parse::<u32>().ok());

        let (kind, covered) = match (caps.get(2).map(|m| m.as_str()), second) {
            (Some("y"), Some(second)) => (CoverageKind::Double, vec![first, second]),
            (Some("a"), Some(second)) => (CoverageKind::Range, span(first, second)),
            _ => (CoverageKind::Single, vec![first]),
        };

        Some(Self { type_of_p_coverage: kind, p_covered: covered })
    }

    /// Checks whether any covered paragraph is also in `paragraphs`.
    pub fn overlaps(&self, paragraphs: &[u32]) -> bool {
        self.p_covered.iter().any(|p| paragraphs.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("12.", CoverageKind::Single, "12", vec![12])]
    #[case("1.", CoverageKind::Single, "1", vec![1])]
    #[case("5, 6.", CoverageKind::Double, "5, 6", vec![5, 6])]
    #[case("14, 15.", CoverageKind::Double, "14, 15", vec![14, 15])]
    #[case("7-9.", CoverageKind::Range, "7-9", vec![7, 8, 9])]
    #[case("16-18.", CoverageKind::Range, "16-18", vec![16, 17, 18])]
    fn test_classify(#[case] token: &str, #[case] kind: CoverageKind, #[case] reference: &str, #[case] paragraphs: Vec<u32>) {
        let coverage = Coverage::classify(token);
        assert_eq!(coverage.kind, kind);
        assert_eq!(coverage.reference, reference);
        assert_eq!(coverage.paragraphs(), paragraphs);
    }

    #[test]
    fn test_classify_without_period() {
        let coverage = Coverage::classify("3");
        assert_eq!(coverage.kind, CoverageKind::Single);
        assert_eq!(coverage.paragraphs(), vec![3]);
    }

    #[test]
    fn test_reversed_range_is_empty() {
        assert!(Coverage::classify("9-7.").paragraphs().is_empty());
    }

    #[rstest]
    #[case("1-4000000000.")]
    #[case("3-203.")]
    fn test_oversized_range_is_empty(#[case] token: &str) {
        let coverage = Coverage::classify(token);
        assert_eq!(coverage.kind, CoverageKind::Range);
        assert!(coverage.paragraphs().is_empty());
    }

    #[test]
    fn test_widest_range() {
        assert_eq!(Coverage::classify("1-200.").paragraphs().len(), 200);
    }

    #[test]
    fn test_oversized_caption_range_is_empty() {
        let reference = ParagraphReference::from_caption("párrafos 1 a 4000000000").unwrap();
        assert_eq!(reference.type_of_p_coverage, CoverageKind::Range);
        assert!(reference.p_covered.is_empty());
    }

    #[rstest]
    #[case("Vea el párrafo 4", CoverageKind::Single, vec![4])]
    #[case("Vea los párrafos 3 y 4", CoverageKind::Double, vec![3, 4])]
    #[case("Vea los párrafos 10 a 12", CoverageKind::Range, vec![10, 11, 12])]
    fn test_from_caption(#[case] caption: &str, #[case] kind: CoverageKind, #[case] covered: Vec<u32>) {
        let reference = ParagraphReference::from_caption(caption).unwrap();
        assert_eq!(reference.type_of_p_coverage, kind);
        assert_eq!(reference.p_covered, covered);
    }

    #[test]
    fn test_from_caption_without_reference() {
        assert!(ParagraphReference::from_caption("Una familia predica").is_none());
    }

    #[test]
    fn test_overlaps() {
        let reference = ParagraphReference::from_caption("párrafos 10 a 12").unwrap();
        assert!(reference.overlaps(&[12, 13]));
        assert!(!reference.overlaps(&[1, 2]));
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&CoverageKind::Range).unwrap(), "\"range\"");
    }
}
