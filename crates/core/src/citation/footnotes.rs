//! Footnote markers and footnote blocks.
//!
//! Markers use markdown footnote syntax: the link text is followed by
//! ` [^N]`, and the block below the text carries one `[^N]: cited text` line
//! per citation. First-level footnotes sit after a `---` line; footnotes of
//! nested citations follow after a second `---` line.

use std::sync::LazyLock;

use regex::Regex;

use super::TooltipCitation;
use crate::text::replace_first;

/// Separator line between the text and each footnote block.
pub const BLOCK_SEPARATOR: &str = "---";

static DEFINITION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[\^(\d+)\]: ?(.*)$").unwrap());

/// A `[^N]: text` footnote definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footnote {
    pub number: u32,
    pub text: String,
}

/// The inline marker for footnote `number`.
pub fn marker(number: u32) -> String {
    format!("[^{}]", number)
}

/// Link text followed by its footnote marker.
pub fn with_marker(text: &str, number: u32) -> String {
    format!("{} {}", text, marker(number))
}

/// One footnote definition line, newline included.
pub fn definition(number: u32, text: &str) -> String {
    format!("{}: {}\n", marker(number), text)
}

/// Adds a marker after the first occurrence of each citation's link text.
///
/// Citations are applied in order, so when two links share a text the first
/// marker lands on the first occurrence and the second marker follows it.
pub fn annotate(raw_text: &str, citations: &[TooltipCitation]) -> String {
    citations.iter().fold(raw_text.to_string(), |text, citation| {
        replace_first(&text, &citation.link_data.link_text, &citation.link_text_with_ref)
    })
}

/// Appends the first-level footnote block to annotated text.
///
/// Text without citations is returned unchanged.
pub fn with_first_level(annotated: &str, citations: &[TooltipCitation]) -> String {
    if citations.is_empty() {
        return annotated.to_string();
    }

    let mut out = format!("{}\n{}\n", annotated, BLOCK_SEPARATOR);
    for citation in citations {
        out.push_str(&definition(citation.cite_num, &citation.cited_text));
    }
    out
}

/// Appends the nested-citation footnote block, when there is one.
pub fn with_second_level(first_level: &str, citations: &[TooltipCitation]) -> String {
    let nested: Vec<_> = citations.iter().flat_map(|c| c.nested.iter()).collect();
    if nested.is_empty() {
        return first_level.to_string();
    }

    let mut out = format!("{}{}\n", first_level, BLOCK_SEPARATOR);
    for citation in nested {
        out.push_str(&definition(citation.cite_num, &citation.cited_text));
    }
    out
}

/// Recovers footnote definitions from a rendered block, in order.
///
/// Lines that are not `[^N]: text` definitions are ignored, so the whole
/// annotated paragraph can be passed in.
///
/// ```rust
/// use wolstudy_core::citation::parse_footnotes;
///
/// let notes = parse_footnotes("Lea Juan 3:16 [^1].\n---\n[^1]: Porque Dios amó tanto al mundo\n");
/// assert_eq!(notes.len(), 1);
/// assert_eq!(notes[0].number, 1);
/// assert_eq!(notes[0].text, "Porque Dios amó tanto al mundo");
/// ```
pub fn parse_footnotes(block: &str) -> Vec<Footnote> {
    block
        .lines()
        .filter_map(|line| {
            let caps = DEFINITION.captures(line)?;
            let number = caps.get(1)?.as_str().parse().ok()?;
            let text = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
            Some(Footnote { number, text })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::{CitationKind, CitationLink, NestedCitation};

    fn citation(num: u32, link_text: &str, cited: &str) -> TooltipCitation {
        TooltipCitation {
            cite_num: num,
            link_data: CitationLink {
                link_text: link_text.to_string(),
                link_href: format!("/es/wol/bc/r4/lp-s/{}", num),
                cite_num: num,
            },
            cited_text: cited.to_string(),
            link_text_with_ref: with_marker(link_text, num),
            kind: CitationKind::Bible,
            nested: Vec::new(),
        }
    }

    #[test]
    fn test_annotate_first_match() {
        let citations = vec![citation(1, "Juan 3:16", "a"), citation(2, "Rom. 5:8", "b")];
        let text = annotate("Lea Juan 3:16 y Rom. 5:8.", &citations);
        assert_eq!(text, "Lea Juan 3:16 [^1] y Rom. 5:8 [^2].");
    }

    #[test]
    fn test_annotate_duplicate_link_texts() {
        let citations = vec![citation(1, "Juan 3:16", "a"), citation(2, "Juan 3:16", "a")];
        let text = annotate("Juan 3:16 y otra vez Juan 3:16", &citations);
        assert_eq!(text, "Juan 3:16 [^2] [^1] y otra vez Juan 3:16");
    }

    #[test]
    fn test_first_level_block() {
        let citations = vec![citation(3, "Juan 3:16", "Porque Dios amó"), citation(4, "Rom. 5:8", "Cristo murió")];
        let annotated = annotate("Juan 3:16; Rom. 5:8", &citations);
        let block = with_first_level(&annotated, &citations);
        assert_eq!(
            block,
            "Juan 3:16 [^3]; Rom. 5:8 [^4]\n---\n[^3]: Porque Dios amó\n[^4]: Cristo murió\n"
        );
    }

    #[test]
    fn test_no_citations_leaves_text_alone() {
        assert_eq!(with_first_level("Sin citas.", &[]), "Sin citas.");
        assert_eq!(with_second_level("Sin citas.", &[]), "Sin citas.");
    }

    #[test]
    fn test_second_level_block() {
        let mut first = citation(1, "w23.01 2", "Vea Sal. 83:18 [^2]");
        first.kind = CitationKind::Publication;
        first.nested.push(NestedCitation {
            cite_num: 2,
            link_data: CitationLink { link_text: "Sal. 83:18".into(), link_href: "/h".into(), cite_num: 2 },
            cited_text: "Tú, cuyo nombre es Jehová".into(),
        });
        let citations = vec![first];

        let first_level = with_first_level(&annotate("Vea w23.01 2.", &citations), &citations);
        let both = with_second_level(&first_level, &citations);
        assert_eq!(
            both,
            "Vea w23.01 2 [^1].\n---\n[^1]: Vea Sal. 83:18 [^2]\n---\n[^2]: Tú, cuyo nombre es Jehová\n"
        );
    }

    #[test]
    fn test_parse_footnotes_recovers_cited_texts() {
        let citations = vec![
            citation(7, "Juan 3:16", "Porque Dios amó tanto al mundo: que dio"),
            citation(8, "Rom. 5:8", "Pero Dios nos demuestra su amor [nota]"),
        ];
        let block = with_first_level(&annotate("Juan 3:16 y Rom. 5:8", &citations), &citations);
        let parsed = parse_footnotes(&block);

        assert_eq!(parsed.len(), 2);
        for (note, citation) in parsed.iter().zip(&citations) {
            assert_eq!(note.number, citation.cite_num);
            assert_eq!(note.text, citation.cited_text);
        }
    }

    #[test]
    fn test_parse_footnotes_ignores_other_lines() {
        assert!(parse_footnotes("texto [^1]\n---\n").is_empty());
    }
}
