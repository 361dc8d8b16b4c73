//! Citation extraction and footnote building.
//!
//! Paragraphs link to scriptures and publications through `a.b` anchors.
//! Resolving a paragraph means opening each link's tooltip in source order,
//! reading the cited text, optionally expanding the links found inside the
//! tooltip, and rewriting the paragraph text with `[^N]` footnote markers.
//!
//! The pieces:
//!
//! - [`CiteSequence`] hands out run-wide footnote numbers.
//! - [`TooltipSurface`] is the single tooltip a page can show at a time;
//!   [`LookupTooltip`] implements it on top of a [`ReferenceLookup`].
//! - [`CitationResolver`] walks a [`CitationContainer`] and produces
//!   [`CitationData`].
//! - [`footnotes`] renders and re-parses footnote blocks.

pub mod footnotes;
pub mod lookup;
pub mod resolver;
pub mod sequence;
pub mod tooltip;

pub use footnotes::{Footnote, parse_footnotes};
pub use lookup::{ReferenceLookup, WolClient, strip_anchors};
pub use resolver::{CitationResolver, NestedScope, ResolverConfig};
pub use sequence::CiteSequence;
pub use tooltip::{LookupTooltip, Tooltip, TooltipSurface};

use serde::{Deserialize, Serialize};

use crate::parse::Element;
use crate::{Result, WolError};

/// Selector for citation anchors inside paragraphs and tooltips.
pub const CITATION_LINK_SELECTOR: &str = "a.b";

/// A citation anchor as found in the page, before it is numbered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub text: String,
    pub href: String,
}

impl LinkTarget {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self { text: text.into(), href: href.into() }
    }

    /// Captures every citation link below `element`, in source order.
    ///
    /// Anchors without an `href` are skipped.
    pub fn collect(element: &Element<'_>) -> Result<Vec<Self>> {
        Self::collect_matching(element, CITATION_LINK_SELECTOR)
    }

    /// Captures the anchors below `element` that match `selector`, in
    /// source order, skipping those without an `href`.
    pub fn collect_matching(element: &Element<'_>, selector: &str) -> Result<Vec<Self>> {
        Ok(element
            .select(selector)?
            .iter()
            .filter_map(|a| a.attr("href").map(|href| Self::new(a.clean_text(), href)))
            .collect())
    }
}

/// A numbered citation link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationLink {
    pub link_text: String,
    pub link_href: String,
    pub cite_num: u32,
}

/// What a tooltip turned out to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationKind {
    Bible,
    Publication,
    Other,
}

/// A citation resolved through a direct lookup from inside a tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedCitation {
    pub cite_num: u32,
    pub link_data: CitationLink,
    pub cited_text: String,
}

/// A first-level citation read from a tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipCitation {
    pub cite_num: u32,
    pub link_data: CitationLink,
    /// Tooltip text, with `[^M]` markers after nested link texts.
    pub cited_text: String,
    /// Link text followed by its footnote marker, e.g. `"Juan 3:16 [^4]"`.
    pub link_text_with_ref: String,
    pub kind: CitationKind,
    #[serde(default)]
    pub nested: Vec<NestedCitation>,
}

impl TooltipCitation {
    pub fn is_bible(&self) -> bool {
        self.kind == CitationKind::Bible
    }
}

/// The citation-bearing text of a page region, captured before resolution.
///
/// Capturing owned strings up front keeps DOM handles out of async code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationContainer {
    pub raw_text: String,
    pub links: Vec<LinkTarget>,
}

impl CitationContainer {
    pub fn new(raw_text: impl Into<String>, links: Vec<LinkTarget>) -> Self {
        Self { raw_text: raw_text.into(), links }
    }

    /// Captures the cleaned text and the citation links of an element.
    pub fn capture(element: &Element<'_>) -> Result<Self> {
        Ok(Self { raw_text: element.clean_text(), links: LinkTarget::collect(element)? })
    }

    /// Captures the cleaned text of an element and every anchor matching
    /// `link_selector` as a citation link.
    pub fn capture_matching(element: &Element<'_>, link_selector: &str) -> Result<Self> {
        Ok(Self { raw_text: element.clean_text(), links: LinkTarget::collect_matching(element, link_selector)? })
    }
}

/// A region's text in its plain, annotated and footnoted forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationData {
    /// Text found as-is in the element.
    pub raw_text: String,
    /// `raw_text` with a `[^N]` marker after each link text.
    pub text_with_refs_only: String,
    /// Annotated text followed by the first-level footnote block.
    pub text_with_refs_and_foot_notes: String,
    /// First-level block followed by the footnotes of nested citations.
    pub text_with_refs_and_foot_notes2_levels: String,
    pub tooltip_citations: Vec<TooltipCitation>,
}

impl CitationData {
    /// Builds every text form from the resolved citations.
    pub fn from_citations(raw_text: String, tooltip_citations: Vec<TooltipCitation>) -> Self {
        let text_with_refs_only = footnotes::annotate(&raw_text, &tooltip_citations);
        let text_with_refs_and_foot_notes = footnotes::with_first_level(&text_with_refs_only, &tooltip_citations);
        let text_with_refs_and_foot_notes2_levels =
            footnotes::with_second_level(&text_with_refs_and_foot_notes, &tooltip_citations);

        Self {
            raw_text,
            text_with_refs_only,
            text_with_refs_and_foot_notes,
            text_with_refs_and_foot_notes2_levels,
            tooltip_citations,
        }
    }

    /// Every footnote number used in this region, first level then nested.
    pub fn cite_nums(&self) -> Vec<u32> {
        let first = self.tooltip_citations.iter().map(|c| c.cite_num);
        let nested = self.tooltip_citations.iter().flat_map(|c| c.nested.iter().map(|n| n.cite_num));
        first.chain(nested).collect()
    }
}

impl WolError {
    /// Recovers the citations resolved before a [`WolError::PartialCitations`].
    pub fn into_partial_citations(self) -> Option<CitationData> {
        match self {
            WolError::PartialCitations { partial, .. } => Some(*partial),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Document;

    #[test]
    fn test_capture_container() {
        let doc = Document::parse(
            r#"<p class="sb"><span class="parNum"><sup>1</sup></span> Lea <a class="b" href="/es/wol/bc/r4/lp-s/1">Juan 3:16</a> y <a class="b" href="/es/wol/bc/r4/lp-s/2">Rom. 5:8</a>. <a href="/otro">otro</a></p>"#,
        )
        .unwrap();
        let p = doc.select_first("p.sb").unwrap().unwrap();
        let container = CitationContainer::capture(&p).unwrap();

        assert_eq!(container.raw_text, "1 Lea Juan 3:16 y Rom. 5:8. otro");
        assert_eq!(
            container.links,
            vec![
                LinkTarget::new("Juan 3:16", "/es/wol/bc/r4/lp-s/1"),
                LinkTarget::new("Rom. 5:8", "/es/wol/bc/r4/lp-s/2"),
            ]
        );
    }

    #[test]
    fn test_capture_matching_any_anchor() {
        let doc = Document::parse(
            r#"<p>Sea amoroso (<a href="/es/wol/pc/r4/lp-s/1">w23.01 2</a>; <a class="b" href="/es/wol/bc/r4/lp-s/2">1 Juan 4:8</a>; <a>sin destino</a>)</p>"#,
        )
        .unwrap();
        let p = doc.select_first("p").unwrap().unwrap();
        let container = CitationContainer::capture_matching(&p, "a").unwrap();

        assert_eq!(container.links.len(), 2);
        assert_eq!(container.links[0], LinkTarget::new("w23.01 2", "/es/wol/pc/r4/lp-s/1"));
        assert_eq!(CitationContainer::capture(&p).unwrap().links.len(), 1);
    }

    #[test]
    fn test_partial_error_into_citation_data() {
        let partial = CitationData::from_citations("texto".into(), Vec::new());
        let err = WolError::PartialCitations { partial: Box::new(partial.clone()), reason: "x".into() };
        assert_eq!(err.into_partial_citations(), Some(partial));
        assert!(WolError::Chat("x".into()).into_partial_citations().is_none());
    }
}
