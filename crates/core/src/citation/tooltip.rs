//! The tooltip surface citation links open.
//!
//! A page shows at most one tooltip. [`TooltipSurface`] models that as a
//! resource with an explicit open/read/close cycle, and
//! [`TooltipSurface::inspect`] runs one full cycle, closing the tooltip even
//! when reading it fails.

use std::sync::LazyLock;

use regex::Regex;

use super::footnotes::marker;
use super::{CITATION_LINK_SELECTOR, CitationKind, LinkTarget, ReferenceLookup};
use crate::parse::Document;
use crate::{Result, WolError};

static LEADING_VERSE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+?\W").unwrap());

/// The links [`Tooltip::nested_links`] reports.
const MARKED_LINK_SELECTOR: &str = "a.b[href]";

/// Content shown by an open tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub kind: CitationKind,
    pub html: String,
}

impl Tooltip {
    /// Builds a tooltip from a looked-up fragment.
    ///
    /// The classes of the fragment's root element win (`bibleCitation`,
    /// `publicationCitation`); otherwise the href decides, `/wol/bc/` being
    /// a Bible citation and `/wol/pc/` a publication citation.
    pub fn from_fragment(href: &str, html: String) -> Self {
        let doc = Document::parse_fragment(&html);
        let root = doc.first_element();
        let has = |class: &str| root.as_ref().is_some_and(|el| el.has_class(class));

        let kind = if has("bibleCitation") {
            CitationKind::Bible
        } else if has("publicationCitation") {
            CitationKind::Publication
        } else if href.contains("/wol/bc/") {
            CitationKind::Bible
        } else if href.contains("/wol/pc/") {
            CitationKind::Publication
        } else {
            CitationKind::Other
        };

        Self { kind, html }
    }

    /// The tooltip text as displayed.
    ///
    /// Bible tooltips lose their leading verse number and the `+`/`*`
    /// cross-reference markers.
    pub fn text(&self) -> String {
        self.display_text(&self.html)
    }

    /// The tooltip text with a `[^N]` marker after each nested link.
    ///
    /// `numbers` pairs up with [`Tooltip::nested_links`] in order. Markers are
    /// placed in the fragment before the text is cleaned, so links whose text
    /// is a `+` cross-reference sign keep their marker. Numbers left over
    /// once every link is marked go at the end of the text.
    pub fn text_with_markers(&self, numbers: &[u32]) -> Result<String> {
        if numbers.is_empty() {
            return Ok(self.text());
        }

        let mut pending = numbers.iter();
        let mut output = Vec::new();
        let mut rewriter = lol_html::HtmlRewriter::new(
            lol_html::Settings {
                element_content_handlers: vec![lol_html::element!(MARKED_LINK_SELECTOR, |el| {
                    if let Some(number) = pending.next() {
                        el.after(&format!(" {}", marker(*number)), lol_html::html_content::ContentType::Text);
                    }
                    Ok(())
                })],
                ..Default::default()
            },
            |c: &[u8]| output.extend_from_slice(c),
        );

        rewriter
            .write(self.html.as_bytes())
            .map_err(|e| WolError::HtmlParseError(e.to_string()))?;
        rewriter.end().map_err(|e| WolError::HtmlParseError(e.to_string()))?;

        let html = String::from_utf8(output).map_err(|e| WolError::HtmlParseError(e.to_string()))?;
        let mut text = self.display_text(&html);
        for number in pending {
            text.push(' ');
            text.push_str(&marker(*number));
        }
        Ok(text)
    }

    fn display_text(&self, html: &str) -> String {
        let text = Document::parse_fragment(html).text_content();
        if self.kind == CitationKind::Bible {
            LEADING_VERSE_NUMBER.replace(&text, "").replace(['+', '*'], "").trim().to_string()
        } else {
            text
        }
    }

    /// Citation links shown inside the tooltip, in source order.
    pub fn nested_links(&self) -> Result<Vec<LinkTarget>> {
        let doc = Document::parse_fragment(&self.html);
        Ok(doc
            .select(CITATION_LINK_SELECTOR)?
            .iter()
            .filter_map(|a| a.attr("href").map(|href| LinkTarget::new(a.clean_text(), href)))
            .collect())
    }
}

/// A single tooltip that citation links can be opened in.
#[allow(async_fn_in_trait)]
pub trait TooltipSurface {
    /// Opens the tooltip for `link`.
    ///
    /// Fails when another tooltip is still open.
    async fn open(&mut self, link: &LinkTarget) -> Result<()>;

    /// Reads the open tooltip.
    async fn read(&mut self) -> Result<Tooltip>;

    /// Closes the open tooltip.
    async fn close(&mut self) -> Result<()>;

    /// Whether a tooltip is currently open.
    fn is_open(&self) -> bool;

    /// Opens, reads and closes the tooltip for `link`.
    ///
    /// The tooltip is closed even when reading fails; the read error wins
    /// over the close error.
    async fn inspect(&mut self, link: &LinkTarget) -> Result<Tooltip> {
        self.open(link).await?;
        let read = self.read().await;
        let closed = self.close().await;
        let tooltip = read?;
        closed?;
        Ok(tooltip)
    }
}

/// A tooltip surface backed by the reference lookup endpoint.
///
/// Opening a link fetches what its tooltip would show.
#[derive(Debug)]
pub struct LookupTooltip<L> {
    lookup: L,
    current: Option<(LinkTarget, Tooltip)>,
}

impl<L: ReferenceLookup> LookupTooltip<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup, current: None }
    }
}

impl<L: ReferenceLookup> TooltipSurface for LookupTooltip<L> {
    async fn open(&mut self, link: &LinkTarget) -> Result<()> {
        if let Some((open, _)) = &self.current {
            return Err(WolError::Tooltip(format!(
                "cannot open {} while the tooltip for {} is open",
                link.text, open.text
            )));
        }

        let html = self.lookup.fetch_fragment(&link.href).await?;
        self.current = Some((link.clone(), Tooltip::from_fragment(&link.href, html)));
        Ok(())
    }

    async fn read(&mut self) -> Result<Tooltip> {
        self.current
            .as_ref()
            .map(|(_, tooltip)| tooltip.clone())
            .ok_or_else(|| WolError::Tooltip("no tooltip is open".to_string()))
    }

    async fn close(&mut self) -> Result<()> {
        self.current
            .take()
            .map(|_| ())
            .ok_or_else(|| WolError::Tooltip("no tooltip to close".to_string()))
    }

    fn is_open(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Fragments(HashMap<&'static str, &'static str>);

    impl ReferenceLookup for Fragments {
        async fn fetch_fragment(&self, href: &str) -> Result<String> {
            self.0
                .get(href)
                .map(|s| s.to_string())
                .ok_or_else(|| WolError::Lookup { href: href.to_string(), reason: "unknown".into() })
        }
    }

    fn fragments() -> Fragments {
        Fragments(HashMap::from([
            ("/es/wol/bc/r4/lp-s/1", r#"<p class="sb">16 Porque Dios amó tanto al mundo+ que dio a su Hijo*</p>"#),
            (
                "/es/wol/pc/r4/lp-s/2",
                r#"<div class="publicationCitation"><p>Vea <a class="b" href="/es/wol/bc/r4/lp-s/3">Sal. 83:18</a>.</p></div>"#,
            ),
        ]))
    }

    #[tokio::test]
    async fn test_inspect_reads_and_closes() {
        let mut surface = LookupTooltip::new(fragments());
        let tooltip = surface.inspect(&LinkTarget::new("Juan 3:16", "/es/wol/bc/r4/lp-s/1")).await.unwrap();

        assert_eq!(tooltip.kind, CitationKind::Bible);
        assert_eq!(tooltip.text(), "Porque Dios amó tanto al mundo que dio a su Hijo");
        assert!(!surface.is_open());
    }

    #[tokio::test]
    async fn test_second_open_is_rejected() {
        let mut surface = LookupTooltip::new(fragments());
        surface.open(&LinkTarget::new("Juan 3:16", "/es/wol/bc/r4/lp-s/1")).await.unwrap();

        let err = surface.open(&LinkTarget::new("w", "/es/wol/pc/r4/lp-s/2")).await.unwrap_err();
        assert!(matches!(err, WolError::Tooltip(_)));
        assert!(surface.is_open());

        surface.close().await.unwrap();
        assert!(surface.close().await.is_err());
    }

    #[tokio::test]
    async fn test_failed_open_leaves_surface_closed() {
        let mut surface = LookupTooltip::new(fragments());
        let err = surface.inspect(&LinkTarget::new("x", "/missing")).await.unwrap_err();
        assert!(matches!(err, WolError::Lookup { .. }));
        assert!(!surface.is_open());
    }

    #[test]
    fn test_publication_tooltip_nested_links() {
        let tooltip = Tooltip::from_fragment(
            "/es/wol/pc/r4/lp-s/2",
            r#"<div class="publicationCitation"><p>Vea <a class="b" href="/es/wol/bc/r4/lp-s/3">Sal. 83:18</a>.</p></div>"#
                .to_string(),
        );
        assert_eq!(tooltip.kind, CitationKind::Publication);
        assert_eq!(tooltip.text(), "Vea Sal. 83:18.");
        assert_eq!(
            tooltip.nested_links().unwrap(),
            vec![LinkTarget::new("Sal. 83:18", "/es/wol/bc/r4/lp-s/3")]
        );
    }

    #[test]
    fn test_kind_from_class_beats_href() {
        let tooltip = Tooltip::from_fragment("/es/wol/pc/r4/lp-s/9", r#"<div class="bibleCitation">1 texto</div>"#.into());
        assert_eq!(tooltip.kind, CitationKind::Bible);
        assert_eq!(tooltip.text(), "texto");
    }

    #[test]
    fn test_kind_reads_root_class_only() {
        let tooltip = Tooltip::from_fragment(
            "/es/wol/pc/r4/lp-s/9",
            r#"<div class="publicationCitation"><p>3 puntos clave:</p><div class="bibleCitation"><p>16 Porque Dios amó</p></div></div>"#
                .into(),
        );
        assert_eq!(tooltip.kind, CitationKind::Publication);
        assert_eq!(tooltip.text(), "3 puntos clave:16 Porque Dios amó");

        let plain = Tooltip::from_fragment("/es/wol/pc/r4/lp-s/9", r#"<p>Vea <span class="bibleCitation">1</span></p>"#.into());
        assert_eq!(plain.kind, CitationKind::Publication);
    }

    #[test]
    fn test_markers_follow_cross_reference_signs() {
        let tooltip = Tooltip::from_fragment(
            "/es/wol/bc/r4/lp-s/1",
            r#"<p>16 Porque Dios amó tanto al mundo<a class="b" href="/es/wol/bc/2">+</a> que dio a su Hijo<a class="b" href="/es/wol/bc/3">*</a></p>"#
                .into(),
        );
        assert_eq!(tooltip.nested_links().unwrap().len(), 2);
        assert_eq!(
            tooltip.text_with_markers(&[2, 3]).unwrap(),
            "Porque Dios amó tanto al mundo [^2] que dio a su Hijo [^3]"
        );
    }

    #[test]
    fn test_markers_without_matching_link_are_appended() {
        let tooltip = Tooltip::from_fragment("/es/wol/bc/r4/lp-s/1", r#"<p>8 Dios es amor.</p>"#.into());
        assert_eq!(tooltip.text_with_markers(&[4]).unwrap(), "Dios es amor. [^4]");
        assert_eq!(tooltip.text_with_markers(&[]).unwrap(), "Dios es amor.");
    }

    #[test]
    fn test_unknown_kind() {
        let tooltip = Tooltip::from_fragment("/es/wol/tc/r4/lp-s/9", "<p>nota</p>".into());
        assert_eq!(tooltip.kind, CitationKind::Other);
    }
}
