use tracing::{debug, warn};

use super::footnotes::with_marker;
use super::{
    CitationContainer, CitationData, CitationKind, CitationLink, CiteSequence, LinkTarget, NestedCitation,
    ReferenceLookup, TooltipCitation, TooltipSurface, strip_anchors,
};
use crate::parse::Document;
use crate::{Result, WolError};

/// Which tooltips get their own citation links expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NestedScope {
    /// Only Bible tooltips.
    #[default]
    Bible,
    /// Publication and other non-Bible tooltips.
    NonBible,
    /// Every tooltip.
    All,
    /// Never expand.
    None,
}

impl NestedScope {
    pub fn expands(self, kind: CitationKind) -> bool {
        match self {
            NestedScope::Bible => kind == CitationKind::Bible,
            NestedScope::NonBible => kind != CitationKind::Bible,
            NestedScope::All => true,
            NestedScope::None => false,
        }
    }
}

/// Configuration for [`CitationResolver`].
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    pub nested_scope: NestedScope,
}

/// Turns citation containers into footnoted text.
///
/// Links are handled strictly one after another: each tooltip is opened,
/// read and closed before the next link is touched.
///
/// # Example
///
/// ```rust,no_run
/// use wolstudy_core::citation::{
///     CitationContainer, CitationResolver, CiteSequence, LinkTarget, LookupTooltip, ResolverConfig, WolClient,
/// };
/// use wolstudy_core::FetchConfig;
///
/// # async fn example() -> wolstudy_core::Result<()> {
/// let client = WolClient::new(&FetchConfig::default())?;
/// let mut resolver = CitationResolver::new(LookupTooltip::new(&client), &client, ResolverConfig::default());
/// let mut sequence = CiteSequence::new();
///
/// let container = CitationContainer::new(
///     "Lea Juan 3:16.",
///     vec![LinkTarget::new("Juan 3:16", "/es/wol/bc/r4/lp-s/1001070503/0/0")],
/// );
/// let data = resolver.resolve(&container, &mut sequence).await?;
/// println!("{}", data.text_with_refs_and_foot_notes);
/// # Ok(())
/// # }
/// ```
pub struct CitationResolver<T, L> {
    surface: T,
    lookup: L,
    config: ResolverConfig,
}

impl<T: TooltipSurface, L: ReferenceLookup> CitationResolver<T, L> {
    pub fn new(surface: T, lookup: L, config: ResolverConfig) -> Self {
        Self { surface, lookup, config }
    }

    pub fn surface(&self) -> &T {
        &self.surface
    }

    /// Resolves every citation link of a container.
    ///
    /// # Errors
    ///
    /// When a link fails, the remaining links of this container are
    /// abandoned and [`WolError::PartialCitations`] is returned with the
    /// citations resolved so far.
    pub async fn resolve(&mut self, container: &CitationContainer, sequence: &mut CiteSequence) -> Result<CitationData> {
        let mut citations = Vec::with_capacity(container.links.len());

        for (i, link) in container.links.iter().enumerate() {
            debug!(link = %link.text, "resolving citation {} of {}", i + 1, container.links.len());

            match self.resolve_link(link, sequence).await {
                Ok(citation) => citations.push(citation),
                Err(err) => {
                    warn!(link = %link.text, error = %err, "citation failed, abandoning the rest of this container");
                    let partial = CitationData::from_citations(container.raw_text.clone(), citations);
                    return Err(WolError::PartialCitations { partial: Box::new(partial), reason: err.to_string() });
                }
            }
        }

        Ok(CitationData::from_citations(container.raw_text.clone(), citations))
    }

    async fn resolve_link(&mut self, link: &LinkTarget, sequence: &mut CiteSequence) -> Result<TooltipCitation> {
        let cite_num = sequence.next_num();
        let tooltip = self.surface.inspect(link).await?;
        let mut nested = Vec::new();

        let cited_text = if self.config.nested_scope.expands(tooltip.kind) {
            let links = tooltip.nested_links()?;
            for (i, nested_link) in links.iter().enumerate() {
                debug!(link = %nested_link.text, "expanding nested citation {} of {}", i + 1, links.len());

                let nested_num = sequence.next_num();
                let text = self.lookup_text(&nested_link.href).await?;

                nested.push(NestedCitation {
                    cite_num: nested_num,
                    link_data: CitationLink {
                        link_text: nested_link.text.clone(),
                        link_href: nested_link.href.clone(),
                        cite_num: nested_num,
                    },
                    cited_text: text,
                });
            }

            let numbers: Vec<u32> = nested.iter().map(|n| n.cite_num).collect();
            tooltip.text_with_markers(&numbers)?
        } else {
            tooltip.text()
        };

        Ok(TooltipCitation {
            cite_num,
            link_data: CitationLink { link_text: link.text.clone(), link_href: link.href.clone(), cite_num },
            cited_text,
            link_text_with_ref: with_marker(&link.text, cite_num),
            kind: tooltip.kind,
            nested,
        })
    }

    /// Fetches a citation directly, without the tooltip, and returns its
    /// text with all anchors removed.
    async fn lookup_text(&self, href: &str) -> Result<String> {
        let html = self.lookup.fetch_fragment(href).await?;
        let stripped = strip_anchors(&html)?;
        Ok(Document::parse_fragment(&stripped).text_content())
    }
}
