//! Midweek meeting talk material.
//!
//! The talk sits in the `#tt8` block of a meeting workbook page: an `h3`
//! title, a few figures and one `p` per main point inside `div[id*="tt"]`
//! blocks. Main points cite scriptures and publications with plain anchors,
//! not only `a.b`, so every linked anchor counts as a citation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::article::Figure;
use crate::citation::{CitationContainer, CitationData, CitationResolver, CiteSequence, ReferenceLookup, TooltipSurface};
use crate::extract::{PageDraft, dump_partial};
use crate::mapper::map_figure;
use crate::output::record_file_name;
use crate::parse::Document;
use crate::{Result, WolError};

const TALK_SELECTOR: &str = "#tt8";
const PERIOD_SELECTOR: &str = ".resultsNavigationSelected:not(.navPublications)";
const FIGURE_SELECTOR: &str = r#"div[id*="f"] figure"#;
const MAIN_POINT_SELECTOR: &str = r#"div[id*="tt"]:not(.du-color--textSubdued) > p"#;
const MAIN_POINT_LINK_SELECTOR: &str = "a[href]";

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+?\W").unwrap());

/// A main point of the talk with its resolved citations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainPoint {
    pub sub_title: String,
    pub citation_data: CitationData,
}

/// A scraped midweek talk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkMaterial {
    /// Week the talk is scheduled for, e.g. `"6-12 de mayo"`.
    #[serde(default)]
    pub period: String,
    pub title: String,
    #[serde(default)]
    pub figures: Vec<Figure>,
    pub main_points: Vec<MainPoint>,
}

impl TalkMaterial {
    /// `"<period> — <title>.json"`.
    pub fn file_name(&self) -> String {
        record_file_name(&self.period, &self.title)
    }

    /// Number of footnotes produced for the whole talk, nested included.
    pub fn citation_count(&self) -> usize {
        self.main_points.iter().map(|p| p.citation_data.cite_nums().len()).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A talk captured from the page, main points still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TalkDraft {
    pub period: String,
    pub title: String,
    pub figures: Vec<Figure>,
    pub main_points: Vec<CitationContainer>,
}

/// Captures the talk from a meeting workbook page.
///
/// # Errors
///
/// Returns [`WolError::MissingElement`] when the page has no `#tt8` block
/// or the block has no `h3` title.
pub fn extract_talk_draft(doc: &Document) -> Result<TalkDraft> {
    let talk = doc
        .select_first(TALK_SELECTOR)?
        .ok_or_else(|| WolError::MissingElement(TALK_SELECTOR.to_string()))?;

    let period = match doc.select_first(PERIOD_SELECTOR)? {
        Some(el) => el.clean_text(),
        None => {
            warn!("page has no selected period");
            String::new()
        }
    };

    let heading = talk
        .select_first("h3")?
        .ok_or_else(|| WolError::MissingElement(format!("{} h3", TALK_SELECTOR)))?
        .clean_text();
    let title = LEADING_NUMBER.replace(&heading, "").trim().to_string();

    let figures = talk
        .select(FIGURE_SELECTOR)?
        .iter()
        .map(|figure| map_figure(doc, figure))
        .collect::<Result<Vec<_>>>()?;

    let main_points = talk
        .select(MAIN_POINT_SELECTOR)?
        .iter()
        .map(|p| CitationContainer::capture_matching(p, MAIN_POINT_LINK_SELECTOR))
        .collect::<Result<Vec<_>>>()?;

    debug!(figures = figures.len(), main_points = main_points.len(), "talk captured");
    Ok(TalkDraft { period, title, figures, main_points })
}

impl TalkDraft {
    fn finish(self, main_points: Vec<MainPoint>) -> TalkMaterial {
        TalkMaterial { period: self.period, title: self.title, figures: self.figures, main_points }
    }
}

impl PageDraft for TalkDraft {
    type Output = TalkMaterial;

    fn link_count(&self) -> usize {
        self.main_points.iter().map(|p| p.links.len()).sum()
    }

    fn into_unresolved(mut self) -> TalkMaterial {
        let main_points = std::mem::take(&mut self.main_points)
            .into_iter()
            .map(|container| MainPoint {
                citation_data: CitationData::from_citations(container.raw_text.clone(), Vec::new()),
                sub_title: container.raw_text,
            })
            .collect();
        self.finish(main_points)
    }

    /// Resolves the main points in page order. A main point whose citations
    /// fail keeps the ones resolved before the failure.
    async fn resolve<T, L>(mut self, resolver: &mut CitationResolver<T, L>, sequence: &mut CiteSequence) -> TalkMaterial
    where
        T: TooltipSurface,
        L: ReferenceLookup,
    {
        let drafts = std::mem::take(&mut self.main_points);
        let count = drafts.len();
        let mut main_points: Vec<MainPoint> = Vec::with_capacity(count);

        for (i, container) in drafts.into_iter().enumerate() {
            debug!("resolving main point {} of {}", i + 1, count);

            let citation_data = match resolver.resolve(&container, sequence).await {
                Ok(data) => data,
                Err(err) => {
                    warn!(main_point = i + 1, error = %err, "main point citations are incomplete");
                    dump_partial("main points", &main_points);
                    let raw_text = container.raw_text.clone();
                    err.into_partial_citations()
                        .unwrap_or_else(|| CitationData::from_citations(raw_text, Vec::new()))
                }
            };
            main_points.push(MainPoint { sub_title: container.raw_text, citation_data });
        }

        info!(footnotes = sequence.last(), "talk citations resolved");
        self.finish(main_points)
    }
}
