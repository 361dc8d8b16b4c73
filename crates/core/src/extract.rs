//! Page extraction.
//!
//! Extraction runs in two phases. A synchronous pass walks the parsed page
//! and captures everything as owned data, leaving citations unresolved; the
//! result is a [`PageDraft`]. [`PageDraft::resolve`] then resolves the
//! citations region by region, in page order, through a
//! [`CitationResolver`].
//!
//! Study articles ([`extract_draft`]) and book chapters
//! ([`crate::chapter::extract_chapter_draft`]) share the section layout
//! captured here.

use tracing::{debug, info, warn};

use crate::article::{ArticleSection, Figure, Paragraph, StudyArticle, Supplement, TeachBlock};
use crate::citation::{CitationData, CitationResolver, CiteSequence, ReferenceLookup, TooltipSurface};
use crate::mapper::{
    ParagraphDraft, map_figure, map_marker_footnote, map_paragraph, map_question, map_supplement, map_teach_block,
};
use crate::parse::{Document, Element};
use crate::Result;
use crate::question::Question;

const SECTION_SELECTOR: &str = ".bodyTxt .section";
const PARAGRAPH_SELECTOR: &str = ".sb";
const QUESTION_SELECTOR: &str = ".qu";
const FIGURE_SELECTOR: &str = r#".pGroup > div[id*="f"] figure"#;
const SUPPLEMENT_SELECTOR: &str = ".boxSupplement";

/// A page captured with its citations still unresolved.
#[allow(async_fn_in_trait)]
pub trait PageDraft {
    /// The record the page turns into.
    type Output;

    /// Number of citation links waiting to be resolved.
    fn link_count(&self) -> usize;

    /// Finishes the record without looking any citation up.
    fn into_unresolved(self) -> Self::Output;

    /// Resolves every citation region in page order, numbering footnotes
    /// from `sequence`.
    async fn resolve<T, L>(self, resolver: &mut CitationResolver<T, L>, sequence: &mut CiteSequence) -> Self::Output
    where
        T: TooltipSurface,
        L: ReferenceLookup;
}

/// A section captured from the page, paragraphs still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDraft {
    pub title: String,
    pub paragraphs: Vec<ParagraphDraft>,
    pub questions: Vec<Question>,
    pub figures: Vec<Figure>,
    pub supplements: Vec<Supplement>,
}

/// An article captured from the page, paragraphs still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    pub article_num: String,
    pub title: String,
    pub sub_titles: Vec<String>,
    pub main_cite: String,
    pub preview: String,
    pub sections: Vec<SectionDraft>,
    pub teach_block: TeachBlock,
}

/// Captures the article skeleton from a parsed page.
///
/// # Errors
///
/// Returns [`crate::WolError::MissingElement`] when the page lacks the
/// article number (`#p1`), title (`#p2`) or theme scripture (`#p3`), which
/// usually means it is not a study article.
pub fn extract_draft(doc: &Document) -> Result<ArticleDraft> {
    let article_num = doc.text_of("#p1")?;
    let title = doc.text_of("#p2")?;
    let main_cite = doc.text_of("#p3")?;
    let preview = map_marker_footnote(doc, "#p5 .fn")?;
    let sub_titles = doc.texts_of(".section > h2")?;
    let sections = extract_sections(doc)?;
    let teach_block = map_teach_block(doc)?;

    Ok(ArticleDraft { article_num, title, sub_titles, main_cite, preview, sections, teach_block })
}

/// Captures every `.bodyTxt .section` of a page.
pub fn extract_sections(doc: &Document) -> Result<Vec<SectionDraft>> {
    let elements = doc.select(SECTION_SELECTOR)?;
    let mut sections = Vec::with_capacity(elements.len());
    for (i, section) in elements.iter().enumerate() {
        debug!("capturing section {} of {}", i + 1, elements.len());
        sections.push(extract_section(doc, section)?);
    }
    Ok(sections)
}

fn extract_section(doc: &Document, section: &Element<'_>) -> Result<SectionDraft> {
    let paragraphs = section
        .select(PARAGRAPH_SELECTOR)?
        .iter()
        .map(map_paragraph)
        .collect::<Result<Vec<_>>>()?;

    let questions = section
        .select(QUESTION_SELECTOR)?
        .iter()
        .map(map_question)
        .collect::<Result<Vec<_>>>()?;

    let figures = section
        .select(FIGURE_SELECTOR)?
        .iter()
        .map(|figure| map_figure(doc, figure))
        .collect::<Result<Vec<_>>>()?;

    let supplements = section
        .select(SUPPLEMENT_SELECTOR)?
        .iter()
        .map(map_supplement)
        .collect::<Result<Vec<_>>>()?;

    debug!(
        paragraphs = paragraphs.len(),
        questions = questions.len(),
        figures = figures.len(),
        supplements = supplements.len(),
        "section captured"
    );

    Ok(SectionDraft { title: section.text_of_or_empty("h2")?, paragraphs, questions, figures, supplements })
}

impl SectionDraft {
    fn finish(self, paragraphs: Vec<Paragraph>) -> ArticleSection {
        ArticleSection {
            title: self.title,
            paragraphs,
            questions: self.questions,
            figures: self.figures,
            supplements: self.supplements,
        }
    }
}

/// Number of citation links across the paragraphs of `sections`.
pub(crate) fn section_link_count(sections: &[SectionDraft]) -> usize {
    sections
        .iter()
        .flat_map(|s| s.paragraphs.iter())
        .map(|p| p.container.links.len())
        .sum()
}

/// Finishes sections without resolving any citation.
pub(crate) fn unresolved_sections(sections: Vec<SectionDraft>) -> Vec<ArticleSection> {
    sections
        .into_iter()
        .map(|mut section| {
            let paragraphs = std::mem::take(&mut section.paragraphs)
                .into_iter()
                .map(ParagraphDraft::unresolved)
                .collect();
            section.finish(paragraphs)
        })
        .collect()
}

/// Resolves every paragraph's citations in page order.
///
/// A paragraph whose citations fail keeps the ones resolved before the
/// failure; the paragraphs resolved so far in its section are dumped at
/// `warn` level and extraction moves on to the next paragraph.
pub(crate) async fn resolve_sections<T, L>(
    sections: Vec<SectionDraft>, resolver: &mut CitationResolver<T, L>, sequence: &mut CiteSequence,
) -> Vec<ArticleSection>
where
    T: TooltipSurface,
    L: ReferenceLookup,
{
    let total = sections.len();
    let mut body = Vec::with_capacity(total);

    for (i, mut section) in sections.into_iter().enumerate() {
        debug!("resolving section {} of {}", i + 1, total);

        let drafts = std::mem::take(&mut section.paragraphs);
        let count = drafts.len();
        let mut paragraphs: Vec<Paragraph> = Vec::with_capacity(count);

        for (j, draft) in drafts.into_iter().enumerate() {
            debug!("resolving paragraph {} of {}", j + 1, count);

            let data = match resolver.resolve(&draft.container, sequence).await {
                Ok(data) => data,
                Err(err) => {
                    warn!(par_num = %draft.par_num, error = %err, "paragraph citations are incomplete");
                    dump_partial("paragraphs", &paragraphs);
                    let raw_text = draft.container.raw_text.clone();
                    err.into_partial_citations()
                        .unwrap_or_else(|| CitationData::from_citations(raw_text, Vec::new()))
                }
            };
            paragraphs.push(draft.into_paragraph(data));
        }

        body.push(section.finish(paragraphs));
    }

    body
}

/// Dumps the records resolved so far at `warn` level.
pub(crate) fn dump_partial<T: serde::Serialize>(what: &str, records: &[T]) {
    match serde_json::to_string_pretty(records) {
        Ok(json) => warn!("{} resolved so far in this section:\n{}", what, json),
        Err(err) => warn!(error = %err, "could not dump the {} resolved so far", what),
    }
}

impl ArticleDraft {
    fn finish(self, body: Vec<ArticleSection>) -> StudyArticle {
        StudyArticle {
            article_num: self.article_num,
            title: self.title,
            sub_titles: self.sub_titles,
            main_cite: self.main_cite,
            preview: self.preview,
            body,
            teach_block: self.teach_block,
        }
    }
}

impl PageDraft for ArticleDraft {
    type Output = StudyArticle;

    fn link_count(&self) -> usize {
        section_link_count(&self.sections)
    }

    fn into_unresolved(mut self) -> StudyArticle {
        let body = unresolved_sections(std::mem::take(&mut self.sections));
        self.finish(body)
    }

    async fn resolve<T, L>(mut self, resolver: &mut CitationResolver<T, L>, sequence: &mut CiteSequence) -> StudyArticle
    where
        T: TooltipSurface,
        L: ReferenceLookup,
    {
        let body = resolve_sections(std::mem::take(&mut self.sections), resolver, sequence).await;
        info!(footnotes = sequence.last(), "citations resolved");
        self.finish(body)
    }
}
