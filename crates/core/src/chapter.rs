//! Book chapters.
//!
//! A chapter page has the study article's body layout (sections of `.sb`
//! paragraphs and `.qu` questions) under a four-line header: chapter number
//! (`#p1`), title (`#p2`), opening question (`#p3`) and theme scripture
//! (`#p4`).

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::article::ArticleSection;
use crate::citation::{CitationResolver, CiteSequence, ReferenceLookup, TooltipSurface};
use crate::extract::{
    PageDraft, SectionDraft, extract_sections, resolve_sections, section_link_count, unresolved_sections,
};
use crate::output::record_file_name;
use crate::parse::Document;
use crate::Result;

/// A scraped book chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Printed chapter number, e.g. `"CAPÍTULO 24"`.
    pub capt_num: String,
    pub title: String,
    #[serde(default)]
    pub sub_titles: Vec<String>,
    #[serde(default)]
    pub opening_content: String,
    #[serde(default)]
    pub theme_scripture: String,
    pub sections: Vec<ArticleSection>,
}

impl Chapter {
    pub fn paragraph_count(&self) -> usize {
        self.sections.iter().map(|s| s.paragraphs.len()).sum()
    }

    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    /// Number of footnotes produced for the whole chapter, nested included.
    pub fn citation_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| s.paragraphs.iter())
            .map(|p| p.citation_data.cite_nums().len())
            .sum()
    }

    /// `"<captNum> — <title>.json"`.
    pub fn file_name(&self) -> String {
        record_file_name(&self.capt_num, &self.title)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A chapter captured from the page, paragraphs still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDraft {
    pub capt_num: String,
    pub title: String,
    pub sub_titles: Vec<String>,
    pub opening_content: String,
    pub theme_scripture: String,
    pub sections: Vec<SectionDraft>,
}

/// Captures the chapter skeleton from a parsed page.
///
/// # Errors
///
/// Returns [`crate::WolError::MissingElement`] when any of the header lines
/// `#p1` to `#p4` is missing.
pub fn extract_chapter_draft(doc: &Document) -> Result<ChapterDraft> {
    Ok(ChapterDraft {
        capt_num: doc.text_of("#p1")?,
        title: doc.text_of("#p2")?,
        opening_content: doc.text_of("#p3")?,
        theme_scripture: doc.text_of("#p4")?,
        sub_titles: doc.texts_of(".section > h2")?,
        sections: extract_sections(doc)?,
    })
}

impl ChapterDraft {
    fn finish(self, sections: Vec<ArticleSection>) -> Chapter {
        Chapter {
            capt_num: self.capt_num,
            title: self.title,
            sub_titles: self.sub_titles,
            opening_content: self.opening_content,
            theme_scripture: self.theme_scripture,
            sections,
        }
    }
}

impl PageDraft for ChapterDraft {
    type Output = Chapter;

    fn link_count(&self) -> usize {
        section_link_count(&self.sections)
    }

    fn into_unresolved(mut self) -> Chapter {
        let sections = unresolved_sections(std::mem::take(&mut self.sections));
        self.finish(sections)
    }

    async fn resolve<T, L>(mut self, resolver: &mut CitationResolver<T, L>, sequence: &mut CiteSequence) -> Chapter
    where
        T: TooltipSurface,
        L: ReferenceLookup,
    {
        let sections = resolve_sections(std::mem::take(&mut self.sections), resolver, sequence).await;
        info!(footnotes = sequence.last(), "chapter citations resolved");
        self.finish(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WolError;
    use crate::citation::{LookupTooltip, ResolverConfig};
    use crate::coverage::CoverageKind;

    const CHAPTER: &str = include_str!("../../../tests/fixtures/chapter.html");

    struct Verses;

    impl ReferenceLookup for Verses {
        async fn fetch_fragment(&self, href: &str) -> Result<String> {
            match href.rsplit('/').nth(1) {
                Some("1") => Ok("<p>20 Dios es mayor que nuestro corazón.</p>".to_string()),
                Some("2") => Ok("<p>1 Oh, Jehová, tú me has examinado.</p>".to_string()),
                _ => Err(WolError::Lookup { href: href.to_string(), reason: "offline".into() }),
            }
        }
    }

    fn draft() -> ChapterDraft {
        extract_chapter_draft(&Document::parse(CHAPTER).unwrap()).unwrap()
    }

    #[test]
    fn test_extract_chapter_header() {
        let draft = draft();
        assert_eq!(draft.capt_num, "CAPÍTULO 24");
        assert_eq!(draft.title, "Nada nos puede separar del amor de Dios");
        assert_eq!(draft.opening_content, "¿Cómo sabemos que Jehová nunca deja de amarnos?");
        assert!(draft.theme_scripture.ends_with("(Rom. 8:38, 39)."));
        assert_eq!(draft.sub_titles, vec!["UNA MENTIRA DE SATANÁS"]);
    }

    #[test]
    fn test_extract_chapter_sections() {
        let draft = draft();
        assert_eq!(draft.sections.len(), 2);
        assert_eq!(draft.sections[1].paragraphs.len(), 2);
        assert_eq!(draft.sections[1].questions[0].type_of_p_coverage, CoverageKind::Double);
        assert_eq!(draft.link_count(), 2);
    }

    #[test]
    fn test_extract_chapter_requires_theme_scripture() {
        let doc = Document::parse(r#"<p id="p1">CAPÍTULO 1</p><h1 id="p2">Título</h1><p id="p3">¿Pregunta?</p>"#).unwrap();
        assert!(matches!(extract_chapter_draft(&doc), Err(WolError::MissingElement(s)) if s == "#p4"));
    }

    #[test]
    fn test_unresolved_chapter() {
        let chapter = draft().into_unresolved();
        assert_eq!(chapter.paragraph_count(), 3);
        assert_eq!(chapter.question_count(), 2);
        assert_eq!(chapter.citation_count(), 0);
        assert_eq!(chapter.file_name(), "CAPÍTULO 24 — Nada nos puede separar del amor de Dios.json");

        let json = chapter.to_json().unwrap();
        assert!(json.contains("\"captNum\": \"CAPÍTULO 24\""));
        assert!(json.contains("\"openingContent\""));
        assert!(json.contains("\"themeScripture\""));
    }

    #[tokio::test]
    async fn test_resolve_chapter() {
        let mut resolver = CitationResolver::new(LookupTooltip::new(&Verses), &Verses, ResolverConfig::default());
        let mut sequence = CiteSequence::new();

        let chapter = draft().resolve(&mut resolver, &mut sequence).await;

        let first = &chapter.sections[0].paragraphs[0].citation_data;
        assert_eq!(first.text_with_refs_only, "1 Muchos siervos de Dios se sienten indignos de su amor (1 Juan 3:20 [^1]).");
        assert!(first.text_with_refs_and_foot_notes.ends_with("[^1]: Dios es mayor que nuestro corazón.\n"));
        assert_eq!(chapter.sections[1].paragraphs[1].citation_data.cite_nums(), vec![2]);
        assert_eq!(chapter.citation_count(), 2);
    }
}
