//! Study article records.
//!
//! [`StudyArticle`] is what a scrape produces and what the solver consumes.
//! Every record serializes with camelCase field names, so a scrape written to
//! disk can be read back as solver input.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::citation::CitationData;
use crate::coverage::ParagraphReference;
use crate::output::record_file_name;
use crate::question::Question;

/// A numbered paragraph of the article body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    /// Printed paragraph number, `"1"` when the paragraph shows none.
    pub par_num: String,
    /// Paragraph text without its leading number.
    pub text: String,
    #[serde(alias = "biblicalCitations")]
    pub citation_data: CitationData,
}

/// An illustration placed next to a group of paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Figure {
    #[serde(default)]
    pub image_alt: String,
    #[serde(default)]
    pub figcaption_text: String,
    /// Last parenthesized group of the caption, e.g. `"vea los párrafos 3 y 4"`.
    #[serde(default)]
    pub related_paragraphs: String,
    #[serde(default)]
    pub paragraph_reference_data: Option<ParagraphReference>,
    /// Caption footnote describing the picture.
    #[serde(default)]
    pub footnote_description: String,
}

/// A boxed sidebar with extra material.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplement {
    pub title: String,
    /// Alt texts of the images inside the box.
    #[serde(default)]
    pub figures: Vec<String>,
    pub contents: String,
}

/// A titled section of the article body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSection {
    /// Empty for the untitled introduction.
    #[serde(default)]
    pub title: String,
    pub paragraphs: Vec<Paragraph>,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub figures: Vec<Figure>,
    #[serde(default)]
    pub supplements: Vec<Supplement>,
}

impl ArticleSection {
    /// Footnoted paragraph texts keyed by paragraph number.
    pub fn paragraphs_by_number(&self) -> BTreeMap<u32, &str> {
        self.paragraphs
            .iter()
            .filter_map(|p| {
                p.par_num
                    .parse::<u32>()
                    .ok()
                    .map(|n| (n, p.citation_data.text_with_refs_and_foot_notes.as_str()))
            })
            .collect()
    }
}

/// The review box closing the article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeachBlock {
    pub title: String,
    pub list_items: Vec<String>,
}

/// A scraped study article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyArticle {
    /// Printed article number, e.g. `"ARTÍCULO DE ESTUDIO 12"`.
    pub article_num: String,
    pub title: String,
    #[serde(default)]
    pub sub_titles: Vec<String>,
    /// Theme scripture.
    #[serde(default)]
    pub main_cite: String,
    #[serde(default)]
    pub preview: String,
    pub body: Vec<ArticleSection>,
    #[serde(default)]
    pub teach_block: TeachBlock,
}

impl StudyArticle {
    /// Titles of every supplement box, in article order.
    pub fn supplement_titles(&self) -> Vec<&str> {
        self.body
            .iter()
            .flat_map(|s| s.supplements.iter().map(|sup| sup.title.as_str()))
            .collect()
    }

    /// Raw text of every paragraph, one per line.
    pub fn all_raw_text(&self) -> String {
        self.body
            .iter()
            .flat_map(|s| s.paragraphs.iter().map(|p| p.citation_data.raw_text.as_str()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn paragraph_count(&self) -> usize {
        self.body.iter().map(|s| s.paragraphs.len()).sum()
    }

    pub fn question_count(&self) -> usize {
        self.body.iter().map(|s| s.questions.len()).sum()
    }

    /// Number of footnotes produced for the whole article, nested included.
    pub fn citation_count(&self) -> usize {
        self.body
            .iter()
            .flat_map(|s| s.paragraphs.iter())
            .map(|p| p.citation_data.cite_nums().len())
            .sum()
    }

    /// `"<articleNum> — <title>.json"`.
    pub fn file_name(&self) -> String {
        record_file_name(&self.article_num, &self.title)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::CoverageKind;

    fn paragraph(num: &str, text: &str) -> Paragraph {
        Paragraph {
            par_num: num.to_string(),
            text: text.to_string(),
            citation_data: CitationData::from_citations(format!("{} {}", num, text), Vec::new()),
        }
    }

    fn article() -> StudyArticle {
        StudyArticle {
            article_num: "ARTÍCULO DE ESTUDIO 1".into(),
            title: "Amor".into(),
            body: vec![
                ArticleSection { paragraphs: vec![paragraph("1", "Uno."), paragraph("2", "Dos.")], ..Default::default() },
                ArticleSection {
                    title: "Sección".into(),
                    paragraphs: vec![paragraph("3", "Tres.")],
                    supplements: vec![Supplement { title: "Recuadro".into(), ..Default::default() }],
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_paragraphs_by_number() {
        let article = article();
        let map = article.body[0].paragraphs_by_number();
        assert_eq!(map.get(&1), Some(&"1 Uno."));
        assert_eq!(map.get(&2), Some(&"2 Dos."));
        assert_eq!(map.get(&3), None);
    }

    #[test]
    fn test_article_helpers() {
        let article = article();
        assert_eq!(article.supplement_titles(), vec!["Recuadro"]);
        assert_eq!(article.all_raw_text(), "1 Uno.\n2 Dos.\n3 Tres.");
        assert_eq!(article.paragraph_count(), 3);
        assert_eq!(article.citation_count(), 0);
        assert_eq!(article.file_name(), "ARTÍCULO DE ESTUDIO 1 — Amor.json");
    }

    #[test]
    fn test_serialization_is_camel_case() {
        let json = article().to_json().unwrap();
        assert!(json.contains("\"articleNum\""));
        assert!(json.contains("\"citationData\""));
        assert!(json.contains("\"textWithRefsAndFootNotes2Levels\""));
        assert!(json.contains("\"teachBlock\""));
    }

    #[test]
    fn test_accepts_biblical_citations_alias() {
        let json = r#"{
            "parNum": "4",
            "text": "Texto.",
            "biblicalCitations": {
                "rawText": "4 Texto.",
                "textWithRefsOnly": "4 Texto.",
                "textWithRefsAndFootNotes": "4 Texto.",
                "textWithRefsAndFootNotes2Levels": "4 Texto.",
                "tooltipCitations": []
            }
        }"#;
        let p: Paragraph = serde_json::from_str(json).unwrap();
        assert_eq!(p.citation_data.raw_text, "4 Texto.");
    }

    #[test]
    fn test_figure_roundtrip() {
        let figure = Figure {
            image_alt: "Una familia".into(),
            figcaption_text: "Estudio en familia (vea el párrafo 5).".into(),
            related_paragraphs: "vea el párrafo 5".into(),
            paragraph_reference_data: Some(ParagraphReference {
                type_of_p_coverage: CoverageKind::Single,
                p_covered: vec![5],
            }),
            footnote_description: String::new(),
        };
        let json = serde_json::to_string(&figure).unwrap();
        assert!(json.contains("\"paragraphReferenceData\":{\"typeOfPCoverage\":\"single\",\"pCovered\":[5]}"));
        assert_eq!(serde_json::from_str::<Figure>(&json).unwrap(), figure);
    }
}
