//! DOM-to-record mappers for the elements of a study article page.
//!
//! Mappers are synchronous and only read the parsed page. Paragraphs come
//! out as [`ParagraphDraft`]s whose citations are resolved later, so no DOM
//! handle has to survive an await.

use std::sync::LazyLock;

use regex::Regex;

use crate::article::{Figure, Paragraph, Supplement, TeachBlock};
use crate::citation::{CitationContainer, CitationData};
use crate::coverage::ParagraphReference;
use crate::parse::{Document, Element};
use crate::question::Question;
use crate::Result;
use crate::text::{clean_text, replace_first};

static PARENTHESIZED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]+)\)").unwrap());

/// Footnote markers carry the id of their footnote in `data-fnid`.
const FOOTNOTE_MARKER: &str = ".fn";

/// A paragraph whose citations are not resolved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphDraft {
    pub par_num: String,
    pub text: String,
    pub container: CitationContainer,
}

impl ParagraphDraft {
    pub fn into_paragraph(self, citation_data: CitationData) -> Paragraph {
        Paragraph { par_num: self.par_num, text: self.text, citation_data }
    }

    /// Finishes the paragraph without looking any citation up.
    pub fn unresolved(self) -> Paragraph {
        let data = CitationData::from_citations(self.container.raw_text.clone(), Vec::new());
        self.into_paragraph(data)
    }
}

/// Maps a `.sb` paragraph.
///
/// The number lives in `.parNum sup`; the text drops its `"<num> "` prefix.
pub fn map_paragraph(el: &Element<'_>) -> Result<ParagraphDraft> {
    let printed = el.text_of_or_empty(".parNum sup")?;
    let container = CitationContainer::capture(el)?;

    let text = if printed.is_empty() {
        container.raw_text.clone()
    } else {
        replace_first(&container.raw_text, &format!("{} ", printed), "")
    };
    let par_num = if printed.is_empty() { "1".to_string() } else { printed };

    Ok(ParagraphDraft { par_num, text, container })
}

/// Maps a `.qu` study question. The coverage token is its `strong` child.
pub fn map_question(el: &Element<'_>) -> Result<Question> {
    let token = el.text_of_or_empty("strong")?;
    Ok(Question::parse(&token, &el.clean_text()))
}

/// Maps a figure, reading its caption footnote from `doc`.
pub fn map_figure(doc: &Document, figure: &Element<'_>) -> Result<Figure> {
    let image_alt = figure
        .select_first("img")?
        .and_then(|img| img.attr("alt").map(clean_text))
        .unwrap_or_default();

    let caption = figure.select_first("figcaption")?;
    let figcaption_text = caption.as_ref().map(Element::clean_text).unwrap_or_default();

    let related_paragraphs = PARENTHESIZED
        .captures_iter(&figcaption_text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .last()
        .unwrap_or_default();
    let paragraph_reference_data =
        if related_paragraphs.is_empty() { None } else { ParagraphReference::from_caption(&related_paragraphs) };

    let footnote_description = match &caption {
        Some(caption) => caption_footnote(doc, caption)?,
        None => String::new(),
    };

    Ok(Figure { image_alt, figcaption_text, related_paragraphs, paragraph_reference_data, footnote_description })
}

fn caption_footnote(doc: &Document, caption: &Element<'_>) -> Result<String> {
    let Some(id) = caption
        .select_first(FOOTNOTE_MARKER)?
        .and_then(|marker| marker.attr("data-fnid").map(str::to_string))
    else {
        return Ok(String::new());
    };

    match doc.by_id(&format!("footnote{}", id))? {
        Some(footnote) => footnote.clean_text_excluding(".fn-symbol, strong"),
        None => {
            tracing::warn!(id, "figure footnote not found");
            Ok(String::new())
        }
    }
}

/// Maps a `.boxSupplement` sidebar.
pub fn map_supplement(el: &Element<'_>) -> Result<Supplement> {
    let figures = el
        .select("figure img")?
        .iter()
        .map(|img| img.attr("alt").map(clean_text).unwrap_or_default())
        .collect();

    Ok(Supplement { title: el.text_of_or_empty(".boxTtl")?, figures, contents: el.text_of_or_empty(".boxContent")? })
}

/// Maps the `.blockTeach.rule` review box.
///
/// Pages without one yield an empty block.
pub fn map_teach_block(doc: &Document) -> Result<TeachBlock> {
    let Some(block) = doc.select_first(".blockTeach.rule")? else {
        tracing::warn!("page has no teach block");
        return Ok(TeachBlock::default());
    };

    Ok(TeachBlock {
        title: block.text_of_or_empty(".boxTtl")?,
        list_items: block.select("ul li")?.iter().map(Element::clean_text).collect(),
    })
}

/// Reads the footnote a marker points to, minus its two-character symbol
/// prefix (`"* "`).
///
/// Returns an empty string when the marker or its footnote is missing.
pub fn map_marker_footnote(doc: &Document, marker_selector: &str) -> Result<String> {
    let Some(id) = doc
        .select_first(marker_selector)?
        .and_then(|marker| marker.attr("data-fnid").map(str::to_string))
    else {
        return Ok(String::new());
    };

    Ok(doc
        .by_id(&format!("footnote{}", id))?
        .map(|footnote| footnote.clean_text().chars().skip(2).collect())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::LinkTarget;
    use crate::coverage::CoverageKind;

    fn first<'a>(doc: &'a Document, selector: &str) -> Element<'a> {
        doc.select_first(selector).unwrap().unwrap()
    }

    #[test]
    fn test_map_paragraph() {
        let doc = Document::parse(
            r#"<p class="sb"><span class="parNum"><sup>4</sup></span> Lea <a class="b" href="/es/wol/bc/r4/lp-s/1">Juan 3:16</a>. Dios nos ama.</p>"#,
        )
        .unwrap();
        let draft = map_paragraph(&first(&doc, ".sb")).unwrap();

        assert_eq!(draft.par_num, "4");
        assert_eq!(draft.text, "Lea Juan 3:16. Dios nos ama.");
        assert_eq!(draft.container.raw_text, "4 Lea Juan 3:16. Dios nos ama.");
        assert_eq!(draft.container.links, vec![LinkTarget::new("Juan 3:16", "/es/wol/bc/r4/lp-s/1")]);
    }

    #[test]
    fn test_map_paragraph_without_number() {
        let doc = Document::parse(r#"<p class="sb">Una introducción sin número.</p>"#).unwrap();
        let draft = map_paragraph(&first(&doc, ".sb")).unwrap();

        assert_eq!(draft.par_num, "1");
        assert_eq!(draft.text, "Una introducción sin número.");

        let paragraph = draft.unresolved();
        assert_eq!(paragraph.citation_data.text_with_refs_and_foot_notes, "Una introducción sin número.");
    }

    #[test]
    fn test_map_question() {
        let doc = Document::parse(
            r#"<p class="qu"><strong>5, 6.</strong> a) ¿Qué hizo Abrahán? b) ¿Cómo podemos imitarlo? (Vea también la imagen).</p>"#,
        )
        .unwrap();
        let question = map_question(&first(&doc, ".qu")).unwrap();

        assert_eq!(question.type_of_p_coverage, CoverageKind::Double);
        assert_eq!(question.p_covered, "5, 6");
        assert_eq!(question.logical_q_count, 2);
        assert_eq!(question.references, vec!["Vea también la imagen"]);
        assert!(question.text.starts_with("a) ¿Qué hizo"));
    }

    #[test]
    fn test_map_figure_with_footnote() {
        let doc = Document::parse(
            r#"<div class="pGroup"><div id="f1"><figure>
                <img alt="Un hermano predica" src="x.jpg">
                <figcaption>Predicamos con celo (vea los párrafos 7 a 9).<a class="fn" data-fnid="3">*</a></figcaption>
            </figure></div></div>
            <div id="footnote3"><span class="fn-symbol">*</span> <strong>DESCRIPCIÓN DE LA IMAGEN:</strong> Un hermano habla con un vecino.</div>"#,
        )
        .unwrap();
        let figure = map_figure(&doc, &first(&doc, "figure")).unwrap();

        assert_eq!(figure.image_alt, "Un hermano predica");
        assert_eq!(figure.related_paragraphs, "vea los párrafos 7 a 9");
        let reference = figure.paragraph_reference_data.unwrap();
        assert_eq!(reference.type_of_p_coverage, CoverageKind::Range);
        assert_eq!(reference.p_covered, vec![7, 8, 9]);
        assert_eq!(figure.footnote_description, "Un hermano habla con un vecino.");
    }

    #[test]
    fn test_map_figure_without_caption() {
        let doc = Document::parse(r#"<figure><img alt="Solo imagen"></figure>"#).unwrap();
        let figure = map_figure(&doc, &first(&doc, "figure")).unwrap();

        assert_eq!(figure.image_alt, "Solo imagen");
        assert!(figure.figcaption_text.is_empty());
        assert!(figure.paragraph_reference_data.is_none());
        assert!(figure.footnote_description.is_empty());
    }

    #[test]
    fn test_map_supplement() {
        let doc = Document::parse(
            r#"<div class="boxSupplement">
                <p class="boxTtl">Cómo ayudar a otros</p>
                <figure><img alt="Dos hermanas"></figure>
                <div class="boxContent"><p>Escuche con atención.</p><p>Sea paciente.</p></div>
            </div>"#,
        )
        .unwrap();
        let supplement = map_supplement(&first(&doc, ".boxSupplement")).unwrap();

        assert_eq!(supplement.title, "Cómo ayudar a otros");
        assert_eq!(supplement.figures, vec!["Dos hermanas"]);
        assert_eq!(supplement.contents, "Escuche con atención.Sea paciente.");
    }

    #[test]
    fn test_map_teach_block() {
        let doc = Document::parse(
            r#"<div class="blockTeach rule"><p class="boxTtl">¿QUÉ RESPONDERÍA?</p>
                <ul><li>¿Por qué amamos a Jehová?</li><li>¿Cómo lo demostramos?</li></ul></div>"#,
        )
        .unwrap();
        let block = map_teach_block(&doc).unwrap();

        assert_eq!(block.title, "¿QUÉ RESPONDERÍA?");
        assert_eq!(block.list_items.len(), 2);
    }

    #[test]
    fn test_map_teach_block_missing() {
        let doc = Document::parse("<p>nada</p>").unwrap();
        assert_eq!(map_teach_block(&doc).unwrap(), TeachBlock::default());
    }

    #[test]
    fn test_map_marker_footnote() {
        let doc = Document::parse(
            r#"<p id="p5">AVANCE <a class="fn" data-fnid="1">*</a></p>
            <div id="footnote1">* Veremos cómo mostrar amor.</div>"#,
        )
        .unwrap();
        assert_eq!(map_marker_footnote(&doc, "#p5 .fn").unwrap(), "Veremos cómo mostrar amor.");
        assert_eq!(map_marker_footnote(&doc, "#p6 .fn").unwrap(), "");
    }
}
