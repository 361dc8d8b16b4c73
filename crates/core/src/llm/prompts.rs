//! Prompt texts and builders for the study and talk solvers.
//!
//! System prompts are constants; user prompts are built from the scraped
//! records. Paragraph material is always fenced between `###` lines, talk
//! material between `***` lines.

use crate::article::{Figure, StudyArticle, Supplement};
use crate::question::Question;
use crate::talk::TalkMaterial;

/// Role of the assistant for every solver call.
pub const ROLE_SYSTEM: &str = "Eres un asistente que conoce a fondo las creencias de los testigos de Jehová \
     tal como se explican en las publicaciones de la Watch Tower Bible and Tract Society of Pennsylvania. \
     Usa ese conocimiento para cumplir cada tarea que se te pida.";

/// Forces JSON-only answers.
pub const JSON_ONLY_SYSTEM: &str = "Responde única y exclusivamente con un objeto JSON válido.";

/// Asks for plain, personal wording.
pub const OWN_WORDS_SYSTEM: &str = "Escribe todas tus respuestas con tus propias palabras, explicando lo que \
     entiendes en lugar de copiar el texto. Tus lectores son testigos de Jehová de Costa Rica con poca \
     escolaridad, así que usa frases cortas y sencillas.";

/// JSON shape for a question with a single answer.
pub const SINGLE_ANSWER_SHAPE: &str = r#"Responde con esta estructura JSON:
{
  "cutToTheChase": "...",
  "hasMultiplePoints": false,
  "directAnswers": ["..."],
  "hasSecondary": false,
  "secondaryComments": [],
  "hasMainQuote": false,
  "mainQuoteComment": "",
  "hasSecondaryQuotes": false,
  "secondaryQuoteComments": []
}"#;

/// JSON shape for lettered questions.
pub const LETTERED_ANSWER_SHAPE: &str = r#"Responde con esta estructura JSON:
{
  "forQuestion1": {
    "cutToTheChase": "...",
    "hasMultiplePoints": false,
    "directAnswers": ["..."],
    "hasMainQuote": false,
    "mainQuoteComment": ""
  },
  "forQuestion2": { "...": "mismo formato que forQuestion1" },
  "analysisAcrossAllTheText": {
    "hasSecondary": false,
    "secondaryComments": [],
    "hasSecondaryQuotes": false,
    "secondaryQuoteComments": []
  }
}
Escribe un objeto forQuestionN por cada pregunta. analysisAcrossAllTheText es obligatorio."#;

const ANSWER_GUIDE: &str = "\
- cutToTheChase: una respuesta completa, sencilla y directa.
- hasMultiplePoints: true si la respuesta reúne varias ideas.
- directAnswers: una respuesta corta por idea, o una sola si no hay varias.
- hasMainQuote / mainQuoteComment: si hay un texto bíblico principal (suele indicarse con \"lea\"), \
explica cómo se relaciona con la pregunta y cómo aplicarlo.";

const ANALYSIS_GUIDE: &str = "\
- hasSecondary / secondaryComments: ideas secundarias importantes que las respuestas no cubrieron, \
un comentario por idea.
- hasSecondaryQuotes / secondaryQuoteComments: textos bíblicos secundarios que apoyan la idea principal, \
un comentario por texto.";

fn fenced(text: &str) -> String {
    format!("###\n{}\n###", text)
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Overall idea of the article, from its outline.
pub fn general_idea(article: &StudyArticle) -> String {
    let mut prompt = String::from("Según la estructura y el avance del artículo, ¿cuál es su idea general?\n___\n");
    prompt.push_str(&format!("# {}\n", article.title));
    prompt.push_str(&format!("Texto temático: {}\n", article.main_cite));
    prompt.push_str(&format!("Avance del artículo: {}\n", article.preview));
    for sub_title in &article.sub_titles {
        prompt.push_str(&format!("## {}\n", sub_title));
    }

    let supplements = article.supplement_titles();
    if !supplements.is_empty() {
        prompt.push_str("Títulos de los recuadros:\n");
        for title in supplements {
            prompt.push_str(&format!("### {}\n", title));
        }
    }
    prompt
}

/// A question answered in one block.
pub fn single_question(question: &Question, text: &str) -> String {
    format!(
        "Usando solo la información entre ### responde la pregunta: '{}'.\n\
         Completa cada campo del JSON así:\n{}\n{}\n{}",
        question.text,
        ANSWER_GUIDE,
        ANALYSIS_GUIDE,
        fenced(text)
    )
}

/// A question with lettered sub-questions.
pub fn lettered_questions(question: &Question, text: &str) -> String {
    format!(
        "Usando solo la información entre ### responde estas preguntas:\n{}\n\
         Para cada una escribe un objeto forQuestionN con estos campos:\n{}\n\
         En analysisAcrossAllTheText trata toda la información como una sola unidad:\n{}\n{}",
        numbered(&question.lettered_question_texts),
        ANSWER_GUIDE,
        ANALYSIS_GUIDE,
        fenced(text)
    )
}

/// Classifies what a question asks the reader to look at.
pub fn material_reference(question_text: &str) -> String {
    format!(
        "El texto entre ### contiene preguntas y menciona algo que hay que ver, casi siempre entre paréntesis.\n\
         Clasifícalo así:\n\
         - hasReferenceToImage: pide ver una imagen.\n\
         - hasReferenceToSupplement: pide ver un recuadro.\n\
         - hasReferenceToVideo: pide ver un video.\n\
         Ignora cualquier otra mención.\n\
         Responde con: {{\"hasReferenceToImage\": boolean, \"hasReferenceToSupplement\": boolean, \"hasReferenceToVideo\": boolean}}\n\n{}",
        fenced(question_text)
    )
}

/// Asks which paragraphs a figure caption points to.
pub fn relevant_paragraphs(caption: &str) -> String {
    format!(
        "Este texto: '{}' menciona unos párrafos relacionados.\n\
         Escribe un objeto JSON con esos párrafos, por ejemplo:\n\
         - {{\"relatedOnes\": [\"10\"]}} para un solo párrafo\n\
         - {{\"relatedOnes\": [\"15\", \"16\"]}} para dos párrafos\n\
         - {{\"relatedOnes\": [\"7\", \"8\", \"9\"]}} para un rango de párrafos",
        caption
    )
}

const TEACHINGS_SHAPE: &str = r#"Responde con esta estructura JSON:
{
  "teachings": ["comentario corto sobre lo que enseña y cómo aplicarlo"]
}"#;

/// Comment on the figure a question refers to.
pub fn image_comment(question: &Question, text: &str, figure: &Figure) -> String {
    let mut known = String::new();
    if !figure.image_alt.is_empty() {
        known.push_str(&format!("Texto alternativo: {}\n", figure.image_alt));
    }
    if !figure.figcaption_text.is_empty() {
        known.push_str(&format!("Leyenda: {}\n", figure.figcaption_text));
    }
    if !figure.footnote_description.is_empty() {
        known.push_str(&format!("Descripción de la imagen: {}\n", figure.footnote_description));
    }

    format!(
        "Se está estudiando la información entre ### con la(s) pregunta(s): '{}'.\n\
         Comenta la imagen a la que se hace referencia.\n{}\n\
         Esto es lo que se sabe de la imagen:\n{}\n{}",
        question.text,
        TEACHINGS_SHAPE,
        known,
        fenced(text)
    )
}

/// Comment on the supplement box a question refers to.
pub fn supplement_comment(question: &Question, text: &str, supplement: &Supplement) -> String {
    format!(
        "Se está estudiando la información entre ### con la(s) pregunta(s): '{}'.\n\
         Comenta el recuadro entre @@@ al que se hace referencia.\n{}\n\
         @@@\n# {}\n{}\n@@@\n{}",
        question.text,
        TEACHINGS_SHAPE,
        supplement.title,
        supplement.contents,
        fenced(text)
    )
}

/// Review questions answered from the whole article.
pub fn teach_block_questions(items: &[String], article_text: &str) -> String {
    format!(
        "Usando solo la información entre ### responde de forma clara, sencilla y directa:\n{}\n\n\
         Responde con un objeto JSON cuyas claves son los números de pregunta:\n\
         {{\"1\": \"respuesta 1\", \"2\": \"respuesta 2\"}}\n\n{}",
        numbered(items),
        fenced(article_text)
    )
}

/// The talk outline, its figures and the footnotes of its main points.
pub fn talk_material(material: &TalkMaterial) -> String {
    let mut prompt = String::from(
        "Este es el material para un discurso, delimitado por ***. El # es el título del discurso y los ## \
         son los puntos clave, con los textos que deben leerse y las referencias a otras publicaciones \
         que sirven de base para cada punto.\n***\n",
    );
    prompt.push_str(&format!("# {}\n", material.title));
    for point in &material.main_points {
        prompt.push_str(&format!("## {}\n", point.citation_data.text_with_refs_only));
    }

    if !material.figures.is_empty() {
        prompt.push_str("\nImágenes que acompañan el discurso:\n");
        for figure in &material.figures {
            if !figure.image_alt.is_empty() {
                prompt.push_str(&format!("- Texto alternativo: {}\n", figure.image_alt));
            }
            if !figure.figcaption_text.is_empty() {
                prompt.push_str(&format!("  Leyenda: {}\n", figure.figcaption_text));
            }
            if !figure.footnote_description.is_empty() {
                prompt.push_str(&format!("  Descripción de la imagen: {}\n", figure.footnote_description));
            }
        }
    }

    let notes: Vec<&str> = material
        .main_points
        .iter()
        .filter_map(|p| p.citation_data.text_with_refs_and_foot_notes2_levels.split_once("\n---\n"))
        .map(|(_, notes)| notes.trim())
        .filter(|notes| !notes.is_empty())
        .collect();
    if !notes.is_empty() {
        prompt.push_str("---\n");
        prompt.push_str(&notes.join("\n"));
        prompt.push('\n');
    }

    prompt.push_str("***");
    prompt
}

/// What the talk sets out to teach.
pub const SPEECH_GOAL: &str = "Basado en el material del discurso, escribe qué busca enseñar el discurso. \
     Sé conciso sin dejar fuera ningún punto clave.";

/// Ten ways to open a talk with the given goal.
pub fn speech_intros(goal: &str) -> String {
    format!(
        "Basado en el material del discurso, escribe 10 posibles introducciones.\n\
         Cada introducción debe captar la atención, decir con claridad de qué tratará el discurso y mostrar \
         por qué el tema interesa a los oyentes. Para captar la atención usa una pregunta, una afirmación, \
         un refrán relacionado con el tema, una noticia o una historia breve.\n\
         El objetivo del discurso es: `{}`\n\n\
         Responde con esta estructura JSON:\n\
         {{\"intros\": [\"introducción 1\", \"introducción 2\"]}}",
        goal
    )
}
