//! Study solver: drafts answers for every study question of an article.
//!
//! For each section the solver maps paragraph numbers to their footnoted
//! text, then asks the chat model, question by question, for a single or a
//! lettered answer. Questions that point at an image or a supplement box get
//! an extra comment on that material. The article's general idea and the
//! review box answers are drafted around that loop.
//!
//! The talk solver is much smaller: a speech goal, then introductions built
//! around that goal.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error, info, warn};

use crate::Result;
use crate::article::{ArticleSection, Figure, StudyArticle};
use crate::llm::{ChatMessage, ChatModel, ResponseFormat, complete_json, generate_json, prompts};
use crate::question::Question;
use crate::talk::TalkMaterial;

/// Answer to a question without lettered parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SingleQuestionAnswer {
    pub cut_to_the_chase: String,
    pub has_multiple_points: bool,
    pub direct_answers: Vec<String>,
    pub has_secondary: bool,
    pub secondary_comments: Vec<String>,
    pub has_main_quote: bool,
    pub main_quote_comment: String,
    pub has_secondary_quotes: bool,
    pub secondary_quote_comments: Vec<String>,
}

/// Answer to one lettered part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuestionResponse {
    pub cut_to_the_chase: String,
    pub has_multiple_points: bool,
    pub direct_answers: Vec<String>,
    pub has_main_quote: bool,
    pub main_quote_comment: String,
}

/// Secondary ideas and quotes across all lettered parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverallAnalysis {
    pub has_secondary: bool,
    pub secondary_comments: Vec<String>,
    pub has_secondary_quotes: bool,
    pub secondary_quote_comments: Vec<String>,
}

/// Answer to a question with lettered parts.
///
/// Parts are keyed `forQuestion1`, `forQuestion2`, ... as the model writes
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiQuestionAnswer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_across_all_the_text: Option<OverallAnalysis>,
    #[serde(flatten)]
    pub parts: BTreeMap<String, QuestionResponse>,
}

impl MultiQuestionAnswer {
    /// Parts in question order, with their 1-based number.
    pub fn ordered_parts(&self) -> Vec<(u32, &QuestionResponse)> {
        let mut parts: Vec<_> = self
            .parts
            .iter()
            .filter_map(|(key, response)| {
                key.strip_prefix("forQuestion")
                    .and_then(|n| n.parse::<u32>().ok())
                    .map(|n| (n, response))
            })
            .collect();
        parts.sort_by_key(|(n, _)| *n);
        parts
    }
}

/// Comments on an image or a supplement box.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Teachings {
    pub teachings: Vec<String>,
}

/// What a question's parenthesized note asks the reader to look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialAssociation {
    pub has_reference_to_image: bool,
    pub has_reference_to_supplement: bool,
    pub has_reference_to_video: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelatedParagraphs {
    #[serde(default, deserialize_with = "paragraph_numbers")]
    related_ones: Vec<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u32),
    Text(String),
}

/// Accepts `["4", "5"]` as well as `[4, 5]`.
fn paragraph_numbers<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<u32>, D::Error> {
    let raw = Vec::<NumberOrText>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|n| match n {
            NumberOrText::Number(n) => Some(n),
            NumberOrText::Text(s) => s.trim().parse().ok(),
        })
        .collect())
}

/// One drafted answer, tagged by what it is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AnswerItem {
    Single { p_covered: String, answer: SingleQuestionAnswer },
    Lettered { p_covered: String, answer: MultiQuestionAnswer },
    Image { p_covered: String, answer: Teachings },
    Supplement { p_covered: String, answer: Teachings },
}

impl AnswerItem {
    pub fn p_covered(&self) -> &str {
        match self {
            AnswerItem::Single { p_covered, .. }
            | AnswerItem::Lettered { p_covered, .. }
            | AnswerItem::Image { p_covered, .. }
            | AnswerItem::Supplement { p_covered, .. } => p_covered,
        }
    }
}

/// Everything the solver drafted for an article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResults {
    pub general_idea: String,
    pub answers: Vec<AnswerItem>,
    /// Review box answers keyed `"1"`, `"2"`, ... in item order.
    #[serde(default)]
    pub teach_block_answers: BTreeMap<String, String>,
}

impl AiResults {
    /// Answer to the review item at `index` (0-based).
    pub fn teach_block_answer(&self, index: usize) -> Option<&str> {
        self.teach_block_answers.get(&(index + 1).to_string()).map(String::as_str)
    }
}

/// Drafts [`AiResults`] for a study article with a chat model.
///
/// Calls are made one at a time.
pub struct StudySolver<M> {
    model: M,
}

impl<M: ChatModel> StudySolver<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Drafts everything for `article`.
    ///
    /// # Errors
    ///
    /// Fails when the general idea or the review box answers cannot be
    /// drafted. Failures on single questions are logged and skipped.
    pub async fn solve(&self, article: &StudyArticle) -> Result<AiResults> {
        info!(title = %article.title, "drafting general idea");
        let general_idea = self.general_idea(article).await?;

        info!(questions = article.question_count(), "answering study questions");
        let answers = self.answer_questions(article).await;

        info!(items = article.teach_block.list_items.len(), "answering review box");
        let teach_block_answers = self.teach_block_answers(article).await?;

        Ok(AiResults { general_idea, answers, teach_block_answers })
    }

    pub async fn general_idea(&self, article: &StudyArticle) -> Result<String> {
        let messages = [ChatMessage::system(prompts::ROLE_SYSTEM), ChatMessage::user(prompts::general_idea(article))];
        self.model.complete(&messages, ResponseFormat::Text).await
    }

    /// Answers every question of every section, in article order.
    pub async fn answer_questions(&self, article: &StudyArticle) -> Vec<AnswerItem> {
        let mut answers = Vec::new();

        for (i, section) in article.body.iter().enumerate() {
            debug!("answering section {} of {}", i + 1, article.body.len());
            let by_number = section.paragraphs_by_number();

            for question in &section.questions {
                if let Err(err) = self.answer_question(section, &by_number, question, &mut answers).await {
                    error!(p_covered = %question.p_covered, error = %err, "question could not be answered");
                    match serde_json::to_string_pretty(&answers) {
                        Ok(json) => warn!("answers drafted so far:\n{}", json),
                        Err(err) => warn!(error = %err, "could not dump the answers drafted so far"),
                    }
                }
            }
        }

        answers
    }

    async fn answer_question(
        &self, section: &ArticleSection, by_number: &BTreeMap<u32, &str>, question: &Question,
        answers: &mut Vec<AnswerItem>,
    ) -> Result<()> {
        debug!(p_covered = %question.p_covered, lettered = question.is_lettered(), "answering question");
        let text = texts_for(by_number, &question.paragraphs()).join("\n");
        let p_covered = question.p_covered.clone();

        if question.is_lettered() {
            let answer = self.ask(prompts::LETTERED_ANSWER_SHAPE, prompts::lettered_questions(question, &text)).await?;
            answers.push(AnswerItem::Lettered { p_covered: p_covered.clone(), answer });
        } else {
            let answer = self.ask(prompts::SINGLE_ANSWER_SHAPE, prompts::single_question(question, &text)).await?;
            answers.push(AnswerItem::Single { p_covered: p_covered.clone(), answer });
        }

        if section.supplements.len() > 1 {
            error!(
                p_covered = %question.p_covered,
                supplements = section.supplements.len(),
                "sections with more than one supplement are not supported"
            );
            return Ok(());
        }
        if question.references.is_empty() {
            return Ok(());
        }

        let association: MaterialAssociation =
            generate_json(&self.model, &prompts::material_reference(&question.text)).await?;
        debug!(?association, "material association");

        if association.has_reference_to_image {
            let Some(figure) = figure_for(&section.figures, question) else {
                warn!(p_covered = %question.p_covered, "question refers to an image but the section has none");
                return Ok(());
            };
            let related = self.texts_for_figure(figure, by_number).await?;
            let answer = self.comment(prompts::image_comment(question, &related.join("\n"), figure)).await?;
            answers.push(AnswerItem::Image { p_covered, answer });
        } else if association.has_reference_to_supplement {
            let Some(supplement) = section.supplements.first() else {
                warn!(p_covered = %question.p_covered, "question refers to a supplement but the section has none");
                return Ok(());
            };
            let answer = self.comment(prompts::supplement_comment(question, &text, supplement)).await?;
            answers.push(AnswerItem::Supplement { p_covered, answer });
        } else if association.has_reference_to_video {
            info!(p_covered = %question.p_covered, "video references are not commented");
        }

        Ok(())
    }

    /// Paragraphs a figure relates to, as chosen by the model from its
    /// caption; every paragraph of the section when there is no caption.
    async fn texts_for_figure(&self, figure: &Figure, by_number: &BTreeMap<u32, &str>) -> Result<Vec<String>> {
        if figure.figcaption_text.is_empty() {
            return Ok(by_number.values().map(|t| t.to_string()).collect());
        }

        let related: RelatedParagraphs =
            generate_json(&self.model, &prompts::relevant_paragraphs(&figure.figcaption_text)).await?;
        debug!(related = ?related.related_ones, "paragraphs related to figure");
        Ok(texts_for(by_number, &related.related_ones))
    }

    /// Answers the review box from the raw text of the whole article.
    pub async fn teach_block_answers(&self, article: &StudyArticle) -> Result<BTreeMap<String, String>> {
        let items = &article.teach_block.list_items;
        if items.is_empty() {
            return Ok(BTreeMap::new());
        }

        let messages = [
            ChatMessage::system(prompts::ROLE_SYSTEM),
            ChatMessage::system(prompts::JSON_ONLY_SYSTEM),
            ChatMessage::system(prompts::OWN_WORDS_SYSTEM),
            ChatMessage::user(prompts::teach_block_questions(items, &article.all_raw_text())),
        ];
        complete_json(&self.model, &messages).await
    }

    async fn ask<T: serde::de::DeserializeOwned>(&self, shape: &str, prompt: String) -> Result<T> {
        let messages = [
            ChatMessage::system(prompts::ROLE_SYSTEM),
            ChatMessage::system(prompts::JSON_ONLY_SYSTEM),
            ChatMessage::system(shape),
            ChatMessage::system(prompts::OWN_WORDS_SYSTEM),
            ChatMessage::user(prompt),
        ];
        complete_json(&self.model, &messages).await
    }

    async fn comment(&self, prompt: String) -> Result<Teachings> {
        let messages = [
            ChatMessage::system(prompts::ROLE_SYSTEM),
            ChatMessage::system(prompts::JSON_ONLY_SYSTEM),
            ChatMessage::system(prompts::OWN_WORDS_SYSTEM),
            ChatMessage::user(prompt),
        ];
        complete_json(&self.model, &messages).await
    }
}

/// Candidate openings for a talk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechIntros {
    pub intros: Vec<String>,
}

/// Everything the solver drafted for a talk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkResults {
    pub speech_goal: String,
    pub speech_intros: SpeechIntros,
}

/// Drafts [`TalkResults`] for a midweek talk with a chat model.
pub struct TalkSolver<M> {
    model: M,
}

impl<M: ChatModel> TalkSolver<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Drafts the goal, then the introductions that serve it.
    ///
    /// # Errors
    ///
    /// Fails when either call fails or the introductions are not valid JSON.
    pub async fn solve(&self, talk: &TalkMaterial) -> Result<TalkResults> {
        let material = prompts::talk_material(talk);

        info!(title = %talk.title, "drafting speech goal");
        let goal_messages = [
            ChatMessage::system(prompts::ROLE_SYSTEM),
            ChatMessage::user(material.clone()),
            ChatMessage::user(prompts::SPEECH_GOAL),
        ];
        let speech_goal = self.model.complete(&goal_messages, ResponseFormat::Text).await?;

        info!("drafting speech introductions");
        let intro_messages = [
            ChatMessage::system(prompts::ROLE_SYSTEM),
            ChatMessage::system(prompts::JSON_ONLY_SYSTEM),
            ChatMessage::user(material),
            ChatMessage::user(prompts::speech_intros(&speech_goal)),
        ];
        let speech_intros: SpeechIntros = complete_json(&self.model, &intro_messages).await?;
        debug!(intros = speech_intros.intros.len(), "speech introductions drafted");

        Ok(TalkResults { speech_goal, speech_intros })
    }
}

fn texts_for(by_number: &BTreeMap<u32, &str>, numbers: &[u32]) -> Vec<String> {
    numbers
        .iter()
        .filter_map(|n| match by_number.get(n) {
            Some(text) => Some(text.to_string()),
            None => {
                debug!(paragraph = n, "paragraph not found in section");
                None
            }
        })
        .collect()
}

/// The figure a question refers to: the first one whose caption paragraphs
/// overlap the question's, else the first figure.
fn figure_for<'a>(figures: &'a [Figure], question: &Question) -> Option<&'a Figure> {
    let covered = question.paragraphs();
    figures
        .iter()
        .find(|f| f.paragraph_reference_data.as_ref().is_some_and(|r| r.overlaps(&covered)))
        .or_else(|| figures.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WolError;
    use crate::article::{Paragraph, Supplement, TeachBlock};
    use crate::citation::CitationData;
    use crate::coverage::{CoverageKind, ParagraphReference};
    use std::cell::RefCell;

    /// Answers by looking at what is being asked.
    #[derive(Default)]
    struct Scripted {
        fail_on: Option<&'static str>,
        prompts: RefCell<Vec<String>>,
    }

    impl ChatModel for Scripted {
        async fn complete(&self, messages: &[ChatMessage], format: ResponseFormat) -> Result<String> {
            let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            self.prompts.borrow_mut().push(prompt.clone());

            if let Some(needle) = self.fail_on
                && prompt.contains(needle)
            {
                return Err(WolError::Chat("rate limited".into()));
            }

            let lettered = messages.iter().any(|m| m.content == prompts::LETTERED_ANSWER_SHAPE);
            let answer = if format == ResponseFormat::Text {
                "Debemos seguir amándonos."
            } else if prompt.contains("hasReferenceToImage") {
                if prompt.contains("imagen") && !prompt.contains("recuadro)") {
                    r#"{"hasReferenceToImage": true, "hasReferenceToSupplement": false, "hasReferenceToVideo": false}"#
                } else {
                    r#"{"hasReferenceToImage": false, "hasReferenceToSupplement": true, "hasReferenceToVideo": false}"#
                }
            } else if prompt.contains("\"intros\"") {
                r#"{"intros": ["¿Qué es lo más importante en su vida?"]}"#
            } else if prompt.contains("relatedOnes") {
                r#"{"relatedOnes": ["4", 5]}"#
            } else if prompt.contains("teachings") {
                r#"{"teachings": ["Ayudar a los mayores muestra amor."]}"#
            } else if prompt.contains("claves son los números") {
                r#"{"1": "Porque Jesús lo mandó.", "2": "Perdonando."}"#
            } else if lettered {
                r#"{"forQuestion2": {"cutToTheChase": "Ayudándolos."}, "forQuestion1": {"cutToTheChase": "Perdonando."},
                    "analysisAcrossAllTheText": {"hasSecondary": false, "secondaryComments": []}}"#
            } else {
                r#"{"cutToTheChase": "El amor cubre pecados.", "hasMultiplePoints": false, "directAnswers": ["Cubre pecados."]}"#
            };
            Ok(answer.to_string())
        }
    }

    fn paragraph(num: &str, text: &str) -> Paragraph {
        let raw = format!("{} {}", num, text);
        Paragraph {
            par_num: num.into(),
            text: text.into(),
            citation_data: CitationData::from_citations(raw, Vec::new()),
        }
    }

    fn article() -> StudyArticle {
        StudyArticle {
            article_num: "ARTÍCULO DE ESTUDIO 12".into(),
            title: "Sigamos mostrando amor".into(),
            body: vec![ArticleSection {
                title: "POR QUÉ".into(),
                paragraphs: vec![
                    paragraph("3", "El amor cubre pecados."),
                    paragraph("4", "Perdonamos."),
                    paragraph("5", "Ayudamos a los mayores."),
                ],
                questions: vec![
                    Question::parse("3.", "3. ¿Qué efecto tiene el amor?"),
                    Question::parse(
                        "4-5.",
                        "4-5. a) ¿Cómo imitamos a Jehová? b) ¿Cómo ayudamos a los mayores? (Vea también la imagen).",
                    ),
                ],
                figures: vec![
                    Figure { image_alt: "Otra".into(), ..Default::default() },
                    Figure {
                        image_alt: "Una hermana ayuda".into(),
                        figcaption_text: "Ayudamos (vea los párrafos 4 y 5).".into(),
                        related_paragraphs: "vea los párrafos 4 y 5".into(),
                        paragraph_reference_data: Some(ParagraphReference {
                            type_of_p_coverage: CoverageKind::Double,
                            p_covered: vec![4, 5],
                        }),
                        footnote_description: String::new(),
                    },
                ],
                supplements: Vec::new(),
            }],
            teach_block: TeachBlock {
                title: "¿QUÉ RESPONDERÍA?".into(),
                list_items: vec!["¿Por qué amarnos?".into(), "¿Cómo imitamos a Jehová?".into()],
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_solve_article() {
        let model = Scripted::default();
        let results = StudySolver::new(&model).solve(&article()).await.unwrap();

        assert_eq!(results.general_idea, "Debemos seguir amándonos.");
        assert_eq!(results.answers.len(), 3);

        match &results.answers[0] {
            AnswerItem::Single { p_covered, answer } => {
                assert_eq!(p_covered, "3");
                assert_eq!(answer.cut_to_the_chase, "El amor cubre pecados.");
            }
            other => panic!("unexpected answer: {:?}", other),
        }
        match &results.answers[1] {
            AnswerItem::Lettered { p_covered, answer } => {
                assert_eq!(p_covered, "4-5");
                let parts = answer.ordered_parts();
                assert_eq!(parts[0].0, 1);
                assert_eq!(parts[0].1.cut_to_the_chase, "Perdonando.");
                assert!(answer.analysis_across_all_the_text.is_some());
            }
            other => panic!("unexpected answer: {:?}", other),
        }
        assert!(matches!(&results.answers[2], AnswerItem::Image { answer, .. } if answer.teachings.len() == 1));

        assert_eq!(results.teach_block_answer(0), Some("Porque Jesús lo mandó."));
        assert_eq!(results.teach_block_answer(2), None);
    }

    #[tokio::test]
    async fn test_image_comment_uses_overlapping_figure_and_related_paragraphs() {
        let model = Scripted::default();
        StudySolver::new(&model).solve(&article()).await.unwrap();

        let prompts = model.prompts.borrow();
        let image_prompt = prompts.iter().find(|p| p.contains("Comenta la imagen")).unwrap();
        assert!(image_prompt.contains("Texto alternativo: Una hermana ayuda"));
        assert!(image_prompt.contains("###\n4 Perdonamos.\n5 Ayudamos a los mayores.\n###"));
    }

    #[tokio::test]
    async fn test_failed_question_does_not_stop_the_rest() {
        let model = Scripted { fail_on: Some("¿Qué efecto tiene el amor?"), ..Default::default() };
        let results = StudySolver::new(&model).solve(&article()).await.unwrap();

        assert_eq!(results.answers.len(), 2);
        assert_eq!(results.answers[0].p_covered(), "4-5");
    }

    #[tokio::test]
    async fn test_many_supplements_skip_material_comments() {
        let mut article = article();
        article.body[0].supplements = vec![Supplement::default(), Supplement::default()];

        let model = Scripted::default();
        let results = StudySolver::new(&model).solve(&article).await.unwrap();

        assert_eq!(results.answers.len(), 2);
        assert!(!model.prompts.borrow().iter().any(|p| p.contains("hasReferenceToImage")));
    }

    #[tokio::test]
    async fn test_supplement_comment() {
        let mut article = article();
        article.body[0].questions[1] =
            Question::parse("4-5.", "4-5. a) ¿Cómo imitamos a Jehová? b) ¿Qué aprendemos? (Vea el recuadro).");
        article.body[0].supplements = vec![Supplement {
            title: "CÓMO MOSTRAR AMOR".into(),
            figures: Vec::new(),
            contents: "Escuche.".into(),
        }];

        let model = Scripted::default();
        let results = StudySolver::new(&model).solve(&article).await.unwrap();

        assert!(matches!(results.answers.last(), Some(AnswerItem::Supplement { .. })));
    }

    #[tokio::test]
    async fn test_empty_teach_block_is_not_asked() {
        let mut article = article();
        article.teach_block = TeachBlock::default();

        let model = Scripted::default();
        let results = StudySolver::new(&model).solve(&article).await.unwrap();

        assert!(results.teach_block_answers.is_empty());
        assert!(!model.prompts.borrow().iter().any(|p| p.contains("claves son los números")));
    }

    #[test]
    fn test_figure_for_falls_back_to_first() {
        let question = Question::parse("9.", "9. ¿Qué?");
        let figures = article().body[0].figures.clone();
        assert_eq!(figure_for(&figures, &question).unwrap().image_alt, "Otra");
        assert!(figure_for(&[], &question).is_none());
    }

    #[test]
    fn test_ai_results_json_shape() {
        let results = AiResults {
            general_idea: "Idea".into(),
            answers: vec![AnswerItem::Image { p_covered: "4, 5".into(), answer: Teachings::default() }],
            teach_block_answers: BTreeMap::from([("1".to_string(), "Sí".to_string())]),
        };
        let value = serde_json::to_value(&results).unwrap();

        assert_eq!(value["generalIdea"], "Idea");
        assert_eq!(value["answers"][0]["kind"], "image");
        assert_eq!(value["answers"][0]["pCovered"], "4, 5");
        assert_eq!(value["teachBlockAnswers"]["1"], "Sí");
        assert_eq!(serde_json::from_value::<AiResults>(value).unwrap(), results);
    }

    #[test]
    fn test_multi_answer_parts_are_numeric_order() {
        let answer: MultiQuestionAnswer = serde_json::from_str(
            r#"{"forQuestion10": {"cutToTheChase": "j"}, "forQuestion2": {"cutToTheChase": "b"}}"#,
        )
        .unwrap();
        let order: Vec<u32> = answer.ordered_parts().iter().map(|(n, _)| *n).collect();
        assert_eq!(order, vec![2, 10]);
        assert!(answer.analysis_across_all_the_text.is_none());
    }

    fn talk() -> TalkMaterial {
        let text = "Busquen primero el Reino (Mat. 6:33).".to_string();
        TalkMaterial {
            period: "6-12 de mayo".into(),
            title: "Busquemos el Reino".into(),
            figures: Vec::new(),
            main_points: vec![crate::talk::MainPoint {
                sub_title: text.clone(),
                citation_data: CitationData::from_citations(text, Vec::new()),
            }],
        }
    }

    #[tokio::test]
    async fn test_solve_talk() {
        let model = Scripted::default();
        let results = TalkSolver::new(&model).solve(&talk()).await.unwrap();

        assert_eq!(results.speech_goal, "Debemos seguir amándonos.");
        assert_eq!(results.speech_intros.intros, vec!["¿Qué es lo más importante en su vida?"]);

        let prompts = model.prompts.borrow();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("`Debemos seguir amándonos.`"));
    }

    #[tokio::test]
    async fn test_talk_goal_failure_skips_intros() {
        let model = Scripted { fail_on: Some("qué busca enseñar"), ..Default::default() };
        let err = TalkSolver::new(&model).solve(&talk()).await.unwrap_err();

        assert!(matches!(err, WolError::Chat(_)));
        assert_eq!(model.prompts.borrow().len(), 1);
    }

    #[test]
    fn test_talk_results_json_shape() {
        let results = TalkResults {
            speech_goal: "Confiar en Jehová.".into(),
            speech_intros: SpeechIntros { intros: vec!["¿Le preocupa el mañana?".into()] },
        };
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["speechGoal"], "Confiar en Jehová.");
        assert_eq!(json["speechIntros"]["intros"][0], "¿Le preocupa el mañana?");
    }
}
