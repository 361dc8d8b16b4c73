use crate::article::StudyArticle;
use crate::solve::{AiResults, AnswerItem, MultiQuestionAnswer, SingleQuestionAnswer};

const LEGEND: &str = "Formato:
🎯💥 La respuesta al grano para la pregunta.
🎯 Puntos que responden la pregunta.
2️⃣ Comentario de una idea secundaria del párrafo.
✍️ Comentario del texto principal.
✍️2️⃣ Comentario de un texto secundario.";

/// Configuration for Markdown rendering
#[derive(Debug, Clone)]
pub struct MarkdownConfig {
    /// Explain the emoji markers after the general idea
    pub include_legend: bool,
    /// Append the review box with its answers
    pub include_teach_block: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self { include_legend: true, include_teach_block: true }
    }
}

/// Render a scraped article and its drafted answers as Markdown
pub fn convert_to_markdown(article: &StudyArticle, results: &AiResults, config: &MarkdownConfig) -> String {
    let mut output = format!("{}: *{}*\n\n", article.article_num, article.title);
    output.push_str(&format!("*Idea general del artículo*:\n{}\n\n", results.general_idea));

    if config.include_legend {
        output.push_str(LEGEND);
        output.push_str("\n\n");
    }

    let answers: Vec<String> = results.answers.iter().map(render_item).collect();
    output.push_str(&answers.join("\n"));

    let block = &article.teach_block;
    if config.include_teach_block && !block.list_items.is_empty() {
        output.push_str(&format!("\n\n*{}*\n\n", block.title));
        let items: Vec<String> = block
            .list_items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let answer = results.teach_block_answer(i).unwrap_or("(sin respuesta)");
                format!("{}\n\t🎯💥 {}", item, answer)
            })
            .collect();
        output.push_str(&items.join("\n\n"));
    }

    output
}

fn render_item(item: &AnswerItem) -> String {
    let mut out = format!("⟾⟾ {} ", item.p_covered());
    match item {
        AnswerItem::Image { answer, .. } => {
            out.push_str("sobre la imagen ⟽⟽\n");
            out.push_str(&bullets("🎯", &answer.teachings));
            out.push('\n');
        }
        AnswerItem::Supplement { answer, .. } => {
            out.push_str("sobre el recuadro ⟽⟽\n");
            out.push_str(&bullets("🎯", &answer.teachings));
            out.push('\n');
        }
        AnswerItem::Single { answer, .. } => {
            out.push_str("⟽⟽\n");
            render_single(&mut out, answer);
        }
        AnswerItem::Lettered { answer, .. } => {
            out.push_str("⟽⟽\n");
            render_lettered(&mut out, answer);
        }
    }
    out
}

fn render_single(out: &mut String, answer: &SingleQuestionAnswer) {
    out.push_str(&format!("🎯💥 {}\n\n", answer.cut_to_the_chase));

    if answer.has_multiple_points {
        out.push_str(&bullets("🎯", &answer.direct_answers));
        out.push('\n');
    }
    if answer.has_secondary {
        out.push('\n');
        out.push_str(&bullets("2️⃣", &answer.secondary_comments));
        out.push('\n');
    }
    if answer.has_main_quote {
        out.push_str(&format!("\n\t✍️ {}\n", answer.main_quote_comment));
    }
    if answer.has_secondary_quotes {
        out.push('\n');
        out.push_str(&bullets("✍️2️⃣", &answer.secondary_quote_comments));
        out.push('\n');
    }
}

fn render_lettered(out: &mut String, answer: &MultiQuestionAnswer) {
    for (n, part) in answer.ordered_parts() {
        out.push_str(&format!("Pregunta {}:\n\t🎯💥 {}\n", letter(n), part.cut_to_the_chase));

        if part.has_multiple_points {
            out.push('\n');
            out.push_str(&bullets("🎯", &part.direct_answers));
        }
        if part.has_main_quote {
            out.push_str(&format!("\n\n\t✍️ {}\n", part.main_quote_comment));
        }
    }

    let Some(analysis) = &answer.analysis_across_all_the_text else {
        return;
    };
    if analysis.has_secondary {
        out.push('\n');
        out.push_str(&bullets("2️⃣", &analysis.secondary_comments));
        out.push('\n');
    }
    if analysis.has_secondary_quotes {
        out.push('\n');
        out.push_str(&bullets("✍️2️⃣", &analysis.secondary_quote_comments));
        out.push('\n');
    }
}

fn bullets(marker: &str, lines: &[String]) -> String {
    lines.iter().map(|l| format!("\t{} {}", marker, l)).collect::<Vec<_>>().join("\n")
}

/// `1` → `A`, `2` → `B`, ...
fn letter(n: u32) -> String {
    match n.checked_sub(1).and_then(|i| char::from_u32('A' as u32 + i)) {
        Some(c) if c.is_ascii_uppercase() => c.to_string(),
        _ => n.to_string(),
    }
}

/// Markdown formatter for solver results
pub struct MarkdownFormatter {
    config: MarkdownConfig,
}

impl MarkdownFormatter {
    pub fn new(config: MarkdownConfig) -> Self {
        Self { config }
    }

    pub fn convert(&self, article: &StudyArticle, results: &AiResults) -> String {
        convert_to_markdown(article, results, &self.config)
    }
}
