use owo_colors::OwoColorize;
use wolstudy_core::{AiResults, Chapter, StudyArticle, TalkMaterial, TalkResults};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "wolstudy".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Study articles with footnoted citations and drafted answers\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print a labelled value under the current step
pub fn print_detail(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Print a summary of a scraped article
pub fn print_article_summary(article: &StudyArticle) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Article".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_detail("Title", &article.title);
    print_detail("Sections", &article.body.len().to_string());
    print_detail("Paragraphs", &article.paragraph_count().to_string());
    print_detail("Questions", &article.question_count().to_string());
    print_detail("Footnotes", &article.citation_count().to_string());
    eprintln!();
}

/// Print a summary of a scraped book chapter
pub fn print_chapter_summary(chapter: &Chapter) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Chapter".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_detail("Chapter", &chapter.capt_num);
    print_detail("Title", &chapter.title);
    print_detail("Sections", &chapter.sections.len().to_string());
    print_detail("Paragraphs", &chapter.paragraph_count().to_string());
    print_detail("Questions", &chapter.question_count().to_string());
    print_detail("Footnotes", &chapter.citation_count().to_string());
    eprintln!();
}

/// Print a summary of a scraped talk
pub fn print_talk_summary(talk: &TalkMaterial) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Talk".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_detail("Week", &talk.period);
    print_detail("Title", &talk.title);
    print_detail("Main points", &talk.main_points.len().to_string());
    print_detail("Figures", &talk.figures.len().to_string());
    print_detail("Footnotes", &talk.citation_count().to_string());
    eprintln!();
}

/// Print a summary of a drafted speech
pub fn print_talk_results_summary(results: &TalkResults) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Speech".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_detail("Goal", &results.speech_goal);
    print_detail("Introductions", &results.speech_intros.intros.len().to_string());
    eprintln!();
}

/// Print a summary of drafted answers
pub fn print_results_summary(article: &StudyArticle, results: &AiResults) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Answers".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_detail("Questions", &article.question_count().to_string());
    print_detail("Answers", &results.answers.len().to_string());
    print_detail("Review answers", &results.teach_block_answers.len().to_string());
    eprintln!();
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
