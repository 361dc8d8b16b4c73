pub mod article;
pub mod chapter;
pub mod citation;
pub mod coverage;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod formatters;
pub mod llm;
pub mod mapper;
pub mod output;
pub mod parse;
pub mod question;
pub mod scrape;
pub mod solve;
pub mod talk;
pub mod text;

pub use article::{ArticleSection, Figure, Paragraph, StudyArticle, Supplement, TeachBlock};
#[doc(hidden)]
pub use chapter::ChapterDraft;
pub use chapter::{Chapter, extract_chapter_draft};
pub use citation::{
    CitationContainer, CitationData, CitationKind, CitationResolver, CiteSequence, LookupTooltip, NestedScope,
    ReferenceLookup, ResolverConfig, Tooltip, TooltipCitation, TooltipSurface, WolClient,
};
pub use coverage::{Coverage, CoverageKind, ParagraphReference};
pub use error::{Result, WolError};
#[doc(hidden)]
pub use extract::{ArticleDraft, SectionDraft};
pub use extract::{PageDraft, extract_draft, extract_sections};
pub use fetch::FetchConfig;
pub use fetch::{fetch_file, fetch_stdin, fetch_url, read_json_file, read_json_stdin};
pub use formatters::{MarkdownConfig, MarkdownFormatter, convert_to_markdown};
pub use llm::{ChatClient, ChatConfig, ChatModel};
pub use output::{create_run_dir, create_runs_dir, record_file_name, write_json, write_text};
pub use parse::Document;
pub use question::Question;
pub use scrape::{ScrapeConfig, ScrapeConfigBuilder, Scraper, fetch_and_scrape, scrape};
pub use solve::{AiResults, AnswerItem, SpeechIntros, StudySolver, TalkResults, TalkSolver};
#[doc(hidden)]
pub use talk::TalkDraft;
pub use talk::{MainPoint, TalkMaterial, extract_talk_draft};
pub use text::clean_text;
