//! Main scraping API.
//!
//! [`Scraper`] turns a page into a record: it captures the page skeleton and
//! then resolves the citations of every paragraph through the library's
//! reference lookup. Study articles become [`StudyArticle`]s, book chapters
//! [`Chapter`]s and midweek talks [`TalkMaterial`].
//!
//! # Example
//!
//! ```rust,no_run
//! use wolstudy_core::{ScrapeConfig, Scraper};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scraper = Scraper::with_config(ScrapeConfig::builder().timeout(60).build());
//! let article = scraper
//!     .fetch_and_scrape("https://wol.jw.org/es/wol/d/r4/lp-s/2024362")
//!     .await?;
//! println!("{}: {}", article.article_num, article.title);
//! # Ok(())
//! # }
//! ```

use tracing::info;

use crate::Result;
use crate::article::StudyArticle;
use crate::chapter::{Chapter, extract_chapter_draft};
use crate::citation::{
    CitationResolver, CiteSequence, LookupTooltip, NestedScope, ReferenceLookup, ResolverConfig, TooltipSurface,
    WolClient,
};
use crate::extract::{ArticleDraft, PageDraft, extract_draft};
use crate::fetch::{FetchConfig, fetch_url};
use crate::parse::Document;
use crate::talk::{TalkMaterial, extract_talk_draft};

/// Configuration for [`Scraper`].
///
/// # Example
///
/// ```rust
/// use wolstudy_core::{NestedScope, ScrapeConfig};
///
/// let config = ScrapeConfig::builder()
///     .timeout(60)
///     .nested_scope(NestedScope::All)
///     .build();
/// assert_eq!(config.fetch.timeout, 60);
/// ```
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub fetch: FetchConfig,
    pub resolver: ResolverConfig,
    /// Whether to look citations up at all (default: true).
    pub resolve_citations: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self { fetch: FetchConfig::default(), resolver: ResolverConfig::default(), resolve_citations: true }
    }
}

impl ScrapeConfig {
    pub fn builder() -> ScrapeConfigBuilder {
        ScrapeConfigBuilder::new()
    }
}

/// Builder for [`ScrapeConfig`].
pub struct ScrapeConfigBuilder {
    config: ScrapeConfig,
}

impl ScrapeConfigBuilder {
    pub fn new() -> Self {
        Self { config: ScrapeConfig::default() }
    }

    /// Sets the HTTP timeout in seconds.
    pub fn timeout(mut self, secs: u64) -> Self {
        self.config.fetch.timeout = secs;
        self
    }

    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.user_agent = value.into();
        self
    }

    pub fn accept_language(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.accept_language = value.into();
        self
    }

    /// Sets the base URL citation lookups are sent to.
    pub fn lookup_base(mut self, value: impl Into<String>) -> Self {
        self.config.fetch.lookup_base = value.into();
        self
    }

    pub fn nested_scope(mut self, value: NestedScope) -> Self {
        self.config.resolver.nested_scope = value;
        self
    }

    pub fn resolve_citations(mut self, value: bool) -> Self {
        self.config.resolve_citations = value;
        self
    }

    pub fn build(self) -> ScrapeConfig {
        self.config
    }
}

impl Default for ScrapeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Entry point for scraping study articles.
#[derive(Debug, Clone, Default)]
pub struct Scraper {
    config: ScrapeConfig,
}

impl Scraper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScrapeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Captures the article skeleton, leaving citations unresolved.
    pub fn draft(&self, html: &str) -> Result<ArticleDraft> {
        let doc = Document::parse(html)?;
        extract_draft(&doc)
    }

    /// Scrapes an article page.
    ///
    /// Citations are looked up through the library unless
    /// [`ScrapeConfig::resolve_citations`] is off.
    pub async fn scrape(&self, html: &str) -> Result<StudyArticle> {
        let draft = self.draft(html)?;
        info!(title = %draft.title, sections = draft.sections.len(), "article captured");
        self.finish(draft).await
    }

    /// Scrapes a book chapter page.
    pub async fn scrape_chapter(&self, html: &str) -> Result<Chapter> {
        let draft = extract_chapter_draft(&Document::parse(html)?)?;
        info!(title = %draft.title, sections = draft.sections.len(), "chapter captured");
        self.finish(draft).await
    }

    /// Scrapes the talk of a meeting workbook page.
    pub async fn scrape_talk(&self, html: &str) -> Result<TalkMaterial> {
        let draft = extract_talk_draft(&Document::parse(html)?)?;
        info!(title = %draft.title, main_points = draft.main_points.len(), "talk captured");
        self.finish(draft).await
    }

    async fn finish<D: PageDraft>(&self, draft: D) -> Result<D::Output> {
        if !self.config.resolve_citations {
            return Ok(draft.into_unresolved());
        }

        let client = WolClient::new(&self.config.fetch)?;
        Ok(self.resolve_with(draft, LookupTooltip::new(&client), &client).await)
    }

    /// Resolves a draft's citations through the given tooltip surface and
    /// lookup, with a fresh footnote sequence.
    pub async fn resolve_with<D, T, L>(&self, draft: D, surface: T, lookup: L) -> D::Output
    where
        D: PageDraft,
        T: TooltipSurface,
        L: ReferenceLookup,
    {
        info!(links = draft.link_count(), "resolving citations");
        let mut resolver = CitationResolver::new(surface, lookup, self.config.resolver.clone());
        let mut sequence = CiteSequence::new();
        draft.resolve(&mut resolver, &mut sequence).await
    }

    /// Fetches an article page from the library and scrapes it.
    pub async fn fetch_and_scrape(&self, url: &str) -> Result<StudyArticle> {
        let html = fetch_url(url, &self.config.fetch).await?;
        self.scrape(&html).await
    }
}

/// Scrapes an article page with default settings.
pub async fn scrape(html: &str) -> Result<StudyArticle> {
    Scraper::new().scrape(html).await
}

/// Fetches and scrapes an article with default settings.
pub async fn fetch_and_scrape(url: &str) -> Result<StudyArticle> {
    Scraper::new().fetch_and_scrape(url).await
}
