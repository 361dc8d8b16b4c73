mod echo;

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use url::Url;
use wolstudy_core::{
    AiResults, ChatClient, ChatConfig, Chapter, MarkdownConfig, NestedScope, ScrapeConfig, Scraper, StudyArticle,
    StudySolver, TalkMaterial, TalkSolver, convert_to_markdown, create_run_dir, create_runs_dir, fetch_file,
    fetch_stdin, fetch_url, read_json_file, read_json_stdin, write_json, write_text,
};

use crate::echo::{
    format_size, print_article_summary, print_banner, print_chapter_summary, print_detail, print_info,
    print_results_summary, print_step, print_success, print_talk_results_summary, print_talk_summary, print_warning,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const STUDY_RUNS_DIR: &str = "runs/watchtower_ai_runs";
const TALK_RUNS_DIR: &str = "runs/mwb_ai_runs";

/// Kind of library page to scrape
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PageKind {
    /// Watchtower study article
    Study,
    /// Book chapter
    Chapter,
    /// Midweek meeting talk
    Talk,
}

/// Kind of scraped record to draft for
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SolveKind {
    /// Study article: answers to every study question
    Study,
    /// Midweek talk: speech goal and introductions
    Talk,
}

impl SolveKind {
    fn default_runs_dir(self) -> &'static str {
        match self {
            SolveKind::Study => STUDY_RUNS_DIR,
            SolveKind::Talk => TALK_RUNS_DIR,
        }
    }
}

/// Which citation tooltips get their own links expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    Bible,
    NonBible,
    All,
    None,
}

impl From<ScopeArg> for NestedScope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Bible => NestedScope::Bible,
            ScopeArg::NonBible => NestedScope::NonBible,
            ScopeArg::All => NestedScope::All,
            ScopeArg::None => NestedScope::None,
        }
    }
}

/// Scrape Watchtower study articles and draft answers to their questions
#[derive(Parser, Debug)]
#[command(name = "wolstudy")]
#[command(author = "wolstudy contributors")]
#[command(version)]
#[command(about = "Scrape study articles with footnoted citations and draft answers", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a library page into JSON with resolved citations
    Scrape(ScrapeArgs),
    /// Draft answers for a scraped article or talk
    Solve(SolveArgs),
    /// Render a scraped article and drafted answers as Markdown
    Render(RenderArgs),
}

#[derive(clap::Args, Debug)]
struct ScrapeArgs {
    /// Page URL, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Kind of page
    #[arg(long, value_enum, default_value = "study", value_name = "KIND")]
    kind: PageKind,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also write the record into a new run directory under DIR
    #[arg(long, value_name = "DIR")]
    runs_dir: Option<PathBuf>,

    /// Keep the citation links unresolved
    #[arg(long)]
    no_citations: bool,

    /// Which tooltips get their own links expanded (default: non-bible for
    /// talks, bible otherwise)
    #[arg(long, value_enum, value_name = "SCOPE")]
    nested_scope: Option<ScopeArg>,

    /// Base URL for citation lookups
    #[arg(long, value_name = "URL")]
    lookup_base: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,
}

#[derive(clap::Args, Debug)]
struct SolveArgs {
    /// Scraped article or talk JSON, or "-" for stdin (default: stdin)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Kind of scraped record
    #[arg(long, value_enum, default_value = "study", value_name = "KIND")]
    kind: SolveKind,

    /// Directory where run directories are created (default:
    /// runs/watchtower_ai_runs for articles, runs/mwb_ai_runs for talks)
    #[arg(long, value_name = "DIR")]
    runs_dir: Option<PathBuf>,

    /// Chat model name
    #[arg(long, value_name = "MODEL")]
    model: Option<String>,

    /// Base URL of the chat-completion API
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Omit the marker legend from result.md
    #[arg(long)]
    no_legend: bool,
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// Scraped article JSON
    #[arg(value_name = "ARTICLE")]
    article: String,

    /// Drafted answers JSON (aiResults.json)
    #[arg(value_name = "RESULTS")]
    results: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Omit the marker legend
    #[arg(long)]
    no_legend: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "wolstudy_core=debug,wolstudy=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "wolstudy", &mut io::stdout());
        return Ok(());
    }

    init_tracing(cli.verbose);

    if cli.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    match cli.command {
        Some(Command::Scrape(args)) => run_scrape(args, cli.verbose).await,
        Some(Command::Solve(args)) => run_solve(args, cli.verbose).await,
        Some(Command::Render(args)) => run_render(args),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

/// A scraped record of any page kind.
enum Scraped {
    Study(StudyArticle),
    Chapter(Chapter),
    Talk(TalkMaterial),
}

impl Scraped {
    fn to_json(&self) -> wolstudy_core::Result<String> {
        match self {
            Scraped::Study(article) => article.to_json(),
            Scraped::Chapter(chapter) => chapter.to_json(),
            Scraped::Talk(talk) => talk.to_json(),
        }
    }

    fn file_name(&self) -> String {
        match self {
            Scraped::Study(article) => article.file_name(),
            Scraped::Chapter(chapter) => chapter.file_name(),
            Scraped::Talk(talk) => talk.file_name(),
        }
    }

    fn print_summary(&self) {
        match self {
            Scraped::Study(article) => print_article_summary(article),
            Scraped::Chapter(chapter) => print_chapter_summary(chapter),
            Scraped::Talk(talk) => print_talk_summary(talk),
        }
    }
}

async fn run_scrape(args: ScrapeArgs, verbose: bool) -> anyhow::Result<()> {
    let scope = args.nested_scope.unwrap_or(match args.kind {
        PageKind::Talk => ScopeArg::NonBible,
        PageKind::Study | PageKind::Chapter => ScopeArg::Bible,
    });
    let mut builder = ScrapeConfig::builder()
        .timeout(args.timeout)
        .nested_scope(scope.into())
        .resolve_citations(!args.no_citations);
    if let Some(ua) = args.user_agent {
        builder = builder.user_agent(ua);
    }
    if let Some(base) = args.lookup_base {
        Url::parse(&base).with_context(|| format!("Invalid lookup base URL: {}", base))?;
        builder = builder.lookup_base(base);
    }
    let scraper = Scraper::with_config(builder.build());

    let is_url = args.input.starts_with("http://") || args.input.starts_with("https://");
    let html = if is_url {
        if verbose {
            print_step(1, 3, &format!("Fetching from {}", args.input.bright_white().underline()));
        }
        fetch_url(&args.input, &scraper.config().fetch).await.context("Failed to fetch page")?
    } else if args.input == "-" {
        if verbose {
            print_step(1, 3, "Reading from stdin");
        }
        fetch_stdin().context("Failed to read from stdin")?
    } else {
        if verbose {
            print_step(1, 3, &format!("Reading from file {}", args.input.bright_white()));
        }
        fetch_file(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?
    };

    if verbose {
        print_detail("Size", &format_size(html.len()));
        print_step(2, 3, "Capturing page and resolving citations");
    }
    let scraped = match args.kind {
        PageKind::Study => Scraped::Study(scraper.scrape(&html).await.context("Failed to scrape article")?),
        PageKind::Chapter => Scraped::Chapter(scraper.scrape_chapter(&html).await.context("Failed to scrape chapter")?),
        PageKind::Talk => Scraped::Talk(scraper.scrape_talk(&html).await.context("Failed to scrape talk")?),
    };

    if verbose {
        scraped.print_summary();
        print_step(3, 3, "Writing output");
    }

    let json = scraped.to_json().context("Failed to serialize record")?;

    if let Some(runs_dir) = &args.runs_dir {
        let run_dir = create_run_dir(create_runs_dir(runs_dir)?).context("Failed to create run directory")?;
        let file_name = scraped.file_name();
        let path = write_text(&run_dir, &file_name, &json).with_context(|| format!("Failed to write {}", file_name))?;
        print_success(&format!("Record written to {}", path.display().bright_white()));
    }

    match args.output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None if args.runs_dir.is_none() => println!("{}", json),
        None => {}
    }

    Ok(())
}

fn read_record<T: serde::de::DeserializeOwned>(input: Option<&str>, what: &str, verbose: bool) -> anyhow::Result<T> {
    match input {
        None | Some("-") => {
            if verbose {
                print_step(1, 3, &format!("Reading {} JSON from stdin", what));
            }
            read_json_stdin().with_context(|| format!("Failed to read {} JSON from stdin", what))
        }
        Some(path) => {
            if verbose {
                print_step(1, 3, &format!("Reading {} JSON from {}", what, path.bright_white()));
            }
            read_json_file(path).with_context(|| format!("Failed to read {} JSON: {}", what, path))
        }
    }
}

async fn run_solve(args: SolveArgs, verbose: bool) -> anyhow::Result<()> {
    let mut config = ChatConfig::from_env();
    if let Some(model) = args.model {
        config.model = model;
    }
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    let client = ChatClient::new(config).context("Failed to set up the chat client")?;
    let runs_dir = args.runs_dir.unwrap_or_else(|| PathBuf::from(args.kind.default_runs_dir()));

    match args.kind {
        SolveKind::Study => {
            let article: StudyArticle = read_record(args.input.as_deref(), "article", verbose)?;
            if article.question_count() == 0 {
                print_warning("The article has no study questions");
            }

            if verbose {
                print_step(2, 3, &format!("Drafting answers with {}", client.config().model.bright_white()));
            }
            let results = StudySolver::new(&client).solve(&article).await.context("Failed to draft answers")?;

            if verbose {
                print_results_summary(&article, &results);
                print_step(3, 3, "Writing run artifacts");
            }

            let run_dir = create_run_dir(create_runs_dir(&runs_dir)?).context("Failed to create run directory")?;
            write_json(&run_dir, "aiResults.json", &results).context("Failed to write aiResults.json")?;

            let markdown_config = MarkdownConfig { include_legend: !args.no_legend, ..Default::default() };
            let markdown = convert_to_markdown(&article, &results, &markdown_config);
            write_text(&run_dir, "result.md", &markdown).context("Failed to write result.md")?;

            print_success(&format!("Run written to {}", run_dir.display().bright_white()));
        }
        SolveKind::Talk => {
            let talk: TalkMaterial = read_record(args.input.as_deref(), "talk", verbose)?;
            if talk.main_points.is_empty() {
                print_warning("The talk has no main points");
            }

            if verbose {
                print_step(2, 3, &format!("Drafting speech with {}", client.config().model.bright_white()));
            }
            let results = TalkSolver::new(&client).solve(&talk).await.context("Failed to draft the speech")?;

            if verbose {
                print_talk_results_summary(&results);
                print_step(3, 3, "Writing run artifacts");
            }

            let run_dir = create_run_dir(create_runs_dir(&runs_dir)?).context("Failed to create run directory")?;
            write_json(&run_dir, "aiResults.json", &results).context("Failed to write aiResults.json")?;

            print_success(&format!("Run written to {}", run_dir.display().bright_white()));
        }
    }

    Ok(())
}

fn run_render(args: RenderArgs) -> anyhow::Result<()> {
    let article: StudyArticle =
        read_json_file(&args.article).with_context(|| format!("Failed to read article JSON: {}", args.article))?;
    let results: AiResults =
        read_json_file(&args.results).with_context(|| format!("Failed to read answers JSON: {}", args.results))?;

    let config = MarkdownConfig { include_legend: !args.no_legend, ..Default::default() };
    let markdown = convert_to_markdown(&article, &results, &config);

    match args.output {
        Some(path) => {
            fs::write(&path, markdown).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => println!("{}", markdown),
    }

    Ok(())
}
