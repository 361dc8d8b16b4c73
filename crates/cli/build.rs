use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from) else {
        return;
    };
    let completions_dir = out_dir.join("completions");

    if fs::create_dir_all(&completions_dir).is_err() {
        println!("cargo:warning=Could not create {}", completions_dir.display());
        return;
    }

    let scrape = clap::Command::new("scrape")
        .about("Scrape a library page into JSON with resolved citations")
        .arg(clap::arg!(<INPUT> "Page URL, local HTML file, or '-' for stdin"))
        .arg(
            clap::arg!(--kind <KIND> "Kind of page")
                .default_value("study")
                .value_parser(["study", "chapter", "talk"]),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(--runs_dir <DIR> "Also write the record into a new run directory under DIR")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--no_citations "Keep the citation links unresolved"))
        .arg(
            clap::arg!(--nested_scope <SCOPE> "Which tooltips get their own links expanded")
                .value_parser(["bible", "non-bible", "all", "none"]),
        )
        .arg(clap::arg!(--lookup_base <URL> "Base URL for citation lookups"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--user_agent <UA> "Custom User-Agent for HTTP requests"));

    let solve = clap::Command::new("solve")
        .about("Draft answers for a scraped article or talk")
        .arg(clap::arg!([FILE] "Scraped article or talk JSON, or '-' for stdin"))
        .arg(
            clap::arg!(--kind <KIND> "Kind of scraped record")
                .default_value("study")
                .value_parser(["study", "talk"]),
        )
        .arg(
            clap::arg!(--runs_dir <DIR> "Directory where run directories are created")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--model <MODEL> "Chat model name"))
        .arg(clap::arg!(--base_url <URL> "Base URL of the chat-completion API"))
        .arg(clap::arg!(--no_legend "Omit the marker legend from result.md"));

    let render = clap::Command::new("render")
        .about("Render a scraped article and drafted answers as Markdown")
        .arg(clap::arg!(<ARTICLE> "Scraped article JSON"))
        .arg(clap::arg!(<RESULTS> "Drafted answers JSON (aiResults.json)"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--no_legend "Omit the marker legend"));

    let mut cmd = clap::Command::new("wolstudy")
        .version(env!("CARGO_PKG_VERSION"))
        .author("wolstudy contributors")
        .about("Scrape study articles with footnoted citations and draft answers")
        .arg(clap::arg!(-v --verbose "Enable debug logging").global(true))
        .arg(
            clap::arg!(--completions <SHELL> "Generate shell completion script")
                .value_parser(["bash", "zsh", "fish", "powershell", "elvish"]),
        )
        .subcommand(scrape)
        .subcommand(solve)
        .subcommand(render);

    for shell in [
        clap_complete::Shell::Bash,
        clap_complete::Shell::Zsh,
        clap_complete::Shell::Fish,
        clap_complete::Shell::PowerShell,
    ] {
        if let Err(err) = clap_complete::generate_to(shell, &mut cmd, "wolstudy", &completions_dir) {
            println!("cargo:warning=Could not generate {} completions: {}", shell, err);
        }
    }

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
