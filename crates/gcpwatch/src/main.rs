use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use relnotes::{
    parse_page_url, read_markup, write_output, Config, OutputFormat, PageFetcher, Pipeline,
    ProfileChoice, Renderer, Report, RuleSet, TimeWindow,
};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gcpwatch")]
#[command(about = "Summarize recent release notes from a documentation page")]
struct Args {
    /// URL of the release notes page
    #[arg(short, long)]
    url: String,

    /// Number of months to look back
    #[arg(short, long, default_value = "6", allow_negative_numbers = true)]
    months: i64,

    /// Output format (text, markdown, html, json)
    #[arg(short, long, default_value = "text")]
    output: String,

    /// Output file path (prints to stdout if not specified)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Site profile (auto, known, generic)
    #[arg(short, long, default_value = "auto")]
    profile: String,

    /// JSON classifier rule table, highest precedence first
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Read a saved copy of the page instead of fetching the URL
    #[arg(long)]
    html_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Reject bad settings before touching the network
    let url = parse_page_url(&args.url)?;
    let window = TimeWindow::new(args.months)?;
    let format: OutputFormat = args.output.parse()?;
    let profile = args.profile.parse::<ProfileChoice>()?.resolve(&url);
    let config = Config::from_env()?;

    let rules = match args.rules.clone().or(config.rules_path.clone()) {
        Some(path) => RuleSet::from_json_file(&path)?,
        None => RuleSet::default(),
    };

    let markup = match &args.html_file {
        Some(path) => {
            eprintln!("📖 Reading saved page: {}", path.display());
            read_markup(path)?
        }
        None => {
            eprintln!("🌐 Fetching {}...", url);
            let fetcher = PageFetcher::new(&config)?;
            fetcher
                .fetch(&url)
                .await
                .context("Failed to fetch release notes page")?
        }
    };

    let today = Local::now().date_naive();
    let pipeline = Pipeline::new(url.clone(), profile, rules, window);
    debug!(
        %url,
        months = window.months(),
        profile = pipeline.profile_name(),
        "running pipeline"
    );
    let output = pipeline.run(&markup, today);

    if output.stats.extracted == 0 {
        eprintln!("⚠ No dated release notes found on the page.");
    } else {
        eprintln!(
            "✓ Found {} entries, {} in the last {} months",
            output.stats.extracted,
            output.entries.len(),
            window.months()
        );
        if output.stats.undated > 0 {
            eprintln!("  ({} entries skipped: unreadable date)", output.stats.undated);
        }
    }

    let report = Report {
        source_url: url.as_str(),
        generated_at: Utc::now(),
        months: window.months(),
        cutoff: window.cutoff(today),
        today,
        entries: &output.entries,
        summary: &output.summary,
    };
    let rendered = Renderer::render(&report, format)?;

    write_output(&rendered, args.file.as_deref())?;
    if let Some(path) = &args.file {
        eprintln!("✓ {} output saved to {}", format.label(), path.display());
    }

    Ok(())
}
