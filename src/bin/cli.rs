//! Rufus CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rufus::{
    error::Result,
    models::Config,
    pipeline::{self, LanguageServices},
    services::HttpRenderer,
    storage::{LocalStorage, ReportStorage},
};
use tokio_util::sync::CancellationToken;

/// Rufus - focused web crawler
#[derive(Parser, Debug)]
#[command(
    name = "rufus",
    version,
    about = "Crawls a site for pages relevant to natural-language instructions"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "rufus.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl and save the relevant pages
    Crawl {
        #[command(flatten)]
        target: Target,

        /// Output file for the page records
        #[arg(short, long, default_value = "pages.json")]
        output: PathBuf,
    },

    /// Crawl, summarize and save a full report
    Analyze {
        #[command(flatten)]
        target: Target,

        /// Output file for the report
        #[arg(short, long, default_value = "scraping_results.json")]
        output: PathBuf,
    },

    /// Print the keywords extracted from instructions
    Keywords {
        instructions: String,
    },

    /// Validate the configuration file
    Validate,
}

/// Seed, instructions and threshold overrides.
#[derive(Args, Debug)]
struct Target {
    /// Seed URL
    url: String,

    /// What to look for, in plain words
    instructions: String,

    /// Deepest link distance to follow
    #[arg(long)]
    max_depth: Option<usize>,

    /// Minimum score for a page to be kept
    #[arg(long)]
    min_score: Option<u32>,

    /// Stop once kept scores add up to this
    #[arg(long)]
    threshold: Option<u64>,
}

impl Target {
    fn apply(&self, config: &mut Config) {
        if let Some(max_depth) = self.max_depth {
            config.crawl.max_depth = max_depth;
        }
        if let Some(min_score) = self.min_score {
            config.crawl.min_score = min_score;
        }
        if let Some(threshold) = self.threshold {
            config.crawl.cumulative_score_threshold = threshold;
        }
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Cancel `token` on Ctrl-C so a crawl ends with what it has.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, finishing with partial results");
            token.cancel();
        }
    });
}

/// Storage rooted at the output file's directory, plus the file name as key.
fn storage_for(output: &std::path::Path) -> (LocalStorage, String) {
    let root = output
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    let key = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scraping_results.json".to_string());
    (LocalStorage::new(root), key)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Crawl { target, output } => {
            target.apply(&mut config);
            config.validate()?;

            let services = LanguageServices::from_config(&config.llm)?;
            let renderer = HttpRenderer::new(config.renderer.clone())?;
            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());

            let outcome = pipeline::run_scrape(
                renderer,
                services.keywords.as_ref(),
                &config.crawl,
                cancel,
                &target.url,
                &target.instructions,
            )
            .await?;

            let (storage, key) = storage_for(&output);
            storage.save_pages(&key, &outcome.pages).await?;

            for page in &outcome.pages {
                println!("{:>5}  {}", page.relevance_score, page.url);
            }
            log::info!(
                "Crawl complete ({:?}, cumulative score {})",
                outcome.stop_reason,
                outcome.cumulative_score
            );
        }

        Command::Analyze { target, output } => {
            target.apply(&mut config);
            config.validate()?;

            let services = LanguageServices::from_config(&config.llm)?;
            let renderer = HttpRenderer::new(config.renderer.clone())?;
            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());

            let report = pipeline::run_analysis(
                renderer,
                &services,
                &config,
                cancel,
                &target.url,
                &target.instructions,
            )
            .await?;

            let (storage, key) = storage_for(&output);
            storage.save_report(&key, &report).await?;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Keywords { instructions } => {
            let services = LanguageServices::from_config(&config.llm)?;
            for keyword in services.keywords.extract(&instructions).await {
                println!("{keyword}");
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            HttpRenderer::new(config.renderer.clone())?;
            log::info!("✓ Config OK (crawl limits, selectors, and model settings)");
        }
    }

    Ok(())
}
