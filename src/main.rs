// Launcher script filter entry point.
// Parses the query, loads repositories through the cache and prints matching items.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, warn};

use ghe_repos::feedback::{self, Feedback, Item};
use ghe_repos::{Config, ConfigLoader, FinderError, RefreshHandle, RepositoryFetcher, logging};

#[derive(Parser)]
#[command(name = "ghe-repos")]
#[command(about = "Search the repositories of a GitHub Enterprise instance")]
#[command(version)]
struct Cli {
    /// Substring matched against repository names
    #[arg(default_value = "")]
    query: String,

    /// Only fetch the first page of repositories
    #[arg(long)]
    first_page: bool,

    /// Skip TLS certificate verification (self-signed instances only)
    #[arg(long)]
    insecure: bool,

    /// Wait for a background cache refresh to finish before exiting.
    /// Without this flag a refresh started for a stale cache is dropped when
    /// the process exits, usually before it completes, so the cache only
    /// refreshes on cold starts
    #[arg(long)]
    wait_refresh: bool,

    /// Maximum number of pages to follow
    #[arg(long)]
    max_pages: Option<usize>,

    /// Seconds a cached list is served without refreshing
    #[arg(long)]
    freshness_secs: Option<u64>,
}

impl Cli {
    fn load_config(&self) -> Result<Config, FinderError> {
        let mut config = ConfigLoader::from_env().load()?;
        if self.insecure {
            config.verify_tls = false;
        }
        if let Some(max_pages) = self.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(secs) = self.freshness_secs {
            config.freshness_window = std::time::Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            emit_error(&e);
            return ExitCode::FAILURE;
        }
    };

    // Held until exit so file logs are flushed
    let _log_guard = match logging::init_subscriber(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialise logging: {}", e);
            None
        }
    };

    match run(&cli, &config).await {
        Ok((feedback, refresh)) => {
            if let Err(e) = emit(&feedback) {
                error!(error = %e, "failed to write feedback");
                return ExitCode::FAILURE;
            }
            if cli.wait_refresh
                && let Some(refresh) = refresh
                && let Err(e) = refresh.wait().await
            {
                warn!(error = %e, "background refresh failed");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "failed to load repositories");
            emit_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    cli: &Cli,
    config: &Config,
) -> Result<(Feedback, Option<RefreshHandle>), FinderError> {
    let fetcher = RepositoryFetcher::from_config(config)?;
    let outcome = fetcher.perform(!cli.first_page).await?;
    let feedback = feedback::search(&outcome.repositories, &cli.query);
    Ok((feedback, outcome.refresh))
}

fn emit(feedback: &Feedback) -> serde_json::Result<()> {
    println!("{}", feedback.to_json()?);
    Ok(())
}

/// Show the failure in the launcher instead of an empty result list.
fn emit_error(e: &FinderError) {
    let mut feedback = Feedback::new();
    feedback.add_item(Item::error(e.to_string()));
    if emit(&feedback).is_err() {
        eprintln!("{}", e);
    }
}
