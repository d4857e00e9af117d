use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser as _;
use tokio_util::sync::CancellationToken;

use serpsight::cli::{AnalyzeArgs, Cli, Command, FetchArgs, SearchArgs};
use serpsight::fetch::{FetchConfig, Fetcher};
use serpsight::pipeline::{self, AnalyzeOptions};
use serpsight::report::{CrawlRequest, SearchResultEntry};
use serpsight::search::{SearchProvider as _, SerperClient};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    serpsight::logging::init().context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl-c received; cancelling");
            ctrl_c_cancel.cancel();
        }
    });

    match cli.command {
        Command::Analyze(args) => analyze(args, &cancel).await.context("analyze")?,
        Command::Search(args) => search(args).await.context("search")?,
        Command::Fetch(args) => fetch(args, &cancel).await.context("fetch")?,
    }

    Ok(())
}

async fn analyze(args: AnalyzeArgs, cancel: &CancellationToken) -> anyhow::Result<()> {
    let results: Vec<SearchResultEntry> = match &args.results {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("read results file: {path}"))?;
            serde_json::from_str(&raw).context("parse results file")?
        }
        None => {
            let provider = SerperClient::from_env().context("configure search provider")?;
            provider
                .search(&args.keyword, args.limit.clamp(3, 10))
                .await
                .context("search provider request")?
        }
    };

    let fetcher = Fetcher::new(FetchConfig {
        retry_delay: Duration::from_millis(args.retry_delay_ms),
        ..FetchConfig::default()
    })?;
    let options = AnalyzeOptions {
        max_documents: args.max_docs,
        max_retries: args.max_retries,
    };

    let report =
        pipeline::analyze_serp(&fetcher, &args.keyword, &results, &options, cancel).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

async fn search(args: SearchArgs) -> anyhow::Result<()> {
    let provider = SerperClient::from_env().context("configure search provider")?;
    let results = provider
        .search(&args.query, args.limit.clamp(3, 10))
        .await
        .context("search provider request")?;

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

async fn fetch(args: FetchArgs, cancel: &CancellationToken) -> anyhow::Result<()> {
    let request = CrawlRequest::new(&args.url, args.max_retries)?;
    let fetcher = Fetcher::new(FetchConfig {
        retry_delay: Duration::from_millis(args.retry_delay_ms),
        ..FetchConfig::default()
    })?;

    let result = fetcher.crawl(&request, args.tag_counts, cancel).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
