use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Analyze(AnalyzeArgs),
    Search(SearchArgs),
    Fetch(FetchArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Keyword to analyze.
    #[arg(long)]
    pub keyword: String,

    /// JSON file with a pre-fetched result list (array of search result
    /// entries). When omitted, results come live from the search provider.
    #[arg(long)]
    pub results: Option<String>,

    /// Results to request from the live provider (clamped to 3..=10).
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Results to deep-analyze (hard cap 5).
    #[arg(long, default_value_t = 5)]
    pub max_docs: usize,

    /// Retries per document fetch (clamped to 0..=3).
    #[arg(long, default_value_t = 2)]
    pub max_retries: u32,

    /// Delay before each retry attempt.
    #[arg(long, default_value_t = 2000)]
    pub retry_delay_ms: u64,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search query.
    #[arg(long)]
    pub query: String,

    /// Results to request (clamped to 3..=10).
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// URL to fetch (must be http/https).
    #[arg(long)]
    pub url: String,

    /// Retries on transient failure (clamped to 0..=3).
    #[arg(long, default_value_t = 2)]
    pub max_retries: u32,

    /// Delay before each retry attempt.
    #[arg(long, default_value_t = 2000)]
    pub retry_delay_ms: u64,

    /// Include h1/h2/p/div/span tag counts in the output.
    #[arg(long)]
    pub tag_counts: bool,
}
