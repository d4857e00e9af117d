use thiserror::Error;

/// Per-document fetch failures. Client errors (4xx) are permanent; server
/// errors and transport failures are retried before they surface here.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("client error {status} for {url}")]
    ClientStatus { url: String, status: u16 },

    #[error("server error {status} for {url} after {attempts} attempts")]
    ServerStatus {
        url: String,
        status: u16,
        attempts: u32,
    },

    #[error("request to {url} failed after {attempts} attempts: {source}")]
    Transport {
        url: String,
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetch cancelled")]
    Cancelled,
}

impl FetchError {
    /// HTTP status observed on the final attempt, or 0 when no status was
    /// seen (invalid url, transport failure, cancellation).
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ClientStatus { status, .. } | Self::ServerStatus { status, .. } => *status,
            Self::InvalidUrl { .. } | Self::Transport { .. } | Self::Cancelled => 0,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Pipeline-level failures. Per-document fetch and extraction problems are
/// recovered inside the pipeline and never surface here.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no search results supplied for keyword {keyword:?}")]
    EmptyResults { keyword: String },

    #[error("analysis cancelled")]
    Cancelled,
}

/// Search provider failures. A missing credential is a configuration error
/// and is surfaced before the pipeline runs.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("SERPER_API_KEY is not set; a search provider credential is required")]
    MissingApiKey,

    #[error("search request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("search provider returned status {status}")]
    Status { status: u16 },

    #[error("failed to decode search response: {0}")]
    Decode(#[source] reqwest::Error),
}
