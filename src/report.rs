use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// One ranked entry from the external search provider. Read-only input to
/// the analyzer; `position` is 1-based rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultEntry {
    pub position: u32,
    pub title: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// A validated fetch request. Built per call, never mutated.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    url: String,
    max_retries: u32,
}

/// Upper bound on retries a caller may request.
pub const MAX_RETRIES_CAP: u32 = 3;

impl CrawlRequest {
    /// Validate `url` (absolute, http/https only) and clamp `max_retries`
    /// to `0..=MAX_RETRIES_CAP`.
    pub fn new(url: &str, max_retries: u32) -> Result<Self, FetchError> {
        let parsed = url::Url::parse(url).map_err(|err| FetchError::InvalidUrl {
            url: url.to_owned(),
            reason: err.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidUrl {
                url: url.to_owned(),
                reason: format!("unsupported scheme: {}", parsed.scheme()),
            });
        }

        Ok(Self {
            url: url.to_owned(),
            max_retries: max_retries.min(MAX_RETRIES_CAP),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

/// Flat structural tag counts for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCounts {
    pub h1: u32,
    pub h2: u32,
    pub p: u32,
    pub div: u32,
    pub span: u32,
}

/// Outcome of one fetch attempt sequence. `success == false` with
/// `status_code == 0` means total failure (network error or exhausted
/// retries); a permanent client error keeps its 4xx status code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub url: String,
    pub status_code: u16,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_counts: Option<TagCounts>,
    pub success: bool,
}

/// h1/h2/h3 texts of one document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingStructure {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
}

impl HeadingStructure {
    pub fn is_empty(&self) -> bool {
        self.h1.is_empty() && self.h2.is_empty() && self.h3.is_empty()
    }
}

/// Inferred user goal behind the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
    Informational,
    Transactional,
    Navigational,
    Commercial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIntent {
    #[serde(rename = "type")]
    pub kind: IntentKind,
    /// Heuristic confidence, capped at 90.
    pub confidence: u32,
    pub indicators: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlPatterns {
    pub common_paths: Vec<String>,
    pub avg_path_depth: f64,
    pub common_extensions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitlePatterns {
    pub common_words: Vec<String>,
    pub avg_length: u32,
    pub common_formats: Vec<String>,
}

/// Word-count statistics across the deep-analyzed documents. All zero when
/// no document was successfully analyzed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetrics {
    pub avg_word_count: u32,
    pub min_word_count: u32,
    pub max_word_count: u32,
}

/// The single externally consumed artifact: one aggregate report per
/// analyzed keyword, built once and returned immutably.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpAnalysis {
    pub keyword: String,
    pub total_results: usize,
    pub analyzed_documents: usize,
    pub intent: SearchIntent,
    pub url_patterns: UrlPatterns,
    pub title_patterns: TitlePatterns,
    pub common_headings: HeadingStructure,
    pub content_metrics: ContentMetrics,
    pub generated_at: String,
}
