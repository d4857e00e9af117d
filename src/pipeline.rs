use tokio_util::sync::CancellationToken;

use crate::analyze;
use crate::error::{AnalysisError, FetchError};
use crate::extract;
use crate::fetch::Fetcher;
use crate::report::{CrawlRequest, HeadingStructure, SearchResultEntry, SerpAnalysis};

/// Hard cap on the number of results that are deep-analyzed per run.
/// Results beyond the cap still contribute title and URL signals.
pub const DOCUMENT_CAP: usize = 5;

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Results to deep-analyze, clamped to `DOCUMENT_CAP`.
    pub max_documents: usize,
    /// Retries per document fetch, clamped by `CrawlRequest`.
    pub max_retries: u32,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            max_documents: DOCUMENT_CAP,
            max_retries: 2,
        }
    }
}

/// Run the full pipeline over a pre-ranked result list: fetch and extract
/// the top results one at a time in rank order, then aggregate everything
/// into one `SerpAnalysis`.
///
/// A failed per-document fetch or extraction is logged and skipped; the
/// report is still produced, with zeroed content metrics if no document
/// succeeded. Only an empty result list (fatal, nothing to analyze) and
/// cancellation abort the run.
pub async fn analyze_serp(
    fetcher: &Fetcher,
    keyword: &str,
    results: &[SearchResultEntry],
    options: &AnalyzeOptions,
    cancel: &CancellationToken,
) -> Result<SerpAnalysis, AnalysisError> {
    if results.is_empty() {
        return Err(AnalysisError::EmptyResults {
            keyword: keyword.to_owned(),
        });
    }

    let cap = options.max_documents.min(DOCUMENT_CAP);
    let mut heading_docs: Vec<HeadingStructure> = Vec::new();
    let mut word_counts: Vec<usize> = Vec::new();

    for entry in results.iter().take(cap) {
        if cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }

        let request = match CrawlRequest::new(&entry.link, options.max_retries) {
            Ok(request) => request,
            Err(error) => {
                tracing::warn!(
                    position = entry.position,
                    url = %entry.link,
                    error = %error,
                    "skipping result with invalid url"
                );
                continue;
            }
        };

        let page = match fetcher.fetch_page(&request, cancel).await {
            Ok(page) => page,
            Err(FetchError::Cancelled) => return Err(AnalysisError::Cancelled),
            Err(error) => {
                tracing::warn!(
                    position = entry.position,
                    url = %entry.link,
                    error = %error,
                    "skipping unfetchable result"
                );
                continue;
            }
        };

        let extraction = extract::extract(&page.body, false);
        word_counts.push(extraction.content.split_whitespace().count());
        heading_docs.push(extract::extract_headings(&page.body));
    }

    tracing::info!(
        keyword,
        total_results = results.len(),
        analyzed_documents = word_counts.len(),
        "aggregating serp signals"
    );

    Ok(SerpAnalysis {
        keyword: keyword.to_owned(),
        total_results: results.len(),
        analyzed_documents: word_counts.len(),
        intent: analyze::classify_intent(keyword, results),
        url_patterns: analyze::mine_url_patterns(results),
        title_patterns: analyze::mine_title_patterns(results),
        common_headings: analyze::aggregate_headings(&heading_docs),
        content_metrics: analyze::content_metrics(&word_counts),
        generated_at: chrono::Utc::now().to_rfc3339(),
    })
}
