use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue, UPGRADE_INSECURE_REQUESTS,
    USER_AGENT,
};
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::extract;
use crate::report::{CrawlRequest, CrawlResult};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// Fixed delay that elapses before each retry attempt.
    pub retry_delay: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            retry_delay: Duration::from_secs(2),
        }
    }
}

/// A successfully fetched page, raw markup included.
#[derive(Debug)]
pub struct FetchedPage {
    pub url: String,
    pub status_code: u16,
    pub body: String,
}

/// HTTP GET with bounded retry on transient failure. Client errors (4xx)
/// fail permanently on the first response; 5xx and transport errors are
/// retried up to the request's `max_retries` with a fixed inter-attempt
/// delay. Cancellation is observed at the top of every attempt and during
/// the delay.
pub struct Fetcher {
    client: reqwest::Client,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> anyhow::Result<Self> {
        // Accept-Encoding is added by reqwest itself (gzip feature), which
        // keeps automatic response decompression intact.
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build fetch http client")?;

        Ok(Self {
            client,
            retry_delay: config.retry_delay,
        })
    }

    /// One GET attempt sequence. Returns the raw body on the first 2xx
    /// response, a permanent error on 4xx, and otherwise the last observed
    /// error once `max_retries` extra attempts are exhausted.
    pub async fn fetch_page(
        &self,
        request: &CrawlRequest,
        cancel: &CancellationToken,
    ) -> Result<FetchedPage, FetchError> {
        let url = request.url();
        let max_retries = request.max_retries();
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            if attempt > 0 {
                tokio::select! {
                    () = cancel.cancelled() => return Err(FetchError::Cancelled),
                    () = tokio::time::sleep(self.retry_delay) => {}
                }
            }
            attempt += 1;

            let error = match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        match response.text().await {
                            Ok(body) => {
                                tracing::debug!(url, status = status.as_u16(), "fetched page");
                                return Ok(FetchedPage {
                                    url: url.to_owned(),
                                    status_code: status.as_u16(),
                                    body,
                                });
                            }
                            Err(source) => FetchError::Transport {
                                url: url.to_owned(),
                                attempts: attempt,
                                source,
                            },
                        }
                    } else if status.is_client_error() {
                        // 4xx is not transient; never retried.
                        return Err(FetchError::ClientStatus {
                            url: url.to_owned(),
                            status: status.as_u16(),
                        });
                    } else {
                        FetchError::ServerStatus {
                            url: url.to_owned(),
                            status: status.as_u16(),
                            attempts: attempt,
                        }
                    }
                }
                Err(source) => FetchError::Transport {
                    url: url.to_owned(),
                    attempts: attempt,
                    source,
                },
            };

            if attempt > max_retries {
                return Err(error);
            }
            tracing::warn!(url, attempt, error = %error, "fetch attempt failed; retrying");
        }
    }

    /// Fetch and extract in one step. A non-cancellation failure degrades to
    /// `success == false` instead of an error, so callers can continue with
    /// partial data; cancellation is the only error this method propagates.
    pub async fn crawl(
        &self,
        request: &CrawlRequest,
        want_tag_counts: bool,
        cancel: &CancellationToken,
    ) -> Result<CrawlResult, FetchError> {
        match self.fetch_page(request, cancel).await {
            Ok(page) => {
                let extraction = extract::extract(&page.body, want_tag_counts);
                Ok(CrawlResult {
                    url: page.url,
                    status_code: page.status_code,
                    content: extraction.content,
                    tag_counts: extraction.tag_counts,
                    success: true,
                })
            }
            Err(FetchError::Cancelled) => Err(FetchError::Cancelled),
            Err(error) => {
                tracing::warn!(url = request.url(), error = %error, "crawl failed");
                Ok(CrawlResult {
                    url: request.url().to_owned(),
                    status_code: error.status_code(),
                    content: String::new(),
                    tag_counts: None,
                    success: false,
                })
            }
        }
    }
}
