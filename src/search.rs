use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use serde::Deserialize;

use crate::error::SearchError;
use crate::report::SearchResultEntry;

pub const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";
pub const API_KEY_ENV: &str = "SERPER_API_KEY";

/// The external search collaborator: returns a pre-ranked page of results
/// for a query. The pipeline never calls this itself; the host does, and
/// hands the result list in.
#[async_trait]
pub trait SearchProvider {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResultEntry>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperOrganic>,
}

#[derive(Debug, Deserialize)]
struct SerperOrganic {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    position: Option<u32>,
}

/// Serper (Google search API) client.
pub struct SerperClient {
    api_key: String,
    client: reqwest::Client,
    endpoint: String,
}

impl SerperClient {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("build search http client")?;

        Ok(Self {
            api_key,
            client,
            endpoint: SERPER_ENDPOINT.to_owned(),
        })
    }

    /// Read the API credential from the environment. A missing key is a
    /// fatal configuration error, surfaced before the pipeline runs.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| SearchError::MissingApiKey)?;
        Self::new(api_key)
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_owned();
        self
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResultEntry>, SearchError> {
        tracing::info!(query, limit, "querying search provider");

        let body = serde_json::json!({ "q": query, "num": limit });
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(SearchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let decoded: SerperResponse = response.json().await.map_err(SearchError::Decode)?;
        let entries = decoded
            .organic
            .into_iter()
            .enumerate()
            .map(|(index, item)| SearchResultEntry {
                position: item.position.unwrap_or(index as u32 + 1),
                title: item.title,
                link: item.link,
                snippet: item.snippet,
            })
            .collect::<Vec<_>>();

        tracing::info!(query, count = entries.len(), "search provider responded");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serper_response_decodes_organic_results() -> anyhow::Result<()> {
        let json = r#"{
            "searchParameters": {"q": "rust"},
            "organic": [
                {"title": "Rust", "link": "https://rust-lang.org", "snippet": "A language", "position": 1},
                {"title": "Docs", "link": "https://doc.rust-lang.org"}
            ]
        }"#;
        let decoded: SerperResponse = serde_json::from_str(json)?;

        assert_eq!(decoded.organic.len(), 2);
        assert_eq!(decoded.organic[0].position, Some(1));
        assert!(decoded.organic[1].snippet.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn missing_credential_is_a_distinct_error() {
        // from_env goes through the process environment, so exercise the
        // typed error directly.
        let err = SearchError::MissingApiKey;
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() -> anyhow::Result<()> {
        let server = tiny_http::Server::http("127.0.0.1:0")
            .map_err(|err| anyhow::anyhow!("start test server: {err}"))?;
        let endpoint = format!("http://{}", server.server_addr());

        let handle = std::thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let _ = request
                    .respond(tiny_http::Response::from_string("forbidden").with_status_code(403));
            }
        });

        let client = SerperClient::new("test-key".to_owned())?.with_endpoint(&endpoint);
        let err = client.search("rust", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::Status { status: 403 }));

        handle.join().ok();
        Ok(())
    }
}
