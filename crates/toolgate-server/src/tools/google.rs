//! Outbound client for the Google Custom Search JSON API.

use crate::context::ScopedCredentials;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use toolgate_common_log::spans::{provider_span, Timer};
use tracing::{debug, Instrument};

/// Public Custom Search endpoint.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Search provider errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Carries no URL: the query string holds the caller's provider key.
    #[error("{0}")]
    Request(#[source] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[source] serde_json::Error),
}

/// One search request as sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    /// Result count, 1..=10.
    pub num: u8,
    /// 1-based index of the first result.
    pub start: u32,
}

/// Raw provider reply. Shaping happens in the tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: String,
}

/// Something that can run a web search on behalf of a caller.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run `query` with the caller's scoped credentials. Absent credentials
    /// are simply not sent; the provider reports the resulting error.
    async fn search(
        &self,
        query: &SearchQuery,
        credentials: Option<&ScopedCredentials>,
    ) -> Result<ProviderResponse, SearchError>;
}

/// Custom Search client configuration.
#[derive(Debug, Clone)]
pub struct GoogleSearchConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for GoogleSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            timeout: Duration::from_secs(10),
            user_agent: format!("toolgate/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// reqwest-backed [`SearchProvider`].
#[derive(Debug, Clone)]
pub struct GoogleSearchClient {
    client: Client,
    endpoint: String,
}

impl GoogleSearchClient {
    pub fn new(config: GoogleSearchConfig) -> Result<Self, SearchError> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(SearchError::ClientBuild)?;

        Ok(Self {
            client,
            endpoint: config.endpoint,
        })
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchClient {
    async fn search(
        &self,
        query: &SearchQuery,
        credentials: Option<&ScopedCredentials>,
    ) -> Result<ProviderResponse, SearchError> {
        let mut params: Vec<(&str, String)> = vec![
            ("q", query.query.clone()),
            ("num", query.num.to_string()),
            ("start", query.start.to_string()),
        ];
        if let Some(creds) = credentials {
            if let Some(key) = &creds.provider_api_key {
                params.push(("key", key.expose().to_string()));
            }
            if let Some(cx) = &creds.provider_client_id {
                params.push(("cx", cx.expose().to_string()));
            }
        }

        let timer = Timer::start();
        async {
            let response = self
                .client
                .get(&self.endpoint)
                .query(&params)
                .send()
                .await
                .map_err(|e| SearchError::Request(e.without_url()))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| SearchError::Request(e.without_url()))?;
            debug!(status, duration_ms = timer.elapsed_ms(), "Search provider replied");

            Ok(ProviderResponse { status, body })
        }
        .instrument(provider_span("google", "search"))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::Credential;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GoogleSearchClient {
        GoogleSearchClient::new(GoogleSearchConfig {
            endpoint: format!("{}/customsearch/v1", server.uri()),
            ..Default::default()
        })
        .unwrap()
    }

    fn query() -> SearchQuery {
        SearchQuery {
            query: "rust".to_string(),
            num: 3,
            start: 1,
        }
    }

    #[tokio::test]
    async fn test_sends_query_and_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customsearch/v1"))
            .and(query_param("q", "rust"))
            .and(query_param("num", "3"))
            .and(query_param("start", "1"))
            .and(query_param("key", "K"))
            .and(query_param("cx", "C"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items":[]}"#))
            .expect(1)
            .mount(&server)
            .await;

        let creds = ScopedCredentials {
            provider_api_key: Some(Credential::new("K")),
            provider_client_id: Some(Credential::new("C")),
        };
        let response = client_for(&server)
            .search(&query(), Some(&creds))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"items":[]}"#);
    }

    #[tokio::test]
    async fn test_error_status_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let response = client_for(&server).search(&query(), None).await.unwrap();
        assert_eq!(response.status, 403);
        assert_eq!(response.body, "forbidden");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_request_error() {
        let client = GoogleSearchClient::new(GoogleSearchConfig {
            endpoint: "http://127.0.0.1:1/customsearch/v1".to_string(),
            timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();

        let err = client.search(&query(), None).await.unwrap_err();
        assert!(matches!(err, SearchError::Request(_)));
    }

    #[tokio::test]
    async fn test_request_error_does_not_carry_credentials() {
        let client = GoogleSearchClient::new(GoogleSearchConfig {
            endpoint: "http://127.0.0.1:1/customsearch/v1".to_string(),
            timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();
        let creds = ScopedCredentials {
            provider_api_key: Some(Credential::new("GKEY-SECRET")),
            provider_client_id: Some(Credential::new("CSI-SECRET")),
        };

        let err = client.search(&query(), Some(&creds)).await.unwrap_err();
        let rendered = format!("{err} {err:?}");
        assert!(!rendered.contains("GKEY-SECRET"), "{rendered}");
        assert!(!rendered.contains("CSI-SECRET"), "{rendered}");
        assert!(!rendered.contains("key="), "{rendered}");
    }
}
