//! `search_google_tool`: privileged web search.

use super::google::{SearchError, SearchProvider, SearchQuery};
use super::Tool;
use crate::context::RequestContext;
use crate::gate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use toolgate_common_log::spans::{record_error, tool_span};
use tracing::{error, info, Instrument};

/// Registered name of the search tool.
pub const SEARCH_TOOL_NAME: &str = "search_google_tool";

/// Upper bound the provider accepts for `num`.
pub const MAX_RESULTS_PER_PAGE: u8 = 10;

const DESCRIPTION: &str = "Search Google using the Custom Search API. Returns the status code \
and either the search results or an error string. `num` cannot exceed 10; for more results run \
several searches, incrementing `start` by 10 each time.";

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default = "default_num")]
    num: i64,
    #[serde(default = "default_start")]
    start: i64,
    #[serde(default)]
    filter: Option<String>,
}

fn default_num() -> i64 {
    i64::from(MAX_RESULTS_PER_PAGE)
}

fn default_start() -> i64 {
    1
}

impl SearchArgs {
    fn to_query(&self) -> SearchQuery {
        let num = self.num.clamp(1, i64::from(MAX_RESULTS_PER_PAGE));
        SearchQuery {
            query: self.query.clone(),
            num: u8::try_from(num).unwrap_or(MAX_RESULTS_PER_PAGE),
            start: u32::try_from(self.start.max(1)).unwrap_or(u32::MAX),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct ProviderBody {
    #[serde(default)]
    items: Option<Vec<SearchResult>>,
}

/// Web search backed by a [`SearchProvider`].
#[derive(Clone)]
pub struct SearchGoogleTool {
    provider: Arc<dyn SearchProvider>,
}

impl SearchGoogleTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    async fn run(&self, context: &RequestContext, arguments: Value) -> (String, &'static str) {
        if let Some(envelope) = gate::authorize(context).into_envelope() {
            return (envelope, "denied");
        }

        let args: SearchArgs = match serde_json::from_value(arguments) {
            Ok(args) => args,
            Err(e) => {
                let body = json!({
                    "status_code": 400,
                    "error": format!("Invalid arguments: {e}"),
                });
                return (body.to_string(), "invalid_arguments");
            }
        };

        let query = args.to_query();
        info!(
            query = %query.query,
            num = query.num,
            start = query.start,
            "Starting google search"
        );

        match self.provider.search(&query, context.credentials()).await {
            Ok(response) => {
                let shaped = shape_response(response.status, &response.body, args.filter.as_deref());
                let outcome = if response.status == 200 { "ok" } else { "provider_error" };
                (shaped.to_string(), outcome)
            }
            Err(e) => {
                error!(
                    query = %query.query,
                    num = query.num,
                    start = query.start,
                    error = %e,
                    "Error with google search"
                );
                record_error(&e);
                (failure(500, &e).to_string(), "transport_error")
            }
        }
    }
}

#[async_trait]
impl Tool for SearchGoogleTool {
    fn name(&self) -> &str {
        SEARCH_TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query, as a concise 3-4 word search term. Ex: 'Hotels in New York'"
                },
                "num": {
                    "type": "integer",
                    "default": 10,
                    "minimum": 1,
                    "maximum": 10,
                    "description": "Number of results to fetch (max 10 per request)."
                },
                "start": {
                    "type": "integer",
                    "default": 1,
                    "minimum": 1,
                    "description": "Starting index of the results, typically incremented by 10."
                },
                "filter": {
                    "type": "string",
                    "description": "Optional site filter, e.g. 'example.com'."
                }
            },
            "required": ["query"]
        })
    }

    async fn call(&self, context: &RequestContext, arguments: Value) -> String {
        let span = tool_span(SEARCH_TOOL_NAME);
        let (body, outcome) = self.run(context, arguments).instrument(span.clone()).await;
        span.record("outcome", outcome);
        body
    }
}

/// Turn a raw provider reply into the tool's result document.
pub fn shape_response(status: u16, body: &str, filter: Option<&str>) -> Value {
    if status != 200 {
        return json!({
            "status_code": status,
            "error": format!("Search request failed: {body}"),
        });
    }

    let parsed: ProviderBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => return failure(500, &SearchError::Decode(e)),
    };

    let mut results = parsed.items.unwrap_or_default();
    if let Some(site) = filter.filter(|f| !f.is_empty()) {
        results.retain(|r| r.link.contains(site));
    }

    json!({
        "status_code": status,
        "data": {
            "total_results": results.len(),
            "results": results,
        }
    })
}

fn failure(status: u16, error: &SearchError) -> Value {
    json!({
        "status_code": status,
        "error": format!("Search request failed: {error}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AccessDecision, DenialReason, ScopedCredentials, ACCESS_DENIED_MESSAGE};
    use crate::secret::Credential;
    use crate::tools::google::ProviderResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider double that records every call.
    #[derive(Default)]
    struct RecordingProvider {
        calls: AtomicUsize,
        last: Mutex<Option<(SearchQuery, Option<ScopedCredentials>)>>,
        reply: Mutex<Option<ProviderResponse>>,
    }

    impl RecordingProvider {
        fn replying(status: u16, body: &str) -> Arc<Self> {
            let provider = Self::default();
            *provider.reply.lock().unwrap() = Some(ProviderResponse {
                status,
                body: body.to_string(),
            });
            Arc::new(provider)
        }
    }

    #[async_trait]
    impl SearchProvider for RecordingProvider {
        async fn search(
            &self,
            query: &SearchQuery,
            credentials: Option<&ScopedCredentials>,
        ) -> Result<ProviderResponse, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some((query.clone(), credentials.cloned()));
            Ok(self.reply.lock().unwrap().clone().unwrap_or(ProviderResponse {
                status: 200,
                body: "{}".to_string(),
            }))
        }
    }

    fn granted_with_credentials() -> RequestContext {
        let mut ctx = RequestContext::with_request_id("req-search");
        ctx.record_decision(AccessDecision::granted(Credential::new("abc123")))
            .unwrap();
        ctx.scope_credentials(ScopedCredentials {
            provider_api_key: Some(Credential::new("K")),
            provider_client_id: Some(Credential::new("C")),
        })
        .unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_denied_call_never_reaches_provider() {
        let provider = RecordingProvider::replying(200, "{}");
        let tool = SearchGoogleTool::new(provider.clone());

        let mut ctx = RequestContext::new();
        ctx.record_decision(AccessDecision::denied(DenialReason::MissingCredential))
            .unwrap();

        let out: Value = serde_json::from_str(&tool.call(&ctx, json!({"query": "x"})).await).unwrap();
        assert_eq!(out["status"], "error");
        assert_eq!(out["error"], ACCESS_DENIED_MESSAGE);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unchecked_call_is_denied() {
        let provider = RecordingProvider::replying(200, "{}");
        let tool = SearchGoogleTool::new(provider.clone());

        let out: Value =
            serde_json::from_str(&tool.call(&RequestContext::new(), json!({"query": "x"})).await)
                .unwrap();
        assert_eq!(out["error"], gate::UNAUTHENTICATED_MESSAGE);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_granted_call_uses_scoped_credentials_and_defaults() {
        let provider = RecordingProvider::replying(
            200,
            r#"{"items":[{"title":"T","link":"https://example.com/a","snippet":"S"}]}"#,
        );
        let tool = SearchGoogleTool::new(provider.clone());

        let out: Value = serde_json::from_str(
            &tool
                .call(&granted_with_credentials(), json!({"query": "rust"}))
                .await,
        )
        .unwrap();

        assert_eq!(out["status_code"], 200);
        assert_eq!(out["data"]["total_results"], 1);
        assert_eq!(out["data"]["results"][0]["link"], "https://example.com/a");

        let (query, creds) = provider.last.lock().unwrap().clone().unwrap();
        assert_eq!(query.num, 10);
        assert_eq!(query.start, 1);
        let creds = creds.unwrap();
        assert_eq!(creds.provider_api_key.unwrap().expose(), "K");
        assert_eq!(creds.provider_client_id.unwrap().expose(), "C");
    }

    #[tokio::test]
    async fn test_num_is_clamped() {
        let provider = RecordingProvider::replying(200, "{}");
        let tool = SearchGoogleTool::new(provider.clone());

        tool.call(&granted_with_credentials(), json!({"query": "q", "num": 50, "start": 0}))
            .await;
        let (query, _) = provider.last.lock().unwrap().clone().unwrap();
        assert_eq!(query.num, 10);
        assert_eq!(query.start, 1);
    }

    #[tokio::test]
    async fn test_missing_query_is_reported() {
        let provider = RecordingProvider::replying(200, "{}");
        let tool = SearchGoogleTool::new(provider.clone());

        let out: Value =
            serde_json::from_str(&tool.call(&granted_with_credentials(), json!({})).await).unwrap();
        assert_eq!(out["status_code"], 400);
        assert!(out["error"].as_str().unwrap().starts_with("Invalid arguments"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_shape_applies_site_filter() {
        let body = r#"{"items":[
            {"title":"A","link":"https://example.com/1","snippet":"a"},
            {"title":"B","link":"https://other.org/2","snippet":"b"}
        ]}"#;
        let shaped = shape_response(200, body, Some("example.com"));
        assert_eq!(shaped["data"]["total_results"], 1);
        assert_eq!(shaped["data"]["results"][0]["title"], "A");
    }

    #[test]
    fn test_shape_without_items_is_empty() {
        let shaped = shape_response(200, r#"{"searchInformation":{}}"#, None);
        assert_eq!(shaped["data"]["total_results"], 0);
        assert_eq!(shaped["data"]["results"], json!([]));
    }

    #[test]
    fn test_shape_error_status() {
        let shaped = shape_response(403, "quota exceeded", None);
        assert_eq!(shaped["status_code"], 403);
        assert_eq!(shaped["error"], "Search request failed: quota exceeded");
        assert!(shaped.get("data").is_none());
    }

    #[test]
    fn test_shape_undecodable_success_body() {
        let shaped = shape_response(200, "<html>", None);
        assert_eq!(shaped["status_code"], 500);
        assert!(shaped["error"]
            .as_str()
            .unwrap()
            .starts_with("Search request failed: invalid response body"));
    }
}
