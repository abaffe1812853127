//! Credential values stay out of the logs when credential tracing is off,
//! even with every level enabled.

mod common;

use common::*;
use serde_json::json;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::Level;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCESS_KEY: &str = "GATEKEY-7f3a";
const WRONG_KEY: &str = "WRONGKEY-19c2";
const PROVIDER_KEY: &str = "GKEY-5d21";
const PROVIDER_CLIENT_ID: &str = "CSI-88be";

/// Shared buffer the fmt layer writes into.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn capture() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}

fn context() -> TestContext {
    let mut ctx = TestContext::new().with_keys(&[ACCESS_KEY]);
    ctx.config.logging.trace_credentials = false;
    ctx
}

fn assert_no_secrets(logs: &str) {
    for secret in [ACCESS_KEY, WRONG_KEY, PROVIDER_KEY, PROVIDER_CLIENT_ID] {
        assert!(!logs.contains(secret), "{secret} leaked into logs:\n{logs}");
    }
}

#[tokio::test]
async fn test_granted_search_logs_no_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let (logs, _guard) = capture();
    let router = context()
        .with_search_endpoint(format!("{}/customsearch/v1", server.uri()))
        .router();

    let payload = tool_payload(
        send(
            &router,
            search_request(
                Some(ACCESS_KEY),
                Some((PROVIDER_KEY, PROVIDER_CLIENT_ID)),
                json!({"query": "rust"}),
            ),
        )
        .await,
    )
    .await;
    assert_eq!(payload["status_code"], 200);

    let logs = logs.contents();
    assert!(logs.contains("Starting google search"), "{logs}");
    assert_no_secrets(&logs);
}

#[tokio::test]
async fn test_provider_failure_logs_no_credentials() {
    let (logs, _guard) = capture();
    // Default endpoint is unreachable.
    let router = context().router();

    let payload = tool_payload(
        send(
            &router,
            search_request(
                Some(ACCESS_KEY),
                Some((PROVIDER_KEY, PROVIDER_CLIENT_ID)),
                json!({"query": "rust"}),
            ),
        )
        .await,
    )
    .await;
    assert_eq!(payload["status_code"], 500);
    let error = payload["error"].as_str().unwrap();
    assert!(!error.contains(PROVIDER_KEY), "{error}");
    assert!(!error.contains(PROVIDER_CLIENT_ID), "{error}");

    let logs = logs.contents();
    assert!(logs.contains("Error with google search"), "{logs}");
    assert_no_secrets(&logs);
}

#[tokio::test]
async fn test_denied_request_logs_no_credentials() {
    let (logs, _guard) = capture();
    let router = context().router();

    let payload = tool_payload(
        send(
            &router,
            search_request(
                Some(WRONG_KEY),
                Some((PROVIDER_KEY, PROVIDER_CLIENT_ID)),
                json!({"query": "rust"}),
            ),
        )
        .await,
    )
    .await;
    assert_eq!(payload["status"], "error");

    assert_no_secrets(&logs.contents());
}
