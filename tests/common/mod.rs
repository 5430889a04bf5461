//! In-process mock of the Membrane API plus a recorder of every request it sees.

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    Router,
};
use membrane_tools::MembraneConfig;
use reqwest::Url;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_TOKEN: &str = "test-token";

/// Tool names in catalog order.
pub const EXPECTED_TOOL_NAMES: [&str; 10] = [
    "list-connections",
    "search-connectors",
    "search-tools",
    "run-tool",
    "request-connection",
    "check-connection-result",
    "create-agent-session",
    "get-agent-session",
    "send-agent-message",
    "abort-agent-session",
];

/// One request as it reached the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Knobs for scripted behaviour.
#[derive(Debug, Clone, Default)]
pub struct MockOptions {
    /// Number of `GET /agent/sessions/{id}` answers reporting `running` before `idle`.
    pub running_polls: usize,
    /// Number of `GET /connection-requests/{id}` answers reporting `pending` before `success`.
    pub pending_polls: usize,
    /// Delay applied to every authenticated request.
    pub delay: Option<Duration>,
}

struct MockState {
    options: MockOptions,
    requests: Mutex<Vec<RecordedRequest>>,
    session_polls: AtomicUsize,
    connection_polls: AtomicUsize,
}

pub struct MockServer {
    pub url: String,
    state: Arc<MockState>,
}

impl MockServer {
    pub async fn start() -> Self {
        Self::start_with(MockOptions::default()).await
    }

    pub async fn start_with(options: MockOptions) -> Self {
        let state = Arc::new(MockState {
            options,
            requests: Mutex::new(Vec::new()),
            session_polls: AtomicUsize::new(0),
            connection_polls: AtomicUsize::new(0),
        });
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    /// Config carrying the token the mock accepts.
    pub fn config(&self) -> MembraneConfig {
        self.config_with_token(TEST_TOKEN)
    }

    pub fn config_with_token(&self, token: &str) -> MembraneConfig {
        MembraneConfig::new(token).with_api_url(self.url.clone())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().expect("requests lock").len()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("at least one request")
    }
}

/// Valid arguments for every catalog tool.
pub fn sample_arguments(name: &str) -> Value {
    match name {
        "list-connections" => json!({}),
        "search-connectors" => json!({ "q": "slack" }),
        "search-tools" => json!({ "connectionId": "conn_1", "intent": "send a message" }),
        "run-tool" => json!({ "actionId": "action_1", "connectionId": "conn_1" }),
        "request-connection" => json!({ "connectorId": "slack" }),
        "check-connection-result" => json!({ "requestId": "req_1" }),
        "create-agent-session" => json!({ "prompt": "Build a Slack connector" }),
        "get-agent-session" => json!({ "sessionId": "session_1" }),
        "send-agent-message" => json!({ "sessionId": "session_1", "input": "Add a send action" }),
        "abort-agent-session" => json!({ "sessionId": "session_1" }),
        other => panic!("no sample arguments for {}", other),
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();

    // Health check (no auth required)
    if path == "/health" {
        return Json(json!({ "status": "ok" })).into_response();
    }

    let query: Vec<(String, String)> = Url::parse(&format!("http://mock{}", uri))
        .map(|url| url.query_pairs().into_owned().collect())
        .unwrap_or_default();
    let parsed_body: Option<Value> = if body.is_empty() {
        None
    } else {
        serde_json::from_slice(&body).ok()
    };
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state
        .requests
        .lock()
        .expect("requests lock")
        .push(RecordedRequest {
            method: method.to_string(),
            path: path.clone(),
            query: query.clone(),
            body: parsed_body.clone(),
            authorization: authorization.clone(),
        });

    let expected = format!("Bearer {}", TEST_TOKEN);
    if authorization.as_deref() != Some(expected.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response();
    }

    if let Some(delay) = state.options.delay {
        tokio::time::sleep(delay).await;
    }

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let payload = match (method.as_str(), segments.as_slice()) {
        ("GET", ["connections"]) => json!([
            { "id": "conn_1", "name": "Slack", "connectorId": "slack", "status": "active" },
            { "id": "conn_2", "name": "HubSpot", "connectorId": "hubspot", "status": "active" },
        ]),
        ("GET", ["search"]) => json!([{ "id": "connector_1", "name": "Slack", "type": "connector" }]),
        ("GET", ["actions"]) => json!([
            { "id": "action_1", "name": "send-message", "description": "Send a message" }
        ]),
        ("POST", ["actions", _, "run"]) => json!({ "success": true, "output": { "result": "ok" } }),
        ("POST", ["connection-requests"]) => json!({
            "id": "req_1",
            "url": "https://example.com/auth",
            "status": "pending",
        }),
        ("GET", ["connection-requests", _]) => {
            let seen = state.connection_polls.fetch_add(1, Ordering::SeqCst);
            let status = if seen < state.options.pending_polls {
                "pending"
            } else {
                "success"
            };
            json!({ "id": "req_1", "status": status })
        }
        ("POST", ["agent", "sessions"]) => json!({ "id": "session_1", "status": "running" }),
        ("GET", ["agent", "sessions", _]) => {
            let seen = state.session_polls.fetch_add(1, Ordering::SeqCst);
            let status = if seen < state.options.running_polls {
                "running"
            } else {
                "idle"
            };
            json!({ "id": "session_1", "status": status })
        }
        ("POST", ["agent", "sessions", _, "message"]) => {
            json!({ "id": "session_1", "status": "running" })
        }
        ("POST", ["agent", "sessions", _, "interrupt"]) => {
            json!({ "id": "session_1", "status": "aborted" })
        }
        _ => {
            let query: serde_json::Map<String, Value> = query
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            json!({
                "echo": true,
                "method": method.as_str(),
                "path": path,
                "query": query,
                "body": parsed_body,
            })
        }
    };

    Json(payload).into_response()
}
