use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde_json::{Value, json};
use tower::ServiceExt;

use thinkrelay_core::config::UpstreamConfig;
use thinkrelay_server::relay::{RelayOptions, StreamRelay};
use thinkrelay_server::server::{AppState, build_router};
use thinkrelay_server::storage::{HistoryDatabase, HistoryStore};
use thinkrelay_server::upstream::OllamaClient;

/// Serve a fake Ollama on an ephemeral port and return its base URL.
async fn spawn_ollama(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Fake backend whose generate endpoint returns `body` verbatim.
fn generate_returning(body: &'static str) -> Router {
    Router::new().route("/api/generate", post(move || async move { body }))
}

async fn app_state(base_url: &str) -> AppState {
    let client = OllamaClient::new(&UpstreamConfig {
        base_url: base_url.into(),
        ..UpstreamConfig::default()
    })
    .unwrap();
    let db = HistoryDatabase::open_in_memory().await.unwrap();
    AppState::new(StreamRelay::new(client, db, RelayOptions::default()))
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, String) {
    let resp = build_router(state.clone()).oneshot(request).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&body).into_owned())
}

async fn post_stream(state: &AppState, body: &str) -> (StatusCode, Vec<Value>) {
    let request = Request::post("/stream")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, text) = send(state, request).await;
    (status, parse_frames(&text))
}

/// Decode `data: {json}\n\n` frames.
fn parse_frames(text: &str) -> Vec<Value> {
    text.split("\n\n")
        .filter(|frame| !frame.is_empty())
        .map(|frame| {
            let data = frame
                .strip_prefix("data: ")
                .unwrap_or_else(|| panic!("not a data frame: {frame:?}"));
            serde_json::from_str(data).unwrap()
        })
        .collect()
}

async fn get_json(state: &AppState, uri: &str) -> (StatusCode, Value) {
    let (status, text) = send(state, Request::get(uri).body(Body::empty()).unwrap()).await;
    (status, serde_json::from_str(&text).unwrap())
}

async fn delete_json(state: &AppState, uri: &str) -> (StatusCode, Value) {
    let (status, text) = send(state, Request::delete(uri).body(Body::empty()).unwrap()).await;
    (status, serde_json::from_str(&text).unwrap())
}

// =============================================================================
// /stream
// =============================================================================

#[tokio::test]
async fn stream_splits_reasoning_from_answer_and_saves() {
    let url = spawn_ollama(generate_returning(concat!(
        "{\"response\":\"<think>\"}\n",
        "{\"response\":\"reasoning text\"}\n",
        "{\"response\":\"</think>\"}\n",
        "{\"response\":\"final answer\"}\n",
        "{\"response\":\"\",\"done\":true}\n",
    )))
    .await;
    let state = app_state(&url).await;

    let (status, frames) = post_stream(&state, r#"{"prompt":"hello"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        frames,
        vec![
            json!({"type": "status", "content": "Connected"}),
            json!({"type": "think_start"}),
            json!({"type": "think_content", "content": "reasoning text"}),
            json!({"type": "think_end"}),
            json!({"type": "content", "content": "final answer"}),
            json!({"type": "content", "content": ""}),
            json!({"type": "done"}),
        ]
    );

    let history = state.relay.store().list().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].prompt, "hello");
    assert_eq!(history[0].answer, "final answer");
    assert_eq!(history[0].reasoning, "reasoning text");
}

#[tokio::test]
async fn stream_uses_event_stream_content_type() {
    let url = spawn_ollama(generate_returning("{\"response\":\"hi\"}\n")).await;
    let state = app_state(&url).await;
    let request = Request::post("/stream")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"prompt":"p"}"#))
        .unwrap();

    let resp = build_router(state).oneshot(request).await.unwrap();

    let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"), "{content_type}");
}

#[tokio::test]
async fn upstream_500_yields_error_without_done() {
    let url = spawn_ollama(Router::new().route(
        "/api/generate",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR.into_response() }),
    ))
    .await;
    let state = app_state(&url).await;

    let (_, frames) = post_stream(&state, r#"{"prompt":"hello"}"#).await;

    assert_eq!(
        frames,
        vec![
            json!({"type": "status", "content": "Connected"}),
            json!({"type": "error", "content": "Error: Received status code 500"}),
        ]
    );
    assert!(state.relay.store().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_upstream_yields_connect_error() {
    let state = app_state(&dead_url().await).await;

    let (_, frames) = post_stream(&state, r#"{"prompt":"hello"}"#).await;

    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1]["type"], "error");
    let message = frames[1]["content"].as_str().unwrap();
    assert!(
        message.starts_with("Error: Could not connect to Ollama server: "),
        "{message}"
    );
}

#[tokio::test]
async fn malformed_line_is_reported_and_stream_continues() {
    let url = spawn_ollama(generate_returning(concat!(
        "{\"response\":\"a\"}\n",
        "this is not json\n",
        "\n",
        "{\"response\":\"b\"}\n",
    )))
    .await;
    let state = app_state(&url).await;

    let (_, frames) = post_stream(&state, r#"{"prompt":"p"}"#).await;

    let types: Vec<&str> = frames.iter().map(|f| f["type"].as_str().unwrap()).collect();
    assert_eq!(types, vec!["status", "content", "error", "content", "done"]);
    assert!(
        frames[2]["content"]
            .as_str()
            .unwrap()
            .starts_with("Error decoding response: ")
    );
    let history = state.relay.store().list().await.unwrap();
    assert_eq!(history[0].answer, "ab");
}

#[tokio::test]
async fn missing_prompt_defaults_to_empty() {
    let url = spawn_ollama(Router::new().route(
        "/api/generate",
        post(|axum::Json(body): axum::Json<Value>| async move {
            format!("{}\n", json!({ "response": body["prompt"] }))
        }),
    ))
    .await;
    let state = app_state(&url).await;

    let (_, frames) = post_stream(&state, "{}").await;

    assert_eq!(frames[1], json!({"type": "content", "content": ""}));
    let history = state.relay.store().list().await.unwrap();
    assert_eq!(history[0].prompt, "");
}

// =============================================================================
// /health
// =============================================================================

#[tokio::test]
async fn health_reports_ollama_version() {
    let url = spawn_ollama(Router::new().route(
        "/api/version",
        get(|| async { axum::Json(json!({"version": "0.5.7"})) }),
    ))
    .await;
    let state = app_state(&url).await;

    let (status, body) = get_json(&state, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "healthy", "ollama_version": {"version": "0.5.7"}})
    );
}

#[tokio::test]
async fn health_non_200_is_error() {
    let url = spawn_ollama(Router::new().route(
        "/api/version",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    ))
    .await;
    let state = app_state(&url).await;

    let (status, body) = get_json(&state, "/health").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"status": "error", "message": "Ollama server returned non-200 status"})
    );
}

#[tokio::test]
async fn health_unreachable_is_error() {
    let state = app_state(&dead_url().await).await;

    let (status, body) = get_json(&state, "/health").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({"status": "error", "message": "Could not connect to Ollama server"})
    );
}

// =============================================================================
// /history
// =============================================================================

#[tokio::test]
async fn history_lists_newest_first() {
    let state = app_state(&dead_url().await).await;
    let store = state.relay.store();
    store.append("first", "1", "r1").await.unwrap();
    store.append("second", "2", "").await.unwrap();

    let (status, body) = get_json(&state, "/history").await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["prompt"], "second");
    assert_eq!(entries[1]["prompt"], "first");
    assert_eq!(entries[1]["reasoning"], "r1");
    assert!(entries[0]["id"].is_i64());
    assert!(entries[0]["created_at"].is_i64());
}

#[tokio::test]
async fn delete_history_entry() {
    let state = app_state(&dead_url().await).await;
    let store = state.relay.store();
    let keep = store.append("keep", "", "").await.unwrap();
    let gone = store.append("gone", "", "").await.unwrap();

    let (status, body) = delete_json(&state, &format!("/history/{gone}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success"}));
    let ids: Vec<i64> = store.list().await.unwrap().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![keep]);
}

#[tokio::test]
async fn delete_unknown_history_entry_succeeds() {
    let state = app_state(&dead_url().await).await;
    state.relay.store().append("kept", "", "").await.unwrap();

    let (status, body) = delete_json(&state, "/history/424242").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success"}));
    assert_eq!(state.relay.store().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn clear_history_removes_everything() {
    let state = app_state(&dead_url().await).await;
    state.relay.store().append("a", "", "").await.unwrap();
    state.relay.store().append("b", "", "").await.unwrap();

    let (status, body) = delete_json(&state, "/history").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success"}));
    let (_, listed) = get_json(&state, "/history").await;
    assert_eq!(listed, json!([]));
}
