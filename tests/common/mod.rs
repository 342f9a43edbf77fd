//! In-process chat-completions server used as a mock backend

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use quill::audit::AuditLog;
use quill::providers::LocalClient;
use quill::{GenerationService, StyleRegistry};

#[derive(Clone)]
struct MockState
{   status: StatusCode
  , body: String
  , delay: Duration
  , calls: Arc<AtomicUsize>
  , requests: Arc<Mutex<Vec<Value>>>
}

/// Handle on a running mock backend
#[derive(Clone)]
pub struct MockBackend
{   pub url: String
  , calls: Arc<AtomicUsize>
  , requests: Arc<Mutex<Vec<Value>>>
}

impl MockBackend
{   pub fn calls(&self) -> usize
    {   self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<Value>
    {   self.requests.lock().ok()?.last().cloned()
    }
}

async fn complete(
  State(state): State<MockState>
, Json(payload): Json<Value>
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String)
{   state.calls.fetch_add(1, Ordering::SeqCst);
    if let Ok(mut requests) = state.requests.lock()
    {   requests.push(payload);
    }
    if !state.delay.is_zero()
    {   tokio::time::sleep(state.delay).await;
    }
    ( state.status
    , [(header::CONTENT_TYPE, "application/json")]
    , state.body.clone()
    )
}

/// Start a backend answering every call with `status` and `body`
pub async fn spawn_backend(
  status: StatusCode
, body: impl Into<String>
, delay: Duration
) -> MockBackend
{   let calls = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState
    {   status
      , body: body.into()
      , delay
      , calls: calls.clone()
      , requests: requests.clone()
    };

    let app = Router::new()
      .route("/v1/chat/completions", post(complete))
      .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
      .await
      .expect("bind mock backend");
    let addr = listener.local_addr().expect("mock backend address");
    tokio::spawn(async move {
      let _ = axum::serve(listener, app).await;
    });

    MockBackend
    {   url: format!("http://{}/v1/chat/completions", addr)
      , calls
      , requests
    }
}

/// Backend replying with one well-formed choice
pub async fn spawn_content_backend(content: &str) -> MockBackend
{   spawn_backend(
      StatusCode::OK,
      completion_body(content).to_string(),
      Duration::ZERO
    ).await
}

pub fn completion_body(content: &str) -> Value
{   json!({
      "id": "chatcmpl-1",
      "object": "chat.completion",
      "choices": [
        {   "index": 0
          , "message": { "role": "assistant", "content": content }
          , "finish_reason": "stop"
        }
      ]
    })
}

/// URL of a port nothing listens on
pub fn refused_url() -> String
{   let listener = std::net::TcpListener::bind("127.0.0.1:0")
      .expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{}/v1/chat/completions", addr)
}

pub fn service_for(
  backend_url: &str
, timeout: Duration
, audit_path: &Path
) -> GenerationService
{   let backend = LocalClient::new(backend_url, timeout)
      .expect("build client");
    GenerationService::new(
      Arc::new(StyleRegistry::default()),
      backend,
      AuditLog::spawn(audit_path),
      "tinyllama"
    )
}
