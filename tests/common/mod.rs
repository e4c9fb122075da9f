#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use bot_bridge::{
    config::UpstreamConfig,
    server::{handlers::AppState, router},
    upstream::{HttpUpstreamClient, UpstreamClient, UpstreamError, UpstreamReply},
};
use serde_json::{Number, Value};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt};
use tower::ServiceExt; // for `oneshot`

pub const UPSTREAM_PATH: &str = "/api/chatbot/ask";
pub const TEST_TOKEN: &str = "test-token";

/// Upstream stub that returns a canned outcome and records every question
pub struct MockUpstream {
    outcome: Result<UpstreamReply, UpstreamError>,
    questions: Mutex<Vec<String>>,
}

impl MockUpstream {
    pub fn answering(output_text: &str, tokens_used: u64) -> Self {
        Self {
            outcome: Ok(UpstreamReply {
                output_text: output_text.to_string(),
                tokens_used: Number::from(tokens_used),
            }),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: UpstreamError) -> Self {
        Self {
            outcome: Err(err),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamClient for MockUpstream {
    async fn ask(&self, question: &str) -> Result<UpstreamReply, UpstreamError> {
        self.questions.lock().unwrap().push(question.to_string());
        self.outcome.clone()
    }
}

/// Upstream configuration pointing at a local mock server
pub fn upstream_config(base_url: &str) -> UpstreamConfig {
    UpstreamConfig {
        url: format!("{}{}", base_url, UPSTREAM_PATH),
        token: TEST_TOKEN.to_string(),
        timeout_ms: 2_000,
        ..Default::default()
    }
}

pub fn app_with(upstream: Arc<dyn UpstreamClient>) -> Router {
    router(AppState::new(upstream))
}

pub fn app_for(config: UpstreamConfig) -> Router {
    let client = HttpUpstreamClient::new(config).unwrap();
    app_with(Arc::new(client))
}

/// POSTs `body` to `/ask` and returns the status and JSON body
pub async fn post_ask(app: Router, body: &str, content_type: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri("/ask");
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

pub async fn post_question(app: Router, body: &Value) -> (StatusCode, Value) {
    post_ask(app, &body.to_string(), Some("application/json")).await
}

/// Reads one HTTP/1.1 request (head plus `content-length` body) off a raw stream
pub async fn read_request<S: AsyncRead + Unpin>(stream: &mut S) -> std::io::Result<Vec<u8>> {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(request);
        }
        request.extend_from_slice(&chunk[..n]);

        if let Some(head_end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&request[..head_end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if request.len() >= head_end + 4 + content_length {
                return Ok(request);
            }
        }
    }
}

/// A complete `200 OK` JSON response with `connection: close`
pub fn json_response(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}
