use crate::config::UpstreamConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

/// Answer used when the upstream reply carries no usable `outputText`.
pub const FALLBACK_ANSWER: &str = "La IA no devolvió texto de respuesta.";

/// Body of the outbound POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamRequest {
    pub message: String,
    pub vista: String,
    #[serde(rename = "controladorOModulo")]
    pub controller: String,
}

impl UpstreamRequest {
    pub fn new(question: &str, config: &UpstreamConfig) -> Self {
        Self {
            message: question.to_string(),
            vista: config.vista.clone(),
            controller: config.controller.clone(),
        }
    }
}

/// A successful upstream answer with defaults already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub output_text: String,
    /// Relayed as the upstream sent it, integer or not.
    pub tokens_used: Number,
}

impl UpstreamReply {
    /// Reads `data.outputText` and `data.tokensUsed` from a 2xx body.
    ///
    /// The upstream schema is not enforced: a body that is not JSON, or that
    /// lacks either field, yields the fallback answer and zero tokens. A
    /// non-string `outputText` also yields the fallback answer.
    pub fn from_body(body: &[u8]) -> Self {
        let envelope: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        let data = envelope.get("data");

        let output_text = data
            .and_then(|d| d.get("outputText"))
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .unwrap_or(FALLBACK_ANSWER)
            .to_string();

        let tokens_used = match data.and_then(|d| d.get("tokensUsed")) {
            Some(Value::Number(tokens)) => tokens.clone(),
            _ => Number::from(0),
        };

        Self {
            output_text,
            tokens_used,
        }
    }
}

/// Why an outbound call produced no answer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-2xx status.
    #[error("upstream responded with status {status}")]
    Rejected { status: u16, body: Value },

    #[error("upstream did not respond within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Connection, DNS, TLS or any other failure without an upstream reply.
    #[error("{0}")]
    Transport(String),
}

/// Error bodies are relayed as JSON when they parse, otherwise as text.
pub fn body_value(body: &[u8]) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
