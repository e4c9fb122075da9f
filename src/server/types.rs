use crate::upstream::{UpstreamError, UpstreamReply};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

pub const MISSING_QUESTION: &str = "La pregunta es obligatoria.";
pub const UPSTREAM_REJECTED: &str = "Error en el servidor de IA";
pub const UPSTREAM_TIMEOUT: &str = "La IA tardó demasiado en responder. Intenta de nuevo.";
pub const CONNECTION_FAILED: &str = "Fallo de conexión con el puente de IA";

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub success: bool,
    pub answer: String,
    pub meta: AskMeta,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskMeta {
    pub tokens: Number,
    /// ISO-8601, UTC, millisecond precision.
    pub timestamp: String,
}

impl AskResponse {
    pub fn new(reply: UpstreamReply, answered_at: DateTime<Utc>) -> Self {
        Self {
            success: true,
            answer: reply.output_text,
            meta: AskMeta {
                tokens: reply.tokens_used,
                timestamp: answered_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detalles: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mensaje: Option<String>,
}

impl ErrorResponse {
    fn failure(error: &str) -> Self {
        Self {
            success: Some(false),
            error: error.to_string(),
            detalles: None,
            mensaje: None,
        }
    }
}

/// Every way `POST /ask` can fail.
#[derive(Debug)]
pub enum AskError {
    MissingQuestion,
    Upstream(UpstreamError),
}

impl From<UpstreamError> for AskError {
    fn from(err: UpstreamError) -> Self {
        Self::Upstream(err)
    }
}

impl AskError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingQuestion => StatusCode::BAD_REQUEST,
            Self::Upstream(UpstreamError::Rejected { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Upstream(UpstreamError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Upstream(UpstreamError::Transport(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(self) -> ErrorResponse {
        match self {
            Self::MissingQuestion => ErrorResponse {
                success: None,
                error: MISSING_QUESTION.to_string(),
                detalles: None,
                mensaje: None,
            },
            Self::Upstream(UpstreamError::Rejected { body, .. }) => ErrorResponse {
                detalles: Some(body),
                ..ErrorResponse::failure(UPSTREAM_REJECTED)
            },
            Self::Upstream(UpstreamError::Timeout { .. }) => {
                ErrorResponse::failure(UPSTREAM_TIMEOUT)
            }
            Self::Upstream(UpstreamError::Transport(message)) => ErrorResponse {
                mensaje: Some(message),
                ..ErrorResponse::failure(CONNECTION_FAILED)
            },
        }
    }
}

impl IntoResponse for AskError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.body())).into_response()
    }
}
