use super::types::{AskError, AskRequest, AskResponse};
use crate::upstream::{UpstreamClient, UpstreamError};
use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn UpstreamClient>,
}

impl AppState {
    pub fn new(upstream: Arc<dyn UpstreamClient>) -> Self {
        Self { upstream }
    }
}

/// `POST /ask`: relays one question and shapes the answer.
///
/// Unparseable bodies are treated like a missing question, so the caller
/// always gets the same 400 payload.
#[instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AskError> {
    let question = match payload {
        Ok(Json(AskRequest {
            question: Some(question),
        })) if !question.is_empty() => question,
        Ok(_) => {
            warn!("Rejected request without a question");
            return Err(AskError::MissingQuestion);
        }
        Err(rejection) => {
            warn!("Rejected unreadable request body: {}", rejection);
            return Err(AskError::MissingQuestion);
        }
    };

    info!("Question received: {:?}", question);

    match state.upstream.ask(&question).await {
        Ok(reply) => {
            info!(tokens = %reply.tokens_used, "Upstream answered successfully");
            Ok(Json(AskResponse::new(reply, Utc::now())))
        }
        Err(err) => {
            match &err {
                UpstreamError::Rejected { status, body } => {
                    error!(status, %body, "Upstream rejected the question");
                }
                UpstreamError::Timeout { timeout_ms } => {
                    error!(timeout_ms, "Upstream timed out");
                }
                UpstreamError::Transport(message) => {
                    error!("Connection to upstream failed: {}", message);
                }
            }
            Err(err.into())
        }
    }
}
