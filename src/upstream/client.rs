use super::types::*;
use crate::{Result, config::UpstreamConfig};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, warn};

const TCP_KEEPALIVE: Duration = Duration::from_secs(60);

#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Sends one question upstream. Never retries.
    async fn ask(&self, question: &str) -> std::result::Result<UpstreamReply, UpstreamError>;
}

/// reqwest-backed client for the chatbot endpoint.
///
/// The inner `reqwest::Client` pools connections, so one instance is shared
/// by every inbound request.
pub struct HttpUpstreamClient {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl HttpUpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs);

        builder = if config.keep_alive {
            builder.tcp_keepalive(TCP_KEEPALIVE)
        } else {
            builder.pool_max_idle_per_host(0)
        };

        let client = builder.build()?;

        if config.accept_invalid_certs {
            warn!(
                "TLS certificate validation is disabled for upstream {}",
                config.url
            );
        }

        Ok(Self { client, config })
    }

    fn classify(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }
        } else {
            UpstreamError::Transport(error_chain(&err))
        }
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn ask(&self, question: &str) -> std::result::Result<UpstreamReply, UpstreamError> {
        let request = UpstreamRequest::new(question, &self.config);

        debug!("Posting question to {}", self.config.url);

        let response = self
            .client
            .post(&self.config.url)
            .header("token", &self.config.token)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        debug!("Upstream replied with status {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(UpstreamError::Rejected {
                status: status.as_u16(),
                body: body_value(&body),
            });
        }

        Ok(UpstreamReply::from_body(&body))
    }
}

/// Joins an error with all of its sources, e.g.
/// `error sending request: client error (Connect): connection refused`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
