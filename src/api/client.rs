//! HTTP client for the classification API.
//!
//! Uses the synchronous `ureq` client. ureq reports non-2xx answers as
//! `Error::Status` and connection problems as `Error::Transport`, which maps
//! one-to-one onto [`ApiError`] without inspecting message text.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::types::status_message;
use super::{AnalysisRequest, AnalysisResult, ApiError, ClassificationApi};
use crate::config::ApiConfig;

/// Synchronous classification API client.
#[derive(Debug, Clone)]
pub struct HttpApi {
    agent: ureq::Agent,
    base_url: String,
    health_timeout: Option<Duration>,
}

impl HttpApi {
    /// Build a client from the resolved config.
    pub fn from_config(config: &ApiConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = config.detect_timeout() {
            builder = builder.timeout(timeout);
        }

        Self {
            agent: builder.build(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            health_timeout: config.health_timeout(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl ClassificationApi for HttpApi {
    fn health(&self) -> Result<(), ApiError> {
        let mut request = self.agent.get(&self.url("/health"));
        if let Some(timeout) = self.health_timeout {
            request = request.timeout(timeout);
        }

        match request.call() {
            Ok(_) => Ok(()),
            Err(e) => Err(classify(e)),
        }
    }

    fn detect(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ApiError> {
        let response = self
            .agent
            .post(&self.url("/detect"))
            .send_json(request)
            .map_err(classify)?;

        // A read failure is the connection's fault; only a body that arrived
        // intact and fails to parse is the server's.
        let body = response
            .into_string()
            .map_err(|e| ApiError::Transport(format!("failed reading response body: {e}")))?;
        let body: Value = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("body is not JSON: {e}")))?;

        AnalysisResult::from_value(&body)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Map a ureq failure onto the API error taxonomy.
fn classify(error: ureq::Error) -> ApiError {
    match error {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().ok();
            debug!(status, body = body.as_deref().unwrap_or(""), "API returned an error status");
            ApiError::Status {
                status,
                message: status_message(status, body.as_deref()),
            }
        }
        ureq::Error::Transport(transport) => ApiError::Transport(transport.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
