use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

// ── Wire types ──

/// Outbound request body for the assistant endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct QueryPayload {
    pub query: String,
    pub files: Vec<PayloadFile>,
    pub options: RequestOptions,
}

/// One included file's contribution to the request. Order mirrors the
/// selection; `size` is null on the wire when unknown.
#[derive(Debug, Clone, Serialize)]
pub struct PayloadFile {
    pub path: String,
    pub size: Option<u64>,
    pub content: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestOptions {
    pub allow_pseudocode: bool,
    pub tone: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    assistant: Option<String>,
    error: Option<String>,
}

// ── Errors ──

/// Request-level failures. Transport problems (no response at all) stay
/// distinct from errors the server reported; the Display form is exactly
/// what gets appended to the conversation log.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server error: {0}")]
    Server(String),
}

// ── Client ──

/// Thin blocking client for the assistant endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    endpoint: String,
    timeout_secs: u64,
}

impl ApiClient {
    pub fn new(endpoint: String, timeout_secs: u64) -> Self {
        Self {
            endpoint,
            timeout_secs,
        }
    }

    /// POST the payload and normalize every outcome.
    ///
    /// Non-2xx responses become `Server` errors, preferring the JSON
    /// `error` field, then the raw body, then the status line. A 2xx JSON
    /// body may still carry a server-reported `error`; a 2xx non-JSON body
    /// is treated as plain assistant text.
    pub fn send_query(&self, payload: &QueryPayload) -> Result<String, QueryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| QueryError::Network(e.to_string()))?;

        let response = client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .map_err(|e| QueryError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| QueryError::Network(e.to_string()))?;

        if !status.is_success() {
            let msg = serde_json::from_str::<ApiResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| {
                    if body.trim().is_empty() {
                        status.to_string()
                    } else {
                        body.clone()
                    }
                });
            return Err(QueryError::Server(msg));
        }

        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(parsed) => {
                if let Some(err) = parsed.error {
                    Err(QueryError::Server(err))
                } else {
                    Ok(parsed.assistant.unwrap_or_default())
                }
            }
            Err(_) => Ok(body),
        }
    }
}
