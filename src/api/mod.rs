pub mod auth;
pub mod guest;
pub mod http;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Args;
use crate::models::doctor::DoctorSummary;

/// Body of `POST /api/chat`. Coordinate fields are serialized even when
/// unresolved: the backend expects explicit nulls, not missing keys.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// One segment of a structured assistant reply. A tag outside this set fails
/// deserialization rather than being silently dropped.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
pub enum ResponsePart {
    #[serde(rename = "text")]
    Text(String),
    #[serde(rename = "doctors")]
    Doctors(Vec<DoctorSummary>),
}

/// Chat endpoint response body. Successful replies carry `bot_response_parts`;
/// failures carry an optional explanation in `message`. A reply flagged
/// successful but missing the parts array is treated as a failure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    pub bot_response_parts: Option<Vec<ResponsePart>>,
    pub message: Option<String>,
}

/// Failures surfaced by the REST clients. `Unauthorized` stays separate from
/// the other status codes because it must trigger re-authentication instead
/// of an in-chat fallback.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication rejected (401)")]
    Unauthorized,
    #[error("backend returned status {status}")]
    Status { status: u16, message: Option<String> },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response body: {0}")]
    Payload(#[from] serde_json::Error),
}

/// A source of assistant replies. Signed-in sessions talk to the SymptoSeek
/// backend over HTTP; sessions without a token get local canned guidance.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError>;
}

pub fn new_backend(args: &Args) -> Result<Arc<dyn ChatBackend>, ApiError> {
    let timeout = Duration::from_secs(args.request_timeout_secs);
    match args.token.as_deref().filter(|token| !token.is_empty()) {
        Some(token) => {
            info!("Chat backend: SymptoSeek API at {}", args.api_base_url);
            let backend = http::HttpChatBackend::new(args.api_base_url.as_str(), token, timeout)?;
            Ok(Arc::new(backend))
        }
        None => {
            info!("Chat backend: guest mode (no session token configured)");
            Ok(Arc::new(guest::GuestChatBackend::new()))
        }
    }
}
