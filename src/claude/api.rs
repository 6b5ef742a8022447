//! Anthropic Messages API backend.

use std::env;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::BackendError;

/// Model requested when the config does not name one.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Public API endpoint root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.anthropic.com";

const API_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.3;

/// Error bodies are cut to this many characters before being reported.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Connection settings for [`run_api`].
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Key from the config file; the environment is consulted when absent.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [RequestMessage<'a>; 1],
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Resolve the API key: a non-blank configured key, else a non-blank
/// `ANTHROPIC_API_KEY`.
pub fn resolve_api_key(configured: Option<&str>) -> Result<String, BackendError> {
    if let Some(key) = configured {
        if !key.trim().is_empty() {
            return Ok(key.trim().to_string());
        }
    }

    if let Ok(key) = env::var(API_KEY_ENV_VAR) {
        if !key.trim().is_empty() {
            return Ok(key.trim().to_string());
        }
    }

    Err(BackendError::AuthMissing)
}

/// Send `prompt` as a single user message and return the trimmed text of the
/// first content block, verbatim.
pub async fn run_api(settings: &ApiSettings, prompt: &str) -> Result<String, BackendError> {
    let api_key = resolve_api_key(settings.api_key.as_deref())?;

    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| BackendError::SdkMissing(e.to_string()))?;

    let url = format!("{}/v1/messages", settings.base_url.trim_end_matches('/'));
    let request = MessagesRequest {
        model: &settings.model,
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
        messages: [RequestMessage {
            role: "user",
            content: prompt,
        }],
    };

    info!("Calling Anthropic model {}", settings.model);

    let response = client
        .post(&url)
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .json(&request)
        .send()
        .await
        .map_err(|e| BackendError::Upstream(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BackendError::UpstreamStatus {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    let body: MessagesResponse = response
        .json()
        .await
        .map_err(|e| BackendError::Upstream(format!("invalid response body: {e}")))?;

    let text = body
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or_else(|| BackendError::Upstream("response contained no text".to_string()))?;

    debug!("API returned {} characters", text.len());

    Ok(text.trim().to_string())
}
