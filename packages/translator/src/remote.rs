//! Translator backed by a chat-completion HTTP endpoint (Anthropic Messages
//! API shape by default).

use crate::error::{TranslateError, TranslateResult};
use crate::{prompt, response, TranslationOutcome, TranslationRequest, Translator};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// How the credential is presented to the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthScheme {
    /// `x-api-key: <key>`
    #[default]
    ApiKey,
    /// `Authorization: Bearer <key>`
    Bearer,
}

#[derive(Debug, Clone)]
pub struct RemoteOptions {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub auth: AuthScheme,
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            auth: AuthScheme::ApiKey,
        }
    }
}

/// LLM translator
///
/// One request per instruction, no retries: a failure is reported to the
/// caller as a [`TranslateError`] and it decides what happens next.
#[derive(Clone)]
pub struct RemoteTranslator {
    client: Client,
    options: RemoteOptions,
}

impl std::fmt::Debug for RemoteTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // keeps the credential out of debug output
        f.debug_struct("RemoteTranslator")
            .field("endpoint", &self.options.endpoint)
            .field("model", &self.options.model)
            .finish_non_exhaustive()
    }
}

impl RemoteTranslator {
    /// Build a translator, rejecting a missing or malformed key up front
    pub fn new(api_key: &str, options: RemoteOptions) -> TranslateResult<Self> {
        let headers = auth_headers(api_key, options.auth)?;

        let client = Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .map_err(|err| TranslateError::config(format!("could not build HTTP client: {err}")))?;

        Ok(Self { client, options })
    }

    pub fn options(&self) -> &RemoteOptions {
        &self.options
    }

    async fn send(&self, prompt: String) -> TranslateResult<String> {
        let body = MessagesRequest {
            model: &self.options.model,
            max_tokens: self.options.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(
            endpoint = %self.options.endpoint,
            model = %self.options.model,
            "Sending translation request"
        );

        let response = self
            .client
            .post(&self.options.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                let reason = if err.is_timeout() { "timed out" } else { "failed" };
                TranslateError::transport(None, format!("request {reason}: {err}"))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| TranslateError::transport(Some(status.as_u16()), format!("could not read body: {err}")))?;

        if !status.is_success() {
            return Err(map_http_error(status, &text));
        }

        let parsed: MessagesResponse = serde_json::from_str(&text)
            .map_err(|err| TranslateError::parse(format!("unexpected response body: {err}")))?;

        parsed
            .into_text()
            .ok_or_else(|| TranslateError::parse("response contained no text"))
    }
}

#[async_trait]
impl Translator for RemoteTranslator {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn translate(&self, request: &TranslationRequest) -> TranslateResult<TranslationOutcome> {
        let prompt = prompt::build_prompt(request)
            .map_err(|err| TranslateError::config(format!("could not encode the page: {err}")))?;

        let text = self.send(prompt).await?;
        let outcome = response::extract_patches(&text)?;

        info!(patches = outcome.patches().len(), "Model translation complete");
        Ok(outcome)
    }
}

fn auth_headers(api_key: &str, auth: AuthScheme) -> TranslateResult<HeaderMap> {
    let key = api_key.trim();
    if key.is_empty() {
        return Err(TranslateError::config("no API key provided"));
    }
    if key.chars().any(|c| c.is_whitespace() || !c.is_ascii_graphic()) {
        return Err(TranslateError::config("API key contains invalid characters"));
    }

    let (name, raw) = match auth {
        AuthScheme::ApiKey => (HeaderName::from_static("x-api-key"), key.to_string()),
        AuthScheme::Bearer => (AUTHORIZATION, format!("Bearer {key}")),
    };
    let mut value = HeaderValue::from_str(&raw)
        .map_err(|_| TranslateError::config("API key is not a valid header value"))?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(name, value);
    headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

fn map_http_error(status: StatusCode, body: &str) -> TranslateError {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());

    let message = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            format!("the API key was rejected ({status}): {detail}")
        }
        StatusCode::TOO_MANY_REQUESTS => format!("rate limited ({status}): {detail}"),
        _ => format!("{status}: {detail}"),
    };
    TranslateError::transport(Some(status.as_u16()), message)
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: ResponseContent,
}

/// Anthropic returns content blocks; simple proxies return a string
#[derive(Deserialize)]
#[serde(untagged)]
enum ResponseContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    fn into_text(self) -> Option<String> {
        let text = match self.content {
            ResponseContent::Text(text) => text,
            ResponseContent::Blocks(blocks) => blocks
                .into_iter()
                .filter(|block| block.kind.as_deref().map_or(true, |kind| kind == "text"))
                .filter_map(|block| block.text)
                .collect::<Vec<_>>()
                .join("\n"),
        };
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}
