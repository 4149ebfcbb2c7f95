// src/prompt/providers.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{clean_llm_output, ChatMessage, LlmProvider, ProviderError};

pub const DEFAULT_LIVEPEER_BASE_URL: &str = "https://dream-gateway.livepeer.cloud";
pub const DEFAULT_LIVEPEER_MODEL: &str = "meta-llama/Meta-Llama-3.1-8B-Instruct";
pub const DEFAULT_LIVEPEER_MAX_TOKENS: u32 = 72;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_MAX_TOKENS: u32 = 59;

#[derive(Serialize)]
struct CompletionReq<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResp {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMsg>,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: Option<String>,
}

fn http_client() -> Result<reqwest::Client, ProviderError> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("trend-prompt-generator/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(20))
        .build()?;
    Ok(http)
}

/// POST an OpenAI-shaped chat completion and return the first choice's text.
async fn post_completion(
    http: &reqwest::Client,
    url: &str,
    token: &str,
    req: &CompletionReq<'_>,
) -> Result<String, ProviderError> {
    let resp = http.post(url).bearer_auth(token).json(req).send().await?;
    if !resp.status().is_success() {
        return Err(ProviderError::Status(resp.status().as_u16()));
    }
    let body: CompletionResp = resp.json().await?;
    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .ok_or(ProviderError::EmptyResponse)
}

/// Livepeer AI gateway, serving Llama 3.1. Output carries Llama chat headers
/// and dangling separators, so it goes through `clean_llm_output`.
pub struct LivepeerProvider {
    http: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    token: String,
}

impl LivepeerProvider {
    pub fn new(
        base_url: &str,
        model: &str,
        max_tokens: u32,
        token: String,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            max_tokens,
            token,
        })
    }
}

#[async_trait]
impl LlmProvider for LivepeerProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let req = CompletionReq {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
        };
        let url = format!("{}/llm", self.base_url);
        let raw = post_completion(&self.http, &url, &self.token, &req).await?;
        let cleaned = clean_llm_output(&raw);
        if cleaned.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(cleaned)
    }

    fn name(&self) -> &'static str {
        "livepeer"
    }
}

/// OpenAI Chat Completions.
pub struct OpenAiProvider {
    http: reqwest::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    api_key: String,
}

impl OpenAiProvider {
    pub fn new(
        base_url: &str,
        model: &str,
        max_tokens: u32,
        api_key: String,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            http: http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            max_tokens,
            api_key,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let req = CompletionReq {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
        };
        let url = format!("{}/v1/chat/completions", self.base_url);
        let raw = post_completion(&self.http, &url, &self.api_key, &req).await?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(trimmed.to_string())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Deterministic provider for tests and offline runs.
pub struct MockProvider {
    name: &'static str,
    reply: Option<String>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn replying(name: &'static str, reply: &str) -> Self {
        Self {
            name,
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `complete` calls seen so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.reply
            .clone()
            .ok_or_else(|| ProviderError::Unavailable(format!("{} (mock)", self.name)))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
