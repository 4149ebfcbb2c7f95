//! Prompt generation: weighted trend description, LLM fallback chain, and
//! output cleanup.

pub mod providers;

use std::sync::Arc;

use async_trait::async_trait;
use metrics::{counter, describe_counter};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::config::AppConfig;
use crate::normalize::normalize_trend_scores;
use crate::trends::types::Trend;

pub use crate::prompt::providers::{LivepeerProvider, MockProvider, OpenAiProvider};

pub const SYSTEM_PROMPT: &str = "You generate high-impact visual prompts for real-time AI animation. \
Only output compact keyword-style prompts using '::' separators. Focus purely on visual elements: \
character traits, textures, lighting, stylistic techniques, symbolism. No full sentences, no narration, \
no explanations. Match this style format exactly: 'hooded figure in ceremonial armor :: sacred geometry \
background :: brushed gold texture :: precise ink linework :: stylized realism, 4k'";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Failure of a single LLM provider call. Always recoverable by falling back.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("empty completion")]
    EmptyResponse,
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Invalid or empty trends data")]
    EmptyTrends,
    #[error("Unable to generate animation prompt. Please try again later.")]
    AllProvidersFailed,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;
    fn name(&self) -> &'static str;
}

/// Render trends as `"label (importance: 12.34%)"`, joined by `", "`.
/// Expects already-normalized scores.
pub fn weighted_description(trends: &[Trend]) -> String {
    trends
        .iter()
        .map(|t| format!("{} (importance: {:.2}%)", t.trend, t.score))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the chat request for a set of trends. Scores are normalized here, so
/// callers may pass raw or already-normalized values.
pub fn build_messages(trends: &[Trend]) -> Result<Vec<ChatMessage>, PromptError> {
    if trends.is_empty() {
        return Err(PromptError::EmptyTrends);
    }
    let description = weighted_description(&normalize_trend_scores(trends));
    Ok(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Generate concise animation instructions based on the following trends and their importance: {description}."
        )),
    ])
}

static RE_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").unwrap());
static RE_LLAMA_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<\|start_header_id\|>.*?<\|end_header_id\|>").unwrap());
static RE_LEADING_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*::\s*").unwrap());
static RE_TRAILING_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*::\s*$").unwrap());

/// Flatten newlines, drop Llama chat headers, and strip a dangling `::` at
/// either end.
pub fn clean_llm_output(output: &str) -> String {
    let out = RE_NEWLINES.replace_all(output, " ");
    let out = RE_LLAMA_HEADER.replace_all(&out, "");
    let out = RE_LEADING_SEP.replace(&out, "");
    let out = RE_TRAILING_SEP.replace(&out, "");
    out.trim().to_string()
}

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("prompt_generated_total", "Prompts produced, by provider.");
        describe_counter!(
            "prompt_provider_failures_total",
            "Failed LLM provider calls, by provider."
        );
        describe_counter!(
            "prompt_exhausted_total",
            "Requests where every provider failed."
        );
    });
}

/// Ordered chain of LLM providers. Each is tried once; the first success wins.
#[derive(Clone, Default)]
pub struct PromptGenerator {
    providers: Vec<Arc<dyn LlmProvider>>,
}

impl PromptGenerator {
    pub fn new(providers: Vec<Arc<dyn LlmProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn generate(&self, trends: &[Trend]) -> Result<String, PromptError> {
        ensure_metrics_described();
        let messages = build_messages(trends)?;

        for provider in &self.providers {
            match provider.complete(&messages).await {
                Ok(prompt) => {
                    counter!("prompt_generated_total", "provider" => provider.name()).increment(1);
                    tracing::info!(target: "prompt", provider = provider.name(), "prompt generated");
                    return Ok(prompt);
                }
                Err(e) => {
                    counter!("prompt_provider_failures_total", "provider" => provider.name())
                        .increment(1);
                    tracing::warn!(
                        target: "prompt",
                        provider = provider.name(),
                        error = %e,
                        "provider request failed"
                    );
                }
            }
        }

        counter!("prompt_exhausted_total").increment(1);
        Err(PromptError::AllProvidersFailed)
    }
}

/// Factory: Livepeer first, OpenAI second, each only when enabled and
/// credentialed. An empty chain is allowed; every request then fails.
pub fn build_generator(cfg: &AppConfig) -> Result<PromptGenerator, ProviderError> {
    let mut providers: Vec<Arc<dyn LlmProvider>> = Vec::new();

    if cfg.livepeer.enabled {
        if let Some(token) = cfg.livepeer_token() {
            tracing::info!(target: "prompt", model = %cfg.livepeer.model, key_len = token.len(), "livepeer enabled");
            providers.push(Arc::new(LivepeerProvider::new(
                &cfg.livepeer.base_url,
                &cfg.livepeer.model,
                cfg.livepeer.max_tokens,
                token,
            )?));
        }
    }
    if cfg.openai.enabled {
        if let Some(key) = cfg.openai_key() {
            tracing::info!(target: "prompt", model = %cfg.openai.model, key_len = key.len(), "openai enabled");
            providers.push(Arc::new(OpenAiProvider::new(
                &cfg.openai.base_url,
                &cfg.openai.model,
                cfg.openai.max_tokens,
                key,
            )?));
        }
    }

    if providers.is_empty() {
        tracing::warn!(target: "prompt", "no LLM provider configured; prompt generation will fail");
    }
    Ok(PromptGenerator::new(providers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_uses_two_decimals() {
        let ts = vec![Trend::new("Eclipse", 25.0), Trend::new("Finals", 100.0 / 3.0)];
        assert_eq!(
            weighted_description(&ts),
            "Eclipse (importance: 25.00%), Finals (importance: 33.33%)"
        );
    }

    #[test]
    fn messages_normalize_raw_scores() {
        let msgs = build_messages(&[Trend::new("a", 10.0), Trend::new("b", 30.0)]).unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, "system");
        assert_eq!(msgs[0].content, SYSTEM_PROMPT);
        assert_eq!(msgs[1].role, "user");
        assert!(msgs[1]
            .content
            .ends_with("a (importance: 25.00%), b (importance: 75.00%)."));
    }

    #[test]
    fn messages_reject_empty_input() {
        assert!(matches!(build_messages(&[]), Err(PromptError::EmptyTrends)));
    }

    #[test]
    fn clean_strips_headers_and_separators() {
        let raw = "<|start_header_id|>assistant<|end_header_id|>\n\n:: neon koi :: rain-slick streets\n:: ";
        assert_eq!(clean_llm_output(raw), "neon koi :: rain-slick streets");
    }

    #[test]
    fn clean_leaves_inner_separators_alone() {
        assert_eq!(
            clean_llm_output("  glass city :: dusk glow  "),
            "glass city :: dusk glow"
        );
    }

    #[tokio::test]
    async fn falls_back_to_the_next_provider() {
        let chain = PromptGenerator::new(vec![
            Arc::new(MockProvider::failing("livepeer-mock")),
            Arc::new(MockProvider::replying("openai-mock", "ember forest :: 4k")),
        ]);
        let out = chain.generate(&[Trend::new("a", 1.0)]).await.unwrap();
        assert_eq!(out, "ember forest :: 4k");
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let second = Arc::new(MockProvider::replying("second", "unused"));
        let chain = PromptGenerator::new(vec![
            Arc::new(MockProvider::replying("first", "chrome moth")),
            second.clone(),
        ]);
        assert_eq!(chain.generate(&[Trend::new("a", 1.0)]).await.unwrap(), "chrome moth");
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn all_failing_is_an_error() {
        let chain = PromptGenerator::new(vec![
            Arc::new(MockProvider::failing("one")),
            Arc::new(MockProvider::failing("two")),
        ]);
        let err = chain.generate(&[Trend::new("a", 1.0)]).await.unwrap_err();
        assert!(matches!(err, PromptError::AllProvidersFailed));
    }

    #[test]
    fn generator_follows_config_order() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [livepeer]
            api_key = "lp-inline"
            [openai]
            api_key = "sk-inline"
            "#,
        )
        .unwrap();
        let chain = build_generator(&cfg).unwrap();
        assert_eq!(chain.provider_names(), vec!["livepeer", "openai"]);
    }

    #[test]
    fn disabled_provider_is_skipped() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [livepeer]
            enabled = false
            api_key = "lp-inline"
            [openai]
            api_key = "sk-inline"
            "#,
        )
        .unwrap();
        assert_eq!(build_generator(&cfg).unwrap().provider_names(), vec!["openai"]);
    }

    #[tokio::test]
    async fn no_providers_is_an_error() {
        let chain = PromptGenerator::default();
        assert!(chain.provider_names().is_empty());
        assert!(matches!(
            chain.generate(&[Trend::new("a", 1.0)]).await,
            Err(PromptError::AllProvidersFailed)
        ));
    }
}
