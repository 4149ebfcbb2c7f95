// src/config/app.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::prompt::providers::{
    DEFAULT_LIVEPEER_BASE_URL, DEFAULT_LIVEPEER_MAX_TOKENS, DEFAULT_LIVEPEER_MODEL,
    DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MAX_TOKENS, DEFAULT_OPENAI_MODEL,
};
use crate::trends::providers::apify::{DEFAULT_APIFY_BASE_URL, DEFAULT_TRENDS_ACTOR};

pub const DEFAULT_APP_CONFIG_PATH: &str = "config/app.toml";
pub const ENV_APP_CONFIG_PATH: &str = "APP_CONFIG_PATH";

pub const ENV_APIFY_API_TOKEN: &str = "APIFY_API_TOKEN";
pub const ENV_LIVEPEER_API_TOKEN: &str = "LIVEPEER_API_TOKEN";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Marker meaning "read the credential from its environment variable".
const ENV_MARKER: &str = "ENV";

fn env_marker() -> String {
    ENV_MARKER.to_string()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub trends: TrendsConfig,
    #[serde(default = "LlmConfig::livepeer_defaults")]
    pub livepeer: LlmConfig,
    #[serde(default = "LlmConfig::openai_defaults")]
    pub openai: LlmConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            trends: TrendsConfig::default(),
            livepeer: LlmConfig::livepeer_defaults(),
            openai: LlmConfig::openai_defaults(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Directory holding the static UI (index.html).
    #[serde(default = "ServerConfig::default_ui_dir")]
    pub ui_dir: PathBuf,
}

impl ServerConfig {
    fn default_ui_dir() -> PathBuf {
        PathBuf::from("ui")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ui_dir: Self::default_ui_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendsConfig {
    #[serde(default = "TrendsConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "TrendsConfig::default_actor")]
    pub actor: String,
    /// "ENV" means: read from APIFY_API_TOKEN
    #[serde(default = "env_marker")]
    pub api_token: String,
    /// Serve trends from a captured JSON dataset instead of calling Apify.
    #[serde(default)]
    pub fixture_path: Option<PathBuf>,
}

impl TrendsConfig {
    fn default_base_url() -> String {
        DEFAULT_APIFY_BASE_URL.to_string()
    }
    fn default_actor() -> String {
        DEFAULT_TRENDS_ACTOR.to_string()
    }

    pub fn api_token(&self) -> Option<String> {
        resolve_secret(&self.api_token, ENV_APIFY_API_TOKEN)
    }
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            actor: Self::default_actor(),
            api_token: env_marker(),
            fixture_path: None,
        }
    }
}

/// One LLM provider. Missing fields fall back to that provider's defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub max_tokens: u32,
    /// "ENV" means: read from the provider's env var
    #[serde(default = "env_marker")]
    pub api_key: String,
}

impl LlmConfig {
    pub fn livepeer_defaults() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_LIVEPEER_BASE_URL.to_string(),
            model: DEFAULT_LIVEPEER_MODEL.to_string(),
            max_tokens: DEFAULT_LIVEPEER_MAX_TOKENS,
            api_key: env_marker(),
        }
    }

    pub fn openai_defaults() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            max_tokens: DEFAULT_OPENAI_MAX_TOKENS,
            api_key: env_marker(),
        }
    }

    /// Fill blank fields from `defaults`.
    fn fill_from(&mut self, defaults: &LlmConfig) {
        if self.base_url.trim().is_empty() {
            self.base_url = defaults.base_url.clone();
        }
        if self.model.trim().is_empty() {
            self.model = defaults.model.clone();
        }
        if self.max_tokens == 0 {
            self.max_tokens = defaults.max_tokens;
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&data).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(data: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(data)?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Load config using env var + fallbacks:
    /// 1) $APP_CONFIG_PATH (must exist)
    /// 2) config/app.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_APP_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_APP_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from_file(&pb);
        }
        let default_p = PathBuf::from(DEFAULT_APP_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from_file(&default_p);
        }
        let mut cfg = Self::default();
        cfg.sanitize();
        Ok(cfg)
    }

    fn sanitize(&mut self) {
        self.livepeer.fill_from(&LlmConfig::livepeer_defaults());
        self.openai.fill_from(&LlmConfig::openai_defaults());
        if self.trends.base_url.trim().is_empty() {
            self.trends.base_url = TrendsConfig::default_base_url();
        }
        if self.trends.actor.trim().is_empty() {
            self.trends.actor = TrendsConfig::default_actor();
        }
    }

    pub fn livepeer_token(&self) -> Option<String> {
        resolve_secret(&self.livepeer.api_key, ENV_LIVEPEER_API_TOKEN)
    }

    pub fn openai_key(&self) -> Option<String> {
        resolve_secret(&self.openai.api_key, ENV_OPENAI_API_KEY)
    }
}

/// Resolve a credential: "ENV" reads `env_name`; blank means none.
fn resolve_secret(value: &str, env_name: &str) -> Option<String> {
    let v = value.trim();
    let resolved = if v.eq_ignore_ascii_case(ENV_MARKER) {
        env::var(env_name).ok()?
    } else {
        v.to_string()
    };
    let resolved = resolved.trim().to_string();
    if resolved.is_empty() {
        None
    } else {
        Some(resolved)
    }
}
