pub mod apify;
pub mod fixture;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::config::app::ENV_APIFY_API_TOKEN;
use crate::config::TrendsConfig;
use crate::trends::parse_tweet_volume;
use crate::trends::types::{Trend, TrendsProvider};
use apify::ApifyTrendsProvider;
use fixture::FixtureTrendsProvider;

/// One dataset row produced by the Twitter trends scraper actor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedTrend {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub time_period: Option<String>,
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
}

/// Map scraped rows to trends, dropping rows without a usable label.
pub(crate) fn into_trends(items: Vec<ScrapedTrend>) -> Vec<Trend> {
    items
        .into_iter()
        .filter_map(|it| {
            let label = it.trend?.trim().to_string();
            if label.is_empty() {
                return None;
            }
            let score = it.volume.as_deref().map(parse_tweet_volume).unwrap_or(0.0);
            Some(Trend::new(label, score))
        })
        .collect()
}

/// Factory: a fixture provider when `fixture_path` is set, otherwise Apify.
/// Apify needs a token; its absence is a startup error.
pub fn build_from_config(cfg: &TrendsConfig) -> Result<Arc<dyn TrendsProvider>> {
    if let Some(path) = &cfg.fixture_path {
        tracing::info!(target: "trends", path = %path.display(), "using trends fixture");
        return Ok(Arc::new(FixtureTrendsProvider::from_path(path)?));
    }
    let token = cfg
        .api_token()
        .ok_or_else(|| anyhow!("{ENV_APIFY_API_TOKEN} is not set in the environment variables"))?;
    tracing::info!(
        target: "trends",
        actor = %cfg.actor,
        token_len = token.len(),
        "using apify trends provider"
    );
    Ok(Arc::new(ApifyTrendsProvider::new(
        &cfg.base_url,
        &cfg.actor,
        token,
    )?))
}
