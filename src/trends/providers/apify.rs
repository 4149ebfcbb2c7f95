// src/trends/providers/apify.rs
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::json;

use super::{into_trends, ScrapedTrend};
use crate::trends::types::{Trend, TrendsProvider};

pub const DEFAULT_APIFY_BASE_URL: &str = "https://api.apify.com";
pub const DEFAULT_TRENDS_ACTOR: &str = "karamelo~twitter-trends-scraper";

/// Runs the Apify Twitter trends scraper synchronously and reads its dataset
/// in the same round-trip (`run-sync-get-dataset-items`).
pub struct ApifyTrendsProvider {
    http: reqwest::Client,
    base_url: String,
    actor: String,
    token: String,
}

impl ApifyTrendsProvider {
    pub fn new(base_url: &str, actor: &str, token: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("trend-prompt-generator/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            // Actor runs scrape live; give them room.
            .timeout(Duration::from_secs(120))
            .build()
            .context("building apify http client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            actor: actor.replace('/', "~"),
            token,
        })
    }

    fn run_url(&self) -> String {
        format!(
            "{}/v2/acts/{}/run-sync-get-dataset-items",
            self.base_url, self.actor
        )
    }
}

#[async_trait]
impl TrendsProvider for ApifyTrendsProvider {
    async fn fetch_latest(&self) -> Result<Vec<Trend>> {
        let input = json!({
            "live": true,
            "proxyOptions": { "useApifyProxy": true },
        });

        let resp = self
            .http
            .post(self.run_url())
            .bearer_auth(&self.token)
            .json(&input)
            .send()
            .await
            .context("calling apify actor")?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("apify actor run failed: HTTP {status}"));
        }

        let items: Vec<ScrapedTrend> = resp.json().await.context("parsing apify dataset items")?;
        Ok(into_trends(items))
    }

    fn name(&self) -> &'static str {
        "apify"
    }
}
