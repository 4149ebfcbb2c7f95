// src/trends/providers/fixture.rs
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::{into_trends, ScrapedTrend};
use crate::trends::types::{Trend, TrendsProvider};

/// Serves scraper output captured to JSON (same shape as the Apify dataset).
/// Used for local runs without an Apify token, and in tests.
pub struct FixtureTrendsProvider {
    pub json_content: String,
}

impl FixtureTrendsProvider {
    pub fn from_fixture(content: &str) -> Self {
        Self {
            json_content: content.to_string(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading trends fixture from {}", path.display()))?;
        Ok(Self::from_fixture(&content))
    }
}

#[async_trait]
impl TrendsProvider for FixtureTrendsProvider {
    async fn fetch_latest(&self) -> Result<Vec<Trend>> {
        let items: Vec<ScrapedTrend> =
            serde_json::from_str(&self.json_content).context("parsing trends fixture json")?;
        Ok(into_trends(items))
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_volumes_and_skips_blank_labels() {
        let p = FixtureTrendsProvider::from_fixture(
            r##"[
                {"time": "now", "timePeriod": "live", "trend": "#Eclipse", "volume": "120K"},
                {"trend": "  ", "volume": "5K"},
                {"trend": "Quiet topic"}
            ]"##,
        );
        let v = p.fetch_latest().await.unwrap();
        assert_eq!(v, vec![Trend::new("#Eclipse", 120.0), Trend::new("Quiet topic", 0.0)]);
    }

    #[tokio::test]
    async fn malformed_json_is_an_error() {
        let p = FixtureTrendsProvider::from_fixture("{not json");
        assert!(p.fetch_latest().await.is_err());
    }
}
