// src/trends/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A labeled topic with its popularity signal.
///
/// `score` holds the raw signal (e.g. post volume) until the list passes
/// through the normalizer, after which it holds a percentage weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trend {
    pub trend: String,
    pub score: f64,
}

impl Trend {
    pub fn new(trend: impl Into<String>, score: f64) -> Self {
        Self {
            trend: trend.into(),
            score,
        }
    }
}

#[async_trait::async_trait]
pub trait TrendsProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Trend>>;
    fn name(&self) -> &'static str;
}
