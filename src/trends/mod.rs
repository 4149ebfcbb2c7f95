// src/trends/mod.rs
pub mod providers;
pub mod types;

pub use crate::trends::types::{Trend, TrendsProvider};

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("trends_fetched_total", "Trends returned by providers.");
        describe_counter!(
            "trends_provider_errors_total",
            "Trends provider fetch/parse errors."
        );
        describe_histogram!("trends_fetch_ms", "Trends provider round-trip in milliseconds.");
    });
}

/// Turn a volume string such as `"12.3K"` or `"1,204 posts"` into a number by
/// concatenating every run of digits. Strings without digits score 0.
pub fn parse_tweet_volume(volume: &str) -> f64 {
    static RE_DIGITS: OnceCell<regex::Regex> = OnceCell::new();
    let re = RE_DIGITS.get_or_init(|| regex::Regex::new(r"\d+").unwrap());
    let digits: String = re.find_iter(volume).map(|m| m.as_str()).collect();
    if digits.is_empty() {
        return 0.0;
    }
    // Runs past f64 range parse as inf; cap them.
    match digits.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        Ok(_) => f64::MAX,
        Err(_) => 0.0,
    }
}

/// Sort trends by raw score, highest first. Ties keep provider order.
pub fn sort_by_score_desc(trends: &mut [Trend]) {
    trends.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Fetch the latest trends, sorted by score descending.
///
/// Provider failures are logged and counted, then reported as an empty list;
/// callers treat "no trends" and "provider down" the same way.
pub async fn fetch_trends(provider: &dyn TrendsProvider) -> Vec<Trend> {
    ensure_metrics_described();

    let t0 = std::time::Instant::now();
    let result = provider.fetch_latest().await;
    histogram!("trends_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

    match result {
        Ok(mut trends) => {
            sort_by_score_desc(&mut trends);
            counter!("trends_fetched_total").increment(trends.len() as u64);
            tracing::info!(
                target: "trends",
                provider = provider.name(),
                count = trends.len(),
                "trends fetched"
            );
            trends
        }
        Err(e) => {
            tracing::warn!(target: "trends", error = ?e, provider = provider.name(), "provider error");
            counter!("trends_provider_errors_total").increment(1);
            Vec::new()
        }
    }
}
