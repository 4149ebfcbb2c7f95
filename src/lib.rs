// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod daydream;
pub mod normalize;
pub mod prompt;
pub mod telemetry;
pub mod trends;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::normalize::normalize_trend_scores;
pub use crate::trends::Trend;

use axum::Router;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::telemetry::Metrics;

/// Build the full application from config: providers, routes, and `/metrics`.
///
/// Metrics are optional; if a Prometheus recorder is already installed the
/// router is returned without `/metrics`.
pub fn app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = AppState::from_config(cfg)?;
    let providers = state.generator.provider_names();
    info!(?providers, ui_dir = %state.ui_dir.display(), "app state ready");

    let router = api::router(state);
    match Metrics::install(providers.len()) {
        Ok(metrics) => Ok(router.merge(metrics.router())),
        Err(e) => {
            warn!(error = ?e, "metrics recorder not installed; /metrics disabled");
            Ok(router)
        }
    }
}
