//! Trend Prompt Generator: binary entrypoint.
//! Boots the Axum HTTP server via Shuttle, wiring config, providers, and routes.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trend_prompt::config::AppConfig;

/// Compact logs; `RUST_LOG` overrides the default filter.
/// Uses `try_init` since the Shuttle runtime may already own the global subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("trend_prompt=info,trends=info,prompt=info,api=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AppConfig::load_default()?;
    let router = trend_prompt::app(&cfg)?;

    Ok(router.into())
}
