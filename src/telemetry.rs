// src/telemetry.rs
use axum::{extract::State, routing::get, Router};
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder and publish a static gauge with
    /// the number of LLM providers in the fallback chain.
    ///
    /// Fails if a recorder is already installed in this process.
    pub fn install(llm_providers: usize) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;

        describe_gauge!(
            "prompt_llm_providers_configured",
            "LLM providers in the fallback chain."
        );
        gauge!("prompt_llm_providers_configured").set(llm_providers as f64);

        Ok(Self { handle })
    }

    /// `/metrics` in the Prometheus text format.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(render_metrics))
            .with_state(self.handle.clone())
    }
}

async fn render_metrics(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}
