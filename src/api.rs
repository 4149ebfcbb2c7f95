//! HTTP surface: trends listing, prompt generation, health, and the static UI.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::config::AppConfig;
use crate::daydream::{daydream_url, daydream_url_with_params, DaydreamParams};
use crate::normalize::normalize_trend_scores;
use crate::prompt::{build_generator, PromptError, PromptGenerator};
use crate::trends::{self, providers, Trend, TrendsProvider};

/// Successful `/api/trends` responses: one hour at the CDN, ten minutes in browsers.
pub const TRENDS_CACHE_CONTROL: &str =
    "public, s-maxage=3600, max-age=600, stale-while-revalidate=600";
/// Error responses.
pub const ERROR_CACHE_CONTROL: &str = "public, max-age=60, stale-while-revalidate=300";

#[derive(Clone)]
pub struct AppState {
    pub trends: Arc<dyn TrendsProvider>,
    pub generator: PromptGenerator,
    pub ui_dir: PathBuf,
}

impl AppState {
    pub fn new(trends: Arc<dyn TrendsProvider>, generator: PromptGenerator) -> Self {
        Self {
            trends,
            generator,
            ui_dir: PathBuf::from("ui"),
        }
    }

    pub fn with_ui_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ui_dir = dir.into();
        self
    }

    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let trends = providers::build_from_config(&cfg.trends)?;
        let generator = build_generator(cfg)?;
        Ok(Self::new(trends, generator).with_ui_dir(&cfg.server.ui_dir))
    }
}

pub fn router(state: AppState) -> Router {
    let ui = ServeDir::new(&state.ui_dir);
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/trends", get(get_trends))
        .route("/api/prompt", post(post_prompt))
        .fallback_service(ui)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No trends data available")]
    NoTrends,
    #[error("Invalid or missing 'trends'. Each trend must have a 'trend' (string) and an optional 'score' (number).")]
    InvalidTrends,
    #[error("Failed to generate animation prompt")]
    PromptFailed(#[source] PromptError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NoTrends | ApiError::InvalidTrends => StatusCode::BAD_REQUEST,
            ApiError::PromptFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let cacheable = matches!(self, ApiError::NoTrends);
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        if cacheable {
            (status, [(header::CACHE_CONTROL, ERROR_CACHE_CONTROL)], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[derive(Serialize)]
struct TrendsResp {
    trends: Vec<Trend>,
}

async fn get_trends(State(state): State<AppState>) -> Result<Response, ApiError> {
    let fetched = trends::fetch_trends(state.trends.as_ref()).await;
    if fetched.is_empty() {
        return Err(ApiError::NoTrends);
    }

    let body = TrendsResp {
        trends: normalize_trend_scores(&fetched),
    };
    Ok((
        [(header::CACHE_CONTROL, TRENDS_CACHE_CONTROL)],
        Json(body),
    )
        .into_response())
}

#[derive(Deserialize)]
struct PromptReq {
    trends: Vec<TrendInput>,
    #[serde(default)]
    daydream: Option<DaydreamParams>,
}

#[derive(Deserialize)]
struct TrendInput {
    trend: String,
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Serialize)]
struct PromptResp {
    prompt: String,
    #[serde(rename = "daydreamUrl")]
    daydream_url: String,
    /// The selected trends with the weights the prompt was built from.
    trends: Vec<Trend>,
}

async fn post_prompt(
    State(state): State<AppState>,
    payload: Result<Json<PromptReq>, JsonRejection>,
) -> Result<Json<PromptResp>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!(target: "api", error = %e, "rejected prompt payload");
        ApiError::InvalidTrends
    })?;

    // Only the trends the user kept selected arrive here; re-weight them.
    let selected: Vec<Trend> = req
        .trends
        .into_iter()
        .map(|t| Trend::new(t.trend, t.score.unwrap_or(0.0)))
        .collect();
    let normalized = normalize_trend_scores(&selected);

    let prompt = state.generator.generate(&normalized).await.map_err(|e| {
        tracing::error!(target: "api", error = %e, "generating animation prompt failed");
        ApiError::PromptFailed(e)
    })?;

    let daydream_url = match req.daydream {
        Some(params) => daydream_url_with_params(&prompt, params),
        None => daydream_url(&prompt),
    };
    Ok(Json(PromptResp {
        prompt,
        daydream_url,
        trends: normalized,
    }))
}
