//! Daydream hand-off link: opens the generated prompt in Daydream's editor.

use serde::{Deserialize, Deserializer, Serialize};
use url::form_urlencoded;

pub const DAYDREAM_CREATE_URL: &str = "https://daydream.live/create";

fn default_quality() -> u8 {
    2
}
fn default_creativity() -> f32 {
    0.5
}

const MAX_QUALITY: u8 = 5;

/// Accept any JSON number for `quality` and clamp it, so `-1` or `300`
/// never fails the surrounding payload.
fn quality_from_number<'de, D>(de: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(de)?;
    Ok(if raw.is_nan() {
        default_quality()
    } else {
        raw.round().clamp(0.0, MAX_QUALITY as f64) as u8
    })
}

/// Diffusion knobs appended to the prompt as `--quality` / `--creativity` flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DaydreamParams {
    /// 0..=5
    #[serde(default = "default_quality", deserialize_with = "quality_from_number")]
    pub quality: u8,
    /// 0.0..=1.0
    #[serde(default = "default_creativity")]
    pub creativity: f32,
}

impl Default for DaydreamParams {
    fn default() -> Self {
        Self {
            quality: default_quality(),
            creativity: default_creativity(),
        }
    }
}

impl DaydreamParams {
    /// Clamp into the ranges Daydream accepts; NaN creativity resets to default.
    pub fn clamped(self) -> Self {
        let creativity = if self.creativity.is_nan() {
            default_creativity()
        } else {
            self.creativity.clamp(0.0, 1.0)
        };
        Self {
            quality: self.quality.min(MAX_QUALITY),
            creativity,
        }
    }

    fn flags(&self) -> String {
        format!("--quality {} --creativity {:.1}", self.quality, self.creativity)
    }
}

/// `https://daydream.live/create?inputPrompt=<encoded prompt>`
pub fn daydream_url(prompt: &str) -> String {
    build(prompt)
}

/// Like [`daydream_url`], with diffusion flags appended to the prompt text.
pub fn daydream_url_with_params(prompt: &str, params: DaydreamParams) -> String {
    let p = params.clamped();
    build(&format!("{prompt} {}", p.flags()))
}

fn build(input_prompt: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(input_prompt.as_bytes()).collect();
    format!("{DAYDREAM_CREATE_URL}?inputPrompt={encoded}")
}
