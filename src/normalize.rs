//! # Score Normalizer
//!
//! Turns raw popularity signals into percentage weights that sum to 100.
//!
//! - Non-positive (and NaN) scores are replaced by a floor of `1.0` so that
//!   every entry keeps a visible, strictly positive share.
//! - Order, length, and labels are preserved; only the score changes.
//! - Empty input yields empty output.
//!
//! Used twice: on freshly fetched trends, and on the subset a user keeps
//! selected before a prompt is regenerated.

use crate::trends::types::Trend;

/// Effective score substituted for zero, negative, or missing raw scores.
pub const SCORE_FLOOR: f64 = 1.0;

#[inline]
fn effective_score(raw: f64) -> f64 {
    if raw > 0.0 {
        raw.min(f64::MAX)
    } else {
        SCORE_FLOOR
    }
}

/// Normalize a slice of raw scores into percentages summing to 100.
///
/// Scores are divided by the largest effective score before summing, so the
/// total stays finite even for scores near `f64::MAX`. `+inf` counts as
/// `f64::MAX`.
pub fn normalize_weights(raw: &[f64]) -> Vec<f64> {
    let effective: Vec<f64> = raw.iter().copied().map(effective_score).collect();
    let Some(max) = effective.iter().copied().reduce(f64::max) else {
        return Vec::new();
    };
    // max >= SCORE_FLOOR and finite; each ratio lies in (0, 1].
    let scaled: Vec<f64> = effective.iter().map(|&e| e / max).collect();
    let total: f64 = scaled.iter().sum();
    scaled.iter().map(|&r| r / total * 100.0).collect()
}

/// Normalize trend scores so that they sum to 100%.
pub fn normalize_trend_scores(trends: &[Trend]) -> Vec<Trend> {
    let raw: Vec<f64> = trends.iter().map(|t| t.score).collect();
    trends
        .iter()
        .zip(normalize_weights(&raw))
        .map(|(t, weight)| Trend {
            trend: t.trend.clone(),
            score: weight,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn trends(pairs: &[(&str, f64)]) -> Vec<Trend> {
        pairs.iter().map(|(l, s)| Trend::new(*l, *s)).collect()
    }

    fn weights(ts: &[Trend]) -> Vec<f64> {
        ts.iter().map(|t| t.score).collect()
    }

    #[test]
    fn empty_in_empty_out() {
        assert!(normalize_trend_scores(&[]).is_empty());
        assert!(normalize_weights(&[]).is_empty());
    }

    #[test]
    fn single_entry_gets_everything() {
        let out = normalize_trend_scores(&trends(&[("a", 5.0)]));
        assert_eq!(out.len(), 1);
        assert!((out[0].score - 100.0).abs() < EPS);
    }

    #[test]
    fn proportional_scaling() {
        let out = normalize_trend_scores(&trends(&[("a", 10.0), ("b", 30.0)]));
        assert_eq!(out[0].trend, "a");
        assert_eq!(out[1].trend, "b");
        assert!((out[0].score - 25.0).abs() < EPS);
        assert!((out[1].score - 75.0).abs() < EPS);
    }

    #[test]
    fn non_positive_scores_fall_back_to_uniform() {
        let out = normalize_trend_scores(&trends(&[("a", 0.0), ("b", 0.0), ("c", -5.0)]));
        for w in weights(&out) {
            assert!((w - 100.0 / 3.0).abs() < EPS, "got {w}");
        }
    }

    #[test]
    fn nan_is_treated_like_a_missing_score() {
        let out = normalize_weights(&[f64::NAN, 1.0]);
        assert!((out[0] - 50.0).abs() < EPS);
        assert!((out[1] - 50.0).abs() < EPS);
    }

    #[test]
    fn mixed_signs_keep_every_weight_positive() {
        let out = normalize_trend_scores(&trends(&[("a", 98.0), ("b", -3.0), ("c", 0.0)]));
        let ws = weights(&out);
        assert!(ws.iter().all(|&w| w > 0.0));
        assert!((ws.iter().sum::<f64>() - 100.0).abs() < EPS);
        assert!((ws[0] - 98.0).abs() < EPS);
        assert!((ws[1] - 1.0).abs() < EPS);
    }

    #[test]
    fn huge_scores_do_not_overflow_the_total() {
        let out = normalize_weights(&[f64::MAX, f64::MAX]);
        assert!(out.iter().all(|&w| w > 0.0 && w.is_finite()));
        assert!((out.iter().sum::<f64>() - 100.0).abs() < EPS);
        assert!((out[0] - 50.0).abs() < EPS);

        let lopsided = normalize_weights(&[f64::MAX, 1.0, -4.0]);
        assert!(lopsided.iter().all(|&w| w > 0.0 && w.is_finite()));
        assert!((lopsided.iter().sum::<f64>() - 100.0).abs() < EPS);
    }

    #[test]
    fn infinite_score_counts_as_largest_finite() {
        let out = normalize_weights(&[f64::INFINITY, 5.0]);
        assert!(out.iter().all(|&w| w > 0.0 && w.is_finite()));
        assert!((out.iter().sum::<f64>() - 100.0).abs() < EPS);
    }

    #[test]
    fn duplicate_labels_are_not_merged() {
        let out = normalize_trend_scores(&trends(&[("a", 1.0), ("a", 3.0)]));
        assert_eq!(out.len(), 2);
        assert!((out[0].score - 25.0).abs() < EPS);
    }

    #[test]
    fn renormalizing_is_idempotent() {
        let first = normalize_trend_scores(&trends(&[("x", 7.0), ("y", 13.0), ("z", 80.0)]));
        let second = normalize_trend_scores(&first);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.trend, b.trend);
            assert!((a.score - b.score).abs() < EPS);
        }
    }
}
