//! Score components for feed ranking.
//!
//! Popularity and time are intrinsic to a scene and computed once per pool.
//! Distance and variety depend on the feed built so far and are recomputed
//! at every selection step.

use crate::{Error, Result, Scene};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One week in milliseconds.
pub const ONE_WEEK_MS: f64 = 7.0 * 24.0 * 3600.0 * 1000.0;

/// Relative importance of the four score components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub time: f64,
    pub popularity: f64,
    pub distance: f64,
    pub variety: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            time: 1.0,
            popularity: 1.0,
            distance: 1.0,
            variety: 1.0,
        }
    }
}

impl ScoreWeights {
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("time", self.time),
            ("popularity", self.popularity),
            ("distance", self.distance),
            ("variety", self.variety),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "weight `{name}` must be a finite non-negative number, got {w}"
                )));
            }
        }
        Ok(())
    }
}

/// Half-life logistic decay of scene age.
///
/// `f(t) = (1 + a·e^{-k·t0}) / (1 + a·e^{k·(t - t0)})` with `a` chosen so that
/// `f(t0) = 1/2`. `f(0) = 1`. `k` and `t0` are both in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeDecay {
    pub k: f64,
    pub half_life_ms: f64,
}

impl Default for TimeDecay {
    fn default() -> Self {
        Self {
            k: 0.01,
            half_life_ms: ONE_WEEK_MS,
        }
    }
}

impl TimeDecay {
    /// Requires `e^{-k·t0} < 1/2`, otherwise no positive `a` exists.
    pub fn validate(&self) -> Result<()> {
        let kt0 = self.k * self.half_life_ms;
        if !kt0.is_finite() || self.k <= 0.0 || kt0 <= std::f64::consts::LN_2 {
            return Err(Error::InvalidConfig(format!(
                "time decay needs k > 0 and k * half_life_ms > ln 2, got k={} half_life_ms={}",
                self.k, self.half_life_ms
            )));
        }
        Ok(())
    }

    /// The `a` coefficient solving `f(t0) = 1/2`.
    #[inline]
    pub fn coefficient(&self) -> f64 {
        1.0 / (1.0 - 2.0 * (-self.k * self.half_life_ms).exp())
    }

    /// Decay value for an age in milliseconds. Negative ages count as zero.
    pub fn score(&self, age_ms: f64) -> f64 {
        let t = age_ms.max(0.0);
        let a = self.coefficient();
        let numerator = 1.0 + a * (-self.k * self.half_life_ms).exp();
        // exp overflows to +inf for very old scenes, giving exactly 0
        let denominator = 1.0 + a * (self.k * (t - self.half_life_ms)).exp();
        numerator / denominator
    }

    pub fn score_at(&self, created: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let age_ms = now.signed_duration_since(created).num_milliseconds() as f64;
        self.score(age_ms)
    }
}

/// `(2·likes + impressions)` divided by the pool maximum. All zeros when the
/// maximum is zero.
pub fn popularity_components(scenes: &[&Scene]) -> Vec<f64> {
    let max = scenes
        .iter()
        .map(|s| s.popularity())
        .fold(0.0_f64, f64::max);

    if max <= 0.0 {
        return vec![0.0; scenes.len()];
    }
    scenes.iter().map(|s| s.popularity() / max).collect()
}

/// `sin(exp(-x²)·x)` with `x = (10·d - 1) / 2`, `d` in radians.
///
/// Not monotonic: peaks for candidates at a moderate distance from the last
/// placed scene and falls off for both neighbors and far-away scenes.
#[inline]
pub fn distance_component(d: f64) -> f64 {
    let x = (10.0 * d - 1.0) / 2.0;
    ((-x * x).exp() * x).sin()
}

/// `exp(-n/5)` where `n` is how often the handle already appears in the feed.
#[inline]
pub fn variety_component(occurrences: usize) -> f64 {
    (-(occurrences as f64) / 5.0).exp()
}
