//! Kinematic feature extraction.
//!
//! Turns a normalized trajectory into the per-channel series compared by
//! curve alignment. Samples sharing a timestamp with their predecessor are
//! dropped first so that every time step is non-zero.

use sigauth_core::{Error, FeatureSet, Result, Trajectory};

/// Derives kinematic features from a normalized trajectory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract features from a trajectory whose channels are already
    /// normalized.
    pub fn extract(&self, trajectory: &Trajectory) -> Result<FeatureSet> {
        let (time, x, y) = dedup_timestamps(trajectory);
        let n = time.len();
        if n < 2 {
            return Err(Error::TooFewSamples { len: n });
        }

        let dt = diff(&time);
        let dx = diff(&x);
        let dy = diff(&y);

        let displacement: Vec<f64> = dx.iter().zip(&dy).map(|(a, b)| a.hypot(*b)).collect();
        let position: Vec<f64> = x.iter().zip(&y).map(|(a, b)| a.hypot(*b)).collect();

        let velocity: Vec<f64> = diff(&position)
            .iter()
            .zip(&dt)
            .map(|(dp, dt)| rate(*dp, *dt))
            .collect();

        let mut dv = diff(&velocity);
        let last = dv.last().copied().unwrap_or(0.0);
        dv.resize(velocity.len(), last);
        let acceleration: Vec<f64> = dv.iter().zip(&dt).map(|(a, b)| rate(*a, *b)).collect();

        let angle: Vec<f64> = dx.iter().zip(&dy).map(|(dx, dy)| dy.atan2(*dx)).collect();

        tracing::trace!(
            samples = trajectory.len(),
            kept = n,
            "extracted kinematic features"
        );

        Ok(FeatureSet {
            time,
            x,
            y,
            displacement,
            position,
            velocity,
            acceleration,
            angle,
        })
    }
}

/// Drop every sample whose timestamp equals the previous sample's, keeping
/// the first sample of each run.
fn dedup_timestamps(trajectory: &Trajectory) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let samples = trajectory.samples();
    let mut time = Vec::with_capacity(samples.len());
    let mut x = Vec::with_capacity(samples.len());
    let mut y = Vec::with_capacity(samples.len());

    for (i, s) in samples.iter().enumerate() {
        if i > 0 && s.t == samples[i - 1].t {
            continue;
        }
        time.push(s.t);
        x.push(s.x);
        y.push(s.y);
    }
    (time, x, y)
}

/// First differences.
fn diff(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Quotient with zero-division (and any non-finite result) mapped to 0.
#[inline]
fn rate(delta: f64, dt: f64) -> f64 {
    if dt == 0.0 {
        return 0.0;
    }
    let q = delta / dt;
    if q.is_finite() {
        q
    } else {
        0.0
    }
}
