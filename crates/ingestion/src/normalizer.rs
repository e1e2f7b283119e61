//! Min-max normalization.
//!
//! Rescales each channel of a trajectory to [0, 1] so signatures captured
//! at different sizes, positions and speeds become comparable.

use sigauth_core::{Error, Result, Sample, Trajectory};

/// Rescale `values` to [0, 1].
///
/// `channel` names the series in the error when the range is degenerate
/// (empty or constant input).
pub fn normalize(values: &[f64], channel: &str) -> Result<Vec<f64>> {
    if values.is_empty() {
        return Err(Error::degenerate_range(channel));
    }

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let range = max - min;
    if range == 0.0 {
        return Err(Error::degenerate_range(channel));
    }
    if !range.is_finite() {
        return Err(Error::non_finite(format!("range of channel '{channel}'")));
    }

    Ok(values.iter().map(|v| (v - min) / range).collect())
}

/// Normalize the x, y and time channels of a trajectory independently.
pub fn normalize_trajectory(trajectory: &Trajectory) -> Result<Trajectory> {
    let x = normalize(&trajectory.xs(), "x")?;
    let y = normalize(&trajectory.ys(), "y")?;
    let t = normalize(&trajectory.ts(), "time")?;

    let samples = x
        .into_iter()
        .zip(y)
        .zip(t)
        .map(|((x, y), t)| Sample::new(x, y, t))
        .collect();
    Trajectory::new(samples)
}
