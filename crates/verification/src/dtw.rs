//! Dynamic time warping between (value, time) curves.
//!
//! The distance is the minimum cumulative Euclidean cost over monotonic,
//! continuous warping paths. The recurrence keeps two rolling rows, so
//! memory is linear in the shorter curve and time is `O(n * m)`, or
//! `O(n * w)` with a Sakoe-Chiba band of half-width `w`.

use sigauth_core::{AlignmentConfig, Error, Result};

/// A curve point: (time, value).
pub type Point = (f64, f64);

/// Pair each value with its timestamp, truncating to the shorter series.
pub fn zip_curve(values: &[f64], time: &[f64]) -> Vec<Point> {
    time.iter().zip(values).map(|(&t, &v)| (t, v)).collect()
}

#[inline]
fn euclidean(a: Point, b: Point) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// DTW curve aligner.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurveAligner {
    /// Sakoe-Chiba band radius (None = unconstrained).
    band_radius: Option<usize>,
}

impl CurveAligner {
    /// Create an unconstrained aligner.
    pub fn new() -> Self {
        Self { band_radius: None }
    }

    /// Create an aligner restricted to `|i - j| <= radius`.
    ///
    /// The band is widened to the length difference of the curves when
    /// needed so a warping path always exists.
    pub fn with_band(radius: usize) -> Self {
        Self {
            band_radius: Some(radius),
        }
    }

    /// Create an aligner from configuration.
    pub fn from_config(config: &AlignmentConfig) -> Self {
        Self {
            band_radius: config.band_radius,
        }
    }

    /// Align two value series, each paired positionally with its own time
    /// axis.
    pub fn align_series(
        &self,
        a_values: &[f64],
        a_time: &[f64],
        b_values: &[f64],
        b_time: &[f64],
    ) -> Result<f64> {
        self.align(&zip_curve(a_values, a_time), &zip_curve(b_values, b_time))
    }

    /// DTW distance between two curves.
    pub fn align(&self, a: &[Point], b: &[Point]) -> Result<f64> {
        if a.is_empty() || b.is_empty() {
            return Err(Error::EmptyCurve);
        }

        // Rows run over the longer curve so the rolling buffers stay short.
        let (rows, cols) = if a.len() >= b.len() { (a, b) } else { (b, a) };
        let n = rows.len();
        let m = cols.len();
        // A band wider than the longer curve is unconstrained.
        let w = self.band_radius.map_or(n, |r| r.max(n - m).min(n));

        let mut prev = vec![f64::INFINITY; m + 1];
        let mut curr = vec![f64::INFINITY; m + 1];
        prev[0] = 0.0;

        for i in 1..=n {
            let lo = i.saturating_sub(w).max(1);
            let hi = i.saturating_add(w).min(m);
            curr[lo - 1] = f64::INFINITY;

            let p = rows[i - 1];
            for j in lo..=hi {
                let best = prev[j - 1].min(prev[j]).min(curr[j - 1]);
                curr[j] = euclidean(p, cols[j - 1]) + best;
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        let distance = prev[m];
        if !distance.is_finite() {
            return Err(Error::non_finite("alignment cost"));
        }
        Ok(distance)
    }
}
