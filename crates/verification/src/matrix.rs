//! Baseline and candidate distance tables.
//!
//! Every pair of signatures is aligned once per channel, each channel curve
//! being the channel series paired with the signature's deduplicated time
//! axis.
//!
//! Cost: baseline mode runs `N(N-1)/2` pair alignments over `N` enrolled
//! signatures and candidate mode runs `N`, seven channels each. Each
//! alignment is `O(n * m)` in the curve lengths, so baseline construction
//! dominates verification time and grows quadratically with enrollment
//! size.

use crate::dtw::CurveAligner;
use ordered_float::OrderedFloat;
use serde::Serialize;
use statrs::statistics::Statistics;
use sigauth_core::{Channel, DistanceVector, Error, FeatureSet, Result};

/// A collection of per-pair distance vectors.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DistanceTable {
    rows: Vec<DistanceVector>,
}

/// Distances between every unordered pair of enrolled signatures.
pub type BaselineDistances = DistanceTable;

/// Distances between each enrolled signature and the candidate.
pub type CandidateDistances = DistanceTable;

impl DistanceTable {
    pub fn new(rows: Vec<DistanceVector>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[DistanceVector] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Maximum distance for a channel, None when empty.
    pub fn max(&self, channel: Channel) -> Option<f64> {
        Iterator::max(self.rows.iter().map(|r| OrderedFloat(r.get(channel)))).map(|d| d.0)
    }

    /// Arithmetic mean distance for a channel, None when empty.
    pub fn mean(&self, channel: Channel) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        Some(self.rows.iter().map(|r| r.get(channel)).mean())
    }
}

/// Builds distance tables from feature sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceMatrixBuilder {
    aligner: CurveAligner,
}

impl DistanceMatrixBuilder {
    pub fn new(aligner: CurveAligner) -> Self {
        Self { aligner }
    }

    /// Per-channel distances between two feature sets.
    pub fn pair_distances(&self, a: &FeatureSet, b: &FeatureSet) -> Result<DistanceVector> {
        DistanceVector::try_from_fn(|channel| {
            self.aligner
                .align_series(a.series(channel), &a.time, b.series(channel), &b.time)
        })
    }

    /// Distances for every unordered pair of enrolled signatures, in
    /// row-major order `(0,1), (0,2), ..., (N-2, N-1)`.
    pub fn baseline(&self, enrolled: &[FeatureSet]) -> Result<BaselineDistances> {
        let n = enrolled.len();
        if n < 2 {
            return Err(Error::insufficient_data(format!(
                "baseline needs at least 2 enrolled signatures, got {n}"
            )));
        }

        let mut rows = Vec::with_capacity(n * (n - 1) / 2);
        for (i, a) in enrolled.iter().enumerate() {
            for b in &enrolled[i + 1..] {
                rows.push(self.pair_distances(a, b)?);
            }
        }
        Ok(DistanceTable::new(rows))
    }

    /// Distances between each enrolled signature and the candidate.
    pub fn candidate(
        &self,
        enrolled: &[FeatureSet],
        candidate: &FeatureSet,
    ) -> Result<CandidateDistances> {
        if enrolled.is_empty() {
            return Err(Error::insufficient_data("no enrolled signatures to compare against"));
        }

        let rows = enrolled
            .iter()
            .map(|e| self.pair_distances(e, candidate))
            .collect::<Result<Vec<_>>>()?;
        Ok(DistanceTable::new(rows))
    }
}
