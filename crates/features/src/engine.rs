//! Feature computation engine.
//!
//! Combines normalization and kinematic extraction into the single
//! preprocessing step applied identically to enrolled and candidate
//! signatures.

use crate::extractor::FeatureExtractor;
use sigauth_core::{Error, FeatureSet, Result, Trajectory};
use sigauth_ingestion::normalize_trajectory;

/// Feature computation engine.
#[derive(Debug, Clone, Default)]
pub struct FeatureEngine {
    extractor: FeatureExtractor,
}

impl FeatureEngine {
    /// Create a new feature engine.
    pub fn new() -> Self {
        Self {
            extractor: FeatureExtractor::new(),
        }
    }

    /// Check the sample count and rescale each channel to [0, 1].
    pub fn normalize(&self, trajectory: &Trajectory) -> Result<Trajectory> {
        if trajectory.len() < 2 {
            return Err(Error::TooFewSamples {
                len: trajectory.len(),
            });
        }
        normalize_trajectory(trajectory)
    }

    /// Extract features from an already normalized trajectory.
    pub fn extract(&self, normalized: &Trajectory) -> Result<FeatureSet> {
        self.extractor.extract(normalized)
    }

    /// Normalize a raw trajectory and extract its features.
    pub fn compute(&self, trajectory: &Trajectory) -> Result<FeatureSet> {
        let normalized = self.normalize(trajectory)?;
        self.extract(&normalized)
    }

    /// Compute features for every trajectory, failing on the first error.
    pub fn compute_all(&self, trajectories: &[Trajectory]) -> Result<Vec<FeatureSet>> {
        trajectories.iter().map(|t| self.compute(t)).collect()
    }
}
