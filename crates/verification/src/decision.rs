//! Accept/reject rule.
//!
//! A candidate passes a channel when its mean distance to the enrolled
//! signatures stays within the largest distance seen between two genuine
//! signatures, scaled by a calibration factor. It is accepted only when
//! every channel passes.

use crate::matrix::{BaselineDistances, CandidateDistances};
use serde::Serialize;
use sigauth_core::{Channel, DecisionConfig, Error, Result};

/// Statistics behind one channel's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelVerdict {
    pub channel: Channel,
    /// Largest baseline distance.
    pub max_baseline: f64,
    /// Mean candidate distance.
    pub mean_candidate: f64,
    /// `max_baseline * threshold_multiplier`.
    pub limit: f64,
    pub passed: bool,
}

/// Per-channel verdicts for a full evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionReport {
    pub channels: Vec<ChannelVerdict>,
}

impl DecisionReport {
    /// True when every channel passed.
    pub fn accepted(&self) -> bool {
        self.channels.iter().all(|c| c.passed)
    }

    /// Channels that exceeded their limit.
    pub fn failing_channels(&self) -> Vec<Channel> {
        self.channels
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.channel)
            .collect()
    }
}

/// Threshold decision rule.
#[derive(Debug, Clone, Copy)]
pub struct Decision {
    threshold_multiplier: f64,
}

impl Default for Decision {
    fn default() -> Self {
        Self::from_config(&DecisionConfig::default())
    }
}

impl Decision {
    pub fn new(threshold_multiplier: f64) -> Self {
        Self {
            threshold_multiplier,
        }
    }

    pub fn from_config(config: &DecisionConfig) -> Self {
        Self::new(config.threshold_multiplier)
    }

    /// Accept or reject, stopping at the first failing channel.
    pub fn decide(
        &self,
        baseline: &BaselineDistances,
        candidate: &CandidateDistances,
    ) -> Result<bool> {
        for channel in Channel::ALL {
            if !self.verdict(channel, baseline, candidate)?.passed {
                tracing::debug!(%channel, "channel exceeds baseline limit");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Evaluate every channel without short-circuiting.
    pub fn evaluate(
        &self,
        baseline: &BaselineDistances,
        candidate: &CandidateDistances,
    ) -> Result<DecisionReport> {
        let channels = Channel::ALL
            .iter()
            .map(|&c| self.verdict(c, baseline, candidate))
            .collect::<Result<Vec<_>>>()?;
        Ok(DecisionReport { channels })
    }

    fn verdict(
        &self,
        channel: Channel,
        baseline: &BaselineDistances,
        candidate: &CandidateDistances,
    ) -> Result<ChannelVerdict> {
        let max_baseline = baseline
            .max(channel)
            .ok_or_else(|| Error::insufficient_data("empty baseline distances"))?;
        let mean_candidate = candidate
            .mean(channel)
            .ok_or_else(|| Error::insufficient_data("empty candidate distances"))?;
        let limit = max_baseline * self.threshold_multiplier;

        Ok(ChannelVerdict {
            channel,
            max_baseline,
            mean_candidate,
            limit,
            passed: mean_candidate <= limit,
        })
    }
}
