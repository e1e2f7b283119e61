//! Core data types for the signature verification system.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single pen sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Capture time.
    pub t: f64,
}

impl Sample {
    #[inline]
    pub fn new(x: f64, y: f64, t: f64) -> Self {
        Self { x, y, t }
    }

    #[inline]
    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.t.is_finite()
    }
}

/// A captured signature: samples in capture order.
///
/// Timestamps are non-decreasing at capture but may repeat. Construction
/// only checks shape and finiteness; length requirements are enforced by
/// the verification pipeline so that they surface as invalid input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    samples: Vec<Sample>,
}

impl Trajectory {
    /// Build a trajectory from samples.
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        if let Some(i) = samples.iter().position(|s| !s.is_finite()) {
            return Err(Error::non_finite(format!("sample {i} of trajectory")));
        }
        Ok(Self { samples })
    }

    /// Build a trajectory from separate x, y and time channels.
    pub fn from_channels(x: &[f64], y: &[f64], t: &[f64]) -> Result<Self> {
        if x.len() != y.len() || x.len() != t.len() {
            return Err(Error::shape_mismatch(format!(
                "channel lengths differ: x={}, y={}, time={}",
                x.len(),
                y.len(),
                t.len()
            )));
        }
        let samples = x
            .iter()
            .zip(y)
            .zip(t)
            .map(|((&x, &y), &t)| Sample::new(x, y, t))
            .collect();
        Self::new(samples)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Horizontal channel.
    pub fn xs(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.x).collect()
    }

    /// Vertical channel.
    pub fn ys(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.y).collect()
    }

    /// Time channel.
    pub fn ts(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.t).collect()
    }
}

/// A named feature series compared between signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    X,
    Y,
    Displacement,
    Position,
    Velocity,
    Acceleration,
    Angle,
}

impl Channel {
    /// Number of channels.
    pub const COUNT: usize = 7;

    /// Every channel, in canonical order.
    pub const ALL: [Channel; Channel::COUNT] = [
        Channel::X,
        Channel::Y,
        Channel::Displacement,
        Channel::Position,
        Channel::Velocity,
        Channel::Acceleration,
        Channel::Angle,
    ];

    /// Wire name.
    pub fn name(self) -> &'static str {
        match self {
            Channel::X => "x",
            Channel::Y => "y",
            Channel::Displacement => "displacement",
            Channel::Position => "position",
            Channel::Velocity => "velocity",
            Channel::Acceleration => "acceleration",
            Channel::Angle => "angle",
        }
    }

    /// Position in [`Channel::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kinematic features derived from one deduplicated trajectory.
///
/// `time`, `x`, `y` and `position` have the deduplicated length `n`; the
/// differenced series (`displacement`, `velocity`, `acceleration`, `angle`)
/// have length `n - 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub time: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Euclidean step length.
    pub displacement: Vec<f64>,
    /// Radial distance from the origin.
    pub position: Vec<f64>,
    /// Rate of change of position.
    pub velocity: Vec<f64>,
    /// Rate of change of velocity.
    pub acceleration: Vec<f64>,
    /// Step direction, in (-pi, pi].
    pub angle: Vec<f64>,
}

impl FeatureSet {
    /// Deduplicated sample count.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// The series for a channel.
    pub fn series(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::X => &self.x,
            Channel::Y => &self.y,
            Channel::Displacement => &self.displacement,
            Channel::Position => &self.position,
            Channel::Velocity => &self.velocity,
            Channel::Acceleration => &self.acceleration,
            Channel::Angle => &self.angle,
        }
    }
}

/// Per-channel alignment distances for one pair of signatures.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DistanceVector {
    values: [f64; Channel::COUNT],
}

impl DistanceVector {
    /// Build a vector by computing each channel's distance in turn.
    pub fn try_from_fn<F>(mut f: F) -> Result<Self>
    where
        F: FnMut(Channel) -> Result<f64>,
    {
        let mut values = [0.0; Channel::COUNT];
        for channel in Channel::ALL {
            values[channel.index()] = f(channel)?;
        }
        Ok(Self { values })
    }

    #[inline]
    pub fn get(&self, channel: Channel) -> f64 {
        self.values[channel.index()]
    }

    #[inline]
    pub fn set(&mut self, channel: Channel, distance: f64) {
        self.values[channel.index()] = distance;
    }

    /// Channel/distance pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, f64)> + '_ {
        Channel::ALL.iter().map(move |&c| (c, self.values[c.index()]))
    }
}

/// Why a request was rejected without computing distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidInputReason {
    /// Candidate batch is empty.
    MissingCandidate,
    /// Candidate batch holds more than one signature.
    MultipleCandidates,
    /// Too few enrolled signatures for a baseline.
    InsufficientEnrollment,
    /// A trajectory has fewer than two usable samples.
    TooFewSamples,
    /// A channel is constant and cannot be normalized.
    DegenerateRange,
}

impl InvalidInputReason {
    pub fn as_str(self) -> &'static str {
        match self {
            InvalidInputReason::MissingCandidate => "missing-candidate",
            InvalidInputReason::MultipleCandidates => "multiple-candidates",
            InvalidInputReason::InsufficientEnrollment => "insufficient-enrollment",
            InvalidInputReason::TooFewSamples => "too-few-samples",
            InvalidInputReason::DegenerateRange => "degenerate-range",
        }
    }
}

impl fmt::Display for InvalidInputReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one verification request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// Candidate matches the enrolled signatures.
    Accepted,
    /// Candidate does not match.
    Rejected,
    /// Request could not be evaluated.
    RejectedInvalidInput { reason: InvalidInputReason },
    /// Evaluation failed unexpectedly.
    ComputationError { reason: String },
}

impl VerificationOutcome {
    /// Accepted or rejected from a decision.
    pub fn from_decision(accepted: bool) -> Self {
        if accepted {
            VerificationOutcome::Accepted
        } else {
            VerificationOutcome::Rejected
        }
    }

    pub fn invalid(reason: InvalidInputReason) -> Self {
        VerificationOutcome::RejectedInvalidInput { reason }
    }

    pub fn computation_error(reason: impl Into<String>) -> Self {
        VerificationOutcome::ComputationError {
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, VerificationOutcome::Accepted)
    }

    /// Short status label.
    pub fn kind(&self) -> &'static str {
        match self {
            VerificationOutcome::Accepted => "accepted",
            VerificationOutcome::Rejected => "rejected",
            VerificationOutcome::RejectedInvalidInput { .. } => "rejected_invalid_input",
            VerificationOutcome::ComputationError { .. } => "computation_error",
        }
    }

    /// Diagnostic reason for non-decided outcomes.
    pub fn reason(&self) -> Option<String> {
        match self {
            VerificationOutcome::RejectedInvalidInput { reason } => Some(reason.to_string()),
            VerificationOutcome::ComputationError { reason } => Some(reason.clone()),
            _ => None,
        }
    }
}
