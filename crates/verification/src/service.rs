//! Verification service.
//!
//! Runs one request through validation, feature extraction, baseline and
//! candidate distance computation and the decision rule. The service holds
//! only configuration, so a single instance can be shared across threads
//! and requests never interact.

use crate::decision::{Decision, DecisionReport};
use crate::dtw::CurveAligner;
use crate::matrix::DistanceMatrixBuilder;
use serde::Serialize;
use sigauth_core::{
    Config, Error, FeatureSet, InvalidInputReason, Result, Trajectory, VerificationOutcome,
};
use sigauth_features::FeatureEngine;

/// Stage a request reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    Received,
    Validated,
    FeaturesExtracted,
    BaselineComputed,
    CandidateCompared,
    Decided,
    RejectedInvalidInput,
    Failed,
}

/// Outcome plus the diagnostics gathered on the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub outcome: VerificationOutcome,
    /// Terminal state.
    pub state: VerificationState,
    /// Per-channel statistics, present once a decision was made.
    pub decision: Option<DecisionReport>,
}

impl VerificationReport {
    fn invalid(reason: InvalidInputReason) -> Self {
        Self {
            outcome: VerificationOutcome::invalid(reason),
            state: VerificationState::RejectedInvalidInput,
            decision: None,
        }
    }
}

/// Signature verification service.
#[derive(Debug, Clone)]
pub struct VerificationService {
    min_enrolled: usize,
    engine: FeatureEngine,
    builder: DistanceMatrixBuilder,
    decision: Decision,
}

impl Default for VerificationService {
    fn default() -> Self {
        Self::build(&Config::default())
    }
}

impl VerificationService {
    /// Create a service from a validated configuration.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &Config) -> Self {
        Self {
            min_enrolled: config.enrollment.min_enrolled,
            engine: FeatureEngine::new(),
            builder: DistanceMatrixBuilder::new(CurveAligner::from_config(&config.alignment)),
            decision: Decision::from_config(&config.decision),
        }
    }

    pub fn min_enrolled(&self) -> usize {
        self.min_enrolled
    }

    /// Verify a candidate batch against a user's enrolled signatures.
    pub fn verify(&self, candidates: &[Trajectory], enrolled: &[Trajectory]) -> VerificationOutcome {
        self.verify_detailed(candidates, enrolled).outcome
    }

    /// Verify and keep the terminal state and per-channel statistics.
    pub fn verify_detailed(
        &self,
        candidates: &[Trajectory],
        enrolled: &[Trajectory],
    ) -> VerificationReport {
        let candidate = match candidates {
            [] => return self.reject(InvalidInputReason::MissingCandidate),
            [single] => single,
            _ => return self.reject(InvalidInputReason::MultipleCandidates),
        };
        if enrolled.len() < self.min_enrolled {
            tracing::debug!(
                enrolled = enrolled.len(),
                required = self.min_enrolled,
                "enrollment too small"
            );
            return self.reject(InvalidInputReason::InsufficientEnrollment);
        }

        let mut state = VerificationState::Received;
        match self.run(candidate, enrolled, &mut state) {
            Ok(report) => {
                let outcome = VerificationOutcome::from_decision(report.accepted());
                tracing::info!(
                    outcome = outcome.kind(),
                    failing = ?report.failing_channels(),
                    "verification decided"
                );
                VerificationReport {
                    outcome,
                    state: VerificationState::Decided,
                    decision: Some(report),
                }
            }
            Err(e) => match e.invalid_input_reason() {
                Some(reason) => {
                    tracing::warn!(?state, error = %e, "invalid signature input");
                    self.reject(reason)
                }
                None => {
                    tracing::warn!(?state, error = %e, "verification computation failed");
                    VerificationReport {
                        outcome: VerificationOutcome::computation_error(e.to_string()),
                        state: VerificationState::Failed,
                        decision: None,
                    }
                }
            },
        }
    }

    fn reject(&self, reason: InvalidInputReason) -> VerificationReport {
        tracing::info!(%reason, "verification rejected on input");
        VerificationReport::invalid(reason)
    }

    /// The pipeline past request-shape validation. `state` tracks the last
    /// stage completed so failures can be reported against it.
    fn run(
        &self,
        candidate: &Trajectory,
        enrolled: &[Trajectory],
        state: &mut VerificationState,
    ) -> Result<DecisionReport> {
        let normalized_enrolled = enrolled
            .iter()
            .map(|t| self.engine.normalize(t))
            .collect::<Result<Vec<_>>>()?;
        let normalized_candidate = self.engine.normalize(candidate)?;
        *state = VerificationState::Validated;

        let enrolled_features = normalized_enrolled
            .iter()
            .map(|t| self.engine.extract(t))
            .collect::<Result<Vec<FeatureSet>>>()?;
        let candidate_features = self.engine.extract(&normalized_candidate)?;
        *state = VerificationState::FeaturesExtracted;
        tracing::debug!(
            enrolled = enrolled_features.len(),
            candidate_len = candidate_features.len(),
            "features extracted"
        );

        let baseline = self.builder.baseline(&enrolled_features)?;
        *state = VerificationState::BaselineComputed;
        tracing::debug!(pairs = baseline.len(), "baseline distances computed");

        let compared = self.builder.candidate(&enrolled_features, &candidate_features)?;
        *state = VerificationState::CandidateCompared;
        tracing::debug!(pairs = compared.len(), "candidate distances computed");

        self.decision.evaluate(&baseline, &compared)
    }
}

/// Map an error to the outcome a caller should see.
pub fn outcome_for_error(error: &Error) -> VerificationOutcome {
    match error.invalid_input_reason() {
        Some(reason) => VerificationOutcome::invalid(reason),
        None => VerificationOutcome::computation_error(error.to_string()),
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_near_identical_candidate_accepted() {
        let service = VerificationService::default();
        let report = service.verify_detailed(&[line(99)], &enrollment(5));
        assert_eq!(report.outcome, VerificationOutcome::Accepted);
        assert_eq!(report.state, VerificationState::Decided);
        assert_eq!(report.decision.map(|d| d.channels.len()), Some(7));
    }

    #[test]
    fn test_circle_rejected() {
        let service = VerificationService::default();
        let report = service.verify_detailed(&[circle()], &enrollment(5));
        assert_eq!(report.outcome, VerificationOutcome::Rejected);
        let failing = report.decision.unwrap().failing_channels();
        assert!(failing.contains(&sigauth_core::Channel::X));
    }

    #[test]
    fn test_insufficient_enrollment() {
        let outcome = VerificationService::default().verify(&[line(99)], &enrollment(4));
        assert_eq!(
            outcome,
            VerificationOutcome::invalid(InvalidInputReason::InsufficientEnrollment)
        );
    }

    #[test]
    fn test_multiple_candidates() {
        let outcome = VerificationService::default().verify(&[line(98), line(99)], &enrollment(5));
        assert_eq!(
            outcome,
            VerificationOutcome::invalid(InvalidInputReason::MultipleCandidates)
        );
    }

    #[test]
    fn test_missing_candidate() {
        let outcome = VerificationService::default().verify(&[], &enrollment(5));
        assert_eq!(
            outcome,
            VerificationOutcome::invalid(InvalidInputReason::MissingCandidate)
        );
    }

    #[test]
    fn test_constant_x_degenerate() {
        let n = SAMPLES;
        let t: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..n).map(|i| (i as f64 * 0.3).sin()).collect();
        let flat = Trajectory::from_channels(&vec![5.0; n], &y, &t).unwrap();

        let report = VerificationService::default().verify_detailed(&[flat], &enrollment(5));
        assert_eq!(
            report.outcome,
            VerificationOutcome::invalid(InvalidInputReason::DegenerateRange)
        );
        assert_eq!(report.state, VerificationState::RejectedInvalidInput);
    }

    #[test]
    fn test_single_sample_candidate() {
        let dot = Trajectory::from_channels(&[1.0], &[1.0], &[0.0]).unwrap();
        let outcome = VerificationService::default().verify(&[dot], &enrollment(5));
        assert_eq!(
            outcome,
            VerificationOutcome::invalid(InvalidInputReason::TooFewSamples)
        );
    }

    #[test]
    fn test_deterministic() {
        let service = VerificationService::default();
        let enrolled = enrollment(6);
        let first = service.verify_detailed(&[line(42)], &enrolled);
        let second = service.verify_detailed(&[line(42)], &enrolled);
        assert_eq!(first, second);
    }

    #[test]
    fn test_concurrent_requests_agree() {
        let service = std::sync::Arc::new(VerificationService::default());
        let enrolled = std::sync::Arc::new(enrollment(5));
        let expected = service.verify(&[line(7)], &enrolled);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let service = service.clone();
                let enrolled = enrolled.clone();
                std::thread::spawn(move || service.verify(&[line(7)], &enrolled))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    }

    #[test]
    fn test_custom_config() {
        let mut config = Config::default();
        config.enrollment.min_enrolled = 3;
        config.alignment.band_radius = Some(5);
        let service = VerificationService::new(&config).unwrap();
        assert_eq!(service.verify(&[line(50)], &enrollment(3)), VerificationOutcome::Accepted);

        config.decision.threshold_multiplier = -1.0;
        assert!(VerificationService::new(&config).is_err());
    }

    #[test]
    fn test_unbounded_band_config() {
        let config =
            Config::from_json(r#"{"alignment":{"band_radius":18446744073709551615}}"#).unwrap();
        let service = VerificationService::new(&config).unwrap();
        let enrolled = enrollment(5);

        let banded = service.verify_detailed(&[line(99)], &enrolled);
        let unbanded = VerificationService::default().verify_detailed(&[line(99)], &enrolled);
        assert_eq!(banded.outcome, VerificationOutcome::Accepted);
        assert_eq!(banded, unbanded);
    }

    #[test]
    fn test_overflowing_range_is_computation_error() {
        let n = SAMPLES;
        let t: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let x: Vec<f64> = (0..n).map(|i| if i % 2 == 0 { -1e308 } else { 1e308 }).collect();
        let y: Vec<f64> = (0..n).map(|i| (i as f64 * 0.3).sin()).collect();
        let wide = Trajectory::from_channels(&x, &y, &t).unwrap();

        let report = VerificationService::default().verify_detailed(&[wide], &enrollment(5));
        assert_eq!(report.state, VerificationState::Failed);
        assert!(report.decision.is_none());
        match report.outcome {
            VerificationOutcome::ComputationError { reason } => {
                assert!(reason.contains("range of channel 'x'"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_outcome_for_error() {
        assert_eq!(
            outcome_for_error(&Error::degenerate_range("y")),
            VerificationOutcome::invalid(InvalidInputReason::DegenerateRange)
        );
        assert_eq!(outcome_for_error(&Error::EmptyCurve).kind(), "computation_error");
    }
}
