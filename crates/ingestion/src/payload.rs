//! Signature payload parsing.
//!
//! Capture clients post signatures as `{"abs": [...], "ord": [...],
//! "time": [...]}` objects, either singly or as an array. Verification
//! requests wrap the candidate signature(s) with a correlation token and
//! the user id whose enrollment is checked.

use serde::{Deserialize, Serialize};
use sigauth_core::{Result, Trajectory};

/// Raw signature as captured: parallel coordinate and time arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignaturePayload {
    /// Abscissa (x) samples.
    #[serde(alias = "x")]
    pub abs: Vec<f64>,
    /// Ordinate (y) samples.
    #[serde(alias = "y")]
    pub ord: Vec<f64>,
    /// Capture timestamps.
    #[serde(alias = "t")]
    pub time: Vec<f64>,
}

impl SignaturePayload {
    /// Convert into a trajectory, checking channel lengths agree.
    pub fn into_trajectory(self) -> Result<Trajectory> {
        Trajectory::from_channels(&self.abs, &self.ord, &self.time)
    }
}

impl From<&Trajectory> for SignaturePayload {
    fn from(trajectory: &Trajectory) -> Self {
        Self {
            abs: trajectory.xs(),
            ord: trajectory.ys(),
            time: trajectory.ts(),
        }
    }
}

/// A single signature or a batch of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(SignaturePayload),
    Many(Vec<SignaturePayload>),
}

impl OneOrMany {
    fn into_trajectories(self) -> Result<Vec<Trajectory>> {
        match self {
            OneOrMany::One(p) => Ok(vec![p.into_trajectory()?]),
            OneOrMany::Many(ps) => ps.into_iter().map(SignaturePayload::into_trajectory).collect(),
        }
    }
}

/// Parse one signature object or an array of them.
pub fn parse_signatures(json: &str) -> Result<Vec<Trajectory>> {
    let parsed: OneOrMany = serde_json::from_str(json)?;
    let trajectories = parsed.into_trajectories()?;
    tracing::debug!(count = trajectories.len(), "parsed signature payload");
    Ok(trajectories)
}

#[derive(Debug, Deserialize)]
struct RawVerificationRequest {
    token: String,
    #[serde(alias = "client_id")]
    user_id: String,
    #[serde(alias = "signature")]
    signatures: OneOrMany,
}

/// A verification request as received from the surrounding service.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationRequest {
    /// Correlation token echoed back with the result.
    pub token: String,
    /// User whose enrolled signatures are compared against.
    pub user_id: String,
    /// Candidate batch; verification requires exactly one.
    pub candidates: Vec<Trajectory>,
}

impl VerificationRequest {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>, candidates: Vec<Trajectory>) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
            candidates,
        }
    }

    /// Parse a request envelope.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawVerificationRequest = serde_json::from_str(json)?;
        Ok(Self {
            token: raw.token,
            user_id: raw.user_id,
            candidates: raw.signatures.into_trajectories()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigauth_core::Error;

    #[test]
    fn test_parse_single_signature() {
        let json = r#"{"abs": [0, 1, 2], "ord": [0, 0, 1], "time": [0, 10, 20]}"#;
        let trajs = parse_signatures(json).unwrap();
        assert_eq!(trajs.len(), 1);
        assert_eq!(trajs[0].len(), 3);
        assert_eq!(trajs[0].ys(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_parse_signature_batch() {
        let json = r#"[
            {"abs": [0, 1], "ord": [0, 1], "time": [0, 1]},
            {"x": [0, 2], "y": [1, 0], "t": [0, 2]}
        ]"#;
        let trajs = parse_signatures(json).unwrap();
        assert_eq!(trajs.len(), 2);
        assert_eq!(trajs[1].xs(), vec![0.0, 2.0]);
    }

    #[test]
    fn test_length_mismatch_is_shape_error() {
        let json = r#"{"abs": [0, 1, 2], "ord": [0, 0], "time": [0, 10, 20]}"#;
        assert!(matches!(
            parse_signatures(json),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(parse_signatures("[{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_request_envelope() {
        let json = r#"{
            "token": "job-42",
            "client_id": "alice",
            "signature": {"abs": [0, 1], "ord": [1, 0], "time": [0, 5]}
        }"#;
        let req = VerificationRequest::from_json(json).unwrap();
        assert_eq!(req.token, "job-42");
        assert_eq!(req.user_id, "alice");
        assert_eq!(req.candidates.len(), 1);
    }

    #[test]
    fn test_payload_round_trip_from_trajectory() {
        let traj = Trajectory::from_channels(&[1.0, 2.0], &[3.0, 4.0], &[0.0, 1.0]).unwrap();
        let payload = SignaturePayload::from(&traj);
        assert_eq!(payload.abs, vec![1.0, 2.0]);
        assert_eq!(payload.into_trajectory().unwrap(), traj);
    }
}
