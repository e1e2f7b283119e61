//! Configuration structures for the signature verification system.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Main configuration for the verification pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Enrollment requirements.
    pub enrollment: EnrollmentConfig,
    /// Curve alignment configuration.
    pub alignment: AlignmentConfig,
    /// Decision rule configuration.
    pub decision: DecisionConfig,
}

impl Config {
    /// Parse a configuration from JSON and validate it.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can drive a verification.
    pub fn validate(&self) -> Result<()> {
        if self.enrollment.min_enrolled < 2 {
            return Err(Error::config(format!(
                "min_enrolled must be at least 2 to form a baseline pair, got {}",
                self.enrollment.min_enrolled
            )));
        }
        let k = self.decision.threshold_multiplier;
        if !k.is_finite() || k <= 0.0 {
            return Err(Error::config(format!(
                "threshold_multiplier must be a positive finite number, got {k}"
            )));
        }
        Ok(())
    }
}

/// Enrollment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentConfig {
    /// Minimum number of enrolled signatures for a meaningful baseline.
    pub min_enrolled: usize,
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self { min_enrolled: 5 }
    }
}

/// Dynamic time warping configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Sakoe-Chiba band radius in samples (None = unconstrained).
    pub band_radius: Option<usize>,
}

/// Accept/reject rule configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// A channel fails when its mean candidate distance exceeds the maximum
    /// baseline distance times this factor.
    pub threshold_multiplier: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            threshold_multiplier: 1.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.enrollment.min_enrolled, 5);
        assert_eq!(config.decision.threshold_multiplier, 1.8);
        assert!(config.alignment.band_radius.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json(r#"{"alignment": {"band_radius": 8}}"#).unwrap();
        assert_eq!(config.alignment.band_radius, Some(8));
        assert_eq!(config.enrollment.min_enrolled, 5);
        assert_eq!(config.decision.threshold_multiplier, 1.8);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = Config::from_json(r#"{"enrollment": {"min_enrolled": 1}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_json(r#"{"decision": {"threshold_multiplier": 0.0}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = Config::from_json("{not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
