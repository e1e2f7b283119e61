//! Feature computation for the signature verification system.
//!
//! This crate handles:
//! - Duplicate-timestamp removal
//! - Kinematic features (displacement, position, velocity, acceleration, angle)
//! - The normalize-then-extract pipeline applied to every signature

pub mod extractor;
pub mod engine;

pub use extractor::FeatureExtractor;
pub use engine::FeatureEngine;
