//! Core types and configuration for the signature verification system.
//!
//! This crate provides shared types used across all other crates:
//! - Trajectory, feature and distance types
//! - Verification outcomes
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::{AlignmentConfig, Config, DecisionConfig, EnrollmentConfig};
pub use error::{Error, Result};
pub use types::*;
