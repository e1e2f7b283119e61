//! Signature verification engine.
//!
//! This crate provides:
//! - Dynamic time warping between (value, time) curves
//! - Baseline and candidate distance tables
//! - The max-baseline threshold decision rule
//! - The verification service and its async dispatcher

pub mod dtw;
pub mod matrix;
pub mod decision;
pub mod service;
pub mod dispatch;

pub use dtw::CurveAligner;
pub use matrix::{BaselineDistances, CandidateDistances, DistanceMatrixBuilder, DistanceTable};
pub use decision::{ChannelVerdict, Decision, DecisionReport};
pub use service::{outcome_for_error, VerificationReport, VerificationService, VerificationState};
pub use dispatch::{
    DeliveryError, DeliveryStatus, DispatchReport, Dispatcher, EnrollmentLookup, LookupError,
    ResultSink, VerificationResult,
};
