//! Data ingestion and normalization for the signature verification system.
//!
//! This crate handles:
//! - Min-max normalization of trajectory channels
//! - Parsing signature payloads and verification requests

pub mod normalizer;
pub mod payload;

pub use normalizer::{normalize, normalize_trajectory};
pub use payload::{parse_signatures, SignaturePayload, VerificationRequest};
