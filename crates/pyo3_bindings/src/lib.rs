//! PyO3 bindings for the signature verification core.
//!
//! Exposes the Rust pipeline to the Python service that receives
//! signatures:
//! - Trajectory and feature types
//! - Verification with explicit outcomes
//! - Feature extraction and curve alignment helpers
//! - Logging setup

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use sigauth_core::{
    Config as RustConfig,
    Error as RustError,
    FeatureSet as RustFeatureSet,
    Trajectory as RustTrajectory,
    VerificationOutcome as RustVerificationOutcome,
};
use sigauth_features::FeatureEngine;
use sigauth_ingestion::parse_signatures;
use sigauth_verification::{outcome_for_error, CurveAligner, VerificationService};

fn to_py_err(e: RustError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

// ============================================================================
// Python-exposed Types
// ============================================================================

/// A captured signature: parallel x, y and time samples.
#[pyclass]
#[derive(Clone)]
pub struct Trajectory {
    #[pyo3(get, set)]
    pub x: Vec<f64>,
    #[pyo3(get, set)]
    pub y: Vec<f64>,
    #[pyo3(get, set)]
    pub t: Vec<f64>,
}

#[pymethods]
impl Trajectory {
    #[new]
    fn new(x: Vec<f64>, y: Vec<f64>, t: Vec<f64>) -> Self {
        Trajectory { x, y, t }
    }

    fn __len__(&self) -> usize {
        self.t.len()
    }

    fn __repr__(&self) -> String {
        format!("Trajectory(samples={})", self.t.len())
    }
}

impl TryFrom<&Trajectory> for RustTrajectory {
    type Error = RustError;

    fn try_from(t: &Trajectory) -> Result<Self, Self::Error> {
        RustTrajectory::from_channels(&t.x, &t.y, &t.t)
    }
}

fn to_rust_trajectories(trajectories: &[Trajectory]) -> Result<Vec<RustTrajectory>, RustError> {
    trajectories.iter().map(RustTrajectory::try_from).collect()
}

/// Kinematic features of one signature.
#[pyclass]
#[derive(Clone)]
pub struct FeatureSet {
    #[pyo3(get)]
    pub time: Vec<f64>,
    #[pyo3(get)]
    pub x: Vec<f64>,
    #[pyo3(get)]
    pub y: Vec<f64>,
    #[pyo3(get)]
    pub displacement: Vec<f64>,
    #[pyo3(get)]
    pub position: Vec<f64>,
    #[pyo3(get)]
    pub velocity: Vec<f64>,
    #[pyo3(get)]
    pub acceleration: Vec<f64>,
    #[pyo3(get)]
    pub angle: Vec<f64>,
}

impl From<RustFeatureSet> for FeatureSet {
    fn from(f: RustFeatureSet) -> Self {
        FeatureSet {
            time: f.time,
            x: f.x,
            y: f.y,
            displacement: f.displacement,
            position: f.position,
            velocity: f.velocity,
            acceleration: f.acceleration,
            angle: f.angle,
        }
    }
}

/// Outcome of a verification request.
#[pyclass]
#[derive(Clone)]
pub struct VerificationOutcome {
    /// One of "accepted", "rejected", "rejected_invalid_input",
    /// "computation_error".
    #[pyo3(get)]
    pub kind: String,
    #[pyo3(get)]
    pub reason: Option<String>,
}

#[pymethods]
impl VerificationOutcome {
    #[getter]
    fn is_accepted(&self) -> bool {
        self.kind == "accepted"
    }

    fn __bool__(&self) -> bool {
        self.is_accepted()
    }

    fn __repr__(&self) -> String {
        match &self.reason {
            Some(reason) => format!("VerificationOutcome({}, reason={reason:?})", self.kind),
            None => format!("VerificationOutcome({})", self.kind),
        }
    }
}

impl From<RustVerificationOutcome> for VerificationOutcome {
    fn from(o: RustVerificationOutcome) -> Self {
        VerificationOutcome {
            kind: o.kind().to_string(),
            reason: o.reason(),
        }
    }
}

// ============================================================================
// Python-exposed Engine Classes
// ============================================================================

/// Signature verifier.
#[pyclass]
pub struct Verifier {
    inner: VerificationService,
}

#[pymethods]
impl Verifier {
    #[new]
    #[pyo3(signature = (min_enrolled=5, threshold_multiplier=1.8, band_radius=None))]
    fn new(min_enrolled: usize, threshold_multiplier: f64, band_radius: Option<usize>) -> PyResult<Self> {
        let mut config = RustConfig::default();
        config.enrollment.min_enrolled = min_enrolled;
        config.decision.threshold_multiplier = threshold_multiplier;
        config.alignment.band_radius = band_radius;
        let inner = VerificationService::new(&config).map_err(to_py_err)?;
        Ok(Verifier { inner })
    }

    /// Create from a JSON configuration document.
    #[staticmethod]
    fn from_json(config_json: &str) -> PyResult<Self> {
        let config = RustConfig::from_json(config_json).map_err(to_py_err)?;
        let inner = VerificationService::new(&config).map_err(to_py_err)?;
        Ok(Verifier { inner })
    }

    /// Verify a candidate batch against enrolled signatures.
    ///
    /// Never raises for bad signatures: malformed input is reported in the
    /// returned outcome.
    fn verify(
        &self,
        py: Python<'_>,
        candidates: Vec<Trajectory>,
        enrolled: Vec<Trajectory>,
    ) -> VerificationOutcome {
        let converted = to_rust_trajectories(&candidates)
            .and_then(|c| Ok((c, to_rust_trajectories(&enrolled)?)));
        let outcome = match converted {
            Ok((c, e)) => py.allow_threads(|| self.inner.verify(&c, &e)),
            Err(err) => outcome_for_error(&err),
        };
        outcome.into()
    }

    /// Verify signatures given as JSON payloads (`{"abs", "ord", "time"}`
    /// objects, singly or in arrays).
    fn verify_json(&self, py: Python<'_>, candidates_json: &str, enrolled_json: &str) -> VerificationOutcome {
        let parsed = parse_signatures(candidates_json)
            .and_then(|c| Ok((c, parse_signatures(enrolled_json)?)));
        let outcome = match parsed {
            Ok((c, e)) => py.allow_threads(|| self.inner.verify(&c, &e)),
            Err(err) => outcome_for_error(&err),
        };
        outcome.into()
    }

    /// Minimum enrollment size.
    #[getter]
    fn min_enrolled(&self) -> usize {
        self.inner.min_enrolled()
    }
}

// ============================================================================
// Python-exposed Functions
// ============================================================================

/// Normalize a raw signature and extract its features.
#[pyfunction]
fn extract_features(trajectory: &Trajectory) -> PyResult<FeatureSet> {
    let rust = RustTrajectory::try_from(trajectory).map_err(to_py_err)?;
    let features = FeatureEngine::new().compute(&rust).map_err(to_py_err)?;
    Ok(features.into())
}

/// DTW distance between two (value, time) curves.
#[pyfunction]
#[pyo3(signature = (a_values, a_time, b_values, b_time, band_radius=None))]
fn align(
    a_values: Vec<f64>,
    a_time: Vec<f64>,
    b_values: Vec<f64>,
    b_time: Vec<f64>,
    band_radius: Option<usize>,
) -> PyResult<f64> {
    let aligner = match band_radius {
        Some(r) => CurveAligner::with_band(r),
        None => CurveAligner::new(),
    };
    aligner
        .align_series(&a_values, &a_time, &b_values, &b_time)
        .map_err(to_py_err)
}

/// Install a tracing subscriber writing to stderr.
#[pyfunction]
#[pyo3(signature = (filter=None))]
fn init_logging(filter: Option<&str>) -> PyResult<()> {
    let filter = tracing_subscriber::EnvFilter::try_new(filter.unwrap_or("info"))
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

// ============================================================================
// Module Definition
// ============================================================================

/// Signature verification core - Rust components for Python.
#[pymodule]
fn sigauth(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<Trajectory>()?;
    m.add_class::<FeatureSet>()?;
    m.add_class::<VerificationOutcome>()?;

    // Engine classes
    m.add_class::<Verifier>()?;

    // Functions
    m.add_function(wrap_pyfunction!(extract_features, m)?)?;
    m.add_function(wrap_pyfunction!(align, m)?)?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;

    Ok(())
}
