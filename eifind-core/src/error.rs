//! Error types for eifind-core.

use thiserror::Error;

/// Result type alias for eifind operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for incident energy determination.
#[derive(Error, Debug)]
pub enum Error {
    /// The repetition period derived from geometry and chopper speed is not
    /// a positive finite number. Fatal for the whole determination.
    #[error("invalid geometry or chopper frequency: repetition period is {period_us} us")]
    InvalidGeometryOrFrequency { period_us: f64 },

    /// A flight-path distance is not usable.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The named log channel does not exist for the run.
    #[error("log channel not found: {0}")]
    MissingLog(String),

    /// The named log channel exists but holds no samples.
    #[error("log channel has no samples: {0}")]
    EmptyLog(String),

    /// No monitor spectrum at the requested workspace index.
    #[error("monitor not found at index {0}")]
    MonitorNotFound(usize),

    /// The peak search window contains no usable bins.
    #[error("no usable bins in peak window {start}..{end} us")]
    EmptyPeakWindow { start: f64, end: f64 },

    /// Invalid histogram data.
    #[error("invalid spectrum: {0}")]
    InvalidSpectrum(String),

    /// Automatic determination confirmed no energy and no fallback was given.
    #[error("no incident energy could be determined")]
    NoEnergyDetermined,

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Per-candidate refinement failures.
///
/// These are absorbed by the energy refiner and never reach the caller of a
/// determination.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefinementError {
    /// The fit could not settle on a peak.
    #[error("fit did not converge: {reason}")]
    FitDidNotConverge { reason: String },

    /// A monitor had nothing to fit inside the expected time window.
    #[error("no counts in monitor {monitor} between {start_us:.1} and {end_us:.1} us")]
    NoCountsInWindow {
        monitor: usize,
        start_us: f64,
        end_us: f64,
    },

    /// The fitted peaks imply an unphysical flight.
    #[error("non-physical fit: {0}")]
    NonPhysicalFit(String),

    /// The data access layer failed while the fit was running.
    #[error("data access failed during fit: {0}")]
    DataAccess(String),
}

impl RefinementError {
    /// Shorthand for a non-convergence failure.
    pub fn not_converged(reason: impl Into<String>) -> Self {
        Self::FitDidNotConverge {
            reason: reason.into(),
        }
    }
}
