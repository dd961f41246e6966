//! Sample logs recorded against run time.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named time-series log (e.g. a chopper speed readback).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeSeries {
    /// Sample times in seconds from run start.
    pub times: Vec<f64>,
    /// Logged value at each sample time.
    pub values: Vec<f64>,
}

impl TimeSeries {
    /// Creates a log from matching time and value columns.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] if the columns have different lengths.
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        if times.len() != values.len() {
            return Err(Error::ConfigError(format!(
                "time-series has {} times but {} values",
                times.len(),
                values.len()
            )));
        }
        Ok(Self { times, values })
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the log holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The most recently recorded value.
    #[must_use]
    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }
}
