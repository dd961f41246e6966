//! Instrument flight-path geometry.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Source-to-component distances for one run, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Geometry {
    /// Source to monitor 2.
    pub l_m2: f64,
    /// Source to monitor 3.
    pub l_m3: f64,
    /// Source to the Fermi chopper.
    pub l_fermi: f64,
}

impl Geometry {
    /// Creates a geometry, rejecting non-finite or non-positive distances.
    ///
    /// # Errors
    /// Returns [`Error::InvalidGeometry`] if any distance is unusable.
    pub fn new(l_m2: f64, l_m3: f64, l_fermi: f64) -> Result<Self> {
        let geometry = Self {
            l_m2,
            l_m3,
            l_fermi,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Checks every distance is a positive finite number.
    ///
    /// # Errors
    /// Returns [`Error::InvalidGeometry`] naming the first bad distance.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("l_m2", self.l_m2),
            ("l_m3", self.l_m3),
            ("l_fermi", self.l_fermi),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidGeometry(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Scale factor from a monitor-2 arrival time to the monitor-3 arrival time.
    #[inline]
    #[must_use]
    pub fn monitor_3_ratio(&self) -> f64 {
        self.l_m3 / self.l_m2
    }
}
