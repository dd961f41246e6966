//! Instrument configuration for incident energy determination.

use crate::error::{Error, Result};
use crate::spectrum::TofBinning;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifies a monitor both by its absolute spectrum number and by its
/// zero-based index in the monitor workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MonitorId {
    /// Absolute spectrum number in the raw file.
    pub spectrum_number: u32,
    /// Workspace index of the spectrum.
    pub index: usize,
}

impl MonitorId {
    /// Creates a monitor identifier.
    #[must_use]
    pub fn new(spectrum_number: u32, index: usize) -> Self {
        Self {
            spectrum_number,
            index,
        }
    }
}

/// The pair of monitors handed to the refinement service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorPair {
    /// Upstream monitor (monitor 2).
    pub first: MonitorId,
    /// Downstream monitor (monitor 3).
    pub second: MonitorId,
}

/// Configuration for automatic incident energy determination.
///
/// All times are in microseconds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EiConfig {
    /// Monitor used to locate the peak and as the first refinement monitor.
    pub monitor_2: MonitorId,
    /// Farther monitor used for the frame check and as the second refinement monitor.
    pub monitor_3: MonitorId,
    /// Log channel holding the Fermi chopper frequency (Hz).
    pub chopper_log: String,
    /// Rebinning applied to monitor 2 before the maximum search.
    pub peak_window: TofBinning,
    /// Candidates whose monitor-3 arrival is at or past this time are dropped.
    pub frame_limit_us: f64,
    /// Candidates at or below this monitor-2 time are dropped.
    pub min_candidate_tof_us: f64,
    /// Maximum |candidate time - refined time| for acceptance.
    pub tof_tolerance_us: f64,
    /// Maximum |tzero| for acceptance.
    pub tzero_tolerance_us: f64,
    /// Repetition offset the start search begins at.
    pub first_rep_offset: i32,
    /// Number of consecutive repetitions enumerated.
    pub candidate_count: usize,
    /// Chopper openings per rotation (2 with pi-pulses).
    pub pulses_per_rotation: u32,
    /// Refine candidates on the rayon pool instead of sequentially.
    pub parallel_refinement: bool,
}

impl Default for EiConfig {
    fn default() -> Self {
        Self::maps_defaults()
    }
}

impl EiConfig {
    /// MAPS (ISIS) reference configuration.
    #[must_use]
    pub fn maps_defaults() -> Self {
        Self {
            monitor_2: MonitorId::new(41475, 2),
            monitor_3: MonitorId::new(41476, 3),
            chopper_log: "Fermi_Speed".to_string(),
            peak_window: TofBinning::new(200.0, 2.0, 18000.0),
            frame_limit_us: 19999.0,
            min_candidate_tof_us: 200.0,
            tof_tolerance_us: 20.0,
            tzero_tolerance_us: 100.0,
            first_rep_offset: -5,
            candidate_count: 20,
            pulses_per_rotation: 2,
            parallel_refinement: false,
        }
    }

    /// Set the two monitors.
    #[must_use]
    pub fn with_monitors(mut self, monitor_2: MonitorId, monitor_3: MonitorId) -> Self {
        self.monitor_2 = monitor_2;
        self.monitor_3 = monitor_3;
        self
    }

    /// Set the chopper log channel name.
    #[must_use]
    pub fn with_chopper_log(mut self, name: impl Into<String>) -> Self {
        self.chopper_log = name.into();
        self
    }

    /// Set the peak search binning.
    #[must_use]
    pub fn with_peak_window(mut self, window: TofBinning) -> Self {
        self.peak_window = window;
        self
    }

    /// Set the monitor-3 frame limit.
    #[must_use]
    pub fn with_frame_limit(mut self, frame_limit_us: f64) -> Self {
        self.frame_limit_us = frame_limit_us;
        self
    }

    /// Set the minimum plausible candidate time.
    #[must_use]
    pub fn with_min_candidate_tof(mut self, min_tof_us: f64) -> Self {
        self.min_candidate_tof_us = min_tof_us;
        self
    }

    /// Set the acceptance tolerances.
    #[must_use]
    pub fn with_tolerances(mut self, tof_us: f64, tzero_us: f64) -> Self {
        self.tof_tolerance_us = tof_us;
        self.tzero_tolerance_us = tzero_us;
        self
    }

    /// Set the number of enumerated repetitions.
    #[must_use]
    pub fn with_candidate_count(mut self, count: usize) -> Self {
        self.candidate_count = count;
        self
    }

    /// Set the chopper openings per rotation.
    #[must_use]
    pub fn with_pulses_per_rotation(mut self, pulses: u32) -> Self {
        self.pulses_per_rotation = pulses;
        self
    }

    /// Enable or disable parallel refinement.
    #[must_use]
    pub fn with_parallel_refinement(mut self, parallel: bool) -> Self {
        self.parallel_refinement = parallel;
        self
    }

    /// Monitors in refinement order.
    #[must_use]
    pub fn monitor_pair(&self) -> MonitorPair {
        MonitorPair {
            first: self.monitor_2,
            second: self.monitor_3,
        }
    }

    /// Checks the configuration is usable.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.peak_window.validate()?;
        if self.chopper_log.is_empty() {
            return Err(Error::ConfigError("chopper log name is empty".to_string()));
        }
        if self.monitor_2.index == self.monitor_3.index {
            return Err(Error::ConfigError(format!(
                "monitor 2 and monitor 3 share index {}",
                self.monitor_2.index
            )));
        }
        for (name, value) in [
            ("frame_limit_us", self.frame_limit_us),
            ("min_candidate_tof_us", self.min_candidate_tof_us),
            ("tof_tolerance_us", self.tof_tolerance_us),
            ("tzero_tolerance_us", self.tzero_tolerance_us),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::ConfigError(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.candidate_count == 0 {
            return Err(Error::ConfigError(
                "candidate_count must be at least 1".to_string(),
            ));
        }
        let last_offset = i32::try_from(self.candidate_count)
            .ok()
            .and_then(|count| self.first_rep_offset.checked_add(count));
        if last_offset.is_none() {
            return Err(Error::ConfigError(format!(
                "first_rep_offset {} plus candidate_count {} exceeds the repetition range",
                self.first_rep_offset, self.candidate_count
            )));
        }
        if self.pulses_per_rotation == 0 {
            return Err(Error::ConfigError(
                "pulses_per_rotation must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_defaults() {
        let config = EiConfig::maps_defaults();
        assert_eq!(config.monitor_2, MonitorId::new(41475, 2));
        assert_eq!(config.monitor_3, MonitorId::new(41476, 3));
        assert_eq!(config.chopper_log, "Fermi_Speed");
        assert_eq!(config.candidate_count, 20);
        assert_eq!(config.first_rep_offset, -5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = EiConfig::default()
            .with_frame_limit(39999.0)
            .with_tolerances(10.0, 50.0)
            .with_chopper_log("Chopper_Speed")
            .with_parallel_refinement(true);

        assert!((config.frame_limit_us - 39999.0).abs() < f64::EPSILON);
        assert!((config.tof_tolerance_us - 10.0).abs() < f64::EPSILON);
        assert!((config.tzero_tolerance_us - 50.0).abs() < f64::EPSILON);
        assert_eq!(config.chopper_log, "Chopper_Speed");
        assert!(config.parallel_refinement);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(EiConfig::default().with_candidate_count(0).validate().is_err());
        assert!(EiConfig::default()
            .with_pulses_per_rotation(0)
            .validate()
            .is_err());
        assert!(EiConfig::default()
            .with_tolerances(-1.0, 100.0)
            .validate()
            .is_err());
        assert!(EiConfig::default()
            .with_monitors(MonitorId::new(1, 0), MonitorId::new(2, 0))
            .validate()
            .is_err());
        assert!(EiConfig::default()
            .with_peak_window(TofBinning::new(18000.0, 2.0, 200.0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_rejects_repetition_overflow() {
        let near_max = EiConfig {
            first_rep_offset: i32::MAX - 2,
            ..EiConfig::default()
        };
        assert!(matches!(near_max.validate(), Err(Error::ConfigError(_))));

        let huge_count = EiConfig::default().with_candidate_count(usize::MAX);
        assert!(matches!(huge_count.validate(), Err(Error::ConfigError(_))));

        let at_limit = EiConfig {
            first_rep_offset: i32::MAX - 20,
            ..EiConfig::default()
        };
        assert!(at_limit.validate().is_ok());
    }
}
