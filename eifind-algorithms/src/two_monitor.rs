//! Two-monitor time-of-flight energy fit.
//!
//! Given a rough energy, predicts when the pulse reaches each monitor, finds
//! the peak near each prediction, and derives the energy from the flight
//! time between the two monitors:
//!
//! - `v = (L_m3 - L_m2) / (t3 - t2)`
//! - `E = K * v^2`
//! - `tzero = t2 - L_m2 / v`
//!
//! Peak times are count-weighted centres over the contiguous region at or
//! above half the peak height.

use eifind_core::config::MonitorPair;
use eifind_core::energy::{energy_from_velocity, velocity_from_energy, RefinedFit};
use eifind_core::error::RefinementError;
use eifind_core::geometry::Geometry;
use eifind_core::services::{MonitorSpectra, RefinementService};
use eifind_core::spectrum::Spectrum;

/// Default half-width of the peak search window, as a fraction of the
/// predicted arrival time.
pub const DEFAULT_SEARCH_FRACTION: f64 = 0.1;

/// [`RefinementService`] fitting peaks in two monitor spectra.
pub struct TwoMonitorRefiner<'a, M: ?Sized> {
    spectra: &'a M,
    geometry: Geometry,
    search_fraction: f64,
}

impl<'a, M> TwoMonitorRefiner<'a, M>
where
    M: MonitorSpectra + Sync + ?Sized,
{
    /// Create a refiner over the run's monitor spectra.
    pub fn new(spectra: &'a M, geometry: Geometry) -> Self {
        Self {
            spectra,
            geometry,
            search_fraction: DEFAULT_SEARCH_FRACTION,
        }
    }

    /// Set the search window half-width fraction.
    #[must_use]
    pub fn with_search_fraction(mut self, fraction: f64) -> Self {
        self.search_fraction = fraction;
        self
    }

    fn spectrum(&self, index: usize) -> Result<&Spectrum, RefinementError> {
        self.spectra
            .monitor_spectrum(index)
            .map_err(|e| RefinementError::DataAccess(e.to_string()))
    }

    fn fit_peak(
        &self,
        spectrum: &Spectrum,
        monitor: usize,
        expected_us: f64,
    ) -> Result<f64, RefinementError> {
        let start_us = expected_us * (1.0 - self.search_fraction);
        let end_us = expected_us * (1.0 + self.search_fraction);
        let no_counts = || RefinementError::NoCountsInWindow {
            monitor,
            start_us,
            end_us,
        };

        let range = spectrum.bins_within(start_us, end_us);
        if range.is_empty() {
            return Err(no_counts());
        }
        let (peak, height) = spectrum
            .max_bin_in(range.clone())
            .filter(|&(_, height)| height > 0.0)
            .ok_or_else(no_counts)?;

        let counts = spectrum.counts();
        let half = 0.5 * height;
        let mut left = peak;
        while left > range.start && counts[left - 1] >= half {
            left -= 1;
        }
        let mut right = peak;
        while right + 1 < range.end && counts[right + 1] >= half {
            right += 1;
        }
        if left == range.start || right + 1 == range.end {
            return Err(RefinementError::not_converged(format!(
                "peak in monitor {monitor} not resolved inside {start_us:.1}..{end_us:.1} us"
            )));
        }

        let (weighted, total) = (left..=right).fold((0.0, 0.0), |(weighted, total), i| {
            (
                weighted + spectrum.bin_centre(i) * counts[i],
                total + counts[i],
            )
        });
        Ok(weighted / total)
    }
}

impl<M> RefinementService for TwoMonitorRefiner<'_, M>
where
    M: MonitorSpectra + Sync + ?Sized,
{
    fn refine(
        &self,
        monitors: MonitorPair,
        energy_guess_mev: f64,
    ) -> Result<RefinedFit, RefinementError> {
        let velocity = velocity_from_energy(energy_guess_mev);
        if !velocity.is_finite() || velocity <= 0.0 {
            return Err(RefinementError::NonPhysicalFit(format!(
                "energy guess {energy_guess_mev} meV has no real velocity"
            )));
        }
        if self.geometry.l_m3 <= self.geometry.l_m2 {
            return Err(RefinementError::NonPhysicalFit(format!(
                "monitor 3 at {} m is not beyond monitor 2 at {} m",
                self.geometry.l_m3, self.geometry.l_m2
            )));
        }

        let first = monitors.first.index;
        let second = monitors.second.index;
        let t2 = self.fit_peak(self.spectrum(first)?, first, self.geometry.l_m2 / velocity)?;
        let t3 = self.fit_peak(self.spectrum(second)?, second, self.geometry.l_m3 / velocity)?;
        if t3 <= t2 {
            return Err(RefinementError::NonPhysicalFit(format!(
                "monitor 3 peak at {t3:.3} us precedes monitor 2 peak at {t2:.3} us"
            )));
        }

        let fitted_velocity = (self.geometry.l_m3 - self.geometry.l_m2) / (t3 - t2);
        Ok(RefinedFit {
            energy_mev: energy_from_velocity(fitted_velocity),
            tof_us: t2,
            monitor_index: first,
            tzero_us: t2 - self.geometry.l_m2 / fitted_velocity,
        })
    }
}
