//! Traits for the collaborators around a determination.
//!
//! The determination never reads files itself. The surrounding reduction
//! supplies run data through [`GeometryProvider`], [`ChopperLogReader`] and
//! [`MonitorSpectra`], and a precise energy fit through [`RefinementService`].

use crate::config::MonitorPair;
use crate::energy::RefinedFit;
use crate::error::{RefinementError, Result};
use crate::geometry::Geometry;
use crate::spectrum::Spectrum;

/// Supplies source-to-component distances for a run.
pub trait GeometryProvider {
    /// Distances to monitor 2, monitor 3 and the Fermi chopper.
    fn geometry(&self) -> Result<Geometry>;
}

/// Supplies values from the run's sample logs.
pub trait ChopperLogReader {
    /// Last recorded sample of the named log channel.
    fn last_log_value(&self, channel: &str) -> Result<f64>;
}

/// Supplies histogrammed monitor spectra by zero-based workspace index.
pub trait MonitorSpectra {
    /// Spectrum of the monitor at `index`.
    fn monitor_spectrum(&self, index: usize) -> Result<&Spectrum>;
}

/// Everything a determination needs from a loaded run.
pub trait RunData: GeometryProvider + ChopperLogReader + MonitorSpectra {}

impl<T> RunData for T where T: GeometryProvider + ChopperLogReader + MonitorSpectra {}

/// Fits a precise incident energy around a rough guess.
///
/// Calls for distinct guesses must be independent; implementations are shared
/// across the rayon pool when parallel refinement is enabled.
pub trait RefinementService: Send + Sync {
    /// Refine `energy_guess_mev` using the two monitors.
    fn refine(
        &self,
        monitors: MonitorPair,
        energy_guess_mev: f64,
    ) -> std::result::Result<RefinedFit, RefinementError>;
}

impl<S: RefinementService + ?Sized> RefinementService for &S {
    fn refine(
        &self,
        monitors: MonitorPair,
        energy_guess_mev: f64,
    ) -> std::result::Result<RefinedFit, RefinementError> {
        (**self).refine(monitors, energy_guess_mev)
    }
}
