//! End-to-end incident energy determination for one run.

use crate::aggregate::aggregate;
use crate::candidates::{generate_candidates, repetition_period};
use crate::filter::filter_candidates;
use crate::peak::locate_peak;
use crate::refine::{refine_candidates, Acceptance, CandidateOutcome};
use eifind_core::config::EiConfig;
use eifind_core::energy::{AcceptedEnergySet, Candidate};
use eifind_core::error::Result;
use eifind_core::geometry::Geometry;
use eifind_core::services::{RefinementService, RunData};

/// Intermediate state of a determination, before refinement.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateReport {
    /// Run geometry.
    pub geometry: Geometry,
    /// Last recorded chopper frequency (Hz).
    pub frequency_hz: f64,
    /// Repetition period at monitor 2 (us).
    pub period_us: f64,
    /// Located monitor-2 peak (us).
    pub peak_tof_us: f64,
    /// Every enumerated repetition.
    pub generated: Vec<Candidate>,
    /// Repetitions left after frame and minimum-time filtering.
    pub surviving: Vec<Candidate>,
}

/// Determines incident energies from monitor data and chopper speed.
///
/// Holds only configuration; every call works on its own data, so one
/// finder can serve concurrent determinations for different runs.
#[derive(Clone, Debug)]
pub struct IncidentEnergyFinder {
    config: EiConfig,
}

impl Default for IncidentEnergyFinder {
    fn default() -> Self {
        Self {
            config: EiConfig::maps_defaults(),
        }
    }
}

impl IncidentEnergyFinder {
    /// Create with a validated configuration.
    ///
    /// # Errors
    /// Returns a configuration error if `config` is unusable.
    pub fn new(config: EiConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Get current configuration.
    #[must_use]
    pub fn config(&self) -> &EiConfig {
        &self.config
    }

    /// Runs everything up to refinement: period, peak, candidates, filters.
    ///
    /// The period is checked before the geometry and the monitor, so a
    /// distance or chopper speed giving a non-positive period is always
    /// [`eifind_core::Error::InvalidGeometryOrFrequency`].
    ///
    /// # Errors
    /// Propagates data access failures, [`eifind_core::Error::InvalidGeometryOrFrequency`],
    /// and [`eifind_core::Error::EmptyPeakWindow`].
    pub fn candidates<R>(&self, run: &R) -> Result<CandidateReport>
    where
        R: RunData + ?Sized,
    {
        let geometry = run.geometry()?;
        let frequency_hz = run.last_log_value(&self.config.chopper_log)?;
        let period_us =
            repetition_period(&geometry, frequency_hz, self.config.pulses_per_rotation)?;
        geometry.validate()?;

        let spectrum = run.monitor_spectrum(self.config.monitor_2.index)?;
        let peak_tof_us = locate_peak(spectrum, &self.config.peak_window)?;

        self.report(geometry, frequency_hz, period_us, peak_tof_us)
    }

    /// As [`IncidentEnergyFinder::candidates`] for an already located peak.
    ///
    /// # Errors
    /// Returns [`eifind_core::Error::InvalidGeometryOrFrequency`] for a
    /// non-positive period.
    pub fn candidates_from_peak(
        &self,
        geometry: &Geometry,
        frequency_hz: f64,
        peak_tof_us: f64,
    ) -> Result<CandidateReport> {
        let period_us =
            repetition_period(geometry, frequency_hz, self.config.pulses_per_rotation)?;
        geometry.validate()?;
        self.report(*geometry, frequency_hz, period_us, peak_tof_us)
    }

    /// Full determination for a loaded run.
    ///
    /// An empty set is a successful result: no candidate was confirmed.
    ///
    /// # Errors
    /// Fails only before refinement starts; per-candidate fit failures are
    /// absorbed.
    pub fn determine<R, S>(&self, run: &R, service: &S) -> Result<AcceptedEnergySet>
    where
        R: RunData + ?Sized,
        S: RefinementService + ?Sized,
    {
        let report = self.candidates(run)?;
        Ok(self.refine(&report, service))
    }

    /// Full determination from a located peak.
    ///
    /// # Errors
    /// Returns [`eifind_core::Error::InvalidGeometryOrFrequency`] for a
    /// non-positive period.
    pub fn determine_from_peak<S>(
        &self,
        geometry: &Geometry,
        frequency_hz: f64,
        peak_tof_us: f64,
        service: &S,
    ) -> Result<AcceptedEnergySet>
    where
        S: RefinementService + ?Sized,
    {
        let report = self.candidates_from_peak(geometry, frequency_hz, peak_tof_us)?;
        Ok(self.refine(&report, service))
    }

    /// Refines the surviving candidates of `report` and collects the
    /// accepted ones.
    pub fn refine<S>(&self, report: &CandidateReport, service: &S) -> AcceptedEnergySet
    where
        S: RefinementService + ?Sized,
    {
        aggregate(self.outcomes(report, service))
    }

    /// Per-candidate outcomes in candidate order, for diagnostics.
    pub fn outcomes<S>(&self, report: &CandidateReport, service: &S) -> Vec<CandidateOutcome>
    where
        S: RefinementService + ?Sized,
    {
        refine_candidates(
            &report.surviving,
            &report.geometry,
            self.config.monitor_pair(),
            Acceptance::from_config(&self.config),
            service,
            self.config.parallel_refinement,
        )
    }

    fn report(
        &self,
        geometry: Geometry,
        frequency_hz: f64,
        period_us: f64,
        peak_tof_us: f64,
    ) -> Result<CandidateReport> {
        log::info!(
            "chopper at {frequency_hz} Hz, repetition period {period_us:.3} us, peak at {peak_tof_us} us"
        );
        let generated = generate_candidates(
            peak_tof_us,
            period_us,
            self.config.first_rep_offset,
            self.config.candidate_count,
        )?;
        let surviving = filter_candidates(
            &generated,
            &geometry,
            self.config.frame_limit_us,
            self.config.min_candidate_tof_us,
        );
        log::debug!(
            "{} of {} candidate(s) survive filtering",
            surviving.len(),
            generated.len()
        );

        Ok(CandidateReport {
            geometry,
            frequency_hz,
            period_us,
            peak_tof_us,
            generated,
            surviving,
        })
    }
}
