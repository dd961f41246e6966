//! Per-candidate energy refinement and acceptance.
//!
//! Every surviving candidate gets exactly one refinement attempt. A failed
//! fit only removes that candidate; it never aborts the determination.

use eifind_core::config::{EiConfig, MonitorPair};
use eifind_core::energy::{energy_from_flight, AcceptedEnergy, Candidate, RefinedFit};
use eifind_core::error::RefinementError;
use eifind_core::geometry::Geometry;
use eifind_core::services::RefinementService;
use rayon::prelude::*;

/// Tolerances a refined fit must meet for its candidate to be accepted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Acceptance {
    /// Maximum |candidate time - refined time| (us).
    pub tof_tolerance_us: f64,
    /// Maximum |tzero| (us).
    pub tzero_tolerance_us: f64,
}

impl Acceptance {
    /// Tolerances taken from a configuration.
    #[must_use]
    pub fn from_config(config: &EiConfig) -> Self {
        Self {
            tof_tolerance_us: config.tof_tolerance_us,
            tzero_tolerance_us: config.tzero_tolerance_us,
        }
    }

    /// Checks `fit` against the candidate time it was refined from.
    ///
    /// Non-finite fit values never pass.
    ///
    /// # Errors
    /// Returns the [`Rejection`] describing the first violated bound.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn check(&self, candidate_tof_us: f64, fit: &RefinedFit) -> Result<(), Rejection> {
        let tof_offset = (candidate_tof_us - fit.tof_us).abs();
        if !(tof_offset <= self.tof_tolerance_us) {
            return Err(Rejection::TofMismatch {
                offset_us: tof_offset,
            });
        }
        if !(fit.tzero_us.abs() <= self.tzero_tolerance_us) {
            return Err(Rejection::TzeroTooLarge {
                tzero_us: fit.tzero_us,
            });
        }
        Ok(())
    }
}

/// Why a converged fit was not accepted.
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Rejection {
    /// Refined time too far from the candidate time.
    TofMismatch { offset_us: f64 },
    /// Time-zero offset outside tolerance.
    TzeroTooLarge { tzero_us: f64 },
}

/// What happened to one candidate.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum CandidateOutcome {
    /// Fit converged within tolerance.
    Accepted {
        candidate: Candidate,
        entry: AcceptedEnergy,
    },
    /// Fit converged outside tolerance.
    Rejected {
        candidate: Candidate,
        fit: RefinedFit,
        reason: Rejection,
    },
    /// Fit did not produce a result.
    FitFailed {
        candidate: Candidate,
        error: RefinementError,
    },
}

impl CandidateOutcome {
    /// The accepted entry, if any.
    #[must_use]
    pub fn accepted(&self) -> Option<&AcceptedEnergy> {
        match self {
            Self::Accepted { entry, .. } => Some(entry),
            _ => None,
        }
    }

    /// The candidate this outcome belongs to.
    #[must_use]
    pub fn candidate(&self) -> &Candidate {
        match self {
            Self::Accepted { candidate, .. }
            | Self::Rejected { candidate, .. }
            | Self::FitFailed { candidate, .. } => candidate,
        }
    }
}

/// Initial energy estimate (meV) for a neutron crossing `l_m2` in `tof_us`.
#[inline]
#[must_use]
pub fn initial_energy_guess(l_m2: f64, tof_us: f64) -> f64 {
    energy_from_flight(l_m2, tof_us)
}

/// Refines one candidate and applies the acceptance tolerances.
pub fn refine_candidate<S>(
    candidate: Candidate,
    geometry: &Geometry,
    monitors: MonitorPair,
    acceptance: Acceptance,
    service: &S,
) -> CandidateOutcome
where
    S: RefinementService + ?Sized,
{
    let guess = initial_energy_guess(geometry.l_m2, candidate.tof_us);
    log::debug!(
        "refining candidate irep={} at {:.3} us with guess {guess:.4} meV",
        candidate.irep,
        candidate.tof_us
    );

    let fit = match service.refine(monitors, guess) {
        Ok(fit) => fit,
        Err(error) => {
            log::warn!(
                "refinement failed for candidate at {:.3} us: {error}",
                candidate.tof_us
            );
            return CandidateOutcome::FitFailed { candidate, error };
        }
    };

    match acceptance.check(candidate.tof_us, &fit) {
        Ok(()) => CandidateOutcome::Accepted {
            candidate,
            entry: AcceptedEnergy {
                energy_mev: fit.energy_mev,
                tof_us: fit.tof_us,
                initial_guess_mev: guess,
            },
        },
        Err(reason) => {
            log::debug!(
                "rejecting candidate at {:.3} us: {reason:?}",
                candidate.tof_us
            );
            CandidateOutcome::Rejected {
                candidate,
                fit,
                reason,
            }
        }
    }
}

/// Refines every candidate, returning outcomes in candidate order.
///
/// With `parallel` set the work fans out over the rayon pool; the indexed
/// collect keeps the input order.
pub fn refine_candidates<S>(
    candidates: &[Candidate],
    geometry: &Geometry,
    monitors: MonitorPair,
    acceptance: Acceptance,
    service: &S,
    parallel: bool,
) -> Vec<CandidateOutcome>
where
    S: RefinementService + ?Sized,
{
    if parallel {
        candidates
            .par_iter()
            .map(|&candidate| refine_candidate(candidate, geometry, monitors, acceptance, service))
            .collect()
    } else {
        candidates
            .iter()
            .map(|&candidate| refine_candidate(candidate, geometry, monitors, acceptance, service))
            .collect()
    }
}
