//! Collection of accepted candidates into the final energy set.

use crate::refine::CandidateOutcome;
use eifind_core::energy::AcceptedEnergySet;

/// Gathers accepted entries in candidate order and logs each one.
///
/// Rejected and failed candidates are skipped. An empty result means no
/// energy was confirmed.
pub fn aggregate<I>(outcomes: I) -> AcceptedEnergySet
where
    I: IntoIterator<Item = CandidateOutcome>,
{
    let set: AcceptedEnergySet = outcomes
        .into_iter()
        .filter_map(|outcome| outcome.accepted().copied())
        .collect();

    for entry in &set {
        log::info!(
            "{:.6} meV at TOF = {:.6} mus",
            entry.energy_mev,
            entry.tof_us
        );
    }
    if set.is_empty() {
        log::info!("no incident energy confirmed");
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refine::Rejection;
    use eifind_core::energy::{AcceptedEnergy, Candidate, RefinedFit};
    use eifind_core::error::RefinementError;

    fn candidate(irep: i32) -> Candidate {
        Candidate {
            irep,
            tof_us: 1000.0 * f64::from(irep),
        }
    }

    fn accepted(irep: i32, energy_mev: f64) -> CandidateOutcome {
        CandidateOutcome::Accepted {
            candidate: candidate(irep),
            entry: AcceptedEnergy {
                energy_mev,
                tof_us: 1000.0 * f64::from(irep),
                initial_guess_mev: energy_mev,
            },
        }
    }

    #[test]
    fn test_keeps_only_accepted_in_order() {
        let outcomes = vec![
            accepted(1, 300.0),
            CandidateOutcome::FitFailed {
                candidate: candidate(2),
                error: RefinementError::not_converged("no peak"),
            },
            CandidateOutcome::Rejected {
                candidate: candidate(3),
                fit: RefinedFit {
                    energy_mev: 50.0,
                    tof_us: 3100.0,
                    monitor_index: 2,
                    tzero_us: 0.0,
                },
                reason: Rejection::TofMismatch { offset_us: 100.0 },
            },
            accepted(4, 20.0),
        ];

        let set = aggregate(outcomes);
        assert_eq!(set.energies(), vec![300.0, 20.0]);
    }

    #[test]
    fn test_empty_input_gives_empty_set() {
        let set = aggregate(Vec::new());
        assert!(set.is_empty());
    }
}
