//! eifind-algorithms: Automatic incident energy determination.
//!
//! The determination runs in stages:
//! - **Peak location** - strongest bin of monitor 2 inside the peak window
//! - **Candidate generation** - consecutive chopper repetitions around the peak
//! - **Candidate filtering** - monitor-3 frame check and minimum time
//! - **Refinement** - one fit per candidate, accepted against tolerances
//! - **Aggregation** - accepted energies in candidate order
//!
//! [`IncidentEnergyFinder`] wires the stages together.
//!
#![warn(missing_docs)]

mod aggregate;
mod candidates;
mod filter;
mod finder;
mod peak;
mod refine;
mod resolve;
pub mod two_monitor;

pub use aggregate::aggregate;
pub use candidates::{generate_candidates, repetition_period};
pub use filter::filter_candidates;
pub use finder::{CandidateReport, IncidentEnergyFinder};
pub use peak::locate_peak;
pub use refine::{
    initial_energy_guess, refine_candidate, refine_candidates, Acceptance, CandidateOutcome,
    Rejection,
};
pub use resolve::resolve_incident_energy;
pub use two_monitor::{TwoMonitorRefiner, DEFAULT_SEARCH_FRACTION};

// Re-export core types used in the public API
pub use eifind_core::{AcceptedEnergy, AcceptedEnergySet, Candidate, EiConfig, RefinedFit};
