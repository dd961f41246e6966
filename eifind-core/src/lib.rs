//! eifind-core: Core types and traits for automatic incident energy
//! determination on direct-geometry chopper spectrometers.
//!
//! This crate holds the data model shared by the algorithms and I/O crates:
//! flight-path geometry, monitor spectra, chopper logs, the per-instrument
//! configuration record, and the traits through which a determination talks
//! to the surrounding reduction.
//!

pub mod config;
pub mod energy;
pub mod error;
pub mod geometry;
pub mod services;
pub mod setting;
pub mod spectrum;
pub mod timeseries;

pub use config::{EiConfig, MonitorId, MonitorPair};
pub use energy::{
    energy_from_flight, energy_from_velocity, velocity_from_energy, AcceptedEnergy,
    AcceptedEnergySet, Candidate, RefinedFit, NEUTRON_MEV_PER_SQ_M_PER_US,
};
pub use error::{Error, RefinementError, Result};
pub use geometry::Geometry;
pub use services::{
    ChopperLogReader, GeometryProvider, MonitorSpectra, RefinementService, RunData,
};
pub use setting::{EnergySelection, IncidentEnergy};
pub use spectrum::{Spectrum, TofBinning};
pub use timeseries::TimeSeries;
