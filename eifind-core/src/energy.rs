//! Neutron kinematics and the energy result types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Converts a squared velocity in (m/us)^2 to kinetic energy in meV.
pub const NEUTRON_MEV_PER_SQ_M_PER_US: f64 = 5.227e6;

/// Kinetic energy (meV) of a neutron covering `distance_m` in `tof_us`.
#[inline]
#[must_use]
pub fn energy_from_flight(distance_m: f64, tof_us: f64) -> f64 {
    energy_from_velocity(distance_m / tof_us)
}

/// Kinetic energy (meV) for a velocity in m/us.
#[inline]
#[must_use]
pub fn energy_from_velocity(velocity_m_per_us: f64) -> f64 {
    NEUTRON_MEV_PER_SQ_M_PER_US * velocity_m_per_us * velocity_m_per_us
}

/// Velocity (m/us) of a neutron with the given kinetic energy (meV).
#[inline]
#[must_use]
pub fn velocity_from_energy(energy_mev: f64) -> f64 {
    (energy_mev / NEUTRON_MEV_PER_SQ_M_PER_US).sqrt()
}

/// One candidate arrival time at monitor 2.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    /// Repetition offset relative to the located peak.
    pub irep: i32,
    /// Time of flight at monitor 2 (us).
    pub tof_us: f64,
}

/// Result of a single refinement request.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RefinedFit {
    /// Refined incident energy (meV).
    pub energy_mev: f64,
    /// Fitted peak time at the first monitor (us).
    pub tof_us: f64,
    /// Workspace index of the first monitor.
    pub monitor_index: usize,
    /// Fitted time-zero offset (us).
    pub tzero_us: f64,
}

/// A candidate that passed the acceptance tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AcceptedEnergy {
    /// Refined incident energy (meV).
    pub energy_mev: f64,
    /// Refined time of flight at monitor 2 (us).
    pub tof_us: f64,
    /// Energy estimate submitted to the refinement (meV).
    pub initial_guess_mev: f64,
}

/// Ordered set of confirmed incident energies for one run.
///
/// An empty set is a valid outcome: no candidate could be confirmed.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AcceptedEnergySet {
    entries: Vec<AcceptedEnergy>,
}

impl AcceptedEnergySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry, keeping insertion order.
    pub fn push(&mut self, entry: AcceptedEnergy) {
        self.entries.push(entry);
    }

    /// Number of accepted entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no energy was confirmed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first accepted entry, used when a single energy is required.
    #[must_use]
    pub fn primary(&self) -> Option<&AcceptedEnergy> {
        self.entries.first()
    }

    /// All accepted energies (meV) in candidate order.
    #[must_use]
    pub fn energies(&self) -> Vec<f64> {
        self.entries.iter().map(|entry| entry.energy_mev).collect()
    }

    /// Iterates entries in candidate order.
    pub fn iter(&self) -> impl Iterator<Item = &AcceptedEnergy> {
        self.entries.iter()
    }

    /// Entries as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[AcceptedEnergy] {
        &self.entries
    }
}

impl FromIterator<AcceptedEnergy> for AcceptedEnergySet {
    fn from_iter<I: IntoIterator<Item = AcceptedEnergy>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a AcceptedEnergySet {
    type Item = &'a AcceptedEnergy;
    type IntoIter = std::slice::Iter<'a, AcceptedEnergy>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
