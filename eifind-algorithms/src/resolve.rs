//! Turning an operator setting into the energies a reduction runs with.

use eifind_core::energy::AcceptedEnergySet;
use eifind_core::error::{Error, Result};
use eifind_core::setting::{EnergySelection, IncidentEnergy};

/// Resolves `setting` to the list of energies (meV) to reduce.
///
/// Fixed settings pass through untouched. `Auto` calls `determine`; an
/// empty determination falls back to `fallback` when one is given.
///
/// # Errors
/// Propagates errors from `determine`, and returns
/// [`Error::NoEnergyDetermined`] when automatic determination confirmed
/// nothing and there is no fallback.
pub fn resolve_incident_energy<F>(
    setting: &IncidentEnergy,
    selection: EnergySelection,
    fallback: Option<f64>,
    determine: F,
) -> Result<Vec<f64>>
where
    F: FnOnce() -> Result<AcceptedEnergySet>,
{
    match setting {
        IncidentEnergy::Fixed(energy) => Ok(vec![*energy]),
        IncidentEnergy::List(energies) => Ok(energies.clone()),
        IncidentEnergy::Auto => {
            let set = determine()?;
            if set.is_empty() {
                return match fallback {
                    Some(energy) => {
                        log::warn!("automatic determination failed, using {energy} meV");
                        Ok(vec![energy])
                    }
                    None => Err(Error::NoEnergyDetermined),
                };
            }
            Ok(match selection {
                EnergySelection::Primary => {
                    set.primary().map(|e| e.energy_mev).into_iter().collect()
                }
                EnergySelection::All => set.energies(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eifind_core::energy::AcceptedEnergy;

    fn two_energies() -> AcceptedEnergySet {
        [(60.0, 3000.0), (20.9, 5000.0)]
            .into_iter()
            .map(|(energy_mev, tof_us)| AcceptedEnergy {
                energy_mev,
                tof_us,
                initial_guess_mev: energy_mev,
            })
            .collect()
    }

    #[test]
    fn test_fixed_skips_determination() {
        let energies = resolve_incident_energy(
            &IncidentEnergy::Fixed(45.0),
            EnergySelection::Primary,
            None,
            || panic!("determination must not run"),
        )
        .unwrap();
        assert_eq!(energies, vec![45.0]);
    }

    #[test]
    fn test_list_passes_through() {
        let energies = resolve_incident_energy(
            &IncidentEnergy::List(vec![10.0, 25.0]),
            EnergySelection::Primary,
            None,
            || panic!("determination must not run"),
        )
        .unwrap();
        assert_eq!(energies, vec![10.0, 25.0]);
    }

    #[test]
    fn test_auto_primary_and_all() {
        let primary = resolve_incident_energy(
            &IncidentEnergy::Auto,
            EnergySelection::Primary,
            None,
            || Ok(two_energies()),
        )
        .unwrap();
        assert_eq!(primary, vec![60.0]);

        let all = resolve_incident_energy(&IncidentEnergy::Auto, EnergySelection::All, None, || {
            Ok(two_energies())
        })
        .unwrap();
        assert_eq!(all, vec![60.0, 20.9]);
    }

    #[test]
    fn test_auto_empty_uses_fallback() {
        let energies = resolve_incident_energy(
            &IncidentEnergy::Auto,
            EnergySelection::All,
            Some(12.0),
            || Ok(AcceptedEnergySet::new()),
        )
        .unwrap();
        assert_eq!(energies, vec![12.0]);
    }

    #[test]
    fn test_auto_empty_without_fallback_fails() {
        let err = resolve_incident_energy(
            &IncidentEnergy::Auto,
            EnergySelection::Primary,
            None,
            || Ok(AcceptedEnergySet::new()),
        )
        .unwrap_err();
        assert!(matches!(err, Error::NoEnergyDetermined));
    }

    #[test]
    fn test_auto_propagates_fatal_errors() {
        let err = resolve_incident_energy(
            &IncidentEnergy::Auto,
            EnergySelection::Primary,
            Some(12.0),
            || Err(Error::InvalidGeometryOrFrequency { period_us: 0.0 }),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidGeometryOrFrequency { .. }));
    }
}
