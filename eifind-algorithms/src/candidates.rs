//! Repetition period and candidate enumeration.
//!
//! A Fermi chopper opens `pulses_per_rotation` times per turn, so neutrons
//! of several incident energies reach monitor 2 one repetition period apart.
//! Starting from the located peak, the generator steps back to the earliest
//! repetition with a positive arrival time and enumerates a fixed number of
//! consecutive repetitions from there.
#![allow(clippy::cast_possible_truncation)]

use eifind_core::energy::Candidate;
use eifind_core::error::{Error, Result};
use eifind_core::geometry::Geometry;

/// Time (us) between successive repetitions at monitor 2.
///
/// `period = (L_m2 / L_fermi) * 1e6 / frequency / pulses_per_rotation`
///
/// # Errors
/// Returns [`Error::InvalidGeometryOrFrequency`] unless the period is a
/// positive finite number.
pub fn repetition_period(
    geometry: &Geometry,
    frequency_hz: f64,
    pulses_per_rotation: u32,
) -> Result<f64> {
    let period_us =
        geometry.l_m2 / geometry.l_fermi * 1.0e6 / frequency_hz / f64::from(pulses_per_rotation);
    if !period_us.is_finite() || period_us <= 0.0 {
        return Err(Error::InvalidGeometryOrFrequency { period_us });
    }
    Ok(period_us)
}

/// Enumerates `count` consecutive repetitions around `peak_tof_us`.
///
/// The first repetition is the smallest offset `>= first_rep_offset` whose
/// arrival time is strictly positive.
///
/// # Errors
/// Returns [`Error::InvalidGeometryOrFrequency`] for a non-positive period,
/// [`Error::ConfigError`] when the offsets would leave the `i32` range, and
/// [`Error::InvalidSpectrum`] for a peak time the offsets cannot reach.
pub fn generate_candidates(
    peak_tof_us: f64,
    period_us: f64,
    first_rep_offset: i32,
    count: usize,
) -> Result<Vec<Candidate>> {
    if !period_us.is_finite() || period_us <= 0.0 {
        return Err(Error::InvalidGeometryOrFrequency { period_us });
    }
    if !peak_tof_us.is_finite() {
        return Err(Error::InvalidSpectrum(format!(
            "peak time is not finite: {peak_tof_us}"
        )));
    }

    let out_of_range = || {
        Error::ConfigError(format!(
            "{count} repetitions from offset {first_rep_offset} exceed the repetition range"
        ))
    };
    let count = i32::try_from(count).map_err(|_| out_of_range())?;
    first_rep_offset
        .checked_add(count)
        .ok_or_else(out_of_range)?;

    let start = first_positive_rep(peak_tof_us, period_us, first_rep_offset, count)?;
    start.checked_add(count).ok_or_else(out_of_range)?;
    let candidates = (0..count)
        .map(|k| {
            let irep = start + k;
            Candidate {
                irep,
                tof_us: peak_tof_us + period_us * f64::from(irep),
            }
        })
        .collect();
    Ok(candidates)
}

fn first_positive_rep(peak_tof_us: f64, period_us: f64, from: i32, count: i32) -> Result<i32> {
    let arrival = |irep: i32| peak_tof_us + f64::from(irep) * period_us;
    if arrival(from) > 0.0 {
        return Ok(from);
    }

    // Jump close to the answer, then settle by single steps.
    let estimate = (-peak_tof_us / period_us).floor() + 1.0;
    let limit = f64::from(i32::MAX) - f64::from(count) - 1.0;
    if estimate > limit {
        return Err(Error::InvalidSpectrum(format!(
            "peak time {peak_tof_us} us is out of reach of the repetition search"
        )));
    }
    let mut irep = (estimate as i32).max(from);
    while irep > from && arrival(irep - 1) > 0.0 {
        irep -= 1;
    }
    while arrival(irep) <= 0.0 {
        irep += 1;
    }
    Ok(irep)
}
