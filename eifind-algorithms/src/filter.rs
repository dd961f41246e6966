//! Frame and minimum-time filtering of candidates.

use eifind_core::energy::Candidate;
use eifind_core::geometry::Geometry;

/// Drops candidates that cannot be measured unambiguously.
///
/// 1. Each monitor-2 time is projected to monitor 3 by `L_m3 / L_m2`. The
///    sequence is truncated at the first candidate whose projection reaches
///    `frame_limit_us`; later candidates arrive later still.
/// 2. Of what remains, candidates at or below `min_tof_us` at monitor 2 are
///    dropped wherever they sit.
///
/// Candidate order is preserved.
#[must_use]
pub fn filter_candidates(
    candidates: &[Candidate],
    geometry: &Geometry,
    frame_limit_us: f64,
    min_tof_us: f64,
) -> Vec<Candidate> {
    let ratio = geometry.monitor_3_ratio();
    let in_frame = candidates
        .iter()
        .take_while(|candidate| candidate.tof_us * ratio < frame_limit_us)
        .count();

    if in_frame < candidates.len() {
        log::debug!(
            "dropping {} candidate(s) past the {frame_limit_us} us frame at monitor 3",
            candidates.len() - in_frame
        );
    }

    candidates[..in_frame]
        .iter()
        .filter(|candidate| {
            let keep = candidate.tof_us > min_tof_us;
            if !keep {
                log::debug!(
                    "dropping candidate irep={} at {:.1} us (minimum {min_tof_us} us)",
                    candidate.irep,
                    candidate.tof_us
                );
            }
            keep
        })
        .copied()
        .collect()
}
