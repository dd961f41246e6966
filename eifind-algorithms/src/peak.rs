//! Peak location on the upstream monitor.

use eifind_core::error::{Error, Result};
use eifind_core::spectrum::{Spectrum, TofBinning};

/// Time of the strongest bin of `spectrum` inside `window`.
///
/// The spectrum is rebinned onto `window` first; the result is the lower edge
/// of the first bin holding the maximum count.
///
/// # Errors
/// Returns [`Error::EmptyPeakWindow`] when the window holds no bins with a
/// finite count, or a configuration error for an invalid window.
pub fn locate_peak(spectrum: &Spectrum, window: &TofBinning) -> Result<f64> {
    let rebinned = spectrum.rebin(window)?;
    let (index, _) = rebinned.max_bin().ok_or(Error::EmptyPeakWindow {
        start: window.start,
        end: window.end,
    })?;
    Ok(rebinned.bin_start(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spike_at(tof_us: f64) -> Spectrum {
        let edges: Vec<f64> = (0..=10_000).map(|i| f64::from(i) * 2.0).collect();
        let counts: Vec<f64> = edges
            .windows(2)
            .map(|bin| if bin[0] <= tof_us && tof_us < bin[1] { 50.0 } else { 1.0 })
            .collect();
        Spectrum::new(edges, counts).unwrap()
    }

    #[test]
    fn test_locates_lower_edge_of_max_bin() {
        let window = TofBinning::new(200.0, 2.0, 18000.0);
        let peak = locate_peak(&spike_at(5001.0), &window).unwrap();
        assert_relative_eq!(peak, 5000.0);
    }

    #[test]
    fn test_ignores_counts_outside_window() {
        // The spike sits below the window start, so the first flat bin wins.
        let window = TofBinning::new(200.0, 2.0, 18000.0);
        let peak = locate_peak(&spike_at(100.0), &window).unwrap();
        assert_relative_eq!(peak, 200.0);
    }

    #[test]
    fn test_coarser_window_sums_source_bins() {
        let window = TofBinning::new(200.0, 100.0, 18000.0);
        let peak = locate_peak(&spike_at(5051.0), &window).unwrap();
        assert_relative_eq!(peak, 5000.0);
    }

    #[test]
    fn test_window_beyond_data_is_flat() {
        // Rebinning past the data yields zero-count bins, not an error.
        let spectrum = Spectrum::new(vec![0.0, 10.0, 20.0], vec![1.0, 2.0]).unwrap();
        let window = TofBinning::new(200.0, 2.0, 210.0);
        let peak = locate_peak(&spectrum, &window).unwrap();
        assert_relative_eq!(peak, 200.0);
    }

    #[test]
    fn test_invalid_window_is_an_error() {
        let spectrum = spike_at(5000.0);
        let window = TofBinning::new(18000.0, 2.0, 200.0);
        assert!(locate_peak(&spectrum, &window).is_err());
    }
}
