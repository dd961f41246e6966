//! Histogrammed monitor spectra.
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]

use crate::error::{Error, Result};
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Regular time-of-flight binning: `start, start + step, ..., end` (microseconds).
///
/// The final bin is clipped at `end` when the range is not a whole number of
/// steps.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TofBinning {
    /// Lower edge of the first bin.
    pub start: f64,
    /// Bin width.
    pub step: f64,
    /// Upper edge of the last bin.
    pub end: f64,
}

impl TofBinning {
    /// Creates a binning description.
    #[must_use]
    pub fn new(start: f64, step: f64, end: f64) -> Self {
        Self { start, step, end }
    }

    /// Checks the binning describes at least one bin.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] for non-finite values, a non-positive
    /// step, or `end <= start`.
    pub fn validate(&self) -> Result<()> {
        if !(self.start.is_finite() && self.step.is_finite() && self.end.is_finite()) {
            return Err(Error::ConfigError(format!(
                "binning values must be finite: {self:?}"
            )));
        }
        if self.step <= 0.0 {
            return Err(Error::ConfigError(format!(
                "binning step must be positive, got {}",
                self.step
            )));
        }
        if self.end <= self.start {
            return Err(Error::ConfigError(format!(
                "binning end {} must exceed start {}",
                self.end, self.start
            )));
        }
        Ok(())
    }

    /// Bin boundaries for this binning.
    #[must_use]
    pub fn edges(&self) -> Vec<f64> {
        let n_full = ((self.end - self.start) / self.step).floor() as usize;
        let mut edges = Vec::with_capacity(n_full + 2);
        for i in 0..=n_full {
            edges.push(self.start + i as f64 * self.step);
        }
        // Clip the trailing partial bin at `end`.
        match edges.last() {
            Some(&last) if (self.end - last) > self.step * 1e-9 => edges.push(self.end),
            Some(_) => {
                if let Some(last) = edges.last_mut() {
                    *last = self.end;
                }
            }
            None => {}
        }
        edges
    }
}

/// A single-spectrum histogram: `tof_edges.len() == counts.len() + 1`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Spectrum {
    tof_edges: Vec<f64>,
    counts: Vec<f64>,
}

impl Spectrum {
    /// Creates a spectrum from bin boundaries and per-bin counts.
    ///
    /// # Errors
    /// Returns [`Error::InvalidSpectrum`] if the lengths disagree or the
    /// boundaries are not strictly increasing finite values.
    pub fn new(tof_edges: Vec<f64>, counts: Vec<f64>) -> Result<Self> {
        if tof_edges.len() != counts.len() + 1 {
            return Err(Error::InvalidSpectrum(format!(
                "expected {} bin edges for {} counts, got {}",
                counts.len() + 1,
                counts.len(),
                tof_edges.len()
            )));
        }
        if tof_edges.iter().any(|edge| !edge.is_finite()) {
            return Err(Error::InvalidSpectrum(
                "bin edges must be finite".to_string(),
            ));
        }
        if tof_edges.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(Error::InvalidSpectrum(
                "bin edges must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { tof_edges, counts })
    }

    /// Number of bins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true if the spectrum has no bins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Bin boundaries.
    #[must_use]
    pub fn tof_edges(&self) -> &[f64] {
        &self.tof_edges
    }

    /// Per-bin counts.
    #[must_use]
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Total counts over all bins.
    #[must_use]
    pub fn total_counts(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Midpoint of bin `index`.
    #[inline]
    #[must_use]
    pub fn bin_centre(&self, index: usize) -> f64 {
        0.5 * (self.tof_edges[index] + self.tof_edges[index + 1])
    }

    /// Lower boundary of bin `index`.
    #[inline]
    #[must_use]
    pub fn bin_start(&self, index: usize) -> f64 {
        self.tof_edges[index]
    }

    /// Indices of the bins whose centres lie in `[lo, hi]`.
    #[must_use]
    pub fn bins_within(&self, lo: f64, hi: f64) -> Range<usize> {
        let first = (0..self.len())
            .find(|&i| self.bin_centre(i) >= lo)
            .unwrap_or(self.len());
        let last = (first..self.len())
            .find(|&i| self.bin_centre(i) > hi)
            .unwrap_or(self.len());
        first..last
    }

    /// Index and value of the first bin holding the maximum count.
    ///
    /// Non-finite counts are ignored. Returns `None` when no finite count
    /// exists.
    #[must_use]
    pub fn max_bin(&self) -> Option<(usize, f64)> {
        self.max_bin_in(0..self.len())
    }

    /// As [`Spectrum::max_bin`], restricted to `range`.
    #[must_use]
    pub fn max_bin_in(&self, range: Range<usize>) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for index in range {
            let value = self.counts[index];
            if !value.is_finite() {
                continue;
            }
            match best {
                Some((_, current)) if value <= current => {}
                _ => best = Some((index, value)),
            }
        }
        best
    }

    /// Redistributes counts onto a new regular binning.
    ///
    /// Each source bin contributes to every target bin it overlaps, in
    /// proportion to the overlapping width. Counts outside the target range
    /// are dropped.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] if the binning is invalid.
    pub fn rebin(&self, binning: &TofBinning) -> Result<Self> {
        binning.validate()?;
        let edges = binning.edges();
        let mut counts = vec![0.0; edges.len().saturating_sub(1)];

        let mut target = 0usize;
        for (source, &count) in self.counts.iter().enumerate() {
            let lo = self.tof_edges[source];
            let hi = self.tof_edges[source + 1];
            let width = hi - lo;

            while target < counts.len() && edges[target + 1] <= lo {
                target += 1;
            }
            let mut t = target;
            while t < counts.len() && edges[t] < hi {
                let overlap = hi.min(edges[t + 1]) - lo.max(edges[t]);
                if overlap > 0.0 {
                    counts[t] += count * overlap / width;
                }
                t += 1;
            }
        }

        Ok(Self {
            tof_edges: edges,
            counts,
        })
    }
}
