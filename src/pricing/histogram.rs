//! Margin distribution binning.
//!
//! Ten equal-width bins spanning the observed min/max of the finite
//! `Margin %` values. Non-finite margins (zero-price rows) and NULLs do
//! not bin. No normalization, no trimming.

use crate::storage::Table;

use super::MARGIN;

/// Fixed number of histogram bins.
pub const BIN_COUNT: usize = 10;

/// A frequency histogram over equal-width bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Lower edge of the first bin (observed minimum).
    pub min: f64,
    /// Upper edge of the last bin (observed maximum).
    pub max: f64,
    /// Per-bin frequency counts.
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Bin finite values into `bins` equal-width buckets.
    ///
    /// Returns `None` when there are no finite values or `bins` is 0.
    pub fn from_values(values: &[f64], bins: usize) -> Option<Self> {
        if bins == 0 {
            return None;
        }
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }

        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;

        let mut counts = vec![0u64; bins];
        if span == 0.0 {
            // Degenerate distribution: everything lands in the first bin.
            counts[0] = finite.len() as u64;
            return Some(Self { min, max, counts });
        }

        let width = span / bins as f64;
        for v in finite {
            let idx = ((v - min) / width) as usize;
            counts[idx.min(bins - 1)] += 1;
        }
        Some(Self { min, max, counts })
    }

    /// Width of one bin.
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.counts.len() as f64
    }

    /// Lower-edge labels for the chart axis.
    pub fn labels(&self) -> Vec<String> {
        let width = self.bin_width();
        (0..self.counts.len())
            .map(|i| format!("{:.0}", self.min + width * i as f64))
            .collect()
    }

    /// Largest bin count (chart y-scale).
    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Total values binned.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Histogram of the table's `Margin %` column.
///
/// Returns `None` when the column is absent (derivation skipped) or
/// holds no finite values.
pub fn margin_histogram(table: &Table) -> Option<Histogram> {
    let margin = table.column(MARGIN)?;
    let values: Vec<f64> = (0..table.row_count())
        .filter_map(|row| margin.numeric(row))
        .collect();
    Histogram::from_values(&values, BIN_COUNT)
}
