//! Mean extraction with grand-mean normalization.

use ndarray::Array2;

use super::tally::TallyTable;
use crate::types::{MeanMatrix, BYTE_VALUES, POSITIONS};

/// Convert a tally table into normalized per-cell mean timings.
///
/// Each cell mean is divided by the grand mean `total_ticks / total_runs`,
/// removing DC offsets common to all 256 buckets at a position (ambient
/// load, frequency drift) while preserving the relative variation between
/// cleartext byte values. Cells that were never hit take the neutral value
/// 1.0; with uniform random plaintexts and large run counts they do not
/// occur.
pub fn normalized_means(tallies: &TallyTable, total_runs: u64, total_ticks: u64) -> MeanMatrix {
    let grand_mean = if total_runs == 0 {
        0.0
    } else {
        total_ticks as f64 / total_runs as f64
    };

    let mut means = Array2::zeros((POSITIONS, BYTE_VALUES));
    for position in 0..POSITIONS {
        for byte in 0..BYTE_VALUES {
            let tally = tallies.cell(position, byte);
            means[[position, byte]] = if tally.count == 0 || grand_mean == 0.0 {
                1.0
            } else {
                (tally.ticks as f64 / tally.count as f64) / grand_mean
            };
        }
    }
    means
}
