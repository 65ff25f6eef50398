//! Operator-facing status lines.

use colored::Colorize;

use crate::measurement::{Calibration, Study};
use crate::types::{Block, CorrMatrix, BYTE_VALUES, POSITIONS};

use super::dump::rank_descending;
use super::hex_key;

/// Print a named key as space-separated hex.
pub fn print_key(name: &str, key: &Block) {
    println!("{name}: {}", hex_key(key));
}

/// One-line calibration report: tick totals, derived threshold and the
/// sustained encryption rate.
pub fn print_cutoff_summary(calibration: &Calibration, runs: u64) {
    let total_ticks = (calibration.mean * runs as f64) as u64;
    println!(
        "Cutoff: {} Mticks total, avg: {}, thresh: {}, {} enc./s",
        total_ticks / 1_000_000,
        calibration.mean as u64,
        calibration.threshold,
        calibration.rate as u64,
    );
}

/// Per-study summary, matching the calibration line's units.
pub fn print_study_summary(run_id: usize, study: &Study) {
    println!(
        "{run_id}. key: {} Mticks total, {} ticks on average",
        study.total_ticks() / 1_000_000,
        study.grand_mean() as u64,
    );
}

/// Show the top-ranked hypotheses per position, marking the true key byte
/// in red when it made the cut. Only meaningful in debug runs where the
/// secret is available.
pub fn print_top_candidates(corr: &CorrMatrix, target_key: &Block) {
    for position in 0..POSITIONS {
        let mut row = [0.0; BYTE_VALUES];
        for (byte, slot) in row.iter_mut().enumerate() {
            *slot = corr[[position, byte]];
        }
        let ranked = rank_descending(&row);
        let truth = target_key[position];

        let mut line = format!("{position:x} ({:.2}):", row[truth as usize]);
        for &byte in ranked.iter().take(16) {
            let cell = format!(" {byte:02x}");
            if byte == truth {
                line.push_str(&format!("{}", cell.red()));
            } else {
                line.push_str(&cell);
            }
        }
        println!("{line}");
    }
}
