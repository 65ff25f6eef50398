//! Machine-readable run summary.
//!
//! The text checkpoints are what the analysis wrapper historically parsed;
//! this JSON form carries the same ranking information for newer tooling.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::error::Error;
use crate::measurement::Calibration;
use crate::types::{CorrMatrix, Tick, BYTE_VALUES, POSITIONS};

use super::dump::rank_descending;

/// One ranked hypothesis for one position.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateScore {
    /// Candidate key byte value.
    pub byte: u8,
    /// Summed correlation coefficient across test keys.
    pub score: f64,
}

/// Summary of a correlation-gathering run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Accepted measurements per key study.
    pub runs_per_key: u64,
    /// Number of test keys correlated.
    pub test_keys: usize,
    /// Outlier cutoff in ticks, if the filter was enabled.
    pub threshold: Option<Tick>,
    /// Calibration record, when calibration ran.
    pub calibration: Option<Calibration>,
    /// Top-ranked candidates per position, best first.
    pub candidates: Vec<Vec<CandidateScore>>,
}

impl RunSummary {
    /// Rank the aggregated correlations, keeping `top` hypotheses per
    /// position.
    pub fn from_correlations(
        corr: &CorrMatrix,
        top: usize,
        runs_per_key: u64,
        test_keys: usize,
        threshold: Option<Tick>,
        calibration: Option<Calibration>,
    ) -> Self {
        let mut candidates = Vec::with_capacity(POSITIONS);
        for position in 0..POSITIONS {
            let mut row = [0.0; BYTE_VALUES];
            for (byte, slot) in row.iter_mut().enumerate() {
                *slot = corr[[position, byte]];
            }
            candidates.push(
                rank_descending(&row)
                    .iter()
                    .take(top)
                    .map(|&byte| CandidateScore {
                        byte,
                        score: row[byte as usize],
                    })
                    .collect(),
            );
        }
        Self {
            runs_per_key,
            test_keys,
            threshold,
            calibration,
            candidates,
        }
    }
}

/// Write the summary as pretty-printed JSON.
pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), Error> {
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, summary).map_err(std::io::Error::from)?;
    Ok(())
}
