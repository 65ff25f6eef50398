//! Cross-correlation of mean timing profiles in T-box-input space.

use ndarray::Array2;

use super::pearson::pearson;
use crate::types::{Block, CorrMatrix, MeanMatrix, BYTE_VALUES, POSITIONS};

/// Correlate a target-key profile against a known-test-key profile.
///
/// Both mean matrices are indexed by cleartext byte, but the leakage model
/// says time depends on the first-round T-box input, which is
/// `cleartext XOR key`. For each position `i` and hypothesis `k1` the
/// target profile is realigned so index `s` reads the cell for cleartext
/// `s XOR k1`; the test profile is realigned once per position by its known
/// key byte. Under the true hypothesis the two vectors line up in
/// T-box-input space and correlate strongly; under a wrong hypothesis the
/// alignment is a pseudo-random permutation and the coefficient is near
/// zero.
pub fn correlate(target: &MeanMatrix, test: &MeanMatrix, test_key: &Block) -> CorrMatrix {
    let mut corr = Array2::zeros((POSITIONS, BYTE_VALUES));
    let mut x = [0.0; BYTE_VALUES];
    let mut y = [0.0; BYTE_VALUES];

    for position in 0..POSITIONS {
        let known = test_key[position] as usize;
        for s in 0..BYTE_VALUES {
            y[s] = test[[position, s ^ known]];
        }
        for hypothesis in 0..BYTE_VALUES {
            for s in 0..BYTE_VALUES {
                x[s] = target[[position, s ^ hypothesis]];
            }
            corr[[position, hypothesis]] = pearson(&x, &y);
        }
    }
    corr
}

/// Element-wise running sum of correlation matrices across test keys.
///
/// No averaging: pool selection downstream consumes the sign and relative
/// magnitude of the summed coefficients.
#[derive(Debug, Clone)]
pub struct CorrelationSum {
    total: CorrMatrix,
    keys: usize,
}

impl CorrelationSum {
    /// An empty aggregate.
    pub fn new() -> Self {
        Self {
            total: Array2::zeros((POSITIONS, BYTE_VALUES)),
            keys: 0,
        }
    }

    /// Fold one test key's correlation matrix into the total.
    pub fn add(&mut self, corr: &CorrMatrix) {
        self.total += corr;
        self.keys += 1;
    }

    /// The summed coefficients.
    pub fn total(&self) -> &CorrMatrix {
        &self.total
    }

    /// How many matrices have been folded in.
    pub fn keys(&self) -> usize {
        self.keys
    }
}

impl Default for CorrelationSum {
    fn default() -> Self {
        Self::new()
    }
}
