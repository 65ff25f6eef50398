//! Exhaustive search over the candidate pool product space.

use super::pools::CandidatePools;
use crate::cipher::CipherOracle;
use crate::types::{Block, POSITIONS, ZERO_BLOCK};

/// Result of a brute-force run, with the number of keys tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A candidate key reproduced the reference ciphertext.
    Found {
        /// The recovered key.
        key: Block,
        /// Keys tried, including the hit.
        attempts: u64,
    },
    /// The pools do not contain the true key.
    Exhausted {
        /// Keys tried; equals the full product space.
        attempts: u64,
    },
}

/// Enumerate the pool product space against a reference ciphertext.
///
/// The reference is the all-zeros probe plaintext encrypted under the true
/// target key. Positions are then iterated odometer-style with the
/// SMALLEST pools innermost: the counters we are most confident about
/// change most often, so when every true byte ranks near the front of its
/// pool the hit comes early. Ties in pool size keep block position
/// order.
pub fn search<O: CipherOracle>(
    oracle: &mut O,
    target_key: &Block,
    pools: &CandidatePools,
) -> Outcome {
    let mut reference: Block = [0u8; 16];
    oracle.expand(target_key);
    oracle.encrypt(&ZERO_BLOCK, &mut reference);

    // Stable ascending sort keeps tied positions in block order.
    let mut order: Vec<usize> = (0..POSITIONS).collect();
    order.sort_by_key(|&position| pools.len(position));

    let mut indices = [0usize; POSITIONS];
    let mut key: Block = [0u8; 16];
    let mut ciphertext: Block = [0u8; 16];
    let mut attempts = 0u64;

    loop {
        for position in 0..POSITIONS {
            key[position] = pools.candidates(position)[indices[position]];
        }
        attempts += 1;
        oracle.expand(&key);
        oracle.encrypt(&ZERO_BLOCK, &mut ciphertext);
        if ciphertext == reference {
            return Outcome::Found { key, attempts };
        }

        // Carry upward through the reordered significance.
        let mut carried = true;
        for &position in &order {
            indices[position] += 1;
            if indices[position] < pools.len(position) {
                carried = false;
                break;
            }
            indices[position] = 0;
        }
        if carried {
            return Outcome::Exhausted { attempts };
        }
    }
}
