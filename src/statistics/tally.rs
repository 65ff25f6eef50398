//! Per-position, per-byte timing tallies.

use crate::types::{Block, Tick, BYTE_VALUES, POSITIONS};

/// Accumulated measurements for one cleartext byte value at one position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Number of accepted measurements whose cleartext byte matched.
    pub count: u64,
    /// Sum of their tick counts.
    pub ticks: Tick,
}

/// The 16x256 tally matrix for one key study.
///
/// Every accepted measurement is tallied sixteen times, once per position,
/// so each of the sixteen rows sees the same accepted set - the densest
/// possible use of a sample.
#[derive(Debug, Clone)]
pub struct TallyTable {
    cells: Vec<[Tally; BYTE_VALUES]>,
}

impl TallyTable {
    /// A zeroed table.
    pub fn new() -> Self {
        Self {
            cells: vec![[Tally::default(); BYTE_VALUES]; POSITIONS],
        }
    }

    /// Tally one accepted measurement under its cleartext.
    #[inline]
    pub fn record(&mut self, plaintext: &Block, ticks: Tick) {
        for (position, &byte) in plaintext.iter().enumerate() {
            let cell = &mut self.cells[position][byte as usize];
            cell.count += 1;
            cell.ticks += ticks;
        }
    }

    /// The tally for `byte` at `position`.
    #[inline]
    pub fn cell(&self, position: usize, byte: usize) -> Tally {
        self.cells[position][byte]
    }

    /// Sum of counts across all byte values at one position. Equals the
    /// study's total accepted runs.
    pub fn count_sum(&self, position: usize) -> u64 {
        self.cells[position].iter().map(|t| t.count).sum()
    }

    /// Sum of ticks across all byte values at one position. Equals the
    /// study's total accepted ticks.
    pub fn tick_sum(&self, position: usize) -> Tick {
        self.cells[position].iter().map(|t| t.ticks).sum()
    }
}

impl Default for TallyTable {
    fn default() -> Self {
        Self::new()
    }
}
