//! Type aliases and common types.

use ndarray::Array2;

/// A 16-byte AES block: plaintexts, ciphertexts and keys alike.
pub type Block = [u8; 16];

/// A cycle count. Single encryptions fit in 32 bits; accumulations need 64.
pub type Tick = u64;

/// Number of byte positions in a block.
pub const POSITIONS: usize = 16;

/// Number of possible values for one byte.
pub const BYTE_VALUES: usize = 256;

/// Per-position, per-cleartext-byte normalized mean timings, shape (16, 256).
pub type MeanMatrix = Array2<f64>;

/// Per-position, per-key-byte-hypothesis Pearson coefficients, shape (16, 256).
pub type CorrMatrix = Array2<f64>;

/// An all-zeros block, the conventional brute-force probe plaintext.
pub const ZERO_BLOCK: Block = [0u8; 16];
