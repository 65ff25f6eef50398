//! Attack-wide defaults and file name conventions.

/// log2 of the number of accepted measurements per key study.
pub const DEFAULT_RUNS_LOG2: u32 = 22;

/// Outlier cutoff as a multiple of the calibrated mean encryption time.
pub const THRESH_MULT: f64 = 5.0;

/// Number of test keys correlated against the target key.
pub const KEYS_CAP: usize = 10;

/// Target key file: 16 raw bytes.
pub const KEY_FILE: &str = "aes.key";

/// Calibration output: encryption rate and cutoff threshold.
pub const RATE_FILE: &str = "enc_rate.txt";

/// Optional per-measurement dump of cleartexts and tick counts.
pub const RAW_FILE: &str = "raw.dmp";

/// Brute-force candidate pools; its presence switches the driver into
/// brute-force mode.
pub const BF_FILE: &str = "bf.dat";

/// Aggregated correlation dump.
pub const CORR_FILE: &str = "corr.txt";
