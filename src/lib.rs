//! # tbox-timing
//!
//! Measurement-and-analysis engine for a known-plaintext timing
//! side-channel attack against AES-128 implementations with table-based
//! (T-box) first rounds.
//!
//! Encryption time in such implementations correlates with the round-1
//! table indices, which equal `plaintext XOR key`. The engine:
//!
//! 1. Times individual encryptions under a fixed unknown target key and
//!    under many known test keys, with an outlier-cutoff discipline
//!    ([`measurement`]).
//! 2. Reduces the timings to per-position, per-cleartext-byte normalized
//!    means and cross-correlates target and test profiles in
//!    T-box-input space, ranking candidate key bytes ([`statistics`]).
//! 3. When candidate pools are small enough, brute-forces their product
//!    space against a reference ciphertext ([`search`]).
//!
//! Constant-time implementations (AES-NI, fixsliced) are expected to be
//! immune; [`cipher::HardenedAes`] exists as exactly that control.
//!
//! ## Quick start
//!
//! ```ignore
//! use tbox_timing::{cipher::{CipherOracle, TBoxAes}, measurement::{rdtsc, Study}};
//!
//! let mut oracle = TBoxAes::new();
//! oracle.expand(&key);
//!
//! let mut study = Study::new();
//! let mut ct = [0u8; 16];
//! study.collect(1 << 22, Some(threshold), &mut rand::rng(), |pt| {
//!     let start = rdtsc();
//!     oracle.encrypt(pt, &mut ct);
//!     rdtsc().saturating_sub(start)
//! });
//! let means = study.normalized_means();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cipher;
pub mod config;
pub mod constants;
pub mod error;
pub mod keyfile;
pub mod measurement;
pub mod output;
pub mod search;
pub mod statistics;
pub mod types;

pub use cipher::{CipherOracle, HardenedAes, TBoxAes};
pub use config::{Config, RawFormat};
pub use error::Error;
pub use measurement::{calibrate, Calibration, Study};
pub use search::{CandidatePools, Outcome};
pub use statistics::{correlate, pearson, CorrelationSum, TallyTable};
pub use types::{Block, CorrMatrix, MeanMatrix, Tick};
