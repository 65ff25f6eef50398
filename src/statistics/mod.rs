//! The tally / mean / correlation statistical pipeline.
//!
//! Raw timings accumulate into per-position, per-cleartext-byte tallies;
//! tallies reduce to grand-mean-normalized mean vectors; mean vectors from
//! a target-key study and a known-test-key study cross-correlate under the
//! first-round T-box leakage model; correlations sum across test keys to
//! amplify the signal.

mod correlation;
mod means;
mod pearson;
mod tally;

pub use correlation::{correlate, CorrelationSum};
pub use means::normalized_means;
pub use pearson::pearson;
pub use tally::{Tally, TallyTable};
