//! Error types for the measurement and search pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the library. Configuration and I/O problems are
/// fatal to the operator; statistical pathologies (NaN correlations) are
/// data, not errors, and never appear here.
#[derive(Debug, Error)]
pub enum Error {
    /// The target key file could not be read in full.
    #[error("unable to read 16 bytes from {path}")]
    KeyFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The candidate pool file ended before all 16 pools were read.
    #[error("candidate pool file truncated at position {position}")]
    TruncatedPools {
        /// Block position whose pool was incomplete.
        position: usize,
    },

    /// Any other I/O failure (dumps, rate file).
    #[error(transparent)]
    Io(#[from] io::Error),
}
