//! Checkpoint files and terminal reporting.

mod dump;
mod json;
mod terminal;

pub use dump::{
    rank_descending, write_correlations, write_rate_file, write_tallies, RawWriter,
};
pub use json::{write_summary, CandidateScore, RunSummary};
pub use terminal::{print_cutoff_summary, print_key, print_study_summary, print_top_candidates};

use crate::types::Block;

/// A key as 16 space-separated lowercase hex bytes.
pub fn hex_key(key: &Block) -> String {
    key.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
