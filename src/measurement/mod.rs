//! Measurement infrastructure: cycle timing, the collection loop, and the
//! optional noise-reduction aids.
//!
//! The loop is intentionally single-threaded; the timed window contains
//! exactly one encryption call between two serialized counter reads, with
//! key expansion done ahead of it in the default preemptive mode.

mod scrubber;
mod study;
mod timer;
mod tuner;

use rand::RngCore;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

pub use scrubber::CacheScrubber;
pub use study::{calibrate, Calibration, Study};
pub use timer::{black_box, rdtsc};
pub use tuner::prioritize_process;

/// The entropy source for plaintexts and keys: the thread RNG, or a
/// deterministic Xoshiro256++ stream when a seed is supplied (reproducible
/// runs and tests).
pub fn measurement_rng(seed: Option<u64>) -> Box<dyn RngCore> {
    match seed {
        Some(seed) => Box::new(Xoshiro256PlusPlus::seed_from_u64(seed)),
        None => Box::new(rand::rng()),
    }
}
