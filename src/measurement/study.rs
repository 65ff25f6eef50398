//! The measurement loop and threshold calibration.
//!
//! A [`Study`] owns the tally table and grand counters for one key. The
//! collection loop is generic over a sampler closure so the driver can pass
//! a real timed-encryption closure while tests substitute synthetic tick
//! sources.

use std::time::Instant;

use rand::RngCore;
use serde::Serialize;

use crate::statistics::{normalized_means, TallyTable};
use crate::types::{Block, MeanMatrix, Tick};

/// Mutable state of one key study: the tally table plus the grand counters
/// over the accepted measurement set.
#[derive(Debug, Clone)]
pub struct Study {
    tallies: TallyTable,
    total_runs: u64,
    total_ticks: Tick,
}

impl Study {
    /// A fresh study with zeroed tallies and counters.
    pub fn new() -> Self {
        Self {
            tallies: TallyTable::new(),
            total_runs: 0,
            total_ticks: 0,
        }
    }

    /// Record one accepted measurement: tally the cleartext byte at every
    /// position and bump both grand counters in the same step.
    #[inline]
    pub fn record(&mut self, plaintext: &Block, ticks: Tick) {
        self.tallies.record(plaintext, ticks);
        self.total_runs += 1;
        self.total_ticks += ticks;
    }

    /// Collect `runs` accepted measurements.
    ///
    /// Each iteration draws a fresh uniform plaintext, samples its tick
    /// cost, and applies the outlier cutoff: a measurement above `cutoff`
    /// is discarded and retried with the SAME plaintext, so the plaintext
    /// distribution is not re-weighted by discards. A cutoff no sampler
    /// output ever satisfies loops forever; the calibrator is required to
    /// produce thresholds with a discard rate well below 50%.
    pub fn collect<R, S>(&mut self, runs: u64, cutoff: Option<Tick>, rng: &mut R, sample: S)
    where
        R: RngCore + ?Sized,
        S: FnMut(&Block) -> Tick,
    {
        self.collect_observed(runs, cutoff, rng, sample, |_, _| {});
    }

    /// [`collect`](Self::collect) with an observer invoked once per
    /// ACCEPTED measurement, after tallying. The driver hooks the raw dump
    /// here; discarded outliers are never observed.
    pub fn collect_observed<R, S, O>(
        &mut self,
        runs: u64,
        cutoff: Option<Tick>,
        rng: &mut R,
        mut sample: S,
        mut observe: O,
    ) where
        R: RngCore + ?Sized,
        S: FnMut(&Block) -> Tick,
        O: FnMut(&Block, Tick),
    {
        let mut plaintext: Block = [0u8; 16];
        for _ in 0..runs {
            rng.fill_bytes(&mut plaintext);
            let ticks = loop {
                let t = sample(&plaintext);
                match cutoff {
                    Some(limit) if t > limit => continue,
                    _ => break t,
                }
            };
            self.record(&plaintext, ticks);
            observe(&plaintext, ticks);
        }
    }

    /// Accepted measurements so far.
    pub fn total_runs(&self) -> u64 {
        self.total_runs
    }

    /// Tick sum over the accepted set.
    pub fn total_ticks(&self) -> Tick {
        self.total_ticks
    }

    /// Mean ticks per accepted measurement; 0.0 before any measurement.
    pub fn grand_mean(&self) -> f64 {
        if self.total_runs == 0 {
            0.0
        } else {
            self.total_ticks as f64 / self.total_runs as f64
        }
    }

    /// The tally table.
    pub fn tallies(&self) -> &TallyTable {
        &self.tallies
    }

    /// Reduce the tallies to grand-mean-normalized mean timings.
    pub fn normalized_means(&self) -> MeanMatrix {
        normalized_means(&self.tallies, self.total_runs, self.total_ticks)
    }
}

impl Default for Study {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of the preliminary calibration pass.
#[derive(Debug, Clone, Serialize)]
pub struct Calibration {
    /// Encryptions per second over the whole pass (wall clock).
    pub rate: f64,
    /// Mean ticks per encryption.
    pub mean: f64,
    /// Outlier cutoff: mean times the configured multiplier.
    pub threshold: Tick,
}

/// Run `runs` measurements with the outlier filter disabled and derive the
/// cutoff threshold.
///
/// The caller keys the oracle (a random key, by convention) before handing
/// over the sampler. The pass is timed with the monotonic wall clock -
/// distinct from the cycle timer, which times individual encryptions - to
/// report the sustained encryption rate.
pub fn calibrate<R, S>(runs: u64, thresh_mult: f64, rng: &mut R, sample: S) -> Calibration
where
    R: RngCore + ?Sized,
    S: FnMut(&Block) -> Tick,
{
    let mut study = Study::new();
    let wall = Instant::now();
    study.collect(runs, None, rng, sample);
    let elapsed = wall.elapsed().as_secs_f64();

    let mean = study.grand_mean();
    Calibration {
        rate: runs as f64 / elapsed,
        mean,
        threshold: (mean * thresh_mult) as Tick,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BYTE_VALUES, POSITIONS};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn tally_conservation_after_collect() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let mut study = Study::new();
        study.collect(1000, None, &mut rng, |pt| 50 + pt[0] as Tick);

        assert_eq!(study.total_runs(), 1000);
        for position in 0..POSITIONS {
            assert_eq!(study.tallies().count_sum(position), study.total_runs());
            assert_eq!(study.tallies().tick_sum(position), study.total_ticks());
        }
    }

    #[test]
    fn cutoff_discards_and_retries_same_plaintext() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let mut study = Study::new();

        // Every plaintext is sampled as an outlier once, then accepted.
        let mut last: Option<Block> = None;
        let mut calls = 0u64;
        study.collect(100, Some(100), &mut rng, |pt| {
            calls += 1;
            if last.as_ref() == Some(pt) {
                10
            } else {
                last = Some(*pt);
                1000
            }
        });

        assert_eq!(study.total_runs(), 100);
        assert_eq!(calls, 200, "each measurement retried exactly once");
        // Only accepted ticks were tallied.
        assert_eq!(study.total_ticks(), 100 * 10);
    }

    #[test]
    fn observer_sees_accepted_measurements_only() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut study = Study::new();
        let mut seen = Vec::new();
        let mut flip = false;
        study.collect_observed(
            50,
            Some(10),
            &mut rng,
            |_| {
                flip = !flip;
                if flip {
                    99
                } else {
                    5
                }
            },
            |_, ticks| seen.push(ticks),
        );
        assert_eq!(seen.len(), 50);
        assert!(seen.iter().all(|&t| t <= 10));
    }

    #[test]
    fn smoke_tally_constant_oracle() {
        // A constant-tick oracle normalizes to all-ones means, and
        // correlating that flat profile yields nothing finite above zero.
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let mut study = Study::new();
        study.collect(1000, None, &mut rng, |_| 77);

        let means = study.normalized_means();
        for position in 0..POSITIONS {
            for byte in 0..BYTE_VALUES {
                assert!((means[[position, byte]] - 1.0).abs() < 1e-12);
            }
        }

        let corr = crate::statistics::correlate(&means, &means, &[0u8; 16]);
        for position in 0..POSITIONS {
            for hypothesis in 0..BYTE_VALUES {
                let c = corr[[position, hypothesis]];
                assert!(c.is_nan() || c.abs() < 1e-9);
            }
        }
    }

    #[test]
    fn calibration_threshold_is_mean_multiple() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        let calibration = calibrate(512, 5.0, &mut rng, |_| 100);
        assert!((calibration.mean - 100.0).abs() < 1e-9);
        assert_eq!(calibration.threshold, 500);
        assert!(calibration.rate > 0.0);
    }
}
