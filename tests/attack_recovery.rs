//! Full-pipeline recovery: a synthetic T-box leak drives target and test
//! studies, correlations aggregate across keys, the ranking selects pools,
//! and the brute-force engine confirms the key against the real cipher.

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tbox_timing::cipher::TBoxAes;
use tbox_timing::measurement::Study;
use tbox_timing::output::rank_descending;
use tbox_timing::search::{search, CandidatePools, Outcome};
use tbox_timing::statistics::{correlate, CorrelationSum};
use tbox_timing::types::{Block, MeanMatrix, Tick, BYTE_VALUES, POSITIONS};

const RUNS: u64 = 1 << 13;
const TEST_KEYS: usize = 6;

const TARGET_KEY: Block = [
    0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f,
    0x3c,
];

/// A nonlinear per-index cost table, standing in for the cache behavior of
/// first-round T-box lookups. Wrong-hypothesis realignments of a
/// PRNG-filled table decorrelate; a linear table would not discriminate.
fn leak_table() -> [Tick; 256] {
    let mut table = [0u64; 256];
    let mut state = 0x243f6a8885a308d3u64;
    for entry in table.iter_mut() {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        *entry = 100 + (state >> 56);
    }
    table
}

/// tick(pt) = sum over positions of table[pt[i] XOR key[i]].
fn tbox_study(key: &Block, seed: u64, table: &[Tick; 256]) -> MeanMatrix {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut study = Study::new();
    study.collect(RUNS, None, &mut rng, |pt| {
        pt.iter()
            .zip(key)
            .map(|(&p, &k)| table[(p ^ k) as usize])
            .sum()
    });
    study.normalized_means()
}

#[test]
fn recovers_the_key_through_the_full_pipeline() {
    let table = leak_table();
    let target_means = tbox_study(&TARGET_KEY, 1000, &table);

    let mut key_rng = Xoshiro256PlusPlus::seed_from_u64(77);
    let mut total = CorrelationSum::new();
    for i in 0..TEST_KEYS {
        let mut test_key: Block = [0u8; 16];
        key_rng.fill_bytes(&mut test_key);

        let test_means = tbox_study(&test_key, 2000 + i as u64, &table);
        total.add(&correlate(&target_means, &test_means, &test_key));
    }
    assert_eq!(total.keys(), TEST_KEYS);

    // Pool selection: the two best hypotheses per position.
    let mut pools = Vec::with_capacity(POSITIONS);
    for position in 0..POSITIONS {
        let mut row = [0.0; BYTE_VALUES];
        for (byte, slot) in row.iter_mut().enumerate() {
            *slot = total.total()[[position, byte]];
        }
        let ranked = rank_descending(&row);
        assert_eq!(
            ranked[0], TARGET_KEY[position],
            "position {position} should rank the true byte first"
        );
        pools.push(vec![ranked[0], ranked[1]]);
    }

    // The engine verifies candidates against the real cipher.
    let pools = CandidatePools::from_pools(pools);
    let mut oracle = TBoxAes::new();
    match search(&mut oracle, &TARGET_KEY, &pools) {
        Outcome::Found { key, attempts } => {
            assert_eq!(key, TARGET_KEY);
            assert_eq!(attempts, 1, "true bytes rank first, so the first key hits");
        }
        Outcome::Exhausted { .. } => panic!("pools contained the key"),
    }
}

#[test]
fn wrong_hypotheses_stay_below_the_aggregated_peak() {
    let table = leak_table();
    let target_means = tbox_study(&TARGET_KEY, 500, &table);

    let mut test_key: Block = [0u8; 16];
    let mut key_rng = Xoshiro256PlusPlus::seed_from_u64(99);
    key_rng.fill_bytes(&mut test_key);
    let test_means = tbox_study(&test_key, 501, &table);

    let corr = correlate(&target_means, &test_means, &test_key);
    for position in 0..POSITIONS {
        let truth = corr[[position, TARGET_KEY[position] as usize]];
        assert!(truth > 0.3, "position {position} peak too weak: {truth}");
        for hypothesis in 0..BYTE_VALUES {
            if hypothesis != TARGET_KEY[position] as usize {
                let wrong = corr[[position, hypothesis]];
                assert!(
                    wrong < truth,
                    "position {position}: hypothesis {hypothesis:#04x} ({wrong}) \
                     outranks the truth ({truth})"
                );
            }
        }
    }
}
