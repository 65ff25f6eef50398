//! Driver binary: calibration, correlation gathering, and brute force.
//!
//! With `bf.dat` present the run brute-forces the pools it describes and
//! exits 0 on success, 1 on exhaustion. Otherwise it calibrates (unless a
//! threshold argument is given), studies the target key and a series of
//! random test keys, and dumps aggregated correlations for the analysis
//! wrapper.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rand::RngCore;

use tbox_timing::cipher::CipherOracle;
use tbox_timing::constants::{BF_FILE, CORR_FILE, DEFAULT_RUNS_LOG2, KEYS_CAP, KEY_FILE, RATE_FILE, RAW_FILE};
use tbox_timing::keyfile::read_target_key;
use tbox_timing::measurement::{
    self, measurement_rng, prioritize_process, rdtsc, CacheScrubber, Calibration, Study,
};
use tbox_timing::output::{
    print_cutoff_summary, print_key, print_study_summary, print_top_candidates,
    write_correlations, write_rate_file, write_summary, write_tallies, RawWriter, RunSummary,
};
use tbox_timing::search::{search, CandidatePools, Outcome};
use tbox_timing::statistics::{correlate, CorrelationSum};
use tbox_timing::types::{Block, MeanMatrix, Tick};
use tbox_timing::Config;

#[cfg(not(feature = "hardened-oracle"))]
type Oracle = tbox_timing::TBoxAes;

#[cfg(feature = "hardened-oracle")]
type Oracle = tbox_timing::HardenedAes;

#[derive(Parser, Debug)]
#[command(name = "tbox-timing", version, about = "AES-128 T-box timing attack core")]
struct Cli {
    /// Outlier cutoff threshold in ticks; skips calibration when > 0
    threshold: Option<f64>,

    /// log2 of accepted measurements per key study
    #[arg(long, default_value_t = DEFAULT_RUNS_LOG2)]
    runs_log2: u32,

    /// Number of test keys to correlate against the target
    #[arg(long, default_value_t = KEYS_CAP)]
    keys: usize,

    /// Generate a random target key instead of reading the key file
    #[arg(long)]
    randomize_key: bool,

    /// Disable the outlier cutoff entirely
    #[arg(long)]
    no_cutoff: bool,

    /// Overwrite a cache-sized buffer before every timed measurement
    /// (severe throughput cost)
    #[arg(long)]
    purge_cache: bool,

    /// Scrub buffer size in bytes; probed from cpuid when omitted
    #[arg(long, value_name = "BYTES")]
    cache_size: Option<usize>,

    /// Expand keys inside the timed window instead of ahead of it
    #[arg(long)]
    late_expand: bool,

    /// Pin to CPU 0 and request realtime priority (best effort)
    #[arg(long)]
    prioritize: bool,

    /// Write the raw dump in binary instead of ASCII
    #[arg(long)]
    raw_binary: bool,

    /// Deterministic seed for plaintext and key generation
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON summary of the aggregated ranking
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Annotate correlation output with the true key byte (leaks the
    /// secret; experiments only)
    #[arg(long)]
    debug: bool,

    /// -v: per-key correlation files, -vv: + tally files, -vvv: + raw dump
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            runs_log2: self.runs_log2,
            threshold_override: self.threshold,
            cutoff_enabled: !self.no_cutoff,
            test_keys: self.keys,
            randomize_key: self.randomize_key,
            preemptive_expand: !self.late_expand,
            purge_cache: self.purge_cache,
            cache_size: self.cache_size,
            prioritize: self.prioritize,
            raw_format: if self.raw_binary {
                tbox_timing::RawFormat::Binary
            } else {
                tbox_timing::RawFormat::Ascii
            },
            verbosity: self.verbose,
            debug: self.debug,
            seed: self.seed,
            ..Config::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = cli.config();

    if config.prioritize {
        prioritize_process();
    }

    let mut rng = measurement_rng(config.seed);
    let mut oracle = Oracle::default();

    let target_key: Block = if config.randomize_key {
        println!("Generating random secret key");
        let mut key = [0u8; 16];
        rng.fill_bytes(&mut key);
        key
    } else {
        read_target_key(Path::new(KEY_FILE))?
    };

    // Candidate pools on disk switch the run into brute-force mode.
    let bf_path = Path::new(BF_FILE);
    if bf_path.exists() {
        let file = File::open(bf_path).with_context(|| format!("opening {BF_FILE}"))?;
        let pools = CandidatePools::from_reader(BufReader::new(file))?;
        println!("Brute forcing {} candidate keys", pools.search_space());
        return Ok(match search(&mut oracle, &target_key, &pools) {
            Outcome::Found { key, attempts } => {
                print_key("Cracked key", &key);
                println!("({attempts} keys tried)");
                ExitCode::SUCCESS
            }
            Outcome::Exhausted { attempts } => {
                eprintln!("pools exhausted after {attempts} keys");
                ExitCode::FAILURE
            }
        });
    }

    let runs = config.runs();
    let raw = if config.verbosity > 2 {
        Some(
            RawWriter::create(Path::new(RAW_FILE), config.raw_format)
                .with_context(|| format!("creating {RAW_FILE}"))?,
        )
    } else {
        None
    };

    let mut driver = Driver {
        oracle,
        scrubber: config.purge_cache.then(|| CacheScrubber::new(config.cache_size)),
        raw,
        rng,
        runs,
        threshold: None,
        config,
    };

    let mut calibration: Option<Calibration> = None;
    if driver.config.cutoff_enabled {
        match driver.config.threshold_override.filter(|&t| t > 0.0) {
            Some(threshold) => driver.threshold = Some(threshold as Tick),
            None => {
                let record = driver.run_calibration()?;
                driver.threshold = Some(record.threshold);
                calibration = Some(record);
            }
        }
    }

    let target_means = driver.study_key(&target_key, 0)?;

    let mut total = CorrelationSum::new();
    for run_id in 1..=driver.config.test_keys {
        let mut test_key: Block = [0u8; 16];
        driver.rng.fill_bytes(&mut test_key);

        let test_means = driver.study_key(&test_key, run_id)?;
        let corr = correlate(&target_means, &test_means, &test_key);
        total.add(&corr);

        if driver.config.verbosity > 0 {
            let path = format!("corr{run_id}.txt");
            write_correlations(
                Path::new(&path),
                &corr,
                driver.config.debug.then_some(&target_key),
            )
            .with_context(|| format!("writing {path}"))?;
            if driver.config.debug {
                print_top_candidates(&corr, &target_key);
            }
        }
    }

    write_correlations(
        Path::new(CORR_FILE),
        total.total(),
        driver.config.debug.then_some(&target_key),
    )
    .with_context(|| format!("writing {CORR_FILE}"))?;

    if let Some(raw) = driver.raw.as_mut() {
        raw.flush().with_context(|| format!("flushing {RAW_FILE}"))?;
    }

    if let Some(path) = &cli.summary {
        let summary = RunSummary::from_correlations(
            total.total(),
            16,
            runs,
            driver.config.test_keys,
            driver.threshold,
            calibration,
        );
        write_summary(path, &summary)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(ExitCode::SUCCESS)
}

/// Owns the oracle, entropy and measurement aids for the whole campaign.
struct Driver {
    oracle: Oracle,
    scrubber: Option<CacheScrubber>,
    raw: Option<RawWriter<BufWriter<File>>>,
    rng: Box<dyn RngCore>,
    runs: u64,
    threshold: Option<Tick>,
    config: Config,
}

impl Driver {
    /// Unfiltered pass under a fresh random key; derives the cutoff and
    /// records the encryption rate.
    fn run_calibration(&mut self) -> Result<Calibration> {
        let mut key: Block = [0u8; 16];
        self.rng.fill_bytes(&mut key);
        self.oracle.expand(&key);
        print_key("Cutoff", &key);

        let preemptive = self.config.preemptive_expand;
        let sampler = timed_sampler(&mut self.oracle, key, preemptive, self.scrubber.as_mut());
        let calibration =
            measurement::calibrate(self.runs, self.config.thresh_mult, &mut self.rng, sampler);

        print_cutoff_summary(&calibration, self.runs);
        write_rate_file(Path::new(RATE_FILE), &calibration)
            .with_context(|| format!("writing {RATE_FILE}"))?;
        Ok(calibration)
    }

    /// Gather timing data for one key and reduce it to normalized means.
    fn study_key(&mut self, key: &Block, run_id: usize) -> Result<MeanMatrix> {
        self.oracle.expand(key);
        print_key(&format!("{run_id}. key"), key);

        let runs = self.runs;
        let threshold = self.threshold;
        let preemptive = self.config.preemptive_expand;

        let mut study = Study::new();
        let mut dump_error: Option<io::Error> = None;
        {
            let sampler = timed_sampler(&mut self.oracle, *key, preemptive, self.scrubber.as_mut());
            match self.raw.as_mut() {
                // The observer cannot abort the loop; keep the first write
                // failure, stop dumping, and report it below.
                Some(raw) => study.collect_observed(runs, threshold, &mut self.rng, sampler, |pt, ticks| {
                    if dump_error.is_none() {
                        if let Err(err) = raw.record(pt, ticks) {
                            dump_error = Some(err);
                        }
                    }
                }),
                None => study.collect(runs, threshold, &mut self.rng, sampler),
            }
        }
        if let Some(err) = dump_error {
            return Err(err).with_context(|| format!("writing {RAW_FILE}"));
        }

        print_study_summary(run_id, &study);

        let means = study.normalized_means();
        if self.config.verbosity > 1 {
            let path = format!("tally{run_id}.txt");
            write_tallies(
                Path::new(&path),
                study.tallies(),
                &means,
                key,
                study.grand_mean(),
            )
            .with_context(|| format!("writing {path}"))?;
        }
        Ok(means)
    }
}

/// The timed window: purge (if configured), read the counter, encrypt,
/// read the counter. In late-expand mode the expansion sits inside the
/// window; preemptive mode relies on the caller having expanded already.
fn timed_sampler<'a, O: CipherOracle>(
    oracle: &'a mut O,
    key: Block,
    preemptive: bool,
    mut scrubber: Option<&'a mut CacheScrubber>,
) -> impl FnMut(&Block) -> Tick + 'a {
    let mut ciphertext: Block = [0u8; 16];
    move |plaintext| {
        if let Some(scrubber) = scrubber.as_deref_mut() {
            scrubber.purge();
        }
        let start = rdtsc();
        if !preemptive {
            oracle.expand(&key);
        }
        oracle.encrypt(plaintext, &mut ciphertext);
        rdtsc().saturating_sub(start)
    }
}
