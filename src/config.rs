//! Configuration for a measurement campaign.

/// Output format for the raw measurement dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawFormat {
    /// One line per measurement: 16 hex bytes and a decimal tick count.
    #[default]
    Ascii,
    /// 16 raw cleartext bytes followed by a 4-byte native-endian tick count.
    Binary,
}

/// Options for the driver and measurement loop.
///
/// One field per knob of the attack; the defaults reproduce the canonical
/// configuration (preemptive key expansion, cutoff enabled, no cache purge).
#[derive(Debug, Clone)]
pub struct Config {
    /// log2 of accepted measurements per key study (default: 22).
    pub runs_log2: u32,

    /// Outlier cutoff multiplier over the calibrated mean (default: 5.0).
    pub thresh_mult: f64,

    /// Enable the outlier cutoff at all (default: true).
    pub cutoff_enabled: bool,

    /// Operator-supplied threshold in ticks; skips calibration when > 0.
    pub threshold_override: Option<f64>,

    /// Number of test keys to study and correlate (default: 10).
    pub test_keys: usize,

    /// Generate a random target key instead of reading the key file.
    pub randomize_key: bool,

    /// Expand the key before the timed window rather than inside it
    /// (default: true).
    pub preemptive_expand: bool,

    /// Overwrite a cache-sized buffer before every timed measurement.
    /// Severe throughput cost; off by default.
    pub purge_cache: bool,

    /// Scrub buffer size in bytes; probed from cpuid when `None`.
    pub cache_size: Option<usize>,

    /// Request CPU-0 affinity and realtime priority at startup.
    pub prioritize: bool,

    /// Raw dump format (default: ASCII).
    pub raw_format: RawFormat,

    /// 0 = minimum output, 1 = per-key correlation files, 2 = per-key tally
    /// files, 3 = raw dump.
    pub verbosity: u8,

    /// Annotate correlation dumps with the true key byte. Leaks the secret;
    /// for experiments only.
    pub debug: bool,

    /// Deterministic seed for plaintext and key generation.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runs_log2: crate::constants::DEFAULT_RUNS_LOG2,
            thresh_mult: crate::constants::THRESH_MULT,
            cutoff_enabled: true,
            threshold_override: None,
            test_keys: crate::constants::KEYS_CAP,
            randomize_key: false,
            preemptive_expand: true,
            purge_cache: false,
            cache_size: None,
            prioritize: false,
            raw_format: RawFormat::default(),
            verbosity: 0,
            debug: false,
            seed: None,
        }
    }
}

impl Config {
    /// Accepted measurements per key study.
    pub fn runs(&self) -> u64 {
        1u64 << self.runs_log2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_runs_is_power_of_two() {
        let config = Config::default();
        assert_eq!(config.runs(), 1 << 22);
        assert!(config.cutoff_enabled);
        assert!(config.preemptive_expand);
        assert!(!config.purge_cache);
    }
}
