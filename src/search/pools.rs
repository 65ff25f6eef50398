//! Per-position candidate pools for the brute-force engine.
//!
//! Wire format, 16 repetitions of: a length byte `L` (0 denotes 256)
//! followed by `L` candidate byte values. The format cannot encode an empty
//! pool, which keeps the engine's iteration space well-defined.

use std::io::Read;

use crate::error::Error;
use crate::types::POSITIONS;

/// Ordered candidate byte values for each of the 16 key positions.
#[derive(Debug, Clone)]
pub struct CandidatePools {
    pools: Vec<Vec<u8>>,
}

impl CandidatePools {
    /// Parse the binary pool format. Short reads report which position's
    /// pool was cut off.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, Error> {
        let mut pools = Vec::with_capacity(POSITIONS);
        for position in 0..POSITIONS {
            let mut len_byte = [0u8; 1];
            reader
                .read_exact(&mut len_byte)
                .map_err(|_| Error::TruncatedPools { position })?;
            let len = if len_byte[0] == 0 {
                256
            } else {
                len_byte[0] as usize
            };
            let mut candidates = vec![0u8; len];
            reader
                .read_exact(&mut candidates)
                .map_err(|_| Error::TruncatedPools { position })?;
            pools.push(candidates);
        }
        Ok(Self { pools })
    }

    /// Build pools directly. Every pool must hold 1..=256 candidates.
    pub fn from_pools(pools: Vec<Vec<u8>>) -> Self {
        assert_eq!(pools.len(), POSITIONS);
        for (position, pool) in pools.iter().enumerate() {
            assert!(
                !pool.is_empty() && pool.len() <= 256,
                "pool {position} has {} candidates",
                pool.len()
            );
        }
        Self { pools }
    }

    /// Candidates for one position, in ranked order.
    pub fn candidates(&self, position: usize) -> &[u8] {
        &self.pools[position]
    }

    /// Pool size at one position.
    pub fn len(&self, position: usize) -> usize {
        self.pools[position].len()
    }

    /// Product of all pool sizes, saturating at `u128::MAX` (an all-256
    /// pool set overflows exactly by one).
    pub fn search_space(&self) -> u128 {
        self.pools
            .iter()
            .fold(1u128, |space, pool| space.saturating_mul(pool.len() as u128))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(pools: &[Vec<u8>]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for pool in pools {
            bytes.push(if pool.len() == 256 { 0 } else { pool.len() as u8 });
            bytes.extend_from_slice(pool);
        }
        bytes
    }

    #[test]
    fn parses_mixed_pool_sizes() {
        let mut pools: Vec<Vec<u8>> = (0..POSITIONS).map(|i| vec![i as u8]).collect();
        pools[3] = vec![0xaa, 0xbb, 0xcc];
        pools[9] = (0..=255u8).collect();

        let parsed = CandidatePools::from_reader(Cursor::new(encode(&pools))).unwrap();
        assert_eq!(parsed.len(0), 1);
        assert_eq!(parsed.candidates(3), &[0xaa, 0xbb, 0xcc]);
        assert_eq!(parsed.len(9), 256);
        assert_eq!(parsed.search_space(), 3 * 256);
    }

    #[test]
    fn zero_length_byte_means_full_pool() {
        let full: Vec<u8> = (0..=255u8).collect();
        let pools: Vec<Vec<u8>> = (0..POSITIONS).map(|_| full.clone()).collect();
        let parsed = CandidatePools::from_reader(Cursor::new(encode(&pools))).unwrap();
        for position in 0..POSITIONS {
            assert_eq!(parsed.len(position), 256);
        }
        assert_eq!(parsed.search_space(), u128::MAX);
    }

    #[test]
    fn truncated_file_names_the_position() {
        let pools: Vec<Vec<u8>> = (0..POSITIONS).map(|_| vec![1, 2]).collect();
        let mut bytes = encode(&pools);
        bytes.truncate(bytes.len() - 4);
        match CandidatePools::from_reader(Cursor::new(bytes)) {
            Err(Error::TruncatedPools { position }) => assert_eq!(position, 14),
            other => panic!("expected truncation error, got {other:?}"),
        }
    }
}
