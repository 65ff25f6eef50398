//! Checkpoint file writers.
//!
//! Formats are fixed: the external analysis wrapper parses these files
//! line by line, so field widths and ordering must not drift.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::RawFormat;
use crate::error::Error;
use crate::measurement::Calibration;
use crate::statistics::TallyTable;
use crate::types::{Block, CorrMatrix, MeanMatrix, Tick, BYTE_VALUES, POSITIONS};

use super::hex_key;

/// Byte values 0..=255 ordered by descending score; ties and NaN keep
/// their relative order (stable sort).
pub fn rank_descending(values: &[f64; BYTE_VALUES]) -> [u8; BYTE_VALUES] {
    let mut order = [0u8; BYTE_VALUES];
    for (i, slot) in order.iter_mut().enumerate() {
        *slot = i as u8;
    }
    order.sort_by(|&a, &b| {
        values[b as usize]
            .partial_cmp(&values[a as usize])
            .unwrap_or(Ordering::Equal)
    });
    order
}

fn matrix_row(matrix: &CorrMatrix, position: usize) -> [f64; BYTE_VALUES] {
    let mut row = [0.0; BYTE_VALUES];
    for (byte, slot) in row.iter_mut().enumerate() {
        *slot = matrix[[position, byte]];
    }
    row
}

/// Write the calibration record: rate on the first line, threshold on the
/// second.
pub fn write_rate_file(path: &Path, calibration: &Calibration) -> Result<(), Error> {
    let mut file = BufWriter::new(File::create(path)?);
    write!(file, "{:.6}\n{}\n", calibration.rate, calibration.threshold)?;
    file.flush()?;
    Ok(())
}

/// Dump a correlation matrix: for each position, every byte value ordered
/// by descending coefficient, one `"%2d %02x %lf"` line each.
///
/// `annotate` appends `" ***"` to the true key byte's line - it leaks the
/// secret into the file and exists for experiments only.
pub fn write_correlations(
    path: &Path,
    corr: &CorrMatrix,
    annotate: Option<&Block>,
) -> Result<(), Error> {
    let mut file = BufWriter::new(File::create(path)?);
    for position in 0..POSITIONS {
        let row = matrix_row(corr, position);
        for byte in rank_descending(&row) {
            write!(file, "{:2} {:02x} {:.6}", position, byte, row[byte as usize])?;
            match annotate {
                Some(key) if key[position] == byte => writeln!(file, " ***")?,
                _ => writeln!(file)?,
            }
        }
    }
    file.flush()?;
    Ok(())
}

/// Dump per-cell run counts and normalized means, ordered per position by
/// descending mean, under a key and grand-average header.
pub fn write_tallies(
    path: &Path,
    tallies: &TallyTable,
    means: &MeanMatrix,
    key: &Block,
    grand_mean: f64,
) -> Result<(), Error> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "Key: {}", hex_key(key))?;
    writeln!(file, "Average: {grand_mean:.6}")?;
    for position in 0..POSITIONS {
        let row = matrix_row(means, position);
        for byte in rank_descending(&row) {
            writeln!(
                file,
                "{:2} {:02x} {} {:.6}",
                position,
                byte,
                tallies.cell(position, byte as usize).count,
                row[byte as usize],
            )?;
        }
    }
    file.flush()?;
    Ok(())
}

/// Per-measurement dump of accepted cleartexts and their tick counts.
pub struct RawWriter<W: Write> {
    sink: W,
    format: RawFormat,
}

impl RawWriter<BufWriter<File>> {
    /// Open (truncate) the dump file.
    pub fn create(path: &Path, format: RawFormat) -> Result<Self, Error> {
        Ok(Self {
            sink: BufWriter::new(File::create(path)?),
            format,
        })
    }
}

impl<W: Write> RawWriter<W> {
    /// Wrap an arbitrary sink.
    pub fn new(sink: W, format: RawFormat) -> Self {
        Self { sink, format }
    }

    /// Append one accepted measurement.
    ///
    /// ASCII: 16 space-separated hex bytes, then the decimal tick count.
    /// Binary: 16 raw bytes, then a 4-byte native-endian tick count - the
    /// consumer must share the producer's ABI; prefer ASCII for
    /// portability.
    pub fn record(&mut self, plaintext: &Block, ticks: Tick) -> io::Result<()> {
        match self.format {
            RawFormat::Ascii => {
                for byte in plaintext {
                    write!(self.sink, "{byte:02x} ")?;
                }
                writeln!(self.sink, "{ticks}")
            }
            RawFormat::Binary => {
                self.sink.write_all(plaintext)?;
                self.sink.write_all(&(ticks as u32).to_ne_bytes())
            }
        }
    }

    /// Flush buffered records.
    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}
