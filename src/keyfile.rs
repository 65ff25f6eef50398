//! Target key file access.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Error;
use crate::types::Block;

/// Read a 16-raw-byte key file. Anything short of 16 bytes is a
/// configuration error naming the path.
pub fn read_target_key(path: &Path) -> Result<Block, Error> {
    let mut file = File::open(path).map_err(|source| Error::KeyFile {
        path: path.to_owned(),
        source,
    })?;
    let mut key: Block = [0u8; 16];
    file.read_exact(&mut key).map_err(|source| Error::KeyFile {
        path: path.to_owned(),
        source,
    })?;
    Ok(key)
}
