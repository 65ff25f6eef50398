//! Pluggable AES-128 encryption oracles.
//!
//! The attack drives its target through a narrow three-operation interface:
//! one-time initialization (construction), key expansion into retained
//! state, and block encryption under the last-expanded key. Two
//! implementations satisfy it:
//!
//! - [`TBoxAes`] - table-based first rounds, the leaky attack target
//! - [`HardenedAes`] - the fixsliced RustCrypto implementation, expected
//!   immune and kept as a control
//!
//! Selection happens at assembly time (the `hardened-oracle` feature picks
//! the driver's oracle); no callsite branches at runtime.

mod hardened;
mod tbox;

pub use hardened::HardenedAes;
pub use tbox::TBoxAes;

use crate::types::Block;

/// A block cipher with process-style expanded-key state.
///
/// `encrypt` uses whatever key was last passed to `expand`. Callers must
/// serialize key changes with encryption; under the engine's
/// single-threaded model this holds trivially.
pub trait CipherOracle {
    /// Expand a 16-byte key into internal round-key state.
    fn expand(&mut self, key: &Block);

    /// Encrypt one block under the last-expanded key.
    fn encrypt(&mut self, input: &Block, output: &mut Block);
}
