//! Deterministic companion-account addressing
//!
//! Every staged program gets its own address namespace: a companion address
//! is a pure function of a base identity (normally the program's bytecode
//! account) and a human-readable seed string. The seed material is hashed
//! and run through the ledger's off-curve search, so the resulting address
//! can never be controlled by anyone holding a private key, and any party
//! holding the same `(base, seed)` pair recomputes the same `(address, bump)`.

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;

/// Derive a companion address from a base identity and a seed string.
///
/// Hashes `base || utf8(seed)` with SHA-256 and searches bump values
/// downward from 255 for the first candidate with no corresponding
/// private key. Deterministic: identical inputs always yield the same
/// `(address, bump)` pair.
pub fn derive(base: &Pubkey, seed: &str, loader_id: &Pubkey) -> (Pubkey, u8) {
    let mut hasher = Sha256::new();
    hasher.update(base.as_ref());
    hasher.update(seed.as_bytes());
    let digest = hasher.finalize();
    Pubkey::find_program_address(&[&digest], loader_id)
}

/// Conventional address of a program's staged-bytecode account.
///
/// The handle doubles as the ledger seed, so the authority and anyone it
/// hands the handle to can recompute the account address without storing it.
pub fn bytecode_address(authority: &Pubkey, handle: &str, loader_id: &Pubkey) -> Result<Pubkey> {
    Pubkey::create_with_seed(authority, handle, loader_id).map_err(|_| Error::SeedTooLong {
        seed: handle.to_string(),
    })
}
