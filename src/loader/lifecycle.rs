//! Staged-bytecode account lifecycle
//!
//! A bytecode account moves through `Uninitialized → Writing → Finalized`.
//! Content may only grow while the account is writable; once finalized,
//! writes are rejected and only `clear` can make the account writable again,
//! and only by simultaneously dropping the content. Execution against the
//! account is meaningful only once it is finalized — that gate is a protocol
//! convention checked by callers, not enforced here.
//!
//! The same model backs both sides of the protocol: the client decodes
//! ledger state into it to find resume offsets, and the test ledger applies
//! it to emulate the loader. A single authority is assumed to drive the
//! lifecycle; concurrent authority use is undefined behavior and is not
//! guarded by any lock.

use crate::error::{Error, Result};
use crate::loader::account_discriminator;
use solana_sdk::pubkey::Pubkey;

/// Persisted account type tag
pub const ACCOUNT_KIND: &str = "Bytecode";

/// Lifecycle states of a staged-bytecode account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Allocated but never claimed; all zeroes on the ledger
    Uninitialized,
    /// Claimed and accepting content
    Writing,
    /// Sealed; content is immutable and executable
    Finalized,
}

/// One deployed-but-opaque program blob on the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct BytecodeAccount {
    handle: String,
    authority: Pubkey,
    finalized: bool,
    content: Vec<u8>,
    capacity: usize,
}

impl BytecodeAccount {
    /// Claim a freshly allocated account: `Uninitialized → Writing`.
    ///
    /// `capacity` is the content allocation in bytes; the caller checks the
    /// account really was uninitialized (see [`BytecodeAccount::is_initialized`]).
    pub fn initialize(handle: impl Into<String>, authority: Pubkey, capacity: usize) -> Self {
        BytecodeAccount {
            handle: handle.into(),
            authority,
            finalized: false,
            content: Vec::new(),
            capacity,
        }
    }

    /// Handle chosen at creation
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Identity permitted to write and finalize
    pub fn authority(&self) -> &Pubkey {
        &self.authority
    }

    /// Whether the account has been sealed
    pub fn finalized(&self) -> bool {
        self.finalized
    }

    /// Staged content so far
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Maximum content length the allocation can hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        if self.finalized {
            LifecycleState::Finalized
        } else {
            LifecycleState::Writing
        }
    }

    /// Reject signers other than the recorded authority
    pub fn check_authority(&self, signer: &Pubkey) -> Result<()> {
        if signer == &self.authority {
            Ok(())
        } else {
            Err(Error::WrongAuthority {
                handle: self.handle.clone(),
            })
        }
    }

    /// Append a chunk: valid only in `Writing`, bounded by capacity
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.finalized {
            return Err(Error::WriteAfterFinalize {
                handle: self.handle.clone(),
            });
        }
        let requested = self.content.len() + data.len();
        if requested > self.capacity {
            return Err(Error::CapacityExceeded {
                requested,
                capacity: self.capacity,
            });
        }
        self.content.extend_from_slice(data);
        Ok(())
    }

    /// Seal the account: `Writing → Finalized`.
    ///
    /// An empty program can never execute meaningfully, so finalizing one is
    /// rejected.
    pub fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Err(Error::AlreadyFinalized {
                handle: self.handle.clone(),
            });
        }
        if self.content.is_empty() {
            return Err(Error::FinalizeEmpty {
                handle: self.handle.clone(),
            });
        }
        self.finalized = true;
        Ok(())
    }

    /// Reset to `Writing` with empty content and a new capacity.
    ///
    /// The explicit escape hatch out of `Finalized`: the flag and the content
    /// reset together, never separately.
    pub fn clear(&mut self, new_capacity: usize) {
        self.finalized = false;
        self.content.clear();
        self.capacity = new_capacity;
    }

    // --- persisted layout -------------------------------------------------
    //
    // discriminator (8) | handle len (4) + utf8 | authority (32)
    // | finalized (1) | content len (4) + bytes | zero padding to allocation

    /// Fixed layout overhead for a given handle, excluding content
    pub fn layout_overhead(handle: &str) -> usize {
        8 + 4 + handle.len() + 32 + 1 + 4
    }

    /// Allocation size needed for a handle and content capacity
    pub fn required_space(handle: &str, capacity: usize) -> usize {
        Self::layout_overhead(handle) + capacity
    }

    /// Whether allocated account data has been claimed as a bytecode account
    pub fn is_initialized(data: &[u8]) -> bool {
        data.len() >= 8 && data[..8] == account_discriminator(ACCOUNT_KIND)
    }

    /// Decode persisted account data.
    ///
    /// Capacity is recovered from the allocation length, so a decoded
    /// account enforces the same write bound the ledger does.
    pub fn decode(data: &[u8]) -> Result<BytecodeAccount> {
        let malformed = |reason: &str| Error::MalformedAccount {
            reason: reason.to_string(),
        };

        if !Self::is_initialized(data) {
            return Err(Error::NotInitialized);
        }
        let mut offset = 8;

        let handle_len = read_u32(data, &mut offset).ok_or_else(|| malformed("handle length"))? as usize;
        let handle_bytes = read_slice(data, &mut offset, handle_len)
            .ok_or_else(|| malformed("handle bytes"))?;
        let handle = std::str::from_utf8(handle_bytes)
            .map_err(|_| Error::InvalidUtf8)?
            .to_string();

        let authority_bytes =
            read_slice(data, &mut offset, 32).ok_or_else(|| malformed("authority"))?;
        let mut authority = [0u8; 32];
        authority.copy_from_slice(authority_bytes);

        let finalized = match read_slice(data, &mut offset, 1) {
            Some([0]) => false,
            Some([1]) => true,
            _ => return Err(malformed("finalized flag")),
        };

        let content_len =
            read_u32(data, &mut offset).ok_or_else(|| malformed("content length"))? as usize;
        let content = read_slice(data, &mut offset, content_len)
            .ok_or_else(|| malformed("content bytes"))?
            .to_vec();

        let capacity = data.len() - Self::layout_overhead(&handle);

        Ok(BytecodeAccount {
            handle,
            authority: Pubkey::new_from_array(authority),
            finalized,
            content,
            capacity,
        })
    }

    /// Encode into account data of the given allocation size, zero padded
    pub fn encode(&self, space: usize) -> Result<Vec<u8>> {
        let required = Self::layout_overhead(&self.handle) + self.content.len();
        if space < required {
            return Err(Error::CapacityExceeded {
                requested: required,
                capacity: space,
            });
        }
        let mut out = Vec::with_capacity(space);
        out.extend_from_slice(&account_discriminator(ACCOUNT_KIND));
        out.extend_from_slice(&(self.handle.len() as u32).to_le_bytes());
        out.extend_from_slice(self.handle.as_bytes());
        out.extend_from_slice(self.authority.as_ref());
        out.push(self.finalized as u8);
        out.extend_from_slice(&(self.content.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.content);
        out.resize(space, 0);
        Ok(out)
    }
}

fn read_u32(data: &[u8], offset: &mut usize) -> Option<u32> {
    let slice = read_slice(data, offset, 4)?;
    Some(u32::from_le_bytes(slice.try_into().ok()?))
}

fn read_slice<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> Option<&'a [u8]> {
    let slice = data.get(*offset..*offset + len)?;
    *offset += len;
    Some(slice)
}
