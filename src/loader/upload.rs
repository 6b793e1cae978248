//! Chunked content upload
//!
//! Account content is append-only and position-dependent, so chunks are
//! written strictly in ascending offset order with one write in flight at a
//! time. No resume token exists on the wire: resuming an interrupted upload
//! means re-reading the account's current content length and restarting the
//! loop at that offset.

use crate::error::{Error, Result};
use crate::loader::lifecycle::BytecodeAccount;
use tracing::debug;

/// Chunk size used when the caller does not pick one.
///
/// Leaves room for the instruction discriminator, the length prefix, and
/// transaction overhead inside the transport payload limit.
pub const DEFAULT_CHUNK_SIZE: usize = 850;

/// Largest chunk the transport can carry in a single write
pub const MAX_CHUNK_SIZE: usize = 900;

/// Split `total` bytes into `(offset, len)` chunks of at most `max_chunk`
/// bytes, in ascending offset order.
pub fn chunk_plan(total: usize, max_chunk: usize) -> Result<Vec<(usize, usize)>> {
    if max_chunk == 0 {
        return Err(Error::ZeroChunkSize);
    }
    if max_chunk > MAX_CHUNK_SIZE {
        return Err(Error::ChunkOversized {
            len: max_chunk,
            limit: MAX_CHUNK_SIZE,
        });
    }
    let mut plan = Vec::with_capacity(total.div_ceil(max_chunk));
    let mut offset = 0;
    while offset < total {
        let len = max_chunk.min(total - offset);
        plan.push((offset, len));
        offset += len;
    }
    Ok(plan)
}

/// Upload `bytecode` starting at `start`, one chunk per `write_fn` call.
///
/// Writes are sequential: chunk N+1 is not issued until `write_fn` has
/// returned for chunk N. `write_fn` receives the chunk's offset and bytes;
/// an error aborts the loop and carries that offset back to the caller, who
/// can resume later from the account's on-ledger length.
pub fn upload_from<F>(bytecode: &[u8], start: usize, max_chunk: usize, mut write_fn: F) -> Result<()>
where
    F: FnMut(usize, &[u8]) -> Result<()>,
{
    let remaining = bytecode.len().saturating_sub(start);
    for (offset, len) in chunk_plan(remaining, max_chunk)? {
        let offset = start + offset;
        debug!(offset, len, total = bytecode.len(), "writing chunk");
        write_fn(offset, &bytecode[offset..offset + len])?;
    }
    Ok(())
}

/// Upload a whole blob from offset zero
pub fn upload<F>(bytecode: &[u8], max_chunk: usize, write_fn: F) -> Result<()>
where
    F: FnMut(usize, &[u8]) -> Result<()>,
{
    upload_from(bytecode, 0, max_chunk, write_fn)
}

/// Offset at which an interrupted upload should resume
pub fn resume_offset(account: &BytecodeAccount) -> usize {
    account.content().len()
}

/// Check that the on-ledger content length matches the source blob
pub fn verify_complete(account: &BytecodeAccount, expected_len: usize) -> Result<()> {
    let written = account.content().len();
    if written == expected_len {
        Ok(())
    } else {
        Err(Error::IncompleteUpload {
            written,
            expected: expected_len,
        })
    }
}
