//! System-program calls the deploy flow issues
//!
//! Account allocation goes through the ledger's system program. Only the
//! seeded-creation call is needed here; it is encoded locally (discriminant
//! and fields in the system program's native little-endian layout) so the
//! dependency surface stays at the client and SDK crates.

use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

/// The ledger's system program
pub const SYSTEM_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("11111111111111111111111111111111");

const CREATE_ACCOUNT_WITH_SEED: u32 = 3;

/// Create an account at `Pubkey::create_with_seed(base, seed, owner)`.
///
/// `from` funds the account and `base` must sign; in this client they are
/// the same authority key.
pub fn create_account_with_seed(
    from: &Pubkey,
    to: &Pubkey,
    base: &Pubkey,
    seed: &str,
    lamports: u64,
    space: u64,
    owner: &Pubkey,
) -> Instruction {
    let mut data = Vec::with_capacity(4 + 32 + 8 + seed.len() + 8 + 8 + 32);
    data.extend_from_slice(&CREATE_ACCOUNT_WITH_SEED.to_le_bytes());
    data.extend_from_slice(base.as_ref());
    data.extend_from_slice(&(seed.len() as u64).to_le_bytes());
    data.extend_from_slice(seed.as_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    data.extend_from_slice(&space.to_le_bytes());
    data.extend_from_slice(owner.as_ref());

    let mut accounts = vec![
        AccountMeta::new(*from, true),
        AccountMeta::new(*to, false),
    ];
    if base != from {
        accounts.push(AccountMeta::new_readonly(*base, true));
    }

    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts,
        data,
    }
}

/// Allocation size requested by a seeded-creation instruction.
///
/// Used by tooling and tests that inspect outgoing transactions.
pub fn created_space(data: &[u8]) -> Option<u64> {
    if data.len() < 4 || u32::from_le_bytes(data[..4].try_into().ok()?) != CREATE_ACCOUNT_WITH_SEED
    {
        return None;
    }
    let seed_len = u64::from_le_bytes(data.get(36..44)?.try_into().ok()?) as usize;
    let space_at = 44 + seed_len + 8;
    Some(u64::from_le_bytes(data.get(space_at..space_at + 8)?.try_into().ok()?))
}
