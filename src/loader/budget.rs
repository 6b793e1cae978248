//! Compute-budget preamble for execution calls
//!
//! The interpreter runtime needs more heap and compute than a default
//! transaction provides, so every `Execute` (and `Finalize`) transaction is
//! prefixed with the ledger's compute-budget requests. The compute-budget
//! program takes no accounts; each request is a one-byte variant tag
//! followed by a little-endian value.

use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;

/// The ledger's compute-budget program
pub const COMPUTE_BUDGET_ID: Pubkey =
    Pubkey::from_str_const("ComputeBudget111111111111111111111111111111");

/// Heap the interpreter runtime is given per execution
pub const HEAP_FRAME_BYTES: u32 = 256 * 1024;

/// Compute-unit ceiling for an execution transaction
pub const COMPUTE_UNIT_LIMIT: u32 = 1_400_000;

const REQUEST_HEAP_FRAME: u8 = 1;
const SET_COMPUTE_UNIT_LIMIT: u8 = 2;

fn budget_instruction(tag: u8, value: u32) -> Instruction {
    let mut data = Vec::with_capacity(5);
    data.push(tag);
    data.extend_from_slice(&value.to_le_bytes());
    Instruction {
        program_id: COMPUTE_BUDGET_ID,
        accounts: vec![],
        data,
    }
}

/// Request a transaction heap frame of `bytes`
pub fn request_heap_frame(bytes: u32) -> Instruction {
    budget_instruction(REQUEST_HEAP_FRAME, bytes)
}

/// Cap the transaction's compute units
pub fn set_compute_unit_limit(units: u32) -> Instruction {
    budget_instruction(SET_COMPUTE_UNIT_LIMIT, units)
}

/// The preamble prepended to every execution transaction
pub fn execution_preamble() -> Vec<Instruction> {
    vec![
        request_heap_frame(HEAP_FRAME_BYTES),
        set_compute_unit_limit(COMPUTE_UNIT_LIMIT),
    ]
}
