//! The loader program's dispatch surface
//!
//! The loader is the on-ledger program that owns every staged-bytecode
//! account and hosts the execution runtime. Its instruction set is fixed at
//! five operations; everything a staged program can do flows through
//! `Execute`, which takes a sub-instruction name and an opaque argument
//! buffer so the transaction layer never needs static knowledge of the
//! sub-program's interface.
//!
//! Wire format per instruction: an 8-byte discriminator
//! (`sha256("global:<name>")[..8]`) followed by the codec encoding of each
//! argument in order.

pub mod budget;
pub mod lifecycle;
pub mod upload;

pub use lifecycle::{BytecodeAccount, LifecycleState};

use crate::codec::{self, Value};
use crate::error::{Error, Result};
use crate::idl::IdlType;
use crate::system::SYSTEM_PROGRAM_ID;
use sha2::{Digest, Sha256};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

/// Dispatch discriminator for a loader instruction name
pub fn discriminator(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("global:{}", name).as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Discriminator marking a persisted account's type
pub fn account_discriminator(name: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("account:{}", name).as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

fn string_ty() -> IdlType {
    IdlType::Primitive("string".to_string())
}

fn bytes_ty() -> IdlType {
    IdlType::Primitive("bytes".to_string())
}

fn u64_ty() -> IdlType {
    IdlType::Primitive("u64".to_string())
}

/// One call into the loader program
///
/// A closed set: every operation the loader understands is a variant here,
/// so an unknown operation is unrepresentable on the client side.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderInstruction {
    /// Claim a freshly allocated account as a bytecode account
    Initialize {
        /// Handle the account will answer to; also its address seed
        handle: String,
    },
    /// Append a chunk to the staged content
    Write {
        /// Chunk bytes
        data: Vec<u8>,
    },
    /// Seal the account; content becomes immutable
    Finalize,
    /// Run a named sub-instruction inside the staged program
    Execute {
        /// Sub-instruction name
        id: String,
        /// Canonically encoded argument buffer
        args: Vec<u8>,
    },
    /// Reset a bytecode account to the writable state with a new capacity
    Clear {
        /// Handle, re-checked against the account address on the ledger
        handle: String,
        /// New allocation size in bytes
        new_size: u64,
    },
}

impl LoaderInstruction {
    /// Wire name of this operation
    pub fn name(&self) -> &'static str {
        match self {
            LoaderInstruction::Initialize { .. } => "initialize",
            LoaderInstruction::Write { .. } => "write",
            LoaderInstruction::Finalize => "finalize",
            LoaderInstruction::Execute { .. } => "execute",
            LoaderInstruction::Clear { .. } => "clear",
        }
    }

    /// Serialize to instruction data: discriminator, then encoded args
    pub fn data(&self) -> Vec<u8> {
        let mut out = discriminator(self.name()).to_vec();
        // arguments are infallible here: variants pin the value types
        match self {
            LoaderInstruction::Initialize { handle } => {
                codec::encode_into(&string_ty(), &Value::String(handle.clone()), &mut out)
                    .expect("string arg");
            }
            LoaderInstruction::Write { data } => {
                codec::encode_into(&bytes_ty(), &Value::Bytes(data.clone()), &mut out)
                    .expect("bytes arg");
            }
            LoaderInstruction::Finalize => {}
            LoaderInstruction::Execute { id, args } => {
                codec::encode_into(&string_ty(), &Value::String(id.clone()), &mut out)
                    .expect("string arg");
                codec::encode_into(&bytes_ty(), &Value::Bytes(args.clone()), &mut out)
                    .expect("bytes arg");
            }
            LoaderInstruction::Clear { handle, new_size } => {
                codec::encode_into(&string_ty(), &Value::String(handle.clone()), &mut out)
                    .expect("string arg");
                codec::encode_into(&u64_ty(), &Value::U64(*new_size), &mut out).expect("u64 arg");
            }
        }
        out
    }

    /// Parse instruction data back into an operation.
    ///
    /// This is the dispatch the runtime itself performs; the client exposes
    /// it so tests and tooling can decode captured transactions.
    pub fn parse(data: &[u8]) -> Result<LoaderInstruction> {
        if data.len() < 8 {
            return Err(Error::BufferUnderflow {
                needed: 8,
                remaining: data.len(),
            });
        }
        let (disc, rest) = data.split_at(8);

        if disc == discriminator("initialize") {
            let (handle, _) = codec::decode(&string_ty(), rest)?;
            if let Value::String(handle) = handle {
                return Ok(LoaderInstruction::Initialize { handle });
            }
        } else if disc == discriminator("write") {
            let (data, _) = codec::decode(&bytes_ty(), rest)?;
            if let Value::Bytes(data) = data {
                return Ok(LoaderInstruction::Write { data });
            }
        } else if disc == discriminator("finalize") {
            return Ok(LoaderInstruction::Finalize);
        } else if disc == discriminator("execute") {
            let (id, n) = codec::decode(&string_ty(), rest)?;
            let (args, _) = codec::decode(&bytes_ty(), &rest[n..])?;
            if let (Value::String(id), Value::Bytes(args)) = (id, args) {
                return Ok(LoaderInstruction::Execute { id, args });
            }
        } else if disc == discriminator("clear") {
            let (handle, n) = codec::decode(&string_ty(), rest)?;
            let (new_size, _) = codec::decode(&u64_ty(), &rest[n..])?;
            if let (Value::String(handle), Value::U64(new_size)) = (handle, new_size) {
                return Ok(LoaderInstruction::Clear { handle, new_size });
            }
        }

        Err(Error::MalformedAccount {
            reason: "unrecognized loader instruction".to_string(),
        })
    }

    fn account_metas(&self, authority: &Pubkey, bytecode: &Pubkey) -> Vec<AccountMeta> {
        match self {
            LoaderInstruction::Initialize { .. }
            | LoaderInstruction::Write { .. }
            | LoaderInstruction::Finalize => vec![
                AccountMeta::new_readonly(*authority, true),
                AccountMeta::new(*bytecode, false),
            ],
            LoaderInstruction::Execute { .. } => vec![AccountMeta::new_readonly(*bytecode, false)],
            LoaderInstruction::Clear { .. } => vec![
                AccountMeta::new_readonly(*authority, true),
                AccountMeta::new(*bytecode, false),
                AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            ],
        }
    }

    /// Lower to a ledger instruction.
    ///
    /// `Execute` callers append their remaining accounts to the returned
    /// instruction's account list; the other operations are complete as
    /// returned. The authority is unreferenced by `Execute`.
    pub fn instruction(
        &self,
        loader_id: &Pubkey,
        authority: &Pubkey,
        bytecode: &Pubkey,
    ) -> Instruction {
        Instruction {
            program_id: *loader_id,
            accounts: self.account_metas(authority, bytecode),
            data: self.data(),
        }
    }
}

/// Lower an `Execute` call with its remaining accounts already resolved.
///
/// The bytecode account leads the list read-only; the remaining accounts
/// follow in the caller's order, which the runtime indexes positionally.
pub fn execute_instruction(
    loader_id: &Pubkey,
    bytecode: &Pubkey,
    id: &str,
    args: &[u8],
    remaining: &[AccountMeta],
) -> Instruction {
    let op = LoaderInstruction::Execute {
        id: id.to_string(),
        args: args.to_vec(),
    };
    let mut accounts = vec![AccountMeta::new_readonly(*bytecode, false)];
    accounts.extend_from_slice(remaining);
    Instruction {
        program_id: *loader_id,
        accounts,
        data: op.data(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminators_are_distinct() {
        let names = ["initialize", "write", "finalize", "execute", "clear"];
        for a in names {
            for b in names {
                if a != b {
                    assert_ne!(discriminator(a), discriminator(b));
                }
            }
        }
        assert_ne!(discriminator("initialize"), account_discriminator("initialize"));
    }

    #[test]
    fn test_data_roundtrip() {
        let cases = vec![
            LoaderInstruction::Initialize {
                handle: "swap".to_string(),
            },
            LoaderInstruction::Write {
                data: vec![1, 2, 3],
            },
            LoaderInstruction::Finalize,
            LoaderInstruction::Execute {
                id: "IxDeposit".to_string(),
                args: vec![7; 9],
            },
            LoaderInstruction::Clear {
                handle: "swap".to_string(),
                new_size: 4096,
            },
        ];
        for ix in cases {
            let parsed = LoaderInstruction::parse(&ix.data()).unwrap();
            assert_eq!(parsed, ix);
        }
    }

    #[test]
    fn test_data_layout() {
        let ix = LoaderInstruction::Write {
            data: vec![0xaa, 0xbb],
        };
        let data = ix.data();
        assert_eq!(&data[..8], &discriminator("write"));
        // u32 length prefix then the raw chunk
        assert_eq!(&data[8..12], &[2, 0, 0, 0]);
        assert_eq!(&data[12..], &[0xaa, 0xbb]);
    }

    #[test]
    fn test_account_roles() {
        let loader = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let bytecode = Pubkey::new_unique();

        let ix = LoaderInstruction::Write { data: vec![] }.instruction(
            &loader,
            &authority,
            &bytecode,
        );
        assert_eq!(ix.program_id, loader);
        assert!(ix.accounts[0].is_signer && !ix.accounts[0].is_writable);
        assert!(!ix.accounts[1].is_signer && ix.accounts[1].is_writable);

        let ix = LoaderInstruction::Execute {
            id: "Ix".to_string(),
            args: vec![],
        }
        .instruction(&loader, &authority, &bytecode);
        assert_eq!(ix.accounts.len(), 1);
        assert!(!ix.accounts[0].is_writable);

        let ix = LoaderInstruction::Clear {
            handle: "h".to_string(),
            new_size: 1,
        }
        .instruction(&loader, &authority, &bytecode);
        assert_eq!(ix.accounts[2].pubkey, SYSTEM_PROGRAM_ID);
    }

    #[test]
    fn test_parse_rejects_unknown_discriminator() {
        let err = LoaderInstruction::parse(&[0u8; 12]).unwrap_err();
        assert!(matches!(err, Error::MalformedAccount { .. }));
    }
}
