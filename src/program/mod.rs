//! Client sessions and the call builder
//!
//! A [`Session`] pins the loader program's address once at construction and
//! owns the transport; a [`Program`] binds an interface description to its
//! staged bytecode account. Building a call is a pure transformation — the
//! description's declared types and account roles turn caller-supplied
//! values into an immutable [`CallRequest`], and every validation failure
//! surfaces there, before anything touches the network.
//!
//! ## Usage
//! ```ignore
//! use solstage::codec::Value;
//! use solstage::idl::Idl;
//! use solstage::program::{AccountMap, Program, Session};
//!
//! let session = Session::new(loader_id, transport);
//! let program = Program::new(Idl::from_file("escrow.json")?, authority, loader_id)?;
//!
//! let call = program.call(
//!     "IxInit",
//!     &[Value::U64(1_000)],
//!     &AccountMap::from([("user".to_string(), user)]),
//! )?;
//! session.execute(&call)?;
//! ```

pub mod accounts;

pub use accounts::{resolve, AccountMap};

use crate::address;
use crate::codec::{self, Value};
use crate::error::{Error, Result};
use crate::idl::Idl;
use crate::loader::lifecycle::BytecodeAccount;
use crate::loader::{budget, execute_instruction};
use crate::transport::Transport;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tracing::debug;

/// One connection to a loader deployment.
///
/// The loader's address is injected here, once, and is immutable for the
/// session's lifetime.
pub struct Session<T: Transport> {
    loader_id: Pubkey,
    transport: T,
}

impl<T: Transport> Session<T> {
    /// Create a session against the loader at `loader_id`
    pub fn new(loader_id: Pubkey, transport: T) -> Self {
        Session {
            loader_id,
            transport,
        }
    }

    /// Address of the loader program
    pub fn loader_id(&self) -> &Pubkey {
        &self.loader_id
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The transport's fee-paying identity
    pub fn payer(&self) -> Pubkey {
        self.transport.payer()
    }

    /// Bind an interface description to this session's loader.
    ///
    /// The description's authority defaults to the transport payer.
    pub fn program(&self, idl: Idl) -> Result<Program> {
        Program::new(idl, self.payer(), self.loader_id)
    }

    /// Dispatch a built call to the execution runtime.
    ///
    /// Whether the target account is finalized is not checked here; callers
    /// that need the guarantee read the account state first.
    pub fn execute(&self, call: &CallRequest) -> Result<Signature> {
        let mut instructions = budget::execution_preamble();
        instructions.push(call.instruction());
        debug!(instruction = call.instruction_name(), "dispatching execute");
        self.transport
            .send(&instructions, &format!("execute {}", call.instruction_name()))
    }

    /// Fetch and decode a staged-bytecode account, if it exists
    pub fn bytecode_account(&self, address: &Pubkey) -> Result<Option<BytecodeAccount>> {
        match self.transport.account_data(address)? {
            Some(data) => Ok(Some(BytecodeAccount::decode(&data)?)),
            None => Ok(None),
        }
    }
}

/// An interface description bound to its staged bytecode account
pub struct Program {
    idl: Idl,
    authority: Pubkey,
    loader_id: Pubkey,
    bytecode: Pubkey,
}

impl Program {
    /// Validate the description and compute the program's bytecode address
    /// from the authority and the description's name.
    pub fn new(idl: Idl, authority: Pubkey, loader_id: Pubkey) -> Result<Program> {
        idl.validate()?;
        let bytecode = address::bytecode_address(&authority, &idl.name, &loader_id)?;
        Ok(Program {
            idl,
            authority,
            loader_id,
            bytecode,
        })
    }

    /// The interface description
    pub fn idl(&self) -> &Idl {
        &self.idl
    }

    /// The authority that staged the program
    pub fn authority(&self) -> &Pubkey {
        &self.authority
    }

    /// Address of the staged bytecode account
    pub fn bytecode(&self) -> &Pubkey {
        &self.bytecode
    }

    /// Derive a companion address in this program's namespace
    pub fn derive_address(&self, seed: &str) -> (Pubkey, u8) {
        address::derive(&self.bytecode, seed, &self.loader_id)
    }

    /// Build a call to a declared instruction.
    ///
    /// Pure and side-effect free: argument values are encoded in declaration
    /// order and accounts resolved against the declaration, so bad types,
    /// wrong counts, and missing or undeclared accounts all fail here.
    pub fn call(
        &self,
        instruction: &str,
        args: &[Value],
        accounts: &AccountMap,
    ) -> Result<CallRequest> {
        let decl = self
            .idl
            .instruction(instruction)
            .ok_or_else(|| Error::UnknownInstruction {
                name: instruction.to_string(),
            })?;
        let args = codec::args_buffer(&decl.name, &decl.args, args)?;
        let remaining = accounts::resolve(decl, accounts)?;
        Ok(CallRequest {
            loader_id: self.loader_id,
            bytecode: self.bytecode,
            instruction: decl.name.clone(),
            args,
            remaining,
        })
    }
}

/// An assembled, immutable dispatch request.
///
/// Everything the execution runtime needs: the sub-instruction name, the
/// encoded argument buffer, and the remaining accounts in resolved order.
/// Built fresh per invocation and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    loader_id: Pubkey,
    bytecode: Pubkey,
    instruction: String,
    args: Vec<u8>,
    remaining: Vec<AccountMeta>,
}

impl CallRequest {
    /// Name of the sub-instruction being invoked
    pub fn instruction_name(&self) -> &str {
        &self.instruction
    }

    /// Encoded argument buffer
    pub fn args(&self) -> &[u8] {
        &self.args
    }

    /// Remaining accounts, in the order the runtime will index them
    pub fn remaining_accounts(&self) -> &[AccountMeta] {
        &self.remaining
    }

    /// The bytecode account this call runs against
    pub fn bytecode(&self) -> &Pubkey {
        &self.bytecode
    }

    /// Lower to the loader's `Execute` ledger instruction
    pub fn instruction(&self) -> Instruction {
        execute_instruction(
            &self.loader_id,
            &self.bytecode,
            &self.instruction,
            &self.args,
            &self.remaining,
        )
    }
}
