//! Staging a program blob end to end
//!
//! Deployment drives the whole bytecode lifecycle against the ledger:
//! allocate-and-claim (or clear) the account, stream the blob up in chunks,
//! seal it, and verify the result. One authority drives one account at a
//! time; the protocol offers no lock against a second writer.

use crate::address;
use crate::error::{Error, Result};
use crate::loader::lifecycle::BytecodeAccount;
use crate::loader::{budget, upload, LoaderInstruction};
use crate::program::Session;
use crate::system;
use crate::transport::Transport;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tracing::{info, warn};

/// Knobs for a deployment
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Allocation size of the bytecode account, in bytes
    pub space: u64,
    /// Upload chunk size; must stay under the transport payload limit
    pub chunk_size: usize,
    /// Clear and re-stage if the account already holds a program
    pub force: bool,
}

impl DeployOptions {
    /// Options for an allocation of `space` bytes
    pub fn new(space: u64) -> Self {
        DeployOptions {
            space,
            chunk_size: upload::DEFAULT_CHUNK_SIZE,
            force: false,
        }
    }
}

/// One staged-bytecode account under this session's authority
pub struct Deployment<'a, T: Transport> {
    session: &'a Session<T>,
    handle: String,
    bytecode: Pubkey,
}

impl<'a, T: Transport> Deployment<'a, T> {
    /// Address the account for `handle` under the session payer's authority
    pub fn new(session: &'a Session<T>, handle: impl Into<String>) -> Result<Self> {
        let handle = handle.into();
        let bytecode = address::bytecode_address(&session.payer(), &handle, session.loader_id())?;
        Ok(Deployment {
            session,
            handle,
            bytecode,
        })
    }

    /// Handle of the staged account
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Address of the staged account
    pub fn bytecode(&self) -> &Pubkey {
        &self.bytecode
    }

    /// Fetch the account's current state, if it exists on the ledger
    pub fn account(&self) -> Result<Option<BytecodeAccount>> {
        self.session.bytecode_account(&self.bytecode)
    }

    /// Allocate the account and claim it: one transaction carrying the
    /// seeded system allocation and the loader's `Initialize`.
    pub fn initialize(&self, space: u64) -> Result<Signature> {
        let payer = self.session.payer();
        let rent = self.session.transport().minimum_balance(space as usize)?;
        let create = system::create_account_with_seed(
            &payer,
            &self.bytecode,
            &payer,
            &self.handle,
            rent,
            space,
            self.session.loader_id(),
        );
        let claim = LoaderInstruction::Initialize {
            handle: self.handle.clone(),
        }
        .instruction(self.session.loader_id(), &payer, &self.bytecode);

        info!(handle = %self.handle, bytecode = %self.bytecode, space, "initializing bytecode account");
        self.session
            .transport()
            .send(&[create, claim], &format!("initialize {}", self.handle))
    }

    /// Append one chunk of content
    pub fn write(&self, data: &[u8]) -> Result<Signature> {
        self.write_with_context(data, &format!("write {}", self.handle))
    }

    fn write_with_context(&self, data: &[u8], context: &str) -> Result<Signature> {
        let ix = LoaderInstruction::Write {
            data: data.to_vec(),
        }
        .instruction(
            self.session.loader_id(),
            &self.session.payer(),
            &self.bytecode,
        );
        self.session.transport().send(&[ix], context)
    }

    /// Seal the account; needs the runtime's compute-budget preamble since
    /// the loader verifies the staged program while sealing it.
    pub fn finalize(&self) -> Result<Signature> {
        let mut instructions = budget::execution_preamble();
        instructions.push(LoaderInstruction::Finalize.instruction(
            self.session.loader_id(),
            &self.session.payer(),
            &self.bytecode,
        ));
        info!(handle = %self.handle, "finalizing bytecode account");
        self.session
            .transport()
            .send(&instructions, &format!("finalize {}", self.handle))
    }

    /// Reset the account to writable with a fresh allocation of `new_size`
    pub fn clear(&self, new_size: u64) -> Result<Signature> {
        let ix = LoaderInstruction::Clear {
            handle: self.handle.clone(),
            new_size,
        }
        .instruction(
            self.session.loader_id(),
            &self.session.payer(),
            &self.bytecode,
        );
        warn!(handle = %self.handle, new_size, "clearing bytecode account");
        self.session
            .transport()
            .send(&[ix], &format!("clear {}", self.handle))
    }

    /// Stream `blob` into the account with sequential chunked writes,
    /// starting at `start`.
    pub fn upload_from(&self, blob: &[u8], start: usize, chunk_size: usize) -> Result<()> {
        upload::upload_from(blob, start, chunk_size, |offset, chunk| {
            self.write_with_context(
                chunk,
                &format!("write {} chunk at offset {}", self.handle, offset),
            )
            .map(|_| ())
        })
    }

    /// Resume an interrupted upload.
    ///
    /// Reads the account's current length, checks the ledger prefix matches
    /// the blob, and restarts the chunk loop at that offset.
    pub fn resume(&self, blob: &[u8], chunk_size: usize) -> Result<()> {
        let account = self.account()?.ok_or(Error::NotInitialized)?;
        if account.finalized() {
            return Err(Error::WriteAfterFinalize {
                handle: self.handle.clone(),
            });
        }
        let offset = upload::resume_offset(&account);
        if account.content() != &blob[..offset.min(blob.len())] {
            return Err(Error::IncompleteUpload {
                written: offset,
                expected: blob.len(),
            });
        }
        info!(handle = %self.handle, offset, "resuming upload");
        self.upload_from(blob, offset, chunk_size)
    }

    /// Run the whole flow: create or clear the account, upload, finalize,
    /// and verify the staged length against the source blob.
    pub fn deploy(&self, blob: &[u8], options: &DeployOptions) -> Result<()> {
        let capacity = (options.space as usize)
            .saturating_sub(BytecodeAccount::layout_overhead(&self.handle));
        if blob.len() > capacity {
            return Err(Error::CapacityExceeded {
                requested: blob.len(),
                capacity,
            });
        }

        match self.account()? {
            None => {
                self.initialize(options.space)?;
            }
            Some(_) if !options.force => {
                return Err(Error::AlreadyInitialized {
                    handle: self.handle.clone(),
                });
            }
            Some(_) => {
                self.clear(options.space)?;
            }
        }

        self.upload_from(blob, 0, options.chunk_size)?;
        self.finalize()?;

        let account = self.account()?.ok_or(Error::NotInitialized)?;
        upload::verify_complete(&account, blob.len())?;
        if !account.finalized() {
            return Err(Error::NotFinalized {
                handle: self.handle.clone(),
            });
        }
        info!(handle = %self.handle, bytes = blob.len(), "deploy complete");
        Ok(())
    }
}
