//! # Solstage - Staged Bytecode Programs on Solana
//!
//! A client library for a loader program that stores opaque compiled
//! bytecode in ledger accounts and interprets it on demand. Solstage stages
//! a program blob through bounded chunked writes, seals it immutably, and
//! then invokes named sub-instructions inside it — the transaction layer
//! never needs static knowledge of the sub-program's instruction set.
//!
//! ## What lives where
//!
//! - [`idl`] - interface descriptions: instruction names, typed argument
//!   lists, account roles
//! - [`codec`] - the canonical little-endian argument encoding
//! - [`address`] - deterministic companion-account derivation
//! - [`loader`] - the loader's five-operation dispatch surface and the
//!   bytecode account lifecycle
//! - [`program`] - sessions and the pure call builder
//! - [`deploy`] - the create / upload / finalize flow
//! - [`transport`] - the ledger boundary; swap in your own for tests
//!
//! ## Building a call
//!
//! Calls are assembled offline and dispatched in one step. Every
//! validation failure — unknown instruction, bad argument type, missing or
//! undeclared account — surfaces before anything is sent:
//!
//! ```rust
//! use solana_sdk::pubkey::Pubkey;
//! use solstage::codec::Value;
//! use solstage::idl::Idl;
//! use solstage::program::{AccountMap, Program};
//!
//! # fn main() -> solstage::Result<()> {
//! let idl = Idl::from_json(r#"{
//!     "version": "0.1.0",
//!     "name": "counter",
//!     "instructions": [{
//!         "name": "IxBump",
//!         "accounts": [{ "name": "state", "isMut": true, "isSigner": false }],
//!         "args": [{ "name": "delta", "type": "u64" }]
//!     }]
//! }"#)?;
//!
//! let authority = Pubkey::new_unique();
//! let loader_id = Pubkey::new_unique();
//! let program = Program::new(idl, authority, loader_id)?;
//!
//! let state = Pubkey::new_unique();
//! let call = program.call(
//!     "IxBump",
//!     &[Value::U64(1)],
//!     &AccountMap::from([("state".to_string(), state)]),
//! )?;
//!
//! assert_eq!(call.args().len(), 8);
//! assert_eq!(call.remaining_accounts()[0].pubkey, state);
//! # Ok(())
//! # }
//! ```
//!
//! ## Deriving companion addresses
//!
//! Any party holding a program's bytecode address and a seed string can
//! recompute the same companion address, with no key able to control it:
//!
//! ```rust
//! use solana_sdk::pubkey::Pubkey;
//! use solstage::address;
//!
//! let bytecode = Pubkey::new_unique();
//! let loader_id = Pubkey::new_unique();
//! let (vault, bump) = address::derive(&bytecode, "vault", &loader_id);
//! assert_eq!(address::derive(&bytecode, "vault", &loader_id), (vault, bump));
//! ```
//!
//! ## Staging a program
//!
//! ```ignore
//! use solstage::deploy::{DeployOptions, Deployment};
//! use solstage::program::Session;
//! use solstage::transport::RpcTransport;
//!
//! let transport = RpcTransport::new("http://127.0.0.1:8899", payer);
//! let session = Session::new(loader_id, transport);
//!
//! let deployment = Deployment::new(&session, "escrow")?;
//! deployment.deploy(&bytecode_blob, &DeployOptions::new(80_000))?;
//! ```
//!
//! Uploads are strictly sequential — content is append-only and
//! position-dependent — and resumable: an interrupted upload restarts at
//! the account's on-ledger length via [`deploy::Deployment::resume`].
//!
//! ## Error taxonomy
//!
//! Every error classifies into one of four kinds via
//! [`Error::kind`](error::Error::kind): `Validation` and `Size` failures
//! abort before any network call; `State` and `Transport` failures carry
//! the failing step so work can resume.

/// Version of the solstage client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod address;
pub mod codec;
pub mod config;
pub mod deploy;
pub mod error;
pub mod idl;
pub mod loader;
pub mod program;
pub mod system;
pub mod transport;

// Re-export main types
pub use codec::Value;
pub use deploy::{DeployOptions, Deployment};
pub use error::{Error, ErrorKind, Result};
pub use idl::{Idl, IdlInstruction, IdlType};
pub use loader::{BytecodeAccount, LifecycleState, LoaderInstruction};
pub use program::{AccountMap, CallRequest, Program, Session};
pub use transport::{RpcTransport, Transport};
