//! Error types for the solstage client

use thiserror::Error;

/// Solstage client errors
#[derive(Error, Debug)]
pub enum Error {
    // Interface-description errors
    /// Argument type that the codec does not support
    ///
    /// **Triggered by:** an interface description declaring a type outside the
    /// supported set (for example `u128` or a user-defined struct)
    /// **Detected:** when the description is loaded, before any network call
    #[error("Unsupported argument type: {type_name}")]
    UnsupportedType {
        /// Type name as written in the interface description
        type_name: String,
    },

    /// Interface description failed to parse
    #[error("Invalid interface description: {reason}")]
    InvalidIdl {
        /// Parse failure description
        reason: String,
    },

    /// Two instructions in one interface description share a name
    #[error("Duplicate instruction name: {name}")]
    DuplicateInstruction {
        /// The repeated instruction name
        name: String,
    },

    /// Call to an instruction the interface description does not declare
    #[error("Unknown instruction: {name}")]
    UnknownInstruction {
        /// Requested instruction name
        name: String,
    },

    // Argument errors
    /// Wrong number of argument values for an instruction
    #[error("Instruction {instruction} takes {expected} arguments, got {got}")]
    ArgumentCount {
        /// Instruction name
        instruction: String,
        /// Declared argument count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// Supplied value does not match the declared argument type
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Declared type
        expected: String,
        /// Supplied value's type
        got: String,
    },

    /// Fixed-size array value with the wrong element count
    #[error("Array length mismatch: declared {expected}, got {got}")]
    ArrayLength {
        /// Declared element count
        expected: usize,
        /// Supplied element count
        got: usize,
    },

    /// Ran out of bytes while decoding
    #[error("Buffer underflow: needed {needed} bytes, {remaining} remaining")]
    BufferUnderflow {
        /// Bytes the current field requires
        needed: usize,
        /// Bytes left in the buffer
        remaining: usize,
    },

    /// String field holding invalid UTF-8
    #[error("Invalid UTF-8 in string field")]
    InvalidUtf8,

    // Account errors
    /// Declared account missing from the caller-supplied mapping
    ///
    /// **Triggered by:** building a call without binding every non-optional
    /// account the instruction declares
    #[error("Instruction {instruction} is missing account: {name}")]
    MissingAccount {
        /// Instruction name
        instruction: String,
        /// The unbound account name
        name: String,
    },

    /// Caller supplied an account name the instruction does not declare
    ///
    /// **Triggered by:** a typo in the account mapping; rejecting it keeps the
    /// typo from being silently ignored
    #[error("Instruction {instruction} does not declare account: {name}")]
    UnknownAccount {
        /// Instruction name
        instruction: String,
        /// The undeclared account name
        name: String,
    },

    /// Composite account group in a declaration
    ///
    /// Flattening nested groups is a known limitation, not an extension point;
    /// resolution fails rather than dropping accounts
    #[error("Account group {name} cannot be resolved: nested account groups are not supported")]
    AccountGroup {
        /// Group name
        name: String,
    },

    /// Seed string too long for a derived account address
    #[error("Seed too long for address derivation: {seed}")]
    SeedTooLong {
        /// The offending seed
        seed: String,
    },

    // Lifecycle errors
    /// Initialize on an account that already holds a program
    #[error("Bytecode account already initialized: {handle}")]
    AlreadyInitialized {
        /// Account handle
        handle: String,
    },

    /// Operation on an account that was never initialized
    #[error("Bytecode account not initialized")]
    NotInitialized,

    /// Write after the account was sealed
    #[error("Bytecode account {handle} is finalized; writes are rejected")]
    WriteAfterFinalize {
        /// Account handle
        handle: String,
    },

    /// Finalize on an already-sealed account
    #[error("Bytecode account {handle} is already finalized")]
    AlreadyFinalized {
        /// Account handle
        handle: String,
    },

    /// Finalize with no content staged
    ///
    /// An empty program can never execute meaningfully, so sealing one is
    /// treated as a validation failure
    #[error("Bytecode account {handle} has no content to finalize")]
    FinalizeEmpty {
        /// Account handle
        handle: String,
    },

    /// Execute against an account that has not been sealed
    #[error("Bytecode account {handle} is not finalized")]
    NotFinalized {
        /// Account handle
        handle: String,
    },

    /// Signer is not the account's recorded authority
    #[error("Wrong authority for bytecode account {handle}")]
    WrongAuthority {
        /// Account handle
        handle: String,
    },

    /// On-ledger account bytes do not decode as a bytecode account
    #[error("Malformed bytecode account data: {reason}")]
    MalformedAccount {
        /// Decode failure description
        reason: String,
    },

    /// Upload finished but the on-ledger length disagrees with the source blob
    ///
    /// Resumable: restart the upload at the reported written length
    #[error("Incomplete upload: {written} of {expected} bytes on ledger")]
    IncompleteUpload {
        /// Bytes currently on the ledger
        written: usize,
        /// Length of the source blob
        expected: usize,
    },

    // Size errors
    /// Content would exceed the account's allocated capacity
    #[error("Capacity exceeded: {requested} bytes requested, {capacity} allocated")]
    CapacityExceeded {
        /// Total content length the operation would produce
        requested: usize,
        /// Allocated content capacity
        capacity: usize,
    },

    /// Chunk larger than the transport payload limit
    #[error("Chunk of {len} bytes exceeds the payload limit of {limit}")]
    ChunkOversized {
        /// Offending chunk length
        len: usize,
        /// Payload limit
        limit: usize,
    },

    /// Chunk size of zero would never make progress
    #[error("Chunk size must be greater than zero")]
    ZeroChunkSize,

    // External errors
    /// Ledger submission failure, propagated unmodified
    ///
    /// **Recovery:** retry policy belongs to the caller; the context names the
    /// failing step so partial uploads can be resumed
    #[error("Transport error during {context}: {source}")]
    Transport {
        /// The step that was being performed
        context: String,
        /// The underlying client error
        #[source]
        source: Box<solana_client::client_error::ClientError>,
    },
}

/// The four error classes of the staging protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before dispatch: bad types, unknown names, malformed input
    Validation,
    /// Lifecycle rule violated, locally or as reported by the runtime
    State,
    /// Content or chunk exceeds an allocated or transported bound
    Size,
    /// Network or ledger submission failure
    Transport,
}

impl Error {
    /// Wrap a client error with the name of the failing step
    pub fn transport(
        context: impl Into<String>,
        source: solana_client::client_error::ClientError,
    ) -> Self {
        Error::Transport {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Classify this error into the protocol taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedType { .. }
            | Error::InvalidIdl { .. }
            | Error::DuplicateInstruction { .. }
            | Error::UnknownInstruction { .. }
            | Error::ArgumentCount { .. }
            | Error::TypeMismatch { .. }
            | Error::ArrayLength { .. }
            | Error::BufferUnderflow { .. }
            | Error::InvalidUtf8
            | Error::MissingAccount { .. }
            | Error::UnknownAccount { .. }
            | Error::AccountGroup { .. }
            | Error::SeedTooLong { .. }
            | Error::MalformedAccount { .. } => ErrorKind::Validation,

            Error::AlreadyInitialized { .. }
            | Error::NotInitialized
            | Error::WriteAfterFinalize { .. }
            | Error::AlreadyFinalized { .. }
            | Error::FinalizeEmpty { .. }
            | Error::NotFinalized { .. }
            | Error::WrongAuthority { .. }
            | Error::IncompleteUpload { .. } => ErrorKind::State,

            Error::CapacityExceeded { .. }
            | Error::ChunkOversized { .. }
            | Error::ZeroChunkSize => ErrorKind::Size,

            Error::Transport { .. } => ErrorKind::Transport,
        }
    }
}

/// Result type for solstage operations
pub type Result<T> = std::result::Result<T, Error>;
