//! Interface descriptions for staged programs
//!
//! A staged program is opaque to the ledger, so every call against it is
//! driven by an interface description: the program's instruction names, their
//! typed argument lists, and their account role lists. Descriptions are
//! loaded from JSON, validated once, and read-only afterwards.
//!
//! ## Description format
//! ```json
//! {
//!   "version": "0.1.0",
//!   "name": "escrow",
//!   "instructions": [
//!     {
//!       "name": "IxInit",
//!       "accounts": [
//!         { "name": "user", "isMut": true, "isSigner": true },
//!         { "name": "escrow", "isMut": true, "isSigner": false }
//!       ],
//!       "args": [ { "name": "amount", "type": "u64" } ]
//!     }
//!   ]
//! }
//! ```
//!
//! ## Usage
//! ```ignore
//! use solstage::idl::Idl;
//!
//! let idl = Idl::from_file("target/idl/escrow.json")?;
//! let ix = idl.instruction("IxInit").unwrap();
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Argument type names the codec supports, as written in descriptions
pub const SUPPORTED_PRIMITIVES: &[&str] = &[
    "bool",
    "u8",
    "i8",
    "u16",
    "i16",
    "u32",
    "i32",
    "u64",
    "i64",
    "f32",
    "f64",
    "bytes",
    "string",
    "publicKey",
];

/// Interface description of one staged program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Idl {
    /// Description format version
    pub version: String,
    /// Program name; also the conventional handle of its bytecode account
    pub name: String,
    /// Optional documentation lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Vec<String>>,
    /// Declared instructions, in declaration order
    pub instructions: Vec<IdlInstruction>,
}

/// One callable instruction of a staged program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlInstruction {
    /// Instruction name, unique within the description
    pub name: String,
    /// Optional documentation lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Vec<String>>,
    /// Account roles, in the order the runtime will index them
    pub accounts: Vec<IdlAccountItem>,
    /// Typed arguments, in wire order
    pub args: Vec<IdlField>,
}

/// A single account role or a nested group of roles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlAccountItem {
    /// A single account role
    Account(IdlAccount),
    /// A composite group; resolution of groups is not supported and fails
    /// explicitly rather than silently dropping members
    Group(IdlAccountGroup),
}

/// Declared role of one referenced account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlAccount {
    /// Account name, used as the key in the caller's address mapping
    pub name: String,
    /// Whether the runtime may mutate the account
    pub is_mut: bool,
    /// Whether the account must sign the transaction
    pub is_signer: bool,
    /// Whether the caller may omit the account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_optional: Option<bool>,
    /// Optional documentation lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Vec<String>>,
}

/// Named group of account declarations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlAccountGroup {
    /// Group name
    pub name: String,
    /// Member declarations
    pub accounts: Vec<IdlAccountItem>,
}

/// A named, typed field (instruction argument)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdlField {
    /// Field name
    pub name: String,
    /// Field type
    #[serde(rename = "type")]
    pub ty: IdlType,
}

/// Declared argument types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdlType {
    /// Primitive type: one of [`SUPPORTED_PRIMITIVES`]
    Primitive(String),
    /// Fixed-size array: `{"array": [type, length]}`
    Array {
        /// Element type and element count
        array: (Box<IdlType>, usize),
    },
    /// Variable-length vector: `{"vec": type}`
    Vec {
        /// Element type
        vec: Box<IdlType>,
    },
}

impl IdlType {
    /// Human-readable rendering for error messages
    pub fn display_name(&self) -> String {
        match self {
            IdlType::Primitive(name) => name.clone(),
            IdlType::Array { array: (ty, len) } => {
                format!("array[{}; {}]", ty.display_name(), len)
            }
            IdlType::Vec { vec } => format!("vec[{}]", vec.display_name()),
        }
    }

    fn check_supported(&self) -> Result<()> {
        match self {
            IdlType::Primitive(name) => {
                if SUPPORTED_PRIMITIVES.contains(&name.as_str()) {
                    Ok(())
                } else {
                    Err(Error::UnsupportedType {
                        type_name: name.clone(),
                    })
                }
            }
            IdlType::Array { array: (ty, _) } => ty.check_supported(),
            IdlType::Vec { vec } => vec.check_supported(),
        }
    }
}

impl Idl {
    /// Parse a description from JSON and validate it
    pub fn from_json(json: &str) -> Result<Idl> {
        let idl: Idl = serde_json::from_str(json).map_err(|e| Error::InvalidIdl {
            reason: e.to_string(),
        })?;
        idl.validate()?;
        Ok(idl)
    }

    /// Read and parse a description from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Idl> {
        let json = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::InvalidIdl {
            reason: format!("{}: {}", path.as_ref().display(), e),
        })?;
        Idl::from_json(&json)
    }

    /// Look up an instruction by name
    pub fn instruction(&self, name: &str) -> Option<&IdlInstruction> {
        self.instructions.iter().find(|ix| ix.name == name)
    }

    /// Check the description against the codec's supported type set and
    /// reject duplicate instruction names.
    ///
    /// Runs at construction so a bad declaration fails before any network
    /// interaction, not at dispatch time.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for ix in &self.instructions {
            if !seen.insert(ix.name.as_str()) {
                return Err(Error::DuplicateInstruction {
                    name: ix.name.clone(),
                });
            }
            for arg in &ix.args {
                arg.ty.check_supported()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESCROW_IDL: &str = r#"{
        "version": "0.1.0",
        "name": "escrow",
        "instructions": [
            {
                "name": "IxInit",
                "accounts": [
                    { "name": "user", "isMut": true, "isSigner": true },
                    { "name": "escrowAccount", "isMut": true, "isSigner": false }
                ],
                "args": [
                    { "name": "amount", "type": "u64" },
                    { "name": "seed", "type": "string" }
                ]
            },
            {
                "name": "IxExchange",
                "accounts": [
                    { "name": "taker", "isMut": false, "isSigner": true }
                ],
                "args": []
            }
        ]
    }"#;

    #[test]
    fn test_parse_and_lookup() {
        let idl = Idl::from_json(ESCROW_IDL).unwrap();
        assert_eq!(idl.name, "escrow");
        assert_eq!(idl.instructions.len(), 2);

        let ix = idl.instruction("IxInit").unwrap();
        assert_eq!(ix.args.len(), 2);
        assert_eq!(ix.args[0].ty, IdlType::Primitive("u64".to_string()));
        assert!(idl.instruction("IxMissing").is_none());
    }

    #[test]
    fn test_account_roles() {
        let idl = Idl::from_json(ESCROW_IDL).unwrap();
        let ix = idl.instruction("IxInit").unwrap();
        match &ix.accounts[0] {
            IdlAccountItem::Account(acc) => {
                assert_eq!(acc.name, "user");
                assert!(acc.is_mut);
                assert!(acc.is_signer);
            }
            IdlAccountItem::Group(_) => panic!("expected a single account"),
        }
    }

    #[test]
    fn test_compound_types() {
        let json = r#"{
            "version": "0.1.0",
            "name": "demo",
            "instructions": [{
                "name": "Ix",
                "accounts": [],
                "args": [
                    { "name": "hash", "type": { "array": ["u8", 32] } },
                    { "name": "amounts", "type": { "vec": "u64" } }
                ]
            }]
        }"#;
        let idl = Idl::from_json(json).unwrap();
        let ix = idl.instruction("Ix").unwrap();
        assert_eq!(
            ix.args[0].ty,
            IdlType::Array {
                array: (Box::new(IdlType::Primitive("u8".to_string())), 32)
            }
        );
        assert_eq!(ix.args[0].ty.display_name(), "array[u8; 32]");
        assert_eq!(ix.args[1].ty.display_name(), "vec[u64]");
    }

    #[test]
    fn test_nested_group_parses() {
        let json = r#"{
            "version": "0.1.0",
            "name": "demo",
            "instructions": [{
                "name": "Ix",
                "accounts": [
                    { "name": "pool", "accounts": [
                        { "name": "vaultA", "isMut": true, "isSigner": false }
                    ]}
                ],
                "args": []
            }]
        }"#;
        let idl = Idl::from_json(json).unwrap();
        let ix = idl.instruction("Ix").unwrap();
        assert!(matches!(&ix.accounts[0], IdlAccountItem::Group(g) if g.name == "pool"));
    }

    #[test]
    fn test_unsupported_type_fails_at_construction() {
        let json = r#"{
            "version": "0.1.0",
            "name": "demo",
            "instructions": [{
                "name": "Ix",
                "accounts": [],
                "args": [{ "name": "big", "type": "u128" }]
            }]
        }"#;
        let err = Idl::from_json(json).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType { type_name } if type_name == "u128"));
    }

    #[test]
    fn test_duplicate_instruction_rejected() {
        let json = r#"{
            "version": "0.1.0",
            "name": "demo",
            "instructions": [
                { "name": "Ix", "accounts": [], "args": [] },
                { "name": "Ix", "accounts": [], "args": [] }
            ]
        }"#;
        let err = Idl::from_json(json).unwrap_err();
        assert!(matches!(err, Error::DuplicateInstruction { name } if name == "Ix"));
    }
}
