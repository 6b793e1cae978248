//! Account resolution for staged-program calls
//!
//! The runtime indexes a call's accounts positionally, in the order the
//! interface description declares them — never by name. Resolution walks
//! the declaration, looks each name up in the caller's address mapping, and
//! emits the references in declared order with the declared mutability and
//! signer flags.

use crate::error::{Error, Result};
use crate::idl::{IdlAccountItem, IdlInstruction};
use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;
use std::collections::{HashMap, HashSet};

/// Caller-supplied binding of declared account names to addresses
pub type AccountMap = HashMap<String, Pubkey>;

/// Resolve an instruction's declared accounts against the caller's mapping.
///
/// Fails on a missing non-optional account, on a supplied name the
/// instruction does not declare (a typo would otherwise be silently
/// ignored), and on nested account groups, which this protocol does not
/// flatten.
pub fn resolve(instruction: &IdlInstruction, accounts: &AccountMap) -> Result<Vec<AccountMeta>> {
    let mut resolved = Vec::with_capacity(instruction.accounts.len());
    let mut declared = HashSet::new();

    for item in &instruction.accounts {
        let decl = match item {
            IdlAccountItem::Account(decl) => decl,
            IdlAccountItem::Group(group) => {
                return Err(Error::AccountGroup {
                    name: group.name.clone(),
                })
            }
        };
        declared.insert(decl.name.as_str());

        match accounts.get(&decl.name) {
            Some(address) => {
                resolved.push(AccountMeta {
                    pubkey: *address,
                    is_signer: decl.is_signer,
                    is_writable: decl.is_mut,
                });
            }
            None if decl.is_optional.unwrap_or(false) => {}
            None => {
                return Err(Error::MissingAccount {
                    instruction: instruction.name.clone(),
                    name: decl.name.clone(),
                })
            }
        }
    }

    let mut unknown: Vec<&String> = accounts
        .keys()
        .filter(|name| !declared.contains(name.as_str()))
        .collect();
    if !unknown.is_empty() {
        unknown.sort();
        return Err(Error::UnknownAccount {
            instruction: instruction.name.clone(),
            name: unknown[0].clone(),
        });
    }

    Ok(resolved)
}
