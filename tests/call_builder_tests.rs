//! Call-builder tests against a swap-style interface description
//!
//! Everything here is pure: descriptions in, dispatch requests out, no
//! transport anywhere.

use solana_sdk::pubkey::Pubkey;
use solstage::address;
use solstage::codec::Value;
use solstage::idl::Idl;
use solstage::loader::{discriminator, LoaderInstruction};
use solstage::program::{AccountMap, Program};
use solstage::Error;

const SWAP_IDL: &str = r#"{
    "version": "0.1.0",
    "name": "swap",
    "instructions": [
        {
            "name": "IxCreatePool",
            "accounts": [
                { "name": "creator", "isMut": true, "isSigner": true },
                { "name": "pool", "isMut": true, "isSigner": false },
                { "name": "vaultA", "isMut": true, "isSigner": false },
                { "name": "vaultB", "isMut": true, "isSigner": false }
            ],
            "args": [
                { "name": "poolName", "type": "string" },
                { "name": "fee", "type": "u32" }
            ]
        },
        {
            "name": "IxDeposit",
            "accounts": [
                { "name": "depositor", "isMut": false, "isSigner": true },
                { "name": "pool", "isMut": true, "isSigner": false },
                { "name": "referrer", "isMut": false, "isSigner": false, "isOptional": true }
            ],
            "args": [
                { "name": "amountA", "type": "u64" },
                { "name": "amountB", "type": "u64" }
            ]
        }
    ]
}"#;

fn swap_program() -> Program {
    let idl = Idl::from_json(SWAP_IDL).unwrap();
    Program::new(idl, Pubkey::new_unique(), Pubkey::new_unique()).unwrap()
}

fn deposit_accounts() -> AccountMap {
    AccountMap::from([
        ("depositor".to_string(), Pubkey::new_unique()),
        ("pool".to_string(), Pubkey::new_unique()),
    ])
}

#[test]
fn test_bytecode_address_follows_seed_rule() {
    let idl = Idl::from_json(SWAP_IDL).unwrap();
    let authority = Pubkey::new_unique();
    let loader_id = Pubkey::new_unique();
    let program = Program::new(idl, authority, loader_id).unwrap();

    let expected = Pubkey::create_with_seed(&authority, "swap", &loader_id).unwrap();
    assert_eq!(program.bytecode(), &expected);
}

#[test]
fn test_call_encodes_args_in_declaration_order() {
    let program = swap_program();
    let creator = Pubkey::new_unique();
    let accounts = AccountMap::from([
        ("creator".to_string(), creator),
        ("pool".to_string(), Pubkey::new_unique()),
        ("vaultA".to_string(), Pubkey::new_unique()),
        ("vaultB".to_string(), Pubkey::new_unique()),
    ]);

    let call = program
        .call(
            "IxCreatePool",
            &[Value::from("ab"), Value::U32(30)],
            &accounts,
        )
        .unwrap();

    // string "ab" (4 + 2 bytes) then u32 fee, nothing else
    assert_eq!(call.args(), &[2, 0, 0, 0, b'a', b'b', 30, 0, 0, 0]);
    assert_eq!(call.instruction_name(), "IxCreatePool");
}

#[test]
fn test_remaining_accounts_keep_declared_order_and_flags() {
    let program = swap_program();
    let creator = Pubkey::new_unique();
    let pool = Pubkey::new_unique();
    let vault_a = Pubkey::new_unique();
    let vault_b = Pubkey::new_unique();
    // insertion order deliberately scrambled
    let accounts = AccountMap::from([
        ("vaultB".to_string(), vault_b),
        ("creator".to_string(), creator),
        ("vaultA".to_string(), vault_a),
        ("pool".to_string(), pool),
    ]);

    let call = program
        .call(
            "IxCreatePool",
            &[Value::from("p"), Value::U32(0)],
            &accounts,
        )
        .unwrap();

    let remaining = call.remaining_accounts();
    assert_eq!(
        remaining.iter().map(|m| m.pubkey).collect::<Vec<_>>(),
        vec![creator, pool, vault_a, vault_b]
    );
    assert!(remaining[0].is_signer && remaining[0].is_writable);
    assert!(!remaining[1].is_signer && remaining[1].is_writable);
}

#[test]
fn test_optional_account_can_be_omitted() {
    let program = swap_program();
    let call = program
        .call(
            "IxDeposit",
            &[Value::U64(5), Value::U64(10)],
            &deposit_accounts(),
        )
        .unwrap();
    assert_eq!(call.remaining_accounts().len(), 2);
}

#[test]
fn test_unknown_instruction_fails_at_build_time() {
    let program = swap_program();
    let err = program
        .call("IxWithdraw", &[], &AccountMap::new())
        .unwrap_err();
    assert!(matches!(err, Error::UnknownInstruction { name } if name == "IxWithdraw"));
}

#[test]
fn test_missing_and_undeclared_accounts_fail_at_build_time() {
    let program = swap_program();

    let mut accounts = deposit_accounts();
    accounts.remove("pool");
    let err = program
        .call("IxDeposit", &[Value::U64(1), Value::U64(1)], &accounts)
        .unwrap_err();
    assert!(matches!(err, Error::MissingAccount { name, .. } if name == "pool"));

    let mut accounts = deposit_accounts();
    accounts.insert("poool".to_string(), Pubkey::new_unique());
    let err = program
        .call("IxDeposit", &[Value::U64(1), Value::U64(1)], &accounts)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownAccount { name, .. } if name == "poool"));
}

#[test]
fn test_bad_argument_values_fail_at_build_time() {
    let program = swap_program();

    let err = program
        .call("IxDeposit", &[Value::U64(1)], &deposit_accounts())
        .unwrap_err();
    assert!(matches!(
        err,
        Error::ArgumentCount {
            expected: 2,
            got: 1,
            ..
        }
    ));

    let err = program
        .call(
            "IxDeposit",
            &[Value::U64(1), Value::from("ten")],
            &deposit_accounts(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
}

#[test]
fn test_lowered_instruction_targets_the_loader() {
    let idl = Idl::from_json(SWAP_IDL).unwrap();
    let loader_id = Pubkey::new_unique();
    let program = Program::new(idl, Pubkey::new_unique(), loader_id).unwrap();

    let pool = Pubkey::new_unique();
    let accounts = AccountMap::from([
        ("depositor".to_string(), Pubkey::new_unique()),
        ("pool".to_string(), pool),
    ]);
    let call = program
        .call("IxDeposit", &[Value::U64(7), Value::U64(8)], &accounts)
        .unwrap();

    let ix = call.instruction();
    assert_eq!(ix.program_id, loader_id);

    // bytecode account leads read-only; remaining accounts follow in order
    assert_eq!(ix.accounts[0].pubkey, *program.bytecode());
    assert!(!ix.accounts[0].is_writable && !ix.accounts[0].is_signer);
    assert_eq!(ix.accounts.len(), 3);
    assert_eq!(ix.accounts[2].pubkey, pool);

    // the wire data is the execute operation with name and args intact
    assert_eq!(&ix.data[..8], &discriminator("execute"));
    match LoaderInstruction::parse(&ix.data).unwrap() {
        LoaderInstruction::Execute { id, args } => {
            assert_eq!(id, "IxDeposit");
            assert_eq!(args.len(), 16);
            assert_eq!(u64::from_le_bytes(args[..8].try_into().unwrap()), 7);
        }
        other => panic!("expected execute, got {other:?}"),
    }
}

#[test]
fn test_companion_addresses_are_scoped_to_the_program() {
    let idl = Idl::from_json(SWAP_IDL).unwrap();
    let loader_id = Pubkey::new_unique();
    let program = Program::new(idl.clone(), Pubkey::new_unique(), loader_id).unwrap();

    let (pool, bump) = program.derive_address("pool");
    assert_eq!(
        address::derive(program.bytecode(), "pool", &loader_id),
        (pool, bump)
    );

    // a different authority stages a different namespace
    let other = Program::new(idl, Pubkey::new_unique(), loader_id).unwrap();
    assert_ne!(other.derive_address("pool").0, pool);
}
