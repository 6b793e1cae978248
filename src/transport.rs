//! Ledger transport boundary
//!
//! Everything network-shaped sits behind [`Transport`]: submitting signed
//! instruction lists, fetching account data, and querying rent minimums.
//! The protocol layer never retries — a failed submission surfaces with the
//! failing step's name and the caller decides what to do with it. Tests
//! substitute an in-memory implementation.

use crate::error::{Error, Result};
use solana_commitment_config::CommitmentConfig;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use tracing::debug;

/// Synchronous request/response access to the ledger
pub trait Transport {
    /// The fee-paying, transaction-signing identity
    fn payer(&self) -> Pubkey;

    /// Sign and submit one transaction built from `instructions`.
    ///
    /// `context` names the step being performed; it is carried into any
    /// transport error so a failed upload reports which chunk died.
    fn send(&self, instructions: &[Instruction], context: &str) -> Result<Signature>;

    /// Fetch an account's raw data, or `None` if it does not exist
    fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;

    /// Minimum lamport balance for rent exemption at the given size
    fn minimum_balance(&self, space: usize) -> Result<u64>;
}

/// [`Transport`] over a JSON-RPC node
pub struct RpcTransport {
    client: solana_client::rpc_client::RpcClient,
    payer: Keypair,
}

impl RpcTransport {
    /// Connect to the node at `url`, signing with `payer`
    pub fn new(url: impl ToString, payer: Keypair) -> Self {
        let client = solana_client::rpc_client::RpcClient::new_with_commitment(
            url.to_string(),
            CommitmentConfig::confirmed(),
        );
        RpcTransport { client, payer }
    }
}

impl Transport for RpcTransport {
    fn payer(&self) -> Pubkey {
        self.payer.pubkey()
    }

    fn send(&self, instructions: &[Instruction], context: &str) -> Result<Signature> {
        let blockhash = self
            .client
            .get_latest_blockhash()
            .map_err(|e| Error::transport(context, e))?;
        let transaction = Transaction::new_signed_with_payer(
            instructions,
            Some(&self.payer.pubkey()),
            &[&self.payer],
            blockhash,
        );
        let signature = self
            .client
            .send_and_confirm_transaction(&transaction)
            .map_err(|e| Error::transport(context, e))?;
        debug!(%signature, context, "transaction confirmed");
        Ok(signature)
    }

    fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get_account_with_commitment(address, CommitmentConfig::processed())
            .map_err(|e| Error::transport("fetch account", e))?;
        Ok(response.value.map(|account| account.data))
    }

    fn minimum_balance(&self, space: usize) -> Result<u64> {
        self.client
            .get_minimum_balance_for_rent_exemption(space)
            .map_err(|e| Error::transport("rent query", e))
    }
}
