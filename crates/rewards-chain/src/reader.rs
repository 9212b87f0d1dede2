//! Read-only chain access

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::error::{ChainError, Result};

/// The chain reads a claim needs
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Account data, or `None` when the account does not exist
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>>;

    /// Recent blockhash at finalized commitment
    async fn get_latest_blockhash(&self) -> Result<Hash>;

    async fn get_slot(&self) -> Result<u64>;
}

/// [`ChainReader`] over a Solana JSON-RPC node
pub struct RpcChainReader {
    client: RpcClient,
}

impl RpcChainReader {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url.into(), CommitmentConfig::finalized()),
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get_account_with_commitment(address, CommitmentConfig::finalized())
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        debug!(account = %address, found = response.value.is_some(), "Fetched account");
        Ok(response.value.map(|account| account.data))
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        let (blockhash, _last_valid_height) = self
            .client
            .get_latest_blockhash_with_commitment(CommitmentConfig::finalized())
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;
        Ok(blockhash)
    }

    async fn get_slot(&self) -> Result<u64> {
        self.client
            .get_slot()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }
}
