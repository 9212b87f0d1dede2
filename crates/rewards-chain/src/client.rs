//! Reward manager client with process-lifetime memoization
//!
//! The program state and the address lookup table never change for a
//! deployment, so each is fetched at most once. Concurrent first callers
//! await the same in-flight fetch.

use rewards_types::RewardClaim;
use solana_sdk::address_lookup_table::state::AddressLookupTable;
use solana_sdk::message::AddressLookupTableAccount;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::accounts::{AttestationsAccountData, RewardManagerState};
use crate::error::{ChainError, Result};
use crate::pda;
use crate::reader::ChainReader;

/// Reward manager deployment addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardManagerAccounts {
    pub program_id: Pubkey,
    pub state: Pubkey,
    pub lookup_table: Pubkey,
}

pub struct RewardManagerClient {
    reader: Arc<dyn ChainReader>,
    accounts: RewardManagerAccounts,
    authority: Pubkey,
    state: OnceCell<RewardManagerState>,
    lookup_table: OnceCell<AddressLookupTableAccount>,
}

impl RewardManagerClient {
    pub fn new(reader: Arc<dyn ChainReader>, accounts: RewardManagerAccounts) -> Result<Self> {
        let authority = pda::authority(&accounts.program_id, &accounts.state)?;
        Ok(Self {
            reader,
            accounts,
            authority,
            state: OnceCell::new(),
            lookup_table: OnceCell::new(),
        })
    }

    pub fn reader(&self) -> &Arc<dyn ChainReader> {
        &self.reader
    }

    pub fn accounts(&self) -> &RewardManagerAccounts {
        &self.accounts
    }

    pub fn authority(&self) -> &Pubkey {
        &self.authority
    }

    async fn fetch(&self, address: &Pubkey, what: &str) -> Result<Vec<u8>> {
        self.reader
            .get_account_data(address)
            .await?
            .ok_or_else(|| ChainError::AccountNotFound(format!("{} {}", what, address)))
    }

    /// Program state, fetched once
    pub async fn state(&self) -> Result<&RewardManagerState> {
        self.state
            .get_or_try_init(|| async {
                let data = self.fetch(&self.accounts.state, "reward manager state").await?;
                let state = RewardManagerState::decode(&data)?;
                info!(
                    state = %self.accounts.state,
                    min_votes = state.min_votes,
                    token_account = %state.token_account,
                    "Loaded reward manager state"
                );
                Ok(state)
            })
            .await
    }

    /// Address lookup table, fetched once
    pub async fn lookup_table(&self) -> Result<&AddressLookupTableAccount> {
        self.lookup_table
            .get_or_try_init(|| async {
                let key = self.accounts.lookup_table;
                let data = self.fetch(&key, "lookup table").await?;
                let table = AddressLookupTable::deserialize(&data).map_err(|e| {
                    ChainError::InvalidAccountData {
                        account: format!("lookup table {}", key),
                        reason: e.to_string(),
                    }
                })?;
                let addresses = table.addresses.to_vec();
                info!(lookup_table = %key, addresses = addresses.len(), "Loaded lookup table");
                Ok(AddressLookupTableAccount { key, addresses })
            })
            .await
    }

    /// Attestations already submitted for `claim`; never cached.
    ///
    /// A missing account means nothing has been submitted yet.
    pub async fn submitted_attestations(&self, claim: &RewardClaim) -> Result<AttestationsAccountData> {
        let disbursement_id = claim.disbursement_id();
        let address = pda::attestations(&self.accounts.program_id, &self.authority, &disbursement_id)?;
        match self.reader.get_account_data(&address).await? {
            Some(data) => AttestationsAccountData::decode(&data),
            None => {
                debug!(disbursement_id = %disbursement_id, "No attestations submitted yet");
                Ok(AttestationsAccountData::default())
            }
        }
    }
}
