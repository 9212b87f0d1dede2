//! In-memory chain for tests (`mock` feature)
//!
//! Holds raw account data keyed by address and a fixed blockhash. The
//! encoders below produce account data in the layouts the decoders expect.

use async_trait::async_trait;
use parking_lot::RwLock;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::accounts::{AttestationMessage, RewardManagerState, ATTESTATION_MESSAGE_SIZE};
use crate::error::{ChainError, Result};
use crate::reader::ChainReader;

/// Size of the serialized lookup table metadata header
const LOOKUP_TABLE_META_SIZE: usize = 56;

pub struct MockChainReader {
    accounts: RwLock<HashMap<Pubkey, Vec<u8>>>,
    blockhash: Hash,
    slot: u64,
    fail_blockhash: AtomicBool,
    account_reads: AtomicUsize,
}

impl MockChainReader {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            blockhash: Hash::new_unique(),
            slot: 1,
            fail_blockhash: AtomicBool::new(false),
            account_reads: AtomicUsize::new(0),
        }
    }

    pub fn with_slot(mut self, slot: u64) -> Self {
        self.slot = slot;
        self
    }

    pub fn set_account(&self, address: Pubkey, data: Vec<u8>) {
        self.accounts.write().insert(address, data);
    }

    pub fn blockhash(&self) -> Hash {
        self.blockhash
    }

    /// Make blockhash fetches fail
    pub fn fail_blockhash(&self, fail: bool) {
        self.fail_blockhash.store(fail, Ordering::SeqCst);
    }

    /// Number of account reads served so far
    pub fn account_reads(&self) -> usize {
        self.account_reads.load(Ordering::SeqCst)
    }
}

impl Default for MockChainReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>> {
        self.account_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.accounts.read().get(address).cloned())
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        if self.fail_blockhash.load(Ordering::SeqCst) {
            return Err(ChainError::Rpc("blockhash unavailable".to_string()));
        }
        Ok(self.blockhash)
    }

    async fn get_slot(&self) -> Result<u64> {
        Ok(self.slot)
    }
}

pub fn encode_reward_manager_state(state: &RewardManagerState) -> Vec<u8> {
    let mut data = Vec::with_capacity(66);
    data.push(state.version);
    data.extend_from_slice(state.token_account.as_ref());
    data.extend_from_slice(state.manager.as_ref());
    data.push(state.min_votes);
    data
}

/// Lookup table account: active metadata header followed by addresses
pub fn encode_lookup_table(addresses: &[Pubkey]) -> Vec<u8> {
    let mut data = Vec::with_capacity(LOOKUP_TABLE_META_SIZE + addresses.len() * 32);
    data.extend_from_slice(&1u32.to_le_bytes()); // ProgramState::LookupTable
    data.extend_from_slice(&u64::MAX.to_le_bytes()); // deactivation slot
    data.extend_from_slice(&0u64.to_le_bytes()); // last extended slot
    data.push(0); // last extended start index
    data.push(0); // no authority
    data.resize(LOOKUP_TABLE_META_SIZE, 0);
    for address in addresses {
        data.extend_from_slice(address.as_ref());
    }
    data
}

/// Attestations account holding `messages`
pub fn encode_attestations_account(state: &Pubkey, messages: &[AttestationMessage]) -> Vec<u8> {
    let mut data = vec![1u8];
    data.extend_from_slice(state.as_ref());
    data.push(messages.len() as u8);
    for message in messages {
        data.extend_from_slice(&encode_message(message));
    }
    data
}

fn eth_bytes(address: &str) -> Vec<u8> {
    if address.is_empty() {
        return vec![0u8; 20];
    }
    rewards_types::EthAddress::from_hex(address)
        .map(|a| a.as_bytes().to_vec())
        .unwrap_or_else(|_| vec![0u8; 20])
}

fn encode_message(message: &AttestationMessage) -> Vec<u8> {
    let id = format!("{}:{}", message.reward_id, message.specifier);
    let mut data = Vec::with_capacity(ATTESTATION_MESSAGE_SIZE);
    data.extend_from_slice(&eth_bytes(&message.sender_eth_address));
    data.extend_from_slice(&eth_bytes(&message.recipient_eth_address));
    data.push(b'_');
    data.extend_from_slice(&message.amount.to_le_bytes());
    data.push(b'_');
    data.extend_from_slice(id.as_bytes());
    data.push(if message.is_from_oracle() { 0 } else { b'_' });
    data.extend_from_slice(&eth_bytes(&message.anti_abuse_oracle_eth_address));
    data.resize(ATTESTATION_MESSAGE_SIZE - 20, 0);
    data.extend_from_slice(&eth_bytes(&message.operator_eth_address));
    data
}
