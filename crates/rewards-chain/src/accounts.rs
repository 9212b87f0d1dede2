//! Reward manager account decoding

use borsh::BorshDeserialize;
use solana_sdk::pubkey::Pubkey;

use crate::error::{ChainError, Result};

/// Size of one stored attestation message
pub const ATTESTATION_MESSAGE_SIZE: usize = 168;

const ETH_LEN: usize = 20;
const MAX_DISBURSEMENT_ID_LEN: usize = 32;
const CLAIM_PADDING: usize = 45;

/// Global reward manager configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardManagerState {
    pub version: u8,
    pub token_account: Pubkey,
    pub manager: Pubkey,
    /// Distinct validator operators required before a claim settles
    pub min_votes: u8,
}

#[derive(BorshDeserialize)]
struct RawRewardManagerState {
    version: u8,
    token_account: [u8; 32],
    manager: [u8; 32],
    min_votes: u8,
}

impl RewardManagerState {
    pub fn decode(data: &[u8]) -> Result<Self> {
        let raw = RawRewardManagerState::deserialize(&mut &data[..]).map_err(|e| {
            ChainError::InvalidAccountData {
                account: "reward manager state".to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            version: raw.version,
            token_account: Pubkey::new_from_array(raw.token_account),
            manager: Pubkey::new_from_array(raw.manager),
            min_votes: raw.min_votes,
        })
    }
}

/// One attestation already recorded on chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationMessage {
    pub sender_eth_address: String,
    pub recipient_eth_address: String,
    /// Amount in token base units
    pub amount: u64,
    pub reward_id: String,
    pub specifier: String,
    /// Empty when the message came from the anti-abuse oracle
    pub anti_abuse_oracle_eth_address: String,
    pub operator_eth_address: String,
}

impl AttestationMessage {
    pub fn is_from_oracle(&self) -> bool {
        self.anti_abuse_oracle_eth_address.is_empty()
    }
}

/// Attestations submitted so far for one disbursement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttestationsAccountData {
    pub version: u8,
    pub reward_manager_state: Pubkey,
    pub count: u8,
    pub messages: Vec<AttestationMessage>,
}

impl AttestationsAccountData {
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let version = reader.read_u8()?;
        let reward_manager_state = Pubkey::new_from_array(reader.read_array::<32>()?);
        let count = reader.read_u8()?;

        let mut messages = Vec::with_capacity(count as usize);
        for _ in 0..count {
            messages.push(decode_message(&mut reader)?);
        }

        Ok(Self {
            version,
            reward_manager_state,
            count,
            messages,
        })
    }

    pub fn has_oracle_attestation(&self) -> bool {
        self.messages.iter().any(AttestationMessage::is_from_oracle)
    }

    /// Operators of validators that already attested
    pub fn validator_operators(&self) -> Vec<String> {
        self.messages
            .iter()
            .filter(|m| !m.is_from_oracle())
            .map(|m| m.operator_eth_address.clone())
            .collect()
    }
}

fn decode_message(reader: &mut ByteReader<'_>) -> Result<AttestationMessage> {
    let sender_eth_address = eth_hex(reader.read_bytes(ETH_LEN)?);
    let recipient_eth_address = eth_hex(reader.read_bytes(ETH_LEN)?);
    reader.skip(1)?;
    let amount = u64::from_le_bytes(reader.read_array::<8>()?);
    reader.skip(1)?;

    // Disbursement id runs until '_' (oracle follows) or a zero byte
    let mut id_bytes = Vec::new();
    loop {
        let b = reader.read_u8()?;
        if b == 0 || b == b'_' {
            break;
        }
        id_bytes.push(b);
    }
    let bytes_left = MAX_DISBURSEMENT_ID_LEN
        .checked_sub(id_bytes.len())
        .ok_or_else(|| invalid("disbursement id too long"))?;

    let disbursement_id = String::from_utf8(id_bytes).map_err(|_| invalid("disbursement id is not utf-8"))?;
    let (reward_id, specifier) = disbursement_id
        .split_once(':')
        .ok_or_else(|| invalid("invalid disbursement ID"))?;

    let oracle = reader.read_bytes(ETH_LEN)?;
    let anti_abuse_oracle_eth_address = if oracle.iter().all(|b| *b == 0) {
        String::new()
    } else {
        eth_hex(oracle)
    };

    reader.skip(bytes_left)?;
    reader.skip(CLAIM_PADDING)?;
    let operator_eth_address = eth_hex(reader.read_bytes(ETH_LEN)?);

    Ok(AttestationMessage {
        sender_eth_address,
        recipient_eth_address,
        amount,
        reward_id: reward_id.to_string(),
        specifier: specifier.to_string(),
        anti_abuse_oracle_eth_address,
        operator_eth_address,
    })
}

fn eth_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

fn invalid(reason: &str) -> ChainError {
    ChainError::InvalidAccountData {
        account: "attestations".to_string(),
        reason: reason.to_string(),
    }
}

struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|end| *end <= self.data.len());
        match end {
            Some(end) => {
                let bytes = &self.data[self.pos..end];
                self.pos = end;
                Ok(bytes)
            }
            None => Err(invalid("unexpected end of data")),
        }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.read_bytes(N)?);
        Ok(arr)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }
}
