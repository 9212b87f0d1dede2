//! Program derived addresses used by a claim
//!
//! ```text
//! authority     = PDA([state])
//! sender        = PDA([authority, "S_" ++ eth(20)])
//! attestations  = PDA([authority, "V_" ++ disbursement_id])
//! disbursement  = PDA([authority, "T_" ++ disbursement_id])
//! user bank     = create_with_seed(PDA_claimable([mint]), base58(eth), token program)
//! ```

use rewards_types::EthAddress;
use solana_sdk::pubkey::Pubkey;

use crate::error::{ChainError, Result};
use crate::instruction::TOKEN_PROGRAM_ID;

pub const SENDER_SEED_PREFIX: &[u8] = b"S_";
pub const ATTESTATIONS_SEED_PREFIX: &[u8] = b"V_";
pub const DISBURSEMENT_SEED_PREFIX: &[u8] = b"T_";

fn find(seeds: &[&[u8]], program_id: &Pubkey, what: &str) -> Result<Pubkey> {
    Pubkey::try_find_program_address(seeds, program_id)
        .map(|(address, _bump)| address)
        .ok_or_else(|| ChainError::Derivation(what.to_string()))
}

fn prefixed(prefix: &[u8], body: &[u8]) -> Vec<u8> {
    let mut seed = Vec::with_capacity(prefix.len() + body.len());
    seed.extend_from_slice(prefix);
    seed.extend_from_slice(body);
    seed
}

/// Reward manager authority for a program state account
pub fn authority(program_id: &Pubkey, state: &Pubkey) -> Result<Pubkey> {
    find(&[state.as_ref()], program_id, "authority")
}

/// Registered sender account of an attester
pub fn sender(program_id: &Pubkey, authority: &Pubkey, eth_address: &EthAddress) -> Result<Pubkey> {
    let seed = prefixed(SENDER_SEED_PREFIX, eth_address.as_bytes());
    find(&[authority.as_ref(), &seed], program_id, "sender")
}

/// Account accumulating attestations for one disbursement
pub fn attestations(program_id: &Pubkey, authority: &Pubkey, disbursement_id: &str) -> Result<Pubkey> {
    let seed = prefixed(ATTESTATIONS_SEED_PREFIX, disbursement_id.as_bytes());
    find(&[authority.as_ref(), &seed], program_id, "attestations")
}

/// Marker account created once a disbursement is paid out
pub fn disbursement(program_id: &Pubkey, authority: &Pubkey, disbursement_id: &str) -> Result<Pubkey> {
    let seed = prefixed(DISBURSEMENT_SEED_PREFIX, disbursement_id.as_bytes());
    find(&[authority.as_ref(), &seed], program_id, "disbursement")
}

/// Claimable token account ("user bank") owned by an eth wallet
pub fn user_bank(claimable_tokens_program: &Pubkey, mint: &Pubkey, eth_address: &EthAddress) -> Result<Pubkey> {
    let bank_authority = find(&[mint.as_ref()], claimable_tokens_program, "user bank authority")?;
    let seed = bs58::encode(eth_address.as_bytes()).into_string();
    Pubkey::create_with_seed(&bank_authority, &seed, &TOKEN_PROGRAM_ID)
        .map_err(|e| ChainError::Derivation(format!("user bank ({})", e)))
}
