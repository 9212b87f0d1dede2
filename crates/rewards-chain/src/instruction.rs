//! Instruction encoders for a claim transaction
//!
//! Every attestation is submitted as a pair: a native secp256k1 verification
//! instruction followed by the reward manager's `SubmitAttestation`, which
//! reads the verified signature back out of the instructions sysvar by index.

use borsh::BorshSerialize;
use rewards_types::{EthAddress, ETH_ADDRESS_LENGTH};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::{pubkey, system_program, sysvar};

use crate::error::{ChainError, Result};
use crate::pda;

pub const SECP256K1_PROGRAM_ID: Pubkey = pubkey!("KeccakSecp256k11111111111111111111111111111");
pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

// Reward manager instruction tags
pub const SUBMIT_ATTESTATION_TAG: u8 = 6;
pub const EVALUATE_ATTESTATIONS_TAG: u8 = 7;

/// Size of one serialized secp256k1 offsets record
const SECP_OFFSETS_SIZE: usize = 11;
/// Signature count byte + one offsets record
const SECP_DATA_START: usize = SECP_OFFSETS_SIZE + 1;

/// Native secp256k1 verification of one signature over `message`.
///
/// All three instruction-index fields point at `instruction_index`, which
/// must be this instruction's own position in the transaction.
pub fn secp256k1_verify(
    eth_address: &EthAddress,
    message: &[u8],
    signature: &[u8],
    instruction_index: u8,
) -> Result<Instruction> {
    let eth_offset = SECP_DATA_START;
    let signature_offset = eth_offset + ETH_ADDRESS_LENGTH;
    let message_offset = signature_offset + signature.len();

    let to_u16 = |v: usize| {
        u16::try_from(v).map_err(|_| ChainError::Encoding(format!("secp256k1 offset {} overflows u16", v)))
    };

    let mut data = Vec::with_capacity(message_offset + message.len());
    data.push(1u8);
    data.extend_from_slice(&to_u16(signature_offset)?.to_le_bytes());
    data.push(instruction_index);
    data.extend_from_slice(&to_u16(eth_offset)?.to_le_bytes());
    data.push(instruction_index);
    data.extend_from_slice(&to_u16(message_offset)?.to_le_bytes());
    data.extend_from_slice(&to_u16(message.len())?.to_le_bytes());
    data.push(instruction_index);
    data.extend_from_slice(eth_address.as_bytes());
    data.extend_from_slice(signature);
    data.extend_from_slice(message);

    Ok(Instruction {
        program_id: SECP256K1_PROGRAM_ID,
        accounts: vec![],
        data,
    })
}

#[derive(BorshSerialize)]
struct SubmitAttestationData {
    disbursement_id: String,
}

#[derive(BorshSerialize)]
struct EvaluateAttestationsData {
    amount: u64,
    disbursement_id: String,
    recipient_eth_address: [u8; ETH_ADDRESS_LENGTH],
}

fn tagged<T: BorshSerialize>(tag: u8, args: &T) -> Result<Vec<u8>> {
    let mut data = vec![tag];
    args.serialize(&mut data)
        .map_err(|e| ChainError::Encoding(e.to_string()))?;
    Ok(data)
}

/// Record `sender`'s verified attestation for a disbursement
pub fn submit_attestation(
    program_id: &Pubkey,
    state: &Pubkey,
    payer: &Pubkey,
    sender: &EthAddress,
    disbursement_id: &str,
) -> Result<Instruction> {
    let authority = pda::authority(program_id, state)?;
    let sender_account = pda::sender(program_id, &authority, sender)?;
    let attestations = pda::attestations(program_id, &authority, disbursement_id)?;

    let data = tagged(
        SUBMIT_ATTESTATION_TAG,
        &SubmitAttestationData {
            disbursement_id: disbursement_id.to_string(),
        },
    )?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(attestations, false),
            AccountMeta::new_readonly(*state, false),
            AccountMeta::new_readonly(authority, false),
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(sender_account, false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
            AccountMeta::new_readonly(sysvar::instructions::ID, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data,
    })
}

/// Inputs of the settle step
#[derive(Debug, Clone)]
pub struct EvaluateAttestations<'a> {
    pub program_id: &'a Pubkey,
    pub state: &'a Pubkey,
    /// Reward manager token account (from program state)
    pub token_source: &'a Pubkey,
    /// Recipient's claimable token account
    pub destination: &'a Pubkey,
    pub payer: &'a Pubkey,
    pub disbursement_id: &'a str,
    pub recipient: &'a EthAddress,
    pub oracle: &'a EthAddress,
    /// Amount in token base units
    pub amount: u64,
}

/// Count submitted attestations and, at quorum, transfer the reward
pub fn evaluate_attestations(args: &EvaluateAttestations<'_>) -> Result<Instruction> {
    let authority = pda::authority(args.program_id, args.state)?;
    let attestations = pda::attestations(args.program_id, &authority, args.disbursement_id)?;
    let disbursement = pda::disbursement(args.program_id, &authority, args.disbursement_id)?;
    let oracle_sender = pda::sender(args.program_id, &authority, args.oracle)?;

    let data = tagged(
        EVALUATE_ATTESTATIONS_TAG,
        &EvaluateAttestationsData {
            amount: args.amount,
            disbursement_id: args.disbursement_id.to_string(),
            recipient_eth_address: *args.recipient.as_bytes(),
        },
    )?;

    Ok(Instruction {
        program_id: *args.program_id,
        accounts: vec![
            AccountMeta::new(attestations, false),
            AccountMeta::new_readonly(*args.state, false),
            AccountMeta::new_readonly(authority, false),
            AccountMeta::new(*args.token_source, false),
            AccountMeta::new(*args.destination, false),
            AccountMeta::new(disbursement, false),
            AccountMeta::new_readonly(oracle_sender, false),
            AccountMeta::new(*args.payer, true),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn key(s: &str) -> Pubkey {
        Pubkey::from_str(s).unwrap()
    }

    #[test]
    fn test_secp256k1_layout() {
        let eth = EthAddress::from_hex("0x8fcfa10bd3808570987dbb5b1ef4ab74400fbfda").unwrap();
        let signature = hex::decode("f89b2e6f97f95f1306b468b10b1a18df9569b07d9d7b81b241d6fc99d9ec782e4e449f5c3c63836ed52c9344d3de5c3133fead711e421af545822f09bd78cb3900").unwrap();
        let message = hex::decode("68d5397bb16195ea47091010f3abb8fc6b5cdfa65f00e1f505000000005f623a33383639383d3e3530373431303135335f00b6462e955da5841b6d9e1e2529b830f00f31bf").unwrap();

        let ix = secp256k1_verify(&eth, &message, &signature, 0).unwrap();

        assert_eq!(ix.program_id, SECP256K1_PROGRAM_ID);
        assert!(ix.accounts.is_empty());
        let expected = format!(
            "012000000c000061004500008fcfa10bd3808570987dbb5b1ef4ab74400fbfda{}{}",
            hex::encode(&signature),
            hex::encode(&message)
        );
        assert_eq!(hex::encode(&ix.data), expected);
    }

    #[test]
    fn test_secp256k1_instruction_index() {
        let eth = EthAddress::ZERO;
        let ix = secp256k1_verify(&eth, b"msg", &[0u8; 65], 6).unwrap();
        assert_eq!(ix.data[3], 6);
        assert_eq!(ix.data[6], 6);
        assert_eq!(ix.data[11], 6);
    }

    #[test]
    fn test_submit_attestation() {
        let program = key("CDpzvz7DfgbF95jSSCHLX3ERkugyfgn9Fw8ypNZ1hfXp");
        let state = key("GaiG9LDYHfZGqeNaoGRzFEnLiwUT7WiC6sA6FDJX9ZPq");
        let payer = key("LTZEyCYzn5pRLtTg6PCZkVCo8msj5sXTYP65TGWqgaP");
        let sender = EthAddress::from_hex("0x00b6462e955dA5841b6D9e1E2529B830F00f31Bf").unwrap();

        let ix = submit_attestation(&program, &state, &payer, &sender, "c:323ea4a0:202525").unwrap();

        assert_eq!(ix.program_id, program);
        assert_eq!(ix.accounts.len(), 8);
        assert_eq!(ix.accounts[0].pubkey.to_string(), "DAnkCx6M9Q2bPaMGkFwozrps6m9xggRWQMe5qCcpo7CS");
        assert!(ix.accounts[0].is_writable && !ix.accounts[0].is_signer);
        assert_eq!(ix.accounts[1].pubkey, state);
        assert_eq!(ix.accounts[2].pubkey.to_string(), "6mpecd6bJCpH8oDwwjqPzTPU6QacnwW3cR9pAwEwkYJa");
        assert!(ix.accounts[3].is_signer && ix.accounts[3].is_writable);
        assert_eq!(ix.accounts[4].pubkey.to_string(), "FNz5mur7EFh1LyH5HDaKyWVx7vcfGK6gRizEpDqMfgGk");
        assert!(!ix.accounts[4].is_writable);
        assert_eq!(hex::encode(&ix.data), "0611000000633a33323365613461303a323032353235");
    }

    #[test]
    fn test_evaluate_attestations() {
        let program = key("CDpzvz7DfgbF95jSSCHLX3ERkugyfgn9Fw8ypNZ1hfXp");
        let state = key("GaiG9LDYHfZGqeNaoGRzFEnLiwUT7WiC6sA6FDJX9ZPq");
        let token_source = key("HJQj8P47BdA7ugjQEn45LaESYrxhiZDygmukt8iumFZJ");
        let destination = key("Cjv8dvVfWU8wUYAR82T5oZ4nHLB6EyGNvpPBzw3r76Qy");
        let payer = key("E3CfijtAJwBSHfwFEViAUd3xp7c8TBxwC1eXn1Fgxp8h");
        let recipient = EthAddress::from_hex("0x3f6d9fcf0d4466dd5886e3b1def017adfb7916b4").unwrap();
        let oracle = EthAddress::from_hex("0x00b6462e955dA5841b6D9e1E2529B830F00f31Bf").unwrap();

        let ix = evaluate_attestations(&EvaluateAttestations {
            program_id: &program,
            state: &state,
            token_source: &token_source,
            destination: &destination,
            payer: &payer,
            disbursement_id: "ft:37364e80",
            recipient: &recipient,
            oracle: &oracle,
            amount: 200_000_000,
        })
        .unwrap();

        assert_eq!(ix.accounts.len(), 11);
        assert_eq!(ix.accounts[1].pubkey, state);
        assert_eq!(ix.accounts[2].pubkey.to_string(), "6mpecd6bJCpH8oDwwjqPzTPU6QacnwW3cR9pAwEwkYJa");
        assert_eq!(ix.accounts[3].pubkey, token_source);
        assert_eq!(ix.accounts[4].pubkey, destination);
        assert_eq!(ix.accounts[5].pubkey.to_string(), "3qQfuDEBWEmxRo5G4J2a4eYUVf9u1LWzLgRPndiwew2w");
        assert_eq!(ix.accounts[6].pubkey.to_string(), "FNz5mur7EFh1LyH5HDaKyWVx7vcfGK6gRizEpDqMfgGk");
        assert_eq!(ix.accounts[7].pubkey, payer);
        assert!(ix.accounts[7].is_signer);
        assert_eq!(ix.accounts[9].pubkey, TOKEN_PROGRAM_ID);
        assert_eq!(
            hex::encode(&ix.data),
            "0700c2eb0b000000000b00000066743a33373336346538303f6d9fcf0d4466dd5886e3b1def017adfb7916b4"
        );
    }
}
