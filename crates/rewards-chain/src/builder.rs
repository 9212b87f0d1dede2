//! Claim transaction assembly
//!
//! Instruction order is part of the wire contract with the reward manager:
//!
//! ```text
//! [secp(oracle, idx 0), submit(oracle)]?          (only if the oracle is not on chain yet)
//! [secp(validator_i, idx = own position), submit(validator_i)]*
//! evaluate
//! ```
//!
//! Each submit reads the signature verified by the instruction right before it,
//! so every secp instruction declares its own position as its index.

use rewards_types::{decode_signature, EthAddress, RewardClaim, SenderAttestation, SharedRng};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::{v0, VersionedMessage};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::VersionedTransaction;
use std::sync::Arc;
use tracing::debug;

use crate::client::RewardManagerClient;
use crate::error::{BuildError, ChainError};
use crate::fee_payer::FeePayerPool;
use crate::instruction::{self, EvaluateAttestations};
use crate::pda;

/// Claimable tokens deployment the rewards are paid into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimableTokensAccounts {
    pub program_id: Pubkey,
    pub mint: Pubkey,
}

/// A fully assembled claim transaction awaiting its fee payer's signature
#[derive(Debug)]
pub struct UnsignedClaimTransaction {
    pub fee_payer: Arc<Keypair>,
    pub instructions: Vec<Instruction>,
    pub recent_blockhash: Hash,
    pub message: v0::Message,
}

impl UnsignedClaimTransaction {
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Sign with the selected fee payer
    pub fn sign(&self) -> Result<VersionedTransaction, BuildError> {
        VersionedTransaction::try_new(
            VersionedMessage::V0(self.message.clone()),
            &[self.fee_payer.as_ref()],
        )
        .map_err(|e| BuildError::Sign(e.to_string()))
    }
}

/// Base64 of the bincode wire form, as accepted by the relay
pub fn encode_transaction(tx: &VersionedTransaction) -> Result<String, ChainError> {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    let bytes = bincode::serialize(tx).map_err(|e| ChainError::Encoding(e.to_string()))?;
    Ok(STANDARD.encode(bytes))
}

pub struct TransactionBuilder {
    reward_manager: Arc<RewardManagerClient>,
    claimable_tokens: ClaimableTokensAccounts,
    fee_payers: Arc<FeePayerPool>,
    rng: SharedRng,
}

impl TransactionBuilder {
    pub fn new(
        reward_manager: Arc<RewardManagerClient>,
        claimable_tokens: ClaimableTokensAccounts,
        fee_payers: Arc<FeePayerPool>,
        rng: SharedRng,
    ) -> Self {
        Self {
            reward_manager,
            claimable_tokens,
            fee_payers,
            rng,
        }
    }

    /// Assemble the claim transaction.
    ///
    /// Produces `2 * (validators + oracle?) + 1` instructions.
    pub async fn build(
        &self,
        claim: &RewardClaim,
        oracle: Option<&SenderAttestation>,
        validators: &[SenderAttestation],
    ) -> Result<UnsignedClaimTransaction, BuildError> {
        let fee_payer = {
            let mut rng = self.rng.lock();
            self.fee_payers.pick(&mut *rng)
        };
        let payer = fee_payer.pubkey();

        let recipient = EthAddress::from_hex(&claim.recipient_eth_address)?;
        let destination = pda::user_bank(
            &self.claimable_tokens.program_id,
            &self.claimable_tokens.mint,
            &recipient,
        )?;

        let accounts = self.reward_manager.accounts();
        let disbursement_id = claim.disbursement_id();
        let mut instructions = Vec::with_capacity(2 * (validators.len() + 1) + 1);

        if let Some(attestation) = oracle {
            let message = claim.without_oracle().compile()?;
            push_attestation(&mut instructions, attestation, &message, &payer, accounts, &disbursement_id)?;
        }

        let message = claim.compile()?;
        for attestation in validators {
            push_attestation(&mut instructions, attestation, &message, &payer, accounts, &disbursement_id)?;
        }

        let state = self.reward_manager.state().await?;
        let oracle_address = if claim.has_oracle() {
            EthAddress::from_hex(&claim.anti_abuse_oracle_eth_address)?
        } else {
            EthAddress::ZERO
        };
        instructions.push(instruction::evaluate_attestations(&EvaluateAttestations {
            program_id: &accounts.program_id,
            state: &accounts.state,
            token_source: &state.token_account,
            destination: &destination,
            payer: &payer,
            disbursement_id: &disbursement_id,
            recipient: &recipient,
            oracle: &oracle_address,
            amount: claim.base_units()?,
        })?);

        let lookup_table = self.reward_manager.lookup_table().await?;
        let recent_blockhash = self.reward_manager.reader().get_latest_blockhash().await?;

        let message = v0::Message::try_compile(
            &payer,
            &instructions,
            std::slice::from_ref(lookup_table),
            recent_blockhash,
        )
        .map_err(|e| BuildError::Compile(e.to_string()))?;

        debug!(
            disbursement_id = %disbursement_id,
            fee_payer = %payer,
            instructions = instructions.len(),
            has_oracle = oracle.is_some(),
            "Built claim transaction"
        );

        Ok(UnsignedClaimTransaction {
            fee_payer,
            instructions,
            recent_blockhash,
            message,
        })
    }
}

fn push_attestation(
    instructions: &mut Vec<Instruction>,
    attestation: &SenderAttestation,
    message: &[u8],
    payer: &Pubkey,
    accounts: &crate::client::RewardManagerAccounts,
    disbursement_id: &str,
) -> Result<(), BuildError> {
    let invalid = |source| BuildError::InvalidAttestation {
        address: attestation.address.clone(),
        source,
    };
    let sender = EthAddress::from_hex(&attestation.address).map_err(invalid)?;
    let signature = decode_signature(&attestation.signature).map_err(invalid)?;

    let position = instructions.len();
    let index = u8::try_from(position).map_err(|_| BuildError::InstructionIndexOverflow(position))?;

    instructions.push(instruction::secp256k1_verify(&sender, message, &signature, index)?);
    instructions.push(instruction::submit_attestation(
        &accounts.program_id,
        &accounts.state,
        payer,
        &sender,
        disbursement_id,
    )?);
    Ok(())
}
