//! Single reward claim: attest, assemble, relay

use rewards_attestation::{
    select_validators, AttestationOrchestrator, AttestationRequest, ClaimSigner, GatheredAttestations, OracleNode,
};
use rewards_chain::{encode_transaction, RewardManagerClient, RewardManagerError, TransactionBuilder};
use rewards_relay::RelayClient;
use rewards_types::{RewardClaim, SharedRng, ValidatorNode};
use solana_sdk::signature::Signer;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::Result;

/// A claim plus the recipient handle the oracle keys its checks on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClaim {
    pub claim: RewardClaim,
    pub handle: String,
}

pub struct ClaimPipeline {
    reward_manager: Arc<RewardManagerClient>,
    builder: TransactionBuilder,
    orchestrator: AttestationOrchestrator,
    signer: Arc<dyn ClaimSigner>,
    relay: RelayClient,
    validators: Vec<ValidatorNode>,
    rng: SharedRng,
    replace_failed_validators: bool,
}

impl ClaimPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reward_manager: Arc<RewardManagerClient>,
        builder: TransactionBuilder,
        orchestrator: AttestationOrchestrator,
        signer: Arc<dyn ClaimSigner>,
        relay: RelayClient,
        validators: Vec<ValidatorNode>,
        rng: SharedRng,
        replace_failed_validators: bool,
    ) -> Self {
        Self {
            reward_manager,
            builder,
            orchestrator,
            signer,
            relay,
            validators,
            rng,
            replace_failed_validators,
        }
    }

    pub fn reward_manager(&self) -> &Arc<RewardManagerClient> {
        &self.reward_manager
    }

    pub fn validators(&self) -> &[ValidatorNode] {
        &self.validators
    }

    /// Run one claim end to end and return the relayed transaction signature.
    pub async fn claim(&self, pending: &PendingClaim, oracle: &OracleNode) -> Result<String> {
        let claim = &pending.claim;
        let handle = pending.handle.as_str();

        let state = self.reward_manager.state().await?;
        let submitted = self.reward_manager.submitted_attestations(claim).await?;
        let oracle_attested = submitted.has_oracle_attestation();
        let existing_operators = submitted.validator_operators();

        let authority_signature = self.signer.sign_claim(claim).await?;
        let needed = (state.min_votes as usize).saturating_sub(existing_operators.len());

        debug!(
            reward_id = %claim.reward_id,
            specifier = %claim.specifier,
            handle = %handle,
            min_votes = state.min_votes,
            existing = existing_operators.len(),
            needed = needed,
            oracle_attested = oracle_attested,
            "Claim state loaded"
        );

        let request = AttestationRequest {
            claim,
            handle,
            oracle,
            oracle_attested,
            authority_signature: &authority_signature,
        };
        let gathered = self.gather(request, &existing_operators, needed).await?;

        let unsigned = self
            .builder
            .build(claim, gathered.oracle.as_ref(), &gathered.validators)
            .await?;
        let transaction = unsigned.sign()?;
        let encoded = encode_transaction(&transaction)?;

        debug!(
            reward_id = %claim.reward_id,
            specifier = %claim.specifier,
            instructions = unsigned.instruction_count(),
            fee_payer = %unsigned.fee_payer.pubkey(),
            "Claim transaction assembled"
        );

        let signature = self.relay.relay(&encoded).await.map_err(|e| {
            match e.body().and_then(RewardManagerError::find_in) {
                Some(program_error) => error!(
                    reward_id = %claim.reward_id,
                    specifier = %claim.specifier,
                    handle = %handle,
                    program_error = %program_error,
                    transaction = %encoded,
                    "Claim transaction failed in the reward manager"
                ),
                None => error!(
                    reward_id = %claim.reward_id,
                    specifier = %claim.specifier,
                    handle = %handle,
                    error = %e,
                    "Claim transaction failed to send"
                ),
            }
            e
        })?;

        info!(
            reward_id = %claim.reward_id,
            specifier = %claim.specifier,
            handle = %handle,
            signature = %signature,
            "Reward claimed"
        );
        Ok(signature)
    }

    async fn gather(
        &self,
        request: AttestationRequest<'_>,
        existing_operators: &[String],
        needed: usize,
    ) -> Result<GatheredAttestations> {
        if self.replace_failed_validators {
            return Ok(self
                .orchestrator
                .gather_quorum(request, &self.validators, existing_operators, needed)
                .await?);
        }

        let selected = {
            let mut rng = self.rng.lock();
            select_validators(&self.validators, needed, existing_operators, &mut *rng)
        };
        if selected.len() < needed {
            warn!(
                reward_id = %request.claim.reward_id,
                needed = needed,
                selected = selected.len(),
                "Not enough distinct validator operators, proceeding with fewer"
            );
        }
        Ok(self.orchestrator.gather(request, &selected).await?)
    }
}
