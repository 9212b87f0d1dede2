//! Service wiring
//!
//! Builds the claim pipeline from configuration. Chain access, the challenge
//! store, the reward catalog and the authority signer can be swapped for
//! in-memory versions.

use anyhow::Context;
use rewards_attestation::{
    AttestationOrchestrator, ClaimSigner, EthClaimSigner, OracleClient, OracleRegistry, ValidatorClient,
};
use rewards_chain::{ChainReader, FeePayerPool, RewardManagerClient, RpcChainReader, TransactionBuilder};
use rewards_relay::RelayClient;
use rewards_types::{rng_from_entropy, RewardCatalog, SharedRng};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::claim::ClaimPipeline;
use crate::config::ClaimerConfig;
use crate::coordinator::BatchClaimCoordinator;
use crate::store::{ChallengeStore, InMemoryChallengeStore};

/// Collaborators that differ between a deployment and an in-process setup
pub struct ServiceParts {
    pub reader: Arc<dyn ChainReader>,
    pub store: Arc<dyn ChallengeStore>,
    pub catalog: RewardCatalog,
    pub signer: Arc<dyn ClaimSigner>,
    pub rng: SharedRng,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub slot: Option<u64>,
    pub fee_payers: usize,
    pub validators: usize,
    pub oracles: usize,
}

pub struct ClaimerService {
    coordinator: BatchClaimCoordinator,
    reader: Arc<dyn ChainReader>,
    fee_payers: usize,
    signer_address: String,
}

impl ClaimerService {
    /// Build against the configured RPC node, files and authority key
    pub fn from_config(config: &ClaimerConfig) -> anyhow::Result<Self> {
        let rewards_file = config
            .rewards_file
            .as_ref()
            .context("Reward catalog is required (CLAIMER_REWARDS_FILE)")?;
        let rewards_json = std::fs::read_to_string(rewards_file)
            .with_context(|| format!("Failed to read reward catalog {}", rewards_file.display()))?;
        let catalog = RewardCatalog::from_json(&rewards_json)?;

        let store = match &config.challenges_file {
            Some(path) => InMemoryChallengeStore::from_json_file(path)?,
            None => InMemoryChallengeStore::default(),
        };

        let authority_key = config
            .authority_key
            .as_deref()
            .context("Authority key is required (CLAIMER_AUTHORITY_KEY)")?;
        let signer = EthClaimSigner::from_hex(authority_key)?;

        Self::assemble(
            config,
            ServiceParts {
                reader: Arc::new(RpcChainReader::new(config.rpc_url.clone())),
                store: Arc::new(store),
                catalog,
                signer: Arc::new(signer),
                rng: rng_from_entropy(),
            },
        )
    }

    pub fn assemble(config: &ClaimerConfig, parts: ServiceParts) -> anyhow::Result<Self> {
        let http = reqwest::Client::new();
        let fee_payers = Arc::new(FeePayerPool::from_base58_keys(&config.fee_payer_keys)?);
        let reward_manager = Arc::new(RewardManagerClient::new(
            parts.reader.clone(),
            config.reward_manager_accounts()?,
        )?);

        let builder = TransactionBuilder::new(
            reward_manager.clone(),
            config.claimable_tokens_accounts()?,
            fee_payers.clone(),
            parts.rng.clone(),
        );
        let orchestrator = AttestationOrchestrator::new(
            OracleClient::new(http.clone()),
            ValidatorClient::new(http.clone()),
            parts.rng.clone(),
        )
        .with_deadline(config.attestation_deadline);
        let relay = RelayClient::with_client(http.clone(), config.relay_url.clone());

        let signer_address = parts.signer.address();
        let pipeline = Arc::new(ClaimPipeline::new(
            reward_manager,
            builder,
            orchestrator,
            parts.signer,
            relay,
            config.validators.clone(),
            parts.rng.clone(),
            config.replace_failed_validators,
        ));
        let oracles = Arc::new(OracleRegistry::new(
            config.oracles.clone(),
            OracleClient::new(http),
            parts.rng,
        ));

        let coordinator = BatchClaimCoordinator::new(parts.store, Arc::new(parts.catalog), oracles, pipeline)
            .with_deadline(config.batch_deadline);

        Ok(Self {
            coordinator,
            reader: parts.reader,
            fee_payers: fee_payers.len(),
            signer_address,
        })
    }

    pub fn coordinator(&self) -> &BatchClaimCoordinator {
        &self.coordinator
    }

    /// Ethereum address of the authority signer
    pub fn signer_address(&self) -> &str {
        &self.signer_address
    }

    pub async fn health(&self) -> HealthStatus {
        let slot = match self.reader.get_slot().await {
            Ok(slot) => Some(slot),
            Err(e) => {
                warn!(error = %e, "Health check could not read slot");
                None
            }
        };
        HealthStatus {
            healthy: slot.is_some(),
            slot,
            fee_payers: self.fee_payers,
            validators: self.coordinator.pipeline().validators().len(),
            oracles: self.coordinator.oracles().endpoints().len(),
        }
    }
}
