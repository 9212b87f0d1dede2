//! Batch claims for one user
//!
//! Every undisbursed row becomes its own claim task. All tasks share one
//! oracle and one deadline; the first failure ends the batch call while
//! tasks already running finish in the background.

use futures::stream::{FuturesUnordered, StreamExt};
use rewards_attestation::OracleRegistry;
use rewards_types::{RewardCatalog, RewardClaim, UndisbursedChallenge};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::claim::{ClaimPipeline, PendingClaim};
use crate::config::BATCH_DEADLINE;
use crate::error::{ClaimError, Result};
use crate::store::ChallengeStore;

pub struct BatchClaimCoordinator {
    store: Arc<dyn ChallengeStore>,
    catalog: Arc<RewardCatalog>,
    oracles: Arc<OracleRegistry>,
    pipeline: Arc<ClaimPipeline>,
    deadline: Duration,
}

impl BatchClaimCoordinator {
    pub fn new(
        store: Arc<dyn ChallengeStore>,
        catalog: Arc<RewardCatalog>,
        oracles: Arc<OracleRegistry>,
        pipeline: Arc<ClaimPipeline>,
    ) -> Self {
        Self {
            store,
            catalog,
            oracles,
            pipeline,
            deadline: BATCH_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn oracles(&self) -> &Arc<OracleRegistry> {
        &self.oracles
    }

    pub fn pipeline(&self) -> &Arc<ClaimPipeline> {
        &self.pipeline
    }

    /// Claim every matching undisbursed reward of `user_id`.
    ///
    /// Signatures are returned in row order.
    pub async fn claim_all(
        &self,
        user_id: &str,
        challenge_id: Option<&str>,
        specifier: Option<&str>,
    ) -> Result<Vec<String>> {
        if user_id.trim().is_empty() {
            return Err(ClaimError::MissingUserId);
        }

        let rows = self.store.undisbursed(user_id, challenge_id, specifier).await?;
        if rows.is_empty() {
            return Err(ClaimError::NoRewardsToClaim);
        }

        let amounts = rows
            .iter()
            .map(|row| {
                self.catalog
                    .get(&row.challenge_id)
                    .map(|reward| reward.amount)
                    .map_err(ClaimError::from)
            })
            .collect::<Result<Vec<_>>>()?;

        let oracle = self.oracles.pick().await?;
        let claims: Vec<_> = rows
            .iter()
            .zip(amounts)
            .map(|(row, amount)| pending_claim(row, amount, &oracle.address))
            .collect();

        info!(
            user_id = %user_id,
            rows = claims.len(),
            oracle = %oracle.endpoint,
            "Claiming rewards"
        );

        let deadline = Instant::now() + self.deadline;
        let mut tasks = FuturesUnordered::new();
        for (index, pending) in claims.into_iter().enumerate() {
            let pipeline = self.pipeline.clone();
            let oracle = oracle.clone();
            let batch_deadline = self.deadline;
            let handle = tokio::spawn(async move {
                let result = match tokio::time::timeout_at(deadline, pipeline.claim(&pending, &oracle)).await {
                    Ok(result) => result,
                    Err(_) => Err(ClaimError::BatchTimeout(batch_deadline)),
                };
                if let Err(e) = &result {
                    warn!(
                        reward_id = %pending.claim.reward_id,
                        specifier = %pending.claim.specifier,
                        handle = %pending.handle,
                        error = %e,
                        "Failed to claim challenge reward"
                    );
                }
                result
            });
            tasks.push(async move { (index, handle.await) });
        }

        let count = tasks.len();
        let collect = async {
            let mut signatures: Vec<Option<String>> = vec![None; count];
            while let Some((index, joined)) = tasks.next().await {
                let signature = joined.map_err(|e| ClaimError::Task(e.to_string()))??;
                signatures[index] = Some(signature);
            }
            Ok::<_, ClaimError>(signatures.into_iter().flatten().collect::<Vec<_>>())
        };

        let signatures = match tokio::time::timeout_at(deadline, collect).await {
            Ok(result) => result?,
            Err(_) => return Err(ClaimError::BatchTimeout(self.deadline)),
        };

        info!(user_id = %user_id, claimed = signatures.len(), "Rewards claimed");
        Ok(signatures)
    }
}

fn pending_claim(row: &UndisbursedChallenge, amount: u64, oracle_address: &str) -> PendingClaim {
    PendingClaim {
        claim: RewardClaim {
            reward_id: row.challenge_id.clone(),
            specifier: row.specifier.clone(),
            recipient_eth_address: row.wallet.clone(),
            amount,
            anti_abuse_oracle_eth_address: oracle_address.to_string(),
        },
        handle: row.handle.clone(),
    }
}
