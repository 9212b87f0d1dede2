//! Attestation fan-out
//!
//! Gathers the oracle attestation and the validator attestations for one claim
//! concurrently under a single deadline.

use futures::future::{join_all, try_join_all};
use rewards_types::{same_address, RewardClaim, SenderAttestation, SharedRng, ValidatorNode};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{AttestationError, Result};
use crate::oracle::{OracleClient, OracleNode};
use crate::selector::select_validators;
use crate::validator::ValidatorClient;

/// Deadline shared by every remote call of one claim
pub const ATTESTATION_DEADLINE: Duration = Duration::from_secs(10);

/// Everything the remote attesters need to know about one claim
#[derive(Debug, Clone, Copy)]
pub struct AttestationRequest<'a> {
    pub claim: &'a RewardClaim,
    /// Recipient handle, part of the oracle URL
    pub handle: &'a str,
    pub oracle: &'a OracleNode,
    /// The oracle already attested on chain; skip asking again
    pub oracle_attested: bool,
    /// Local authority signature over `claim`
    pub authority_signature: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatheredAttestations {
    pub oracle: Option<SenderAttestation>,
    pub validators: Vec<SenderAttestation>,
}

pub struct AttestationOrchestrator {
    oracle_client: OracleClient,
    validator_client: ValidatorClient,
    deadline: Duration,
    rng: SharedRng,
}

impl AttestationOrchestrator {
    pub fn new(oracle_client: OracleClient, validator_client: ValidatorClient, rng: SharedRng) -> Self {
        Self {
            oracle_client,
            validator_client,
            deadline: ATTESTATION_DEADLINE,
            rng,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Ask the oracle (unless already attested) and every given validator.
    ///
    /// All-or-nothing: the first failure drops the remaining requests.
    /// `validators[i]` of the result is the attestation of `validators[i]`.
    pub async fn gather(&self, req: AttestationRequest<'_>, validators: &[ValidatorNode]) -> Result<GatheredAttestations> {
        debug!(
            reward_id = %req.claim.reward_id,
            specifier = %req.claim.specifier,
            validators = validators.len(),
            skip_oracle = req.oracle_attested,
            "Gathering attestations"
        );

        let work = async {
            let validator_attestations = try_join_all(
                validators
                    .iter()
                    .map(|node| self.validator_client.attest(node, req.claim, req.authority_signature)),
            );
            let (oracle, validators) = tokio::try_join!(self.oracle_attestation(&req), validator_attestations)?;
            Ok::<_, AttestationError>(GatheredAttestations { oracle, validators })
        };

        self.with_timeout(work).await
    }

    /// Collect `needed` validator attestations from `candidates`, replacing
    /// validators that fail with fresh ones.
    ///
    /// No endpoint is contacted twice and no operator in `excluded_operators`
    /// (or one that already answered) is asked again. When candidates run out
    /// after a failure the last validator error is returned; running out
    /// without any failure yields fewer attestations.
    pub async fn gather_quorum(
        &self,
        req: AttestationRequest<'_>,
        candidates: &[ValidatorNode],
        excluded_operators: &[String],
        needed: usize,
    ) -> Result<GatheredAttestations> {
        let work = async {
            let validator_attestations = self.attest_with_replacement(&req, candidates, excluded_operators, needed);
            let (oracle, validators) = tokio::try_join!(self.oracle_attestation(&req), validator_attestations)?;
            Ok::<_, AttestationError>(GatheredAttestations { oracle, validators })
        };

        self.with_timeout(work).await
    }

    async fn oracle_attestation(&self, req: &AttestationRequest<'_>) -> Result<Option<SenderAttestation>> {
        if req.oracle_attested {
            return Ok(None);
        }
        let claim = req.claim.without_oracle();
        let attestation = self.oracle_client.attest(req.oracle, &claim, req.handle).await?;
        debug!(oracle = %req.oracle.endpoint, reward_id = %claim.reward_id, "Oracle attested");
        Ok(Some(attestation))
    }

    async fn attest_with_replacement(
        &self,
        req: &AttestationRequest<'_>,
        candidates: &[ValidatorNode],
        excluded_operators: &[String],
        needed: usize,
    ) -> Result<Vec<SenderAttestation>> {
        let mut attested_operators = excluded_operators.to_vec();
        let mut contacted: HashSet<String> = HashSet::new();
        let mut gathered = Vec::with_capacity(needed);
        let mut last_error: Option<AttestationError> = None;

        while gathered.len() < needed {
            let remaining: Vec<ValidatorNode> = candidates
                .iter()
                .filter(|node| !contacted.contains(&node.endpoint))
                .cloned()
                .collect();
            let round = {
                let mut rng = self.rng.lock();
                select_validators(&remaining, needed - gathered.len(), &attested_operators, &mut *rng)
            };

            if round.is_empty() {
                return match last_error {
                    Some(err) => Err(err),
                    None => {
                        warn!(
                            reward_id = %req.claim.reward_id,
                            needed = needed,
                            gathered = gathered.len(),
                            "Not enough distinct validator operators, proceeding with fewer"
                        );
                        Ok(gathered)
                    }
                };
            }

            contacted.extend(round.iter().map(|node| node.endpoint.clone()));
            let results = join_all(
                round
                    .iter()
                    .map(|node| self.validator_client.attest(node, req.claim, req.authority_signature)),
            )
            .await;

            for (node, result) in round.iter().zip(results) {
                match result {
                    Ok(attestation) => {
                        attested_operators.push(node.operator_address.clone());
                        if !same_address(&attestation.address, &node.operator_address) {
                            attested_operators.push(attestation.address.clone());
                        }
                        gathered.push(attestation);
                    }
                    Err(err) => {
                        warn!(validator = %node.endpoint, error = %err, "Validator attestation failed, selecting replacement");
                        last_error = Some(err);
                    }
                }
            }
        }

        info!(reward_id = %req.claim.reward_id, validators = gathered.len(), contacted = contacted.len(), "Validator quorum gathered");
        Ok(gathered)
    }

    async fn with_timeout<F>(&self, work: F) -> Result<GatheredAttestations>
    where
        F: std::future::Future<Output = Result<GatheredAttestations>>,
    {
        match tokio::time::timeout(self.deadline, work).await {
            Ok(result) => result,
            Err(_) => Err(AttestationError::Timeout(self.deadline)),
        }
    }
}
