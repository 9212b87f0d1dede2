//! Validator attestation client

use reqwest::Url;
use rewards_types::{RewardClaim, SenderAttestation, ValidatorNode};
use serde::Deserialize;
use tracing::debug;

use crate::error::{AttestationError, Result};
use crate::response::{read_reply, Reply};

const ATTESTATION_PATH: [&str; 3] = ["core", "rewards", "attestation"];

#[derive(Debug, Deserialize)]
struct ValidatorAttestationResponse {
    attestation: String,
    owner: String,
}

fn transport(endpoint: &str, reason: impl ToString) -> AttestationError {
    AttestationError::ValidatorTransport {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    }
}

#[derive(Clone, Default)]
pub struct ValidatorClient {
    http: reqwest::Client,
}

impl ValidatorClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// `GET {endpoint}/core/rewards/attestation?...`
    ///
    /// `authority_signature` is this service's signature over the claim; the
    /// validator refuses claims not vouched for by the authority.
    pub async fn attest(
        &self,
        validator: &ValidatorNode,
        claim: &RewardClaim,
        authority_signature: &str,
    ) -> Result<SenderAttestation> {
        let endpoint = validator.endpoint.as_str();
        let mut url = Url::parse(endpoint).map_err(|e| transport(endpoint, e))?;
        url.path_segments_mut()
            .map_err(|_| transport(endpoint, "endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend(ATTESTATION_PATH);

        let amount = claim.amount.to_string();
        let query = [
            ("reward_id", claim.reward_id.as_str()),
            ("specifier", claim.specifier.as_str()),
            ("eth_recipient_address", claim.recipient_eth_address.as_str()),
            ("oracle_address", claim.anti_abuse_oracle_eth_address.as_str()),
            ("amount", amount.as_str()),
            ("signature", authority_signature),
        ];

        debug!(validator = %endpoint, reward_id = %claim.reward_id, specifier = %claim.specifier, "Requesting validator attestation");
        let response = self
            .http
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| transport(endpoint, e))?;

        match read_reply::<ValidatorAttestationResponse>(response)
            .await
            .map_err(|e| transport(endpoint, e))?
        {
            Reply::Ok(body) => Ok(SenderAttestation::new(body.owner, body.attestation)),
            Reply::Rejected { status, body } => Err(AttestationError::ValidatorRejected {
                endpoint: endpoint.to_string(),
                status,
                body,
            }),
            Reply::Invalid(reason) => Err(transport(endpoint, reason)),
        }
    }
}
