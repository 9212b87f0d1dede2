//! Anti-abuse oracle client
//!
//! The oracle decides whether a user may claim at all. Its attestation is
//! requested with the oracle-address field cleared from the claim, and its
//! signing address is learned once per endpoint from `/health_check`.

use dashmap::DashMap;
use rand::Rng;
use reqwest::Url;
use rewards_types::{RewardClaim, SenderAttestation, SharedRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{AttestationError, Result};
use crate::response::{read_reply, Reply};

const ATTESTATION_PATH: &str = "attestation";
const HEALTH_CHECK_PATH: &str = "health_check";

/// An oracle endpoint together with its signing address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleNode {
    pub endpoint: String,
    pub address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OracleAttestationRequest<'a> {
    challenge_id: &'a str,
    challenge_specifier: &'a str,
    amount: String,
}

#[derive(Debug, Deserialize)]
struct OracleAttestationResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct OracleHealthResponse {
    #[serde(rename = "AntiAbuseWalletPubkey")]
    anti_abuse_wallet_pubkey: String,
}

fn transport(endpoint: &str, reason: impl ToString) -> AttestationError {
    AttestationError::OracleTransport {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    }
}

fn endpoint_url(endpoint: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(endpoint).map_err(|e| transport(endpoint, e))?;
    url.path_segments_mut()
        .map_err(|_| transport(endpoint, "endpoint cannot be a base URL"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[derive(Clone, Default)]
pub struct OracleClient {
    http: reqwest::Client,
}

impl OracleClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// `POST {endpoint}/attestation/{handle}`
    pub async fn attest(&self, oracle: &OracleNode, claim: &RewardClaim, handle: &str) -> Result<SenderAttestation> {
        let endpoint = oracle.endpoint.as_str();
        let url = endpoint_url(endpoint, &[ATTESTATION_PATH, handle])?;
        let request = OracleAttestationRequest {
            challenge_id: &claim.reward_id,
            challenge_specifier: &claim.specifier,
            amount: claim.amount.to_string(),
        };

        debug!(oracle = %endpoint, handle = %handle, reward_id = %claim.reward_id, "Requesting oracle attestation");
        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport(endpoint, e))?;

        match read_reply::<OracleAttestationResponse>(response)
            .await
            .map_err(|e| transport(endpoint, e))?
        {
            Reply::Ok(body) => Ok(SenderAttestation::new(oracle.address.clone(), body.result)),
            Reply::Rejected { status, body } => Err(AttestationError::OracleRejected {
                endpoint: endpoint.to_string(),
                status,
                body,
            }),
            Reply::Invalid(reason) => Err(transport(endpoint, reason)),
        }
    }

    /// `GET {endpoint}/health_check`, returning the oracle's signing address
    pub async fn signing_address(&self, endpoint: &str) -> Result<String> {
        let url = endpoint_url(endpoint, &[HEALTH_CHECK_PATH])?;
        let response = self.http.get(url).send().await.map_err(|e| transport(endpoint, e))?;

        match read_reply::<OracleHealthResponse>(response)
            .await
            .map_err(|e| transport(endpoint, e))?
        {
            Reply::Ok(body) => Ok(body.anti_abuse_wallet_pubkey),
            Reply::Rejected { status, body } => Err(AttestationError::OracleRejected {
                endpoint: endpoint.to_string(),
                status,
                body,
            }),
            Reply::Invalid(reason) => Err(transport(endpoint, reason)),
        }
    }
}

/// Configured oracle endpoints with memoized signing addresses.
///
/// Each endpoint's address is resolved at most once for the process
/// lifetime; concurrent first lookups share one health check.
pub struct OracleRegistry {
    endpoints: Vec<String>,
    client: OracleClient,
    addresses: DashMap<String, Arc<OnceCell<String>>>,
    rng: SharedRng,
}

impl OracleRegistry {
    pub fn new(endpoints: Vec<String>, client: OracleClient, rng: SharedRng) -> Self {
        Self {
            endpoints: endpoints
                .into_iter()
                .map(|e| e.trim_end_matches('/').to_string())
                .collect(),
            client,
            addresses: DashMap::new(),
            rng,
        }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn client(&self) -> &OracleClient {
        &self.client
    }

    /// Resolve one endpoint's signing address
    pub async fn resolve(&self, endpoint: &str) -> Result<OracleNode> {
        let cell = self
            .addresses
            .entry(endpoint.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let address = cell
            .get_or_try_init(|| async {
                let address = self.client.signing_address(endpoint).await?;
                info!(oracle = %endpoint, address = %address, "Resolved oracle signing address");
                Ok::<_, AttestationError>(address)
            })
            .await?;

        Ok(OracleNode {
            endpoint: endpoint.to_string(),
            address: address.clone(),
        })
    }

    /// Pick one configured oracle uniformly at random
    pub async fn pick(&self) -> Result<OracleNode> {
        if self.endpoints.is_empty() {
            return Err(AttestationError::NoOracleConfigured);
        }
        let endpoint = {
            let mut rng = self.rng.lock();
            self.endpoints[rng.gen_range(0..self.endpoints.len())].clone()
        };
        self.resolve(&endpoint).await
    }
}
