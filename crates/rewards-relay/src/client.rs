//! Relay client
//!
//! The relay pays nothing and signs nothing; it forwards an already signed
//! transaction to the cluster and answers with its signature.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{RelayError, Result};

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    transaction: &'a str,
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    signature: String,
}

#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RelayClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport(&self, reason: impl ToString) -> RelayError {
        RelayError::Transport {
            endpoint: self.endpoint.clone(),
            reason: reason.to_string(),
        }
    }

    /// Submit one encoded transaction and return its signature.
    pub async fn relay(&self, encoded_transaction: &str) -> Result<String> {
        debug!(relay = %self.endpoint, bytes = encoded_transaction.len(), "Relaying transaction");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&RelayRequest {
                transaction: encoded_transaction,
            })
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport(e))?;
        if status != StatusCode::OK {
            warn!(relay = %self.endpoint, status = status.as_u16(), body = %body, "Relay rejected transaction");
            return Err(RelayError::Rejected {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: RelayResponse = serde_json::from_str(&body)
            .map_err(|e| self.transport(format!("invalid response body {:?}: {}", body, e)))?;
        info!(relay = %self.endpoint, signature = %parsed.signature, "Transaction relayed");
        Ok(parsed.signature)
    }
}
