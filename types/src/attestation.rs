//! Attestation and attester node types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::eth::same_address;

/// Signature produced by one remote party over a compiled claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderAttestation {
    /// Hex eth address of the signer as reported by the remote party
    pub address: String,
    /// Hex signature; may be missing its leading zero nibble
    pub signature: String,
}

impl SenderAttestation {
    pub fn new(address: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            signature: signature.into(),
        }
    }
}

/// A validator node able to attest claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorNode {
    pub endpoint: String,
    /// Operator wallet; several nodes may share one operator
    pub operator_address: String,
}

impl ValidatorNode {
    pub fn new(endpoint: impl Into<String>, operator_address: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            operator_address: operator_address.into(),
        }
    }

    pub fn is_operated_by(&self, operator: &str) -> bool {
        same_address(&self.operator_address, operator)
    }

    /// Parse the `endpoint=operator` form used in configuration
    pub fn parse(entry: &str) -> Option<Self> {
        let (endpoint, operator) = entry.trim().rsplit_once('=')?;
        let endpoint = endpoint.trim().trim_end_matches('/');
        let operator = operator.trim();
        if endpoint.is_empty() || operator.is_empty() {
            return None;
        }
        Some(Self::new(endpoint, operator))
    }
}

impl fmt::Display for ValidatorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.endpoint, self.operator_address)
    }
}
