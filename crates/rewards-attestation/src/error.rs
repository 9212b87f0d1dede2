//! Attestation errors
//!
//! Remote rejections keep the HTTP status and raw body so callers can tell
//! which party refused and why.

use rewards_types::TypesError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttestationError {
    #[error("failed to get oracle attestation from {endpoint}. status {status}: {body}")]
    OracleRejected {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("oracle request to {endpoint} failed: {reason}")]
    OracleTransport { endpoint: String, reason: String },

    #[error("failed to get validator attestation from {endpoint}. status {status}: {body}")]
    ValidatorRejected {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("validator request to {endpoint} failed: {reason}")]
    ValidatorTransport { endpoint: String, reason: String },

    #[error("attestations not gathered within {0:?}")]
    Timeout(Duration),

    #[error("no anti-abuse oracle endpoints configured")]
    NoOracleConfigured,

    #[error("signer error: {0}")]
    Signer(String),

    #[error(transparent)]
    Types(#[from] TypesError),
}

impl AttestationError {
    /// HTTP status returned by the remote party, if it answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::OracleRejected { status, .. } | Self::ValidatorRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Endpoint of the remote party involved, if any
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::OracleRejected { endpoint, .. }
            | Self::OracleTransport { endpoint, .. }
            | Self::ValidatorRejected { endpoint, .. }
            | Self::ValidatorTransport { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AttestationError>;
