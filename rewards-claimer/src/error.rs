//! Service-level claim errors

use rewards_attestation::AttestationError;
use rewards_chain::{BuildError, ChainError};
use rewards_relay::RelayError;
use rewards_types::TypesError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Missing user ID")]
    MissingUserId,

    #[error("No rewards to claim")]
    NoRewardsToClaim,

    #[error("challenge ID {0} does not have a configured reward")]
    UnknownReward(String),

    #[error("challenge store error: {0}")]
    Store(String),

    #[error("claims not completed within {0:?}")]
    BatchTimeout(Duration),

    #[error("claim task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Attestation(#[from] AttestationError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error(transparent)]
    Types(TypesError),
}

impl From<TypesError> for ClaimError {
    fn from(err: TypesError) -> Self {
        match err {
            TypesError::UnknownReward(id) => Self::UnknownReward(id),
            other => Self::Types(other),
        }
    }
}

/// How a claim failure should be reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad request or nothing to do
    Input,
    /// A remote party (oracle, validator, chain, relay) refused or failed
    Remote,
    Timeout,
    Internal,
}

impl ClaimError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MissingUserId | Self::NoRewardsToClaim | Self::UnknownReward(_) | Self::Types(_) => {
                ErrorClass::Input
            }
            Self::BatchTimeout(_) | Self::Attestation(AttestationError::Timeout(_)) => ErrorClass::Timeout,
            Self::Attestation(
                AttestationError::OracleRejected { .. }
                | AttestationError::OracleTransport { .. }
                | AttestationError::ValidatorRejected { .. }
                | AttestationError::ValidatorTransport { .. },
            )
            | Self::Relay(_)
            | Self::Chain(ChainError::Rpc(_))
            | Self::Build(BuildError::Chain(ChainError::Rpc(_))) => ErrorClass::Remote,
            _ => ErrorClass::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClaimError>;
