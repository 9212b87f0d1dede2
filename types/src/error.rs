//! Error types for claim and attestation data

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("Invalid hex {value:?}: {reason}")]
    InvalidHex { value: String, reason: String },

    #[error("Invalid eth address: {0}")]
    InvalidEthAddress(String),

    #[error("Amount overflow: {0} tokens")]
    AmountOverflow(u64),

    #[error("challenge ID {0} does not have a configured reward")]
    UnknownReward(String),

    #[error("Invalid reward catalog: {0}")]
    InvalidCatalog(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TypesError>;
