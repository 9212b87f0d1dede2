//! Chain and transaction assembly errors

use rewards_types::TypesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Invalid account data for {account}: {reason}")]
    InvalidAccountData { account: String, reason: String },

    #[error("Failed to derive {0} address")]
    Derivation(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error(transparent)]
    Types(#[from] TypesError),
}

pub type Result<T> = std::result::Result<T, ChainError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid attestation from {address}: {source}")]
    InvalidAttestation {
        address: String,
        #[source]
        source: TypesError,
    },

    #[error("Invalid claim: {0}")]
    InvalidClaim(#[from] TypesError),

    #[error("Fee payer pool is empty")]
    EmptyFeePayerPool,

    #[error("Invalid fee payer key: {0}")]
    InvalidFeePayerKey(String),

    #[error("Instruction index {0} does not fit the verification offsets")]
    InstructionIndexOverflow(usize),

    #[error("Failed to compile transaction message: {0}")]
    Compile(String),

    #[error("Failed to sign transaction: {0}")]
    Sign(String),

    #[error(transparent)]
    Chain(#[from] ChainError),
}
