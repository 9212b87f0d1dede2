//! Reward manager chain layer
//!
//! Encodes the reward manager program's instructions and accounts, reads
//! program state through a [`ChainReader`], and assembles claim transactions.

pub mod accounts;
pub mod builder;
pub mod client;
pub mod error;
pub mod fee_payer;
pub mod instruction;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod pda;
pub mod program_error;
pub mod reader;

pub use accounts::{AttestationMessage, AttestationsAccountData, RewardManagerState};
pub use builder::{encode_transaction, ClaimableTokensAccounts, TransactionBuilder, UnsignedClaimTransaction};
pub use client::{RewardManagerAccounts, RewardManagerClient};
pub use error::{BuildError, ChainError, Result};
pub use fee_payer::FeePayerPool;
pub use program_error::RewardManagerError;
pub use reader::{ChainReader, RpcChainReader};
