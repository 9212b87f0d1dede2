//! Reward claimer service
//!
//! Turns a user's undisbursed challenge rewards into relayed claim
//! transactions: one oracle per batch, a validator quorum per claim, one
//! transaction per claim.

// ========== Core Modules ==========
pub mod claim; // Single claim pipeline
pub mod config;
pub mod coordinator; // Batch claims
pub mod error;
pub mod http;
pub mod service;
pub mod store; // Undisbursed challenge rows

pub use claim::{ClaimPipeline, PendingClaim};
pub use config::{ClaimerConfig, SolanaEnv, SolanaPreset, ATTESTATION_DEADLINE, BATCH_DEADLINE};
pub use coordinator::BatchClaimCoordinator;
pub use error::{ClaimError, ErrorClass, Result};
pub use http::create_router;
pub use service::{ClaimerService, HealthStatus, ServiceParts};
pub use store::{ChallengeStore, InMemoryChallengeStore};
