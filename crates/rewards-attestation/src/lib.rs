//! Reward claim attestation gathering
//!
//! Talks to the anti-abuse oracle and to the validator quorum, and signs
//! claims with the local authority key validators require.

// ===== Modules =====
pub mod error;
pub mod oracle;
pub mod orchestrator;
mod response;
pub mod selector;
pub mod signer;
pub mod validator;

// ===== Re-exports =====
pub use error::{AttestationError, Result};
pub use oracle::{OracleClient, OracleNode, OracleRegistry};
pub use orchestrator::{AttestationOrchestrator, AttestationRequest, GatheredAttestations, ATTESTATION_DEADLINE};
pub use selector::select_validators;
pub use signer::{ClaimSigner, EthClaimSigner};
pub use validator::ValidatorClient;
