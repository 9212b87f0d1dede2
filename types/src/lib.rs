// ========== Core Modules ==========
pub mod attestation; // Sender attestations and validator nodes
pub mod claim; // Reward claims and their signed byte form
pub mod error;
pub mod eth; // Eth address / hex helpers
pub mod reward; // Reward catalog and undisbursed challenges
pub mod rng;

pub use attestation::{SenderAttestation, ValidatorNode};
pub use claim::{RewardClaim, TOKEN_BASE_UNITS};
pub use error::{Result, TypesError};
pub use eth::{
    decode_hex, decode_signature, pad_odd_hex, same_address, strip_hex_prefix, EthAddress,
    ETH_ADDRESS_LENGTH,
};
pub use reward::{Reward, RewardCatalog, UndisbursedChallenge};
pub use rng::{rng_from_entropy, seeded_rng, SharedRng};
