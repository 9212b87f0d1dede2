//! Reward claim types
//!
//! A claim is the unit every attesting party signs. Its compiled byte form is
//! what the secp256k1 verification instruction checks on chain, so the layout
//! here must match the reward manager program exactly:
//!
//! ```text
//! recipient(20) '_' amount_le(8) '_' "{reward_id}:{specifier}" ['_' oracle(20)]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypesError};
use crate::eth::EthAddress;

/// Base units per whole token (8 decimals on the claim token)
pub const TOKEN_BASE_UNITS: u64 = 100_000_000;

const SEPARATOR: u8 = b'_';

/// One reward disbursement request for one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardClaim {
    pub reward_id: String,
    pub specifier: String,
    pub recipient_eth_address: String,
    /// Amount in whole tokens
    pub amount: u64,
    /// Empty when the claim is compiled for the oracle itself
    pub anti_abuse_oracle_eth_address: String,
}

impl RewardClaim {
    /// `{reward_id}:{specifier}`, the on-chain key of this disbursement
    pub fn disbursement_id(&self) -> String {
        format!("{}:{}", self.reward_id, self.specifier)
    }

    /// Amount scaled to token base units
    pub fn base_units(&self) -> Result<u64> {
        self.amount
            .checked_mul(TOKEN_BASE_UNITS)
            .ok_or(TypesError::AmountOverflow(self.amount))
    }

    /// Copy of this claim with the oracle address cleared
    pub fn without_oracle(&self) -> Self {
        Self {
            anti_abuse_oracle_eth_address: String::new(),
            ..self.clone()
        }
    }

    pub fn has_oracle(&self) -> bool {
        !self.anti_abuse_oracle_eth_address.is_empty()
    }

    /// Serialize to the byte message signed by attesters
    pub fn compile(&self) -> Result<Vec<u8>> {
        let recipient = EthAddress::from_hex(&self.recipient_eth_address)?;
        let disbursement_id = self.disbursement_id();

        let mut message = Vec::with_capacity(20 + 1 + 8 + 1 + disbursement_id.len() + 21);
        message.extend_from_slice(recipient.as_bytes());
        message.push(SEPARATOR);
        message.extend_from_slice(&self.base_units()?.to_le_bytes());
        message.push(SEPARATOR);
        message.extend_from_slice(disbursement_id.as_bytes());

        if self.has_oracle() {
            let oracle = EthAddress::from_hex(&self.anti_abuse_oracle_eth_address)?;
            message.push(SEPARATOR);
            message.extend_from_slice(oracle.as_bytes());
        }

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claim() -> RewardClaim {
        RewardClaim {
            reward_id: "b".to_string(),
            specifier: "38698=>507410153".to_string(),
            recipient_eth_address: "0x68d5397bb16195ea47091010f3abb8fc6b5cdfa6".to_string(),
            amount: 1,
            anti_abuse_oracle_eth_address: "0x00b6462e955dA5841b6D9e1E2529B830F00f31Bf".to_string(),
        }
    }

    #[test]
    fn test_compile_with_oracle() {
        let message = sample_claim().compile().unwrap();
        assert_eq!(
            hex::encode(message),
            "68d5397bb16195ea47091010f3abb8fc6b5cdfa65f00e1f505000000005f623a33383639383d3e3530373431303135335f00b6462e955da5841b6d9e1e2529b830f00f31bf"
        );
    }

    #[test]
    fn test_compile_without_oracle() {
        let claim = sample_claim().without_oracle();
        let message = claim.compile().unwrap();
        assert_eq!(
            hex::encode(&message),
            "68d5397bb16195ea47091010f3abb8fc6b5cdfa65f00e1f505000000005f623a33383639383d3e353037343130313533"
        );
        assert!(!claim.has_oracle());
    }

    #[test]
    fn test_disbursement_id() {
        assert_eq!(sample_claim().disbursement_id(), "b:38698=>507410153");
    }

    #[test]
    fn test_amount_overflow() {
        let mut claim = sample_claim();
        claim.amount = u64::MAX;
        assert!(matches!(claim.compile(), Err(TypesError::AmountOverflow(_))));
    }

    #[test]
    fn test_bad_recipient() {
        let mut claim = sample_claim();
        claim.recipient_eth_address = "0xnothex".to_string();
        assert!(claim.compile().is_err());
    }
}
