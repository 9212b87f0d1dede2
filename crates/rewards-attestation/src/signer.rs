//! Local authority signer
//!
//! Validators only attest claims that carry this service's signature, so every
//! claim is signed once before any remote call.

use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rewards_types::{decode_hex, EthAddress, RewardClaim};
use sha3::{Digest, Keccak256};

use crate::error::{AttestationError, Result};

/// Signs compiled reward claims on behalf of this service
#[async_trait]
pub trait ClaimSigner: Send + Sync {
    /// Ethereum address of the signing key
    fn address(&self) -> String;

    /// Hex signature over the compiled claim
    async fn sign_claim(&self, claim: &RewardClaim) -> Result<String>;
}

/// secp256k1 signer producing `0x` + hex(r ‖ s ‖ v) over keccak256 of the claim
pub struct EthClaimSigner {
    key: SigningKey,
    address: EthAddress,
}

impl EthClaimSigner {
    pub fn new(key: SigningKey) -> Self {
        let public = k256::PublicKey::from(key.verifying_key());
        let encoded = public.to_encoded_point(false);
        let hash = Keccak256::digest(&encoded.as_bytes()[1..]);
        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..]);
        Self {
            key,
            address: EthAddress::new(address),
        }
    }

    /// Parse a hex secret key, with or without `0x`
    pub fn from_hex(secret: &str) -> Result<Self> {
        let bytes = decode_hex(secret.trim())?;
        let key = SigningKey::from_slice(&bytes).map_err(|e| AttestationError::Signer(e.to_string()))?;
        Ok(Self::new(key))
    }

    pub fn sign_bytes(&self, message: &[u8]) -> Result<String> {
        let digest = Keccak256::digest(message);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| AttestationError::Signer(e.to_string()))?;

        let mut bytes = Vec::with_capacity(65);
        bytes.extend_from_slice(&signature.to_bytes());
        bytes.push(recovery_id.to_byte());
        Ok(format!("0x{}", hex::encode(bytes)))
    }
}

#[async_trait]
impl ClaimSigner for EthClaimSigner {
    fn address(&self) -> String {
        self.address.to_string()
    }

    async fn sign_claim(&self, claim: &RewardClaim) -> Result<String> {
        let compiled = claim.compile()?;
        self.sign_bytes(&compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

    const SECRET: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn claim() -> RewardClaim {
        RewardClaim {
            reward_id: "c".to_string(),
            specifier: "323ea4a0:202525".to_string(),
            recipient_eth_address: "0xa507da823bf0c5dc44a759d0d398b7f52097da19".to_string(),
            amount: 1,
            anti_abuse_oracle_eth_address: "0x00b6462e955da5841b6d9e1e2529b830f00f31bf".to_string(),
        }
    }

    #[test]
    fn test_address_from_secret() {
        let signer = EthClaimSigner::from_hex(SECRET).unwrap();
        assert_eq!(signer.address(), "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23");
    }

    #[test]
    fn test_invalid_secret() {
        assert!(matches!(EthClaimSigner::from_hex("0x1234"), Err(AttestationError::Signer(_))));
        assert!(matches!(EthClaimSigner::from_hex("zz"), Err(AttestationError::Types(_))));
    }

    #[tokio::test]
    async fn test_signature_recovers_to_signer() {
        let signer = EthClaimSigner::from_hex(SECRET).unwrap();
        let claim = claim();
        let signature = signer.sign_claim(&claim).await.unwrap();
        assert!(signature.starts_with("0x"));

        let bytes = hex::decode(&signature[2..]).unwrap();
        assert_eq!(bytes.len(), 65);
        assert!(bytes[64] <= 1);

        let digest = Keccak256::digest(claim.compile().unwrap());
        let sig = Signature::from_slice(&bytes[..64]).unwrap();
        let recid = RecoveryId::from_byte(bytes[64]).unwrap();
        let recovered = VerifyingKey::recover_from_prehash(&digest, &sig, recid).unwrap();
        assert_eq!(&recovered, signer.key.verifying_key());
    }

    #[tokio::test]
    async fn test_signing_is_deterministic() {
        let signer = EthClaimSigner::from_hex(SECRET).unwrap();
        let a = signer.sign_claim(&claim()).await.unwrap();
        let b = signer.sign_claim(&claim()).await.unwrap();
        assert_eq!(a, b);

        let mut other = claim();
        other.amount = 2;
        assert_ne!(a, signer.sign_claim(&other).await.unwrap());
    }
}
