//! Pool of pre-funded fee payer keypairs

use rand::Rng;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use std::sync::Arc;

use crate::error::BuildError;

pub struct FeePayerPool {
    keypairs: Vec<Arc<Keypair>>,
}

impl FeePayerPool {
    pub fn new(keypairs: Vec<Keypair>) -> Result<Self, BuildError> {
        if keypairs.is_empty() {
            return Err(BuildError::EmptyFeePayerPool);
        }
        Ok(Self {
            keypairs: keypairs.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parse base58-encoded 64-byte keypairs
    pub fn from_base58_keys<S: AsRef<str>>(keys: &[S]) -> Result<Self, BuildError> {
        let keypairs = keys
            .iter()
            .map(|key| {
                let key = key.as_ref().trim();
                let bytes = bs58::decode(key)
                    .into_vec()
                    .map_err(|e| BuildError::InvalidFeePayerKey(e.to_string()))?;
                Keypair::from_bytes(&bytes).map_err(|e| BuildError::InvalidFeePayerKey(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(keypairs)
    }

    /// Uniform random pick. Concurrent claims may share a payer.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Arc<Keypair> {
        let index = rng.gen_range(0..self.keypairs.len());
        self.keypairs[index].clone()
    }

    pub fn pubkeys(&self) -> Vec<Pubkey> {
        self.keypairs.iter().map(|k| k.pubkey()).collect()
    }

    pub fn len(&self) -> usize {
        self.keypairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypairs.is_empty()
    }
}
