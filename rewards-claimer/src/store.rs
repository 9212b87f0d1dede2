//! Undisbursed challenge lookup
//!
//! The claimer does not own challenge completion data; it only reads the rows
//! still waiting for a payout.

use async_trait::async_trait;
use parking_lot::RwLock;
use rewards_types::UndisbursedChallenge;
use std::path::Path;
use tracing::info;

use crate::error::{ClaimError, Result};

#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Rows for `user_id`, optionally narrowed to one challenge and specifier
    async fn undisbursed(
        &self,
        user_id: &str,
        challenge_id: Option<&str>,
        specifier: Option<&str>,
    ) -> Result<Vec<UndisbursedChallenge>>;
}

/// Challenge rows held in memory, optionally loaded from a JSON file
#[derive(Default)]
pub struct InMemoryChallengeStore {
    rows: RwLock<Vec<UndisbursedChallenge>>,
}

impl InMemoryChallengeStore {
    pub fn new(rows: Vec<UndisbursedChallenge>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let rows: Vec<UndisbursedChallenge> =
            serde_json::from_str(json).map_err(|e| ClaimError::Store(e.to_string()))?;
        Ok(Self::new(rows))
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ClaimError::Store(format!("failed to read {}: {}", path.display(), e)))?;
        let store = Self::from_json(&json)?;
        info!(path = %path.display(), rows = store.len(), "Loaded undisbursed challenges");
        Ok(store)
    }

    pub fn insert(&self, row: UndisbursedChallenge) {
        self.rows.write().push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl ChallengeStore for InMemoryChallengeStore {
    async fn undisbursed(
        &self,
        user_id: &str,
        challenge_id: Option<&str>,
        specifier: Option<&str>,
    ) -> Result<Vec<UndisbursedChallenge>> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|row| row.user_id == user_id)
            .filter(|row| challenge_id.map_or(true, |id| row.challenge_id == id))
            .filter(|row| specifier.map_or(true, |s| row.specifier == s))
            .cloned()
            .collect())
    }
}
