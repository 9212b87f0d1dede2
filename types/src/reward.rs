//! Reward catalog and undisbursed challenge rows

use serde::{Deserialize, Serialize};

use crate::error::{Result, TypesError};

/// A configured reward: how many whole tokens a challenge pays out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub reward_id: String,
    pub amount: u64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Lookup table of configured rewards
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardCatalog {
    rewards: Vec<Reward>,
}

impl RewardCatalog {
    pub fn new(rewards: Vec<Reward>) -> Self {
        Self { rewards }
    }

    /// Parse a JSON array of rewards
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn get(&self, reward_id: &str) -> Result<&Reward> {
        self.rewards
            .iter()
            .find(|r| r.reward_id == reward_id)
            .ok_or_else(|| TypesError::UnknownReward(reward_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

/// A completed challenge whose reward has not been paid out yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndisbursedChallenge {
    pub user_id: String,
    pub challenge_id: String,
    pub specifier: String,
    pub handle: String,
    /// Recipient eth wallet
    pub wallet: String,
}
