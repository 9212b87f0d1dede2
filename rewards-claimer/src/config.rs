//! Configuration for the reward claimer
//!
//! Everything comes from environment variables. `CLAIMER_ENV` selects the
//! deployment preset (program ids, mint, relay); individual variables
//! override the preset where noted.

use rewards_chain::{ClaimableTokensAccounts, RewardManagerAccounts};
use rewards_types::ValidatorNode;
use solana_sdk::pubkey::Pubkey;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub use rewards_attestation::ATTESTATION_DEADLINE;

/// Deadline for one batch of claims
pub const BATCH_DEADLINE: Duration = Duration::from_secs(120);

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolanaEnv {
    Dev,
    Stage,
    Prod,
}

/// Program and account addresses of one deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolanaPreset {
    pub rpc_url: &'static str,
    pub relay_url: &'static str,
    pub mint: &'static str,
    pub reward_manager_program: &'static str,
    pub reward_manager_state: &'static str,
    pub reward_manager_lookup_table: &'static str,
    pub claimable_tokens_program: &'static str,
}

const DEV: SolanaPreset = SolanaPreset {
    rpc_url: "http://127.0.0.1:8899",
    relay_url: "http://audius-protocol-discovery-provider-1/solana/relay",
    mint: "37RCjhgV1qGV2Q54EHFScdxZ22ydRMdKMtVgod47fDP3",
    reward_manager_program: "testLsJKtyABc9UXJF8JWFKf1YH4LmqCWBC42c6akPb",
    reward_manager_state: "DJPzVothq58SmkpRb1ATn5ddN2Rpv1j2TcGvM3XsHf1c",
    reward_manager_lookup_table: "GNHKVSmHvoRBt1JJCxz7RSMfzDQGDGhGEjmhHyxb3K5J",
    claimable_tokens_program: "testHKV1B56fbvop4w6f2cTGEub9dRQ2Euta5VmqdX9",
};

const STAGE: SolanaPreset = SolanaPreset {
    rpc_url: "https://api.mainnet-beta.solana.com",
    relay_url: "https://discoveryprovider.staging.audius.co/solana/relay",
    mint: "BELGiMZQ34SDE6x2FUaML2UHDAgBLS64xvhXjX5tBBZo",
    reward_manager_program: "CDpzvz7DfgbF95jSSCHLX3ERkugyfgn9Fw8ypNZ1hfXp",
    reward_manager_state: "GaiG9LDYHfZGqeNaoGRzFEnLiwUT7WiC6sA6FDJX9ZPq",
    reward_manager_lookup_table: "ChFCWjeFxM6SRySTfT46zXn2K7m89TJsft4HWzEtkB4J",
    claimable_tokens_program: "2sjQNmUfkV6yKKi4dPR8gWRgtyma5aiymE3aXL2RAZww",
};

const PROD: SolanaPreset = SolanaPreset {
    rpc_url: "https://api.mainnet-beta.solana.com",
    relay_url: "https://discoveryprovider.audius.co/solana/relay",
    mint: "9LzCMqDgTKYz9Drzqnpgee3SGa89up3a247ypMj2xrqM",
    reward_manager_program: "DDZDcYdQFEMwcu2Mwo75yGFjJ1mUQyyXLWzhZLEVFcei",
    reward_manager_state: "71hWFVYokLaN1PNYzTAWi13EfJ7Xt9VbSWUKsXUT8mxE",
    reward_manager_lookup_table: "4UQwpGupH66RgQrWRqmPM9Two6VJEE68VZ7GeqZ3mvVv",
    claimable_tokens_program: "Ewkv3JahEFRKkcJmpoKB7pXbnUHwjAyXiwEo4ZY2rezQ",
};

impl SolanaEnv {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "dev" | "development" => Some(Self::Dev),
            "stage" | "staging" => Some(Self::Stage),
            "prod" | "production" => Some(Self::Prod),
            _ => None,
        }
    }

    pub fn preset(&self) -> &'static SolanaPreset {
        match self {
            Self::Dev => &DEV,
            Self::Stage => &STAGE,
            Self::Prod => &PROD,
        }
    }
}

/// Reward claimer configuration
#[derive(Debug, Clone)]
pub struct ClaimerConfig {
    pub env: SolanaEnv,

    /// HTTP server listen address
    pub listen_addr: SocketAddr,

    pub rpc_url: String,
    pub relay_url: String,

    /// Base58 fee payer keypairs
    pub fee_payer_keys: Vec<String>,

    /// Hex secp256k1 secret the validators expect claims signed with
    pub authority_key: Option<String>,

    pub oracles: Vec<String>,
    pub validators: Vec<ValidatorNode>,

    /// JSON reward catalog
    pub rewards_file: Option<PathBuf>,

    /// JSON undisbursed challenge rows
    pub challenges_file: Option<PathBuf>,

    /// Replace validators that fail instead of failing the claim
    pub replace_failed_validators: bool,

    pub attestation_deadline: Duration,
    pub batch_deadline: Duration,

    /// Log level
    pub log_level: String,
}

fn list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_pubkey(name: &str, value: &str) -> anyhow::Result<Pubkey> {
    Pubkey::from_str(value).map_err(|e| anyhow::anyhow!("Invalid {} {}: {}", name, value, e))
}

impl ClaimerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let env_name = std::env::var("CLAIMER_ENV").unwrap_or_else(|_| "dev".to_string());
        let env = SolanaEnv::parse(&env_name)
            .ok_or_else(|| anyhow::anyhow!("Invalid CLAIMER_ENV: {}", env_name))?;
        let preset = env.preset();

        let listen_addr = std::env::var("CLAIMER_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8090".to_string())
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid CLAIMER_LISTEN_ADDR: {}", e))?;

        let rpc_url = std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| preset.rpc_url.to_string());
        let relay_url = std::env::var("SOLANA_RELAY_URL").unwrap_or_else(|_| preset.relay_url.to_string());

        let fee_payer_keys = std::env::var("SOLANA_FEE_PAYER_KEYS")
            .map(|v| list(&v))
            .unwrap_or_default();

        let authority_key = std::env::var("CLAIMER_AUTHORITY_KEY").ok();

        let oracles = std::env::var("CLAIMER_ORACLES")
            .map(|v| list(&v))
            .unwrap_or_default();

        let validators = match std::env::var("CLAIMER_VALIDATORS") {
            Ok(value) => list(&value)
                .iter()
                .map(|entry| {
                    ValidatorNode::parse(entry)
                        .ok_or_else(|| anyhow::anyhow!("Invalid CLAIMER_VALIDATORS entry: {}", entry))
                })
                .collect::<anyhow::Result<Vec<_>>>()?,
            Err(_) => Vec::new(),
        };

        let rewards_file = std::env::var("CLAIMER_REWARDS_FILE").ok().map(PathBuf::from);
        let challenges_file = std::env::var("CLAIMER_CHALLENGES_FILE").ok().map(PathBuf::from);

        let replace_failed_validators = std::env::var("CLAIMER_REPLACE_FAILED_VALIDATORS")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            env,
            listen_addr,
            rpc_url,
            relay_url,
            fee_payer_keys,
            authority_key,
            oracles,
            validators,
            rewards_file,
            challenges_file,
            replace_failed_validators,
            attestation_deadline: ATTESTATION_DEADLINE,
            batch_deadline: BATCH_DEADLINE,
            log_level,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.fee_payer_keys.is_empty() {
            anyhow::bail!("At least one fee payer key is required (SOLANA_FEE_PAYER_KEYS)");
        }
        if self.authority_key.is_none() {
            anyhow::bail!("Authority key is required (CLAIMER_AUTHORITY_KEY)");
        }
        if self.oracles.is_empty() {
            anyhow::bail!("At least one anti-abuse oracle is required (CLAIMER_ORACLES)");
        }
        if self.validators.is_empty() {
            anyhow::bail!("At least one validator is required (CLAIMER_VALIDATORS)");
        }
        if self.rewards_file.is_none() {
            anyhow::bail!("Reward catalog is required (CLAIMER_REWARDS_FILE)");
        }
        self.reward_manager_accounts()?;
        self.claimable_tokens_accounts()?;
        Ok(())
    }

    pub fn reward_manager_accounts(&self) -> anyhow::Result<RewardManagerAccounts> {
        let preset = self.env.preset();
        Ok(RewardManagerAccounts {
            program_id: parse_pubkey("reward manager program", preset.reward_manager_program)?,
            state: parse_pubkey("reward manager state", preset.reward_manager_state)?,
            lookup_table: parse_pubkey("lookup table", preset.reward_manager_lookup_table)?,
        })
    }

    pub fn claimable_tokens_accounts(&self) -> anyhow::Result<ClaimableTokensAccounts> {
        let preset = self.env.preset();
        Ok(ClaimableTokensAccounts {
            program_id: parse_pubkey("claimable tokens program", preset.claimable_tokens_program)?,
            mint: parse_pubkey("mint", preset.mint)?,
        })
    }
}

impl Default for ClaimerConfig {
    fn default() -> Self {
        let preset = SolanaEnv::Dev.preset();
        Self {
            env: SolanaEnv::Dev,
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8090)),
            rpc_url: preset.rpc_url.to_string(),
            relay_url: preset.relay_url.to_string(),
            fee_payer_keys: Vec::new(),
            authority_key: None,
            oracles: Vec::new(),
            validators: Vec::new(),
            rewards_file: None,
            challenges_file: None,
            replace_failed_validators: false,
            attestation_deadline: ATTESTATION_DEADLINE,
            batch_deadline: BATCH_DEADLINE,
            log_level: "info".to_string(),
        }
    }
}
