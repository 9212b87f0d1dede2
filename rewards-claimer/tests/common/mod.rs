//! In-process deployment: oracle, validators and relay over HTTP, chain in memory

#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use parking_lot::Mutex;
use rewards_attestation::EthClaimSigner;
use rewards_chain::mock::{encode_lookup_table, encode_reward_manager_state, MockChainReader};
use rewards_chain::RewardManagerState;
use rewards_claimer::{ClaimerConfig, ClaimerService, InMemoryChallengeStore, ServiceParts, SolanaEnv};
use rewards_types::{seeded_rng, Reward, RewardCatalog, UndisbursedChallenge, ValidatorNode};
use serde_json::{json, Value};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::transaction::VersionedTransaction;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const USER_ID: &str = "7eP5n";
pub const WALLET: &str = "0xa507da823bf0c5dc44a759d0d398b7f52097da19";
pub const ORACLE_ADDRESS: &str = "0x00b6462e955da5841b6d9e1e2529b830f00f31bf";
pub const AUTHORITY_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

pub async fn serve(router: Router) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind local server");
    let addr = listener.local_addr().expect("read addr");
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    (format!("http://{}", addr), handle)
}

pub fn operator(byte: u8) -> String {
    format!("0x{}", hex_byte(byte).repeat(20))
}

fn hex_byte(byte: u8) -> String {
    format!("{:02x}", byte)
}

#[derive(Clone)]
struct ValidatorState {
    owner: String,
    reject_specifier: Option<String>,
    delay: Duration,
    hits: Arc<AtomicUsize>,
}

async fn validator_attestation(
    State(state): State<ValidatorState>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(state.delay).await;
    let specifier = query.get("specifier").cloned().unwrap_or_default();
    if state.reject_specifier.as_deref() == Some(specifier.as_str()) {
        return (
            StatusCode::BAD_REQUEST,
            json!({ "error": "unhappy validator" }).to_string(),
        );
    }
    let signature = format!("0x{}", "ab".repeat(65));
    (
        StatusCode::OK,
        json!({ "attestation": signature, "owner": state.owner }).to_string(),
    )
}

pub struct TestValidator {
    pub node: ValidatorNode,
    pub hits: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl TestValidator {
    pub async fn start(owner: &str, reject_specifier: Option<&str>, delay: Duration) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let state = ValidatorState {
            owner: owner.to_string(),
            reject_specifier: reject_specifier.map(str::to_string),
            delay,
            hits: hits.clone(),
        };
        let router = Router::new()
            .route("/core/rewards/attestation", get(validator_attestation))
            .with_state(state);
        let (url, handle) = serve(router).await;
        Self {
            node: ValidatorNode::new(url, owner),
            hits,
            handle,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for TestValidator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub struct TestOracle {
    pub url: String,
    pub attestations: Arc<AtomicUsize>,
    pub health_checks: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl TestOracle {
    pub async fn start() -> Self {
        let attestations = Arc::new(AtomicUsize::new(0));
        let health_checks = Arc::new(AtomicUsize::new(0));
        let counter = attestations.clone();
        let health_counter = health_checks.clone();
        let router = Router::new()
            .route(
                "/attestation/:handle",
                post(move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Json(json!({ "result": "aabbccdd".repeat(8) }))
                    }
                }),
            )
            .route(
                "/health_check",
                get(move || {
                    let health_counter = health_counter.clone();
                    async move {
                        health_counter.fetch_add(1, Ordering::SeqCst);
                        Json(json!({ "AntiAbuseWalletPubkey": ORACLE_ADDRESS }))
                    }
                }),
            );
        let (url, handle) = serve(router).await;
        Self {
            url,
            attestations,
            health_checks,
            handle,
        }
    }

    pub fn attestations(&self) -> usize {
        self.attestations.load(Ordering::SeqCst)
    }

    pub fn health_checks(&self) -> usize {
        self.health_checks.load(Ordering::SeqCst)
    }
}

impl Drop for TestOracle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Relay that records every transaction and answers with a numbered signature
pub struct TestRelay {
    pub url: String,
    pub transactions: Arc<Mutex<Vec<String>>>,
    handle: JoinHandle<()>,
}

impl TestRelay {
    pub async fn start(reject: bool) -> Self {
        let transactions = Arc::new(Mutex::new(Vec::new()));
        let sink = transactions.clone();
        let router = Router::new().route(
            "/solana/relay",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    if reject {
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            json!({ "error": "custom program error: 0x3" }).to_string(),
                        );
                    }
                    let mut sink = sink.lock();
                    sink.push(body["transaction"].as_str().unwrap_or_default().to_string());
                    (
                        StatusCode::OK,
                        json!({ "signature": format!("sig{}", sink.len()) }).to_string(),
                    )
                }
            }),
        );
        let (url, handle) = serve(router).await;
        Self {
            url: format!("{}/solana/relay", url),
            transactions,
            handle,
        }
    }

    pub fn count(&self) -> usize {
        self.transactions.lock().len()
    }

    pub fn decoded(&self) -> Vec<VersionedTransaction> {
        self.transactions
            .lock()
            .iter()
            .map(|encoded| {
                let bytes = STANDARD.decode(encoded).expect("base64 transaction");
                bincode::deserialize(&bytes).expect("bincode transaction")
            })
            .collect()
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn row(challenge_id: &str, specifier: &str) -> UndisbursedChallenge {
    UndisbursedChallenge {
        user_id: USER_ID.to_string(),
        challenge_id: challenge_id.to_string(),
        specifier: specifier.to_string(),
        handle: "alice".to_string(),
        wallet: WALLET.to_string(),
    }
}

pub fn catalog() -> RewardCatalog {
    RewardCatalog::new(vec![
        Reward {
            reward_id: "b".to_string(),
            amount: 1,
            name: Some("profile completion".to_string()),
        },
        Reward {
            reward_id: "c".to_string(),
            amount: 2,
            name: None,
        },
    ])
}

pub struct Deployment {
    pub reader: Arc<MockChainReader>,
    pub service: Arc<ClaimerService>,
    pub config: ClaimerConfig,
}

/// Wire a claimer against the given parties with `min_votes` required votes
pub fn deploy(
    oracle: &TestOracle,
    validators: &[&TestValidator],
    relay: &TestRelay,
    rows: Vec<UndisbursedChallenge>,
    min_votes: u8,
    replace_failed_validators: bool,
) -> Deployment {
    let config = ClaimerConfig {
        env: SolanaEnv::Dev,
        relay_url: relay.url.clone(),
        fee_payer_keys: vec![Keypair::new().to_base58_string(), Keypair::new().to_base58_string()],
        authority_key: Some(AUTHORITY_KEY.to_string()),
        oracles: vec![oracle.url.clone()],
        validators: validators.iter().map(|v| v.node.clone()).collect(),
        replace_failed_validators,
        attestation_deadline: Duration::from_secs(5),
        batch_deadline: Duration::from_secs(20),
        ..ClaimerConfig::default()
    };

    let accounts = config.reward_manager_accounts().unwrap();
    let reader = Arc::new(MockChainReader::new().with_slot(4242));
    reader.set_account(
        accounts.state,
        encode_reward_manager_state(&RewardManagerState {
            version: 1,
            token_account: Pubkey::new_unique(),
            manager: Pubkey::new_unique(),
            min_votes,
        }),
    );
    reader.set_account(
        accounts.lookup_table,
        encode_lookup_table(&[solana_sdk::sysvar::rent::ID, solana_sdk::system_program::ID]),
    );

    let service = ClaimerService::assemble(
        &config,
        ServiceParts {
            reader: reader.clone(),
            store: Arc::new(InMemoryChallengeStore::new(rows)),
            catalog: catalog(),
            signer: Arc::new(EthClaimSigner::from_hex(AUTHORITY_KEY).unwrap()),
            rng: seeded_rng(17),
        },
    )
    .unwrap();

    Deployment {
        reader,
        service: Arc::new(service),
        config,
    }
}

/// Wait until `check` holds, for at most `timeout`
pub async fn eventually(timeout: Duration, check: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
