//! In-process oracle and validator servers

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const ORACLE_ADDRESS: &str = "0x00b6462e955da5841b6d9e1e2529b830f00f31bf";

pub async fn serve(router: Router) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind local server");
    let addr = listener.local_addr().expect("read addr");
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    (format!("http://{}", addr), handle)
}

#[derive(Clone, Default)]
pub struct Recorder {
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl Recorder {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().clone()
    }

    fn record(&self, request: Value) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request);
    }
}

#[derive(Clone)]
enum Behavior {
    Attest { owner: String, signature: String },
    Reject { status: StatusCode, body: String },
}

#[derive(Clone)]
struct ValidatorState {
    behavior: Behavior,
    delay: Duration,
    recorder: Recorder,
}

async fn validator_attestation(
    State(state): State<ValidatorState>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    state.recorder.record(json!(query));
    tokio::time::sleep(state.delay).await;
    match state.behavior {
        Behavior::Attest { owner, signature } => (
            StatusCode::OK,
            json!({ "attestation": signature, "owner": owner }).to_string(),
        ),
        Behavior::Reject { status, body } => (status, body),
    }
}

pub struct MockValidator {
    pub url: String,
    pub recorder: Recorder,
    handle: JoinHandle<()>,
}

impl MockValidator {
    pub async fn attesting(owner: &str, signature: &str, delay: Duration) -> Self {
        Self::start(
            Behavior::Attest {
                owner: owner.to_string(),
                signature: signature.to_string(),
            },
            delay,
        )
        .await
    }

    pub async fn rejecting(status: StatusCode, body: &str) -> Self {
        Self::start(
            Behavior::Reject {
                status,
                body: body.to_string(),
            },
            Duration::ZERO,
        )
        .await
    }

    async fn start(behavior: Behavior, delay: Duration) -> Self {
        let recorder = Recorder::default();
        let state = ValidatorState {
            behavior,
            delay,
            recorder: recorder.clone(),
        };
        let router = Router::new()
            .route("/core/rewards/attestation", get(validator_attestation))
            .with_state(state);
        let (url, handle) = serve(router).await;
        Self { url, recorder, handle }
    }

    pub fn hits(&self) -> usize {
        self.recorder.hits()
    }
}

impl Drop for MockValidator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Clone)]
struct OracleState {
    signature: Option<String>,
    delay: Duration,
    attestations: Recorder,
    health_checks: Recorder,
    health_failures: Arc<AtomicUsize>,
}

async fn oracle_attestation(
    State(state): State<OracleState>,
    Path(handle): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    state.attestations.record(json!({ "handle": handle, "body": body }));
    tokio::time::sleep(state.delay).await;
    match state.signature {
        Some(signature) => (StatusCode::OK, json!({ "result": signature }).to_string()),
        None => (StatusCode::FORBIDDEN, json!({ "error": "user is not eligible" }).to_string()),
    }
}

async fn oracle_health(State(state): State<OracleState>) -> (StatusCode, String) {
    state.health_checks.record(Value::Null);
    let failing = state
        .health_failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return (StatusCode::SERVICE_UNAVAILABLE, json!({ "healthy": false }).to_string());
    }
    (
        StatusCode::OK,
        json!({ "AntiAbuseWalletPubkey": ORACLE_ADDRESS, "healthy": true }).to_string(),
    )
}

pub struct MockOracle {
    pub url: String,
    pub attestations: Recorder,
    pub health_checks: Recorder,
    handle: JoinHandle<()>,
}

impl MockOracle {
    pub async fn attesting(signature: &str) -> Self {
        Self::start(Some(signature.to_string()), Duration::ZERO, 0).await
    }

    pub async fn slow(signature: &str, delay: Duration) -> Self {
        Self::start(Some(signature.to_string()), delay, 0).await
    }

    pub async fn refusing() -> Self {
        Self::start(None, Duration::ZERO, 0).await
    }

    /// Oracle whose first `failures` health checks answer 503
    pub async fn unhealthy_at_first(signature: &str, failures: usize) -> Self {
        Self::start(Some(signature.to_string()), Duration::ZERO, failures).await
    }

    async fn start(signature: Option<String>, delay: Duration, health_failures: usize) -> Self {
        let attestations = Recorder::default();
        let health_checks = Recorder::default();
        let state = OracleState {
            signature,
            delay,
            attestations: attestations.clone(),
            health_checks: health_checks.clone(),
            health_failures: Arc::new(AtomicUsize::new(health_failures)),
        };
        let router = Router::new()
            .route("/attestation/:handle", post(oracle_attestation))
            .route("/health_check", get(oracle_health))
            .with_state(state);
        let (url, handle) = serve(router).await;
        Self {
            url,
            attestations,
            health_checks,
            handle,
        }
    }
}

impl Drop for MockOracle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
