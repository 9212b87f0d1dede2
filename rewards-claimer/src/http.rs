//! HTTP API
//!
//! - `POST /v1/claim_rewards` claims a user's undisbursed rewards
//! - `GET /health_check` reports chain reachability and configured parties

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::error::{ClaimError, ErrorClass};
use crate::service::{ClaimerService, HealthStatus};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRewardsRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub challenge_id: Option<String>,
    #[serde(default)]
    pub specifier: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimRewardsResponse {
    pub data: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A claim error rendered as an HTTP response
pub struct ApiError(pub ClaimError);

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        Self(err)
    }
}

pub fn status_for(err: &ClaimError) -> StatusCode {
    match err.class() {
        ErrorClass::Input => StatusCode::BAD_REQUEST,
        ErrorClass::Remote => StatusCode::BAD_GATEWAY,
        ErrorClass::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Create the claimer API router
pub fn create_router(service: Arc<ClaimerService>) -> Router {
    Router::new()
        .route("/v1/claim_rewards", post(claim_rewards))
        .route("/health_check", get(health_check))
        .with_state(service)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// POST /v1/claim_rewards
pub async fn claim_rewards(
    State(service): State<Arc<ClaimerService>>,
    Json(request): Json<ClaimRewardsRequest>,
) -> Result<Json<ClaimRewardsResponse>, ApiError> {
    info!(
        user_id = %request.user_id,
        challenge_id = ?request.challenge_id,
        specifier = ?request.specifier,
        "POST /v1/claim_rewards"
    );

    let data = service
        .coordinator()
        .claim_all(
            &request.user_id,
            non_empty(&request.challenge_id),
            non_empty(&request.specifier),
        )
        .await
        .map_err(|e| {
            error!(user_id = %request.user_id, error = %e, "Claim rewards failed");
            ApiError(e)
        })?;

    Ok(Json(ClaimRewardsResponse { data }))
}

/// GET /health_check
pub async fn health_check(State(service): State<Arc<ClaimerService>>) -> Json<HealthStatus> {
    Json(service.health().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewards_attestation::AttestationError;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&ClaimError::MissingUserId), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&ClaimError::NoRewardsToClaim), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&ClaimError::BatchTimeout(Duration::from_secs(120))),
            StatusCode::GATEWAY_TIMEOUT
        );
        let rejected = AttestationError::OracleRejected {
            endpoint: "http://oracle".to_string(),
            status: 403,
            body: "nope".to_string(),
        };
        assert_eq!(status_for(&ClaimError::Attestation(rejected)), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(&ClaimError::Store("disk".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_empty_filters_are_ignored() {
        assert_eq!(non_empty(&Some(" ".to_string())), None);
        assert_eq!(non_empty(&None), None);
        assert_eq!(non_empty(&Some("b".to_string())), Some("b"));
    }
}
