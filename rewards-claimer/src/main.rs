//! Rewards Claimer - Main entry point
//!
//! Serves the claim API:
//! - Loads undisbursed challenge rows for a user
//! - Gathers oracle and validator attestations per reward
//! - Assembles, signs and relays the claim transactions

use rewards_claimer::{create_router, ClaimerConfig, ClaimerService};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ClaimerConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("╔════════════════════════════════════════════════════════════╗");
    info!("║              Rewards Claimer Starting                      ║");
    info!("╠════════════════════════════════════════════════════════════╣");
    info!("║  Environment:  {:^44} ║", format!("{:?}", config.env));
    info!("║  Listen Addr:  {:^44} ║", config.listen_addr);
    info!("║  RPC URL:      {:^44} ║", config.rpc_url);
    info!("║  Relay URL:    {:^44} ║", config.relay_url);
    info!("║  Oracles:      {:^44} ║", config.oracles.len());
    info!("║  Validators:   {:^44} ║", config.validators.len());
    info!("║  Replacement:  {:^44} ║", config.replace_failed_validators);
    info!("╚════════════════════════════════════════════════════════════╝");

    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e);
    }

    let service = match ClaimerService::from_config(&config) {
        Ok(service) => {
            info!("✓ Claim pipeline initialized");
            info!("  Authority Address: {}", service.signer_address());
            Arc::new(service)
        }
        Err(e) => {
            error!("Failed to initialize claim pipeline: {}", e);
            return Err(e);
        }
    };

    let app = create_router(service);

    info!("╔════════════════════════════════════════════════════════════╗");
    info!("║              Claimer API Ready                             ║");
    info!("╠════════════════════════════════════════════════════════════╣");
    info!("║    POST /v1/claim_rewards                                  ║");
    info!("║    GET  /health_check                                      ║");
    info!("╚════════════════════════════════════════════════════════════╝");

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Listening on {}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
