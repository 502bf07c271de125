//! Deployment entrypoint: deploy, attach a child identity, initialize,
//! and record the address in the registry.
//!
//! Exits 0 whenever the contract is deployed and registered, even if the
//! initializer failed (the admin can initialize later). Exits 1 only when
//! no usable contract came out of the run.

use std::process::ExitCode;
use std::sync::Arc;

use trader_runtime::AccountId;
use trader_runtime::client::dev::{DevChainClient, DevSigner, dev_account};
use trader_runtime::deploy::{DeployConfig, DeployOutcome, run_deploy};

fn setup_log() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};
    if tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .is_err()
    {}
}

fn deployer_account() -> AccountId {
    std::env::var("DEPLOYER")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_else(|| dev_account(1))
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_log();

    let config = match DeployConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Bad deployment configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        network = %config.network,
        dir = %config.artifacts_dir.display(),
        "Deploying nft_trader"
    );

    let chain = Arc::new(DevChainClient::new());
    let signer = DevSigner::new(deployer_account());

    match run_deploy(chain, &signer, &config).await {
        Ok(DeployOutcome::Initialized { address }) => {
            tracing::info!("Deployed and initialized at {address}");
            ExitCode::SUCCESS
        }
        Ok(DeployOutcome::DeployedUninitialized { address, reason }) => {
            tracing::warn!("Deployed at {address} but not initialized: {reason}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Deployment failed: {e}");
            ExitCode::FAILURE
        }
    }
}
