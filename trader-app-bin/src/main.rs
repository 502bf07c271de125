//! Frontend entrypoint: bring up a development chain with a deployed
//! trader contract and serve the HTTP API against it.
//!
//! The chain is in-memory, so every run deploys fresh; the registry-based
//! deployment flow with real contract artifacts lives in `trader-deploy`.

use std::sync::Arc;

use trader_http_api::{TraderApiState, build_router};
use trader_runtime::client::dev::{DevChainClient, DevSigner, dev_account};
use trader_runtime::client::{ChainClient, Signer};
use trader_runtime::{AccountId, CallBuilder, Ticker, TxClient};

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

fn env_account(var: &str, default_seed: u8) -> AccountId {
    std::env::var(var)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_else(|| dev_account(default_seed))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_log();

    let chain = Arc::new(DevChainClient::new());
    let admin = DevSigner::new(env_account("DEPLOYER", 1));

    let ticker_raw = std::env::var("TICKER").unwrap_or_else(|_| "NFTSZN2024".into());
    let ticker = Ticker::new(&ticker_raw)?;
    let contract = chain
        .deploy(&admin, &[], &CallBuilder::constructor(&ticker))
        .await?;
    chain.create_child_identity(&admin, &contract).await?;
    let txs = TxClient::new(chain.clone(), contract);
    let init = txs.init(&admin).await?;
    if !init.succeeded() {
        tracing::warn!(%contract, "Contract deployed but not initialized");
    }
    tracing::info!(%contract, ticker = %ticker, "Contract ready");

    // The wallet the API signs with; give it an identity so portfolio
    // operations work out of the box.
    let wallet = Arc::new(DevSigner::new(env_account("WALLET", 2)));
    chain.register_identity(&wallet.account());

    let api_token = std::env::var("API_TOKEN").unwrap_or_else(|_| "dev-token".into());
    let state = TraderApiState::new(chain, contract, wallet, api_token);
    state.store.refresh().await?;
    let router = build_router(state);

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()
        .unwrap_or(8080);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!("Trader HTTP API listening on port {port}");
    axum::serve(listener, router).await?;
    Ok(())
}
