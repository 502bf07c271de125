//! Deployment sequence tests against the in-memory development chain.

use std::fs;
use std::sync::Arc;

use trader_runtime::client::dev::{DevChainClient, DevSigner, dev_account};
use trader_runtime::deploy::{
    AddressRegistry, CONTRACT_NAME, DeployConfig, DeployOutcome, run_deploy,
};
use trader_runtime::error::ContractError;
use trader_runtime::{QueryClient, Ticker, TraderError};

fn config_in(dir: &std::path::Path) -> DeployConfig {
    DeployConfig {
        artifacts_dir: dir.to_path_buf(),
        network: "development".to_string(),
        ticker: Ticker::new("NFTSZN2024").unwrap(),
    }
}

fn write_artifacts(dir: &std::path::Path) {
    fs::write(dir.join("nft_trader.wasm"), b"\0asm test blob").unwrap();
    fs::write(dir.join("nft_trader.json"), r#"{"spec":{"constructors":[]}}"#).unwrap();
}

#[tokio::test]
async fn test_full_deploy_sequence() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    let config = config_in(dir.path());

    let chain = Arc::new(DevChainClient::new());
    let deployer = DevSigner::new(dev_account(1));
    let outcome = run_deploy(chain.clone(), &deployer, &config).await.unwrap();

    let address = match outcome {
        DeployOutcome::Initialized { address } => address,
        other => panic!("expected initialized deployment, got {other:?}"),
    };

    // Registered under the network key.
    let registry = AddressRegistry::load_or_default(&config.registry_path()).unwrap();
    assert_eq!(
        registry.get("development", CONTRACT_NAME).unwrap(),
        Some(address)
    );

    // The deployed contract is open and carries the configured ticker.
    let queries = QueryClient::new(chain, address, dev_account(1));
    assert_eq!(queries.is_open().await.unwrap(), Ok(true));
    let ticker = queries.ticker().await.unwrap().unwrap();
    assert_eq!(ticker.as_display().as_deref(), Some("NFTSZN2024"));
}

#[tokio::test]
async fn test_failed_initializer_still_registers_the_address() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    let config = config_in(dir.path());

    let chain = Arc::new(DevChainClient::new());
    chain.fail_next(
        trader_runtime::abi::Method::Init,
        ContractError::Runtime(trader_runtime::error::RuntimeError::MissingIdentity),
    );

    let deployer = DevSigner::new(dev_account(1));
    let outcome = run_deploy(chain.clone(), &deployer, &config).await.unwrap();

    let address = match outcome {
        DeployOutcome::DeployedUninitialized { address, reason } => {
            assert!(!reason.is_empty());
            address
        }
        other => panic!("expected uninitialized deployment, got {other:?}"),
    };

    // The address is still recorded: the contract exists and the admin can
    // initialize it later.
    let registry = AddressRegistry::load_or_default(&config.registry_path()).unwrap();
    assert_eq!(
        registry.get("development", CONTRACT_NAME).unwrap(),
        Some(address)
    );

    let queries = QueryClient::new(chain, address, dev_account(1));
    assert_eq!(
        queries.is_open().await.unwrap(),
        Err(ContractError::NotInitialized)
    );
}

#[tokio::test]
async fn test_rejected_signer_aborts_before_registering() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    let config = config_in(dir.path());

    let chain = Arc::new(DevChainClient::new());
    let deployer = DevSigner::rejecting(dev_account(1));
    let err = run_deploy(chain, &deployer, &config).await.unwrap_err();
    assert!(matches!(err, TraderError::SigningRejected(_)));
    assert!(!config.registry_path().exists());
}

#[tokio::test]
async fn test_missing_artifacts_fail_before_any_chain_step() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());

    let chain = Arc::new(DevChainClient::new());
    let deployer = DevSigner::new(dev_account(1));
    let err = run_deploy(chain, &deployer, &config).await.unwrap_err();
    assert!(matches!(err, TraderError::Artifacts(_)));
}

#[tokio::test]
async fn test_redeploy_overwrites_the_network_entry() {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path());
    let config = config_in(dir.path());

    let chain = Arc::new(DevChainClient::new());
    let deployer = DevSigner::new(dev_account(1));
    let first = run_deploy(chain.clone(), &deployer, &config).await.unwrap();
    let second = run_deploy(chain, &deployer, &config).await.unwrap();
    assert_ne!(first.address(), second.address());

    let registry = AddressRegistry::load_or_default(&config.registry_path()).unwrap();
    assert_eq!(
        registry.get("development", CONTRACT_NAME).unwrap(),
        Some(second.address())
    );
}
