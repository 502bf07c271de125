//! Contract deployment sequence.
//!
//! Deploy runs three chain steps in order: upload the code with its
//! constructor call, move the new contract under a child identity of the
//! deployer, then initialize it. The first two are fatal on failure; a
//! failed initializer leaves a usable, addressable contract behind, so it
//! is reported as [`DeployOutcome::DeployedUninitialized`] and the address
//! registry is written regardless.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calls::CallBuilder;
use crate::client::{ChainClient, Signer};
use crate::error::TraderError;
use crate::tx::TxClient;
use crate::types::{AccountId, Ticker};

/// Contract name used for artifact files and registry entries.
pub const CONTRACT_NAME: &str = "nft_trader";

const DEFAULT_TICKER: &str = "NFTSZN2024";

/// Deployment settings, read from the environment.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Directory holding `{name}.wasm`, `{name}.json` and the registry.
    pub artifacts_dir: PathBuf,
    /// Network key the deployed address is registered under.
    pub network: String,
    /// Collection ticker passed to the constructor.
    pub ticker: Ticker,
}

impl DeployConfig {
    /// `DIR` (default `./deployments`), `CHAIN` (default `development`),
    /// `TICKER` (default `NFTSZN2024`).
    pub fn from_env() -> Result<Self, TraderError> {
        let artifacts_dir = std::env::var("DIR").unwrap_or_else(|_| "./deployments".into());
        let network = std::env::var("CHAIN").unwrap_or_else(|_| "development".into());
        let ticker = match std::env::var("TICKER") {
            Ok(s) => Ticker::new(&s)
                .map_err(|e| TraderError::Config(format!("bad TICKER value: {e}")))?,
            Err(_) => Ticker::new(DEFAULT_TICKER)
                .map_err(|e| TraderError::Config(e.to_string()))?,
        };
        Ok(DeployConfig {
            artifacts_dir: PathBuf::from(artifacts_dir),
            network,
            ticker,
        })
    }

    pub fn registry_path(&self) -> PathBuf {
        self.artifacts_dir.join("addresses.json")
    }
}

/// Compiled contract artifacts: code blob plus metadata.
#[derive(Debug, Clone)]
pub struct ContractArtifacts {
    pub code: Vec<u8>,
    pub metadata: serde_json::Value,
}

impl ContractArtifacts {
    /// Load `{name}.wasm` and `{name}.json` from `dir`.
    pub fn load(dir: &Path, name: &str) -> Result<Self, TraderError> {
        let wasm_path = dir.join(format!("{name}.wasm"));
        let code = fs::read(&wasm_path).map_err(|e| {
            TraderError::Artifacts(format!("reading {}: {e}", wasm_path.display()))
        })?;
        let meta_path = dir.join(format!("{name}.json"));
        let raw = fs::read_to_string(&meta_path).map_err(|e| {
            TraderError::Artifacts(format!("reading {}: {e}", meta_path.display()))
        })?;
        let metadata = serde_json::from_str(&raw).map_err(|e| {
            TraderError::Artifacts(format!("parsing {}: {e}", meta_path.display()))
        })?;
        Ok(ContractArtifacts { code, metadata })
    }
}

/// Deployed contract addresses, keyed by network then contract name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressRegistry {
    #[serde(flatten)]
    networks: BTreeMap<String, BTreeMap<String, String>>,
}

impl AddressRegistry {
    /// Load the registry, or start an empty one if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self, TraderError> {
        match fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| TraderError::Registry(format!("parsing {}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(TraderError::Registry(format!(
                "reading {}: {e}",
                path.display()
            ))),
        }
    }

    pub fn set(&mut self, network: &str, name: &str, address: AccountId) {
        self.networks
            .entry(network.to_string())
            .or_default()
            .insert(name.to_string(), address.to_string());
    }

    pub fn get(&self, network: &str, name: &str) -> Result<Option<AccountId>, TraderError> {
        match self.networks.get(network).and_then(|n| n.get(name)) {
            Some(raw) => raw.parse().map(Some).map_err(|e: TraderError| {
                TraderError::Registry(format!("bad address for {network}/{name}: {e}"))
            }),
            None => Ok(None),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), TraderError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                TraderError::Registry(format!("creating {}: {e}", parent.display()))
            })?;
        }
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| TraderError::Registry(e.to_string()))?;
        fs::write(path, raw)
            .map_err(|e| TraderError::Registry(format!("writing {}: {e}", path.display())))
    }
}

/// How far the deployment sequence got.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Deployed, owned by its child identity, and open for trading.
    Initialized { address: AccountId },
    /// Deployed and addressable, but the initializer failed. The contract
    /// can be initialized later by the admin.
    DeployedUninitialized { address: AccountId, reason: String },
}

impl DeployOutcome {
    pub fn address(&self) -> AccountId {
        match self {
            DeployOutcome::Initialized { address }
            | DeployOutcome::DeployedUninitialized { address, .. } => *address,
        }
    }
}

/// Run the full deployment sequence and record the address.
pub async fn run_deploy(
    client: Arc<dyn ChainClient>,
    signer: &dyn Signer,
    config: &DeployConfig,
) -> Result<DeployOutcome, TraderError> {
    let artifacts = ContractArtifacts::load(&config.artifacts_dir, CONTRACT_NAME)?;
    info!(
        network = %config.network,
        code_bytes = artifacts.code.len(),
        "deploying {CONTRACT_NAME}"
    );

    let constructor = CallBuilder::constructor(&config.ticker);
    let address = client.deploy(signer, &artifacts.code, &constructor).await?;
    info!(%address, "contract deployed");

    client.create_child_identity(signer, &address).await?;
    info!(%address, "contract moved under child identity");

    // Initialization failure is not fatal: the contract exists and the
    // admin can retry init later.
    let txs = TxClient::new(Arc::clone(&client), address);
    let outcome = match txs.init(signer).await {
        Ok(outcome) if outcome.succeeded() => {
            info!(%address, "contract initialized and open");
            DeployOutcome::Initialized { address }
        }
        Ok(outcome) => {
            let reason = match outcome.outcome {
                Err(domain) => domain.to_string(),
                Ok(()) => "initializer outcome unknown".to_string(),
            };
            warn!(%address, %reason, "contract deployed but not initialized");
            DeployOutcome::DeployedUninitialized { address, reason }
        }
        Err(err) => {
            warn!(%address, error = %err, "contract deployed but initializer errored");
            DeployOutcome::DeployedUninitialized {
                address,
                reason: err.to_string(),
            }
        }
    };

    let registry_path = config.registry_path();
    let mut registry = AddressRegistry::load_or_default(&registry_path)?;
    registry.set(&config.network, CONTRACT_NAME, address);
    registry.save(&registry_path)?;
    info!(path = %registry_path.display(), "address registry updated");

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifacts_require_both_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("nft_trader.wasm"), b"\0asm").unwrap();

        // Metadata missing.
        let err = ContractArtifacts::load(dir.path(), CONTRACT_NAME).unwrap_err();
        assert!(matches!(err, TraderError::Artifacts(_)));

        fs::write(dir.path().join("nft_trader.json"), r#"{"spec":{}}"#).unwrap();
        let artifacts = ContractArtifacts::load(dir.path(), CONTRACT_NAME).unwrap();
        assert_eq!(artifacts.code, b"\0asm");
    }

    #[test]
    fn test_registry_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("addresses.json");

        let mut registry = AddressRegistry::load_or_default(&path).unwrap();
        assert!(registry.get("development", CONTRACT_NAME).unwrap().is_none());

        let address = AccountId([0xc0; 32]);
        registry.set("development", CONTRACT_NAME, address);
        registry.save(&path).unwrap();

        let reloaded = AddressRegistry::load_or_default(&path).unwrap();
        assert_eq!(
            reloaded.get("development", CONTRACT_NAME).unwrap(),
            Some(address)
        );
        assert!(reloaded.get("mainnet", CONTRACT_NAME).unwrap().is_none());
    }

    #[test]
    fn test_registry_keeps_other_networks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("addresses.json");

        let mut registry = AddressRegistry::default();
        registry.set("staging", CONTRACT_NAME, AccountId([1u8; 32]));
        registry.save(&path).unwrap();

        let mut registry = AddressRegistry::load_or_default(&path).unwrap();
        registry.set("development", CONTRACT_NAME, AccountId([2u8; 32]));
        registry.save(&path).unwrap();

        let reloaded = AddressRegistry::load_or_default(&path).unwrap();
        assert_eq!(
            reloaded.get("staging", CONTRACT_NAME).unwrap(),
            Some(AccountId([1u8; 32]))
        );
        assert_eq!(
            reloaded.get("development", CONTRACT_NAME).unwrap(),
            Some(AccountId([2u8; 32]))
        );
    }

    #[test]
    fn test_corrupt_registry_is_an_error_not_a_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("addresses.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            AddressRegistry::load_or_default(&path),
            Err(TraderError::Registry(_))
        ));
    }
}
