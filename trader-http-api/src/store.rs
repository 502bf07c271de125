//! Cached view of the contract for the frontend.
//!
//! The store holds the last known contract info and the price board.
//! Updates come from two places: an explicit refresh (on demand from the
//! API) and the contract event stream, which patches the price board
//! incrementally. Portfolio views are never cached; they are caller-scoped
//! and always queried live.

use std::collections::BTreeMap;

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use trader_runtime::abi::ContractEvent;
use trader_runtime::events::EventDispatcher;
use trader_runtime::{
    AccountId, Balance, IdentityId, NftId, NftPrice, QueryClient, TraderError, VenueId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Uninitialized,
    Open,
    Closed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContractInfo {
    pub address: AccountId,
    /// Display form of the collection ticker, when it has one.
    pub ticker: Option<String>,
    pub status: ContractStatus,
    pub venue: Option<VenueId>,
    pub did: Option<IdentityId>,
    pub admin: Option<AccountId>,
}

pub struct ContractStore {
    queries: QueryClient,
    info: RwLock<Option<ContractInfo>>,
    prices: RwLock<BTreeMap<NftId, Balance>>,
}

impl ContractStore {
    pub fn new(queries: QueryClient) -> Self {
        ContractStore {
            queries,
            info: RwLock::new(None),
            prices: RwLock::new(BTreeMap::new()),
        }
    }

    /// Re-query everything from chain state.
    pub async fn refresh(&self) -> Result<ContractInfo, TraderError> {
        let status = match self.queries.is_open().await? {
            Ok(true) => ContractStatus::Open,
            Ok(false) => ContractStatus::Closed,
            Err(_) => ContractStatus::Uninitialized,
        };
        let ticker = self
            .queries
            .ticker()
            .await?
            .ok()
            .and_then(|t| t.as_display());
        // Venue and identity only exist once initialized.
        let venue = self.queries.venue().await?.ok();
        let did = self.queries.contract_did().await?.ok();
        let admin = self.queries.admin().await?.ok().flatten();

        let info = ContractInfo {
            address: self.queries.contract(),
            ticker,
            status,
            venue,
            did,
            admin,
        };
        *self.info.write().await = Some(info.clone());
        self.refresh_prices().await?;
        debug!(status = ?info.status, "contract store refreshed");
        Ok(info)
    }

    async fn refresh_prices(&self) -> Result<(), TraderError> {
        let board = match self.queries.nft_prices().await? {
            Ok(prices) => prices.into_iter().map(|p| (p.id, p.price)).collect(),
            // Uninitialized contract: nothing listed yet.
            Err(_) => BTreeMap::new(),
        };
        *self.prices.write().await = board;
        Ok(())
    }

    /// Cached info, refreshing once if nothing is cached yet.
    pub async fn info(&self) -> Result<ContractInfo, TraderError> {
        if let Some(info) = self.info.read().await.clone() {
            return Ok(info);
        }
        self.refresh().await
    }

    /// The cached price board.
    pub async fn price_board(&self) -> Vec<NftPrice> {
        self.prices
            .read()
            .await
            .iter()
            .map(|(id, price)| NftPrice {
                id: *id,
                price: *price,
            })
            .collect()
    }

    /// Patch cached state from one contract event.
    pub async fn apply_event(&self, event: &ContractEvent) {
        match event {
            ContractEvent::NftsForSale { nfts, .. } => {
                let mut prices = self.prices.write().await;
                for (id, price) in nfts {
                    prices.insert(*id, *price);
                }
            }
            ContractEvent::NftSold { id, .. } => {
                self.prices.write().await.remove(id);
            }
            ContractEvent::WithdrawnNfts { nfts, .. } => {
                let mut prices = self.prices.write().await;
                for id in nfts {
                    prices.remove(id);
                }
            }
            // Removing a portfolio delists everything it held; the event
            // doesn't say what that was, so re-query the board.
            ContractEvent::PortfolioRemoved { .. } => {
                if let Err(err) = self.refresh_prices().await {
                    warn!(%err, "price board refresh after portfolio removal failed");
                }
            }
            ContractEvent::PortfolioAdded { .. } => {}
        }
    }

    /// Drive [`apply_event`](Self::apply_event) from the event stream.
    pub fn spawn_event_pump(store: Arc<Self>, dispatcher: EventDispatcher) {
        let mut sub = dispatcher.subscribe();
        tokio::spawn(async move {
            // The dispatcher lives as long as the pump.
            let _dispatcher = dispatcher;
            while let Some(record) = sub.recv().await {
                store.apply_event(&record.event).await;
            }
            debug!("contract event pump stopped");
        });
    }
}
