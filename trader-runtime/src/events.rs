//! Contract event subscriptions.
//!
//! One [`EventDispatcher`] holds the single chain-side event subscription
//! for a contract and demultiplexes decoded events to any number of local
//! [`Subscription`]s. Events from other contracts are dropped before
//! decoding; an undecodable payload from our contract is logged and
//! skipped without disturbing other deliveries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::abi::{ContractEvent, decode_event};
use crate::client::ChainClient;
use crate::types::AccountId;

/// A decoded event with its block context.
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub block_number: u64,
    pub block_hash: String,
    pub event: ContractEvent,
}

type EventFilter = Box<dyn Fn(&ContractEvent) -> bool + Send + Sync>;

struct SubEntry {
    filter: Option<EventFilter>,
    tx: mpsc::UnboundedSender<EventRecord>,
}

struct Shared {
    contract: AccountId,
    subs: Mutex<HashMap<u64, SubEntry>>,
    next_id: AtomicU64,
}

impl Shared {
    fn subs(&self) -> MutexGuard<'_, HashMap<u64, SubEntry>> {
        self.subs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver(&self, record: &EventRecord) {
        self.subs().retain(|_, entry| {
            if let Some(filter) = &entry.filter {
                if !filter(&record.event) {
                    // Keep the subscription, skip this event.
                    return !entry.tx.is_closed();
                }
            }
            entry.tx.send(record.clone()).is_ok()
        });
    }
}

/// Demultiplexes one contract's event stream to local subscribers.
pub struct EventDispatcher {
    shared: Arc<Shared>,
}

impl EventDispatcher {
    /// Subscribe to the chain feed and start dispatching events emitted by
    /// `contract`. The background task ends when the chain feed closes or
    /// the dispatcher and all its subscriptions are gone.
    pub fn spawn(client: &dyn ChainClient, contract: AccountId) -> Self {
        let shared = Arc::new(Shared {
            contract,
            subs: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        });
        let mut feed = client.subscribe_events();
        let weak: Weak<Shared> = Arc::downgrade(&shared);
        tokio::spawn(async move {
            while let Some(block) = feed.recv().await {
                let Some(shared) = weak.upgrade() else {
                    break;
                };
                for emitted in &block.events {
                    if emitted.contract != shared.contract {
                        continue;
                    }
                    let event = match decode_event(&emitted.data) {
                        Ok(event) => event,
                        Err(err) => {
                            warn!(%err, block = block.block_number, "skipping undecodable contract event");
                            continue;
                        }
                    };
                    shared.deliver(&EventRecord {
                        block_number: block.block_number,
                        block_hash: block.block_hash.clone(),
                        event,
                    });
                }
            }
            debug!("contract event feed closed");
        });
        EventDispatcher { shared }
    }

    /// Subscribe to every event of the contract.
    pub fn subscribe(&self) -> Subscription {
        self.subscribe_inner(None)
    }

    /// Subscribe to the events matching `filter`.
    pub fn subscribe_filtered<F>(&self, filter: F) -> Subscription
    where
        F: Fn(&ContractEvent) -> bool + Send + Sync + 'static,
    {
        self.subscribe_inner(Some(Box::new(filter)))
    }

    fn subscribe_inner(&self, filter: Option<EventFilter>) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        self.shared.subs().insert(id, SubEntry { filter, tx });
        Subscription {
            id,
            shared: Arc::clone(&self.shared),
            rx,
        }
    }

    /// Number of live subscriptions. Closed ones are pruned on delivery.
    pub fn subscriber_count(&self) -> usize {
        self.shared.subs().len()
    }
}

/// One local event subscription. Dropping it ends the subscription.
pub struct Subscription {
    id: u64,
    shared: Arc<Shared>,
    rx: mpsc::UnboundedReceiver<EventRecord>,
}

impl Subscription {
    /// Next matching event; `None` once the dispatcher is gone and the
    /// buffer is drained.
    pub async fn recv(&mut self) -> Option<EventRecord> {
        self.rx.recv().await
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.shared.subs().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::calls::CallBuilder;
    use crate::client::Signer;
    use crate::client::dev::{DevChainClient, DevSigner, dev_account};
    use crate::tx::TxClient;
    use crate::types::{NftId, PortfolioName, Ticker};

    const RECV_TIMEOUT: Duration = Duration::from_secs(5);

    async fn recv(sub: &mut Subscription) -> EventRecord {
        tokio::time::timeout(RECV_TIMEOUT, sub.recv())
            .await
            .expect("timed out waiting for event")
            .expect("subscription closed")
    }

    async fn open_contract(chain: &Arc<DevChainClient>, admin: &DevSigner) -> crate::types::AccountId {
        let ticker = Ticker::new("TKR").unwrap();
        let address = chain
            .deploy(admin, b"wasm", &CallBuilder::constructor(&ticker))
            .await
            .unwrap();
        chain.create_child_identity(admin, &address).await.unwrap();
        let txs = TxClient::new(chain.clone(), address);
        assert!(txs.init(admin).await.unwrap().succeeded());
        address
    }

    #[tokio::test]
    async fn test_subscription_receives_contract_events() {
        let chain = Arc::new(DevChainClient::new());
        let admin = DevSigner::new(dev_account(1));
        let address = open_contract(&chain, &admin).await;

        let dispatcher = EventDispatcher::spawn(chain.as_ref(), address);
        let mut sub = dispatcher.subscribe();

        let alice = DevSigner::new(dev_account(2));
        chain.register_identity(&alice.account());
        let txs = TxClient::new(chain.clone(), address);
        txs.create_portfolio(&alice, &PortfolioName::new("alice").unwrap())
            .await
            .unwrap();

        let record = recv(&mut sub).await;
        assert!(matches!(record.event, ContractEvent::PortfolioAdded { .. }));
        assert!(record.block_number > 0);
    }

    #[tokio::test]
    async fn test_filtered_subscription_skips_other_events() {
        let chain = Arc::new(DevChainClient::new());
        let admin = DevSigner::new(dev_account(1));
        let address = open_contract(&chain, &admin).await;

        let dispatcher = EventDispatcher::spawn(chain.as_ref(), address);
        let mut sales_only = dispatcher
            .subscribe_filtered(|event| matches!(event, ContractEvent::NftsForSale { .. }));

        let seller = DevSigner::new(dev_account(2));
        chain.register_identity(&seller.account());
        let txs = TxClient::new(chain.clone(), address);
        // PortfolioAdded must not reach the filtered subscription.
        txs.create_portfolio(&seller, &PortfolioName::new("s").unwrap())
            .await
            .unwrap();
        let queries =
            crate::query::QueryClient::new(chain.clone(), address, seller.account());
        let portfolio = queries.have_portfolio().await.unwrap().unwrap().unwrap();
        chain.mint_nft(NftId(1), portfolio);
        txs.nft_for_sell(&seller, &[(NftId(1), 5_000_000)]).await.unwrap();

        // The first delivered event is the listing, not the portfolio add.
        let record = recv(&mut sales_only).await;
        assert!(matches!(record.event, ContractEvent::NftsForSale { .. }));
    }

    #[tokio::test]
    async fn test_events_from_other_contracts_are_not_delivered() {
        let chain = Arc::new(DevChainClient::new());
        let admin = DevSigner::new(dev_account(1));
        let watched = open_contract(&chain, &admin).await;
        let other = open_contract(&chain, &admin).await;
        assert_ne!(watched, other);

        let dispatcher = EventDispatcher::spawn(chain.as_ref(), watched);
        let mut sub = dispatcher.subscribe();

        let alice = DevSigner::new(dev_account(2));
        chain.register_identity(&alice.account());
        // Same action on both contracts; only the watched one is delivered.
        let other_txs = TxClient::new(chain.clone(), other);
        other_txs
            .create_portfolio(&alice, &PortfolioName::new("a").unwrap())
            .await
            .unwrap();
        let watched_txs = TxClient::new(chain.clone(), watched);
        watched_txs
            .create_portfolio(&alice, &PortfolioName::new("a").unwrap())
            .await
            .unwrap();

        let record = recv(&mut sub).await;
        assert!(record.block_number >= 2, "skipped the other contract's block");
    }

    #[tokio::test]
    async fn test_dropped_subscription_is_pruned() {
        let chain = Arc::new(DevChainClient::new());
        let admin = DevSigner::new(dev_account(1));
        let address = open_contract(&chain, &admin).await;

        let dispatcher = EventDispatcher::spawn(chain.as_ref(), address);
        let first = dispatcher.subscribe();
        let mut second = dispatcher.subscribe();
        assert_eq!(dispatcher.subscriber_count(), 2);

        first.unsubscribe();
        assert_eq!(dispatcher.subscriber_count(), 1);

        let alice = DevSigner::new(dev_account(2));
        chain.register_identity(&alice.account());
        let txs = TxClient::new(chain.clone(), address);
        txs.create_portfolio(&alice, &PortfolioName::new("a").unwrap())
            .await
            .unwrap();

        let record = recv(&mut second).await;
        assert!(matches!(record.event, ContractEvent::PortfolioAdded { .. }));
        assert_eq!(dispatcher.subscriber_count(), 1);
    }
}
