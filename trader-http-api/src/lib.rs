pub mod auth;
pub mod error;
pub mod routes;
pub mod store;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use trader_runtime::client::{ChainClient, Signer};
use trader_runtime::events::EventDispatcher;
use trader_runtime::{AccountId, QueryClient, TxClient};

use store::ContractStore;

pub struct TraderApiState {
    pub store: Arc<ContractStore>,
    pub queries: QueryClient,
    pub txs: TxClient,
    pub signer: Arc<dyn Signer>,
    pub api_token: String,
}

impl TraderApiState {
    /// Wire the API against one deployed contract. Spawns the event pump
    /// that keeps the store's price board current.
    pub fn new(
        client: Arc<dyn ChainClient>,
        contract: AccountId,
        signer: Arc<dyn Signer>,
        api_token: String,
    ) -> Arc<Self> {
        let queries = QueryClient::new(Arc::clone(&client), contract, signer.account());
        let txs = TxClient::new(Arc::clone(&client), contract);
        let store = Arc::new(ContractStore::new(queries.clone()));

        let dispatcher = EventDispatcher::spawn(client.as_ref(), contract);
        ContractStore::spawn_event_pump(Arc::clone(&store), dispatcher);

        Arc::new(TraderApiState {
            store,
            queries,
            txs,
            signer,
            api_token,
        })
    }
}

pub fn build_router(state: Arc<TraderApiState>) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::contract::router())
        .merge(routes::portfolio::router())
        .merge(routes::sales::router())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
