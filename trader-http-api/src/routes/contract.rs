use axum::{Json, Router, extract::State, routing::get, routing::post};
use std::sync::Arc;

use crate::TraderApiState;
use crate::error::ApiError;
use crate::routes::{TxResponse, tx_response};
use crate::store::ContractInfo;

pub fn router() -> Router<Arc<TraderApiState>> {
    Router::new()
        .route("/contract", get(info))
        .route("/contract/refresh", post(refresh))
        .route("/contract/init", post(init))
        .route("/contract/close", post(close))
}

async fn info(State(state): State<Arc<TraderApiState>>) -> Result<Json<ContractInfo>, ApiError> {
    Ok(Json(state.store.info().await?))
}

/// Explicit re-read of chain state, for when the frontend wants certainty
/// rather than the event-patched cache.
async fn refresh(
    State(state): State<Arc<TraderApiState>>,
) -> Result<Json<ContractInfo>, ApiError> {
    Ok(Json(state.store.refresh().await?))
}

async fn init(State(state): State<Arc<TraderApiState>>) -> Result<Json<TxResponse>, ApiError> {
    let outcome = state.txs.init(state.signer.as_ref()).await?;
    let response = tx_response(outcome)?;
    state.store.refresh().await?;
    Ok(response)
}

async fn close(State(state): State<Arc<TraderApiState>>) -> Result<Json<TxResponse>, ApiError> {
    let outcome = state.txs.close(state.signer.as_ref()).await?;
    let response = tx_response(outcome)?;
    state.store.refresh().await?;
    Ok(response)
}
