pub mod contract;
pub mod health;
pub mod portfolio;
pub mod sales;

use axum::Json;
use serde::Serialize;

use trader_runtime::TxOutcome;
use trader_runtime::abi::ContractEvent;

use crate::error::ApiError;

/// Response body for every mutating call that made it through.
#[derive(Serialize)]
pub struct TxResponse {
    pub tx_hash: Option<String>,
    pub block_hash: Option<String>,
    pub events: Vec<ContractEvent>,
}

/// A domain rejection in the outcome becomes the API error; success keeps
/// the inclusion details and decoded events.
pub fn tx_response(outcome: TxOutcome) -> Result<Json<TxResponse>, ApiError> {
    match outcome.outcome {
        Ok(()) => Ok(Json(TxResponse {
            tx_hash: outcome.tx_hash,
            block_hash: outcome.block_hash,
            events: outcome.events,
        })),
        Err(domain) => Err(domain.into()),
    }
}
