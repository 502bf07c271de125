use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use trader_runtime::{AccountId, NftId, PortfolioId, PortfolioKind, PortfolioName};

use crate::TraderApiState;
use crate::error::{ApiError, call_ok};
use crate::routes::{TxResponse, tx_response};

pub fn router() -> Router<Arc<TraderApiState>> {
    Router::new()
        .route("/portfolio", get(view).post(create).delete(remove))
        .route("/portfolio/add", post(add))
        .route("/portfolio/withdraw", post(withdraw))
}

#[derive(Deserialize)]
struct CallerQuery {
    /// 0x-hex account; defaults to the API's signing account.
    caller: Option<String>,
}

#[derive(Serialize)]
struct PortfolioView {
    portfolio: Option<PortfolioId>,
    nfts: Vec<NftId>,
}

async fn view(
    State(state): State<Arc<TraderApiState>>,
    Query(query): Query<CallerQuery>,
) -> Result<Json<PortfolioView>, ApiError> {
    let queries = match query.caller {
        Some(raw) => {
            let caller: AccountId = raw
                .parse()
                .map_err(|e: trader_runtime::TraderError| ApiError::BadRequest(e.to_string()))?;
            state.queries.as_caller(caller)
        }
        None => state.queries.clone(),
    };
    let portfolio = call_ok(queries.have_portfolio().await)?;
    let nfts = match portfolio {
        Some(_) => call_ok(queries.nfts().await)?,
        None => vec![],
    };
    Ok(Json(PortfolioView { portfolio, nfts }))
}

#[derive(Deserialize)]
struct CreateRequest {
    name: String,
}

async fn create(
    State(state): State<Arc<TraderApiState>>,
    Json(body): Json<CreateRequest>,
) -> Result<Json<TxResponse>, ApiError> {
    let name =
        PortfolioName::new(&body.name).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let outcome = state.txs.create_portfolio(state.signer.as_ref(), &name).await?;
    tx_response(outcome)
}

#[derive(Deserialize)]
struct AddRequest {
    auth_id: u64,
    kind: PortfolioKind,
}

async fn add(
    State(state): State<Arc<TraderApiState>>,
    Json(body): Json<AddRequest>,
) -> Result<Json<TxResponse>, ApiError> {
    let outcome = state
        .txs
        .add_portfolio(state.signer.as_ref(), body.auth_id, body.kind)
        .await?;
    tx_response(outcome)
}

async fn remove(State(state): State<Arc<TraderApiState>>) -> Result<Json<TxResponse>, ApiError> {
    let outcome = state.txs.remove_portfolio(state.signer.as_ref()).await?;
    tx_response(outcome)
}

#[derive(Deserialize)]
struct WithdrawRequest {
    nfts: Vec<NftId>,
    dest: PortfolioKind,
}

async fn withdraw(
    State(state): State<Arc<TraderApiState>>,
    Json(body): Json<WithdrawRequest>,
) -> Result<Json<TxResponse>, ApiError> {
    if body.nfts.is_empty() {
        return Err(ApiError::BadRequest("nothing to withdraw".into()));
    }
    let outcome = state
        .txs
        .withdraw(state.signer.as_ref(), &body.nfts, body.dest)
        .await?;
    tx_response(outcome)
}
