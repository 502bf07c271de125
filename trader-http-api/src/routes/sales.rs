use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use trader_runtime::types::{balance_to_display, display_to_balance};
use trader_runtime::{Balance, NftId, NftSaleDetails};

use crate::TraderApiState;
use crate::error::{ApiError, call_ok};
use crate::routes::{TxResponse, tx_response};

pub fn router() -> Router<Arc<TraderApiState>> {
    Router::new()
        .route("/sales", get(board).post(list))
        .route("/sales/{id}", get(details))
        .route("/sales/buy", post(buy))
}

/// One listed NFT: raw chain units plus the display price the frontend
/// renders.
#[derive(Serialize)]
struct BoardEntry {
    id: NftId,
    price: Decimal,
    price_raw: String,
}

fn board_entry(id: NftId, raw: Balance) -> Result<BoardEntry, ApiError> {
    Ok(BoardEntry {
        id,
        price: balance_to_display(raw)?,
        price_raw: raw.to_string(),
    })
}

async fn board(
    State(state): State<Arc<TraderApiState>>,
) -> Result<Json<Vec<BoardEntry>>, ApiError> {
    state
        .store
        .price_board()
        .await
        .into_iter()
        .map(|entry| board_entry(entry.id, entry.price))
        .collect::<Result<Vec<_>, _>>()
        .map(Json)
}

#[derive(Serialize)]
struct SaleDetails {
    id: NftId,
    price: Decimal,
    price_raw: String,
    seller: NftSaleDetails,
}

/// Live sale record straight from the contract, bypassing the cache.
async fn details(
    State(state): State<Arc<TraderApiState>>,
    Path(id): Path<u64>,
) -> Result<Json<Option<SaleDetails>>, ApiError> {
    let id = NftId(id);
    let sale = call_ok(state.queries.nft_sale_details(id).await)?;
    match sale {
        Some(seller) => Ok(Json(Some(SaleDetails {
            id,
            price: balance_to_display(seller.price)?,
            price_raw: seller.price.to_string(),
            seller,
        }))),
        None => Ok(Json(None)),
    }
}

#[derive(Deserialize)]
struct Listing {
    id: NftId,
    /// Display-unit price, e.g. `"5.0"`.
    price: Decimal,
}

#[derive(Deserialize)]
struct ListRequest {
    nfts: Vec<Listing>,
}

async fn list(
    State(state): State<Arc<TraderApiState>>,
    Json(body): Json<ListRequest>,
) -> Result<Json<TxResponse>, ApiError> {
    if body.nfts.is_empty() {
        return Err(ApiError::BadRequest("nothing to list".into()));
    }
    let nfts = body
        .nfts
        .into_iter()
        .map(|listing| Ok((listing.id, display_to_balance(listing.price)?)))
        .collect::<Result<Vec<_>, trader_runtime::TraderError>>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let outcome = state.txs.nft_for_sell(state.signer.as_ref(), &nfts).await?;
    tx_response(outcome)
}

#[derive(Deserialize)]
struct BuyRequest {
    id: NftId,
    /// Display-unit amount to pay; must be at least the sale price.
    price: Decimal,
}

async fn buy(
    State(state): State<Arc<TraderApiState>>,
    Json(body): Json<BuyRequest>,
) -> Result<Json<TxResponse>, ApiError> {
    let value =
        display_to_balance(body.price).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let outcome = state.txs.buy_nft(state.signer.as_ref(), body.id, value).await?;
    tx_response(outcome)
}
