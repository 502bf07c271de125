//! End-to-end trading flows against the in-memory development chain.

use std::sync::Arc;

use trader_runtime::abi::ContractEvent;
use trader_runtime::client::dev::{DevChainClient, DevSigner, dev_account};
use trader_runtime::client::{ChainClient, Signer};
use trader_runtime::error::ContractError;
use trader_runtime::types::{NftId, PortfolioKind, PortfolioName, Ticker};
use trader_runtime::{AccountId, CallBuilder, QueryClient, TxClient};

async fn open_contract() -> (Arc<DevChainClient>, DevSigner, AccountId) {
    let chain = Arc::new(DevChainClient::new());
    let admin = DevSigner::new(dev_account(1));
    let address = chain
        .deploy(
            &admin,
            b"wasm",
            &CallBuilder::constructor(&Ticker::new("NFTSZN2024").unwrap()),
        )
        .await
        .unwrap();
    chain.create_child_identity(&admin, &address).await.unwrap();
    let txs = TxClient::new(chain.clone(), address);
    assert!(txs.init(&admin).await.unwrap().succeeded());
    (chain, admin, address)
}

/// Register an identity and a contract-custody portfolio for an account.
async fn with_portfolio(
    chain: &Arc<DevChainClient>,
    contract: AccountId,
    signer: &DevSigner,
    name: &str,
) -> trader_runtime::PortfolioId {
    chain.register_identity(&signer.account());
    let txs = TxClient::new(chain.clone(), contract);
    let outcome = txs
        .create_portfolio(signer, &PortfolioName::new(name).unwrap())
        .await
        .unwrap();
    assert!(outcome.succeeded());
    let queries = QueryClient::new(chain.clone(), contract, signer.account());
    queries.have_portfolio().await.unwrap().unwrap().unwrap()
}

#[tokio::test]
async fn test_list_buy_and_withdraw() {
    let (chain, _admin, contract) = open_contract().await;
    let txs = TxClient::new(chain.clone(), contract);

    let seller = DevSigner::new(dev_account(2));
    let seller_portfolio = with_portfolio(&chain, contract, &seller, "seller").await;
    chain.mint_nft(NftId(1), seller_portfolio);
    chain.mint_nft(NftId(2), seller_portfolio);

    // List both, check the price board.
    let outcome = txs
        .nft_for_sell(&seller, &[(NftId(1), 5_000_000), (NftId(2), 250_000)])
        .await
        .unwrap();
    assert!(outcome.succeeded());

    let queries = QueryClient::new(chain.clone(), contract, seller.account());
    let prices = queries.nft_prices().await.unwrap().unwrap();
    assert_eq!(prices.len(), 2);
    let sale = queries.nft_sale_details(NftId(1)).await.unwrap().unwrap().unwrap();
    assert_eq!(sale.price, 5_000_000);
    assert_eq!(sale.account, seller.account());

    // Buyer takes NFT 1 at the asking price.
    let buyer = DevSigner::new(dev_account(3));
    let buyer_portfolio = with_portfolio(&chain, contract, &buyer, "buyer").await;
    let outcome = txs.buy_nft(&buyer, NftId(1), 5_000_000).await.unwrap();
    assert!(outcome.succeeded());
    assert!(matches!(
        outcome.events.as_slice(),
        [ContractEvent::NftSold { id: NftId(1), .. }]
    ));
    assert_eq!(chain.nft_owner(NftId(1)), Some(buyer_portfolio));

    // Sold NFT is off the board; the other listing stays.
    let prices = queries.nft_prices().await.unwrap().unwrap();
    assert_eq!(prices.len(), 1);
    assert_eq!(prices[0].id, NftId(2));

    // Buyer withdraws the purchase to their default portfolio.
    let outcome = txs
        .withdraw(&buyer, &[NftId(1)], PortfolioKind::Default)
        .await
        .unwrap();
    assert!(outcome.succeeded());
    let buyer_queries = QueryClient::new(chain.clone(), contract, buyer.account());
    assert_eq!(buyer_queries.nfts().await.unwrap(), Ok(vec![]));
    let owner = chain.nft_owner(NftId(1)).unwrap();
    assert_eq!(owner.kind, PortfolioKind::Default);
}

#[tokio::test]
async fn test_add_portfolio_via_authorization() {
    let (chain, _admin, contract) = open_contract().await;
    let txs = TxClient::new(chain.clone(), contract);

    let owner = DevSigner::new(dev_account(2));
    let did = chain.register_identity(&owner.account());
    let auth_id = chain.grant_portfolio_auth(did, PortfolioKind::User(5));

    // Wrong kind is rejected in pre-flight; nothing was submitted, so the
    // authorization is still pending.
    let outcome = txs
        .add_portfolio(&owner, auth_id, PortfolioKind::Default)
        .await
        .unwrap();
    assert!(!outcome.included());
    assert_eq!(
        outcome.outcome,
        Err(ContractError::InvalidPortfolioAuthorization)
    );

    let outcome = txs
        .add_portfolio(&owner, auth_id, PortfolioKind::User(5))
        .await
        .unwrap();
    assert!(outcome.succeeded());

    let queries = QueryClient::new(chain.clone(), contract, owner.account());
    let portfolio = queries.have_portfolio().await.unwrap().unwrap().unwrap();
    assert_eq!(portfolio.kind, PortfolioKind::User(5));
    assert_eq!(portfolio.did, did);

    // Reusing a consumed authorization fails.
    let outcome = txs
        .add_portfolio(&owner, auth_id, PortfolioKind::User(5))
        .await
        .unwrap();
    assert_eq!(
        outcome.outcome,
        Err(ContractError::InvalidPortfolioAuthorization)
    );
}

#[tokio::test]
async fn test_remove_portfolio_delists_everything() {
    let (chain, _admin, contract) = open_contract().await;
    let txs = TxClient::new(chain.clone(), contract);

    let seller = DevSigner::new(dev_account(2));
    let portfolio = with_portfolio(&chain, contract, &seller, "seller").await;
    chain.mint_nft(NftId(1), portfolio);
    txs.nft_for_sell(&seller, &[(NftId(1), 1_000_000)]).await.unwrap();

    let outcome = txs.remove_portfolio(&seller).await.unwrap();
    assert!(outcome.succeeded());
    assert!(matches!(
        outcome.events.as_slice(),
        [ContractEvent::PortfolioRemoved { .. }]
    ));

    let queries = QueryClient::new(chain.clone(), contract, seller.account());
    assert_eq!(queries.have_portfolio().await.unwrap(), Ok(None));
    assert_eq!(queries.nft_prices().await.unwrap(), Ok(vec![]));
    assert_eq!(queries.nft_sale_details(NftId(1)).await.unwrap(), Ok(None));
}

#[tokio::test]
async fn test_close_keeps_withdrawal_open() {
    let (chain, admin, contract) = open_contract().await;
    let txs = TxClient::new(chain.clone(), contract);

    let seller = DevSigner::new(dev_account(2));
    let portfolio = with_portfolio(&chain, contract, &seller, "seller").await;
    chain.mint_nft(NftId(1), portfolio);
    txs.nft_for_sell(&seller, &[(NftId(1), 1_000_000)]).await.unwrap();

    // Only the admin can close.
    let outcome = txs.close(&seller).await.unwrap();
    assert_eq!(outcome.outcome, Err(ContractError::NotAdmin));
    assert!(txs.close(&admin).await.unwrap().succeeded());

    let queries = QueryClient::new(chain.clone(), contract, seller.account());
    assert_eq!(queries.is_open().await.unwrap(), Ok(false));

    // Trading is rejected after close.
    let buyer = DevSigner::new(dev_account(3));
    chain.register_identity(&buyer.account());
    let outcome = txs.buy_nft(&buyer, NftId(1), 1_000_000).await.unwrap();
    assert_eq!(outcome.outcome, Err(ContractError::ContractClosed));

    // Withdrawal still works so nothing gets stuck in custody.
    let outcome = txs
        .withdraw(&seller, &[NftId(1)], PortfolioKind::Default)
        .await
        .unwrap();
    assert!(outcome.succeeded());
}

#[tokio::test]
async fn test_selling_requires_custody() {
    let (chain, _admin, contract) = open_contract().await;
    let txs = TxClient::new(chain.clone(), contract);

    let seller = DevSigner::new(dev_account(2));
    with_portfolio(&chain, contract, &seller, "seller").await;

    // NFT 9 was never moved into the custody portfolio.
    let outcome = txs.nft_for_sell(&seller, &[(NftId(9), 1_000_000)]).await.unwrap();
    assert_eq!(outcome.outcome, Err(ContractError::NotInPortfolio));
}
