//! Read-only contract queries.
//!
//! Every query is a dry run against current chain state: nothing is signed,
//! nothing is submitted, no state changes. The returned [`CallResult`] keeps
//! the contract's domain outcome distinct from client-side failures: a
//! query on an uninitialized contract is a well-formed answer, not a
//! transport error.

use std::sync::Arc;

use codec::Decode;

use crate::calls::{CallBuilder, UnsignedCall};
use crate::client::ChainClient;
use crate::decode::decode_call_result;
use crate::error::{CallResult, TraderError};
use crate::types::{
    AccountId, IdentityId, NftId, NftPrice, NftSaleDetails, PortfolioId, Ticker, VenueId,
};

/// Read-only access to one deployed contract instance.
#[derive(Clone)]
pub struct QueryClient {
    client: Arc<dyn ChainClient>,
    calls: CallBuilder,
    caller: AccountId,
}

impl QueryClient {
    /// `caller` is the origin used for dry runs; caller-dependent queries
    /// (`have_portfolio`, `nfts`) answer for this account.
    pub fn new(client: Arc<dyn ChainClient>, contract: AccountId, caller: AccountId) -> Self {
        QueryClient {
            client,
            calls: CallBuilder::new(contract),
            caller,
        }
    }

    pub fn contract(&self) -> AccountId {
        self.calls.contract()
    }

    pub fn caller(&self) -> AccountId {
        self.caller
    }

    /// The same queries answered for a different origin.
    pub fn as_caller(&self, caller: AccountId) -> Self {
        QueryClient {
            client: Arc::clone(&self.client),
            calls: self.calls,
            caller,
        }
    }

    async fn run<T: Decode>(&self, call: UnsignedCall) -> Result<CallResult<T>, TraderError> {
        let data = self
            .client
            .dry_run(&self.caller, &call.contract, call.value, call.gas_limit, &call.data)
            .await?;
        decode_call_result(&data)
    }

    /// The settlement venue the contract trades through.
    pub async fn venue(&self) -> Result<CallResult<VenueId>, TraderError> {
        self.run(self.calls.venue()).await
    }

    /// The contract's own on-chain identity.
    pub async fn contract_did(&self) -> Result<CallResult<IdentityId>, TraderError> {
        self.run(self.calls.contract_did()).await
    }

    /// The NFT collection ticker.
    pub async fn ticker(&self) -> Result<CallResult<Ticker>, TraderError> {
        self.run(self.calls.ticker()).await
    }

    /// The admin account, if the contract still has one.
    pub async fn admin(&self) -> Result<CallResult<Option<AccountId>>, TraderError> {
        self.run(self.calls.admin()).await
    }

    /// Whether the contract is open for trading.
    ///
    /// `Ok(false)` means closed; an uninitialized contract answers with a
    /// domain error instead.
    pub async fn is_open(&self) -> Result<CallResult<bool>, TraderError> {
        self.run(self.calls.is_open()).await
    }

    /// The caller's contract-custody portfolio, if one exists.
    pub async fn have_portfolio(&self) -> Result<CallResult<Option<PortfolioId>>, TraderError> {
        self.run(self.calls.have_portfolio()).await
    }

    /// NFTs currently held in the caller's contract-custody portfolio.
    pub async fn nfts(&self) -> Result<CallResult<Vec<NftId>>, TraderError> {
        self.run(self.calls.nfts()).await
    }

    /// Sale record for an NFT; `None` means not listed.
    pub async fn nft_sale_details(
        &self,
        id: NftId,
    ) -> Result<CallResult<Option<NftSaleDetails>>, TraderError> {
        self.run(self.calls.nft_sale_details(id)).await
    }

    /// The full price board of listed NFTs.
    pub async fn nft_prices(&self) -> Result<CallResult<Vec<NftPrice>>, TraderError> {
        self.run(self.calls.nft_prices()).await
    }
}
