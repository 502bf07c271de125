//! Typed construction of unsigned contract calls.
//!
//! A [`CallBuilder`] turns a typed message invocation into the encoded call
//! payload (selector plus SCALE-encoded arguments) without signing or
//! submitting anything. Construction is infallible: argument validity is
//! enforced by the argument types themselves.

use codec::Encode;

use crate::abi::{CallOptions, GasLimit, Method};
use crate::types::{AccountId, Balance, NftId, PortfolioKind, PortfolioName, Ticker};

/// An encoded contract call that has not been signed or submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedCall {
    /// Target contract address.
    pub contract: AccountId,
    /// Attached value in raw chain units (payable messages only).
    pub value: Balance,
    /// Weight limit; `None` lets the client estimate.
    pub gas_limit: Option<GasLimit>,
    /// Selector followed by SCALE-encoded arguments.
    pub data: Vec<u8>,
}

impl UnsignedCall {
    pub fn with_gas_limit(mut self, gas_limit: GasLimit) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

/// Builds [`UnsignedCall`]s against one deployed contract instance.
#[derive(Debug, Clone, Copy)]
pub struct CallBuilder {
    contract: AccountId,
}

impl CallBuilder {
    pub fn new(contract: AccountId) -> Self {
        CallBuilder { contract }
    }

    pub fn contract(&self) -> AccountId {
        self.contract
    }

    fn call(&self, method: Method, args: &impl Encode, options: CallOptions) -> UnsignedCall {
        let mut data = method.selector().0.to_vec();
        args.encode_to(&mut data);
        UnsignedCall {
            contract: self.contract,
            value: options.value,
            gas_limit: options.gas_limit,
            data,
        }
    }

    /// Encode the constructor call used at deployment.
    pub fn constructor(ticker: &Ticker) -> Vec<u8> {
        let mut data = crate::abi::Selector::for_label(crate::abi::CONSTRUCTOR_LABEL)
            .0
            .to_vec();
        ticker.encode_to(&mut data);
        data
    }

    // ── mutating messages ──────────────────────────────────────────────

    pub fn init(&self) -> UnsignedCall {
        self.call(Method::Init, &(), CallOptions::default())
    }

    pub fn close(&self) -> UnsignedCall {
        self.call(Method::Close, &(), CallOptions::default())
    }

    pub fn create_portfolio(&self, name: &PortfolioName) -> UnsignedCall {
        self.call(Method::CreatePortfolio, name, CallOptions::default())
    }

    pub fn add_portfolio(&self, auth_id: u64, kind: PortfolioKind) -> UnsignedCall {
        self.call(Method::AddPortfolio, &(auth_id, kind), CallOptions::default())
    }

    pub fn remove_portfolio(&self) -> UnsignedCall {
        self.call(Method::RemovePortfolio, &(), CallOptions::default())
    }

    pub fn withdraw(&self, nfts: &[NftId], dest: PortfolioKind) -> UnsignedCall {
        self.call(Method::Withdraw, &(nfts, dest), CallOptions::default())
    }

    pub fn nft_for_sell(&self, nfts: &[(NftId, Balance)]) -> UnsignedCall {
        self.call(Method::NftForSell, &nfts, CallOptions::default())
    }

    /// Payable: `value` is the transferred amount paying for the NFT.
    pub fn buy_nft(&self, id: NftId, value: Balance) -> UnsignedCall {
        self.call(Method::BuyNft, &id, CallOptions::with_value(value))
    }

    // ── read-only messages ─────────────────────────────────────────────

    pub fn venue(&self) -> UnsignedCall {
        self.call(Method::Venue, &(), CallOptions::default())
    }

    pub fn contract_did(&self) -> UnsignedCall {
        self.call(Method::ContractDid, &(), CallOptions::default())
    }

    pub fn ticker(&self) -> UnsignedCall {
        self.call(Method::Ticker, &(), CallOptions::default())
    }

    pub fn admin(&self) -> UnsignedCall {
        self.call(Method::Admin, &(), CallOptions::default())
    }

    pub fn is_open(&self) -> UnsignedCall {
        self.call(Method::IsOpen, &(), CallOptions::default())
    }

    pub fn have_portfolio(&self) -> UnsignedCall {
        self.call(Method::HavePortfolio, &(), CallOptions::default())
    }

    pub fn nfts(&self) -> UnsignedCall {
        self.call(Method::Nfts, &(), CallOptions::default())
    }

    pub fn nft_sale_details(&self, id: NftId) -> UnsignedCall {
        self.call(Method::NftSaleDetails, &id, CallOptions::default())
    }

    pub fn nft_prices(&self) -> UnsignedCall {
        self.call(Method::NftPrices, &(), CallOptions::default())
    }
}
