//! Contract ABI surface: message selectors, gas options, and the event
//! schema registry.
//!
//! Selectors follow the ink! convention: the first four bytes of the
//! BLAKE2b-256 hash of the message label. The message and event sets are
//! fixed by the deployed contract's metadata.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::error::TraderError;
use crate::types::{Balance, NftId, PortfolioId};

/// Four-byte message selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    /// Selector for a message label, per the ink! default scheme.
    pub fn for_label(label: &str) -> Self {
        let mut hasher = Blake2b::<U32>::new();
        hasher.update(label.as_bytes());
        let hash = hasher.finalize();
        Selector([hash[0], hash[1], hash[2], hash[3]])
    }
}

/// Label of the contract constructor.
pub const CONSTRUCTOR_LABEL: &str = "new";

/// The contract's message set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Init,
    Close,
    CreatePortfolio,
    AddPortfolio,
    RemovePortfolio,
    Withdraw,
    NftForSell,
    BuyNft,
    Venue,
    ContractDid,
    Ticker,
    Admin,
    IsOpen,
    HavePortfolio,
    Nfts,
    NftSaleDetails,
    NftPrices,
}

impl Method {
    pub const ALL: [Method; 17] = [
        Method::Init,
        Method::Close,
        Method::CreatePortfolio,
        Method::AddPortfolio,
        Method::RemovePortfolio,
        Method::Withdraw,
        Method::NftForSell,
        Method::BuyNft,
        Method::Venue,
        Method::ContractDid,
        Method::Ticker,
        Method::Admin,
        Method::IsOpen,
        Method::HavePortfolio,
        Method::Nfts,
        Method::NftSaleDetails,
        Method::NftPrices,
    ];

    /// The metadata label of this message.
    pub fn label(self) -> &'static str {
        match self {
            Method::Init => "init",
            Method::Close => "close",
            Method::CreatePortfolio => "create_portfolio",
            Method::AddPortfolio => "add_portfolio",
            Method::RemovePortfolio => "remove_portfolio",
            Method::Withdraw => "withdraw",
            Method::NftForSell => "nft_for_sell",
            Method::BuyNft => "buy_nft",
            Method::Venue => "venue",
            Method::ContractDid => "contract_did",
            Method::Ticker => "ticker",
            Method::Admin => "admin",
            Method::IsOpen => "is_open",
            Method::HavePortfolio => "have_portfolio",
            Method::Nfts => "nfts",
            Method::NftSaleDetails => "nft_sale_details",
            Method::NftPrices => "nft_prices",
        }
    }

    pub fn selector(self) -> Selector {
        Selector::for_label(self.label())
    }

    /// Whether this message mutates contract state when submitted.
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Method::Init
                | Method::Close
                | Method::CreatePortfolio
                | Method::AddPortfolio
                | Method::RemovePortfolio
                | Method::Withdraw
                | Method::NftForSell
                | Method::BuyNft
        )
    }
}

/// Weight limit for a contract call. `None` lets the client estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasLimit {
    pub ref_time: u64,
    pub proof_size: u64,
}

/// Per-call options: gas limit and (for payable messages) attached value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    pub gas_limit: Option<GasLimit>,
    pub value: Balance,
}

impl CallOptions {
    /// Options attaching `value` raw units, as required by payable messages.
    pub fn with_value(value: Balance) -> Self {
        CallOptions {
            gas_limit: None,
            value,
        }
    }
}

/// A decoded contract event.
///
/// Events are notifications of completed state transitions. Variant order
/// matches the contract metadata; SCALE decoding is by index.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ContractEvent {
    /// A portfolio was placed under contract custody.
    PortfolioAdded { portfolio: PortfolioId },
    /// A portfolio's custody was returned to its owner.
    PortfolioRemoved { portfolio: PortfolioId },
    /// NFTs left the contract-controlled portfolio.
    WithdrawnNfts {
        portfolio: PortfolioId,
        nfts: Vec<NftId>,
    },
    /// NFTs were listed for sale.
    NftsForSale {
        portfolio: PortfolioId,
        nfts: Vec<(NftId, Balance)>,
    },
    /// An NFT was sold; `portfolio` is the buyer's.
    NftSold {
        portfolio: PortfolioId,
        id: NftId,
        amount: Balance,
    },
}

impl ContractEvent {
    /// The metadata identifier of this event, used by name filters.
    pub fn name(&self) -> &'static str {
        match self {
            ContractEvent::PortfolioAdded { .. } => "PortfolioAdded",
            ContractEvent::PortfolioRemoved { .. } => "PortfolioRemoved",
            ContractEvent::WithdrawnNfts { .. } => "WithdrawnNFTs",
            ContractEvent::NftsForSale { .. } => "NFTsForSale",
            ContractEvent::NftSold { .. } => "NFTSold",
        }
    }
}

/// Decode an event payload against the event schema registry.
///
/// The full payload must be consumed; trailing bytes mean the payload does
/// not match any declared event layout.
pub fn decode_event(data: &[u8]) -> Result<ContractEvent, TraderError> {
    let mut input = data;
    let event = ContractEvent::decode(&mut input)
        .map_err(|e| TraderError::Decode(format!("event payload does not match schema: {e}")))?;
    if !input.is_empty() {
        return Err(TraderError::Decode(format!(
            "{} trailing bytes after {} event payload",
            input.len(),
            event.name()
        )));
    }
    Ok(event)
}
