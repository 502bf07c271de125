//! Error taxonomy for the trader client.
//!
//! Two layers are kept strictly apart:
//! - [`TraderError`]: everything that can go wrong *around* a contract call
//!   (local encoding, transport, signing, dispatch, decode).
//! - [`ContractError`]: the contract's own closed error set, carried inside
//!   [`CallResult`]. A domain error means the call was dispatched fine but the
//!   contract's logic rejected it.

use codec::{Decode, Encode};
use thiserror::Error;

/// The domain-level result of a contract call.
///
/// `Err` here is a logical rejection by the contract, not a failed call.
pub type CallResult<T> = Result<T, ContractError>;

/// Client-side and chain-side failures outside the contract's domain logic.
#[derive(Error, Debug)]
pub enum TraderError {
    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Decoding failed: {0}")]
    Decode(String),

    #[error("Dispatch failed: {0}")]
    Dispatch(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Signing rejected: {0}")]
    SigningRejected(String),

    #[error("Transaction not included: {0}")]
    NotIncluded(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Address registry error: {0}")]
    Registry(String),

    #[error("Contract artifacts error: {0}")]
    Artifacts(String),
}

impl From<codec::Error> for TraderError {
    fn from(e: codec::Error) -> Self {
        TraderError::Decode(e.to_string())
    }
}

/// The dispatch-level result layer: the chain could not even read the call
/// input. Distinct from [`ContractError`], which is a domain rejection.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum LangError {
    #[error("could not read call input")]
    CouldNotReadInput,
}

/// The contract's closed error set.
///
/// Variant order matches the deployed contract metadata; SCALE decoding is
/// by index, so this order must never be rearranged.
#[derive(Error, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum ContractError {
    /// Chain-runtime integration failure inside the contract.
    #[error("runtime error: {0}")]
    Runtime(RuntimeError),
    /// The contract hasn't been initialized.
    #[error("contract is not initialized")]
    NotInitialized,
    /// The contract has already been initialized.
    #[error("contract is already initialized")]
    AlreadyInitialized,
    /// The contract has been closed; only withdrawals are allowed.
    #[error("contract is closed")]
    ContractClosed,
    /// Invalid portfolio authorization.
    #[error("invalid portfolio authorization")]
    InvalidPortfolioAuthorization,
    /// The caller has already registered a portfolio.
    #[error("caller already has a portfolio")]
    AlreadyHavePortfolio,
    /// The caller doesn't have a portfolio yet.
    #[error("caller has no portfolio")]
    NoPortfolio,
    /// The seller's portfolio is missing.
    #[error("seller's portfolio is missing")]
    MissingPortfolio,
    /// An NFT isn't in the caller's portfolio.
    #[error("NFT is not in the caller's portfolio")]
    NotInPortfolio,
    /// The NFT is not for sale.
    #[error("NFT is not for sale")]
    NotForSale,
    /// The transferred value is below the sale price.
    #[error("transferred value is below the sale price")]
    TransferredValueTooLow,
    /// Paying the seller failed.
    #[error("failed to pay the seller")]
    FailedToPaySeller,
    /// The caller must be the contract admin.
    #[error("caller is not the contract admin")]
    NotAdmin,
}

impl ContractError {
    /// Stable variant name, used in API responses and logs.
    pub fn name(&self) -> &'static str {
        match self {
            ContractError::Runtime(_) => "Runtime",
            ContractError::NotInitialized => "NotInitialized",
            ContractError::AlreadyInitialized => "AlreadyInitialized",
            ContractError::ContractClosed => "ContractClosed",
            ContractError::InvalidPortfolioAuthorization => "InvalidPortfolioAuthorization",
            ContractError::AlreadyHavePortfolio => "AlreadyHavePortfolio",
            ContractError::NoPortfolio => "NoPortfolio",
            ContractError::MissingPortfolio => "MissingPortfolio",
            ContractError::NotInPortfolio => "NotInPortfolio",
            ContractError::NotForSale => "NotForSale",
            ContractError::TransferredValueTooLow => "TransferredValueTooLow",
            ContractError::FailedToPaySeller => "FailedToPaySeller",
            ContractError::NotAdmin => "NotAdmin",
        }
    }
}

/// Chain-runtime errors nested inside [`ContractError::Runtime`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum RuntimeError {
    #[error("runtime API error: {0}")]
    Api(ApiError),
    #[error("caller has no on-chain identity")]
    MissingIdentity,
    #[error("invalid portfolio authorization")]
    InvalidPortfolioAuthorization,
    #[error("delegate call failed ({} bytes)", .0.len())]
    DelegateCall(Vec<u8>),
}

/// Innermost runtime API failure set.
#[derive(Error, Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum ApiError {
    #[error("codec error: {0}")]
    Codec(String),
    #[error("generic runtime error {0}")]
    Generic(u32),
    #[error("extrinsic call failed: {0}")]
    ExtrinsicCallFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_error_display() {
        assert_eq!(
            ContractError::NotForSale.to_string(),
            "NFT is not for sale"
        );
        let nested = ContractError::Runtime(RuntimeError::Api(ApiError::Generic(7)));
        assert_eq!(nested.to_string(), "runtime error: runtime API error: generic runtime error 7");
    }

    #[test]
    fn test_contract_error_scale_index_stability() {
        // NotForSale must stay at index 9; the chain encodes by position.
        assert_eq!(ContractError::NotForSale.encode(), vec![9u8]);
        assert_eq!(ContractError::NotAdmin.encode(), vec![12u8]);
        assert_eq!(
            ContractError::Runtime(RuntimeError::MissingIdentity).encode(),
            vec![0u8, 1u8]
        );
    }

    #[test]
    fn test_error_name() {
        assert_eq!(ContractError::NoPortfolio.name(), "NoPortfolio");
        assert_eq!(
            ContractError::Runtime(RuntimeError::MissingIdentity).name(),
            "Runtime"
        );
    }
}
