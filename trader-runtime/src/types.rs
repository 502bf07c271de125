//! Domain types mirroring the on-chain NFT trader contract.
//!
//! Argument-side construction is flexible (strings, display-unit decimals);
//! return-side values are canonical: raw chain units ([`Balance`]), fixed
//! 32-byte identities, and explicit sum types with exhaustive matching.

use codec::{Decode, Encode};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::TraderError;

/// Raw chain balance, in the chain's smallest unit.
pub type Balance = u128;

/// Numbered portfolio index under an identity.
pub type PortfolioNumber = u64;

/// One display unit equals this many raw chain units (6 decimals).
pub const UNIT: Balance = 1_000_000;

/// NFT identifier within the contract's collection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize,
)]
pub struct NftId(pub u64);

impl fmt::Display for NftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Settlement venue identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode, Serialize, Deserialize)]
pub struct VenueId(pub u64);

/// A 32-byte chain account key. Displayed and parsed as 0x-prefixed hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct AccountId(pub [u8; 32]);

/// A 32-byte on-chain identity (DID). Displayed and parsed as 0x-prefixed hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub struct IdentityId(pub [u8; 32]);

fn parse_h256(s: &str, what: &str) -> Result<[u8; 32], TraderError> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped)
        .map_err(|e| TraderError::Encode(format!("invalid {what} hex '{s}': {e}")))?;
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|b: Vec<u8>| TraderError::Encode(format!("{what} must be 32 bytes, got {}", b.len())))?;
    Ok(arr)
}

macro_rules! impl_h256_text {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl FromStr for $ty {
            type Err = TraderError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok($ty(parse_h256(s, $what)?))
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(D::Error::custom)
            }
        }
    };
}

impl_h256_text!(AccountId, "account id");
impl_h256_text!(IdentityId, "identity id");

/// Fixed-length collection ticker, zero-padded ASCII.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Encode, Decode)]
pub struct Ticker(pub [u8; 12]);

impl Ticker {
    /// Build a ticker from an ASCII string of at most 12 bytes.
    pub fn new(s: &str) -> Result<Self, TraderError> {
        if s.is_empty() || s.len() > 12 {
            return Err(TraderError::Encode(format!(
                "ticker must be 1..=12 bytes, got {}",
                s.len()
            )));
        }
        if !s.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(TraderError::Encode(format!("ticker '{s}' is not printable ASCII")));
        }
        let mut bytes = [0u8; 12];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        Ok(Ticker(bytes))
    }

    /// Human-readable ticker, stopping at the first zero byte.
    ///
    /// All-zero tickers have no display form.
    pub fn as_display(&self) -> Option<String> {
        let len = self.0.iter().position(|&b| b == 0).unwrap_or(self.0.len());
        if len == 0 {
            return None;
        }
        Some(self.0[..len].iter().map(|&b| b as char).collect())
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_display() {
            Some(s) => f.write_str(&s),
            None => f.write_str("0x").and_then(|_| f.write_str(&hex::encode(self.0))),
        }
    }
}

impl Serialize for Ticker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
    }
}

impl<'de> Deserialize<'de> for Ticker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let stripped = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(stripped).map_err(D::Error::custom)?;
        let arr: [u8; 12] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| D::Error::custom(format!("ticker must be 12 bytes, got {}", b.len())))?;
        Ok(Ticker(arr))
    }
}

/// Portfolio name bytes for `create_portfolio`.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct PortfolioName(pub Vec<u8>);

impl PortfolioName {
    pub fn new(name: &str) -> Result<Self, TraderError> {
        if name.is_empty() {
            return Err(TraderError::Encode("portfolio name must not be empty".into()));
        }
        Ok(PortfolioName(name.as_bytes().to_vec()))
    }
}

/// Which portfolio of an identity is referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortfolioKind {
    /// The identity's default portfolio.
    Default,
    /// A numbered user portfolio.
    User(PortfolioNumber),
}

/// A portfolio reference: identity plus portfolio kind.
///
/// Every NFT lives in exactly one portfolio at a time; moves are atomic on
/// the contract side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode, Serialize, Deserialize)]
pub struct PortfolioId {
    pub did: IdentityId,
    pub kind: PortfolioKind,
}

/// Sale record for a listed NFT. Presence means "listed for sale".
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct NftSaleDetails {
    /// The seller's account to receive payment.
    pub account: AccountId,
    /// The seller's DID.
    pub did: IdentityId,
    /// Sale price in raw chain units.
    pub price: Balance,
}

/// An NFT paired with its raw sale price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct NftPrice {
    pub id: NftId,
    pub price: Balance,
}

/// Convert a raw chain amount to display units.
pub fn balance_to_display(raw: Balance) -> Result<Decimal, TraderError> {
    let v = i128::try_from(raw)
        .map_err(|_| TraderError::Decode(format!("balance {raw} exceeds displayable range")))?;
    Decimal::try_from_i128_with_scale(v, 6)
        .map(|d| d.normalize())
        .map_err(|e| TraderError::Decode(format!("balance {raw} exceeds displayable range: {e}")))
}

/// Convert a display-unit amount to raw chain units.
///
/// Rejects negative amounts and amounts with sub-unit precision: `5.0`
/// converts to exactly `5_000_000`, `0.0000001` is an error.
pub fn display_to_balance(display: Decimal) -> Result<Balance, TraderError> {
    if display.is_sign_negative() {
        return Err(TraderError::Encode(format!("amount {display} must not be negative")));
    }
    let scaled = display
        .checked_mul(Decimal::from(UNIT as u64))
        .ok_or_else(|| TraderError::Encode(format!("amount {display} is too large")))?;
    if !scaled.fract().is_zero() {
        return Err(TraderError::Encode(format!(
            "amount {display} has sub-unit precision (smallest unit is 1/{UNIT})"
        )));
    }
    scaled
        .to_u128()
        .ok_or_else(|| TraderError::Encode(format!("amount {display} is too large")))
}
