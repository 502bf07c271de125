//! Chain client and signer seams.
//!
//! The chain connection and the active signing credential are long-lived
//! resources owned by the embedding integration layer; this crate only
//! borrows them per call through these traits. [`dev`] provides an
//! in-memory implementation for local development and tests.

pub mod dev;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::abi::GasLimit;
use crate::error::TraderError;
use crate::types::{AccountId, Balance, IdentityId};

/// A contract event as surfaced by the chain's event feed: the emitting
/// contract address plus the still-encoded event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractEmitted {
    pub contract: AccountId,
    pub data: Vec<u8>,
}

/// The contract events of one finalized block.
#[derive(Debug, Clone)]
pub struct BlockEvents {
    pub block_number: u64,
    pub block_hash: String,
    pub events: Vec<ContractEmitted>,
}

/// Block inclusion of a submitted transaction.
///
/// `success` reflects the dispatch outcome only. A reverted contract call is
/// still included (it consumed fees) with `success == false` and no events.
#[derive(Debug, Clone)]
pub struct InBlock {
    pub tx_hash: String,
    pub block_hash: String,
    pub success: bool,
    pub events: Vec<ContractEmitted>,
}

/// Per-block event feed handed out by [`ChainClient::subscribe_events`].
pub type EventFeed = mpsc::UnboundedReceiver<BlockEvents>;

/// The wallet-side signing credential.
///
/// Approval is the wallet's prompt; a rejection surfaces as
/// [`TraderError::SigningRejected`] before anything reaches the chain.
pub trait Signer: Send + Sync {
    /// The active account address.
    fn account(&self) -> AccountId;

    /// Ask the wallet to approve signing the given call payload.
    fn approve(&self, call_data: &[u8]) -> Result<(), TraderError>;
}

/// The chain connection collaborator.
///
/// Implementations wrap whatever node/SDK integration the embedding
/// application uses; the wrappers in this crate only need these operations.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Read-only dry run of a contract call against current state.
    ///
    /// Returns the raw return data on successful dispatch. Never mutates
    /// chain state.
    async fn dry_run(
        &self,
        origin: &AccountId,
        contract: &AccountId,
        value: Balance,
        gas_limit: Option<GasLimit>,
        data: &[u8],
    ) -> Result<Vec<u8>, TraderError>;

    /// Sign and submit a contract call, resolving once it is in a block.
    ///
    /// Inclusion is not logical success; see [`InBlock::success`].
    async fn submit_call(
        &self,
        signer: &dyn Signer,
        contract: &AccountId,
        value: Balance,
        gas_limit: Option<GasLimit>,
        data: &[u8],
    ) -> Result<InBlock, TraderError>;

    /// Deploy contract code with an encoded constructor call, returning the
    /// new contract address.
    async fn deploy(
        &self,
        signer: &dyn Signer,
        code: &[u8],
        constructor_data: &[u8],
    ) -> Result<AccountId, TraderError>;

    /// Move a deployed contract under a child identity of the signer's
    /// account. Irreversible; resolves on block inclusion.
    async fn create_child_identity(
        &self,
        signer: &dyn Signer,
        contract: &AccountId,
    ) -> Result<InBlock, TraderError>;

    /// Resolve the on-chain identity keyed by an account, if any.
    async fn key_identity(&self, account: &AccountId) -> Result<Option<IdentityId>, TraderError>;

    /// Subscribe to the global per-block contract event feed.
    ///
    /// Feeds are independent; dropping the receiver ends the subscription.
    fn subscribe_events(&self) -> EventFeed;
}
