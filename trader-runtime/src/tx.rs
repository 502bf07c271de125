//! Signed contract transactions.
//!
//! Submission goes through a dry-run pre-flight: a call the contract would
//! reject is reported as its domain error without paying fees or prompting
//! the wallet. Calls that do get submitted resolve on block inclusion, and
//! the [`TxOutcome`] always carries the domain outcome alongside, since
//! block inclusion alone is not logical success.

use std::sync::Arc;

use tracing::{info, warn};

use crate::abi::{ContractEvent, decode_event};
use crate::calls::{CallBuilder, UnsignedCall};
use crate::client::{ChainClient, InBlock, Signer};
use crate::decode::decode_call_result;
use crate::error::{CallResult, TraderError};
use crate::types::{Balance, NftId, PortfolioKind, PortfolioName};

/// The resolved outcome of a mutating contract call.
#[derive(Debug, Clone)]
pub struct TxOutcome {
    /// `None` when the pre-flight rejected the call before submission.
    pub tx_hash: Option<String>,
    pub block_hash: Option<String>,
    /// Decoded events emitted by this contract in the call's block.
    pub events: Vec<ContractEvent>,
    /// The contract's domain outcome.
    pub outcome: CallResult<()>,
}

impl TxOutcome {
    /// Whether the call made it into a block (fees were paid).
    pub fn included(&self) -> bool {
        self.tx_hash.is_some()
    }

    /// Whether the contract's state actually changed.
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Signed access to one deployed contract instance.
#[derive(Clone)]
pub struct TxClient {
    client: Arc<dyn ChainClient>,
    calls: CallBuilder,
}

impl TxClient {
    pub fn new(client: Arc<dyn ChainClient>, contract: crate::types::AccountId) -> Self {
        TxClient {
            client,
            calls: CallBuilder::new(contract),
        }
    }

    async fn dry_run_outcome(
        &self,
        signer: &dyn Signer,
        call: &UnsignedCall,
    ) -> Result<CallResult<()>, TraderError> {
        let data = self
            .client
            .dry_run(&signer.account(), &call.contract, call.value, call.gas_limit, &call.data)
            .await?;
        decode_call_result::<()>(&data)
    }

    async fn send(&self, signer: &dyn Signer, call: UnsignedCall) -> Result<TxOutcome, TraderError> {
        // Pre-flight: surface domain rejections before signing.
        if let Err(domain) = self.dry_run_outcome(signer, &call).await? {
            info!(contract = %call.contract, error = domain.name(), "call rejected in pre-flight");
            return Ok(TxOutcome {
                tx_hash: None,
                block_hash: None,
                events: vec![],
                outcome: Err(domain),
            });
        }

        let in_block = self
            .client
            .submit_call(signer, &call.contract, call.value, call.gas_limit, &call.data)
            .await?;
        let events = self.decode_block_events(&in_block);

        let outcome = if in_block.success {
            Ok(())
        } else {
            // Included but reverted: re-simulate to recover the domain error.
            match self.dry_run_outcome(signer, &call).await? {
                Err(domain) => Err(domain),
                Ok(()) => {
                    return Err(TraderError::Dispatch(
                        "call reverted in block but re-simulation succeeds".into(),
                    ));
                }
            }
        };
        info!(
            contract = %call.contract,
            tx_hash = %in_block.tx_hash,
            success = outcome.is_ok(),
            "call included"
        );
        Ok(TxOutcome {
            tx_hash: Some(in_block.tx_hash),
            block_hash: Some(in_block.block_hash),
            events,
            outcome,
        })
    }

    fn decode_block_events(&self, in_block: &InBlock) -> Vec<ContractEvent> {
        in_block
            .events
            .iter()
            .filter(|emitted| emitted.contract == self.calls.contract())
            .filter_map(|emitted| match decode_event(&emitted.data) {
                Ok(event) => Some(event),
                Err(err) => {
                    warn!(%err, "skipping undecodable contract event");
                    None
                }
            })
            .collect()
    }

    /// Initialize a deployed contract: create its venue and open trading.
    pub async fn init(&self, signer: &dyn Signer) -> Result<TxOutcome, TraderError> {
        self.send(signer, self.calls.init()).await
    }

    /// Close the contract for trading. Withdrawal stays possible.
    pub async fn close(&self, signer: &dyn Signer) -> Result<TxOutcome, TraderError> {
        self.send(signer, self.calls.close()).await
    }

    /// Create a new contract-custody portfolio for the signer's identity.
    pub async fn create_portfolio(
        &self,
        signer: &dyn Signer,
        name: &PortfolioName,
    ) -> Result<TxOutcome, TraderError> {
        self.send(signer, self.calls.create_portfolio(name)).await
    }

    /// Accept a pre-granted custody authorization over an existing portfolio.
    pub async fn add_portfolio(
        &self,
        signer: &dyn Signer,
        auth_id: u64,
        kind: PortfolioKind,
    ) -> Result<TxOutcome, TraderError> {
        self.send(signer, self.calls.add_portfolio(auth_id, kind)).await
    }

    /// Return the signer's portfolio custody, delisting anything it held.
    pub async fn remove_portfolio(&self, signer: &dyn Signer) -> Result<TxOutcome, TraderError> {
        self.send(signer, self.calls.remove_portfolio()).await
    }

    /// Move NFTs out of contract custody into `dest`.
    pub async fn withdraw(
        &self,
        signer: &dyn Signer,
        nfts: &[NftId],
        dest: PortfolioKind,
    ) -> Result<TxOutcome, TraderError> {
        self.send(signer, self.calls.withdraw(nfts, dest)).await
    }

    /// List NFTs for sale at the given raw-unit prices.
    pub async fn nft_for_sell(
        &self,
        signer: &dyn Signer,
        nfts: &[(NftId, Balance)],
    ) -> Result<TxOutcome, TraderError> {
        self.send(signer, self.calls.nft_for_sell(nfts)).await
    }

    /// Buy a listed NFT, transferring `value` raw units as payment.
    pub async fn buy_nft(
        &self,
        signer: &dyn Signer,
        id: NftId,
        value: Balance,
    ) -> Result<TxOutcome, TraderError> {
        self.send(signer, self.calls.buy_nft(id, value)).await
    }
}
