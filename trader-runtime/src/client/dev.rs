//! In-memory development chain.
//!
//! Simulates just enough of the chain and the deployed trader contract to
//! run the deployment sequence, the HTTP frontend, and the test suite
//! locally: identities, portfolio custody, NFT ownership, sales, block
//! production with contract events, and scripted failure injection.
//!
//! Dry runs execute against a throwaway copy of the state; submissions
//! commit and produce a block. A call whose domain logic fails is still
//! included (`success == false`, no events), matching real chain behavior.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use codec::{Decode, Encode};
use tokio::sync::mpsc;
use tracing::debug;

use crate::abi::{CONSTRUCTOR_LABEL, ContractEvent, GasLimit, Method, Selector};
use crate::client::{BlockEvents, ChainClient, ContractEmitted, EventFeed, InBlock, Signer};
use crate::error::{ContractError, RuntimeError, TraderError};
use crate::types::{
    AccountId, Balance, IdentityId, NftId, NftPrice, NftSaleDetails, PortfolioId, PortfolioKind,
    PortfolioName, Ticker, VenueId,
};

/// A local signer for the development chain.
pub struct DevSigner {
    account: AccountId,
    approves: bool,
}

impl DevSigner {
    pub fn new(account: AccountId) -> Self {
        DevSigner {
            account,
            approves: true,
        }
    }

    /// A signer that declines every signing request.
    pub fn rejecting(account: AccountId) -> Self {
        DevSigner {
            account,
            approves: false,
        }
    }
}

impl Signer for DevSigner {
    fn account(&self) -> AccountId {
        self.account
    }

    fn approve(&self, _call_data: &[u8]) -> Result<(), TraderError> {
        if self.approves {
            Ok(())
        } else {
            Err(TraderError::SigningRejected("signing request declined".into()))
        }
    }
}

/// Deterministic dev account derived from a single seed byte.
pub fn dev_account(seed: u8) -> AccountId {
    AccountId([seed; 32])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LifeCycle {
    #[default]
    Deployed,
    Initialized,
    Closed,
}

#[derive(Debug, Clone, Default)]
struct TraderContractState {
    state: LifeCycle,
    admin: Option<AccountId>,
    ticker: Ticker,
    venue: VenueId,
    did: Option<IdentityId>,
    /// Contract-custody portfolio and held NFTs, per owner identity.
    portfolios: HashMap<IdentityId, (PortfolioId, BTreeSet<NftId>)>,
    sales: BTreeMap<NftId, NftSaleDetails>,
}

/// How a dispatched call failed: unreadable input vs a domain rejection.
enum CallFailure {
    Lang,
    Domain(ContractError),
}

impl From<ContractError> for CallFailure {
    fn from(err: ContractError) -> Self {
        CallFailure::Domain(err)
    }
}

#[derive(Clone)]
struct DevChain {
    block_number: u64,
    identities: HashMap<AccountId, IdentityId>,
    next_identity: u64,
    contracts: HashMap<AccountId, TraderContractState>,
    next_contract: u64,
    next_venue: u64,
    next_portfolio: u64,
    /// Pending portfolio-custody authorizations: auth id → (grantor, kind).
    portfolio_auths: HashMap<u64, (IdentityId, PortfolioKind)>,
    next_auth: u64,
    /// Collection-wide NFT custody.
    nft_owners: HashMap<NftId, PortfolioId>,
    subscribers: Vec<mpsc::UnboundedSender<BlockEvents>>,
    /// Scripted domain failures, consumed on the next matching call.
    fail_next: HashMap<Selector, ContractError>,
    /// Scripted in-block reverts: only submissions hit these. The cause
    /// persists, so a follow-up dry run reproduces the same error.
    fail_submission: HashMap<Selector, ContractError>,
}

impl DevChain {
    fn new() -> Self {
        DevChain {
            block_number: 0,
            identities: HashMap::new(),
            next_identity: 1,
            contracts: HashMap::new(),
            next_contract: 1,
            next_venue: 1,
            next_portfolio: 1,
            portfolio_auths: HashMap::new(),
            next_auth: 1,
            nft_owners: HashMap::new(),
            subscribers: Vec::new(),
            fail_next: HashMap::new(),
            fail_submission: HashMap::new(),
        }
    }

    fn caller_did(&self, origin: &AccountId) -> Result<IdentityId, ContractError> {
        self.identities
            .get(origin)
            .copied()
            .ok_or(ContractError::Runtime(RuntimeError::MissingIdentity))
    }

    /// Execute a contract call against this state, mutating it on success.
    fn execute(
        &mut self,
        contract_addr: &AccountId,
        origin: &AccountId,
        value: Balance,
        data: &[u8],
    ) -> Result<ExecOutcome, TraderError> {
        if !self.contracts.contains_key(contract_addr) {
            return Err(TraderError::Dispatch(format!(
                "no contract at {contract_addr}"
            )));
        }
        if data.len() < 4 {
            return Ok(ExecOutcome::lang_error());
        }
        let selector = Selector([data[0], data[1], data[2], data[3]]);
        let method = match Method::ALL.iter().find(|m| m.selector() == selector) {
            Some(m) => *m,
            None => return Ok(ExecOutcome::lang_error()),
        };

        match self.dispatch(contract_addr, origin, value, method, &data[4..]) {
            Ok((value_bytes, events)) => Ok(ExecOutcome::ok(value_bytes, events)),
            Err(CallFailure::Domain(err)) => Ok(ExecOutcome::domain_error(err)),
            Err(CallFailure::Lang) => Ok(ExecOutcome::lang_error()),
        }
    }

    fn dispatch(
        &mut self,
        contract_addr: &AccountId,
        origin: &AccountId,
        value: Balance,
        method: Method,
        args: &[u8],
    ) -> Result<(Vec<u8>, Vec<ContractEvent>), CallFailure> {
        match method {
            Method::Init => {
                decode_args::<()>(args)?;
                let caller = *origin;
                let venue = VenueId(self.next_venue);
                let contract = self.contract_mut(contract_addr)?;
                ensure_admin(contract, &caller)?;
                if contract.state != LifeCycle::Deployed {
                    return Err(ContractError::AlreadyInitialized.into());
                }
                let did = contract
                    .did
                    .ok_or(ContractError::Runtime(RuntimeError::MissingIdentity))?;
                contract.venue = venue;
                contract.state = LifeCycle::Initialized;
                self.next_venue += 1;
                debug!(%did, "dev contract initialized");
                Ok((().encode(), vec![]))
            }
            Method::Close => {
                decode_args::<()>(args)?;
                let caller = *origin;
                let contract = self.contract_mut(contract_addr)?;
                ensure_admin(contract, &caller)?;
                contract.state = LifeCycle::Closed;
                Ok((().encode(), vec![]))
            }
            Method::CreatePortfolio => {
                let _name = decode_args::<PortfolioName>(args)?;
                let did = self.caller_did(origin)?;
                let contract = self.contract_mut(contract_addr)?;
                ensure_ready(contract)?;
                if contract.portfolios.contains_key(&did) {
                    return Err(ContractError::AlreadyHavePortfolio.into());
                }
                let portfolio = PortfolioId {
                    did,
                    kind: PortfolioKind::User(self.next_portfolio),
                };
                self.next_portfolio += 1;
                let contract = self.contract_mut(contract_addr)?;
                contract.portfolios.insert(did, (portfolio, BTreeSet::new()));
                Ok((().encode(), vec![ContractEvent::PortfolioAdded { portfolio }]))
            }
            Method::AddPortfolio => {
                let (auth_id, kind) = decode_args::<(u64, PortfolioKind)>(args)?;
                ensure_ready(self.contract_mut(contract_addr)?)?;
                let (grantor, granted_kind) = self
                    .portfolio_auths
                    .remove(&auth_id)
                    .ok_or(ContractError::InvalidPortfolioAuthorization)?;
                if granted_kind != kind {
                    return Err(ContractError::InvalidPortfolioAuthorization.into());
                }
                let contract = self.contract_mut(contract_addr)?;
                if contract.portfolios.contains_key(&grantor) {
                    return Err(ContractError::AlreadyHavePortfolio.into());
                }
                let portfolio = PortfolioId { did: grantor, kind };
                contract
                    .portfolios
                    .insert(grantor, (portfolio, BTreeSet::new()));
                Ok((().encode(), vec![ContractEvent::PortfolioAdded { portfolio }]))
            }
            Method::RemovePortfolio => {
                decode_args::<()>(args)?;
                let did = self.caller_did(origin)?;
                let contract = self.contract_mut(contract_addr)?;
                ensure_withdraw(contract)?;
                let (portfolio, nfts) = contract
                    .portfolios
                    .remove(&did)
                    .ok_or(ContractError::NoPortfolio)?;
                for id in &nfts {
                    contract.sales.remove(id);
                }
                Ok((().encode(), vec![ContractEvent::PortfolioRemoved { portfolio }]))
            }
            Method::Withdraw => {
                let (ids, dest) = decode_args::<(Vec<NftId>, PortfolioKind)>(args)?;
                let did = self.caller_did(origin)?;
                let contract = self.contract_mut(contract_addr)?;
                ensure_withdraw(contract)?;
                let (portfolio, nfts) = contract
                    .portfolios
                    .get_mut(&did)
                    .ok_or(ContractError::NoPortfolio)?;
                let portfolio = *portfolio;
                for id in &ids {
                    if !nfts.remove(id) {
                        return Err(ContractError::NotInPortfolio.into());
                    }
                    contract.sales.remove(id);
                }
                let dest = PortfolioId { did, kind: dest };
                for id in &ids {
                    self.nft_owners.insert(*id, dest);
                }
                Ok((
                    ().encode(),
                    vec![ContractEvent::WithdrawnNfts { portfolio, nfts: ids }],
                ))
            }
            Method::NftForSell => {
                let listed = decode_args::<Vec<(NftId, Balance)>>(args)?;
                let did = self.caller_did(origin)?;
                let account = *origin;
                let contract = self.contract_mut(contract_addr)?;
                ensure_ready(contract)?;
                let portfolio = contract
                    .portfolios
                    .get(&did)
                    .map(|(portfolio, _)| *portfolio)
                    .ok_or(ContractError::NoPortfolio)?;
                for (id, _) in &listed {
                    if self.nft_owners.get(id) != Some(&portfolio) {
                        return Err(ContractError::NotInPortfolio.into());
                    }
                }
                let contract = self.contract_mut(contract_addr)?;
                let (_, nfts) = contract
                    .portfolios
                    .get_mut(&did)
                    .ok_or(ContractError::NoPortfolio)?;
                for (id, price) in &listed {
                    nfts.insert(*id);
                    contract.sales.insert(
                        *id,
                        NftSaleDetails {
                            account,
                            did,
                            price: *price,
                        },
                    );
                }
                Ok((
                    ().encode(),
                    vec![ContractEvent::NftsForSale {
                        portfolio,
                        nfts: listed,
                    }],
                ))
            }
            Method::BuyNft => {
                let id = decode_args::<NftId>(args)?;
                let did = self.caller_did(origin)?;
                let contract = self.contract_mut(contract_addr)?;
                ensure_ready(contract)?;
                let sale = contract.sales.remove(&id).ok_or(ContractError::NotForSale)?;
                if !contract.portfolios.contains_key(&sale.did) {
                    return Err(ContractError::MissingPortfolio.into());
                }
                if sale.price > value {
                    return Err(ContractError::TransferredValueTooLow.into());
                }
                let buyer_portfolio = contract
                    .portfolios
                    .get(&did)
                    .map(|(portfolio, _)| *portfolio)
                    .ok_or(ContractError::NoPortfolio)?;
                let (_, seller_nfts) = contract
                    .portfolios
                    .get_mut(&sale.did)
                    .ok_or(ContractError::MissingPortfolio)?;
                if !seller_nfts.remove(&id) {
                    return Err(ContractError::NotInPortfolio.into());
                }
                if let Some((_, buyer_nfts)) = contract.portfolios.get_mut(&did) {
                    buyer_nfts.insert(id);
                }
                self.nft_owners.insert(id, buyer_portfolio);
                Ok((
                    ().encode(),
                    vec![ContractEvent::NftSold {
                        portfolio: buyer_portfolio,
                        id,
                        amount: value,
                    }],
                ))
            }
            Method::Venue => {
                decode_args::<()>(args)?;
                let contract = self.contract_mut(contract_addr)?;
                ensure_ready(contract)?;
                Ok((contract.venue.encode(), vec![]))
            }
            Method::ContractDid => {
                decode_args::<()>(args)?;
                let contract = self.contract_mut(contract_addr)?;
                ensure_ready(contract)?;
                let did = contract
                    .did
                    .ok_or(ContractError::Runtime(RuntimeError::MissingIdentity))?;
                Ok((did.encode(), vec![]))
            }
            Method::Ticker => {
                decode_args::<()>(args)?;
                let contract = self.contract_mut(contract_addr)?;
                Ok((contract.ticker.encode(), vec![]))
            }
            Method::Admin => {
                decode_args::<()>(args)?;
                let contract = self.contract_mut(contract_addr)?;
                Ok((contract.admin.encode(), vec![]))
            }
            Method::IsOpen => {
                decode_args::<()>(args)?;
                let contract = self.contract_mut(contract_addr)?;
                match contract.state {
                    LifeCycle::Deployed => Err(ContractError::NotInitialized.into()),
                    LifeCycle::Initialized => Ok((true.encode(), vec![])),
                    LifeCycle::Closed => Ok((false.encode(), vec![])),
                }
            }
            Method::HavePortfolio => {
                decode_args::<()>(args)?;
                let did = self.caller_did(origin)?;
                let contract = self.contract_mut(contract_addr)?;
                ensure_withdraw(contract)?;
                let portfolio = contract.portfolios.get(&did).map(|(portfolio, _)| *portfolio);
                Ok((portfolio.encode(), vec![]))
            }
            Method::Nfts => {
                decode_args::<()>(args)?;
                let did = self.caller_did(origin)?;
                let contract = self.contract_mut(contract_addr)?;
                ensure_withdraw(contract)?;
                let (_, nfts) = contract
                    .portfolios
                    .get(&did)
                    .ok_or(ContractError::NoPortfolio)?;
                let ids: Vec<NftId> = nfts.iter().copied().collect();
                Ok((ids.encode(), vec![]))
            }
            Method::NftSaleDetails => {
                let id = decode_args::<NftId>(args)?;
                let contract = self.contract_mut(contract_addr)?;
                ensure_ready(contract)?;
                Ok((contract.sales.get(&id).cloned().encode(), vec![]))
            }
            Method::NftPrices => {
                decode_args::<()>(args)?;
                let contract = self.contract_mut(contract_addr)?;
                ensure_ready(contract)?;
                let prices: Vec<NftPrice> = contract
                    .sales
                    .iter()
                    .map(|(id, sale)| NftPrice {
                        id: *id,
                        price: sale.price,
                    })
                    .collect();
                Ok((prices.encode(), vec![]))
            }
        }
    }

    fn contract_mut(
        &mut self,
        addr: &AccountId,
    ) -> Result<&mut TraderContractState, CallFailure> {
        // Existence is checked by execute(); missing here means a race we
        // don't model, treat it as unreadable input.
        self.contracts.get_mut(addr).ok_or(CallFailure::Lang)
    }

    /// Produce a block carrying the given contract events and notify all
    /// live subscribers.
    fn produce_block(&mut self, contract: &AccountId, events: &[ContractEvent]) -> (u64, String) {
        self.block_number += 1;
        let number = self.block_number;
        let hash = h256_hex(b'b', number);
        let emitted: Vec<ContractEmitted> = events
            .iter()
            .map(|event| ContractEmitted {
                contract: *contract,
                data: event.encode(),
            })
            .collect();
        let block = BlockEvents {
            block_number: number,
            block_hash: hash.clone(),
            events: emitted,
        };
        self.subscribers.retain(|tx| tx.send(block.clone()).is_ok());
        (number, hash)
    }
}

struct ExecOutcome {
    payload: Vec<u8>,
    events: Vec<ContractEvent>,
    domain_ok: bool,
}

impl ExecOutcome {
    fn ok(value_bytes: Vec<u8>, events: Vec<ContractEvent>) -> Self {
        // Ok(Ok(value))
        let mut payload = vec![0u8, 0u8];
        payload.extend(value_bytes);
        ExecOutcome {
            payload,
            events,
            domain_ok: true,
        }
    }

    fn domain_error(err: ContractError) -> Self {
        // Ok(Err(err))
        let mut payload = vec![0u8, 1u8];
        err.encode_to(&mut payload);
        ExecOutcome {
            payload,
            events: vec![],
            domain_ok: false,
        }
    }

    fn lang_error() -> Self {
        // Err(LangError::CouldNotReadInput)
        ExecOutcome {
            payload: vec![1u8, 0u8],
            events: vec![],
            domain_ok: false,
        }
    }
}

fn ensure_admin(contract: &TraderContractState, caller: &AccountId) -> Result<(), ContractError> {
    if contract.admin.as_ref() == Some(caller) {
        Ok(())
    } else {
        Err(ContractError::NotAdmin)
    }
}

fn ensure_ready(contract: &TraderContractState) -> Result<(), ContractError> {
    match contract.state {
        LifeCycle::Initialized => Ok(()),
        LifeCycle::Closed => Err(ContractError::ContractClosed),
        LifeCycle::Deployed => Err(ContractError::NotInitialized),
    }
}

/// Withdrawal-path state check: withdrawal stays allowed after close.
fn ensure_withdraw(contract: &TraderContractState) -> Result<(), ContractError> {
    match contract.state {
        LifeCycle::Initialized | LifeCycle::Closed => Ok(()),
        LifeCycle::Deployed => Err(ContractError::NotInitialized),
    }
}

/// Strict argument decode: the whole argument buffer must be consumed.
fn decode_args<T: Decode>(mut input: &[u8]) -> Result<T, CallFailure> {
    let value = T::decode(&mut input).map_err(|_| CallFailure::Lang)?;
    if !input.is_empty() {
        return Err(CallFailure::Lang);
    }
    Ok(value)
}

fn h256_hex(tag: u8, n: u64) -> String {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update([tag]);
    hasher.update(n.to_le_bytes());
    format!("0x{}", hex::encode(hasher.finalize()))
}

fn selector_of(data: &[u8]) -> Option<Selector> {
    if data.len() < 4 {
        return None;
    }
    Some(Selector([data[0], data[1], data[2], data[3]]))
}

fn identity_id(n: u64) -> IdentityId {
    let mut bytes = [0u8; 32];
    bytes[0] = 0xd1;
    bytes[24..].copy_from_slice(&n.to_be_bytes());
    IdentityId(bytes)
}

/// The in-memory development chain client.
#[derive(Clone)]
pub struct DevChainClient {
    inner: Arc<Mutex<DevChain>>,
}

impl Default for DevChainClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DevChainClient {
    pub fn new() -> Self {
        DevChainClient {
            inner: Arc::new(Mutex::new(DevChain::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DevChain> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an on-chain identity for an account.
    pub fn register_identity(&self, account: &AccountId) -> IdentityId {
        let mut chain = self.lock();
        if let Some(did) = chain.identities.get(account) {
            return *did;
        }
        let did = identity_id(chain.next_identity);
        chain.next_identity += 1;
        chain.identities.insert(*account, did);
        did
    }

    /// Place an NFT of the collection into the given portfolio.
    pub fn mint_nft(&self, id: NftId, owner: PortfolioId) {
        self.lock().nft_owners.insert(id, owner);
    }

    /// Current custodial portfolio of an NFT, if any.
    pub fn nft_owner(&self, id: NftId) -> Option<PortfolioId> {
        self.lock().nft_owners.get(&id).copied()
    }

    /// Grant a portfolio-custody authorization, returning its auth id.
    pub fn grant_portfolio_auth(&self, did: IdentityId, kind: PortfolioKind) -> u64 {
        let mut chain = self.lock();
        let auth_id = chain.next_auth;
        chain.next_auth += 1;
        chain.portfolio_auths.insert(auth_id, (did, kind));
        auth_id
    }

    /// Script a domain failure for the next call to `method`, regardless of
    /// the contract's actual state.
    pub fn fail_next(&self, method: Method, err: ContractError) {
        self.lock().fail_next.insert(method.selector(), err);
    }

    /// Script an in-block revert for the next submission of `method`. Dry
    /// runs do not see it until the revert has happened, after which they
    /// reproduce the same error once.
    pub fn fail_submission(&self, method: Method, err: ContractError) {
        self.lock().fail_submission.insert(method.selector(), err);
    }

    fn take_scripted_failure(&self, data: &[u8]) -> Option<ContractError> {
        let selector = selector_of(data)?;
        self.lock().fail_next.remove(&selector)
    }

    fn take_submission_failure(&self, data: &[u8]) -> Option<ContractError> {
        let selector = selector_of(data)?;
        let mut chain = self.lock();
        let err = chain.fail_submission.remove(&selector)?;
        // Leave the cause behind for the recovery dry run.
        chain.fail_next.insert(selector, err.clone());
        Some(err)
    }
}

#[async_trait]
impl ChainClient for DevChainClient {
    async fn dry_run(
        &self,
        origin: &AccountId,
        contract: &AccountId,
        value: Balance,
        _gas_limit: Option<GasLimit>,
        data: &[u8],
    ) -> Result<Vec<u8>, TraderError> {
        if let Some(err) = self.take_scripted_failure(data) {
            return Ok(ExecOutcome::domain_error(err).payload);
        }
        // Execute against a copy; dry runs never commit.
        let mut scratch = self.lock().clone();
        let outcome = scratch.execute(contract, origin, value, data)?;
        Ok(outcome.payload)
    }

    async fn submit_call(
        &self,
        signer: &dyn Signer,
        contract: &AccountId,
        value: Balance,
        _gas_limit: Option<GasLimit>,
        data: &[u8],
    ) -> Result<InBlock, TraderError> {
        signer.approve(data)?;
        let origin = signer.account();
        let scripted = self
            .take_submission_failure(data)
            .or_else(|| self.take_scripted_failure(data));
        let mut chain = self.lock();
        let outcome = match scripted {
            Some(err) => ExecOutcome::domain_error(err),
            None => {
                let mut scratch = chain.clone();
                let outcome = scratch.execute(contract, &origin, value, data)?;
                if outcome.domain_ok {
                    *chain = scratch;
                }
                outcome
            }
        };
        let (number, block_hash) = chain.produce_block(contract, &outcome.events);
        let events = outcome
            .events
            .iter()
            .map(|event| ContractEmitted {
                contract: *contract,
                data: event.encode(),
            })
            .collect();
        Ok(InBlock {
            tx_hash: h256_hex(b't', number),
            block_hash,
            success: outcome.domain_ok,
            events,
        })
    }

    async fn deploy(
        &self,
        signer: &dyn Signer,
        _code: &[u8],
        constructor_data: &[u8],
    ) -> Result<AccountId, TraderError> {
        signer.approve(constructor_data)?;
        if constructor_data.len() < 4
            || constructor_data[..4] != Selector::for_label(CONSTRUCTOR_LABEL).0
        {
            return Err(TraderError::Dispatch("unknown constructor selector".into()));
        }
        let mut args = &constructor_data[4..];
        let ticker = Ticker::decode(&mut args)
            .map_err(|e| TraderError::Dispatch(format!("malformed constructor arguments: {e}")))?;
        if !args.is_empty() {
            return Err(TraderError::Dispatch(
                "trailing bytes in constructor arguments".into(),
            ));
        }

        let mut chain = self.lock();
        let mut bytes = [0u8; 32];
        bytes[0] = 0xc0;
        bytes[24..].copy_from_slice(&chain.next_contract.to_be_bytes());
        let address = AccountId(bytes);
        chain.next_contract += 1;
        chain.contracts.insert(
            address,
            TraderContractState {
                admin: Some(signer.account()),
                ticker,
                ..Default::default()
            },
        );
        chain.produce_block(&address, &[]);
        debug!(%address, "dev contract deployed");
        Ok(address)
    }

    async fn create_child_identity(
        &self,
        signer: &dyn Signer,
        contract: &AccountId,
    ) -> Result<InBlock, TraderError> {
        signer.approve(&contract.0)?;
        let mut chain = self.lock();
        if !chain.contracts.contains_key(contract) {
            return Err(TraderError::Dispatch(format!("no contract at {contract}")));
        }
        let did = identity_id(chain.next_identity);
        chain.next_identity += 1;
        chain.identities.insert(*contract, did);
        if let Some(state) = chain.contracts.get_mut(contract) {
            state.did = Some(did);
        }
        let (number, block_hash) = chain.produce_block(contract, &[]);
        Ok(InBlock {
            tx_hash: h256_hex(b't', number),
            block_hash,
            success: true,
            events: vec![],
        })
    }

    async fn key_identity(&self, account: &AccountId) -> Result<Option<IdentityId>, TraderError> {
        Ok(self.lock().identities.get(account).copied())
    }

    fn subscribe_events(&self) -> EventFeed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscribers.push(tx);
        rx
    }
}
