#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde_json::json;
use sha2::{Digest, Sha256};
use tokio::time::Instant;

use xroute_core::{
    AccountData, AccountSource, AminoSignResponse, AminoSigner, Asset, AssetAmount,
    AssetRecommendation, AssetsFromSourceRequest, AssetsRequest, BroadcastReceipt,
    BroadcastResponse, ChainAccount, ChainConnector, ChainInfo, ChainRegistry, ChainType, Coin,
    CosmosChainClient, CosmosOperation, CosmosSigner, DirectSignResponse, DirectSigner,
    EndpointResolver, EvmReceipt, EvmSigner, EvmTxRequest, ExecutorConfig, FeeAsset,
    GasPriceTiers, LegOutcome, MsgsRequest, Operation, PortError, RecommendAssetsRequest, Route,
    RouteExecutor, RouteObserver, RouteQuote, RouteRequest, RoutingServicePort, SignerProvider,
    StdSignDoc, SubmitTxResponse, SwapVenue, TrackTxResponse, TxStatus, TxStatusReport,
};

pub const HUB: &str = "cosmoshub-4";
pub const OSMOSIS: &str = "osmosis-1";
pub const INJECTIVE: &str = "injective-1";
pub const ETHEREUM: &str = "1";

pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn record(journal: &Journal, entry: impl Into<String>) {
    journal.lock().expect("journal lock").push(entry.into());
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().expect("journal lock").clone()
}

pub fn position(journal: &Journal, entry: &str) -> usize {
    entries(journal)
        .iter()
        .position(|e| e == entry)
        .unwrap_or_else(|| panic!("missing journal entry {entry}"))
}

pub fn count(journal: &Journal, prefix: &str) -> usize {
    entries(journal)
        .iter()
        .filter(|e| e.starts_with(prefix))
        .count()
}

pub fn address_for(chain_id: &str) -> String {
    match chain_id {
        HUB => "cosmos1user".to_owned(),
        OSMOSIS => "osmo1user".to_owned(),
        INJECTIVE => "inj1user".to_owned(),
        other => format!("{other}-user"),
    }
}

pub fn user_addresses(chains: &[&str]) -> HashMap<String, String> {
    chains
        .iter()
        .map(|chain| ((*chain).to_owned(), address_for(chain)))
        .collect()
}

pub fn chain_info(chain_id: &str, denom: &str, average: &str) -> ChainInfo {
    ChainInfo {
        chain_id: chain_id.to_owned(),
        chain_name: chain_id.to_owned(),
        chain_type: ChainType::Cosmos,
        bech32_prefix: None,
        fee_assets: vec![FeeAsset {
            denom: denom.to_owned(),
            gas_price: Some(GasPriceTiers {
                low: String::new(),
                average: average.to_owned(),
                high: String::new(),
            }),
        }],
    }
}

pub fn transfer_op(chain_id: &str, memo: &str) -> Operation {
    Operation::MultiChainMsg(CosmosOperation {
        chain_id: chain_id.to_owned(),
        path: vec![chain_id.to_owned()],
        msg: json!({
            "source_port": "transfer",
            "source_channel": "channel-0",
            "token": {"denom": "uatom", "amount": "1000000"},
            "sender": address_for(chain_id),
            "receiver": "osmo1receiver",
            "timeout_height": {},
            "timeout_timestamp": 1_700_000_000_000_000_000u64,
            "memo": memo,
        })
        .to_string(),
        msg_type_url: "/ibc.applications.transfer.v1.MsgTransfer".to_owned(),
        signer_address: Some(address_for(chain_id)),
    })
}

pub fn route(operations: Vec<Operation>) -> Route {
    let chain_ids = operations.iter().map(|op| op.chain_id().to_owned()).collect();
    Route {
        chain_ids,
        source_asset: AssetAmount {
            chain_id: HUB.to_owned(),
            denom: "uatom".to_owned(),
            amount: "1000000".to_owned(),
        },
        dest_asset: AssetAmount {
            chain_id: OSMOSIS.to_owned(),
            denom: "ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2"
                .to_owned(),
            amount: "999000".to_owned(),
        },
        operations,
    }
}

/// Routing service double. Statuses are served per tx hash in order; once a
/// queue is drained every poll reports completion.
#[derive(Default)]
pub struct MockRouting {
    pub journal: Journal,
    pub chains: Vec<ChainInfo>,
    pub statuses: Mutex<HashMap<String, VecDeque<TxStatus>>>,
    pub default_statuses: Mutex<VecDeque<TxStatus>>,
    pub poll_times: Mutex<Vec<Instant>>,
}

impl MockRouting {
    pub fn new(journal: Journal, chains: Vec<ChainInfo>) -> Self {
        Self {
            journal,
            chains,
            ..Self::default()
        }
    }

    pub fn with_statuses(self, statuses: Vec<TxStatus>) -> Self {
        *self.default_statuses.lock().expect("statuses") = statuses.into();
        self
    }
}

#[async_trait]
impl RoutingServicePort for MockRouting {
    async fn chains(&self) -> Result<Vec<ChainInfo>, PortError> {
        record(&self.journal, "chains");
        Ok(self.chains.clone())
    }

    async fn assets(
        &self,
        _request: &AssetsRequest,
    ) -> Result<HashMap<String, Vec<Asset>>, PortError> {
        Err(PortError::NotImplemented("mock.assets"))
    }

    async fn assets_from_source(
        &self,
        _request: &AssetsFromSourceRequest,
    ) -> Result<HashMap<String, Vec<Asset>>, PortError> {
        Err(PortError::NotImplemented("mock.assets_from_source"))
    }

    async fn route(&self, _request: &RouteRequest) -> Result<RouteQuote, PortError> {
        Err(PortError::NotImplemented("mock.route"))
    }

    async fn messages(&self, _request: &MsgsRequest) -> Result<Vec<Operation>, PortError> {
        Err(PortError::NotImplemented("mock.messages"))
    }

    async fn recommend_assets(
        &self,
        _request: &RecommendAssetsRequest,
    ) -> Result<Vec<AssetRecommendation>, PortError> {
        Err(PortError::NotImplemented("mock.recommend_assets"))
    }

    async fn venues(&self) -> Result<Vec<SwapVenue>, PortError> {
        Err(PortError::NotImplemented("mock.venues"))
    }

    async fn submit_transaction(
        &self,
        chain_id: &str,
        tx_bytes: &[u8],
    ) -> Result<SubmitTxResponse, PortError> {
        record(&self.journal, format!("submit:{chain_id}"));
        Ok(SubmitTxResponse {
            tx_hash: xroute_core::signing::tx_hash(tx_bytes),
        })
    }

    async fn track_transaction(
        &self,
        chain_id: &str,
        tx_hash: &str,
    ) -> Result<TrackTxResponse, PortError> {
        record(&self.journal, format!("track:{chain_id}"));
        Ok(TrackTxResponse {
            tx_hash: tx_hash.to_owned(),
            explorer_link: None,
        })
    }

    async fn transaction_status(
        &self,
        chain_id: &str,
        tx_hash: &str,
    ) -> Result<TxStatusReport, PortError> {
        record(&self.journal, format!("status:{chain_id}"));
        self.poll_times.lock().expect("poll times").push(Instant::now());

        let next = {
            let mut statuses = self.statuses.lock().expect("statuses");
            match statuses.get_mut(tx_hash).and_then(VecDeque::pop_front) {
                Some(status) => Some(status),
                None => self.default_statuses.lock().expect("statuses").pop_front(),
            }
        };
        let status = next.unwrap_or(TxStatus::Completed);
        let raw_state = match status {
            TxStatus::Pending => "STATE_PENDING",
            TxStatus::Completed => "STATE_COMPLETED_SUCCESS",
            TxStatus::Failed => "STATE_COMPLETED_ERROR",
        };
        Ok(TxStatusReport {
            status,
            raw_state: raw_state.to_owned(),
            error: (status == TxStatus::Failed).then(|| "packet timed out".to_owned()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct MockChainState {
    pub account_number: u64,
    pub sequence: u64,
    pub gas_used: u64,
    pub latest_height: u64,
    pub balances: HashMap<String, u128>,
    pub broadcast_code: u32,
    pub simulate_fails: bool,
    /// The address has never been funded, so the auth module has no record of it.
    pub account_missing: bool,
}

impl Default for MockChainState {
    fn default() -> Self {
        Self {
            account_number: 42,
            sequence: 7,
            gas_used: 100_000,
            latest_height: 5_000,
            balances: HashMap::from([("uatom".to_owned(), 10_000_000)]),
            broadcast_code: 0,
            simulate_fails: false,
            account_missing: false,
        }
    }
}

#[derive(Default)]
pub struct MockConnector {
    pub journal: Journal,
    pub chains: HashMap<String, MockChainState>,
    pub broadcasts: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    pub simulations: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl MockConnector {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    pub fn with_chain(mut self, chain_id: &str, state: MockChainState) -> Self {
        self.chains.insert(chain_id.to_owned(), state);
        self
    }

    pub fn last_broadcast(&self) -> Option<(String, Vec<u8>)> {
        self.broadcasts.lock().expect("broadcasts").last().cloned()
    }
}

#[async_trait]
impl ChainConnector for MockConnector {
    async fn connect(
        &self,
        chain_id: &str,
        endpoint: &str,
    ) -> Result<Box<dyn CosmosChainClient>, PortError> {
        record(&self.journal, format!("connect:{chain_id}"));
        let state = self
            .chains
            .get(chain_id)
            .cloned()
            .ok_or_else(|| PortError::Transport(format!("no mock chain at {endpoint}")))?;
        Ok(Box::new(MockChainClient {
            chain_id: chain_id.to_owned(),
            state,
            journal: Arc::clone(&self.journal),
            broadcasts: Arc::clone(&self.broadcasts),
            simulations: Arc::clone(&self.simulations),
        }))
    }
}

pub struct MockChainClient {
    chain_id: String,
    state: MockChainState,
    journal: Journal,
    broadcasts: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    simulations: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

#[async_trait]
impl CosmosChainClient for MockChainClient {
    async fn account(&self, address: &str) -> Result<ChainAccount, PortError> {
        record(&self.journal, format!("account:{}", self.chain_id));
        if self.state.account_missing {
            return Err(PortError::NotFound(format!("account {address} not found")));
        }
        // Every accepted broadcast on this chain bumps the sequence, as the ante handler does.
        let sent = if self.state.broadcast_code == 0 {
            self.broadcasts
                .lock()
                .expect("broadcasts")
                .iter()
                .filter(|(chain_id, _)| *chain_id == self.chain_id)
                .count() as u64
        } else {
            0
        };
        Ok(ChainAccount {
            address: address.to_owned(),
            account_number: self.state.account_number,
            sequence: self.state.sequence + sent,
        })
    }

    async fn balance(&self, _address: &str, denom: &str) -> Result<Coin, PortError> {
        record(&self.journal, format!("balance:{}", self.chain_id));
        let amount = self.state.balances.get(denom).copied().unwrap_or_default();
        Ok(Coin::new(amount, denom))
    }

    async fn simulate(&self, tx_bytes: &[u8]) -> Result<u64, PortError> {
        record(&self.journal, format!("simulate:{}", self.chain_id));
        self.simulations
            .lock()
            .expect("simulations")
            .push((self.chain_id.clone(), tx_bytes.to_vec()));
        if self.state.simulate_fails {
            return Err(PortError::Rejected("insufficient funds".to_owned()));
        }
        Ok(self.state.gas_used)
    }

    async fn broadcast(&self, tx_bytes: &[u8]) -> Result<BroadcastResponse, PortError> {
        record(&self.journal, format!("broadcast:{}", self.chain_id));
        self.broadcasts
            .lock()
            .expect("broadcasts")
            .push((self.chain_id.clone(), tx_bytes.to_vec()));
        Ok(BroadcastResponse {
            tx_hash: xroute_core::signing::tx_hash(tx_bytes),
            code: self.state.broadcast_code,
            raw_log: if self.state.broadcast_code == 0 {
                String::new()
            } else {
                "out of gas".to_owned()
            },
            height: Some(self.state.latest_height + 1),
        })
    }

    async fn latest_height(&self) -> Result<u64, PortError> {
        record(&self.journal, format!("height:{}", self.chain_id));
        Ok(self.state.latest_height)
    }
}

fn account_data(address: &str) -> AccountData {
    AccountData {
        address: address.to_owned(),
        algo: "secp256k1".to_owned(),
        pubkey: vec![0x02; 33],
    }
}

pub struct MockDirectSigner {
    pub journal: Journal,
    pub addresses: Vec<String>,
}

#[async_trait]
impl AccountSource for MockDirectSigner {
    async fn accounts(&self) -> Result<Vec<AccountData>, PortError> {
        Ok(self.addresses.iter().map(|a| account_data(a)).collect())
    }
}

#[async_trait]
impl DirectSigner for MockDirectSigner {
    async fn sign_direct(
        &self,
        _signer_address: &str,
        doc: xroute_core::proto::SignDoc,
    ) -> Result<DirectSignResponse, PortError> {
        record(&self.journal, format!("sign_direct:{}", doc.chain_id));
        Ok(DirectSignResponse {
            signed: doc,
            signature: vec![0x11; 64],
        })
    }
}

pub struct MockAminoSigner {
    pub journal: Journal,
    pub addresses: Vec<String>,
    pub docs: Mutex<Vec<StdSignDoc>>,
}

#[async_trait]
impl AccountSource for MockAminoSigner {
    async fn accounts(&self) -> Result<Vec<AccountData>, PortError> {
        Ok(self.addresses.iter().map(|a| account_data(a)).collect())
    }
}

#[async_trait]
impl AminoSigner for MockAminoSigner {
    async fn sign_amino(
        &self,
        _signer_address: &str,
        doc: StdSignDoc,
    ) -> Result<AminoSignResponse, PortError> {
        record(&self.journal, format!("sign_amino:{}", doc.chain_id));
        self.docs.lock().expect("docs").push(doc.clone());
        let signature = amino_signature(&doc);
        Ok(AminoSignResponse {
            signed: doc,
            signature,
        })
    }
}

/// Stand-in for a secp256k1 signature: the SHA-256 of the canonical doc bytes, twice.
pub fn amino_signature(doc: &StdSignDoc) -> Vec<u8> {
    let digest = Sha256::digest(doc.sign_bytes().expect("amino sign bytes"));
    [digest.as_slice(), digest.as_slice()].concat()
}

pub fn direct_signer(journal: &Journal, chains: &[&str]) -> CosmosSigner {
    CosmosSigner::Direct(Arc::new(MockDirectSigner {
        journal: Arc::clone(journal),
        addresses: chains.iter().map(|c| address_for(c)).collect(),
    }))
}

pub fn amino_signer(journal: &Journal, chains: &[&str]) -> (CosmosSigner, Arc<MockAminoSigner>) {
    let signer = Arc::new(MockAminoSigner {
        journal: Arc::clone(journal),
        addresses: chains.iter().map(|c| address_for(c)).collect(),
        docs: Mutex::new(Vec::new()),
    });
    (CosmosSigner::Amino(signer.clone()), signer)
}

pub struct MockEvmSigner {
    pub journal: Journal,
    pub owner: Address,
    pub allowance: U256,
    /// Receipt outcomes served in order; success once drained.
    pub receipts: Mutex<VecDeque<bool>>,
    pub sent: Mutex<Vec<EvmTxRequest>>,
}

impl MockEvmSigner {
    pub fn new(journal: &Journal, allowance: U256) -> Self {
        Self {
            journal: Arc::clone(journal),
            owner: Address::repeat_byte(0xaa),
            allowance,
            receipts: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EvmSigner for MockEvmSigner {
    async fn address(&self) -> Result<Address, PortError> {
        Ok(self.owner)
    }

    async fn chain_id(&self) -> Result<u64, PortError> {
        Ok(1)
    }

    async fn read_contract(&self, _to: Address, _data: Bytes) -> Result<Bytes, PortError> {
        record(&self.journal, "evm_read");
        Ok(Bytes::from(self.allowance.to_be_bytes::<32>().to_vec()))
    }

    async fn send_transaction(&self, tx: EvmTxRequest) -> Result<B256, PortError> {
        let mut sent = self.sent.lock().expect("sent");
        sent.push(tx);
        record(&self.journal, format!("evm_send:{}", sent.len()));
        Ok(B256::repeat_byte(sent.len() as u8))
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<EvmReceipt, PortError> {
        record(&self.journal, "evm_receipt");
        let success = self
            .receipts
            .lock()
            .expect("receipts")
            .pop_front()
            .unwrap_or(true);
        Ok(EvmReceipt {
            tx_hash,
            success,
            block_number: Some(19_000_000),
        })
    }
}

#[derive(Default)]
pub struct MockSigners {
    pub cosmos: HashMap<String, CosmosSigner>,
    pub evm: HashMap<String, Arc<dyn EvmSigner>>,
}

impl MockSigners {
    pub fn with_cosmos(mut self, chain_id: &str, signer: CosmosSigner) -> Self {
        self.cosmos.insert(chain_id.to_owned(), signer);
        self
    }

    pub fn with_evm(mut self, chain_id: &str, signer: Arc<dyn EvmSigner>) -> Self {
        self.evm.insert(chain_id.to_owned(), signer);
        self
    }
}

#[async_trait]
impl SignerProvider for MockSigners {
    async fn cosmos_signer(&self, chain_id: &str) -> Result<Option<CosmosSigner>, PortError> {
        Ok(self.cosmos.get(chain_id).cloned())
    }

    async fn evm_signer(
        &self,
        chain_id: &str,
    ) -> Result<Option<Arc<dyn EvmSigner>>, PortError> {
        Ok(self.evm.get(chain_id).cloned())
    }
}

pub struct RecordingObserver {
    pub journal: Journal,
}

#[async_trait]
impl RouteObserver for RecordingObserver {
    async fn on_transaction_broadcast(&self, index: usize, receipt: &BroadcastReceipt) {
        record(
            &self.journal,
            format!("cb_broadcast:{index}:{}", receipt.chain_id),
        );
    }

    async fn on_transaction_completed(&self, outcome: &LegOutcome) {
        record(
            &self.journal,
            format!("cb_completed:{}:{}", outcome.index, outcome.chain_id),
        );
    }
}

pub type TestExecutor = RouteExecutor<MockRouting, MockConnector>;

pub fn executor(routing: MockRouting, connector: MockConnector, chains: &[&str]) -> TestExecutor {
    let endpoints = chains.iter().fold(EndpointResolver::default(), |resolver, chain| {
        resolver.with_endpoint(*chain, format!("mock://{chain}"))
    });
    RouteExecutor::new(
        routing,
        connector,
        Arc::new(ChainRegistry::default()),
        ExecutorConfig {
            endpoints,
            ..ExecutorConfig::default()
        },
    )
}
