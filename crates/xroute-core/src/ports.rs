use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    AccountData, BroadcastReceipt, BroadcastResponse, ChainAccount, ChainInfo, Coin, EvmReceipt,
    EvmTxRequest, LegOutcome, Operation, TxStatusReport,
};
use crate::fees::GasPrice;
use crate::messages::StdSignDoc;
use crate::proto::SignDoc;
use crate::service::{
    Asset, AssetRecommendation, AssetsFromSourceRequest, AssetsRequest, MsgsRequest,
    RecommendAssetsRequest, RouteQuote, RouteRequest, SubmitTxResponse, SwapVenue,
    TrackTxResponse,
};
use crate::signing::CosmosSigner;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rejected: {0}")]
    Rejected(String),
}

/// HTTP surface of the routing and status-tracking service.
#[async_trait]
pub trait RoutingServicePort: Send + Sync {
    async fn chains(&self) -> Result<Vec<ChainInfo>, PortError>;
    async fn assets(&self, request: &AssetsRequest)
        -> Result<HashMap<String, Vec<Asset>>, PortError>;
    async fn assets_from_source(
        &self,
        request: &AssetsFromSourceRequest,
    ) -> Result<HashMap<String, Vec<Asset>>, PortError>;
    async fn route(&self, request: &RouteRequest) -> Result<RouteQuote, PortError>;
    async fn messages(&self, request: &MsgsRequest) -> Result<Vec<Operation>, PortError>;
    async fn recommend_assets(
        &self,
        request: &RecommendAssetsRequest,
    ) -> Result<Vec<AssetRecommendation>, PortError>;
    async fn venues(&self) -> Result<Vec<SwapVenue>, PortError>;
    async fn submit_transaction(
        &self,
        chain_id: &str,
        tx_bytes: &[u8],
    ) -> Result<SubmitTxResponse, PortError>;
    async fn track_transaction(
        &self,
        chain_id: &str,
        tx_hash: &str,
    ) -> Result<TrackTxResponse, PortError>;
    async fn transaction_status(
        &self,
        chain_id: &str,
        tx_hash: &str,
    ) -> Result<TxStatusReport, PortError>;
}

/// Per-chain query and broadcast client. Opened by a [`ChainConnector`] and
/// dropped once the caller is done with it.
#[async_trait]
pub trait CosmosChainClient: Send + Sync {
    async fn account(&self, address: &str) -> Result<ChainAccount, PortError>;
    async fn balance(&self, address: &str, denom: &str) -> Result<Coin, PortError>;
    /// Gas used by the simulated transaction.
    async fn simulate(&self, tx_bytes: &[u8]) -> Result<u64, PortError>;
    async fn broadcast(&self, tx_bytes: &[u8]) -> Result<BroadcastResponse, PortError>;
    async fn latest_height(&self) -> Result<u64, PortError>;
}

#[async_trait]
pub trait ChainConnector: Send + Sync {
    async fn connect(
        &self,
        chain_id: &str,
        endpoint: &str,
    ) -> Result<Box<dyn CosmosChainClient>, PortError>;
}

#[async_trait]
pub trait AccountSource: Send + Sync {
    async fn accounts(&self) -> Result<Vec<AccountData>, PortError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectSignResponse {
    /// The document as signed. Wallets may rewrite the fee before signing.
    pub signed: SignDoc,
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AminoSignResponse {
    pub signed: StdSignDoc,
    pub signature: Vec<u8>,
}

#[async_trait]
pub trait DirectSigner: AccountSource {
    async fn sign_direct(
        &self,
        signer_address: &str,
        doc: SignDoc,
    ) -> Result<DirectSignResponse, PortError>;
}

#[async_trait]
pub trait AminoSigner: AccountSource {
    async fn sign_amino(
        &self,
        signer_address: &str,
        doc: StdSignDoc,
    ) -> Result<AminoSignResponse, PortError>;
}

#[async_trait]
pub trait EvmSigner: Send + Sync {
    async fn address(&self) -> Result<Address, PortError>;
    async fn chain_id(&self) -> Result<u64, PortError>;
    /// `eth_call` against the latest block.
    async fn read_contract(&self, to: Address, data: Bytes) -> Result<Bytes, PortError>;
    async fn send_transaction(&self, tx: EvmTxRequest) -> Result<B256, PortError>;
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<EvmReceipt, PortError>;

    async fn write_contract(&self, to: Address, data: Bytes) -> Result<B256, PortError> {
        self.send_transaction(EvmTxRequest {
            to,
            data,
            value: Default::default(),
        })
        .await
    }
}

/// Hands out the signer for a chain, if the wallet has one.
#[async_trait]
pub trait SignerProvider: Send + Sync {
    async fn cosmos_signer(&self, chain_id: &str) -> Result<Option<CosmosSigner>, PortError>;
    async fn evm_signer(&self, chain_id: &str)
        -> Result<Option<Arc<dyn EvmSigner>>, PortError>;
}

#[async_trait]
pub trait GasPriceResolver: Send + Sync {
    async fn gas_price(&self, chain_id: &str) -> Result<Option<GasPrice>, PortError>;
}

/// Per-leg lifecycle callbacks. Each is awaited before the executor moves on.
#[async_trait]
pub trait RouteObserver: Send + Sync {
    async fn on_transaction_broadcast(&self, _index: usize, _receipt: &BroadcastReceipt) {}

    async fn on_transaction_completed(&self, _outcome: &LegOutcome) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RouteObserver for NoopObserver {}

pub type EndpointResolverFn = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;
