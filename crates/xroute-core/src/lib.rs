pub mod domain;
pub mod error;
pub mod executor;
pub mod fees;
pub mod gas;
pub mod messages;
pub mod ports;
pub mod proto;
pub mod registry;
pub mod service;
pub mod signing;
pub mod tracker;

pub use domain::{
    AccountData, AssetAmount, BroadcastReceipt, BroadcastResponse, ChainAccount, ChainInfo,
    ChainType, Coin, CosmosOperation, EvmOperation, EvmReceipt, EvmTxRequest, Fee, FeeAsset,
    GasPriceTiers, LegOutcome, Operation, RequiredApproval, Route, RouteOutcome, SignerData,
    TxStatus, TxStatusReport,
};
pub use error::{ErrorKind, RouteError};
pub use executor::{ExecuteRouteOptions, ExecutorConfig, RouteExecutor};
pub use fees::{FeeResolver, GasPrice};
pub use gas::{apply_gas_multiplier, GasEstimator, DEFAULT_GAS_MULTIPLIER};
pub use messages::{AminoMsg, CosmosMessage, StdFee, StdSignDoc};
pub use ports::{
    AccountSource, AminoSignResponse, AminoSigner, ChainConnector, CosmosChainClient,
    DirectSignResponse, DirectSigner, EndpointResolverFn, EvmSigner, GasPriceResolver,
    NoopObserver, PortError, RouteObserver, RoutingServicePort, SignerProvider,
};
pub use registry::{ChainRegistry, EndpointResolver, RegistryChain, RegistryFeeToken};
pub use service::{
    Asset, AssetRecommendation, AssetsFromSourceRequest, AssetsRequest, MsgsRequest,
    RecommendAssetsRequest, RouteQuote, RouteRequest, SubmitTxResponse, SwapVenue,
    TrackTxResponse,
};
pub use signing::{CosmosSigner, SignedTx, SigningStrategy, SigningStrategyTable};
pub use tracker::{TrackOptions, Tracker, DEFAULT_POLL_INTERVAL};
