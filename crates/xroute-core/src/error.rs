use std::time::Duration;

use thiserror::Error;

use crate::ports::PortError;

/// Coarse classification of [`RouteError`] for callers that branch on failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Precondition,
    OnChain,
    Network,
    Aborted,
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("no user address supplied for chain {chain_id}")]
    MissingAddress { chain_id: String },
    #[error("no signer available for chain {chain_id}")]
    MissingSigner { chain_id: String },
    #[error("unable to resolve a gas price for chain {chain_id}")]
    GasPriceUnresolved { chain_id: String },
    #[error("unable to resolve an endpoint for chain {chain_id}")]
    EndpointUnresolved { chain_id: String },
    #[error("unsupported message type {type_url}")]
    UnsupportedMessage { type_url: String },
    #[error("invalid message: {0}")]
    InvalidMessage(String),
    #[error("failed to retrieve account {address} from signer")]
    SignerAccountNotFound { address: String },
    #[error(
        "insufficient balance on {chain_id}: required {required}{denom}, available {available}{denom}"
    )]
    InsufficientBalance {
        chain_id: String,
        denom: String,
        required: u128,
        available: u128,
    },
    #[error("transaction {tx_hash} rejected by {chain_id} with code {code}: {log}")]
    BroadcastRejected {
        chain_id: String,
        tx_hash: String,
        code: u32,
        log: String,
    },
    #[error("{stage} transaction {tx_hash} reverted on chain {chain_id}")]
    EvmReverted {
        chain_id: String,
        tx_hash: String,
        stage: &'static str,
    },
    #[error("transfer {tx_hash} from {chain_id} failed in state {state}")]
    TransferFailed {
        chain_id: String,
        tx_hash: String,
        state: String,
        reason: Option<String>,
    },
    #[error("route execution cancelled")]
    Cancelled,
    #[error("tracking {tx_hash} on {chain_id} timed out after {elapsed:?}")]
    TrackingTimedOut {
        chain_id: String,
        tx_hash: String,
        elapsed: Duration,
    },
    #[error(transparent)]
    Port(#[from] PortError),
}

impl RouteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RouteError::MissingAddress { .. }
            | RouteError::MissingSigner { .. }
            | RouteError::GasPriceUnresolved { .. }
            | RouteError::EndpointUnresolved { .. }
            | RouteError::UnsupportedMessage { .. }
            | RouteError::InvalidMessage(_) => ErrorKind::Configuration,
            RouteError::SignerAccountNotFound { .. } | RouteError::InsufficientBalance { .. } => {
                ErrorKind::Precondition
            }
            RouteError::BroadcastRejected { .. }
            | RouteError::EvmReverted { .. }
            | RouteError::TransferFailed { .. } => ErrorKind::OnChain,
            RouteError::Cancelled | RouteError::TrackingTimedOut { .. } => ErrorKind::Aborted,
            RouteError::Port(_) => ErrorKind::Network,
        }
    }

    /// Transaction reference carried by on-chain failures.
    pub fn tx_hash(&self) -> Option<&str> {
        match self {
            RouteError::BroadcastRejected { tx_hash, .. }
            | RouteError::EvmReverted { tx_hash, .. }
            | RouteError::TransferFailed { tx_hash, .. }
            | RouteError::TrackingTimedOut { tx_hash, .. } => Some(tx_hash),
            _ => None,
        }
    }
}
