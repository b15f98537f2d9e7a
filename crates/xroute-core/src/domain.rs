use std::fmt;

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::service::RouteQuote;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmount {
    pub chain_id: String,
    pub denom: String,
    pub amount: String,
}

/// A quoted route together with the operations that realise it, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub chain_ids: Vec<String>,
    pub source_asset: AssetAmount,
    pub dest_asset: AssetAmount,
    pub operations: Vec<Operation>,
}

impl Route {
    pub fn from_quote(quote: RouteQuote, operations: Vec<Operation>) -> Self {
        let dest_amount = quote
            .estimated_amount_out
            .clone()
            .unwrap_or_else(|| quote.amount_out.clone());
        Self {
            chain_ids: quote.chain_ids,
            source_asset: AssetAmount {
                chain_id: quote.source_asset_chain_id,
                denom: quote.source_asset_denom,
                amount: quote.amount_in,
            },
            dest_asset: AssetAmount {
                chain_id: quote.dest_asset_chain_id,
                denom: quote.dest_asset_denom,
                amount: dest_amount,
            },
            operations,
        }
    }

    pub fn cosmos_operations(&self) -> impl Iterator<Item = (usize, &CosmosOperation)> {
        self.operations
            .iter()
            .enumerate()
            .filter_map(|(idx, op)| match op {
                Operation::MultiChainMsg(msg) => Some((idx, msg)),
                Operation::EvmTx(_) => None,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    MultiChainMsg(CosmosOperation),
    EvmTx(EvmOperation),
}

impl Operation {
    pub fn chain_id(&self) -> &str {
        match self {
            Operation::MultiChainMsg(msg) => &msg.chain_id,
            Operation::EvmTx(tx) => &tx.chain_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosmosOperation {
    pub chain_id: String,
    #[serde(default)]
    pub path: Vec<String>,
    /// JSON encoded message body, as produced by the routing service.
    pub msg: String,
    pub msg_type_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmOperation {
    pub chain_id: String,
    pub to: Address,
    #[serde(default)]
    pub data: Bytes,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub required_erc20_approvals: Vec<RequiredApproval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredApproval {
    pub token_contract: Address,
    pub spender: Address,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(with = "u128_string")]
    pub amount: u128,
}

impl Coin {
    pub fn new(amount: u128, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub amount: Vec<Coin>,
    pub gas_limit: u64,
}

impl Fee {
    pub fn new(amount: Coin, gas_limit: u64) -> Self {
        Self {
            amount: vec![amount],
            gas_limit,
        }
    }

    pub fn primary(&self) -> Option<&Coin> {
        self.amount.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerData {
    pub account_number: u64,
    pub sequence: u64,
    pub chain_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxStatusReport {
    pub status: TxStatus,
    pub raw_state: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastReceipt {
    pub chain_id: String,
    pub tx_hash: String,
    pub height: Option<u64>,
}

/// Terminal record of one executed leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegOutcome {
    pub index: usize,
    pub chain_id: String,
    pub tx_hash: String,
    pub status: TxStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOutcome {
    pub legs: Vec<LegOutcome>,
}

/// Raw outcome of submitting signed bytes to a chain endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResponse {
    pub tx_hash: String,
    pub code: u32,
    #[serde(default)]
    pub raw_log: String,
    #[serde(default)]
    pub height: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmTxRequest {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmReceipt {
    pub tx_hash: B256,
    pub success: bool,
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainAccount {
    pub address: String,
    pub account_number: u64,
    pub sequence: u64,
}

/// An account exposed by a wallet signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountData {
    pub address: String,
    pub algo: String,
    pub pubkey: Vec<u8>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    #[default]
    Cosmos,
    Evm,
    #[serde(other)]
    Other,
}

/// Chain entry as listed by the routing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub chain_id: String,
    #[serde(default)]
    pub chain_name: String,
    #[serde(default)]
    pub chain_type: ChainType,
    #[serde(default)]
    pub bech32_prefix: Option<String>,
    #[serde(default)]
    pub fee_assets: Vec<FeeAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeAsset {
    pub denom: String,
    #[serde(default)]
    pub gas_price: Option<GasPriceTiers>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPriceTiers {
    #[serde(default)]
    pub low: String,
    #[serde(default)]
    pub average: String,
    #[serde(default)]
    pub high: String,
}

mod u128_string {
    use super::*;

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
