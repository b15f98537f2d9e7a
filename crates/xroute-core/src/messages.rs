//! Chain-native message shapes built from routing-service operations, their
//! legacy amino JSON form, and the EVM calls needed for ERC-20 approvals.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::{Coin, CosmosOperation, EvmOperation, EvmTxRequest, Fee};
use crate::error::RouteError;
use crate::proto::{self, to_any, Any, TypeUrl};

pub const AMINO_TRANSFER_TYPE: &str = "cosmos-sdk/MsgTransfer";
pub const AMINO_EXECUTE_CONTRACT_TYPE: &str = "wasm/MsgExecuteContract";
pub const AMINO_SEND_TYPE: &str = "cosmos-sdk/MsgSend";

const DEFAULT_GAS: u64 = 200_000;
const CONTRACT_GAS: u64 = 2_400_000;

sol! {
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutHeight {
    #[serde(default, with = "flex_u64")]
    pub revision_number: u64,
    #[serde(default, with = "flex_u64")]
    pub revision_height: u64,
}

impl TimeoutHeight {
    fn is_zero(&self) -> bool {
        self.revision_number == 0 && self.revision_height == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferMsg {
    pub source_port: String,
    pub source_channel: String,
    pub token: Coin,
    pub sender: String,
    pub receiver: String,
    #[serde(default)]
    pub timeout_height: TimeoutHeight,
    #[serde(default, with = "flex_u64")]
    pub timeout_timestamp: u64,
    #[serde(default)]
    pub memo: String,
}

/// Amino value of `MsgTransfer`. The converter has no memo field.
#[derive(Debug, Deserialize)]
struct AminoTransferValue {
    source_port: String,
    source_channel: String,
    token: Coin,
    sender: String,
    receiver: String,
    #[serde(default)]
    timeout_height: TimeoutHeight,
    #[serde(default, with = "flex_u64")]
    timeout_timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteContractMsg {
    pub sender: String,
    pub contract: String,
    pub msg: Value,
    #[serde(default)]
    pub funds: Vec<Coin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMsg {
    pub from_address: String,
    pub to_address: String,
    pub amount: Vec<Coin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AminoMsg {
    #[serde(rename = "type")]
    pub type_: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdFee {
    pub amount: Vec<Coin>,
    pub gas: String,
}

impl From<&Fee> for StdFee {
    fn from(fee: &Fee) -> Self {
        Self {
            amount: fee.amount.clone(),
            gas: fee.gas_limit.to_string(),
        }
    }
}

impl StdFee {
    pub fn to_fee(&self) -> Result<Fee, RouteError> {
        let gas_limit = self
            .gas
            .parse()
            .map_err(|e| RouteError::InvalidMessage(format!("invalid amino gas {}: {e}", self.gas)))?;
        Ok(Fee {
            amount: self.amount.clone(),
            gas_limit,
        })
    }
}

/// Legacy amino sign document. Numbers are carried as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdSignDoc {
    pub account_number: String,
    pub chain_id: String,
    pub fee: StdFee,
    pub memo: String,
    pub msgs: Vec<AminoMsg>,
    pub sequence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_height: Option<String>,
}

impl StdSignDoc {
    /// Canonical JSON: keys sorted at every level, no whitespace.
    pub fn sign_bytes(&self) -> Result<Vec<u8>, RouteError> {
        let value = serde_json::to_value(self)
            .map_err(|e| RouteError::InvalidMessage(format!("amino sign doc: {e}")))?;
        serde_json::to_vec(&sorted(value))
            .map_err(|e| RouteError::InvalidMessage(format!("amino sign doc: {e}")))
    }
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, sorted(v)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// A Cosmos message the executor knows how to encode and sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CosmosMessage {
    Transfer(TransferMsg),
    ExecuteContract(ExecuteContractMsg),
    Send(SendMsg),
}

impl CosmosMessage {
    pub fn from_operation(op: &CosmosOperation) -> Result<Self, RouteError> {
        let parse_err = |e: serde_json::Error| {
            RouteError::InvalidMessage(format!("{} on {}: {e}", op.msg_type_url, op.chain_id))
        };
        match op.msg_type_url.as_str() {
            url if url == proto::MsgTransfer::TYPE_URL => serde_json::from_str(&op.msg)
                .map(CosmosMessage::Transfer)
                .map_err(parse_err),
            url if url == proto::MsgExecuteContract::TYPE_URL => serde_json::from_str(&op.msg)
                .map(CosmosMessage::ExecuteContract)
                .map_err(parse_err),
            url if url == proto::MsgSend::TYPE_URL => serde_json::from_str(&op.msg)
                .map(CosmosMessage::Send)
                .map_err(parse_err),
            other => Err(RouteError::UnsupportedMessage {
                type_url: other.to_owned(),
            }),
        }
    }

    pub fn type_url(&self) -> &'static str {
        match self {
            CosmosMessage::Transfer(_) => proto::MsgTransfer::TYPE_URL,
            CosmosMessage::ExecuteContract(_) => proto::MsgExecuteContract::TYPE_URL,
            CosmosMessage::Send(_) => proto::MsgSend::TYPE_URL,
        }
    }

    pub fn signer(&self) -> &str {
        match self {
            CosmosMessage::Transfer(msg) => &msg.sender,
            CosmosMessage::ExecuteContract(msg) => &msg.sender,
            CosmosMessage::Send(msg) => &msg.from_address,
        }
    }

    pub fn memo(&self) -> Option<&str> {
        match self {
            CosmosMessage::Transfer(msg) => Some(&msg.memo),
            _ => None,
        }
    }

    pub fn set_memo(&mut self, memo: &str) {
        if let CosmosMessage::Transfer(msg) = self {
            msg.memo = memo.to_owned();
        }
    }

    /// Gas to assume when the message cannot be simulated yet.
    pub fn default_gas(&self) -> u64 {
        match self {
            CosmosMessage::ExecuteContract(_) => CONTRACT_GAS,
            CosmosMessage::Transfer(msg) if msg.memo.contains("\"wasm\"") => CONTRACT_GAS,
            _ => DEFAULT_GAS,
        }
    }

    pub fn to_any(&self) -> Result<Any, RouteError> {
        let any = match self {
            CosmosMessage::Transfer(msg) => to_any(&proto::MsgTransfer {
                source_port: msg.source_port.clone(),
                source_channel: msg.source_channel.clone(),
                token: Some(proto::ibc_coin(&msg.token)),
                sender: msg.sender.clone(),
                receiver: msg.receiver.clone(),
                timeout_height: (!msg.timeout_height.is_zero()).then(|| proto::Height {
                    revision_number: msg.timeout_height.revision_number,
                    revision_height: msg.timeout_height.revision_height,
                }),
                timeout_timestamp: msg.timeout_timestamp,
                memo: msg.memo.clone(),
                ..Default::default()
            }),
            CosmosMessage::ExecuteContract(msg) => {
                let inner = serde_json::to_vec(&msg.msg)
                    .map_err(|e| RouteError::InvalidMessage(format!("contract msg: {e}")))?;
                to_any(&proto::MsgExecuteContract {
                    sender: msg.sender.clone(),
                    contract: msg.contract.clone(),
                    msg: inner,
                    funds: msg.funds.iter().map(proto::coin).collect(),
                })
            }
            CosmosMessage::Send(msg) => to_any(&proto::MsgSend {
                from_address: msg.from_address.clone(),
                to_address: msg.to_address.clone(),
                amount: msg.amount.iter().map(proto::coin).collect(),
            }),
        };
        Ok(any)
    }

    /// Amino JSON form. The transfer converter drops `memo`, as wallets expect.
    pub fn to_amino(&self) -> AminoMsg {
        match self {
            CosmosMessage::Transfer(msg) => {
                let mut height = Map::new();
                if msg.timeout_height.revision_height != 0 {
                    height.insert(
                        "revision_height".to_owned(),
                        json!(msg.timeout_height.revision_height.to_string()),
                    );
                }
                if msg.timeout_height.revision_number != 0 {
                    height.insert(
                        "revision_number".to_owned(),
                        json!(msg.timeout_height.revision_number.to_string()),
                    );
                }
                let mut value = json!({
                    "source_port": msg.source_port,
                    "source_channel": msg.source_channel,
                    "token": msg.token,
                    "sender": msg.sender,
                    "receiver": msg.receiver,
                    "timeout_height": Value::Object(height),
                });
                if msg.timeout_timestamp != 0 {
                    value["timeout_timestamp"] = json!(msg.timeout_timestamp.to_string());
                }
                AminoMsg {
                    type_: AMINO_TRANSFER_TYPE.to_owned(),
                    value,
                }
            }
            CosmosMessage::ExecuteContract(msg) => AminoMsg {
                type_: AMINO_EXECUTE_CONTRACT_TYPE.to_owned(),
                value: json!({
                    "sender": msg.sender,
                    "contract": msg.contract,
                    "msg": msg.msg,
                    "funds": msg.funds,
                }),
            },
            CosmosMessage::Send(msg) => AminoMsg {
                type_: AMINO_SEND_TYPE.to_owned(),
                value: json!({
                    "from_address": msg.from_address,
                    "to_address": msg.to_address,
                    "amount": msg.amount,
                }),
            },
        }
    }

    pub fn from_amino(msg: &AminoMsg) -> Result<Self, RouteError> {
        let parse_err =
            |e: serde_json::Error| RouteError::InvalidMessage(format!("amino {}: {e}", msg.type_));
        match msg.type_.as_str() {
            AMINO_TRANSFER_TYPE => {
                let value: AminoTransferValue =
                    serde_json::from_value(msg.value.clone()).map_err(parse_err)?;
                Ok(CosmosMessage::Transfer(TransferMsg {
                    source_port: value.source_port,
                    source_channel: value.source_channel,
                    token: value.token,
                    sender: value.sender,
                    receiver: value.receiver,
                    timeout_height: value.timeout_height,
                    timeout_timestamp: value.timeout_timestamp,
                    memo: String::new(),
                }))
            }
            AMINO_EXECUTE_CONTRACT_TYPE => serde_json::from_value(msg.value.clone())
                .map(CosmosMessage::ExecuteContract)
                .map_err(parse_err),
            AMINO_SEND_TYPE => serde_json::from_value(msg.value.clone())
                .map(CosmosMessage::Send)
                .map_err(parse_err),
            other => Err(RouteError::UnsupportedMessage {
                type_url: other.to_owned(),
            }),
        }
    }
}

pub fn allowance_calldata(owner: Address, spender: Address) -> Bytes {
    IERC20::allowanceCall { owner, spender }.abi_encode().into()
}

pub fn approve_calldata(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}

pub fn decode_allowance(raw: &[u8]) -> Result<U256, RouteError> {
    if raw.len() < 32 {
        return Err(RouteError::InvalidMessage(format!(
            "allowance result too short: {} bytes",
            raw.len()
        )));
    }
    Ok(U256::from_be_slice(&raw[..32]))
}

pub fn evm_call(op: &EvmOperation) -> EvmTxRequest {
    EvmTxRequest {
        to: op.to,
        data: op.data.clone(),
        value: op.value,
    }
}

/// Integers the routing service sends as numbers and amino carries as strings.
mod flex_u64 {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(n),
            Raw::Str(s) if s.is_empty() => Ok(0),
            Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
