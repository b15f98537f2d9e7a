//! Cosmos SDK, IBC and CosmWasm wire types the executor signs and broadcasts,
//! plus the glue from domain values into them.

use prost::Message;

pub use cosmos_sdk_proto::cosmos::bank::v1beta1::MsgSend;
pub use cosmos_sdk_proto::cosmos::base::v1beta1::Coin;
pub use cosmos_sdk_proto::cosmos::crypto::secp256k1::PubKey;
pub use cosmos_sdk_proto::cosmos::tx::signing::v1beta1::SignMode;
pub use cosmos_sdk_proto::cosmos::tx::v1beta1::{
    mode_info, AuthInfo, Fee, ModeInfo, SignDoc, SignerInfo, TxBody, TxRaw,
};
pub use cosmos_sdk_proto::cosmwasm::wasm::v1::MsgExecuteContract;
pub use cosmos_sdk_proto::Any;
pub use ibc_proto::ibc::apps::transfer::v1::MsgTransfer;
pub use ibc_proto::ibc::core::client::v1::Height;

use crate::domain;

pub const SIGN_MODE_DIRECT: i32 = SignMode::Direct as i32;
pub const SIGN_MODE_LEGACY_AMINO_JSON: i32 = SignMode::LegacyAminoJson as i32;

pub const SECP256K1_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.secp256k1.PubKey";
pub const ETHERMINT_PUBKEY_TYPE_URL: &str = "/ethermint.crypto.v1.ethsecp256k1.PubKey";
pub const INJECTIVE_PUBKEY_TYPE_URL: &str = "/injective.crypto.v1beta1.ethsecp256k1.PubKey";

/// Messages with a fixed protobuf type URL.
pub trait TypeUrl {
    const TYPE_URL: &'static str;
}

impl TypeUrl for MsgSend {
    const TYPE_URL: &'static str = "/cosmos.bank.v1beta1.MsgSend";
}

impl TypeUrl for MsgTransfer {
    const TYPE_URL: &'static str = "/ibc.applications.transfer.v1.MsgTransfer";
}

impl TypeUrl for MsgExecuteContract {
    const TYPE_URL: &'static str = "/cosmwasm.wasm.v1.MsgExecuteContract";
}

pub fn to_any<M: Message + TypeUrl>(msg: &M) -> Any {
    Any {
        type_url: M::TYPE_URL.to_owned(),
        value: msg.encode_to_vec(),
    }
}

pub fn coin(coin: &domain::Coin) -> Coin {
    Coin {
        denom: coin.denom.clone(),
        amount: coin.amount.to_string(),
    }
}

/// IBC carries its own copy of the SDK coin type.
pub fn ibc_coin(coin: &domain::Coin) -> ibc_proto::cosmos::base::v1beta1::Coin {
    ibc_proto::cosmos::base::v1beta1::Coin {
        denom: coin.denom.clone(),
        amount: coin.amount.to_string(),
    }
}

pub fn fee(fee: &domain::Fee) -> Fee {
    Fee {
        amount: fee.amount.iter().map(coin).collect(),
        gas_limit: fee.gas_limit,
        ..Default::default()
    }
}

pub fn single_mode(mode: i32) -> ModeInfo {
    ModeInfo {
        sum: Some(mode_info::Sum::Single(mode_info::Single { mode })),
    }
}
