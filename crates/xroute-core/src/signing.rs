//! Dual-protocol transaction signing.
//!
//! A wallet exposes either structured (direct) or legacy (amino) signing, never
//! both from our point of view: the capability is fixed once as a
//! [`CosmosSigner`] and each arm has its own handler. Chain families that need a
//! different public-key type or a timeout height are looked up in a
//! [`SigningStrategyTable`] keyed by exact chain id.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use alloy::hex;
use prost::Message;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::{AccountData, Fee, SignerData};
use crate::error::RouteError;
use crate::messages::{CosmosMessage, StdFee, StdSignDoc};
use crate::ports::{AminoSigner, DirectSigner, PortError};
use crate::proto::{self, Any, AuthInfo, PubKey, SignDoc, SignerInfo, TxBody, TxRaw};

pub const INJECTIVE_TIMEOUT_BLOCKS: u64 = 90;

#[derive(Clone)]
pub enum CosmosSigner {
    Direct(Arc<dyn DirectSigner>),
    Amino(Arc<dyn AminoSigner>),
}

impl fmt::Debug for CosmosSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CosmosSigner::Direct(_) => f.write_str("CosmosSigner::Direct"),
            CosmosSigner::Amino(_) => f.write_str("CosmosSigner::Amino"),
        }
    }
}

impl CosmosSigner {
    pub async fn accounts(&self) -> Result<Vec<AccountData>, PortError> {
        match self {
            CosmosSigner::Direct(signer) => signer.accounts().await,
            CosmosSigner::Amino(signer) => signer.accounts().await,
        }
    }

    /// The signer's account for `address`; absence is fatal.
    pub async fn account(&self, address: &str) -> Result<AccountData, RouteError> {
        self.accounts()
            .await?
            .into_iter()
            .find(|account| account.address == address)
            .ok_or_else(|| RouteError::SignerAccountNotFound {
                address: address.to_owned(),
            })
    }

    pub fn mode(&self) -> &'static str {
        match self {
            CosmosSigner::Direct(_) => "direct",
            CosmosSigner::Amino(_) => "amino",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningStrategy {
    Standard,
    Ethermint,
    Injective { timeout_blocks: u64 },
}

impl SigningStrategy {
    pub fn pubkey_type_url(&self) -> &'static str {
        match self {
            SigningStrategy::Standard => proto::SECP256K1_PUBKEY_TYPE_URL,
            SigningStrategy::Ethermint => proto::ETHERMINT_PUBKEY_TYPE_URL,
            SigningStrategy::Injective { .. } => proto::INJECTIVE_PUBKEY_TYPE_URL,
        }
    }

    pub fn needs_height(&self) -> bool {
        matches!(self, SigningStrategy::Injective { .. })
    }

    /// Timeout height to embed given the chain's latest height. Zero means none.
    pub fn timeout_height(&self, latest_height: u64) -> u64 {
        match self {
            SigningStrategy::Injective { timeout_blocks } => latest_height + timeout_blocks,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SigningStrategyTable {
    entries: HashMap<String, SigningStrategy>,
}

impl Default for SigningStrategyTable {
    fn default() -> Self {
        let injective = SigningStrategy::Injective {
            timeout_blocks: INJECTIVE_TIMEOUT_BLOCKS,
        };
        Self::empty()
            .with("injective-1", injective)
            .with("injective-888", injective)
            .with("evmos_9001-2", SigningStrategy::Ethermint)
            .with("evmos_9000-4", SigningStrategy::Ethermint)
            .with("dymension_1100-1", SigningStrategy::Ethermint)
    }
}

impl SigningStrategyTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn with(mut self, chain_id: impl Into<String>, strategy: SigningStrategy) -> Self {
        self.entries.insert(chain_id.into(), strategy);
        self
    }

    pub fn strategy_for(&self, chain_id: &str) -> SigningStrategy {
        self.entries
            .get(chain_id)
            .copied()
            .unwrap_or(SigningStrategy::Standard)
    }
}

/// Everything needed to sign one message, already resolved.
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    pub message: &'a CosmosMessage,
    pub fee: &'a Fee,
    pub signer_data: &'a SignerData,
    pub signer_address: &'a str,
    pub strategy: SigningStrategy,
    pub timeout_height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    pub tx_bytes: Vec<u8>,
    pub tx_hash: String,
}

impl SignedTx {
    fn from_raw(raw: TxRaw) -> Self {
        let tx_bytes = raw.encode_to_vec();
        let tx_hash = tx_hash(&tx_bytes);
        Self { tx_bytes, tx_hash }
    }
}

/// Upper-case hex SHA-256 of the encoded transaction.
pub fn tx_hash(tx_bytes: &[u8]) -> String {
    hex::encode_upper(Sha256::digest(tx_bytes))
}

fn encode_pubkey(strategy: SigningStrategy, key: &[u8]) -> Any {
    Any {
        type_url: strategy.pubkey_type_url().to_owned(),
        value: PubKey { key: key.to_vec() }.encode_to_vec(),
    }
}

fn auth_info(pubkey: Any, sequence: u64, fee: &Fee, sign_mode: i32) -> AuthInfo {
    AuthInfo {
        signer_infos: vec![SignerInfo {
            public_key: Some(pubkey),
            mode_info: Some(proto::single_mode(sign_mode)),
            sequence,
        }],
        fee: Some(proto::fee(fee)),
        ..Default::default()
    }
}

/// Unsigned transaction for gas simulation, with one empty signature slot.
pub fn simulation_tx(
    message: &CosmosMessage,
    fee: &Fee,
    sequence: u64,
    pubkey: &[u8],
    strategy: SigningStrategy,
    timeout_height: u64,
) -> Result<Vec<u8>, RouteError> {
    let body = TxBody {
        messages: vec![message.to_any()?],
        memo: String::new(),
        timeout_height,
        ..Default::default()
    };
    let auth = auth_info(
        encode_pubkey(strategy, pubkey),
        sequence,
        fee,
        proto::SIGN_MODE_DIRECT,
    );
    Ok(TxRaw {
        body_bytes: body.encode_to_vec(),
        auth_info_bytes: auth.encode_to_vec(),
        signatures: vec![Vec::new()],
    }
    .encode_to_vec())
}

pub async fn sign_cosmos_message(
    signer: &CosmosSigner,
    request: SigningRequest<'_>,
) -> Result<SignedTx, RouteError> {
    let account = signer.account(request.signer_address).await?;
    debug!(
        chain_id = %request.signer_data.chain_id,
        mode = signer.mode(),
        strategy = ?request.strategy,
        "signing message"
    );
    match signer {
        CosmosSigner::Direct(direct) => sign_direct(direct.as_ref(), &account, request).await,
        CosmosSigner::Amino(amino) => sign_amino(amino.as_ref(), &account, request).await,
    }
}

async fn sign_direct(
    signer: &dyn DirectSigner,
    account: &AccountData,
    request: SigningRequest<'_>,
) -> Result<SignedTx, RouteError> {
    let body = TxBody {
        messages: vec![request.message.to_any()?],
        memo: String::new(),
        timeout_height: request.timeout_height,
        ..Default::default()
    };
    let auth = auth_info(
        encode_pubkey(request.strategy, &account.pubkey),
        request.signer_data.sequence,
        request.fee,
        proto::SIGN_MODE_DIRECT,
    );
    let doc = SignDoc {
        body_bytes: body.encode_to_vec(),
        auth_info_bytes: auth.encode_to_vec(),
        chain_id: request.signer_data.chain_id.clone(),
        account_number: request.signer_data.account_number,
    };

    let response = signer.sign_direct(request.signer_address, doc).await?;
    Ok(SignedTx::from_raw(TxRaw {
        body_bytes: response.signed.body_bytes,
        auth_info_bytes: response.signed.auth_info_bytes,
        signatures: vec![response.signature],
    }))
}

async fn sign_amino(
    signer: &dyn AminoSigner,
    account: &AccountData,
    request: SigningRequest<'_>,
) -> Result<SignedTx, RouteError> {
    let memo = request.message.memo().filter(|memo| !memo.is_empty());

    let mut msg = request.message.to_amino();
    if let Some(memo) = memo {
        msg.value["memo"] = memo.into();
    }
    let timeout_height =
        (request.timeout_height != 0).then(|| request.timeout_height.to_string());
    let doc = StdSignDoc {
        account_number: request.signer_data.account_number.to_string(),
        chain_id: request.signer_data.chain_id.clone(),
        fee: StdFee::from(request.fee),
        memo: String::new(),
        msgs: vec![msg],
        sequence: request.signer_data.sequence.to_string(),
        timeout_height,
    };

    let response = signer.sign_amino(request.signer_address, doc).await?;
    let signed = response.signed;

    let mut messages = signed
        .msgs
        .iter()
        .map(CosmosMessage::from_amino)
        .collect::<Result<Vec<_>, _>>()?;
    // The amino converter loses the memo; put the routing service's back.
    if let (Some(first), Some(memo)) = (messages.first_mut(), memo) {
        first.set_memo(memo);
    }

    let body = TxBody {
        messages: messages
            .iter()
            .map(CosmosMessage::to_any)
            .collect::<Result<Vec<_>, _>>()?,
        memo: signed.memo.clone(),
        timeout_height: request.timeout_height,
        ..Default::default()
    };
    let sequence = signed.sequence.parse().map_err(|e| {
        RouteError::InvalidMessage(format!("invalid signed sequence {}: {e}", signed.sequence))
    })?;
    let auth = auth_info(
        encode_pubkey(request.strategy, &account.pubkey),
        sequence,
        &signed.fee.to_fee()?,
        proto::SIGN_MODE_LEGACY_AMINO_JSON,
    );

    Ok(SignedTx::from_raw(TxRaw {
        body_bytes: body.encode_to_vec(),
        auth_info_bytes: auth.encode_to_vec(),
        signatures: vec![response.signature],
    }))
}
