use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub denom: String,
    pub chain_id: String,
    #[serde(default)]
    pub origin_denom: String,
    #[serde(default)]
    pub origin_chain_id: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
    #[serde(default)]
    pub is_cw20: bool,
    #[serde(default)]
    pub is_evm: bool,
    #[serde(default)]
    pub token_contract: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_evm_assets: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsFromSourceRequest {
    pub source_asset_denom: String,
    pub source_asset_chain_id: String,
    #[serde(default)]
    pub allow_multi_tx: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendAssetsRequest {
    pub source_asset_denom: String,
    pub source_asset_chain_id: String,
    pub dest_chain_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecommendation {
    pub asset: Asset,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapVenue {
    pub name: String,
    pub chain_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub amount_in: String,
    pub source_asset_denom: String,
    pub source_asset_chain_id: String,
    pub dest_asset_denom: String,
    pub dest_asset_chain_id: String,
    pub cumulative_affiliate_fee_bps: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_multi_tx: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bridges: Vec<String>,
}

impl RouteRequest {
    pub fn new(
        amount_in: impl Into<String>,
        source_asset_chain_id: impl Into<String>,
        source_asset_denom: impl Into<String>,
        dest_asset_chain_id: impl Into<String>,
        dest_asset_denom: impl Into<String>,
    ) -> Self {
        Self {
            amount_in: amount_in.into(),
            source_asset_denom: source_asset_denom.into(),
            source_asset_chain_id: source_asset_chain_id.into(),
            dest_asset_denom: dest_asset_denom.into(),
            dest_asset_chain_id: dest_asset_chain_id.into(),
            cumulative_affiliate_fee_bps: "0".to_owned(),
            allow_multi_tx: None,
            bridges: Vec::new(),
        }
    }
}

/// Route quote returned by the routing service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteQuote {
    pub source_asset_denom: String,
    pub source_asset_chain_id: String,
    pub dest_asset_denom: String,
    pub dest_asset_chain_id: String,
    pub amount_in: String,
    pub amount_out: String,
    #[serde(default)]
    pub estimated_amount_out: Option<String>,
    #[serde(default)]
    pub chain_ids: Vec<String>,
    #[serde(default)]
    pub does_swap: bool,
    #[serde(default)]
    pub txs_required: u32,
    #[serde(default, rename = "operations")]
    pub route_operations: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgsRequest {
    pub source_asset_denom: String,
    pub source_asset_chain_id: String,
    pub dest_asset_denom: String,
    pub dest_asset_chain_id: String,
    pub amount_in: String,
    pub amount_out: String,
    pub address_list: Vec<String>,
    pub operations: Vec<Value>,
    pub slippage_tolerance_percent: String,
}

impl MsgsRequest {
    pub fn from_quote(quote: &RouteQuote, address_list: Vec<String>) -> Self {
        Self {
            source_asset_denom: quote.source_asset_denom.clone(),
            source_asset_chain_id: quote.source_asset_chain_id.clone(),
            dest_asset_denom: quote.dest_asset_denom.clone(),
            dest_asset_chain_id: quote.dest_asset_chain_id.clone(),
            amount_in: quote.amount_in.clone(),
            amount_out: quote.amount_out.clone(),
            address_list,
            operations: quote.route_operations.clone(),
            slippage_tolerance_percent: "0".to_owned(),
        }
    }

    pub fn with_slippage(mut self, percent: impl Into<String>) -> Self {
        self.slippage_tolerance_percent = percent.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitTxResponse {
    pub tx_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackTxResponse {
    pub tx_hash: String,
    #[serde(default)]
    pub explorer_link: Option<String>,
}
