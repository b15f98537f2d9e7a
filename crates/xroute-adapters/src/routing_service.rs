use std::collections::HashMap;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use xroute_core::{
    Asset, AssetRecommendation, AssetsFromSourceRequest, AssetsRequest, ChainInfo, MsgsRequest,
    Operation, PortError, RecommendAssetsRequest, RouteQuote, RouteRequest, RoutingServicePort,
    SubmitTxResponse, SwapVenue, TrackTxResponse, TxStatus, TxStatusReport,
};

use crate::config::XrouteConfig;
use crate::http::{build_client, read_json};

/// Maps a status-service state string onto the three-way [`TxStatus`].
pub fn map_status(state: &str) -> TxStatus {
    match state {
        "STATE_COMPLETED" | "STATE_COMPLETED_SUCCESS" => TxStatus::Completed,
        "STATE_COMPLETED_ERROR" | "STATE_ABANDONED" => TxStatus::Failed,
        _ => TxStatus::Pending,
    }
}

#[derive(Debug, Deserialize)]
struct ChainsResponse {
    chains: Vec<ChainInfo>,
}

#[derive(Debug, Deserialize)]
struct AssetList {
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct AssetsResponse {
    #[serde(default)]
    chain_to_assets_map: HashMap<String, AssetList>,
}

#[derive(Debug, Deserialize)]
struct AssetsFromSourceResponse {
    #[serde(default)]
    dest_assets: HashMap<String, AssetList>,
}

#[derive(Debug, Deserialize)]
struct MsgsResponse {
    #[serde(default)]
    msgs: Vec<Operation>,
}

#[derive(Debug, Serialize)]
struct RecommendAssetsBody<'a> {
    requests: [&'a RecommendAssetsRequest; 1],
}

#[derive(Debug, Deserialize)]
struct RecommendAssetsResponse {
    #[serde(default)]
    recommendations: Vec<AssetRecommendation>,
}

#[derive(Debug, Deserialize)]
struct VenuesResponse {
    #[serde(default)]
    venues: Vec<SwapVenue>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

impl StatusResponse {
    fn into_report(self) -> TxStatusReport {
        let raw_state = self
            .state
            .or(self.status)
            .unwrap_or_else(|| "STATE_UNKNOWN".to_owned());
        let error = self.error.and_then(|err| match err {
            Value::Null => None,
            Value::String(message) => Some(message),
            other => other
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .or_else(|| Some(other.to_string())),
        });
        TxStatusReport {
            status: map_status(&raw_state),
            raw_state,
            error,
        }
    }
}

fn flatten_assets(map: HashMap<String, AssetList>) -> HashMap<String, Vec<Asset>> {
    map.into_iter()
        .map(|(chain_id, list)| (chain_id, list.assets))
        .collect()
}

/// JSON client for the routing and status service.
#[derive(Debug, Clone)]
pub struct RoutingServiceClient {
    base_url: String,
    client_id: String,
    http: reqwest::Client,
}

impl RoutingServiceClient {
    pub fn new(config: &XrouteConfig) -> Result<Self, PortError> {
        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_owned(),
            client_id: config.client_id.clone(),
            http: build_client(config.request_timeout())?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        mut query: Vec<(&'static str, String)>,
    ) -> Result<T, PortError> {
        query.push(("client_id", self.client_id.clone()));
        debug!(path, "routing service GET");
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(&query)
            .send()
            .await
            .map_err(|e| PortError::Transport(format!("routing service request failed: {e}")))?;
        read_json(response, "routing service").await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, PortError> {
        let mut payload = serde_json::to_value(body)
            .map_err(|e| PortError::Validation(format!("request encode failed: {e}")))?;
        if let Value::Object(map) = &mut payload {
            map.insert("client_id".to_owned(), json!(self.client_id));
        }
        debug!(path, "routing service POST");
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| PortError::Transport(format!("routing service request failed: {e}")))?;
        read_json(response, "routing service").await
    }
}

#[async_trait]
impl RoutingServicePort for RoutingServiceClient {
    async fn chains(&self) -> Result<Vec<ChainInfo>, PortError> {
        let response: ChainsResponse = self.get("/info/chains", Vec::new()).await?;
        Ok(response.chains)
    }

    async fn assets(
        &self,
        request: &AssetsRequest,
    ) -> Result<HashMap<String, Vec<Asset>>, PortError> {
        let mut query = Vec::new();
        if let Some(chain_id) = &request.chain_id {
            query.push(("chain_id", chain_id.clone()));
        }
        if let Some(native_only) = request.native_only {
            query.push(("native_only", native_only.to_string()));
        }
        if let Some(include_evm) = request.include_evm_assets {
            query.push(("include_evm_assets", include_evm.to_string()));
        }
        let response: AssetsResponse = self.get("/fungible/assets", query).await?;
        Ok(flatten_assets(response.chain_to_assets_map))
    }

    async fn assets_from_source(
        &self,
        request: &AssetsFromSourceRequest,
    ) -> Result<HashMap<String, Vec<Asset>>, PortError> {
        let response: AssetsFromSourceResponse =
            self.post("/fungible/assets_from_source", request).await?;
        Ok(flatten_assets(response.dest_assets))
    }

    async fn route(&self, request: &RouteRequest) -> Result<RouteQuote, PortError> {
        self.post("/fungible/route", request).await
    }

    async fn messages(&self, request: &MsgsRequest) -> Result<Vec<Operation>, PortError> {
        let response: MsgsResponse = self.post("/fungible/msgs", request).await?;
        Ok(response.msgs)
    }

    async fn recommend_assets(
        &self,
        request: &RecommendAssetsRequest,
    ) -> Result<Vec<AssetRecommendation>, PortError> {
        let response: RecommendAssetsResponse = self
            .post(
                "/fungible/recommend_assets",
                &RecommendAssetsBody {
                    requests: [request],
                },
            )
            .await?;
        Ok(response.recommendations)
    }

    async fn venues(&self) -> Result<Vec<SwapVenue>, PortError> {
        let response: VenuesResponse = self.get("/fungible/venues", Vec::new()).await?;
        Ok(response.venues)
    }

    async fn submit_transaction(
        &self,
        chain_id: &str,
        tx_bytes: &[u8],
    ) -> Result<SubmitTxResponse, PortError> {
        self.post(
            "/tx/submit",
            &json!({ "tx": STANDARD.encode(tx_bytes), "chain_id": chain_id }),
        )
        .await
    }

    async fn track_transaction(
        &self,
        chain_id: &str,
        tx_hash: &str,
    ) -> Result<TrackTxResponse, PortError> {
        self.post(
            "/tx/track",
            &json!({ "tx_hash": tx_hash, "chain_id": chain_id }),
        )
        .await
    }

    async fn transaction_status(
        &self,
        chain_id: &str,
        tx_hash: &str,
    ) -> Result<TxStatusReport, PortError> {
        let response: StatusResponse = self
            .get(
                "/tx/status",
                vec![
                    ("tx_hash", tx_hash.to_owned()),
                    ("chain_id", chain_id.to_owned()),
                ],
            )
            .await?;
        Ok(response.into_report())
    }
}
