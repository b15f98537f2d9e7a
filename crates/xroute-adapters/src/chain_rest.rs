use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use tracing::debug;

use xroute_core::{
    BroadcastResponse, ChainAccount, ChainConnector, Coin, CosmosChainClient, PortError,
};

use crate::http::{build_client, read_json, u64_field};

/// Cosmos SDK REST gateway client for a single chain.
#[derive(Debug, Clone)]
pub struct CosmosRestClient {
    chain_id: String,
    base_url: String,
    http: reqwest::Client,
}

impl CosmosRestClient {
    pub fn new(
        chain_id: impl Into<String>,
        base_url: &str,
        http: reqwest::Client,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            http,
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value, PortError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(|e| {
                PortError::Transport(format!("{} rest request failed: {e}", self.chain_id))
            })?;
        read_json(response, "chain rest").await
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<Value, PortError> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                PortError::Transport(format!("{} rest request failed: {e}", self.chain_id))
            })?;
        read_json(response, "chain rest").await
    }
}

/// Finds the base account inside the plain, vesting and ethermint layouts.
pub fn parse_account(address: &str, body: &Value) -> Result<ChainAccount, PortError> {
    let account = body
        .get("account")
        .ok_or_else(|| PortError::Validation("account response missing account".to_owned()))?;
    let base = account
        .pointer("/base_vesting_account/base_account")
        .or_else(|| account.get("base_account"))
        .unwrap_or(account);

    Ok(ChainAccount {
        address: base
            .get("address")
            .and_then(Value::as_str)
            .unwrap_or(address)
            .to_owned(),
        account_number: u64_field(base, "account_number")?,
        sequence: u64_field(base, "sequence")?,
    })
}

#[async_trait]
impl CosmosChainClient for CosmosRestClient {
    async fn account(&self, address: &str) -> Result<ChainAccount, PortError> {
        let body = self
            .get_json(&format!("/cosmos/auth/v1beta1/accounts/{address}"))
            .await?;
        parse_account(address, &body)
    }

    async fn balance(&self, address: &str, denom: &str) -> Result<Coin, PortError> {
        let response = self
            .http
            .get(format!(
                "{}/cosmos/bank/v1beta1/balances/{address}/by_denom",
                self.base_url
            ))
            .query(&[("denom", denom)])
            .send()
            .await
            .map_err(|e| {
                PortError::Transport(format!("{} rest request failed: {e}", self.chain_id))
            })?;
        let body: Value = read_json(response, "chain rest").await?;
        let amount = match body.pointer("/balance/amount") {
            Some(Value::String(raw)) => raw
                .parse()
                .map_err(|e| PortError::Validation(format!("invalid balance {raw:?}: {e}")))?,
            _ => 0,
        };
        Ok(Coin::new(amount, denom))
    }

    async fn simulate(&self, tx_bytes: &[u8]) -> Result<u64, PortError> {
        let body = self
            .post_json(
                "/cosmos/tx/v1beta1/simulate",
                json!({ "tx_bytes": STANDARD.encode(tx_bytes) }),
            )
            .await?;
        let gas_info = body
            .get("gas_info")
            .ok_or_else(|| PortError::Validation("simulate response missing gas_info".to_owned()))?;
        let gas_used = u64_field(gas_info, "gas_used")?;
        debug!(chain_id = %self.chain_id, gas_used, "simulated transaction");
        Ok(gas_used)
    }

    async fn broadcast(&self, tx_bytes: &[u8]) -> Result<BroadcastResponse, PortError> {
        let body = self
            .post_json(
                "/cosmos/tx/v1beta1/txs",
                json!({
                    "tx_bytes": STANDARD.encode(tx_bytes),
                    "mode": "BROADCAST_MODE_SYNC",
                }),
            )
            .await?;
        let tx = body
            .get("tx_response")
            .ok_or_else(|| PortError::Validation("broadcast response missing tx_response".to_owned()))?;
        let height = u64_field(tx, "height")?;
        Ok(BroadcastResponse {
            tx_hash: tx
                .get("txhash")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            code: u32::try_from(u64_field(tx, "code")?)
                .map_err(|e| PortError::Validation(format!("invalid code: {e}")))?,
            raw_log: tx
                .get("raw_log")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            height: (height > 0).then_some(height),
        })
    }

    async fn latest_height(&self) -> Result<u64, PortError> {
        let body = self
            .get_json("/cosmos/base/tendermint/v1beta1/blocks/latest")
            .await?;
        let header = body
            .pointer("/block/header")
            .or_else(|| body.pointer("/sdk_block/header"))
            .ok_or_else(|| PortError::Validation("latest block missing header".to_owned()))?;
        u64_field(header, "height")
    }
}

/// Opens [`CosmosRestClient`]s that share one connection pool.
#[derive(Debug, Clone)]
pub struct RestConnector {
    http: reqwest::Client,
}

impl RestConnector {
    pub fn new(timeout: Duration) -> Result<Self, PortError> {
        Ok(Self {
            http: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl ChainConnector for RestConnector {
    async fn connect(
        &self,
        chain_id: &str,
        endpoint: &str,
    ) -> Result<Box<dyn CosmosChainClient>, PortError> {
        debug!(chain_id, endpoint, "connecting chain rest client");
        Ok(Box::new(CosmosRestClient::new(
            chain_id,
            endpoint,
            self.http.clone(),
        )))
    }
}
