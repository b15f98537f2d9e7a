use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::ports::{EndpointResolverFn, PortError};

/// Gas denominations that win over anything the chain metadata suggests.
pub const DEFAULT_GAS_DENOM_OVERRIDES: &[(&str, &str)] = &[("noble-1", "uusdc")];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryFeeToken {
    pub denom: String,
    #[serde(default)]
    pub low_gas_price: Option<Decimal>,
    #[serde(default)]
    pub average_gas_price: Option<Decimal>,
    #[serde(default)]
    pub high_gas_price: Option<Decimal>,
}

impl RegistryFeeToken {
    /// Static price in average, high, low order.
    pub fn static_price(&self) -> Option<Decimal> {
        [
            self.average_gas_price,
            self.high_gas_price,
            self.low_gas_price,
        ]
        .into_iter()
        .flatten()
        .find(|price| !price.is_zero())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainApis {
    #[serde(default)]
    pub rpc: Vec<String>,
    #[serde(default)]
    pub rest: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryChain {
    pub chain_id: String,
    #[serde(default)]
    pub bech32_prefix: Option<String>,
    #[serde(default)]
    pub staking_denom: Option<String>,
    #[serde(default)]
    pub fee_tokens: Vec<RegistryFeeToken>,
    #[serde(default)]
    pub apis: ChainApis,
}

impl RegistryChain {
    pub fn fee_token(&self, denom: &str) -> Option<&RegistryFeeToken> {
        self.fee_tokens.iter().find(|token| token.denom == denom)
    }
}

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    chains: Vec<RegistryChain>,
}

/// Immutable chain metadata, loaded once and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: HashMap<String, RegistryChain>,
    gas_denom_overrides: HashMap<String, String>,
}

/// No chains, but the built-in gas denom overrides still apply.
impl Default for ChainRegistry {
    fn default() -> Self {
        Self::from_chains(Vec::new())
    }
}

impl ChainRegistry {
    pub fn from_json(raw: &str) -> Result<Self, PortError> {
        let doc: RegistryDocument = serde_json::from_str(raw)
            .map_err(|e| PortError::Validation(format!("invalid chain registry: {e}")))?;
        Ok(Self::from_chains(doc.chains))
    }

    pub fn from_chains(chains: Vec<RegistryChain>) -> Self {
        Self {
            chains: chains
                .into_iter()
                .map(|chain| (chain.chain_id.clone(), chain))
                .collect(),
            gas_denom_overrides: DEFAULT_GAS_DENOM_OVERRIDES
                .iter()
                .map(|(chain, denom)| ((*chain).to_owned(), (*denom).to_owned()))
                .collect(),
        }
    }

    pub fn with_gas_denom_override(
        mut self,
        chain_id: impl Into<String>,
        denom: impl Into<String>,
    ) -> Self {
        self.gas_denom_overrides
            .insert(chain_id.into(), denom.into());
        self
    }

    pub fn chain(&self, chain_id: &str) -> Option<&RegistryChain> {
        self.chains.get(chain_id)
    }

    pub fn chains(&self) -> impl Iterator<Item = &RegistryChain> {
        self.chains.values()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn gas_denom_override(&self, chain_id: &str) -> Option<&str> {
        self.gas_denom_overrides.get(chain_id).map(String::as_str)
    }

    pub fn rest_endpoint(&self, chain_id: &str) -> Option<&str> {
        self.chain(chain_id)?.apis.rest.first().map(String::as_str)
    }
}

/// Resolves a chain's REST endpoint: caller resolver, then static table, then registry.
#[derive(Clone, Default)]
pub struct EndpointResolver {
    resolver: Option<EndpointResolverFn>,
    endpoints: HashMap<String, String>,
}

impl fmt::Debug for EndpointResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointResolver")
            .field("resolver", &self.resolver.is_some())
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl EndpointResolver {
    pub fn with_resolver(mut self, resolver: EndpointResolverFn) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_endpoint(mut self, chain_id: impl Into<String>, url: impl Into<String>) -> Self {
        self.endpoints.insert(chain_id.into(), url.into());
        self
    }

    pub fn resolve(&self, chain_id: &str, registry: &ChainRegistry) -> Result<String, RouteError> {
        if let Some(url) = self.resolver.as_ref().and_then(|resolve| resolve(chain_id)) {
            return Ok(url);
        }
        if let Some(url) = self.endpoints.get(chain_id) {
            return Ok(url.clone());
        }
        registry
            .rest_endpoint(chain_id)
            .map(str::to_owned)
            .ok_or_else(|| RouteError::EndpointUnresolved {
                chain_id: chain_id.to_owned(),
            })
    }
}
