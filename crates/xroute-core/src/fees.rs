use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{ChainInfo, Coin, Fee, GasPriceTiers};
use crate::registry::ChainRegistry;

const IBC_DENOM_PREFIX: &str = "ibc/";

/// Price of one gas unit in a given denomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPrice {
    pub denom: String,
    pub amount: Decimal,
}

impl GasPrice {
    pub fn new(amount: Decimal, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// Fee for `gas_limit` units, rounded up to a whole base unit. `None` when
    /// the price is negative or the total does not fit a coin amount.
    pub fn fee_for(&self, gas_limit: u64) -> Option<Fee> {
        if self.amount.is_sign_negative() {
            return None;
        }
        let total = Decimal::from(gas_limit).checked_mul(self.amount)?.ceil();
        Some(Fee::new(
            Coin::new(total.to_u128()?, self.denom.clone()),
            gas_limit,
        ))
    }
}

/// Picks the first usable tier in average, high, low order.
pub fn select_price_tier(tiers: &GasPriceTiers) -> Option<Decimal> {
    [&tiers.average, &tiers.high, &tiers.low]
        .into_iter()
        .map(|raw| raw.trim())
        .filter(|raw| !raw.is_empty())
        .filter_map(|raw| Decimal::from_str(raw).ok())
        .find(|price| !price.is_sign_negative())
}

/// Recommends gas denominations and prices from the routing service's chain list,
/// falling back to the static registry.
#[derive(Debug, Clone)]
pub struct FeeResolver {
    registry: Arc<ChainRegistry>,
    chains: HashMap<String, ChainInfo>,
}

impl FeeResolver {
    pub fn new(registry: Arc<ChainRegistry>, chains: Vec<ChainInfo>) -> Self {
        Self {
            registry,
            chains: chains
                .into_iter()
                .map(|chain| (chain.chain_id.clone(), chain))
                .collect(),
        }
    }

    pub fn default_gas_denom(&self, chain_id: &str) -> Option<String> {
        if let Some(denom) = self.registry.gas_denom_override(chain_id) {
            return Some(denom.to_owned());
        }

        let mut denoms: Vec<&str> = self
            .chains
            .get(chain_id)
            .map(|chain| {
                chain
                    .fee_assets
                    .iter()
                    .map(|asset| asset.denom.as_str())
                    .collect()
            })
            .unwrap_or_default();
        let registry_chain = self.registry.chain(chain_id);
        if denoms.is_empty() {
            if let Some(chain) = registry_chain {
                denoms = chain.fee_tokens.iter().map(|t| t.denom.as_str()).collect();
            }
        }

        let staking = registry_chain.and_then(|chain| chain.staking_denom.as_deref());
        if let Some(staking) = staking {
            if denoms.contains(&staking) {
                return Some(staking.to_owned());
            }
        }

        denoms
            .iter()
            .find(|denom| !denom.starts_with(IBC_DENOM_PREFIX))
            .or_else(|| denoms.first())
            .map(|denom| (*denom).to_owned())
    }

    pub fn recommended_gas_price(&self, chain_id: &str) -> Option<GasPrice> {
        let denom = self.default_gas_denom(chain_id)?;

        let listed = self
            .chains
            .get(chain_id)
            .and_then(|chain| chain.fee_assets.iter().find(|asset| asset.denom == denom))
            .and_then(|asset| asset.gas_price.as_ref())
            .and_then(select_price_tier);
        if let Some(amount) = listed {
            debug!(chain_id, %denom, %amount, "gas price from routing service");
            return Some(GasPrice::new(amount, denom));
        }

        let fallback = self
            .registry
            .chain(chain_id)
            .and_then(|chain| chain.fee_token(&denom))
            .and_then(|token| token.static_price());
        match fallback {
            Some(amount) => {
                warn!(chain_id, %denom, %amount, "falling back to registry gas price");
                Some(GasPrice::new(amount, denom))
            }
            None => None,
        }
    }
}
