use tracing::debug;

use crate::domain::Coin;
use crate::error::RouteError;
use crate::ports::CosmosChainClient;

pub const DEFAULT_GAS_MULTIPLIER: f64 = 1.5;

/// `ceil(gas_used * multiplier)`.
pub fn apply_gas_multiplier(gas_used: u64, multiplier: f64) -> u64 {
    (gas_used as f64 * multiplier).ceil() as u64
}

#[derive(Debug, Clone, Copy)]
pub struct GasEstimator {
    multiplier: f64,
}

impl Default for GasEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_GAS_MULTIPLIER)
    }
}

impl GasEstimator {
    pub fn new(multiplier: f64) -> Self {
        Self { multiplier }
    }

    /// Simulates `tx_bytes` and returns the padded gas limit.
    pub async fn estimate(
        &self,
        client: &dyn CosmosChainClient,
        tx_bytes: &[u8],
    ) -> Result<u64, RouteError> {
        let gas_used = client.simulate(tx_bytes).await?;
        let gas_limit = apply_gas_multiplier(gas_used, self.multiplier);
        debug!(gas_used, gas_limit, multiplier = self.multiplier, "simulated gas");
        Ok(gas_limit)
    }
}

/// Fails when `available` cannot cover `required`.
pub fn ensure_sufficient_balance(
    chain_id: &str,
    required: &Coin,
    available: &Coin,
) -> Result<(), RouteError> {
    if available.amount < required.amount {
        return Err(RouteError::InsufficientBalance {
            chain_id: chain_id.to_owned(),
            denom: required.denom.clone(),
            required: required.amount,
            available: available.amount,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplier_rounds_up() {
        assert_eq!(apply_gas_multiplier(100_000, 1.5), 150_000);
        assert_eq!(apply_gas_multiplier(100_001, 1.5), 150_002);
        assert_eq!(apply_gas_multiplier(0, DEFAULT_GAS_MULTIPLIER), 0);
    }

    #[test]
    fn shortfall_is_rejected() {
        let err = ensure_sufficient_balance(
            "cosmoshub-4",
            &Coin::new(600, "uatom"),
            &Coin::new(500, "uatom"),
        )
        .expect_err("shortfall");
        let text = err.to_string();
        assert!(text.contains("600"));
        assert!(text.contains("500"));
        assert!(text.contains("uatom"));

        ensure_sufficient_balance(
            "cosmoshub-4",
            &Coin::new(600, "uatom"),
            &Coin::new(600, "uatom"),
        )
        .expect("exact balance is enough");
    }
}
