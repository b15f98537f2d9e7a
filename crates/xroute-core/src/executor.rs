use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{
    BroadcastReceipt, ChainAccount, CosmosOperation, EvmOperation, Fee, LegOutcome, Operation, Route,
    RouteOutcome, SignerData,
};
use crate::error::RouteError;
use crate::fees::{FeeResolver, GasPrice};
use crate::gas::{
    apply_gas_multiplier, ensure_sufficient_balance, GasEstimator, DEFAULT_GAS_MULTIPLIER,
};
use crate::messages::{
    allowance_calldata, approve_calldata, decode_allowance, evm_call, CosmosMessage,
};
use crate::ports::{
    ChainConnector, GasPriceResolver, PortError, RouteObserver, RoutingServicePort,
    SignerProvider,
};
use crate::registry::{ChainRegistry, EndpointResolver};
use crate::signing::{
    sign_cosmos_message, simulation_tx, CosmosSigner, SigningRequest, SigningStrategy,
    SigningStrategyTable,
};
use crate::tracker::{TrackOptions, Tracker};

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub gas_multiplier: f64,
    /// Broadcast through the routing service instead of the chain endpoint.
    pub submit_via_routing_service: bool,
    pub endpoints: EndpointResolver,
    pub strategies: SigningStrategyTable,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            gas_multiplier: DEFAULT_GAS_MULTIPLIER,
            submit_via_routing_service: false,
            endpoints: EndpointResolver::default(),
            strategies: SigningStrategyTable::default(),
        }
    }
}

#[derive(Clone, Default)]
pub struct ExecuteRouteOptions {
    /// Check every Cosmos leg's fee against the signer's balance before the first broadcast.
    pub validate_gas_balance: bool,
    pub gas_price_resolver: Option<Arc<dyn GasPriceResolver>>,
    pub fee_overrides: HashMap<String, Fee>,
    pub track: TrackOptions,
    pub cancel: Option<CancellationToken>,
}

struct ExecutionContext<'a> {
    user_addresses: &'a HashMap<String, String>,
    signers: &'a dyn SignerProvider,
    options: &'a ExecuteRouteOptions,
    fees: Option<FeeResolver>,
}

impl ExecutionContext<'_> {
    fn cancel(&self) -> Option<&CancellationToken> {
        self.options.cancel.as_ref()
    }

    fn ensure_not_cancelled(&self) -> Result<(), RouteError> {
        match self.cancel() {
            Some(token) if token.is_cancelled() => Err(RouteError::Cancelled),
            _ => Ok(()),
        }
    }
}

struct PreparedLeg {
    message: CosmosMessage,
    signer: CosmosSigner,
    signer_address: String,
    signer_data: SignerData,
    fee: Fee,
    strategy: SigningStrategy,
    timeout_height: u64,
}

/// Walks a route's operations in order, one leg at a time.
pub struct RouteExecutor<R, N> {
    pub routing: R,
    pub connector: N,
    registry: Arc<ChainRegistry>,
    config: ExecutorConfig,
}

impl<R, N> RouteExecutor<R, N>
where
    R: RoutingServicePort,
    N: ChainConnector,
{
    pub fn new(
        routing: R,
        connector: N,
        registry: Arc<ChainRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            routing,
            connector,
            registry,
            config,
        }
    }

    pub async fn execute_route(
        &self,
        route: &Route,
        user_addresses: &HashMap<String, String>,
        signers: &dyn SignerProvider,
        observer: &dyn RouteObserver,
        options: ExecuteRouteOptions,
    ) -> Result<RouteOutcome, RouteError> {
        info!(
            legs = route.operations.len(),
            source = %route.source_asset.chain_id,
            dest = %route.dest_asset.chain_id,
            "executing route"
        );
        let mut ctx = ExecutionContext {
            user_addresses,
            signers,
            options: &options,
            fees: None,
        };

        if options.validate_gas_balance {
            self.validate_gas_balances(route, &mut ctx).await?;
        }

        let mut outcome = RouteOutcome::default();
        for (index, operation) in route.operations.iter().enumerate() {
            ctx.ensure_not_cancelled()?;
            let leg = match operation {
                Operation::MultiChainMsg(op) => {
                    self.execute_cosmos_leg(index, op, &mut ctx, observer).await?
                }
                Operation::EvmTx(op) => self.execute_evm_leg(index, op, &ctx, observer).await?,
            };
            outcome.legs.push(leg);
        }

        info!(legs = outcome.legs.len(), "route completed");
        Ok(outcome)
    }

    async fn validate_gas_balances(
        &self,
        route: &Route,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<(), RouteError> {
        for (index, op) in route.cosmos_operations() {
            debug!(index, chain_id = %op.chain_id, "validating gas balance");
            self.prepare_cosmos_leg(op, ctx, true).await?;
        }
        Ok(())
    }

    async fn gas_price(
        &self,
        chain_id: &str,
        ctx: &mut ExecutionContext<'_>,
    ) -> Result<GasPrice, RouteError> {
        let options = ctx.options;
        if let Some(resolver) = &options.gas_price_resolver {
            if let Some(price) = resolver.gas_price(chain_id).await? {
                return Ok(price);
            }
        }
        if ctx.fees.is_none() {
            let chains = self.routing.chains().await?;
            ctx.fees = Some(FeeResolver::new(Arc::clone(&self.registry), chains));
        }
        ctx.fees
            .as_ref()
            .and_then(|fees| fees.recommended_gas_price(chain_id))
            .ok_or_else(|| RouteError::GasPriceUnresolved {
                chain_id: chain_id.to_owned(),
            })
    }

    /// Resolves signer, account state and fee for one Cosmos leg. With `preflight`
    /// the signer's fee balance is checked as well, and legs that cannot be
    /// simulated yet fall back to the message's default gas.
    async fn prepare_cosmos_leg(
        &self,
        op: &CosmosOperation,
        ctx: &mut ExecutionContext<'_>,
        preflight: bool,
    ) -> Result<PreparedLeg, RouteError> {
        let chain_id = op.chain_id.as_str();
        let options = ctx.options;
        let address = ctx
            .user_addresses
            .get(chain_id)
            .cloned()
            .ok_or_else(|| RouteError::MissingAddress {
                chain_id: chain_id.to_owned(),
            })?;
        let signer = ctx
            .signers
            .cosmos_signer(chain_id)
            .await?
            .ok_or_else(|| RouteError::MissingSigner {
                chain_id: chain_id.to_owned(),
            })?;
        let account = signer.account(&address).await?;
        let message = CosmosMessage::from_operation(op)?;
        let strategy = self.config.strategies.strategy_for(chain_id);
        let endpoint = self.config.endpoints.resolve(chain_id, &self.registry)?;

        let client = self.connector.connect(chain_id, &endpoint).await?;
        let chain_account = match client.account(&address).await {
            Ok(chain_account) => chain_account,
            // A fresh address has no on-chain account until it first receives funds.
            Err(PortError::NotFound(reason)) if preflight => {
                debug!(chain_id, %reason, "account not found, treating as empty");
                ChainAccount {
                    address: address.clone(),
                    account_number: 0,
                    sequence: 0,
                }
            }
            Err(e) => return Err(e.into()),
        };
        let timeout_height = if strategy.needs_height() {
            strategy.timeout_height(client.latest_height().await?)
        } else {
            0
        };

        let fee = match options.fee_overrides.get(chain_id) {
            Some(fee) => fee.clone(),
            None => {
                let price = self.gas_price(chain_id, ctx).await?;
                let unpriced = Fee {
                    amount: Vec::new(),
                    gas_limit: 0,
                };
                let sim_tx = simulation_tx(
                    &message,
                    &unpriced,
                    chain_account.sequence,
                    &account.pubkey,
                    strategy,
                    timeout_height,
                )?;
                let estimator = GasEstimator::new(self.config.gas_multiplier);
                let gas_limit = match estimator.estimate(client.as_ref(), &sim_tx).await {
                    Ok(gas_limit) => gas_limit,
                    Err(e) if preflight => {
                        warn!(chain_id, error = %e, "simulation failed, using default gas");
                        apply_gas_multiplier(message.default_gas(), self.config.gas_multiplier)
                    }
                    Err(e) => return Err(e),
                };
                price
                    .fee_for(gas_limit)
                    .ok_or_else(|| RouteError::GasPriceUnresolved {
                        chain_id: chain_id.to_owned(),
                    })?
            }
        };
        debug!(chain_id, gas_limit = fee.gas_limit, fee = ?fee.primary(), "fee resolved");

        if preflight {
            if let Some(required) = fee.primary() {
                let available = client.balance(&address, &required.denom).await?;
                ensure_sufficient_balance(chain_id, required, &available)?;
            }
        }
        drop(client);

        Ok(PreparedLeg {
            message,
            signer,
            signer_data: SignerData {
                account_number: chain_account.account_number,
                sequence: chain_account.sequence,
                chain_id: chain_id.to_owned(),
            },
            signer_address: address,
            fee,
            strategy,
            timeout_height,
        })
    }

    async fn execute_cosmos_leg(
        &self,
        index: usize,
        op: &CosmosOperation,
        ctx: &mut ExecutionContext<'_>,
        observer: &dyn RouteObserver,
    ) -> Result<LegOutcome, RouteError> {
        info!(index, chain_id = %op.chain_id, "executing cosmos leg");
        let leg = self.prepare_cosmos_leg(op, ctx, false).await?;
        let signed = sign_cosmos_message(
            &leg.signer,
            SigningRequest {
                message: &leg.message,
                fee: &leg.fee,
                signer_data: &leg.signer_data,
                signer_address: &leg.signer_address,
                strategy: leg.strategy,
                timeout_height: leg.timeout_height,
            },
        )
        .await?;

        let receipt = self
            .broadcast(&op.chain_id, &signed.tx_bytes, &signed.tx_hash)
            .await?;
        info!(index, chain_id = %receipt.chain_id, tx_hash = %receipt.tx_hash, "broadcast");
        observer.on_transaction_broadcast(index, &receipt).await;

        self.track_leg(index, receipt, ctx, observer).await
    }

    async fn broadcast(
        &self,
        chain_id: &str,
        tx_bytes: &[u8],
        local_hash: &str,
    ) -> Result<BroadcastReceipt, RouteError> {
        if self.config.submit_via_routing_service {
            let submitted = self.routing.submit_transaction(chain_id, tx_bytes).await?;
            return Ok(BroadcastReceipt {
                chain_id: chain_id.to_owned(),
                tx_hash: submitted.tx_hash,
                height: None,
            });
        }

        let endpoint = self.config.endpoints.resolve(chain_id, &self.registry)?;
        let client = self.connector.connect(chain_id, &endpoint).await?;
        let response = client.broadcast(tx_bytes).await?;
        let tx_hash = if response.tx_hash.is_empty() {
            local_hash.to_owned()
        } else {
            response.tx_hash
        };
        if response.code != 0 {
            return Err(RouteError::BroadcastRejected {
                chain_id: chain_id.to_owned(),
                tx_hash,
                code: response.code,
                log: response.raw_log,
            });
        }
        Ok(BroadcastReceipt {
            chain_id: chain_id.to_owned(),
            tx_hash,
            height: response.height,
        })
    }

    async fn execute_evm_leg(
        &self,
        index: usize,
        op: &EvmOperation,
        ctx: &ExecutionContext<'_>,
        observer: &dyn RouteObserver,
    ) -> Result<LegOutcome, RouteError> {
        info!(index, chain_id = %op.chain_id, to = %op.to, "executing evm leg");
        let signer = ctx
            .signers
            .evm_signer(&op.chain_id)
            .await?
            .ok_or_else(|| RouteError::MissingSigner {
                chain_id: op.chain_id.clone(),
            })?;
        let owner = match op.signer_address {
            Some(address) => address,
            None => signer.address().await?,
        };

        for approval in &op.required_erc20_approvals {
            ctx.ensure_not_cancelled()?;
            let raw = signer
                .read_contract(
                    approval.token_contract,
                    allowance_calldata(owner, approval.spender),
                )
                .await?;
            let allowance = decode_allowance(&raw)?;
            if allowance >= approval.amount {
                debug!(token = %approval.token_contract, %allowance, "allowance sufficient");
                continue;
            }

            info!(token = %approval.token_contract, spender = %approval.spender, "sending approval");
            let hash = signer
                .write_contract(
                    approval.token_contract,
                    approve_calldata(approval.spender, approval.amount),
                )
                .await?;
            let receipt = signer.wait_for_receipt(hash).await?;
            if !receipt.success {
                return Err(RouteError::EvmReverted {
                    chain_id: op.chain_id.clone(),
                    tx_hash: hash.to_string(),
                    stage: "approval",
                });
            }
        }

        let hash = signer.send_transaction(evm_call(op)).await?;
        let receipt = signer.wait_for_receipt(hash).await?;
        if !receipt.success {
            return Err(RouteError::EvmReverted {
                chain_id: op.chain_id.clone(),
                tx_hash: hash.to_string(),
                stage: "call",
            });
        }

        let receipt = BroadcastReceipt {
            chain_id: op.chain_id.clone(),
            tx_hash: hash.to_string(),
            height: receipt.block_number,
        };
        info!(index, chain_id = %receipt.chain_id, tx_hash = %receipt.tx_hash, "broadcast");
        observer.on_transaction_broadcast(index, &receipt).await;

        self.track_leg(index, receipt, ctx, observer).await
    }

    async fn track_leg(
        &self,
        index: usize,
        receipt: BroadcastReceipt,
        ctx: &ExecutionContext<'_>,
        observer: &dyn RouteObserver,
    ) -> Result<LegOutcome, RouteError> {
        let report = Tracker::new(&self.routing)
            .track(
                &receipt.chain_id,
                &receipt.tx_hash,
                &ctx.options.track,
                ctx.cancel(),
            )
            .await?;

        let outcome = LegOutcome {
            index,
            chain_id: receipt.chain_id,
            tx_hash: receipt.tx_hash,
            status: report.status,
        };
        info!(index, chain_id = %outcome.chain_id, tx_hash = %outcome.tx_hash, "leg completed");
        observer.on_transaction_completed(&outcome).await;
        Ok(outcome)
    }
}
