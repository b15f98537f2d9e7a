//! xroute: quote and track cross-chain routes from the command line.

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use eyre::{Result, WrapErr};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use xroute_adapters::{load_registry, RoutingServiceClient, XrouteConfig};
use xroute_core::fees::FeeResolver;
use xroute_core::{RouteError, RouteRequest, RoutingServicePort, Tracker};

#[derive(Parser, Debug)]
#[command(name = "xroute", version, about = "Cross-chain route quoting and tracking")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List supported chains with their default gas price
    Chains,
    /// Request a route quote
    Route(RouteArgs),
    /// Register a transaction and poll until it settles
    Track(TrackArgs),
}

#[derive(Args, Debug)]
struct RouteArgs {
    #[arg(long)]
    source_chain: String,
    #[arg(long)]
    source_denom: String,
    #[arg(long)]
    dest_chain: String,
    #[arg(long)]
    dest_denom: String,
    #[arg(long, help = "amount in the source asset's base units")]
    amount: String,
}

#[derive(Args, Debug)]
struct TrackArgs {
    #[arg(long)]
    chain_id: String,
    #[arg(long)]
    tx_hash: String,
    #[arg(long, help = "give up after this many seconds (default: XROUTE_TRACK_TIMEOUT_MS or never)")]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = XrouteConfig::from_env()?;
    let routing = RoutingServiceClient::new(&config)?;
    info!(api_url = %routing.base_url(), "using routing service");

    match cli.command {
        Command::Chains => list_chains(&config, &routing).await,
        Command::Route(args) => quote_route(&routing, args).await,
        Command::Track(args) => track(&config, &routing, args).await,
    }
}

async fn list_chains(config: &XrouteConfig, routing: &RoutingServiceClient) -> Result<()> {
    let registry = Arc::new(load_registry(config.registry_path.as_deref())?);
    let chains = routing.chains().await.wrap_err("failed to fetch chains")?;
    let ids: Vec<String> = chains.iter().map(|c| c.chain_id.clone()).collect();
    let fees = FeeResolver::new(registry, chains);

    for chain_id in ids {
        match fees.recommended_gas_price(&chain_id) {
            Some(price) => println!("{chain_id}\t{}{}", price.amount, price.denom),
            None => println!("{chain_id}\t-"),
        }
    }
    Ok(())
}

async fn quote_route(routing: &RoutingServiceClient, args: RouteArgs) -> Result<()> {
    let request = RouteRequest::new(
        args.amount,
        args.source_chain,
        args.source_denom,
        args.dest_chain,
        args.dest_denom,
    );
    let quote = routing.route(&request).await.wrap_err("route request failed")?;
    println!("{}", serde_json::to_string_pretty(&quote)?);
    Ok(())
}

async fn track(config: &XrouteConfig, routing: &RoutingServiceClient, args: TrackArgs) -> Result<()> {
    let mut options = config.track_options();
    if let Some(secs) = args.timeout_secs {
        options.max_duration = Some(Duration::from_secs(secs));
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling tracking");
            on_signal.cancel();
        }
    });

    let tracker = Tracker::new(routing);
    match tracker
        .track(&args.chain_id, &args.tx_hash, &options, Some(&cancel))
        .await
    {
        Ok(report) => {
            println!("{}\t{:?}\t{}", args.tx_hash, report.status, report.raw_state);
            Ok(())
        }
        Err(RouteError::Cancelled) => {
            println!("{}\tcancelled", args.tx_hash);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
