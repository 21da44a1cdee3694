//! raffle is a CLI tool to deploy the Raffle lottery contract on local and public networks.

mod cli;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{Table, presets::UTF8_FULL};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use cli::{Cli, Command, DeployArgs, OutputFormat};
use raffle_deploy::{
    ArtifactStore, DeployConfig, DeploymentOrchestrator, NetworkContext,
    NetworkId, RpcChain, RpcChainConfig, config::CONFIG_FILENAME,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Deploy(args) => deploy(&config, args).await,
        Command::Networks { format } => print_networks(&config, format),
        Command::Show {
            network,
            contract,
            deployments,
        } => show(&config, &network, &contract, deployments).await,
    }
}

/// Layer the built-in defaults, an optional TOML file and `RAFFLE_` environment variables.
fn load_config(path: Option<&Path>) -> Result<DeployConfig> {
    let mut figment = Figment::from(Serialized::defaults(DeployConfig::default()));

    if let Some(path) = path {
        let file = if path.is_dir() {
            path.join(CONFIG_FILENAME)
        } else {
            path.to_path_buf()
        };
        if !file.exists() {
            anyhow::bail!("Configuration file not found: {}", file.display());
        }
        tracing::info!(path = %file.display(), "Loading configuration...");
        figment = figment.merge(Toml::file(file));
    }

    figment
        .merge(Env::prefixed("RAFFLE_").split("__"))
        .extract()
        .context("Failed to load configuration")
}

async fn deploy(config: &DeployConfig, args: DeployArgs) -> Result<()> {
    let store = ArtifactStore::new(&args.artifacts, &args.deployments, &args.network);

    let mut chain_config = RpcChainConfig::new(args.rpc_url.clone(), args.from);
    chain_config.gas_limit = args.gas_limit;
    let chain = RpcChain::new(chain_config, store)?;

    let chain_id = match args.chain_id {
        Some(chain_id) => chain_id,
        None => chain
            .chain_id()
            .await
            .with_context(|| format!("Failed to read chain id from {}", args.rpc_url))?,
    };

    let mut ctx = NetworkContext::new(NetworkId::new(&args.network, chain_id));
    if let Some(confirmations) = args.confirmations {
        ctx = ctx.block_confirmations(confirmations);
    }

    tracing::info!(
        network = %ctx.network,
        rpc_url = %args.rpc_url,
        from = %args.from,
        contract = config.target.name,
        "Starting deployment..."
    );

    let record = DeploymentOrchestrator::new(config, &chain, &chain)
        .run(&ctx, &config.target.name)
        .await?;

    chain.store().save_record(&record).await?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn print_networks(config: &DeployConfig, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&config.networks)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Chain ID",
        "Name",
        "Local",
        "Entrance fee (ETH)",
        "VRF coordinator",
        "Subscription",
        "Gas limit",
        "Interval (s)",
        "Confirmations",
    ]);

    for (chain_id, entry) in config.networks.entries() {
        let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            chain_id.to_string(),
            entry.name.clone(),
            config.is_local_network(&entry.name).to_string(),
            alloy_core::primitives::utils::format_ether(entry.entrance_fee),
            or_dash(entry.vrf_coordinator.map(|address| address.to_string())),
            or_dash(entry.subscription_id.map(|id| id.to_string())),
            entry.callback_gas_limit.to_string(),
            entry.interval.to_string(),
            or_dash(entry.block_confirmations.map(|n| n.to_string())),
        ]);
    }

    println!("{table}");
    println!("Local networks: {}", config.local_networks.join(", "));
    Ok(())
}

async fn show(
    config: &DeployConfig,
    network: &str,
    contract: &str,
    deployments: PathBuf,
) -> Result<()> {
    // Artifacts are not read when only looking up deployments.
    let store = ArtifactStore::new(PathBuf::new(), deployments, network);

    if let Some(record) = store.load_record(contract).await? {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    // Contracts deployed as a side effect (e.g. the mock coordinator) only have a deployment file.
    match store.load(contract).await? {
        Some(stored) => println!("{}", serde_json::to_string_pretty(&stored)?),
        None => anyhow::bail!(
            "No deployment of {} recorded on {} (target contract is {})",
            contract,
            network,
            config.target.name
        ),
    }
    Ok(())
}
