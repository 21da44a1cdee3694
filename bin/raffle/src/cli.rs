use std::path::PathBuf;

use alloy_core::primitives::Address;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use url::Url;

/// Default sender: the first account of a fresh anvil / hardhat node.
const DEFAULT_SENDER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// Output format of read-only commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser)]
#[command(name = "raffle")]
#[command(
    author,
    version,
    about = "Deploy the Raffle contract, with a mock VRF coordinator on local networks"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, global = true, env = "RAFFLE_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Path to a Raffle.toml configuration file, or a directory containing one.
    ///
    /// Values from the file are layered over the built-in defaults, and
    /// `RAFFLE_`-prefixed environment variables over both.
    #[arg(long, alias = "conf", global = true, env = "RAFFLE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy the target contract on a network.
    Deploy(DeployArgs),

    /// Print the static network table.
    Networks {
        #[arg(long, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print a deployment previously recorded on a network.
    Show {
        /// The network name the deployment was recorded under.
        #[arg(short, long, env = "RAFFLE_NETWORK")]
        network: String,

        /// The contract name.
        contract: String,

        /// The directory deployments are recorded in.
        #[arg(long, env = "RAFFLE_DEPLOYMENTS", default_value = "deployments")]
        deployments: PathBuf,
    },
}

#[derive(Debug, Clone, Parser)]
pub struct DeployArgs {
    /// The network name (e.g. hardhat, localhost, sepolia).
    #[arg(short, long, env = "RAFFLE_NETWORK")]
    pub network: String,

    /// The chain id. If not provided, it is read from the RPC endpoint.
    #[arg(long, env = "RAFFLE_CHAIN_ID")]
    pub chain_id: Option<u64>,

    /// The URL of the JSON-RPC endpoint.
    #[arg(long, alias = "rpc", env = "RAFFLE_RPC_URL", default_value = "http://127.0.0.1:8545")]
    pub rpc_url: Url,

    /// The unlocked account transactions are sent from.
    #[arg(long, env = "RAFFLE_FROM", default_value = DEFAULT_SENDER)]
    pub from: Address,

    /// Overrides the confirmation depth of the network.
    #[arg(long, env = "RAFFLE_CONFIRMATIONS")]
    pub confirmations: Option<u64>,

    /// Gas limit for each transaction. Estimated by the node when not provided.
    #[arg(long, env = "RAFFLE_GAS_LIMIT")]
    pub gas_limit: Option<u64>,

    /// The directory holding compiled contract artifacts (`<Name>.json`).
    #[arg(long, env = "RAFFLE_ARTIFACTS", default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// The directory deployments are recorded in.
    #[arg(long, env = "RAFFLE_DEPLOYMENTS", default_value = "deployments")]
    pub deployments: PathBuf,
}
