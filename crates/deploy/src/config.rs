//! Deployment configuration.
//!
//! [`DeployConfig`] is built once at process start and passed by reference to every
//! component. It holds the static per-network table and the system-wide constants
//! used when a local network needs mock oracle infrastructure.

use std::{collections::BTreeMap, path::Path};

use alloy_core::primitives::{Address, B256, U256, address, b256, utils::parse_ether};
use anyhow::{Context, Result};
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};

/// The default name for the configuration file.
pub const CONFIG_FILENAME: &str = "Raffle.toml";

/// Chain id of the development chain (hardhat / anvil default).
pub const DEV_CHAIN_ID: u64 = 31337;

/// Chain id of Sepolia.
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

/// Sepolia VRF coordinator v2.
pub const SEPOLIA_VRF_COORDINATOR: Address = address!("9DdfaCa8183c41ad55329BdeeD9F6A8d53168B1B");

/// 30 gwei key hash ("gas lane").
pub const DEFAULT_KEY_HASH: B256 =
    b256!("8af398995b04c28e9951adb9721ef74c74f93e6a478f39e7e0777be13527e7ef");

/// Constructor of the target contract, in argument order.
pub const RAFFLE_CONSTRUCTOR: &str = "constructor(uint256 entranceFee, address vrfCoordinatorV2, bytes32 gasLane, uint64 subscriptionId, uint32 callbackGasLimit, uint256 interval)";

/// Serde helpers writing wei amounts as decimal ether strings (`"0.25"`).
pub mod ether {
    use alloy_core::primitives::{
        U256,
        utils::{format_ether, parse_ether},
    };
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        let formatted = format_ether(*value);
        // format_ether pads to 18 decimals
        let trimmed = if formatted.contains('.') {
            formatted.trim_end_matches('0').trim_end_matches('.')
        } else {
            formatted.as_str()
        };
        serializer.serialize_str(trimmed)
    }

    /// Env layers hand over bare numbers, so whole numbers are accepted too.
    /// Floats are only matched to be rejected: they cannot hold 18 decimals exactly.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Text(String),
        Whole(u64),
        Float(f64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let text = match Amount::deserialize(deserializer)? {
            Amount::Text(text) => text,
            Amount::Whole(whole) => whole.to_string(),
            Amount::Float(float) => {
                return Err(serde::de::Error::custom(format!(
                    "ether amount {float} must be a quoted string (e.g. \"0.25\") to be exact"
                )));
            }
        };
        parse_ether(&text).map_err(serde::de::Error::custom)
    }
}

/// The contract this tool deploys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetContract {
    /// Artifact name of the contract.
    pub name: String,
    /// Human-readable constructor signature the assembled arguments must match.
    pub constructor: String,
}

impl Default for TargetContract {
    fn default() -> Self {
        Self {
            name: "Raffle".to_string(),
            constructor: RAFFLE_CONSTRUCTOR.to_string(),
        }
    }
}

/// Parameters of the mock VRF coordinator deployed on local networks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockOracleParams {
    /// Artifact name of the mock coordinator.
    pub name: String,
    /// Flat fee per request, in wei.
    #[serde(with = "ether")]
    pub base_fee: U256,
    /// LINK per gas.
    pub gas_price_link: u64,
}

impl Default for MockOracleParams {
    fn default() -> Self {
        Self {
            name: "VRFCoordinatorV2Mock".to_string(),
            // 0.25 LINK per request
            base_fee: U256::from(250_000_000_000_000_000u128),
            gas_price_link: 1_000_000_000,
        }
    }
}

/// Static fields of one network in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEntry {
    /// Display name.
    pub name: String,
    /// Raffle entrance fee, in wei.
    #[serde(with = "ether")]
    pub entrance_fee: U256,
    /// VRF key hash.
    pub key_hash: B256,
    /// Gas limit for the randomness callback.
    pub callback_gas_limit: u32,
    /// Upkeep interval in seconds.
    pub interval: u64,
    /// Live VRF coordinator. Public networks only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vrf_coordinator: Option<Address>,
    /// Existing subscription id. Public networks only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<u64>,
    /// Confirmation depth for this network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_confirmations: Option<u64>,
}

/// The closed mapping from chain id to static network fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Deref, DerefMut)]
#[serde(transparent)]
pub struct NetworkTable(BTreeMap<String, NetworkEntry>);

impl NetworkTable {
    /// Look up a network by chain id.
    pub fn by_chain_id(&self, chain_id: u64) -> Option<&NetworkEntry> {
        self.0.get(&chain_id.to_string())
    }

    /// Insert or replace a network entry.
    pub fn insert(&mut self, chain_id: u64, entry: NetworkEntry) -> Option<NetworkEntry> {
        self.0.insert(chain_id.to_string(), entry)
    }

    /// Iterate entries with their numeric chain ids, skipping malformed keys.
    pub fn entries(&self) -> impl Iterator<Item = (u64, &NetworkEntry)> {
        self.0
            .iter()
            .filter_map(|(key, entry)| key.parse().ok().map(|id| (id, entry)))
    }
}

/// Immutable configuration of the deployment tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// The contract to deploy.
    pub target: TargetContract,
    /// Mock oracle used on local networks.
    pub mock_oracle: MockOracleParams,
    /// Amount funded into a freshly created subscription, in wei.
    #[serde(with = "ether")]
    pub subscription_fund_amount: U256,
    /// Confirmation depth when neither the context nor the network sets one.
    pub default_confirmations: u64,
    /// Network names treated as local simulations.
    pub local_networks: Vec<String>,
    /// Static per-network fields, keyed by chain id.
    pub networks: NetworkTable,
}

impl Default for DeployConfig {
    fn default() -> Self {
        let entrance_fee = U256::from(10_000_000_000_000_000u128); // 0.01 ETH

        let mut networks = NetworkTable::default();
        networks.insert(
            SEPOLIA_CHAIN_ID,
            NetworkEntry {
                name: "sepolia".to_string(),
                entrance_fee,
                key_hash: DEFAULT_KEY_HASH,
                callback_gas_limit: 500_000,
                interval: 30,
                vrf_coordinator: Some(SEPOLIA_VRF_COORDINATOR),
                subscription_id: Some(0),
                block_confirmations: Some(6),
            },
        );
        networks.insert(
            DEV_CHAIN_ID,
            NetworkEntry {
                name: "hardhat".to_string(),
                entrance_fee,
                key_hash: DEFAULT_KEY_HASH,
                callback_gas_limit: 500_000,
                interval: 30,
                vrf_coordinator: None,
                subscription_id: None,
                block_confirmations: Some(1),
            },
        );

        Self {
            target: TargetContract::default(),
            mock_oracle: MockOracleParams::default(),
            // 7 LINK
            subscription_fund_amount: U256::from(7_000_000_000_000_000_000u128),
            default_confirmations: 1,
            local_networks: vec![
                "hardhat".to_string(),
                "localhost".to_string(),
                "anvil".to_string(),
            ],
            networks,
        }
    }
}

impl DeployConfig {
    /// Whether a network name designates a local simulation.
    pub fn is_local_network(&self, name: &str) -> bool {
        self.local_networks.iter().any(|local| local == name)
    }

    /// Override the mock oracle fee parameters from ether / raw strings.
    pub fn with_mock_fees(mut self, base_fee_eth: &str, gas_price_link: u64) -> Result<Self> {
        self.mock_oracle.base_fee =
            parse_ether(base_fee_eth).context("Failed to parse mock oracle base fee")?;
        self.mock_oracle.gas_price_link = gas_price_link;
        Ok(self)
    }

    /// Override the subscription funding amount from an ether string.
    pub fn with_fund_amount(mut self, amount_eth: &str) -> Result<Self> {
        self.subscription_fund_amount =
            parse_ether(amount_eth).context("Failed to parse subscription fund amount")?;
        Ok(self)
    }

    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize deploy config to TOML")?;
        std::fs::write(path, content)
            .context(format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load the configuration from a TOML file or a directory containing one.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Configuration file or directory not found: {}", path.display());
        }

        let config_path = if path.is_dir() {
            path.join(CONFIG_FILENAME)
        } else {
            path.to_path_buf()
        };

        let content = std::fs::read_to_string(&config_path)
            .context(format!("Failed to read config from {}", config_path.display()))?;
        let config: Self =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;
        tracing::info!(path = %config_path.display(), "Configuration loaded");
        Ok(config)
    }
}
