//! Network identification and profile resolution.

use std::fmt;

use alloy_core::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::{
    DeployConfig,
    config::{DEV_CHAIN_ID, NetworkEntry},
    error::{DeployError, DeployResult},
};

/// Identifier of the network a run targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkId {
    /// Network name as known to the execution environment (e.g. `hardhat`, `sepolia`).
    pub name: String,
    /// EVM chain id.
    pub chain_id: u64,
}

impl NetworkId {
    pub fn new(name: impl Into<String>, chain_id: u64) -> Self {
        Self {
            name: name.into(),
            chain_id,
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}

/// The active network of a run, supplied once and immutable for its duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkContext {
    /// The network to deploy to.
    pub network: NetworkId,
    /// Confirmation depth override for this run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_confirmations: Option<u64>,
}

impl NetworkContext {
    pub fn new(network: NetworkId) -> Self {
        Self {
            network,
            block_confirmations: None,
        }
    }

    /// Override the confirmation depth.
    pub fn block_confirmations(mut self, confirmations: u64) -> Self {
        self.block_confirmations = Some(confirmations);
        self
    }
}

/// The resolved configuration of one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
    pub network: NetworkId,
    pub display_name: String,
    pub is_local_simulation: bool,
    pub entrance_fee: U256,
    pub oracle_key_hash: B256,
    pub callback_gas_limit: u32,
    /// Upkeep interval in seconds.
    pub polling_interval: u64,
    /// Always `None` on local profiles.
    pub oracle_address: Option<Address>,
    /// Always `None` on local profiles.
    pub subscription_id: Option<u64>,
    pub block_confirmations: Option<u64>,
}

/// Maps a network identifier to its static profile.
#[derive(Debug, Clone, Copy)]
pub struct NetworkProfileResolver<'a> {
    config: &'a DeployConfig,
}

impl<'a> NetworkProfileResolver<'a> {
    pub fn new(config: &'a DeployConfig) -> Self {
        Self { config }
    }

    /// Resolve a network to its profile.
    ///
    /// Local networks missing from the table fall back to the development chain entry.
    pub fn resolve(&self, network: &NetworkId) -> DeployResult<NetworkProfile> {
        let is_local = self.config.is_local_network(&network.name);

        let entry = match self.config.networks.by_chain_id(network.chain_id) {
            Some(entry) => entry,
            None if is_local => self
                .config
                .networks
                .by_chain_id(DEV_CHAIN_ID)
                .ok_or_else(|| DeployError::UnknownNetwork {
                    network: network.clone(),
                })?,
            None => {
                return Err(DeployError::UnknownNetwork {
                    network: network.clone(),
                });
            }
        };

        Ok(Self::profile_from_entry(network, entry, is_local))
    }

    fn profile_from_entry(network: &NetworkId, entry: &NetworkEntry, is_local: bool) -> NetworkProfile {
        let (oracle_address, subscription_id) = if is_local {
            (None, None)
        } else {
            (entry.vrf_coordinator, entry.subscription_id)
        };

        NetworkProfile {
            network: network.clone(),
            display_name: entry.name.clone(),
            is_local_simulation: is_local,
            entrance_fee: entry.entrance_fee,
            oracle_key_hash: entry.key_hash,
            callback_gas_limit: entry.callback_gas_limit,
            polling_interval: entry.interval,
            oracle_address,
            subscription_id,
            block_confirmations: entry.block_confirmations,
        }
    }

    /// Confirmation depth for a run: context override, then network, then global default.
    pub fn confirmations(&self, ctx: &NetworkContext, profile: &NetworkProfile) -> u64 {
        ctx.block_confirmations
            .or(profile.block_confirmations)
            .unwrap_or(self.config.default_confirmations)
    }
}
