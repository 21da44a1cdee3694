//! Contract deployment capability.

use std::future::Future;

use alloy_core::primitives::{Address, B256};
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::ConstructorArg;

/// A contract deployed on the current network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    /// Artifact name.
    pub name: String,
    /// Deployed address.
    pub address: Address,
    /// Creation transaction, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<B256>,
    /// Constructor arguments used at creation.
    #[serde(default)]
    pub args: Vec<ConstructorArg>,
}

/// Deploys contracts on the active network.
pub trait ContractDeployer: Send + Sync {
    /// Deploy `name` with `args` and return once `confirmations` blocks have passed.
    fn deploy(
        &self,
        name: &str,
        args: &[ConstructorArg],
        confirmations: u64,
    ) -> impl Future<Output = Result<DeployedContract>> + Send;

    /// A contract previously deployed under `name` on the current network.
    fn get(&self, name: &str) -> impl Future<Output = Result<Option<DeployedContract>>> + Send;
}
