//! Mock VRF coordinator for local networks.

use alloy_core::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{
    ConstructorArg, ContractDeployer, NetworkId,
    error::{DeployError, DeployResult},
};

/// A mock coordinator deployed by the current run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockOracleInstance {
    pub address: Address,
    pub base_fee: U256,
    pub gas_price_link: u64,
}

/// Deploys a local stand-in for the randomness oracle.
///
/// Every call deploys a new instance. Reusing a mock across runs is left to the caller.
pub struct MockInfrastructureProvisioner<'a, D> {
    deployer: &'a D,
    contract: &'a str,
    network: &'a NetworkId,
}

impl<'a, D: ContractDeployer> MockInfrastructureProvisioner<'a, D> {
    pub fn new(deployer: &'a D, contract: &'a str, network: &'a NetworkId) -> Self {
        Self {
            deployer,
            contract,
            network,
        }
    }

    /// Constructor arguments of the mock: `(uint96 baseFee, uint96 gasPriceLink)`.
    pub fn constructor_args(base_fee: U256, gas_price_link: u64) -> Vec<ConstructorArg> {
        vec![
            ConstructorArg::uint(96, base_fee),
            ConstructorArg::uint(96, gas_price_link),
        ]
    }

    pub async fn provision_mock_oracle(
        &self,
        base_fee: U256,
        gas_price_link: u64,
        confirmations: u64,
    ) -> DeployResult<MockOracleInstance> {
        tracing::info!(network = %self.network, contract = self.contract, "Local network detected! Deploying mocks...");

        let args = Self::constructor_args(base_fee, gas_price_link);

        let deployed = self
            .deployer
            .deploy(self.contract, &args, confirmations)
            .await
            .map_err(|source| DeployError::MockProvisioning {
                network: self.network.clone(),
                contract: self.contract.to_string(),
                source,
            })?;

        tracing::info!(
            address = %deployed.address,
            %base_fee,
            gas_price_link,
            "Mocks deployed!"
        );

        Ok(MockOracleInstance {
            address: deployed.address,
            base_fee,
            gas_price_link,
        })
    }
}
