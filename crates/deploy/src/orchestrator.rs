//! Top-level deployment driver.
//!
//! A run is strictly linear: resolve the network profile, provision a mock oracle and
//! a funded subscription when the network is local, assemble the constructor
//! arguments, deploy the target contract and return a [`DeploymentRecord`].
//!
//! Nothing is rolled back on failure. A mock or subscription created before a
//! failing step stays allocated and is reported in the logs for manual cleanup.

use alloy_core::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{
    ConstructorArg, ContractDeployer, DeployConfig, NetworkContext, NetworkId, NetworkProfile,
    NetworkProfileResolver, OracleCoordinator,
    args::ConstructorSignature,
    error::{DeployError, DeployResult},
    services::{
        MockInfrastructureProvisioner, MockOracleInstance, OracleOrigin, Subscription,
        SubscriptionManager,
    },
};

/// Outcome of a successful run. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub contract_name: String,
    pub network: NetworkId,
    pub address: Address,
    /// Arguments in constructor order.
    pub constructor_args: Vec<ConstructorArg>,
    pub confirmations: u64,
    /// Mock coordinator provisioned by this run (local networks only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_oracle: Option<MockOracleInstance>,
    /// Subscription created by this run (local networks only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Subscription>,
}

impl DeploymentRecord {
    /// The oracle address passed to the constructor.
    pub fn oracle_address(&self) -> Option<Address> {
        self.constructor_args.get(1).and_then(ConstructorArg::as_address)
    }

    /// The subscription id passed to the constructor.
    pub fn subscription_id(&self) -> Option<u64> {
        self.constructor_args
            .get(3)
            .and_then(ConstructorArg::as_uint)
            .and_then(|id| u64::try_from(id).ok())
    }
}

/// Assemble the target constructor arguments from a complete profile.
///
/// Order: entrance fee, oracle address, key hash, subscription id, callback gas
/// limit, interval. Returns the name of the first missing field otherwise.
pub fn constructor_args(profile: &NetworkProfile) -> Result<Vec<ConstructorArg>, &'static str> {
    let oracle = profile.oracle_address.ok_or("oracle address")?;
    let subscription_id = profile.subscription_id.ok_or("subscription id")?;

    Ok(vec![
        ConstructorArg::uint(256, profile.entrance_fee),
        ConstructorArg::address(oracle),
        ConstructorArg::bytes32(profile.oracle_key_hash),
        ConstructorArg::uint(64, subscription_id),
        ConstructorArg::uint(32, profile.callback_gas_limit),
        ConstructorArg::uint(256, profile.polling_interval),
    ])
}

/// Drives one deployment run against a deployer and an oracle collaborator.
pub struct DeploymentOrchestrator<'a, D, O> {
    config: &'a DeployConfig,
    deployer: &'a D,
    oracle: &'a O,
}

impl<'a, D, O> DeploymentOrchestrator<'a, D, O>
where
    D: ContractDeployer,
    O: OracleCoordinator,
{
    pub fn new(config: &'a DeployConfig, deployer: &'a D, oracle: &'a O) -> Self {
        Self {
            config,
            deployer,
            oracle,
        }
    }

    pub async fn run(
        &self,
        ctx: &NetworkContext,
        target_contract_name: &str,
    ) -> DeployResult<DeploymentRecord> {
        let network = &ctx.network;
        let resolver = NetworkProfileResolver::new(self.config);

        let mut profile = resolver.resolve(network)?;
        let confirmations = resolver.confirmations(ctx, &profile);

        let signature = ConstructorSignature::parse(&self.config.target.constructor).map_err(
            |err| DeployError::ConstructorMismatch {
                network: network.clone(),
                contract: target_contract_name.to_string(),
                reason: format!("{err:#}"),
            },
        )?;

        tracing::info!(
            %network,
            profile = profile.display_name,
            local = profile.is_local_simulation,
            confirmations,
            "Network profile resolved"
        );

        let (mock_oracle, subscription) = if profile.is_local_simulation {
            let (mock, subscription) = self.provision_local(network, confirmations).await?;
            profile.oracle_address = Some(mock.address);
            profile.subscription_id = Some(subscription.id);
            (Some(mock), Some(subscription))
        } else {
            (None, None)
        };

        let args = constructor_args(&profile).map_err(|missing| {
            DeployError::IncompleteNetworkProfile {
                network: network.clone(),
                missing,
            }
        })?;

        if let Err(reason) = signature.check(&args) {
            warn_orphaned(mock_oracle.as_ref(), subscription.as_ref());
            return Err(DeployError::ConstructorMismatch {
                network: network.clone(),
                contract: target_contract_name.to_string(),
                reason,
            });
        }

        tracing::info!(
            contract = target_contract_name,
            args = %args.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
            "Deploying target contract..."
        );

        let deployed = match self
            .deployer
            .deploy(target_contract_name, &args, confirmations)
            .await
        {
            Ok(deployed) => deployed,
            Err(source) => {
                warn_orphaned(mock_oracle.as_ref(), subscription.as_ref());
                return Err(DeployError::DeploymentFailed {
                    network: network.clone(),
                    contract: target_contract_name.to_string(),
                    source,
                });
            }
        };

        tracing::info!(
            contract = target_contract_name,
            address = %deployed.address,
            %network,
            "✓ Deployment complete!"
        );

        Ok(DeploymentRecord {
            contract_name: target_contract_name.to_string(),
            network: network.clone(),
            address: deployed.address,
            constructor_args: args,
            confirmations,
            mock_oracle,
            subscription,
        })
    }

    async fn provision_local(
        &self,
        network: &NetworkId,
        confirmations: u64,
    ) -> DeployResult<(MockOracleInstance, Subscription)> {
        let params = &self.config.mock_oracle;

        let mock = MockInfrastructureProvisioner::new(self.deployer, &params.name, network)
            .provision_mock_oracle(params.base_fee, params.gas_price_link, confirmations)
            .await?;

        let subscription = SubscriptionManager::new(self.oracle, network)
            .create_and_fund(
                mock.address,
                OracleOrigin::FreshMock,
                self.config.subscription_fund_amount,
            )
            .await
            .inspect_err(|_| warn_orphaned(Some(&mock), None))?;

        Ok((mock, subscription))
    }
}

fn warn_orphaned(mock: Option<&MockOracleInstance>, subscription: Option<&Subscription>) {
    if let Some(mock) = mock {
        tracing::warn!(
            address = %mock.address,
            "Mock oracle left deployed by the failed run; clean it up manually"
        );
    }
    if let Some(subscription) = subscription {
        tracing::warn!(
            subscription_id = subscription.id,
            oracle = %subscription.oracle,
            funded = %subscription.funded_amount,
            "Subscription left funded by the failed run; cancel it manually"
        );
    }
}
