//! Oracle subscription lifecycle: create, then fund.

use alloy_core::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{
    NetworkId, OracleCoordinator,
    error::{DeployError, DeployResult},
};

/// Id a fresh mock coordinator assigns to its first subscription.
pub const FIRST_MOCK_SUBSCRIPTION_ID: u64 = 1;

/// Where the coordinator a subscription is created on comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum OracleOrigin {
    /// A mock deployed by this run, with no prior subscriptions.
    FreshMock,
    /// Any other coordinator, including reused mocks.
    Existing,
}

/// A created and funded subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: u64,
    pub owner: Address,
    pub funded_amount: U256,
    pub oracle: Address,
}

/// Creates and funds subscriptions on a coordinator.
pub struct SubscriptionManager<'a, O> {
    oracle: &'a O,
    network: &'a NetworkId,
}

impl<'a, O: OracleCoordinator> SubscriptionManager<'a, O> {
    pub fn new(oracle: &'a O, network: &'a NetworkId) -> Self {
        Self { oracle, network }
    }

    /// Create a subscription on `oracle_address` and fund it with `funding_amount`.
    ///
    /// The id is taken from the creation receipt. Only a fresh mock may fall back to
    /// [`FIRST_MOCK_SUBSCRIPTION_ID`] when the receipt does not report one.
    pub async fn create_and_fund(
        &self,
        oracle_address: Address,
        origin: OracleOrigin,
        funding_amount: U256,
    ) -> DeployResult<Subscription> {
        let creation_error = |source| DeployError::SubscriptionCreation {
            network: self.network.clone(),
            oracle: oracle_address,
            source,
        };

        let receipt = self
            .oracle
            .create_subscription(oracle_address)
            .await
            .map_err(creation_error)?;

        tracing::debug!(
            tx_hash = %receipt.transaction_hash,
            block_number = receipt.block_number,
            reported_id = ?receipt.subscription_id,
            %origin,
            "Subscription creation included"
        );

        let id = match (receipt.subscription_id, origin) {
            (Some(id), _) => id,
            (None, OracleOrigin::FreshMock) => FIRST_MOCK_SUBSCRIPTION_ID,
            (None, OracleOrigin::Existing) => {
                return Err(creation_error(anyhow::anyhow!(
                    "creation receipt {} carries no SubscriptionCreated event",
                    receipt.transaction_hash
                )));
            }
        };

        let funded = self
            .oracle
            .fund_subscription(oracle_address, id, funding_amount)
            .await
            .map_err(|source| DeployError::SubscriptionFunding {
                network: self.network.clone(),
                oracle: oracle_address,
                subscription_id: id,
                source,
            })?;

        tracing::info!(
            subscription_id = id,
            oracle = %oracle_address,
            amount = %funding_amount,
            tx_hash = %funded.transaction_hash,
            "Subscription created and funded"
        );

        Ok(Subscription {
            id,
            owner: receipt.from,
            funded_amount: funding_amount,
            oracle: oracle_address,
        })
    }
}
