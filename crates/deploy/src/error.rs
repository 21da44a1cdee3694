//! Error taxonomy for a deployment run.
//!
//! Every variant is fatal to the run. Collaborators report failures as
//! [`anyhow::Error`]; the orchestrator wraps them here together with the
//! network and the step that failed.

use alloy_core::primitives::Address;

use crate::NetworkId;

/// Result alias for the deployment pipeline.
pub type DeployResult<T> = Result<T, DeployError>;

/// A failed deployment run.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The network is neither in the static table nor a local-simulation network.
    #[error("unknown network {network}: not in the network table and not a local network")]
    UnknownNetwork { network: NetworkId },

    /// A public network profile lacks the oracle address or subscription id.
    #[error("incomplete profile for network {network}: missing {missing}")]
    IncompleteNetworkProfile {
        network: NetworkId,
        missing: &'static str,
    },

    /// The mock oracle could not be deployed.
    #[error("failed to provision mock oracle {contract} on {network}")]
    MockProvisioning {
        network: NetworkId,
        contract: String,
        #[source]
        source: anyhow::Error,
    },

    /// The subscription creation transaction failed or its id could not be determined.
    #[error("failed to create subscription on oracle {oracle} ({network})")]
    SubscriptionCreation {
        network: NetworkId,
        oracle: Address,
        #[source]
        source: anyhow::Error,
    },

    /// The subscription funding transaction failed.
    #[error("failed to fund subscription {subscription_id} on oracle {oracle} ({network})")]
    SubscriptionFunding {
        network: NetworkId,
        oracle: Address,
        subscription_id: u64,
        #[source]
        source: anyhow::Error,
    },

    /// The assembled arguments do not match the declared constructor.
    #[error(
        "constructor arguments for {contract} on {network} do not match its declared constructor: {reason}"
    )]
    ConstructorMismatch {
        network: NetworkId,
        contract: String,
        reason: String,
    },

    /// The final deployment of the target contract failed.
    #[error("failed to deploy {contract} on {network}")]
    DeploymentFailed {
        network: NetworkId,
        contract: String,
        #[source]
        source: anyhow::Error,
    },
}

impl DeployError {
    /// The pipeline step the error was raised in.
    pub fn step(&self) -> &'static str {
        match self {
            Self::UnknownNetwork { .. } | Self::IncompleteNetworkProfile { .. } => "resolve",
            Self::MockProvisioning { .. } => "provision-mock",
            Self::SubscriptionCreation { .. } => "create-subscription",
            Self::SubscriptionFunding { .. } => "fund-subscription",
            Self::ConstructorMismatch { .. } => "assemble-arguments",
            Self::DeploymentFailed { .. } => "deploy",
        }
    }
}
