//! raffle-deploy - Deployment library for the Raffle lottery contract.
//!
//! This crate resolves per-network parameters, provisions a mock VRF coordinator and a
//! funded subscription on local networks, and deploys the Raffle contract with its
//! constructor arguments in declaration order.

pub mod args;
pub use args::{ConstructorArg, ConstructorSignature};

mod artifacts;
pub use artifacts::{ArtifactStore, StoredDeployment};

mod chain;
pub use chain::{RpcChain, RpcChainConfig};

pub mod config;
pub use config::{DeployConfig, MockOracleParams, NetworkEntry, NetworkTable, TargetContract};

pub mod error;
pub use error::{DeployError, DeployResult};

mod network;
pub use network::{NetworkContext, NetworkId, NetworkProfile, NetworkProfileResolver};

mod orchestrator;
pub use orchestrator::{DeploymentOrchestrator, DeploymentRecord, constructor_args};

pub mod rpc;
pub mod services;
pub use services::{
    MockInfrastructureProvisioner, MockOracleInstance, OracleOrigin, Subscription,
    SubscriptionManager,
};

mod traits;
pub use traits::{ContractDeployer, DeployedContract, OracleCoordinator, TxReceipt};
