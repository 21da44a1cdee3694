//! Collaborator interfaces of the deployment pipeline.
//!
//! The orchestrator only needs to deploy a contract and wait for confirmations,
//! look up earlier deployments by name, and create and fund oracle subscriptions.
//! Transport, signing and artifact persistence live behind these traits.

mod deployer;
mod oracle;

pub use deployer::{ContractDeployer, DeployedContract};
pub use oracle::{OracleCoordinator, TxReceipt};
