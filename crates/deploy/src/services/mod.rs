//! Pipeline services that provision oracle infrastructure on local networks.
//!
//! - `mock_oracle` - deploys a fresh mock VRF coordinator
//! - `subscription` - creates and funds a subscription on a coordinator

pub mod mock_oracle;
pub mod subscription;

// Re-export commonly used types
pub use mock_oracle::{MockInfrastructureProvisioner, MockOracleInstance};
pub use subscription::{
    FIRST_MOCK_SUBSCRIPTION_ID, OracleOrigin, Subscription, SubscriptionManager,
};
