//! Randomness oracle capability.

use std::future::Future;

use alloy_core::primitives::{Address, B256, U256};
use anyhow::Result;

/// Receipt of an included oracle transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub transaction_hash: B256,
    pub block_number: u64,
    /// Sender of the transaction.
    pub from: Address,
    /// Subscription id decoded from a `SubscriptionCreated` log, if any.
    pub subscription_id: Option<u64>,
}

/// Subscription management on a VRF coordinator (mock or live, same interface).
pub trait OracleCoordinator: Send + Sync {
    /// Call `createSubscription()` on `oracle` and wait for inclusion.
    fn create_subscription(&self, oracle: Address)
    -> impl Future<Output = Result<TxReceipt>> + Send;

    /// Call `fundSubscription(subscription_id, amount)` on `oracle` and wait for inclusion.
    fn fund_subscription(
        &self,
        oracle: Address,
        subscription_id: u64,
        amount: U256,
    ) -> impl Future<Output = Result<TxReceipt>> + Send;
}
