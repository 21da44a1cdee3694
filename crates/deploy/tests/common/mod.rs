//! In-memory chain used by the integration tests.

#![allow(dead_code)]

use std::{collections::HashMap, sync::Mutex};

use alloy_core::primitives::{Address, B256, U256};
use anyhow::Result;
use raffle_deploy::{ConstructorArg, ContractDeployer, DeployedContract, OracleCoordinator, TxReceipt};

pub const SENDER: Address = Address::repeat_byte(0xee);

/// One call observed by the fake chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Deploy { name: String, confirmations: u64 },
    CreateSubscription { oracle: Address },
    FundSubscription { oracle: Address, id: u64, amount: U256 },
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    deployed: HashMap<String, DeployedContract>,
    next_address: u8,
    next_subscription: HashMap<Address, u64>,
    funded: HashMap<(Address, u64), U256>,
    block: u64,
}

/// Deterministic deployer and oracle coordinator.
///
/// Addresses are allocated sequentially and each coordinator numbers its
/// subscriptions from 1, like the mock coordinator does.
#[derive(Debug, Default)]
pub struct FakeChain {
    state: Mutex<State>,
    /// Whether creation receipts carry the `SubscriptionCreated` id.
    reports_subscription_id: bool,
    /// Contract names whose deployment fails.
    failing_deploys: Vec<String>,
    fail_create: bool,
    fail_fund: bool,
}

impl FakeChain {
    pub fn new() -> Self {
        Self {
            reports_subscription_id: true,
            ..Default::default()
        }
    }

    pub fn fail_deploy_of(mut self, name: &str) -> Self {
        self.failing_deploys.push(name.to_string());
        self
    }

    pub fn without_reported_ids(mut self) -> Self {
        self.reports_subscription_id = false;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn failing_fund(mut self) -> Self {
        self.fail_fund = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn deploy_count(&self, name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Deploy { name: n, .. } if n == name))
            .count()
    }

    pub fn oracle_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| !matches!(call, Call::Deploy { .. }))
            .count()
    }

    pub fn funded(&self, oracle: Address, id: u64) -> Option<U256> {
        self.state.lock().unwrap().funded.get(&(oracle, id)).copied()
    }

    fn receipt(state: &mut State, subscription_id: Option<u64>) -> TxReceipt {
        state.block += 1;
        TxReceipt {
            transaction_hash: B256::with_last_byte(state.block as u8),
            block_number: state.block,
            from: SENDER,
            subscription_id,
        }
    }
}

impl ContractDeployer for FakeChain {
    async fn deploy(
        &self,
        name: &str,
        args: &[ConstructorArg],
        confirmations: u64,
    ) -> Result<DeployedContract> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Deploy {
            name: name.to_string(),
            confirmations,
        });

        if self.failing_deploys.iter().any(|failing| failing == name) {
            anyhow::bail!("execution reverted while deploying {name}");
        }

        state.next_address += 1;
        state.block += confirmations;
        let deployed = DeployedContract {
            name: name.to_string(),
            address: Address::repeat_byte(state.next_address),
            transaction_hash: Some(B256::with_last_byte(state.next_address)),
            args: args.to_vec(),
        };
        state.deployed.insert(name.to_string(), deployed.clone());
        Ok(deployed)
    }

    async fn get(&self, name: &str) -> Result<Option<DeployedContract>> {
        Ok(self.state.lock().unwrap().deployed.get(name).cloned())
    }
}

impl OracleCoordinator for FakeChain {
    async fn create_subscription(&self, oracle: Address) -> Result<TxReceipt> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateSubscription { oracle });

        if self.fail_create {
            anyhow::bail!("createSubscription reverted");
        }

        let counter = state.next_subscription.entry(oracle).or_insert(0);
        *counter += 1;
        let id = *counter;

        let reported = self.reports_subscription_id.then_some(id);
        Ok(Self::receipt(&mut state, reported))
    }

    async fn fund_subscription(
        &self,
        oracle: Address,
        subscription_id: u64,
        amount: U256,
    ) -> Result<TxReceipt> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::FundSubscription {
            oracle,
            id: subscription_id,
            amount,
        });

        if self.fail_fund {
            anyhow::bail!("fundSubscription reverted: InvalidSubscription");
        }

        *state.funded.entry((oracle, subscription_id)).or_default() += amount;
        Ok(Self::receipt(&mut state, Some(subscription_id)))
    }
}

/// Initialize tracing for tests (idempotent).
pub fn init_test_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}
