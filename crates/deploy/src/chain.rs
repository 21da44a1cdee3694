//! JSON-RPC backend for the deployment collaborators.
//!
//! Transactions are sent with `eth_sendTransaction` from an account unlocked on the
//! node (anvil, hardhat, or a signing proxy), so no key material is handled here.

use std::time::{Duration, Instant};

use alloy_core::{
    json_abi::Event,
    primitives::{Address, B256, Bytes, U256},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    ArtifactStore, ConstructorArg, ContractDeployer, DeployedContract, OracleCoordinator,
    TxReceipt,
    args::{encode_args, encode_call},
    rpc,
};

const CREATE_SUBSCRIPTION: &str = "function createSubscription() returns (uint64 subId)";
const FUND_SUBSCRIPTION: &str = "function fundSubscription(uint64 subId, uint96 amount)";
const SUBSCRIPTION_CREATED: &str = "event SubscriptionCreated(uint64 indexed subId, address owner)";

/// Connection settings for [`RpcChain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcChainConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Unlocked sender account.
    pub from: Address,
    /// Gas limit for each transaction. Left to the node when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    /// Delay between receipt / block polls.
    pub poll_interval: Duration,
    /// Upper bound on waiting for a receipt plus its confirmations.
    pub receipt_timeout: Duration,
}

impl RpcChainConfig {
    pub fn new(rpc_url: Url, from: Address) -> Self {
        Self {
            rpc_url,
            from,
            gas_limit: None,
            poll_interval: Duration::from_secs(1),
            receipt_timeout: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    address: Address,
    topics: Vec<B256>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: B256,
    block_number: String,
    from: Address,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    contract_address: Option<Address>,
    #[serde(default)]
    logs: Vec<RpcLog>,
}

/// Extract the id of a `SubscriptionCreated` event emitted by `oracle`.
fn subscription_id_from_logs(oracle: Address, topic0: B256, logs: &[RpcLog]) -> Option<u64> {
    logs.iter()
        .filter(|log| log.address == oracle)
        .find(|log| log.topics.first() == Some(&topic0))
        .and_then(|log| log.topics.get(1))
        .and_then(|topic| u64::try_from(U256::from_be_bytes(topic.0)).ok())
}

/// Deployer and oracle collaborator backed by an Ethereum JSON-RPC node.
#[derive(Debug, Clone)]
pub struct RpcChain {
    client: reqwest::Client,
    config: RpcChainConfig,
    store: ArtifactStore,
}

impl RpcChain {
    pub fn new(config: RpcChainConfig, store: ArtifactStore) -> Result<Self> {
        Ok(Self {
            client: rpc::create_client()?,
            config,
            store,
        })
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Chain id reported by the node.
    pub async fn chain_id(&self) -> Result<u64> {
        let id: String = self.call("eth_chainId", vec![]).await?;
        rpc::parse_quantity(&id)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<T> {
        rpc::json_rpc_call(&self.client, self.config.rpc_url.as_str(), method, params).await
    }

    async fn send_transaction(&self, to: Option<Address>, data: Bytes) -> Result<B256> {
        let mut tx = serde_json::json!({
            "from": self.config.from,
            "data": data,
        });
        if let Some(to) = to {
            tx["to"] = serde_json::json!(to);
        }
        if let Some(gas) = self.config.gas_limit {
            tx["gas"] = serde_json::json!(format!("0x{gas:x}"));
        }

        let tx_hash: B256 = self
            .call("eth_sendTransaction", vec![tx])
            .await
            .context("Failed to send transaction")?;
        tracing::debug!(%tx_hash, ?to, "Transaction sent");
        Ok(tx_hash)
    }

    /// Wait until `tx_hash` is included with `confirmations` blocks and succeeded.
    /// Both the receipt and the confirmations are bounded by one `receipt_timeout`.
    async fn wait_for_receipt(&self, tx_hash: B256, confirmations: u64) -> Result<RpcReceipt> {
        let deadline = Instant::now() + self.config.receipt_timeout;

        let receipt: RpcReceipt = rpc::poll_until(
            "transaction receipt",
            self.config.receipt_timeout,
            self.config.poll_interval,
            || {
                self.call::<Option<RpcReceipt>>(
                    "eth_getTransactionReceipt",
                    vec![serde_json::json!(tx_hash)],
                )
            },
        )
        .await?;

        if receipt.status.as_deref() == Some("0x0") {
            anyhow::bail!("Transaction {} reverted", tx_hash);
        }

        let included_at = rpc::parse_quantity(&receipt.block_number)?;
        let target = included_at + confirmations.saturating_sub(1);

        rpc::poll_until(
            "block confirmations",
            deadline.saturating_duration_since(Instant::now()),
            self.config.poll_interval,
            move || async move {
                let head: String = self.call("eth_blockNumber", vec![]).await?;
                Ok((rpc::parse_quantity(&head)? >= target).then_some(()))
            },
        )
        .await?;

        tracing::debug!(%tx_hash, block_number = included_at, confirmations, "Transaction confirmed");
        Ok(receipt)
    }

    async fn oracle_transaction(&self, oracle: Address, data: Bytes) -> Result<RpcReceipt> {
        let tx_hash = self.send_transaction(Some(oracle), data).await?;
        self.wait_for_receipt(tx_hash, 1).await
    }
}

impl ContractDeployer for RpcChain {
    async fn deploy(
        &self,
        name: &str,
        args: &[ConstructorArg],
        confirmations: u64,
    ) -> Result<DeployedContract> {
        let bytecode = self.store.bytecode(name).await?;
        let data: Bytes = [&bytecode[..], &encode_args(args)[..]].concat().into();

        let tx_hash = self.send_transaction(None, data).await?;
        tracing::info!(name, %tx_hash, confirmations, "Deploying contract, waiting for confirmations...");

        let receipt = self.wait_for_receipt(tx_hash, confirmations).await?;
        let address = receipt
            .contract_address
            .with_context(|| format!("Receipt {} has no contract address", tx_hash))?;

        let deployed = DeployedContract {
            name: name.to_string(),
            address,
            transaction_hash: Some(receipt.transaction_hash),
            args: args.to_vec(),
        };
        self.store.save(&deployed, confirmations).await?;

        tracing::info!(name, %address, "Contract deployed");
        Ok(deployed)
    }

    async fn get(&self, name: &str) -> Result<Option<DeployedContract>> {
        Ok(self.store.load(name).await?.map(|stored| stored.contract))
    }
}

impl OracleCoordinator for RpcChain {
    async fn create_subscription(&self, oracle: Address) -> Result<TxReceipt> {
        let topic0 = Event::parse(SUBSCRIPTION_CREATED)
            .context("Failed to parse SubscriptionCreated event")?
            .selector();

        let receipt = self
            .oracle_transaction(oracle, encode_call(CREATE_SUBSCRIPTION, &[])?)
            .await?;

        Ok(TxReceipt {
            transaction_hash: receipt.transaction_hash,
            block_number: rpc::parse_quantity(&receipt.block_number)?,
            from: receipt.from,
            subscription_id: subscription_id_from_logs(oracle, topic0, &receipt.logs),
        })
    }

    async fn fund_subscription(
        &self,
        oracle: Address,
        subscription_id: u64,
        amount: U256,
    ) -> Result<TxReceipt> {
        let data = encode_call(
            FUND_SUBSCRIPTION,
            &[
                ConstructorArg::uint(64, subscription_id),
                ConstructorArg::uint(96, amount),
            ],
        )?;

        let receipt = self.oracle_transaction(oracle, data).await?;

        Ok(TxReceipt {
            transaction_hash: receipt.transaction_hash,
            block_number: rpc::parse_quantity(&receipt.block_number)?,
            from: receipt.from,
            subscription_id: Some(subscription_id),
        })
    }
}
