//! End-to-end runs of the deployment orchestrator against an in-memory chain.
//!
//! Run with: cargo test --test orchestrator_test

mod common;

use alloy_core::primitives::{Address, utils::parse_ether};
use anyhow::Result;
use common::{Call, FakeChain, SENDER, init_test_tracing};
use raffle_deploy::{
    ConstructorArg, ContractDeployer, DeployConfig, DeployError, DeploymentOrchestrator,
    NetworkContext, NetworkId,
    config::{DEFAULT_KEY_HASH, SEPOLIA_VRF_COORDINATOR},
};

const RAFFLE: &str = "Raffle";
const MOCK: &str = "VRFCoordinatorV2Mock";

fn local_context() -> NetworkContext {
    NetworkContext::new(NetworkId::new("hardhat", 31337))
}

fn sepolia_context() -> NetworkContext {
    NetworkContext::new(NetworkId::new("sepolia", 11155111))
}

#[tokio::test]
async fn test_local_run_provisions_mock_and_funded_subscription() -> Result<()> {
    init_test_tracing();

    let config = DeployConfig::default();
    let chain = FakeChain::new();
    let orchestrator = DeploymentOrchestrator::new(&config, &chain, &chain);

    let record = orchestrator.run(&local_context(), RAFFLE).await?;

    assert_eq!(chain.deploy_count(MOCK), 1);
    assert_eq!(chain.deploy_count(RAFFLE), 1);

    let mock = record.mock_oracle.clone().expect("local run provisions a mock");
    assert_eq!(mock.base_fee, parse_ether("0.25")?);
    assert_eq!(mock.gas_price_link, 1_000_000_000);
    assert_eq!(record.oracle_address(), Some(mock.address));

    let mock_args = chain.get(MOCK).await?.expect("mock deployment stored").args;
    assert_eq!(
        mock_args,
        vec![
            ConstructorArg::uint(96, parse_ether("0.25")?),
            ConstructorArg::uint(96, 1_000_000_000u64),
        ]
    );

    let subscription = record.subscription.clone().expect("local run creates a subscription");
    assert_eq!(subscription.id, 1);
    assert_eq!(subscription.owner, SENDER);
    assert_eq!(subscription.oracle, mock.address);
    assert_eq!(record.subscription_id(), Some(1));
    assert_eq!(chain.funded(mock.address, 1), Some(parse_ether("7")?));

    assert_eq!(record.constructor_args[0].as_uint(), Some(parse_ether("0.01")?));
    assert_eq!(record.constructor_args[2], ConstructorArg::bytes32(DEFAULT_KEY_HASH));
    assert_eq!(record.constructor_args[4], ConstructorArg::uint(32, 500_000u64));
    assert_eq!(record.constructor_args[5], ConstructorArg::uint(256, 30u64));
    assert_eq!(record.confirmations, 1);

    Ok(())
}

#[tokio::test]
async fn test_local_run_calls_collaborators_in_order() -> Result<()> {
    let config = DeployConfig::default();
    let chain = FakeChain::new();

    DeploymentOrchestrator::new(&config, &chain, &chain)
        .run(&local_context(), RAFFLE)
        .await?;

    let mock = Address::repeat_byte(1);
    assert_eq!(
        chain.calls(),
        vec![
            Call::Deploy {
                name: MOCK.to_string(),
                confirmations: 1,
            },
            Call::CreateSubscription { oracle: mock },
            Call::FundSubscription {
                oracle: mock,
                id: 1,
                amount: parse_ether("7")?,
            },
            Call::Deploy {
                name: RAFFLE.to_string(),
                confirmations: 1,
            },
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_fresh_mock_without_reported_id_uses_first_id() -> Result<()> {
    let config = DeployConfig::default();
    let chain = FakeChain::new().without_reported_ids();

    let record = DeploymentOrchestrator::new(&config, &chain, &chain)
        .run(&local_context(), RAFFLE)
        .await?;

    assert_eq!(record.subscription_id(), Some(1));
    Ok(())
}

#[tokio::test]
async fn test_unlisted_local_network_falls_back_to_dev_entry() -> Result<()> {
    let config = DeployConfig::default();
    let chain = FakeChain::new();
    let ctx = NetworkContext::new(NetworkId::new("anvil", 1337));

    let record = DeploymentOrchestrator::new(&config, &chain, &chain)
        .run(&ctx, RAFFLE)
        .await?;

    assert_eq!(record.network, NetworkId::new("anvil", 1337));
    assert!(record.mock_oracle.is_some());
    Ok(())
}

#[tokio::test]
async fn test_public_run_uses_table_values_only() -> Result<()> {
    let config = DeployConfig::default();
    let chain = FakeChain::new();

    let record = DeploymentOrchestrator::new(&config, &chain, &chain)
        .run(&sepolia_context(), RAFFLE)
        .await?;

    assert_eq!(chain.deploy_count(MOCK), 0);
    assert_eq!(chain.oracle_calls(), 0);
    assert!(record.mock_oracle.is_none());
    assert!(record.subscription.is_none());

    assert_eq!(
        record.constructor_args,
        vec![
            ConstructorArg::uint(256, parse_ether("0.01")?),
            ConstructorArg::address(SEPOLIA_VRF_COORDINATOR),
            ConstructorArg::bytes32(DEFAULT_KEY_HASH),
            ConstructorArg::uint(64, 0u64),
            ConstructorArg::uint(32, 500_000u64),
            ConstructorArg::uint(256, 30u64),
        ]
    );
    assert_eq!(record.confirmations, 6);
    assert_eq!(
        chain.calls(),
        vec![Call::Deploy {
            name: RAFFLE.to_string(),
            confirmations: 6,
        }]
    );

    Ok(())
}

#[tokio::test]
async fn test_context_confirmations_override_network_default() -> Result<()> {
    let config = DeployConfig::default();
    let chain = FakeChain::new();
    let ctx = sepolia_context().block_confirmations(2);

    let record = DeploymentOrchestrator::new(&config, &chain, &chain)
        .run(&ctx, RAFFLE)
        .await?;

    assert_eq!(record.confirmations, 2);
    Ok(())
}

#[tokio::test]
async fn test_incomplete_public_profile_fails_before_deploying() {
    let mut config = DeployConfig::default();
    if let Some(entry) = config.networks.get_mut("11155111") {
        entry.subscription_id = None;
    }
    let chain = FakeChain::new();

    let err = DeploymentOrchestrator::new(&config, &chain, &chain)
        .run(&sepolia_context(), RAFFLE)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DeployError::IncompleteNetworkProfile {
            missing: "subscription id",
            ..
        }
    ));
    assert_eq!(err.step(), "resolve");
    assert!(chain.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_network_is_rejected() {
    let config = DeployConfig::default();
    let chain = FakeChain::new();
    let ctx = NetworkContext::new(NetworkId::new("goerli", 5));

    let err = DeploymentOrchestrator::new(&config, &chain, &chain)
        .run(&ctx, RAFFLE)
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::UnknownNetwork { .. }));
    assert!(chain.calls().is_empty());
}

#[tokio::test]
async fn test_mock_failure_stops_the_run() {
    let config = DeployConfig::default();
    let chain = FakeChain::new().fail_deploy_of(MOCK);

    let err = DeploymentOrchestrator::new(&config, &chain, &chain)
        .run(&local_context(), RAFFLE)
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::MockProvisioning { .. }));
    assert_eq!(chain.oracle_calls(), 0);
    assert_eq!(chain.deploy_count(RAFFLE), 0);
}

#[tokio::test]
async fn test_subscription_creation_failure_leaves_mock_deployed() {
    let config = DeployConfig::default();
    let chain = FakeChain::new().failing_create();

    let err = DeploymentOrchestrator::new(&config, &chain, &chain)
        .run(&local_context(), RAFFLE)
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::SubscriptionCreation { .. }));
    assert_eq!(err.step(), "create-subscription");
    assert_eq!(chain.deploy_count(MOCK), 1);
    assert_eq!(chain.deploy_count(RAFFLE), 0);
}

#[tokio::test]
async fn test_subscription_funding_failure_is_reported_with_id() {
    let config = DeployConfig::default();
    let chain = FakeChain::new().failing_fund();

    let err = DeploymentOrchestrator::new(&config, &chain, &chain)
        .run(&local_context(), RAFFLE)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DeployError::SubscriptionFunding {
            subscription_id: 1,
            ..
        }
    ));
    assert!(format!("{:#}", anyhow::Error::from(err)).contains("InvalidSubscription"));
    assert_eq!(chain.deploy_count(RAFFLE), 0);
}

#[tokio::test]
async fn test_target_deploy_failure_is_wrapped() {
    let config = DeployConfig::default();
    let chain = FakeChain::new().fail_deploy_of(RAFFLE);

    let err = DeploymentOrchestrator::new(&config, &chain, &chain)
        .run(&local_context(), RAFFLE)
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::DeploymentFailed { .. }));
    // mock and subscription are not rolled back
    assert_eq!(chain.funded(Address::repeat_byte(1), 1), Some(parse_ether("7").unwrap()));
}

#[tokio::test]
async fn test_mismatched_constructor_declaration_is_rejected() {
    let mut config = DeployConfig::default();
    config.target.constructor =
        "constructor(address vrfCoordinatorV2, uint256 entranceFee, bytes32 gasLane, uint64 subscriptionId, uint32 callbackGasLimit, uint256 interval)"
            .to_string();
    let chain = FakeChain::new();

    let err = DeploymentOrchestrator::new(&config, &chain, &chain)
        .run(&sepolia_context(), RAFFLE)
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::ConstructorMismatch { .. }));
    assert!(err.to_string().contains("argument 0"));
    assert!(err.to_string().contains("on sepolia"));
    assert!(chain.calls().is_empty());
}

#[tokio::test]
async fn test_concurrent_local_runs_get_distinct_mocks() -> Result<()> {
    let config = DeployConfig::default();
    let first = FakeChain::new();
    let second = FakeChain::new();

    let first_run = DeploymentOrchestrator::new(&config, &first, &first);
    let second_run = DeploymentOrchestrator::new(&config, &second, &second);
    let (first_ctx, second_ctx) = (local_context(), local_context());

    let (a, b) = futures::join!(
        first_run.run(&first_ctx, RAFFLE),
        second_run.run(&second_ctx, RAFFLE),
    );
    let (a, b) = (a?, b?);

    // each chain numbers its own subscriptions
    assert_eq!(a.subscription_id(), Some(1));
    assert_eq!(b.subscription_id(), Some(1));
    assert_eq!(first.deploy_count(MOCK), 1);
    assert_eq!(second.deploy_count(MOCK), 1);

    Ok(())
}

#[tokio::test]
async fn test_repeated_runs_on_one_chain_create_new_subscriptions() -> Result<()> {
    let config = DeployConfig::default();
    let chain = FakeChain::new();
    let orchestrator = DeploymentOrchestrator::new(&config, &chain, &chain);

    let first = orchestrator.run(&local_context(), RAFFLE).await?;
    let second = orchestrator.run(&local_context(), RAFFLE).await?;

    assert_ne!(first.oracle_address(), second.oracle_address());
    assert_eq!(chain.deploy_count(MOCK), 2);
    assert_eq!(first.subscription_id(), Some(1));
    assert_eq!(second.subscription_id(), Some(1));
    assert_eq!(
        chain.get(RAFFLE).await?.map(|c| c.address),
        Some(second.address)
    );

    Ok(())
}
