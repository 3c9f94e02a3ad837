// Snapshot pairing as used by contract suites: a checkpoint before each
// test, a restore after it, nested per describe block

use evmctl_testing_framework::prelude::*;

const START: u64 = 1_650_000_000;

fn setup() -> (Arc<SimulatedNode>, ChainTimeController) {
    init_test_logging();
    DeterministicTestEnv::with_seed_and_start(11, START).spawn()
}

#[tokio::test]
async fn test_restore_returns_within_one_block() {
    let (_node, controller) = setup();
    controller.mine_blocks(5, true).await.unwrap();
    let height = controller.current_block_height().await.unwrap();
    let time = controller.current_time().await.unwrap();

    let checkpoint = controller.checkpoint().await.unwrap();
    assert_eq!(controller.current_block_height().await.unwrap(), height + 1);

    controller.advance_time(30 * 86_400u64).await.unwrap();
    controller.mine_blocks(100, true).await.unwrap();

    controller.restore(checkpoint).await.unwrap();
    assert_eq!(controller.current_block_height().await.unwrap(), height + 1);
    let restored_time = controller.current_time().await.unwrap();
    assert!(restored_time > time && restored_time <= time + 1);
}

#[tokio::test]
async fn test_consumed_checkpoint_is_unknown() {
    let (_node, controller) = setup();

    let checkpoint = controller.checkpoint().await.unwrap();
    controller.restore(checkpoint.clone()).await.unwrap();

    match controller.restore(checkpoint.clone()).await.unwrap_err() {
        ChainControlError::UnknownSnapshot(unknown) => assert_eq!(unknown, checkpoint),
        other => panic!("unexpected error: {}", other),
    }

    let never_taken = Checkpoint::from_id("0x999");
    assert!(matches!(
        controller.restore(never_taken).await,
        Err(ChainControlError::UnknownSnapshot(_))
    ));
}

#[tokio::test]
async fn test_nested_checkpoints() {
    let (node, controller) = setup();
    let [alice, bob] = [node.accounts()[0], node.accounts()[1]];

    let outer = controller.checkpoint().await.unwrap();
    controller.send_value(alice, bob, to_unit(100)).await.unwrap();

    let inner = controller.checkpoint().await.unwrap();
    controller.send_value(alice, bob, to_unit(50)).await.unwrap();
    assert_balance(&controller, &bob, to_unit(10_150)).await.unwrap();

    // Inner restore keeps what happened before it
    controller.restore(inner).await.unwrap();
    assert_balance(&controller, &bob, to_unit(10_100)).await.unwrap();

    // A second inner scope gets a fresh id
    let second_inner = controller.checkpoint().await.unwrap();
    controller.send_value(bob, alice, to_unit(1)).await.unwrap();
    controller.restore(second_inner).await.unwrap();

    controller.restore(outer).await.unwrap();
    assert_balance(&controller, &alice, to_unit(10_000)).await.unwrap();
    assert_balance(&controller, &bob, to_unit(10_000)).await.unwrap();
}

#[tokio::test]
async fn test_outer_restore_invalidates_inner_checkpoints() {
    let (_node, controller) = setup();

    let outer = controller.checkpoint().await.unwrap();
    let inner = controller.checkpoint().await.unwrap();
    assert_ne!(outer, inner);

    controller.restore(outer).await.unwrap();
    assert!(matches!(
        controller.restore(inner).await,
        Err(ChainControlError::UnknownSnapshot(_))
    ));
}

#[tokio::test]
async fn test_repeated_restore_cycles_leave_balances_identical() {
    let (node, controller) = setup();
    let accounts = node.accounts().to_vec();

    let mut before = Vec::new();
    for account in &accounts {
        before.push(controller.read_balance(*account).await.unwrap());
    }

    for round in 0..2u64 {
        let checkpoint = controller.checkpoint().await.unwrap();
        controller
            .send_value(accounts[0], accounts[2], to_unit(round + 1))
            .await
            .unwrap();
        controller.restore(checkpoint).await.unwrap();
    }

    for (account, expected) in accounts.iter().zip(before) {
        assert_balance(&controller, account, expected).await.unwrap();
    }
}

// Vault-style flow: deposit, wait out a lock period, withdraw
#[tokio::test]
async fn test_time_locked_withdrawal_flow() {
    let env = DeterministicTestEnv::with_seed_and_start(21, START);
    let (node, controller) = env.spawn();
    let vault = node.accounts()[9];
    let depositor = fund_wallet(&controller, &env.rng, node.accounts()[0], to_unit(5))
        .await
        .unwrap();
    let unlock_at = controller.current_time().await.unwrap() + 7 * 86_400;

    controller
        .isolated(|| async {
            controller
                .send_value(node.accounts()[1], vault, to_unit(5))
                .await?;
            assert_time_at_least(&controller, unlock_at).await.unwrap_err();

            controller.advance_time_to(unlock_at).await?;
            assert_time_at_least(&controller, unlock_at).await.unwrap();

            controller
                .send_value(vault, node.accounts()[1], to_unit(5))
                .await?;
            Ok::<_, ChainControlError>(())
        })
        .await
        .unwrap();

    // Everything inside the scope is gone, the funding outside it stays
    assert_balance(&controller, &vault, to_unit(10_000)).await.unwrap();
    assert_balance(&controller, &depositor.address(), to_unit(5)).await.unwrap();
    assert!(controller.current_time().await.unwrap() < unlock_at);
}

#[tokio::test]
async fn test_isolated_restores_after_failure() {
    let (node, controller) = setup();
    let [alice, bob] = [node.accounts()[0], node.accounts()[1]];
    let height = controller.current_block_height().await.unwrap();

    let result: anyhow::Result<()> = controller
        .isolated(|| async {
            controller.send_value(alice, bob, to_unit(1)).await?;
            anyhow::bail!("contract assertion failed")
        })
        .await;
    assert_eq!(result.unwrap_err().to_string(), "contract assertion failed");

    assert_balance(&controller, &alice, to_unit(10_000)).await.unwrap();
    // Checkpoint block, then the restore block
    assert_block_height(&controller, height + 1).await.unwrap();
}
