//! RPC assertion helpers for contract tests
//!
//! Each helper reads state through a [`ChainTimeController`] and fails with
//! a message naming the expected and actual values.

use crate::controller::ChainTimeController;
use anyhow::{Context, Result};
use evmctl_common::{units::from_unit, Address, U256};

/// Assert that the latest block is at `expected_height`
///
/// # Example
///
/// ```rust,ignore
/// controller.advance_to_block(100, true).await?;
/// assert_block_height(&controller, 100).await?;
/// ```
pub async fn assert_block_height(controller: &ChainTimeController, expected_height: u64) -> Result<()> {
    let actual = controller
        .current_block_height()
        .await
        .context("Failed to get block height")?;

    if actual != expected_height {
        anyhow::bail!(
            "Block height mismatch: expected {}, got {}",
            expected_height,
            actual
        );
    }

    Ok(())
}

/// Assert that the latest block timestamp is at least `min_timestamp`
pub async fn assert_time_at_least(controller: &ChainTimeController, min_timestamp: u64) -> Result<()> {
    let actual = controller
        .current_time()
        .await
        .context("Failed to get latest block time")?;

    if actual < min_timestamp {
        anyhow::bail!(
            "Block time too early: expected >={}, got {} ({}s short)",
            min_timestamp,
            actual,
            min_timestamp - actual
        );
    }

    Ok(())
}

async fn balance_of(controller: &ChainTimeController, address: &Address) -> Result<U256> {
    controller
        .read_balance(*address)
        .await
        .with_context(|| format!("Failed to get balance for address {:?}", address))
}

/// Assert that account has exactly `expected_balance` wei
///
/// # Errors
///
/// Returns an error if:
/// - RPC call fails
/// - Actual balance doesn't match expected
pub async fn assert_balance(
    controller: &ChainTimeController,
    address: &Address,
    expected_balance: U256,
) -> Result<()> {
    let actual = balance_of(controller, address).await?;

    if actual != expected_balance {
        anyhow::bail!(
            "Balance mismatch for address {:?}: expected {} ({} ether), got {} ({} ether)",
            address,
            expected_balance,
            from_unit(expected_balance),
            actual,
            from_unit(actual)
        );
    }

    Ok(())
}

/// Assert that account balance is within `tolerance` wei of `expected_balance`
///
/// Useful when interest or rewards accrue per second and the exact block
/// timestamp is not pinned.
///
/// # Example
///
/// ```rust,ignore
/// // Allow one gwei of rounding
/// assert_balance_within(&controller, &alice, to_unit(1_000), U256::exp10(9)).await?;
/// ```
pub async fn assert_balance_within(
    controller: &ChainTimeController,
    address: &Address,
    expected_balance: U256,
    tolerance: U256,
) -> Result<()> {
    let actual = balance_of(controller, address).await?;

    let min = expected_balance.saturating_sub(tolerance);
    let max = expected_balance.saturating_add(tolerance);

    if actual < min || actual > max {
        anyhow::bail!(
            "Balance for address {:?} outside tolerance: expected {} ± {}, got {} (range: {}-{})",
            address,
            expected_balance,
            tolerance,
            actual,
            min,
            max
        );
    }

    Ok(())
}

/// Assert that account balance is greater than or equal to `min_balance`
pub async fn assert_balance_gte(
    controller: &ChainTimeController,
    address: &Address,
    min_balance: U256,
) -> Result<()> {
    let actual = balance_of(controller, address).await?;

    if actual < min_balance {
        anyhow::bail!(
            "Balance for address {:?} too low: expected >={}, got {}",
            address,
            min_balance,
            actual
        );
    }

    Ok(())
}

/// Assert that account balance is less than or equal to `max_balance`
pub async fn assert_balance_lte(
    controller: &ChainTimeController,
    address: &Address,
    max_balance: U256,
) -> Result<()> {
    let actual = balance_of(controller, address).await?;

    if actual > max_balance {
        anyhow::bail!(
            "Balance for address {:?} too high: expected <={}, got {}",
            address,
            max_balance,
            actual
        );
    }

    Ok(())
}
