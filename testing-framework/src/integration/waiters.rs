//! Waiters that poll the node until a condition holds
//!
//! Best-effort mining returns before the node has produced every block;
//! these are the way to wait for the requested state without sleeping for a
//! guessed duration.

use crate::controller::ChainTimeController;
use anyhow::{Context, Result};
use log::debug;
use tokio::time::{sleep, Duration, Instant};

// Delay between two polls
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Wait until the block height reaches at least `target_height`
///
/// Returns the height observed, or an error once `timeout` has elapsed.
///
/// # Example
///
/// ```rust,ignore
/// controller.mine_blocks(500, false).await?;
/// wait_for_block_height(&controller, 500, Duration::from_secs(5)).await?;
/// ```
pub async fn wait_for_block_height(
    controller: &ChainTimeController,
    target_height: u64,
    timeout: Duration,
) -> Result<u64> {
    let deadline = Instant::now() + timeout;
    loop {
        let height = controller
            .current_block_height()
            .await
            .context("Failed to get block height while waiting")?;
        if height >= target_height {
            debug!("Reached block height {} (target {})", height, target_height);
            return Ok(height);
        }
        if Instant::now() >= deadline {
            anyhow::bail!(
                "Timed out after {:?} waiting for block height {} (last seen {})",
                timeout,
                target_height,
                height
            );
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Wait until the latest block timestamp reaches at least `target_timestamp`
///
/// Nothing is mined here; something else must be producing blocks.
pub async fn wait_for_timestamp(
    controller: &ChainTimeController,
    target_timestamp: u64,
    timeout: Duration,
) -> Result<u64> {
    let deadline = Instant::now() + timeout;
    loop {
        let timestamp = controller
            .current_time()
            .await
            .context("Failed to get block time while waiting")?;
        if timestamp >= target_timestamp {
            return Ok(timestamp);
        }
        if Instant::now() >= deadline {
            anyhow::bail!(
                "Timed out after {:?} waiting for block time {} (last seen {})",
                timeout,
                target_timestamp,
                timestamp
            );
        }
        sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::ManualClock;
    use crate::simnode::SimulatedNodeBuilder;
    use std::sync::Arc;

    fn controller() -> ChainTimeController {
        let node = SimulatedNodeBuilder::new()
            .with_clock(Arc::new(ManualClock::new(1_000)))
            .build();
        ChainTimeController::new(Arc::new(node))
    }

    #[tokio::test]
    async fn test_returns_immediately_when_reached() {
        let controller = controller();
        let height = wait_for_block_height(&controller, 0, Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(height, 0);
    }

    #[tokio::test]
    async fn test_waits_for_background_mining() {
        let controller = controller();
        let miner = controller.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            miner.mine_blocks(3, true).await.unwrap();
        });

        let height = wait_for_block_height(&controller, 3, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(height, 3);
    }

    #[tokio::test]
    async fn test_timeout() {
        let controller = controller();
        let err = wait_for_block_height(&controller, 10, Duration::from_millis(30))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Timed out"));

        let err = wait_for_timestamp(&controller, 5_000, Duration::from_millis(30))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("block time 5000"));
    }

    #[tokio::test]
    async fn test_wait_for_timestamp() {
        let controller = controller();
        controller.advance_time(60u64).await.unwrap();
        let timestamp = wait_for_timestamp(&controller, 1_060, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(timestamp, 1_060);
    }
}
