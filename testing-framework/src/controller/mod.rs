//! Block and time control over a development node
//!
//! [`ChainTimeController`] is a stateless facade: every value it returns is
//! read back from the node, and the only thing it owns is the channel used to
//! reach it. All failures are passed through as they happened, nothing is
//! retried. Gas estimation is the one exception and falls back to a fixed
//! limit instead of failing.

mod checkpoint;
mod config;
mod error;
mod gas;

pub use checkpoint::Checkpoint;
pub use config::ControllerConfig;
pub use error::{ChainControlError, ControlResult};
pub use gas::{apply_margin, estimate_gas_with_margin};

use evmctl_common::{
    rpc::{
        client::HttpControlChannel, methods, quantity, BlockRecord, ControlChannel, RpcError,
        TransactionRequest, LATEST_BLOCK,
    },
    Address, InputError, TimeValue, H256, U256,
};
use futures::future::try_join_all;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::{fmt::Display, future::Future, sync::Arc};

/// Time travel, block production and checkpoints for contract tests
///
/// # Example
///
/// ```rust,ignore
/// let controller = ChainTimeController::connect(ControllerConfig::from_env())?;
///
/// let checkpoint = controller.checkpoint().await?;
/// controller.advance_time(24 * 3600u64).await?;
/// // assert on contract state...
/// controller.restore(checkpoint).await?;
/// ```
#[derive(Clone)]
pub struct ChainTimeController {
    channel: Arc<dyn ControlChannel>,
    config: ControllerConfig,
}

impl ChainTimeController {
    pub fn new(channel: Arc<dyn ControlChannel>) -> Self {
        Self::with_config(channel, ControllerConfig::default())
    }

    pub fn with_config(channel: Arc<dyn ControlChannel>, config: ControllerConfig) -> Self {
        Self { channel, config }
    }

    /// Controller over HTTP to the node configured in `config.channel`
    pub fn connect(config: ControllerConfig) -> ControlResult<Self> {
        let channel = HttpControlChannel::with_config(config.channel.clone())?;
        info!("Controlling node at {}", channel.url());
        Ok(Self::with_config(Arc::new(channel), config))
    }

    pub fn channel(&self) -> &Arc<dyn ControlChannel> {
        &self.channel
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> ControlResult<T> {
        let value = self.channel.request(method, params).await?;
        parse_result(method, value)
    }

    /// Header of the latest block
    pub async fn latest_block(&self) -> ControlResult<BlockRecord> {
        let value = self
            .channel
            .request(methods::GET_BLOCK_BY_NUMBER, json!([LATEST_BLOCK, false]))
            .await?;
        if value.is_null() {
            return Err(RpcError::malformed(methods::GET_BLOCK_BY_NUMBER, "no latest block").into());
        }
        parse_result(methods::GET_BLOCK_BY_NUMBER, value)
    }

    /// Timestamp of the latest block
    pub async fn current_time(&self) -> ControlResult<u64> {
        Ok(self.latest_block().await?.timestamp)
    }

    pub async fn current_block_height(&self) -> ControlResult<u64> {
        let value = self.channel.request(methods::BLOCK_NUMBER, json!([])).await?;
        quantity::from_value(&value).ok_or_else(|| {
            RpcError::malformed(methods::BLOCK_NUMBER, format!("expected a quantity, got {}", value))
                .into()
        })
    }

    /// Mine one block and return the new height
    pub async fn mine_block(&self) -> ControlResult<u64> {
        self.channel.request(methods::MINE, json!([])).await?;
        self.current_block_height().await
    }

    /// Mine `count` blocks
    ///
    /// With `parallel` every request is sent concurrently and all of them must
    /// succeed; the first failure is returned.
    ///
    /// Without it the requests are spawned on the runtime and NOT awaited.
    /// Failures are only logged, and the returned height is read right after
    /// dispatch, so it may be lower than the final one. Use the parallel mode
    /// when the exact height matters.
    pub async fn mine_blocks(&self, count: u64, parallel: bool) -> ControlResult<u64> {
        debug!("Mining {} blocks (parallel: {})", count, parallel);
        if parallel {
            try_join_all((0..count).map(|_| self.channel.request(methods::MINE, json!([])))).await?;
        } else {
            for _ in 0..count {
                let channel = self.channel.clone();
                tokio::spawn(async move {
                    if let Err(e) = channel.request(methods::MINE, json!([])).await {
                        warn!("Background block production failed: {}", e);
                    }
                });
            }
        }
        self.current_block_height().await
    }

    /// Mine `hours * blocks_per_hour` blocks
    pub async fn mine_hours(&self, hours: u64, parallel: bool) -> ControlResult<u64> {
        let count = hours
            .checked_mul(self.config.blocks_per_hour)
            .ok_or_else(|| InputError::Overflow(format!("{} hours of blocks", hours)))?;
        self.mine_blocks(count, parallel).await
    }

    /// Shift the node clock forward by `seconds` and mine one block
    pub async fn advance_time(&self, seconds: impl Into<TimeValue>) -> ControlResult<u64> {
        let seconds = seconds.into().into_seconds()?;
        debug!("Advancing time by {}s", seconds);
        self.channel
            .request(methods::INCREASE_TIME, json!([seconds]))
            .await?;
        self.mine_block().await
    }

    /// Advance time so the next block lands at `target` or later
    ///
    /// Fails without touching the node clock when `target` is before the
    /// latest block.
    pub async fn advance_time_to(&self, target: impl Into<TimeValue>) -> ControlResult<u64> {
        let target = target.into().into_unix_timestamp()?;
        let now = self.current_time().await?;
        if target < now {
            return Err(ChainControlError::InvalidTimeTravel { target, now });
        }
        self.advance_time(target - now).await
    }

    /// Pin the timestamp of the next block and mine it
    pub async fn set_next_block_time(&self, timestamp: impl Into<TimeValue>) -> ControlResult<u64> {
        let timestamp = timestamp.into().into_unix_timestamp()?;
        debug!("Setting next block timestamp to {}", timestamp);
        self.channel
            .request(methods::SET_NEXT_BLOCK_TIMESTAMP, json!([timestamp]))
            .await?;
        self.mine_block().await
    }

    /// Mine until the height reaches `target`; does nothing if it already has
    pub async fn advance_to_block(&self, target: u64, parallel: bool) -> ControlResult<u64> {
        let height = self.current_block_height().await?;
        if height >= target {
            return Ok(height);
        }
        self.mine_blocks(target - height, parallel).await
    }

    /// Snapshot the chain state, then mine one block
    pub async fn checkpoint(&self) -> ControlResult<Checkpoint> {
        let value = self.channel.request(methods::SNAPSHOT, json!([])).await?;
        let id = match &value {
            Value::String(id) => Some(id.clone()),
            Value::Number(number) => number.as_u64().map(quantity::encode),
            _ => None,
        };
        let checkpoint = id.map(Checkpoint::from_id).ok_or_else(|| {
            RpcError::malformed(methods::SNAPSHOT, format!("invalid snapshot id {}", value))
        })?;
        self.mine_block().await?;
        info!("Checkpoint {} taken", checkpoint);
        Ok(checkpoint)
    }

    /// Roll the chain back to `checkpoint`, then mine one block
    ///
    /// The checkpoint is consumed: the node forgets it (and every later one)
    /// once reverted.
    pub async fn restore(&self, checkpoint: Checkpoint) -> ControlResult<()> {
        let reverted: bool = self
            .call(methods::REVERT, json!([checkpoint.id()]))
            .await?;
        if !reverted {
            return Err(ChainControlError::UnknownSnapshot(checkpoint));
        }
        self.mine_block().await?;
        info!("Restored checkpoint {}", checkpoint);
        Ok(())
    }

    /// Run `scope` between a checkpoint and its restore
    ///
    /// The restore happens whatever the scope returns. A scope error wins over
    /// a restore error, which is then only logged.
    pub async fn isolated<F, Fut, T, E>(&self, scope: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<ChainControlError> + Display,
    {
        let checkpoint = self.checkpoint().await?;
        let outcome = scope().await;
        match (outcome, self.restore(checkpoint).await) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(restore_err)) => {
                warn!("Restore after failed scope ({}) also failed: {}", e, restore_err);
                Err(e)
            }
        }
    }

    /// Native balance of `account` at the latest block, in wei
    pub async fn read_balance(&self, account: Address) -> ControlResult<U256> {
        self.call(methods::GET_BALANCE, json!([account, LATEST_BLOCK]))
            .await
    }

    /// Send `value` wei from an unlocked node account
    pub async fn send_value(&self, from: Address, to: Address, value: U256) -> ControlResult<H256> {
        self.send_transaction(TransactionRequest::new(from).to(to).value(value))
            .await
    }

    pub async fn send_transaction(&self, tx: TransactionRequest) -> ControlResult<H256> {
        self.call(methods::SEND_TRANSACTION, json!([tx])).await
    }

    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> ControlResult<U256> {
        self.call(methods::ESTIMATE_GAS, json!([tx])).await
    }

    /// Await `pending` and pad it with the configured margin
    ///
    /// Any failure of `pending` returns the configured fallback instead.
    pub async fn estimate_gas_with_margin<F, T, E>(&self, pending: F) -> String
    where
        F: Future<Output = Result<T, E>>,
        T: Into<U256>,
        E: Display,
    {
        gas::with_margin(pending, self.config.gas_margin_percent, &self.config.gas_fallback).await
    }

    /// Accounts the node signs for
    pub async fn accounts(&self) -> ControlResult<Vec<Address>> {
        self.call(methods::ACCOUNTS, json!([])).await
    }

    pub async fn chain_id(&self) -> ControlResult<u64> {
        let value = self.channel.request(methods::CHAIN_ID, json!([])).await?;
        quantity::from_value(&value).ok_or_else(|| {
            RpcError::malformed(methods::CHAIN_ID, format!("expected a quantity, got {}", value)).into()
        })
    }
}

fn parse_result<T: DeserializeOwned>(method: &str, value: Value) -> ControlResult<T> {
    serde_json::from_value(value).map_err(|e| RpcError::malformed(method, e.to_string()).into())
}
