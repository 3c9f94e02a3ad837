use super::Checkpoint;
use evmctl_common::{rpc::RpcError, InputError};
use thiserror::Error;

/// Errors returned by [`ChainTimeController`](super::ChainTimeController)
#[derive(Error, Debug)]
pub enum ChainControlError {
    /// Transport or node failure, passed through untouched
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The node no longer knows this snapshot (unknown or already restored)
    #[error("Unknown or already consumed checkpoint {0}")]
    UnknownSnapshot(Checkpoint),

    /// Requested a timestamp earlier than the latest block
    #[error("Cannot travel back in time: target {target} is before current block time {now}")]
    InvalidTimeTravel { target: u64, now: u64 },

    #[error(transparent)]
    InvalidInput(#[from] InputError),
}

pub type ControlResult<T> = Result<T, ChainControlError>;

impl ChainControlError {
    /// JSON RPC error code when the node rejected the request
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            Self::Rpc(err) => err.code(),
            _ => None,
        }
    }
}
