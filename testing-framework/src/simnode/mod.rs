//! In-process simulated development node
//!
//! [`SimulatedNode`] answers the same JSON RPC control methods a local
//! development node does, straight from memory. It implements
//! [`ControlChannel`], so a controller can drive it without any network, and
//! [`server::bind_server`] exposes it over HTTP for anything that needs a URL.

mod builder;
pub mod server;
mod state;

pub use builder::SimulatedNodeBuilder;
pub use state::{BlockHeader, ChainState};

use crate::orchestrator::Clock;
use async_trait::async_trait;
use evmctl_common::{
    rpc::{
        methods, quantity, BlockRecord, ControlChannel, RpcError, RpcErrorObject, RpcRequest,
        RpcResponse, TransactionRequest, INVALID_REQUEST, JSON_RPC_VERSION, METHOD_NOT_FOUND,
        SERVER_ERROR,
    },
    Address, H256, U256,
};
use log::{debug, trace};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

struct NodeInner {
    state: ChainState,
    // Ordered so that reverting to an id drops it and every later one
    snapshots: BTreeMap<u64, ChainState>,
    next_snapshot_id: u64,
    request_counts: HashMap<String, u64>,
}

/// Development node kept entirely in memory
///
/// All requests are serialized through one lock, so concurrent mining
/// requests each produce exactly one block.
pub struct SimulatedNode {
    clock: Arc<dyn Clock>,
    chain_id: u64,
    accounts: Vec<Address>,
    inner: Mutex<NodeInner>,
}

impl SimulatedNode {
    pub fn builder() -> SimulatedNodeBuilder {
        SimulatedNodeBuilder::new()
    }

    pub(crate) fn new(
        clock: Arc<dyn Clock>,
        chain_id: u64,
        accounts: Vec<Address>,
        state: ChainState,
    ) -> Self {
        Self {
            clock,
            chain_id,
            accounts,
            inner: Mutex::new(NodeInner {
                state,
                snapshots: BTreeMap::new(),
                next_snapshot_id: 1,
                request_counts: HashMap::new(),
            }),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Unlocked accounts, in funding order
    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    pub fn latest_block(&self) -> BlockRecord {
        self.inner.lock().state.head().to_record()
    }

    pub fn block_number(&self) -> u64 {
        self.inner.lock().state.head().number
    }

    pub fn balance(&self, account: &Address) -> U256 {
        self.inner.lock().state.balance(account)
    }

    /// Seal one block and return its header
    pub fn mine(&self) -> Result<BlockRecord, RpcError> {
        let now = self.clock.unix_time();
        let mut inner = self.inner.lock();
        let header = inner.state.mine(now)?.to_record();
        debug!("Mined block {} at {}", header.number, header.timestamp);
        Ok(header)
    }

    /// Returns the accumulated clock offset
    pub fn increase_time(&self, seconds: u64) -> Result<i128, RpcError> {
        let now = self.clock.unix_time();
        self.inner.lock().state.increase_time(seconds, now)
    }

    pub fn set_next_block_timestamp(&self, timestamp: u64) -> Result<(), RpcError> {
        self.inner.lock().state.set_next_timestamp(timestamp)
    }

    pub fn snapshot(&self) -> u64 {
        let mut inner = self.inner.lock();
        let id = inner.next_snapshot_id;
        inner.next_snapshot_id += 1;
        let state = inner.state.clone();
        inner.snapshots.insert(id, state);
        debug!("Snapshot {} taken at block {}", id, inner.state.head().number);
        id
    }

    /// Restore snapshot `id`, dropping it and every snapshot taken after it
    ///
    /// Returns `false` when the id is unknown or was already consumed.
    pub fn revert(&self, id: u64) -> bool {
        let mut inner = self.inner.lock();
        let mut dropped = inner.snapshots.split_off(&id);
        match dropped.remove(&id) {
            Some(state) => {
                inner.state = state;
                debug!(
                    "Reverted to snapshot {} (block {})",
                    id,
                    inner.state.head().number
                );
                true
            }
            None => false,
        }
    }

    /// Transfer value and mine the block that includes it
    pub fn send_transaction(&self, tx: &TransactionRequest) -> Result<H256, RpcError> {
        if !self.accounts.contains(&tx.from) {
            return Err(RpcError::server(
                SERVER_ERROR,
                format!("Unknown account {:?}", tx.from),
            ));
        }
        let now = self.clock.unix_time();
        let mut inner = self.inner.lock();
        // Refuse before moving value when no block could include it
        inner.state.next_timestamp(now)?;
        let hash = inner.state.transfer(tx)?;
        inner.state.mine(now)?;
        Ok(hash)
    }

    pub fn estimate_gas(&self, tx: &TransactionRequest) -> Result<U256, RpcError> {
        self.inner.lock().state.estimate_gas(tx)
    }

    /// Number of requests received for `method`, failed ones included
    pub fn request_count(&self, method: &str) -> u64 {
        self.inner
            .lock()
            .request_counts
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    /// Execute one JSON RPC method
    pub fn handle(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        trace!("simnode <- {} {}", method, params);
        *self
            .inner
            .lock()
            .request_counts
            .entry(method.to_string())
            .or_default() += 1;

        let params = match params {
            Value::Array(values) => values,
            Value::Null => Vec::new(),
            other => {
                return Err(RpcError::invalid_params(format!(
                    "Expected an array of parameters, got {}",
                    other
                )))
            }
        };

        match method {
            methods::MINE => {
                self.mine()?;
                Ok(json!("0x0"))
            }
            methods::INCREASE_TIME => {
                let seconds = quantity_param(&params, 0, method)?;
                Ok(Value::String(self.increase_time(seconds)?.to_string()))
            }
            methods::SET_NEXT_BLOCK_TIMESTAMP => {
                let timestamp = quantity_param(&params, 0, method)?;
                self.set_next_block_timestamp(timestamp)?;
                Ok(Value::Null)
            }
            methods::SNAPSHOT => Ok(Value::String(quantity::encode(self.snapshot()))),
            methods::REVERT => {
                let id = quantity_param(&params, 0, method)?;
                Ok(Value::Bool(self.revert(id)))
            }
            methods::GET_BLOCK_BY_NUMBER => {
                let tag: String = param(&params, 0, method)?;
                let inner = self.inner.lock();
                let header = match tag.as_str() {
                    "latest" | "pending" | "safe" | "finalized" => Some(inner.state.head()),
                    "earliest" => Some(inner.state.genesis()),
                    number => match quantity::decode(number) {
                        Some(0) => Some(inner.state.genesis()),
                        Some(n) if n == inner.state.head().number => Some(inner.state.head()),
                        Some(_) => None,
                        None => {
                            return Err(RpcError::invalid_params(format!(
                                "Invalid block tag '{}'",
                                number
                            )))
                        }
                    },
                };
                Ok(match header {
                    Some(header) => serde_json::to_value(header.to_record())?,
                    None => Value::Null,
                })
            }
            methods::BLOCK_NUMBER => Ok(json!(quantity::encode(self.block_number()))),
            methods::GET_BALANCE => {
                let account: Address = param(&params, 0, method)?;
                Ok(serde_json::to_value(self.balance(&account))?)
            }
            methods::SEND_TRANSACTION => {
                let tx: TransactionRequest = param(&params, 0, method)?;
                Ok(serde_json::to_value(self.send_transaction(&tx)?)?)
            }
            methods::ESTIMATE_GAS => {
                let tx: TransactionRequest = param(&params, 0, method)?;
                Ok(serde_json::to_value(self.estimate_gas(&tx)?)?)
            }
            methods::ACCOUNTS => Ok(serde_json::to_value(&self.accounts)?),
            methods::CHAIN_ID => Ok(json!(quantity::encode(self.chain_id))),
            _ => Err(RpcError::server(
                METHOD_NOT_FOUND,
                format!("Method '{}' not found", method),
            )),
        }
    }

    /// Answer a decoded JSON RPC envelope
    pub fn handle_request(&self, request: RpcRequest) -> RpcResponse {
        if request.jsonrpc != JSON_RPC_VERSION {
            let error = RpcErrorObject {
                code: INVALID_REQUEST,
                message: format!("Unsupported JSON RPC version '{}'", request.jsonrpc),
                data: None,
            };
            return RpcResponse::failure(request.id, error);
        }

        match self.handle(&request.method, request.params) {
            Ok(result) => RpcResponse::success(request.id, result),
            Err(e) => {
                debug!("simnode request '{}' failed: {}", request.method, e);
                RpcResponse::failure(request.id, RpcErrorObject::from(&e))
            }
        }
    }
}

#[async_trait]
impl ControlChannel for SimulatedNode {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.handle(method, params)
    }
}

fn param<T: DeserializeOwned>(params: &[Value], index: usize, method: &str) -> Result<T, RpcError> {
    let value = params.get(index).ok_or_else(|| {
        RpcError::invalid_params(format!("Missing parameter {} of '{}'", index, method))
    })?;
    serde_json::from_value(value.clone()).map_err(|e| {
        RpcError::invalid_params(format!("Invalid parameter {} of '{}': {}", index, method, e))
    })
}

// Accepts a non-negative JSON integer or a hex quantity string
fn quantity_param(params: &[Value], index: usize, method: &str) -> Result<u64, RpcError> {
    let value = params.get(index).ok_or_else(|| {
        RpcError::invalid_params(format!("Missing parameter {} of '{}'", index, method))
    })?;
    quantity::from_value(value).ok_or_else(|| {
        RpcError::invalid_params(format!(
            "Parameter {} of '{}' must be a non-negative integer, got {}",
            index, method, value
        ))
    })
}
