// File: testing-framework/src/integration/mod.rs
//
// Helpers for contract test suites: assertions with readable failure
// messages and waiters that poll the node instead of sleeping blindly.

pub mod rpc_helpers;
/// Waiter primitives for waiting on chain state changes
pub mod waiters;

pub use rpc_helpers::*;
pub use waiters::{wait_for_block_height, wait_for_timestamp};
