//! # evmctl Testing Framework
//!
//! Deterministic block, time and snapshot control for contract test suites
//! running against a simulated EVM development node.
//!
//! ## Architecture Overview
//!
//! - **controller**: [`ChainTimeController`], time travel, mining, checkpoints,
//!   balances and gas estimation over any [`ControlChannel`]
//! - **simnode**: in-process simulated node, also served over HTTP
//! - **orchestrator**: manual clock + seeded RNG for reproducible runs
//! - **integration**: assertion helpers and waiters
//! - **utilities**: test logging and fixtures
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use evmctl_testing_framework::prelude::*;
//!
//! #[tokio::test]
//! async fn test_withdraw_after_lock() {
//!     let env = DeterministicTestEnv::new();
//!     let (_node, controller) = env.spawn();
//!
//!     controller
//!         .isolated(|| async {
//!             controller.advance_time(7 * 24 * 3600u64).await?;
//!             // interact with the contract under test...
//!             Ok::<_, ChainControlError>(())
//!         })
//!         .await
//!         .unwrap();
//! }
//! ```
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Clock abstraction + seeded RNG
//! 2. **Injected**: every controller is built on an explicit channel
//! 3. **Transparent**: node and transport errors are passed through untouched

#![warn(clippy::all)]

/// Block and time control
pub mod controller;

/// Assertion helpers and waiters for contract tests
pub mod integration;

/// Core orchestration - provides Clock, RNG, deterministic environment
pub mod orchestrator;

/// In-process simulated node and its HTTP server
pub mod simnode;

/// Shared utilities
pub mod utilities;

// Convenient re-exports for common usage
pub mod prelude;

// Re-export commonly used types at crate root
pub use controller::{ChainControlError, ChainTimeController, Checkpoint, ControlResult, ControllerConfig};
pub use evmctl_common::rpc::ControlChannel;
pub use orchestrator::{Clock, DeterministicTestEnv, ManualClock, SystemClock, TestRng};
pub use simnode::{SimulatedNode, SimulatedNodeBuilder};
