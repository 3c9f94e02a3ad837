//! Everything a contract test usually needs, in one import

pub use crate::controller::{
    estimate_gas_with_margin, ChainControlError, ChainTimeController, Checkpoint, ControlResult,
    ControllerConfig,
};
pub use crate::integration::{
    assert_balance, assert_balance_gte, assert_balance_lte, assert_balance_within,
    assert_block_height, assert_time_at_least, wait_for_block_height, wait_for_timestamp,
};
pub use crate::orchestrator::{Clock, DeterministicTestEnv, ManualClock, SystemClock, TestRng};
pub use crate::simnode::{server::bind_server, SimulatedNode, SimulatedNodeBuilder};
pub use crate::utilities::{fund_wallet, init_test_logging, signed_message_fixture};

pub use evmctl_common::{
    crypto::{hash_message, keccak256, recover_signer, SignedMessage, Wallet},
    rpc::{ControlChannel, TransactionRequest},
    units::{from_unit, parse_units, to_unit, ADDRESS_ZERO, MAX_UINT},
    Address, TimeValue, H256, U256,
};

pub use std::sync::Arc;
pub use tokio::time::Duration;

/// Framework version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
