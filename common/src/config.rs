// Default JSON-RPC endpoint of a local development node
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

// Default bind address used by the simulated node server
pub const DEFAULT_SIMNODE_BIND_ADDRESS: &str = "127.0.0.1:8545";

// Chain id reported by local development nodes
pub const DEFAULT_CHAIN_ID: u64 = 31337;

// Gas estimation
// Estimates are padded by 50% before being used as a gas limit
pub const GAS_MARGIN_PERCENT: u64 = 150;
// Returned instead of an estimate whenever estimation fails
pub const GAS_ESTIMATE_FALLBACK: &str = "5000000";

// Bulk mining helpers assume one block per second
pub const BLOCKS_PER_HOUR: u64 = 3600;

// Native currency has 18 decimals (wei)
pub const ETHER_DECIMALS: usize = 18;

// Balance given to each generated account of the simulated node, in ether
pub const DEFAULT_ACCOUNT_BALANCE_ETHER: u64 = 10_000;

// Number of accounts the simulated node funds when nothing is configured
pub const DEFAULT_ACCOUNT_COUNT: usize = 10;

// Intrinsic gas costs used by the simulated node estimator
pub const TX_BASE_GAS: u64 = 21_000;
pub const TX_DATA_ZERO_GAS: u64 = 4;
pub const TX_DATA_NON_ZERO_GAS: u64 = 16;

// Environment variables read by explicit `from_env` constructors
pub const ENV_RPC_URL: &str = "EVMCTL_RPC_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "EVMCTL_REQUEST_TIMEOUT_SECS";
pub const ENV_TEST_SEED: &str = "EVMCTL_TEST_SEED";
