pub mod config;
pub mod crypto;
pub mod quantity;
pub mod rpc;
pub mod time;
pub mod units;

pub use primitive_types::{H160, H256, U256};
pub use quantity::{InputError, TimeValue};

/// Account address on the simulated chain
pub type Address = H160;
