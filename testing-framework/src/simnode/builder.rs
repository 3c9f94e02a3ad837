//! SimulatedNodeBuilder - Fluent API for configuring SimulatedNode instances

use super::{ChainState, SimulatedNode};
use crate::orchestrator::{Clock, SystemClock};
use evmctl_common::{
    config::{DEFAULT_ACCOUNT_BALANCE_ETHER, DEFAULT_ACCOUNT_COUNT, DEFAULT_CHAIN_ID},
    time::TimestampSeconds,
    units::to_unit,
    Address, U256,
};
use log::debug;
use std::{collections::HashMap, sync::Arc};

/// Builder for SimulatedNode instances with fluent API
///
/// # Example
///
/// ```rust,ignore
/// use evmctl_testing_framework::simnode::SimulatedNodeBuilder;
///
/// let node = SimulatedNodeBuilder::new()
///     .with_clock(clock)
///     .with_default_balance(to_unit(100))
///     .with_funded_accounts(3)
///     .with_funded_account(depositor, to_unit(5))
///     .build();
/// ```
pub struct SimulatedNodeBuilder {
    /// Clock implementation for block timestamps
    clock: Option<Arc<dyn Clock>>,

    /// Explicitly funded accounts (address, balance in wei)
    funded_accounts: Vec<(Address, U256)>,

    /// Balance of the accounts created by count
    default_balance: U256,

    /// Number of sequential accounts to create
    funded_account_count: usize,

    chain_id: u64,

    genesis_timestamp: Option<TimestampSeconds>,
}

impl SimulatedNodeBuilder {
    /// Create new builder with defaults
    ///
    /// Default configuration:
    /// - SystemClock (real time)
    /// - 10 funded accounts with 10,000 ether each
    /// - chain id 31337
    /// - genesis stamped with the clock time
    pub fn new() -> Self {
        Self {
            clock: None,
            funded_accounts: Vec::new(),
            default_balance: to_unit(DEFAULT_ACCOUNT_BALANCE_ETHER),
            funded_account_count: DEFAULT_ACCOUNT_COUNT,
            chain_id: DEFAULT_CHAIN_ID,
            genesis_timestamp: None,
        }
    }

    /// Set clock implementation
    ///
    /// If not set, uses `SystemClock` by default.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Create N funded accounts with the default balance
    ///
    /// Accounts get sequential addresses `0x…01`, `0x…02`, and so on. This
    /// replaces the previous count but keeps accounts added with
    /// `with_funded_account()`.
    pub fn with_funded_accounts(mut self, count: usize) -> Self {
        self.funded_account_count = count;
        self
    }

    /// Add a specific funded account, unlocked like the generated ones
    pub fn with_funded_account(mut self, address: Address, balance: U256) -> Self {
        self.funded_accounts.push((address, balance));
        self
    }

    /// Set the balance (in wei) of funded accounts created by count
    pub fn with_default_balance(mut self, balance: U256) -> Self {
        self.default_balance = balance;
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Stamp block 0 with `timestamp` instead of the clock time
    ///
    /// Later blocks keep the resulting offset to the clock.
    pub fn with_genesis_timestamp(mut self, timestamp: TimestampSeconds) -> Self {
        self.genesis_timestamp = Some(timestamp);
        self
    }

    pub fn build(self) -> SimulatedNode {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let now = clock.unix_time();
        let genesis_timestamp = self.genesis_timestamp.unwrap_or(now);

        let mut accounts = Vec::with_capacity(self.funded_account_count + self.funded_accounts.len());
        let mut balances = HashMap::new();
        let generated = (1..=self.funded_account_count as u64)
            .map(|i| (Address::from_low_u64_be(i), self.default_balance));
        for (address, balance) in generated.chain(self.funded_accounts) {
            if !accounts.contains(&address) {
                accounts.push(address);
            }
            balances.insert(address, balance);
        }

        debug!(
            "Simulated node: chain id {}, {} funded accounts, genesis at {}",
            self.chain_id,
            accounts.len(),
            genesis_timestamp
        );
        let state = ChainState::new(genesis_timestamp, now, balances);
        SimulatedNode::new(clock, self.chain_id, accounts, state)
    }
}

impl Default for SimulatedNodeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::ManualClock;

    #[test]
    fn test_builder_default() {
        let node = SimulatedNodeBuilder::new().build();

        assert_eq!(node.block_number(), 0);
        assert_eq!(node.chain_id(), 31337);
        assert_eq!(node.accounts().len(), 10);
        for account in node.accounts() {
            assert_eq!(node.balance(account), to_unit(10_000));
        }
    }

    #[test]
    fn test_builder_with_funded_accounts() {
        let alice = Address::repeat_byte(0xa1);
        let node = SimulatedNodeBuilder::new()
            .with_default_balance(U256::from(5u64))
            .with_funded_accounts(3)
            .with_funded_account(alice, U256::from(7u64))
            .build();

        assert_eq!(node.accounts().len(), 4);
        assert_eq!(node.accounts()[0], Address::from_low_u64_be(1));
        assert_eq!(node.accounts()[3], alice);
        assert_eq!(node.balance(&Address::from_low_u64_be(2)), U256::from(5u64));
        assert_eq!(node.balance(&alice), U256::from(7u64));
    }

    #[test]
    fn test_explicit_account_overrides_generated_balance() {
        let node = SimulatedNodeBuilder::new()
            .with_funded_accounts(1)
            .with_funded_account(Address::from_low_u64_be(1), U256::one())
            .build();

        assert_eq!(node.accounts().len(), 1);
        assert_eq!(node.balance(&Address::from_low_u64_be(1)), U256::one());
    }

    #[test]
    fn test_builder_with_clock_and_genesis() {
        let clock = Arc::new(ManualClock::new(1_000));
        let node = SimulatedNodeBuilder::new()
            .with_clock(clock.clone())
            .with_chain_id(1337)
            .with_genesis_timestamp(2_000)
            .build();

        assert_eq!(node.chain_id(), 1337);
        assert_eq!(node.latest_block().timestamp, 2_000);

        clock.advance(10);
        assert_eq!(node.mine().unwrap().timestamp, 2_010);
    }
}
