//! Chain state of the simulated node
//!
//! Only what block and time control can observe is modelled: the head block,
//! the clock offset, native balances and nonces. No bytecode is executed.

use evmctl_common::{
    config::{TX_BASE_GAS, TX_DATA_NON_ZERO_GAS, TX_DATA_ZERO_GAS},
    crypto::keccak256,
    rpc::{BlockRecord, RpcError, TransactionRequest, SERVER_ERROR},
    time::TimestampSeconds,
    Address, H256, U256,
};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub number: u64,
    pub hash: H256,
    pub parent_hash: H256,
    pub timestamp: TimestampSeconds,
}

impl BlockHeader {
    pub fn genesis(timestamp: TimestampSeconds) -> Self {
        Self::sealed(0, H256::zero(), timestamp)
    }

    fn sealed(number: u64, parent_hash: H256, timestamp: TimestampSeconds) -> Self {
        let mut preimage = Vec::with_capacity(48);
        preimage.extend_from_slice(parent_hash.as_bytes());
        preimage.extend_from_slice(&number.to_be_bytes());
        preimage.extend_from_slice(&timestamp.to_be_bytes());
        Self {
            number,
            hash: keccak256(&preimage),
            parent_hash,
            timestamp,
        }
    }

    pub fn to_record(&self) -> BlockRecord {
        BlockRecord {
            number: self.number,
            hash: self.hash,
            parent_hash: self.parent_hash,
            timestamp: self.timestamp,
        }
    }
}

/// Everything a snapshot captures
#[derive(Debug, Clone)]
pub struct ChainState {
    genesis: BlockHeader,
    head: BlockHeader,
    // Seconds added to the wall clock when stamping the next block
    time_offset: i128,
    pending_timestamp: Option<TimestampSeconds>,
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
}

impl ChainState {
    pub fn new(
        genesis_timestamp: TimestampSeconds,
        clock_now: TimestampSeconds,
        balances: HashMap<Address, U256>,
    ) -> Self {
        let genesis = BlockHeader::genesis(genesis_timestamp);
        Self {
            head: genesis.clone(),
            genesis,
            time_offset: genesis_timestamp as i128 - clock_now as i128,
            pending_timestamp: None,
            balances,
            nonces: HashMap::new(),
        }
    }

    pub fn head(&self) -> &BlockHeader {
        &self.head
    }

    pub fn genesis(&self) -> &BlockHeader {
        &self.genesis
    }

    pub fn time_offset(&self) -> i128 {
        self.time_offset
    }

    pub fn balance(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Timestamp the next block would get at `clock_now`
    ///
    /// Timestamps strictly increase: when the clock would not move past the
    /// head, the block gets `head + 1`. Fails once that no longer fits in
    /// 64 bits.
    pub fn next_timestamp(
        &self,
        clock_now: TimestampSeconds,
    ) -> Result<TimestampSeconds, RpcError> {
        let candidate = match self.pending_timestamp {
            Some(timestamp) => timestamp as i128,
            None => clock_now as i128 + self.time_offset,
        };
        let floor = self.head.timestamp as i128 + 1;
        let timestamp = candidate.max(floor);
        u64::try_from(timestamp).map_err(|_| {
            RpcError::server(
                SERVER_ERROR,
                format!("Block timestamp {} exceeds the maximum timestamp", timestamp),
            )
        })
    }

    /// Seal the next block
    ///
    /// The offset is re-based on the sealed timestamp so later blocks
    /// continue from it. State is untouched when the block cannot be sealed.
    pub fn mine(&mut self, clock_now: TimestampSeconds) -> Result<&BlockHeader, RpcError> {
        let timestamp = self.next_timestamp(clock_now)?;
        self.pending_timestamp = None;
        self.time_offset = timestamp as i128 - clock_now as i128;
        self.head = BlockHeader::sealed(self.head.number + 1, self.head.hash, timestamp);
        Ok(&self.head)
    }

    /// Returns the accumulated offset
    ///
    /// Rejected when the clock shifted by the new offset would pass the
    /// largest representable timestamp.
    pub fn increase_time(
        &mut self,
        seconds: u64,
        clock_now: TimestampSeconds,
    ) -> Result<i128, RpcError> {
        let offset = self.time_offset + seconds as i128;
        if clock_now as i128 + offset > u64::MAX as i128 {
            return Err(RpcError::server(
                SERVER_ERROR,
                format!(
                    "Increasing time by {} seconds exceeds the maximum timestamp",
                    seconds
                ),
            ));
        }
        self.time_offset = offset;
        Ok(offset)
    }

    pub fn set_next_timestamp(&mut self, timestamp: TimestampSeconds) -> Result<(), RpcError> {
        if timestamp <= self.head.timestamp {
            return Err(RpcError::server(
                SERVER_ERROR,
                format!(
                    "Timestamp {} is lower than or equal to previous block's timestamp {}",
                    timestamp, self.head.timestamp
                ),
            ));
        }
        self.pending_timestamp = Some(timestamp);
        Ok(())
    }

    fn ensure_funds(&self, from: &Address, value: U256) -> Result<(), RpcError> {
        let balance = self.balance(from);
        if balance < value {
            return Err(RpcError::server(
                SERVER_ERROR,
                format!(
                    "Insufficient funds for transfer: balance {} of {:?} is lower than {}",
                    balance, from, value
                ),
            ));
        }
        Ok(())
    }

    /// Intrinsic gas of `tx`; fails when `from` cannot cover the value
    pub fn estimate_gas(&self, tx: &TransactionRequest) -> Result<U256, RpcError> {
        let data = tx
            .data_bytes()
            .map_err(|e| RpcError::invalid_params(format!("Invalid calldata: {}", e)))?;
        self.ensure_funds(&tx.from, tx.value.unwrap_or_default())?;

        let data_gas: u64 = data
            .iter()
            .map(|byte| {
                if *byte == 0 {
                    TX_DATA_ZERO_GAS
                } else {
                    TX_DATA_NON_ZERO_GAS
                }
            })
            .sum();
        Ok(U256::from(TX_BASE_GAS + data_gas))
    }

    /// Move `value` between accounts and return the transaction hash
    ///
    /// Gas is free, so only the value is debited. The caller seals a block.
    pub fn transfer(&mut self, tx: &TransactionRequest) -> Result<H256, RpcError> {
        let value = tx.value.unwrap_or_default();
        self.ensure_funds(&tx.from, value)?;

        let nonce = self.nonces.entry(tx.from).or_default();
        let mut preimage = Vec::with_capacity(80);
        preimage.extend_from_slice(tx.from.as_bytes());
        preimage.extend_from_slice(tx.to.unwrap_or_default().as_bytes());
        for word in value.0.iter().rev() {
            preimage.extend_from_slice(&word.to_be_bytes());
        }
        preimage.extend_from_slice(&nonce.to_be_bytes());
        *nonce += 1;

        if let Some(to) = tx.to {
            if to != tx.from {
                let from_balance = self.balance(&tx.from);
                self.balances.insert(tx.from, from_balance - value);
                let to_balance = self.balance(&to);
                self.balances.insert(to, to_balance.saturating_add(value));
            }
        }
        Ok(keccak256(&preimage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Address {
        Address::from_low_u64_be(1)
    }

    fn bob() -> Address {
        Address::from_low_u64_be(2)
    }

    fn state_at(clock: u64) -> ChainState {
        let mut balances = HashMap::new();
        balances.insert(alice(), U256::from(1_000u64));
        ChainState::new(clock, clock, balances)
    }

    #[test]
    fn test_blocks_follow_the_clock() {
        let mut state = state_at(1_000);
        assert_eq!(state.mine(1_010).unwrap().timestamp, 1_010);
        assert_eq!(state.head().number, 1);
        assert_eq!(state.head().parent_hash, state.genesis().hash);
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        let mut state = state_at(1_000);
        assert_eq!(state.mine(1_000).unwrap().timestamp, 1_001);
        assert_eq!(state.mine(1_000).unwrap().timestamp, 1_002);
        // The bumped offset carries over
        assert_eq!(state.mine(1_005).unwrap().timestamp, 1_007);
    }

    #[test]
    fn test_increase_time_shifts_next_block() {
        let mut state = state_at(1_000);
        assert_eq!(state.increase_time(3_600, 1_000).unwrap(), 3_600);
        assert_eq!(state.mine(1_000).unwrap().timestamp, 4_600);
        // The offset persists
        assert_eq!(state.mine(1_010).unwrap().timestamp, 4_610);
    }

    #[test]
    fn test_pending_timestamp_is_used_once() {
        let mut state = state_at(1_000);
        state.set_next_timestamp(50_000).unwrap();
        assert_eq!(state.mine(1_000).unwrap().timestamp, 50_000);
        assert_eq!(state.mine(1_001).unwrap().timestamp, 50_001);
    }

    #[test]
    fn test_pending_timestamp_must_move_forward() {
        let mut state = state_at(1_000);
        let err = state.set_next_timestamp(1_000).unwrap_err();
        assert_eq!(err.code(), Some(SERVER_ERROR));
    }

    #[test]
    fn test_genesis_in_the_future() {
        let state = ChainState::new(5_000, 1_000, HashMap::new());
        assert_eq!(state.time_offset(), 4_000);
        let mut state = state;
        assert_eq!(state.mine(1_000).unwrap().timestamp, 5_001);
    }

    #[test]
    fn test_transfer_moves_value() {
        let mut state = state_at(1_000);
        let tx = TransactionRequest::new(alice())
            .to(bob())
            .value(U256::from(400u64));
        let first = state.transfer(&tx).unwrap();
        let second = state.transfer(&tx).unwrap();
        assert_ne!(first, second);
        assert_eq!(state.balance(&alice()), U256::from(200u64));
        assert_eq!(state.balance(&bob()), U256::from(800u64));

        let err = state.transfer(&tx).unwrap_err();
        assert_eq!(err.code(), Some(SERVER_ERROR));
        assert_eq!(state.balance(&alice()), U256::from(200u64));
    }

    #[test]
    fn test_gas_estimate_counts_calldata() {
        let state = state_at(1_000);
        let plain = TransactionRequest::new(alice()).to(bob());
        assert_eq!(state.estimate_gas(&plain).unwrap(), U256::from(21_000u64));

        let with_data = plain.clone().data(&[0, 0, 1]);
        assert_eq!(
            state.estimate_gas(&with_data).unwrap(),
            U256::from(21_000u64 + 4 + 4 + 16)
        );

        let too_much = plain.value(U256::from(1_001u64));
        assert!(state.estimate_gas(&too_much).is_err());
    }

    #[test]
    fn test_timestamp_ceiling_is_an_error() {
        let mut state = state_at(1_000);
        let err = state.increase_time(u64::MAX, 1_000).unwrap_err();
        assert_eq!(err.code(), Some(SERVER_ERROR));
        assert_eq!(state.time_offset(), 0);

        // Up to the ceiling is still fine
        state.increase_time(u64::MAX - 1_000, 1_000).unwrap();
        let last = state.mine(1_000).unwrap().clone();
        assert_eq!(last.timestamp, u64::MAX);

        // No room for a strictly later block
        let err = state.mine(1_000).unwrap_err();
        assert_eq!(err.code(), Some(SERVER_ERROR));
        assert_eq!(state.head(), &last);
    }

    #[test]
    fn test_no_block_after_the_last_timestamp() {
        let mut state = state_at(1_000);
        state.set_next_timestamp(u64::MAX).unwrap();
        assert_eq!(state.mine(1_000).unwrap().timestamp, u64::MAX);
        assert!(state.set_next_timestamp(u64::MAX).is_err());
        assert!(state.mine(0).is_err());
        assert_eq!(state.head().number, 1);
    }
}
