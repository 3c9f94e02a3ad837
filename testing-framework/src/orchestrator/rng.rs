// File: testing-framework/src/orchestrator/rng.rs
//
// Seeded random number generation for reproducible test data.
//
// Every TestRng logs its seed; re-running with EVMCTL_TEST_SEED set to that
// value reproduces the same keys, amounts and delays.

use evmctl_common::{config::ENV_TEST_SEED, crypto::Wallet};
use log::info;
use parking_lot::Mutex;
use rand::{
    distributions::{uniform::SampleRange, uniform::SampleUniform, Distribution, Standard},
    rngs::{OsRng, StdRng},
    Rng, RngCore, SeedableRng,
};

/// Seeded RNG usable through a shared reference
pub struct TestRng {
    seed: u64,
    inner: Mutex<StdRng>,
}

impl TestRng {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            inner: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Use `EVMCTL_TEST_SEED` when set (decimal or `0x` hex), a random seed otherwise
    pub fn new_from_env_or_random() -> Self {
        let seed = std::env::var(ENV_TEST_SEED)
            .ok()
            .and_then(|value| parse_seed(&value))
            .unwrap_or_else(|| OsRng.next_u64());
        info!(
            "TestRng seed: 0x{:016x} (replay with {}=0x{:016x})",
            seed, ENV_TEST_SEED, seed
        );
        Self::with_seed(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn gen<T>(&self) -> T
    where
        Standard: Distribution<T>,
    {
        self.inner.lock().gen()
    }

    pub fn gen_range<T, R>(&self, range: R) -> T
    where
        T: SampleUniform,
        R: SampleRange<T>,
    {
        self.inner.lock().gen_range(range)
    }

    pub fn fill_bytes(&self, dest: &mut [u8]) {
        self.inner.lock().fill_bytes(dest)
    }

    /// Key pair derived from the seeded stream
    pub fn wallet(&self) -> Wallet {
        let mut rng = self.inner.lock();
        Wallet::random(&mut *rng)
    }
}

fn parse_seed(value: &str) -> Option<u64> {
    let value = value.trim();
    match value.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}
