use evmctl_common::config::{GAS_ESTIMATE_FALLBACK, GAS_MARGIN_PERCENT};
use log::{debug, warn};
use primitive_types::{U256, U512};
use std::{fmt::Display, future::Future};

/// `ceil(estimate * percent / 100)`, saturating at `U256::MAX`
pub fn apply_margin(estimate: U256, percent: u64) -> U256 {
    let scaled = estimate.full_mul(U256::from(percent)) + U512::from(99u64);
    U256::try_from(scaled / U512::from(100u64)).unwrap_or(U256::MAX)
}

/// Await `pending` and pad it with the default 50% margin
///
/// Never fails: any error from the estimate yields `"5000000"`.
pub async fn estimate_gas_with_margin<F, T, E>(pending: F) -> String
where
    F: Future<Output = Result<T, E>>,
    T: Into<U256>,
    E: Display,
{
    with_margin(pending, GAS_MARGIN_PERCENT, GAS_ESTIMATE_FALLBACK).await
}

pub(crate) async fn with_margin<F, T, E>(pending: F, percent: u64, fallback: &str) -> String
where
    F: Future<Output = Result<T, E>>,
    T: Into<U256>,
    E: Display,
{
    match pending.await {
        Ok(estimate) => {
            let estimate = estimate.into();
            let padded = apply_margin(estimate, percent);
            debug!("Gas estimate {} padded to {}", estimate, padded);
            padded.to_string()
        }
        Err(e) => {
            warn!("Gas estimation failed, using fallback {}: {}", fallback, e);
            fallback.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_apply_margin_rounds_up() {
        assert_eq!(apply_margin(U256::from(1_000_000u64), 150), U256::from(1_500_000u64));
        assert_eq!(apply_margin(U256::from(21_001u64), 150), U256::from(31_502u64));
        assert_eq!(apply_margin(U256::from(1u64), 150), U256::from(2u64));
        assert_eq!(apply_margin(U256::zero(), 150), U256::zero());
    }

    #[test]
    fn test_apply_margin_saturates() {
        assert_eq!(apply_margin(U256::MAX, 150), U256::MAX);
    }

    #[tokio::test]
    async fn test_success_is_padded() {
        let padded = estimate_gas_with_margin(async { Ok::<_, String>(1_000_000u64) }).await;
        assert_eq!(padded, "1500000");
    }

    #[tokio::test]
    async fn test_failure_yields_fallback() {
        let padded =
            estimate_gas_with_margin(async { Err::<U256, _>("execution reverted") }).await;
        assert_eq!(padded, "5000000");
    }

    #[tokio::test]
    async fn test_custom_margin_and_fallback() {
        assert_eq!(with_margin(async { Ok::<_, String>(100u64) }, 120, "1").await, "120");
        assert_eq!(with_margin(async { Err::<u64, _>("nope") }, 120, "42").await, "42");
    }

    proptest! {
        #[test]
        fn margin_is_ceiling_of_one_and_a_half(estimate in 0u64..u64::MAX / 2) {
            let padded = apply_margin(U256::from(estimate), 150);
            let exact = estimate as u128 * 3;
            let expected = (exact + 1) / 2;
            prop_assert_eq!(padded, U256::from(expected));
        }
    }
}
