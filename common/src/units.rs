//! Unit conversion helpers and well-known constants used by contract tests

use crate::{config::ETHER_DECIMALS, Address};
use primitive_types::{H160, U256};
use thiserror::Error;

// The zero address, used by contracts to designate the native currency
pub const ADDRESS_ZERO: Address = H160::zero();

// Maximum uint256, used for unlimited token approvals
pub const MAX_UINT: U256 = U256::MAX;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("Invalid decimal amount: {0}")]
    InvalidAmount(String),

    #[error("Amount {0} has more than {1} decimals")]
    TooManyDecimals(String, usize),

    #[error("Amount {0} overflows 256 bits")]
    Overflow(String),
}

/// Converts a whole number of ether into wei
pub fn to_unit(amount: u64) -> U256 {
    U256::from(amount) * U256::exp10(ETHER_DECIMALS)
}

/// Formats a wei amount as ether, e.g. `1000.0` or `0.5`
pub fn from_unit(amount: U256) -> String {
    format_units(amount, ETHER_DECIMALS)
}

/// Parses a decimal string such as `"1.25"` into its smallest unit
pub fn parse_units(amount: &str, decimals: usize) -> Result<U256, UnitError> {
    let trimmed = amount.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(UnitError::InvalidAmount(amount.to_string()));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals {
        return Err(UnitError::TooManyDecimals(amount.to_string(), decimals));
    }

    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(decimals - fraction.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_dec_str(digits).map_err(|_| UnitError::Overflow(amount.to_string()))
}

/// Formats an amount expressed in its smallest unit, always keeping one decimal
pub fn format_units(amount: U256, decimals: usize) -> String {
    let raw = amount.to_string();
    if decimals == 0 {
        return format!("{}.0", raw);
    }

    let padded = if raw.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - raw.len() + 1), raw)
    } else {
        raw
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, fraction)
    }
}
