//! Normalization of loosely-typed time values
//!
//! Test code hands time parameters around as plain integers, numeric strings,
//! 256-bit integers read back from contracts, or dates. Every one of them is
//! converted here, once, into a canonical `u64` before it reaches the node.

use chrono::{DateTime, Utc};
use primitive_types::U256;
use std::time::SystemTime;
use thiserror::Error;

/// Errors raised while normalizing a [`TimeValue`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// String is neither a decimal nor a `0x` hex integer
    #[error("'{0}' is not a numeric value")]
    NotNumeric(String),

    /// Negative seconds or timestamps are never valid
    #[error("negative value {0} is not allowed")]
    Negative(String),

    /// Value does not fit in a 64 bit unsigned integer
    #[error("value {0} does not fit in 64 bits")]
    Overflow(String),

    /// A calendar date was given where a number of seconds was expected
    #[error("a date cannot be used as a number of seconds")]
    DateNotADuration,

    /// Date lies before 1970-01-01T00:00:00Z
    #[error("date {0} is before the unix epoch")]
    BeforeEpoch(String),
}

/// Any value accepted as a number of seconds or as a unix timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeValue {
    Integer(i128),
    Text(String),
    Big(U256),
    Date(DateTime<Utc>),
}

impl TimeValue {
    /// Normalize into a number of seconds. Dates are rejected.
    pub fn into_seconds(self) -> Result<u64, InputError> {
        match self {
            Self::Date(_) => Err(InputError::DateNotADuration),
            other => other.into_u64(),
        }
    }

    /// Normalize into unix seconds. Dates are floored to the second.
    pub fn into_unix_timestamp(self) -> Result<u64, InputError> {
        match self {
            Self::Date(date) => {
                let seconds = date.timestamp();
                u64::try_from(seconds).map_err(|_| InputError::BeforeEpoch(date.to_rfc3339()))
            }
            other => other.into_u64(),
        }
    }

    fn into_u64(self) -> Result<u64, InputError> {
        match self {
            Self::Integer(value) => {
                if value < 0 {
                    return Err(InputError::Negative(value.to_string()));
                }
                u64::try_from(value).map_err(|_| InputError::Overflow(value.to_string()))
            }
            Self::Text(text) => parse_text(&text),
            Self::Big(value) => big_to_u64(value),
            Self::Date(_) => Err(InputError::DateNotADuration),
        }
    }
}

fn parse_text(text: &str) -> Result<u64, InputError> {
    let trimmed = text.trim();
    if let Some(digits) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InputError::NotNumeric(text.to_string()));
        }
        let significant = match digits.trim_start_matches('0') {
            "" => "0",
            rest => rest,
        };
        // Every remaining failure is a value too wide for U256
        let value = U256::from_str_radix(significant, 16)
            .map_err(|_| InputError::Overflow(trimmed.to_string()))?;
        return big_to_u64(value);
    }

    if let Some(digits) = trimmed.strip_prefix('-') {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InputError::Negative(trimmed.to_string()));
        }
        return Err(InputError::NotNumeric(text.to_string()));
    }

    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::NotNumeric(text.to_string()));
    }
    let value =
        U256::from_dec_str(trimmed).map_err(|_| InputError::Overflow(trimmed.to_string()))?;
    big_to_u64(value)
}

fn big_to_u64(value: U256) -> Result<u64, InputError> {
    if value.bits() > 64 {
        return Err(InputError::Overflow(value.to_string()));
    }
    Ok(value.low_u64())
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for TimeValue {
                fn from(value: $t) -> Self {
                    Self::Integer(value as i128)
                }
            }
        )*
    };
}

impl_from_integer!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

impl From<&str> for TimeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for TimeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<U256> for TimeValue {
    fn from(value: U256) -> Self {
        Self::Big(value)
    }
}

impl From<DateTime<Utc>> for TimeValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<SystemTime> for TimeValue {
    fn from(value: SystemTime) -> Self {
        Self::Date(DateTime::<Utc>::from(value))
    }
}
