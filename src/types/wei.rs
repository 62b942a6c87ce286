// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong type for native currency amounts
//!
//! Paid mint values and the unit price are both wei amounts; keeping them in
//! a newtype prevents mixing them with token unit counts.

use alloy_primitives::U256;
use bigdecimal::num_bigint::{BigInt, Sign};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Number of decimals between wei and ether.
pub const ETHER_DECIMALS: i64 = 18;

/// Represents an amount of native currency (ETH) in wei
///
/// # Examples
///
/// ```
/// use alloy_primitives::U256;
/// use refund_snapshot::WeiAmount;
///
/// let price = WeiAmount::from_ether_str("0.08").unwrap();
/// assert_eq!(price.as_u256(), U256::from(80_000_000_000_000_000u64));
/// assert_eq!(price.to_string(), "0.08 ETH");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct WeiAmount(U256);

impl WeiAmount {
    /// Zero wei amount
    pub const ZERO: Self = Self(U256::ZERO);

    /// Create a new wei amount
    pub const fn new(wei: U256) -> Self {
        Self(wei)
    }

    /// Get the inner U256 value (in wei)
    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    /// Check if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse a decimal ether string ("0.08") into wei.
    ///
    /// Returns `None` for negative values, more than 18 fractional digits,
    /// or anything that is not a decimal number.
    pub fn from_ether_str(ether: &str) -> Option<Self> {
        let value: BigDecimal = ether.trim().parse().ok()?;
        let (digits, scale) = (value * BigDecimal::new(BigInt::from(1), -ETHER_DECIMALS))
            .normalized()
            .into_bigint_and_exponent();
        if digits.sign() == Sign::Minus || scale > 0 {
            return None;
        }
        let wei = digits * BigInt::from(10).pow((-scale) as u32);
        let (_, bytes) = wei.to_bytes_be();
        if bytes.len() > 32 {
            return None;
        }
        Some(Self(U256::from_be_slice(&bytes)))
    }

    /// The amount as an exact decimal number of wei.
    pub fn to_decimal(&self) -> BigDecimal {
        BigDecimal::new(u256_to_bigint(self.0), 0)
    }

    /// Convert to ether (1 ETH = 10^18 wei) without losing precision.
    pub fn to_ether(&self) -> BigDecimal {
        BigDecimal::new(u256_to_bigint(self.0), ETHER_DECIMALS)
    }
}

/// Exact conversion of an unsigned 256-bit integer into a `BigInt`.
pub(crate) fn u256_to_bigint(value: U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>())
}

impl From<u64> for WeiAmount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for WeiAmount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for WeiAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ETH", self.to_ether().normalized())
    }
}
