// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Exact, signed token unit counts
//!
//! Balances are "units minted net of transfers out". Mint values that are
//! not a whole multiple of the unit price yield fractional units, and a
//! balance can dip below zero while the event stream is being folded, so
//! the count is a signed exact decimal rather than an integer or a float.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use alloy_primitives::U256;
use bigdecimal::num_bigint::Sign;
use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};

use super::wei::{u256_to_bigint, WeiAmount};

/// A signed, exact number of token units.
///
/// # Examples
///
/// ```
/// use refund_snapshot::{Units, WeiAmount};
///
/// let price = WeiAmount::from(80_000_000_000_000_000u64); // 0.08 ETH
/// let paid = WeiAmount::from(160_000_000_000_000_000u64); // 0.16 ETH
///
/// let units = Units::from_paid_value(paid, price).unwrap();
/// assert_eq!(units, Units::from(2u64));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Units(BigDecimal);

impl Units {
    /// Zero units.
    pub fn zero() -> Self {
        Self(BigDecimal::from(0))
    }

    /// Wrap an exact decimal.
    pub fn new(value: BigDecimal) -> Self {
        Self(value)
    }

    /// Number of units bought with `paid` at `unit_price`.
    ///
    /// Returns `None` when the unit price is zero.
    pub fn from_paid_value(paid: WeiAmount, unit_price: WeiAmount) -> Option<Self> {
        if unit_price.is_zero() {
            return None;
        }
        Some(Self(paid.to_decimal() / unit_price.to_decimal()))
    }

    /// A raw on-chain token amount, taken as-is.
    pub fn from_token_amount(amount: U256) -> Self {
        Self(BigDecimal::new(u256_to_bigint(amount), 0))
    }

    /// The inner decimal.
    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    /// Whether the count is below zero.
    pub fn is_negative(&self) -> bool {
        self.0.sign() == Sign::Minus
    }

    /// Whether the count is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.sign() == Sign::NoSign
    }

    /// Value of these units at `unit_price`, in ether, rounded half-up to
    /// `decimals` places.
    pub fn value_in_ether(&self, unit_price: WeiAmount, decimals: i64) -> BigDecimal {
        (&self.0 * unit_price.to_ether()).with_scale_round(decimals, RoundingMode::HalfUp)
    }

    /// Lossy conversion for JSON output.
    ///
    /// Returns `None` if the decimal does not fit a finite `f64`.
    pub fn to_f64(&self) -> Option<f64> {
        decimal_to_f64(&self.0)
    }
}

/// Lossy decimal to float conversion that refuses infinities.
pub(crate) fn decimal_to_f64(value: &BigDecimal) -> Option<f64> {
    value
        .normalized()
        .to_string()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

impl From<u64> for Units {
    fn from(value: u64) -> Self {
        Self(BigDecimal::from(value))
    }
}

impl From<BigDecimal> for Units {
    fn from(value: BigDecimal) -> Self {
        Self(value)
    }
}

impl Add for Units {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Units {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign<&Units> for Units {
    fn add_assign(&mut self, rhs: &Units) {
        self.0 = &self.0 + &rhs.0;
    }
}

impl SubAssign<&Units> for Units {
    fn sub_assign(&mut self, rhs: &Units) {
        self.0 = &self.0 - &rhs.0;
    }
}

impl Neg for Units {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl std::iter::Sum for Units {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Units::zero(), |acc, u| acc + u)
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.normalized())
    }
}
