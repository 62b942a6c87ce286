// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Refund projection
//!
//! `refund = round_half_up(balance * unit_price, decimals)` in ether, for
//! every address of the final balance map, zero and negative balances
//! included.

use alloy_primitives::Address;
use bigdecimal::{BigDecimal, RoundingMode};

use crate::balance::BalanceMap;
use crate::types::{Units, WeiAmount};

/// Refund owed to one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundEntry {
    /// Refunded address
    pub address: Address,
    /// Final unit balance
    pub balance: Units,
    /// Refund in ether, already rounded
    pub refund: BigDecimal,
    /// Decimal places of `refund`
    pub decimals: i64,
}

impl RefundEntry {
    /// The refund with exactly `decimals` places, e.g. `0.08`
    pub fn refund_string(&self) -> String {
        format_fixed(&self.refund, self.decimals)
    }

    /// Whether the address ended below zero
    pub fn is_negative(&self) -> bool {
        self.balance.is_negative()
    }
}

/// Project final balances into refunds, ordered by address.
///
/// # Examples
///
/// ```
/// use alloy_primitives::address;
/// use refund_snapshot::{project_refunds, BalanceMap, Units, WeiAmount};
///
/// let holder = address!("00000000000000000000000000000000000000a1");
/// let mut balances = BalanceMap::new();
/// balances.credit(holder, &Units::from(3u64));
///
/// let price = WeiAmount::from(80_000_000_000_000_000u64);
/// let refunds = project_refunds(&balances, price, 2);
/// assert_eq!(refunds[0].refund_string(), "0.24");
/// ```
pub fn project_refunds(balances: &BalanceMap, unit_price: WeiAmount, decimals: i64) -> Vec<RefundEntry> {
    balances
        .iter()
        .map(|(address, balance)| RefundEntry {
            address: *address,
            balance: balance.clone(),
            refund: balance.value_in_ether(unit_price, decimals),
            decimals,
        })
        .collect()
}

/// Render `value` rounded half-up to exactly `decimals` places, without
/// exponent notation.
pub fn format_fixed(value: &BigDecimal, decimals: i64) -> String {
    value
        .with_scale_round(decimals.max(0), RoundingMode::HalfUp)
        .to_plain_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const PRICE: u64 = 80_000_000_000_000_000;
    const A: Address = address!("00000000000000000000000000000000000000a1");
    const B: Address = address!("00000000000000000000000000000000000000b2");

    fn dec(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(&dec("0.08"), 2), "0.08");
        assert_eq!(format_fixed(&dec("0"), 2), "0.00");
        assert_eq!(format_fixed(&dec("1.5"), 2), "1.50");
        assert_eq!(format_fixed(&dec("-0.08"), 2), "-0.08");
        assert_eq!(format_fixed(&dec("123.456"), 2), "123.46");
        assert_eq!(format_fixed(&dec("7"), 0), "7");
        assert_eq!(format_fixed(&dec("-0.001"), 2), "0.00");
    }

    #[test]
    fn test_format_fixed_rounds_half_up() {
        assert_eq!(format_fixed(&dec("0.125"), 2), "0.13");
        assert_eq!(format_fixed(&dec("0.124"), 2), "0.12");
    }

    #[test]
    fn test_format_fixed_large_values_stay_plain() {
        assert_eq!(format_fixed(&dec("1e20"), 2), "100000000000000000000.00");
    }

    #[test]
    fn test_projection_covers_every_address() {
        let mut balances = BalanceMap::new();
        balances.credit(B, &Units::from(1u64));
        balances.debit(A, &Units::from(1u64));

        let refunds = project_refunds(&balances, WeiAmount::from(PRICE), 2);
        assert_eq!(refunds.len(), 2);
        assert_eq!(refunds[0].address, A);
        assert!(refunds[0].is_negative());
        assert_eq!(refunds[0].refund_string(), "-0.08");
        assert_eq!(refunds[1].refund_string(), "0.08");
    }

    #[test]
    fn test_fractional_units_round() {
        let mut balances = BalanceMap::new();
        // 1.0625 units * 0.08 = 0.085 -> 0.09
        balances.credit(A, &Units::new(dec("1.0625")));

        let refunds = project_refunds(&balances, WeiAmount::from(PRICE), 2);
        assert_eq!(refunds[0].refund, dec("0.09"));
    }
}
