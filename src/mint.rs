// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Mint pass: units bought per address
//!
//! Every log of the sale contract's mint event is resolved to its
//! transaction; the sender is the minter and `value / unit_price` is the
//! number of units bought. All mints count, including the deployer's, and a
//! log delivered twice is counted twice.

use alloy_primitives::{Address, TxHash};
use tracing::trace;

use crate::balance::BalanceMap;
use crate::errors::ReconcileError;
use crate::events::{EventPosition, Positioned};
use crate::source::{EventLog, TransactionResolver};
use crate::types::{Units, WeiAmount};

/// A mint log joined with its transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintEvent {
    /// Transaction carrying the mint
    pub transaction_hash: TxHash,
    /// Transaction sender
    pub minter: Address,
    /// Value sent with the transaction
    pub paid: WeiAmount,
    /// Chain position of the mint log
    pub position: EventPosition,
}

impl Positioned for MintEvent {
    fn position(&self) -> EventPosition {
        self.position
    }
}

/// Resolve the transaction behind a mint log.
pub async fn resolve_mint<R>(log: &EventLog, resolver: &R) -> Result<MintEvent, ReconcileError>
where
    R: TransactionResolver + ?Sized,
{
    let tx = resolver
        .get_transaction(log.transaction_hash)
        .await
        .map_err(|e| ReconcileError::resolution(log.transaction_hash, e))?;

    Ok(MintEvent {
        transaction_hash: log.transaction_hash,
        minter: tx.from,
        paid: tx.value,
        position: log.position,
    })
}

/// Folds [`MintEvent`]s into a [`BalanceMap`].
#[derive(Debug, Clone)]
pub struct MintAccumulator {
    unit_price: WeiAmount,
    balances: BalanceMap,
    events: usize,
}

impl MintAccumulator {
    /// Start an empty fold at `unit_price`.
    ///
    /// # Errors
    ///
    /// [`ReconcileError::InvalidUnitPrice`] if the price is zero.
    pub fn new(unit_price: WeiAmount) -> Result<Self, ReconcileError> {
        if unit_price.is_zero() {
            return Err(ReconcileError::InvalidUnitPrice);
        }
        Ok(Self {
            unit_price,
            balances: BalanceMap::new(),
            events: 0,
        })
    }

    /// Credit the minter with the units bought by `event` and return them.
    pub fn apply(&mut self, event: &MintEvent) -> Result<Units, ReconcileError> {
        let units =
            Units::from_paid_value(event.paid, self.unit_price).ok_or(ReconcileError::InvalidUnitPrice)?;
        trace!(
            tx_hash = %event.transaction_hash,
            minter = %event.minter,
            units = %units,
            "Mint"
        );
        self.balances.credit(event.minter, &units);
        self.events += 1;
        Ok(units)
    }

    /// Number of events applied
    pub fn events(&self) -> usize {
        self.events
    }

    /// The fold so far
    pub fn balances(&self) -> &BalanceMap {
        &self.balances
    }

    /// Finish the fold
    pub fn into_balances(self) -> BalanceMap {
        self.balances
    }
}

/// Fold a complete, ordered sequence of mint events.
pub fn accumulate_mints<'a, I>(events: I, unit_price: WeiAmount) -> Result<BalanceMap, ReconcileError>
where
    I: IntoIterator<Item = &'a MintEvent>,
{
    let mut accumulator = MintAccumulator::new(unit_price)?;
    for event in events {
        accumulator.apply(event)?;
    }
    Ok(accumulator.into_balances())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, B256};
    use bigdecimal::BigDecimal;

    const PRICE: u64 = 80_000_000_000_000_000;
    const A: Address = address!("00000000000000000000000000000000000000a1");
    const B: Address = address!("00000000000000000000000000000000000000b2");

    fn mint(minter: Address, paid_wei: u64, log_index: u64) -> MintEvent {
        MintEvent {
            transaction_hash: B256::with_last_byte(log_index as u8),
            minter,
            paid: WeiAmount::from(paid_wei),
            position: EventPosition::new(1, 0, log_index),
        }
    }

    #[test]
    fn test_units_per_minter() {
        let events = [mint(A, 2 * PRICE, 0), mint(B, PRICE, 1), mint(A, PRICE, 2)];
        let balances = accumulate_mints(&events, WeiAmount::from(PRICE)).unwrap();

        assert_eq!(balances.get(&A), Units::from(3u64));
        assert_eq!(balances.get(&B), Units::from(1u64));
    }

    #[test]
    fn test_duplicates_are_summed() {
        let event = mint(A, PRICE, 0);
        let balances = accumulate_mints([&event, &event], WeiAmount::from(PRICE)).unwrap();
        assert_eq!(balances.get(&A), Units::from(2u64));
    }

    #[test]
    fn test_fractional_units_are_exact() {
        // 0.1 ETH at 0.08 ETH per unit
        let events = [mint(A, 100_000_000_000_000_000, 0)];
        let balances = accumulate_mints(&events, WeiAmount::from(PRICE)).unwrap();
        assert_eq!(
            balances.get(&A),
            Units::new("1.25".parse::<BigDecimal>().unwrap())
        );
    }

    #[test]
    fn test_zero_value_mint_creates_zero_entry() {
        let events = [mint(A, 0, 0)];
        let balances = accumulate_mints(&events, WeiAmount::from(PRICE)).unwrap();
        assert!(balances.contains(&A));
        assert!(balances.get(&A).is_zero());
    }

    #[test]
    fn test_apply_returns_credited_units() {
        let mut accumulator = MintAccumulator::new(WeiAmount::from(PRICE)).unwrap();

        let units = accumulator.apply(&mint(A, 2 * PRICE, 0)).unwrap();
        assert_eq!(units, Units::from(2u64));

        let units = accumulator.apply(&mint(A, PRICE / 2, 1)).unwrap();
        assert_eq!(units, Units::new("0.5".parse::<BigDecimal>().unwrap()));

        assert_eq!(accumulator.events(), 2);
        assert_eq!(
            accumulator.balances().get(&A),
            Units::new("2.5".parse::<BigDecimal>().unwrap())
        );
    }

    #[test]
    fn test_zero_price_is_rejected() {
        let result = MintAccumulator::new(WeiAmount::ZERO);
        assert!(matches!(result, Err(ReconcileError::InvalidUnitPrice)));
    }
}
