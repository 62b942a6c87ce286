// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-address unit balances
//!
//! A [`BalanceMap`] starts empty; an address absent from it has a balance of
//! zero. Entries are kept ordered by address so every artifact derived from
//! the map is deterministic.

use std::collections::BTreeMap;

use alloy_primitives::Address;

use crate::types::Units;

/// Units held by each address.
///
/// # Examples
///
/// ```
/// use alloy_primitives::address;
/// use refund_snapshot::{BalanceMap, Units};
///
/// let alice = address!("00000000000000000000000000000000000000a1");
/// let mut balances = BalanceMap::new();
/// balances.credit(alice, &Units::from(2u64));
/// balances.debit(alice, &Units::from(1u64));
/// assert_eq!(balances.get(&alice), Units::from(1u64));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceMap {
    entries: BTreeMap<Address, Units>,
}

impl BalanceMap {
    /// An empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `address`, zero when absent
    pub fn get(&self, address: &Address) -> Units {
        self.entries.get(address).cloned().unwrap_or_default()
    }

    /// Whether `address` has an entry, even a zero one
    pub fn contains(&self, address: &Address) -> bool {
        self.entries.contains_key(address)
    }

    /// Add `amount` to `address`, creating the entry if needed
    pub fn credit(&mut self, address: Address, amount: &Units) {
        *self.entries.entry(address).or_default() += amount;
    }

    /// Subtract `amount` from `address`, creating the entry if needed.
    ///
    /// The balance may go negative.
    pub fn debit(&mut self, address: Address, amount: &Units) {
        *self.entries.entry(address).or_default() -= amount;
    }

    /// Sum of all balances
    pub fn total(&self) -> Units {
        self.entries.values().cloned().sum()
    }

    /// Entries with a balance below zero
    pub fn negative_entries(&self) -> impl Iterator<Item = (&Address, &Units)> {
        self.entries.iter().filter(|(_, units)| units.is_negative())
    }

    /// All entries, ordered by address
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Units)> {
        self.entries.iter()
    }

    /// Number of addresses with an entry
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Address, Units)> for BalanceMap {
    fn from_iter<I: IntoIterator<Item = (Address, Units)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (address, units) in iter {
            map.credit(address, &units);
        }
        map
    }
}

impl<'a> IntoIterator for &'a BalanceMap {
    type Item = (&'a Address, &'a Units);
    type IntoIter = std::collections::btree_map::Iter<'a, Address, Units>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
