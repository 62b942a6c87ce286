// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chronological ordering of event logs
//!
//! The folds are not order-insensitive (a debit may precede the credit it
//! consumes), so every event stream is sorted by its chain position before
//! it is replayed, whatever ordering the source promises.

use alloy_primitives::BlockNumber;
use serde::{Deserialize, Serialize};

/// Position of a log on chain: block, then transaction, then log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventPosition {
    /// Block containing the log
    pub block_number: BlockNumber,
    /// Index of the transaction within the block
    pub transaction_index: u64,
    /// Index of the log within the block
    pub log_index: u64,
}

impl EventPosition {
    /// Create a position
    pub const fn new(block_number: BlockNumber, transaction_index: u64, log_index: u64) -> Self {
        Self {
            block_number,
            transaction_index,
            log_index,
        }
    }
}

impl std::fmt::Display for EventPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.block_number, self.transaction_index, self.log_index
        )
    }
}

/// Anything that sits at a chain position.
pub trait Positioned {
    /// The chain position
    fn position(&self) -> EventPosition;
}

/// Sort in place by chain position.
///
/// The sort is stable, so entries sharing a position (duplicates delivered
/// by the source) keep their relative order and are all replayed.
pub fn sort_chronologically<T: Positioned>(items: &mut [T]) {
    items.sort_by_key(Positioned::position);
}
