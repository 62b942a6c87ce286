// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Errors from the mint and transfer passes.
//!
//! Every variant is fatal for the run: a snapshot built from a partial
//! event stream would pay out the wrong refunds, so nothing here is ever
//! downgraded to a skipped record.

use alloy_primitives::{Address, TxHash};

use super::{DecodeError, RpcError};
use crate::types::Units;

/// Errors that abort a reconciliation pass.
///
/// # Examples
///
/// ```rust,ignore
/// use refund_snapshot::ReconcileError;
///
/// match pipeline.run().await {
///     Err(ReconcileError::Resolution { tx_hash, source }) => {
///         eprintln!("could not resolve {tx_hash}: {source}");
///     }
///     Err(ReconcileError::Decode { tx_hash, log_index, source }) => {
///         eprintln!("bad log {log_index} in {tx_hash}: {source}");
///     }
///     Err(e) => eprintln!("{e}"),
///     Ok(snapshot) => println!("{} holders", snapshot.balances.len()),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// A transaction hash from the log source could not be resolved to
    /// transaction or receipt data.
    #[error("Failed to resolve transaction {tx_hash}")]
    Resolution {
        /// The transaction that could not be resolved
        tx_hash: TxHash,
        /// Why resolution failed
        #[source]
        source: RpcError,
    },

    /// Log data did not match the expected schema.
    #[error("Failed to decode log {log_index} of transaction {tx_hash}")]
    Decode {
        /// Transaction carrying the log
        tx_hash: TxHash,
        /// Block-wide index of the log
        log_index: u64,
        /// Why decoding failed
        #[source]
        source: DecodeError,
    },

    /// The event log itself could not be retrieved.
    #[error("Failed to retrieve {what} event log")]
    LogSource {
        /// Which log ("mint" or "transfer")
        what: &'static str,
        /// The underlying source error
        #[source]
        source: RpcError,
    },

    /// The log source returned an entry outside the requested contract and
    /// topic.
    #[error("Malformed log entry: {details}")]
    MalformedLog {
        /// What was missing
        details: String,
    },

    /// An address finished the run with a negative balance in strict mode.
    #[error("Address {address} ended with negative balance {balance}")]
    NegativeBalance {
        /// The address
        address: Address,
        /// Its final balance
        balance: Units,
    },

    /// The unit price cannot be used to derive unit counts.
    #[error("Unit price must be non-zero")]
    InvalidUnitPrice,
}

impl ReconcileError {
    /// Wrap an [`RpcError`] raised while resolving `tx_hash`.
    pub fn resolution(tx_hash: TxHash, source: RpcError) -> Self {
        ReconcileError::Resolution { tx_hash, source }
    }

    /// Wrap a [`DecodeError`] raised for log `log_index` of `tx_hash`.
    pub fn decode(tx_hash: TxHash, log_index: u64, source: DecodeError) -> Self {
        ReconcileError::Decode {
            tx_hash,
            log_index,
            source,
        }
    }

    /// Create a `MalformedLog` error with details.
    pub fn malformed_log(details: impl Into<String>) -> Self {
        ReconcileError::MalformedLog {
            details: details.into(),
        }
    }
}
