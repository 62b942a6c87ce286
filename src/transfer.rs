// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transfer pass: moving minted units between holders
//!
//! Each `TransferSingle` log of the token contract is resolved in two
//! steps. The transaction is fetched first: transfers sent by the deployer
//! (the initial distribution) are ignored without touching the receipt.
//! Otherwise the receipt is fetched and the transfer log is located in it by
//! its log index. Then:
//!
//! | case | effect |
//! |---|---|
//! | `from` is the minting contract | none, the mint pass counted it |
//! | next receipt log is a marketplace purchase | debit `from` only |
//! | anything else | debit `from`, credit `to` |
//!
//! Debits are never clamped; a holder that sells more than it minted goes
//! negative and is reported after the pass.

use alloy_primitives::{Address, TxHash, B256, U256};
use tracing::trace;

use crate::balance::BalanceMap;
use crate::config::SnapshotConfig;
use crate::errors::{DecodeError, ReconcileError};
use crate::events::abi::decode_transfer_single;
use crate::events::{EventPosition, Positioned};
use crate::source::{EventLog, ReceiptLog, TransactionResolver};
use crate::types::Units;

/// Addresses and topics that drive transfer classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRules {
    /// Sender whose transfers are ignored
    pub deployer: Address,
    /// Source of transfers already counted as mints
    pub minting_contract: Address,
    /// Contract expected to emit the transfer log
    pub token_contract: Address,
    /// topic0 of the transfer log
    pub transfer_topic: B256,
    /// topic0 of the log that marks a marketplace purchase
    pub marketplace_topic: B256,
}

impl From<&SnapshotConfig> for TransferRules {
    fn from(config: &SnapshotConfig) -> Self {
        Self {
            deployer: config.deployer,
            minting_contract: config.minting_contract,
            token_contract: config.token_contract,
            transfer_topic: config.transfer_topic,
            marketplace_topic: config.marketplace_topic,
        }
    }
}

/// A transfer log joined with its transaction and receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    /// Transaction carrying the transfer
    pub transaction_hash: TxHash,
    /// Transaction sender
    pub sender: Address,
    /// Previous holder
    pub from: Address,
    /// New holder
    pub to: Address,
    /// Token id
    pub token_id: U256,
    /// Units moved
    pub units: Units,
    /// All logs of the receipt, in receipt order
    pub receipt_logs: Vec<ReceiptLog>,
    /// Index of the transfer log within `receipt_logs`
    pub transfer_log: usize,
    /// Chain position of the transfer log
    pub position: EventPosition,
}

impl TransferEvent {
    /// The receipt log right after the transfer log, if any
    pub fn next_log(&self) -> Option<&ReceiptLog> {
        self.receipt_logs.get(self.transfer_log + 1)
    }

    /// How this transfer affects balances
    pub fn classify(&self, rules: &TransferRules) -> TransferOutcome {
        if self.from == rules.minting_contract {
            return TransferOutcome::FromMintingContract;
        }

        let resold = self
            .next_log()
            .is_some_and(|next| next.topic0() == rules.marketplace_topic);

        if resold {
            TransferOutcome::Resold {
                from: self.from,
                units: self.units.clone(),
            }
        } else {
            TransferOutcome::Moved {
                from: self.from,
                to: self.to,
                units: self.units.clone(),
            }
        }
    }
}

impl Positioned for TransferEvent {
    fn position(&self) -> EventPosition {
        self.position
    }
}

/// Result of resolving one transfer log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStep {
    /// Sent by the deployer; the receipt was not fetched
    Deployer {
        /// Transaction carrying the transfer
        transaction_hash: TxHash,
    },
    /// A transfer to classify
    Transfer(Box<TransferEvent>),
}

/// Balance effect of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Sent by the deployer, ignored
    Deployer,
    /// Out of the minting contract, ignored
    FromMintingContract,
    /// Bought through the marketplace: `from` is debited only
    Resold {
        /// Seller
        from: Address,
        /// Units sold
        units: Units,
    },
    /// Plain transfer
    Moved {
        /// Previous holder
        from: Address,
        /// New holder
        to: Address,
        /// Units moved
        units: Units,
    },
}

/// Resolve a transfer log into a [`TransferStep`].
///
/// # Errors
///
/// - [`ReconcileError::Resolution`] if the transaction or receipt cannot be
///   fetched
/// - [`ReconcileError::Decode`] if the receipt has no matching transfer log
///   or the log does not decode
pub async fn resolve_transfer<R>(
    log: &EventLog,
    resolver: &R,
    rules: &TransferRules,
) -> Result<TransferStep, ReconcileError>
where
    R: TransactionResolver + ?Sized,
{
    let tx_hash = log.transaction_hash;
    let tx = resolver
        .get_transaction(tx_hash)
        .await
        .map_err(|e| ReconcileError::resolution(tx_hash, e))?;

    if tx.from == rules.deployer {
        return Ok(TransferStep::Deployer {
            transaction_hash: tx_hash,
        });
    }

    let receipt_logs = resolver
        .receipt_logs(tx_hash)
        .await
        .map_err(|e| ReconcileError::resolution(tx_hash, e))?;

    let decode_error = |source: DecodeError| ReconcileError::decode(tx_hash, log.log_index(), source);

    let transfer_log = receipt_logs
        .iter()
        .position(|r| r.log_index == log.log_index() && r.address == rules.token_contract)
        .ok_or_else(|| {
            decode_error(DecodeError::TransferLogMissing {
                log_index: log.log_index(),
            })
        })?;

    let decoded = decode_transfer_single(&receipt_logs[transfer_log].data, rules.transfer_topic)
        .map_err(decode_error)?;

    Ok(TransferStep::Transfer(Box::new(TransferEvent {
        transaction_hash: tx_hash,
        sender: tx.from,
        from: decoded.from,
        to: decoded.to,
        token_id: decoded.id,
        units: Units::from_token_amount(decoded.value),
        receipt_logs,
        transfer_log,
        position: log.position,
    })))
}

/// Counts of each outcome seen by a [`TransferReconciler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Ignored deployer transfers
    pub deployer: usize,
    /// Ignored transfers out of the minting contract
    pub from_minting_contract: usize,
    /// Marketplace purchases (debit only)
    pub resold: usize,
    /// Plain transfers
    pub moved: usize,
}

impl TransferStats {
    /// Total number of transfers processed
    pub fn total(&self) -> usize {
        self.deployer + self.from_minting_contract + self.resold + self.moved
    }

    /// Transfers that left balances untouched
    pub fn skipped(&self) -> usize {
        self.deployer + self.from_minting_contract
    }
}

/// Applies resolved transfers to the balances left by the mint pass.
#[derive(Debug, Clone)]
pub struct TransferReconciler {
    rules: TransferRules,
    balances: BalanceMap,
    stats: TransferStats,
}

impl TransferReconciler {
    /// Continue from the mint pass balances
    pub fn new(rules: TransferRules, balances: BalanceMap) -> Self {
        Self {
            rules,
            balances,
            stats: TransferStats::default(),
        }
    }

    /// The classification rules
    pub fn rules(&self) -> &TransferRules {
        &self.rules
    }

    /// Apply one resolved transfer and return its outcome.
    pub fn apply(&mut self, step: &TransferStep) -> TransferOutcome {
        let outcome = match step {
            TransferStep::Deployer { .. } => TransferOutcome::Deployer,
            TransferStep::Transfer(event) => event.classify(&self.rules),
        };

        match &outcome {
            TransferOutcome::Deployer => self.stats.deployer += 1,
            TransferOutcome::FromMintingContract => self.stats.from_minting_contract += 1,
            TransferOutcome::Resold { from, units } => {
                self.balances.debit(*from, units);
                self.stats.resold += 1;
            }
            TransferOutcome::Moved { from, to, units } => {
                self.balances.debit(*from, units);
                self.balances.credit(*to, units);
                self.stats.moved += 1;
            }
        }

        if let TransferStep::Transfer(event) = step {
            trace!(
                tx_hash = %event.transaction_hash,
                from = %event.from,
                to = %event.to,
                units = %event.units,
                outcome = ?outcome,
                "Transfer"
            );
        }

        outcome
    }

    /// Counts so far
    pub fn stats(&self) -> TransferStats {
        self.stats
    }

    /// The balances so far
    pub fn balances(&self) -> &BalanceMap {
        &self.balances
    }

    /// Finish the pass
    pub fn into_parts(self) -> (BalanceMap, TransferStats) {
        (self.balances, self.stats)
    }
}
