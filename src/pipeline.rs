// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Snapshot orchestration
//!
//! A run fetches the mint and transfer logs concurrently, sorts both by
//! chain position, then folds the mint pass to completion before the
//! transfer pass starts mutating the same balances. Within a pass up to
//! `resolve_concurrency` transactions are resolved at once, but results are
//! folded strictly in log order. The first failure aborts the run; nothing
//! is written for a pass that did not complete.

use std::path::PathBuf;

use alloy_primitives::{Address, B256};
use futures::{stream, StreamExt, TryStreamExt};
use tracing::{info, warn, Instrument};

use crate::balance::BalanceMap;
use crate::config::SnapshotConfig;
use crate::errors::{ReconcileError, SnapshotError};
use crate::events::abi::signature_of;
use crate::events::sort_chronologically;
use crate::mint::{resolve_mint, MintAccumulator};
use crate::refund::{project_refunds, RefundEntry};
use crate::snapshot::SnapshotWriter;
use crate::source::{EventLog, EventSource, LogQuery, TransactionResolver};
use crate::tracing::spans;
use crate::transfer::{resolve_transfer, TransferReconciler, TransferRules, TransferStats};

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Units minted per address, after the mint pass
    pub minted: BalanceMap,
    /// Final balances, after the transfer pass
    pub balances: BalanceMap,
    /// Refund per address, ordered by address
    pub refunds: Vec<RefundEntry>,
    /// Transfer outcome counts
    pub transfers: TransferStats,
    /// Files written, in write order
    pub artifacts: Vec<PathBuf>,
}

impl Snapshot {
    /// Addresses that ended below zero
    pub fn negative_addresses(&self) -> Vec<Address> {
        self.balances.negative_entries().map(|(address, _)| *address).collect()
    }
}

/// Drives one snapshot run over an [`EventSource`] and a
/// [`TransactionResolver`].
///
/// # Example
///
/// ```rust,ignore
/// use refund_snapshot::{SnapshotConfig, SnapshotPipeline, SnapshotWriter};
/// use refund_snapshot::source::RpcChainSource;
///
/// let config = SnapshotConfig::from_env()?;
/// let chain = RpcChainSource::new(provider, config.log_chunk_size);
/// let snapshot = SnapshotPipeline::new(&config, &chain, &chain)
///     .with_writer(SnapshotWriter::new(&config.output_dir))
///     .run()
///     .await?;
/// ```
pub struct SnapshotPipeline<'a, S: ?Sized, R: ?Sized> {
    config: &'a SnapshotConfig,
    events: &'a S,
    resolver: &'a R,
    writer: Option<SnapshotWriter>,
}

impl<'a, S, R> SnapshotPipeline<'a, S, R>
where
    S: EventSource + ?Sized,
    R: TransactionResolver + ?Sized,
{
    /// Create a pipeline that only computes, without writing artifacts
    pub fn new(config: &'a SnapshotConfig, events: &'a S, resolver: &'a R) -> Self {
        Self {
            config,
            events,
            resolver,
            writer: None,
        }
    }

    /// Write artifacts as each pass completes
    pub fn with_writer(mut self, writer: SnapshotWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Run both passes and project refunds.
    ///
    /// # Errors
    ///
    /// Any log retrieval, resolution or decode failure, a negative final
    /// balance in strict mode, or an artifact write failure.
    pub async fn run(&self) -> Result<Snapshot, SnapshotError> {
        let span = spans::snapshot_run(self.config.from_block, self.config.to_block);
        async {
            self.config.validate()?;
            info!(
                minting_contract = %self.config.minting_contract,
                token_contract = %self.config.token_contract,
                "Starting snapshot"
            );

            let (mint_logs, transfer_logs) = self.fetch_logs().await?;
            info!(
                mint_logs = mint_logs.len(),
                transfer_logs = transfer_logs.len(),
                "Retrieved event logs"
            );

            let mut artifacts = Vec::new();

            let minted = self.mint_pass(&mint_logs).await?;
            if let Some(writer) = &self.writer {
                artifacts.push(writer.write_minters(&minted).await?);
            }

            let (balances, transfers) = self.transfer_pass(&transfer_logs, minted.clone()).await?;
            self.check_negative_balances(&balances)?;

            let refunds = project_refunds(&balances, self.config.unit_price, self.config.refund_decimals);
            if let Some(writer) = &self.writer {
                artifacts.extend(writer.write_refunds(&refunds).await?);
            }

            info!(addresses = balances.len(), total_units = %balances.total(), "Snapshot complete");

            Ok(Snapshot {
                minted,
                balances,
                refunds,
                transfers,
                artifacts,
            })
        }
        .instrument(span)
        .await
    }

    fn queries(&self) -> (LogQuery, LogQuery) {
        let config = self.config;
        let mint = LogQuery::new(config.minting_contract, config.mint_topic, config.from_block)
            .to_block(config.to_block);
        let transfer = LogQuery::new(config.token_contract, config.transfer_topic, config.from_block)
            .to_block(config.to_block);
        (mint, transfer)
    }

    /// Fetch both logs concurrently and sort them chronologically.
    async fn fetch_logs(&self) -> Result<(Vec<EventLog>, Vec<EventLog>), ReconcileError> {
        let (mint_query, transfer_query) = self.queries();

        let (mut mint_logs, mut transfer_logs) = tokio::try_join!(
            self.fetch("mint", &mint_query),
            self.fetch("transfer", &transfer_query),
        )?;

        sort_chronologically(&mut mint_logs);
        sort_chronologically(&mut transfer_logs);
        Ok((mint_logs, transfer_logs))
    }

    async fn fetch(&self, what: &'static str, query: &LogQuery) -> Result<Vec<EventLog>, ReconcileError> {
        let logs = self
            .events
            .get_logs(query)
            .instrument(spans::fetch_logs(what, query.address, query.topic0))
            .await
            .map_err(|source| ReconcileError::LogSource { what, source })?;

        check_logs_match(query.address, query.topic0, &logs)?;
        Ok(logs)
    }

    /// Fold mint logs into minted units per address.
    pub async fn mint_pass(&self, logs: &[EventLog]) -> Result<BalanceMap, ReconcileError> {
        let accumulator = MintAccumulator::new(self.config.unit_price)?;

        let accumulator = stream::iter(logs)
            .map(|log| {
                resolve_mint(log, self.resolver)
                    .instrument(spans::resolve_transaction(log.transaction_hash, log.log_index()))
            })
            .buffered(self.config.resolve_concurrency.max(1))
            .try_fold(accumulator, |mut accumulator, event| async move {
                accumulator.apply(&event)?;
                Ok::<_, ReconcileError>(accumulator)
            })
            .instrument(spans::mint_pass(logs.len()))
            .await?;

        let minted = accumulator.into_balances();
        info!(events = logs.len(), minters = minted.len(), total_units = %minted.total(), "Mint pass complete");
        Ok(minted)
    }

    /// Apply transfer logs on top of the mint pass balances.
    pub async fn transfer_pass(
        &self,
        logs: &[EventLog],
        balances: BalanceMap,
    ) -> Result<(BalanceMap, TransferStats), ReconcileError> {
        let rules = TransferRules::from(self.config);
        let reconciler = TransferReconciler::new(rules, balances);

        let reconciler = stream::iter(logs)
            .map(|log| {
                resolve_transfer(log, self.resolver, &rules)
                    .instrument(spans::resolve_transaction(log.transaction_hash, log.log_index()))
            })
            .buffered(self.config.resolve_concurrency.max(1))
            .try_fold(reconciler, |mut reconciler, step| async move {
                reconciler.apply(&step);
                Ok::<_, ReconcileError>(reconciler)
            })
            .instrument(spans::transfer_pass(logs.len()))
            .await?;

        let (balances, stats) = reconciler.into_parts();
        info!(
            events = stats.total(),
            moved = stats.moved,
            resold = stats.resold,
            skipped = stats.skipped(),
            "Transfer pass complete"
        );
        Ok((balances, stats))
    }

    fn check_negative_balances(&self, balances: &BalanceMap) -> Result<(), ReconcileError> {
        let negatives: Vec<_> = balances.negative_entries().collect();
        if negatives.is_empty() {
            return Ok(());
        }

        for (address, balance) in &negatives {
            warn!(address = %address, balance = %balance, "Negative final balance");
        }

        match negatives.first() {
            Some((address, balance)) if self.config.strict_non_negative => {
                Err(ReconcileError::NegativeBalance {
                    address: **address,
                    balance: (*balance).clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Every log must come from the queried contract with the queried topic.
fn check_logs_match(address: Address, topic0: B256, logs: &[EventLog]) -> Result<(), ReconcileError> {
    match logs
        .iter()
        .find(|log| log.address != address || signature_of(&log.data) != topic0)
    {
        Some(log) => Err(ReconcileError::malformed_log(format!(
            "log {} of {} does not match {address} topic0={topic0}",
            log.log_index(),
            log.transaction_hash
        ))),
        None => Ok(()),
    }
}
