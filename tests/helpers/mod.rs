// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for refund snapshot integration tests
//!
//! Provides an in-memory chain implementing both collaborator traits, so
//! the passes can be driven without a node or Etherscan.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, LogData, TxHash, B256, U256};
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use refund_snapshot::config::constants::{contracts, topics};
use refund_snapshot::{
    EventLog, EventPosition, EventSource, LogQuery, ReceiptLog, ResolvedTransaction, RpcError,
    SnapshotConfig, TransactionResolver, WeiAmount,
};

/// 0.08 ETH
pub const UNIT_PRICE_WEI: u64 = 80_000_000_000_000_000;

/// Wei paid for `units` units
pub fn paid_for(units: u64) -> u64 {
    units * UNIT_PRICE_WEI
}

/// Deterministic test address
pub fn addr(n: u8) -> Address {
    Address::with_last_byte(n)
}

/// Encode a TransferSingle log of the token contract
pub fn transfer_single_data(from: Address, to: Address, id: u64, amount: u64) -> LogData {
    LogData::new_unchecked(
        vec![
            topics::TRANSFER_SINGLE,
            Address::ZERO.into_word(),
            from.into_word(),
            to.into_word(),
        ],
        Bytes::from((U256::from(id), U256::from(amount)).abi_encode()),
    )
}

fn mint_data() -> LogData {
    LogData::new_unchecked(vec![topics::MINT], Bytes::new())
}

fn marketplace_data() -> LogData {
    LogData::new_unchecked(vec![topics::MARKETPLACE_PURCHASE], Bytes::from(vec![0u8; 64]))
}

/// One `TransferSingle` inside a multi-transfer transaction
#[derive(Debug, Clone, Copy)]
pub struct TransferLeg {
    pub from: Address,
    pub to: Address,
    pub amount: u64,
    /// Followed by a marketplace purchase log in the receipt
    pub sold: bool,
}

impl TransferLeg {
    /// A leg with no marketplace log after it
    pub fn plain(from: Address, to: Address, amount: u64) -> Self {
        Self { from, to, amount, sold: false }
    }

    /// A leg followed by a marketplace purchase log
    pub fn sold(from: Address, to: Address, amount: u64) -> Self {
        Self { from, to, amount, sold: true }
    }
}

/// In-memory chain serving logs, transactions and receipts.
///
/// # Example
///
/// ```rust,ignore
/// let mut chain = MockChain::new();
/// chain.mint(alice, paid_for(2));
/// chain.transfer(alice, alice, bob, 1);
///
/// let snapshot = SnapshotPipeline::new(&config(), &chain, &chain).run().await?;
/// ```
#[derive(Default)]
pub struct MockChain {
    logs: Vec<EventLog>,
    transactions: HashMap<TxHash, ResolvedTransaction>,
    receipts: HashMap<TxHash, Vec<ReceiptLog>>,
    delays: HashMap<TxHash, Duration>,
    reverse_delivery: bool,
    next_block: u64,
    next_tx: u64,
    receipt_requests: Mutex<Vec<TxHash>>,
    transaction_requests: Mutex<Vec<TxHash>>,
}

impl MockChain {
    /// Empty chain
    pub fn new() -> Self {
        Self {
            next_block: 13_000_000,
            ..Default::default()
        }
    }

    /// Deliver logs in reverse chain order
    pub fn with_reverse_delivery(mut self) -> Self {
        self.reverse_delivery = true;
        self
    }

    /// Delay resolution of `tx_hash`
    pub fn delay(&mut self, tx_hash: TxHash, delay: Duration) {
        self.delays.insert(tx_hash, delay);
    }

    fn next_hash(&mut self) -> TxHash {
        self.next_tx += 1;
        B256::from(U256::from(self.next_tx))
    }

    fn next_position(&mut self) -> EventPosition {
        self.next_block += 1;
        EventPosition::new(self.next_block, 0, 0)
    }

    /// A mint by `minter` paying `paid_wei`
    pub fn mint(&mut self, minter: Address, paid_wei: u64) -> TxHash {
        let hash = self.next_hash();
        let position = self.next_position();
        self.transactions.insert(
            hash,
            ResolvedTransaction {
                hash,
                from: minter,
                value: WeiAmount::from(paid_wei),
            },
        );
        self.logs.push(EventLog {
            transaction_hash: hash,
            position,
            address: contracts::MINTING_CONTRACT,
            data: mint_data(),
        });
        hash
    }

    /// Deliver an existing log a second time
    pub fn duplicate_log(&mut self, tx_hash: TxHash) {
        if let Some(log) = self.logs.iter().find(|l| l.transaction_hash == tx_hash).cloned() {
            self.logs.push(log);
        }
    }

    fn push_transfer(&mut self, sender: Address, from: Address, to: Address, amount: u64, extra: Vec<LogData>) -> TxHash {
        let hash = self.next_hash();
        let position = self.next_position();

        let mut receipt = vec![ReceiptLog {
            log_index: position.log_index,
            address: contracts::TOKEN_CONTRACT,
            data: transfer_single_data(from, to, 1, amount),
        }];
        for (offset, data) in extra.into_iter().enumerate() {
            receipt.push(ReceiptLog {
                log_index: position.log_index + 1 + offset as u64,
                address: Address::with_last_byte(0xee),
                data,
            });
        }

        self.transactions.insert(
            hash,
            ResolvedTransaction {
                hash,
                from: sender,
                value: WeiAmount::ZERO,
            },
        );
        self.logs.push(EventLog {
            transaction_hash: hash,
            position,
            address: contracts::TOKEN_CONTRACT,
            data: receipt[0].data.clone(),
        });
        self.receipts.insert(hash, receipt);
        hash
    }

    /// A plain transfer sent by `sender`
    pub fn transfer(&mut self, sender: Address, from: Address, to: Address, amount: u64) -> TxHash {
        self.push_transfer(sender, from, to, amount, Vec::new())
    }

    /// A transfer followed by a marketplace purchase log
    pub fn marketplace_sale(&mut self, buyer: Address, from: Address, to: Address, amount: u64) -> TxHash {
        self.push_transfer(buyer, from, to, amount, vec![marketplace_data()])
    }

    /// One transaction emitting a `TransferSingle` per leg, all sharing a
    /// receipt. Each leg's log carries its own receipt log index.
    pub fn batch_transfer(&mut self, sender: Address, legs: &[TransferLeg]) -> TxHash {
        let hash = self.next_hash();
        let block = self.next_position().block_number;

        let mut receipt = Vec::new();
        for leg in legs {
            let position = EventPosition::new(block, 0, receipt.len() as u64);
            let data = transfer_single_data(leg.from, leg.to, 1, leg.amount);
            receipt.push(ReceiptLog {
                log_index: position.log_index,
                address: contracts::TOKEN_CONTRACT,
                data: data.clone(),
            });
            self.logs.push(EventLog {
                transaction_hash: hash,
                position,
                address: contracts::TOKEN_CONTRACT,
                data,
            });
            if leg.sold {
                receipt.push(ReceiptLog {
                    log_index: receipt.len() as u64,
                    address: Address::with_last_byte(0xee),
                    data: marketplace_data(),
                });
            }
        }

        self.transactions.insert(
            hash,
            ResolvedTransaction {
                hash,
                from: sender,
                value: WeiAmount::ZERO,
            },
        );
        self.receipts.insert(hash, receipt);
        hash
    }

    /// A transfer sent by the deployer
    pub fn deployer_transfer(&mut self, to: Address, amount: u64) -> TxHash {
        self.push_transfer(contracts::DEPLOYER, contracts::DEPLOYER, to, amount, Vec::new())
    }

    /// Forget the transaction so resolving it fails
    pub fn drop_transaction(&mut self, tx_hash: TxHash) {
        self.transactions.remove(&tx_hash);
    }

    /// Replace the receipt of `tx_hash`
    pub fn set_receipt(&mut self, tx_hash: TxHash, logs: Vec<ReceiptLog>) {
        self.receipts.insert(tx_hash, logs);
    }

    /// Receipts requested so far
    pub fn receipt_requests(&self) -> Vec<TxHash> {
        self.receipt_requests.lock().unwrap().clone()
    }

    /// Transactions requested so far
    pub fn transaction_requests(&self) -> Vec<TxHash> {
        self.transaction_requests.lock().unwrap().clone()
    }

    async fn maybe_delay(&self, hash: TxHash) {
        if let Some(delay) = self.delays.get(&hash) {
            tokio::time::sleep(*delay).await;
        }
    }
}

#[async_trait]
impl EventSource for MockChain {
    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<EventLog>, RpcError> {
        let mut logs: Vec<EventLog> = self
            .logs
            .iter()
            .filter(|log| {
                log.address == query.address
                    && log.data.topics().first() == Some(&query.topic0)
                    && log.position.block_number >= query.from_block
                    && query.to_block.is_none_or(|to| log.position.block_number <= to)
            })
            .cloned()
            .collect();
        if self.reverse_delivery {
            logs.reverse();
        }
        Ok(logs)
    }
}

#[async_trait]
impl TransactionResolver for MockChain {
    async fn get_transaction(&self, hash: TxHash) -> Result<ResolvedTransaction, RpcError> {
        self.transaction_requests.lock().unwrap().push(hash);
        self.maybe_delay(hash).await;
        self.transactions
            .get(&hash)
            .cloned()
            .ok_or(RpcError::TransactionNotFound { tx_hash: hash })
    }

    async fn receipt_logs(&self, hash: TxHash) -> Result<Vec<ReceiptLog>, RpcError> {
        self.receipt_requests.lock().unwrap().push(hash);
        self.receipts
            .get(&hash)
            .cloned()
            .ok_or(RpcError::ReceiptNotFound { tx_hash: hash })
    }
}

/// Event source that always fails
pub struct FailingSource;

#[async_trait]
impl EventSource for FailingSource {
    async fn get_logs(&self, _query: &LogQuery) -> Result<Vec<EventLog>, RpcError> {
        Err(RpcError::source_unavailable("etherscan", 4, "Max rate limit reached"))
    }
}

/// Production configuration writing into `dir`
pub fn config_in(dir: &std::path::Path) -> SnapshotConfig {
    refund_snapshot::SnapshotConfigBuilder::new()
        .output_dir(dir)
        .resolve_concurrency(4)
        .build()
}
