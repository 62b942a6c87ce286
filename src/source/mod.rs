// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain data sources
//!
//! The passes only need two capabilities from the outside world:
//!
//! - [`EventSource`]: every log of one `(contract, topic0)` pair in a block
//!   range. Implemented by [`RpcChainSource`] (chunked `eth_getLogs`) and
//!   [`EtherscanLogSource`] (the Etherscan log API).
//! - [`TransactionResolver`]: sender and value of a transaction, and the logs
//!   of its receipt. Implemented by [`RpcChainSource`].
//!
//! Both are traits so the passes can be driven by in-memory fixtures.

use alloy_primitives::{Address, BlockNumber, LogData, TxHash, B256};
use async_trait::async_trait;

use crate::errors::RpcError;
use crate::events::{EventPosition, Positioned};
use crate::types::WeiAmount;

pub mod etherscan;
pub mod rpc;

pub use etherscan::{EtherscanConfig, EtherscanLogSource};
pub use rpc::RpcChainSource;

/// Selects the logs of one event signature emitted by one contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogQuery {
    /// Emitting contract
    pub address: Address,
    /// Event signature (topic0)
    pub topic0: B256,
    /// First block, inclusive
    pub from_block: BlockNumber,
    /// Last block, inclusive; `None` for the chain head
    pub to_block: Option<BlockNumber>,
}

impl LogQuery {
    /// Query from `from_block` up to the chain head
    pub fn new(address: Address, topic0: B256, from_block: BlockNumber) -> Self {
        Self {
            address,
            topic0,
            from_block,
            to_block: None,
        }
    }

    /// Bound the query at `to_block`
    pub fn to_block(mut self, to_block: Option<BlockNumber>) -> Self {
        self.to_block = to_block;
        self
    }
}

impl std::fmt::Display for LogQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} topic0={} blocks {}..=", self.address, self.topic0, self.from_block)?;
        match self.to_block {
            Some(to) => write!(f, "{to}"),
            None => write!(f, "latest"),
        }
    }
}

/// One log returned by an [`EventSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLog {
    /// Transaction that emitted the log
    pub transaction_hash: TxHash,
    /// Chain position of the log
    pub position: EventPosition,
    /// Emitting contract
    pub address: Address,
    /// Topics and data
    pub data: LogData,
}

impl EventLog {
    /// Block-wide index of the log
    pub fn log_index(&self) -> u64 {
        self.position.log_index
    }
}

impl Positioned for EventLog {
    fn position(&self) -> EventPosition {
        self.position
    }
}

impl TryFrom<alloy_rpc_types::Log> for EventLog {
    type Error = RpcError;

    fn try_from(log: alloy_rpc_types::Log) -> Result<Self, Self::Error> {
        let missing = |field: &str| RpcError::invalid_response("json-rpc", format!("log without {field}"));

        let transaction_hash = log.transaction_hash.ok_or_else(|| missing("transactionHash"))?;
        let position = EventPosition::new(
            log.block_number.ok_or_else(|| missing("blockNumber"))?,
            log.transaction_index.ok_or_else(|| missing("transactionIndex"))?,
            log.log_index.ok_or_else(|| missing("logIndex"))?,
        );

        Ok(Self {
            transaction_hash,
            position,
            address: log.inner.address,
            data: log.inner.data,
        })
    }
}

/// Sender and value of a resolved transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTransaction {
    /// Transaction hash
    pub hash: TxHash,
    /// Sender
    pub from: Address,
    /// Value sent with the transaction
    pub value: WeiAmount,
}

/// One log of a transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLog {
    /// Block-wide index of the log
    pub log_index: u64,
    /// Emitting contract
    pub address: Address,
    /// Topics and data
    pub data: LogData,
}

impl ReceiptLog {
    /// Event signature, or zero for anonymous logs
    pub fn topic0(&self) -> B256 {
        crate::events::abi::signature_of(&self.data)
    }
}

/// Source of event logs.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// All logs matching `query`.
    ///
    /// Implementations may return logs in any order; callers sort them.
    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<EventLog>, RpcError>;
}

/// Resolves transaction hashes to transaction and receipt data.
#[async_trait]
pub trait TransactionResolver: Send + Sync {
    /// Sender and value of the transaction.
    async fn get_transaction(&self, hash: TxHash) -> Result<ResolvedTransaction, RpcError>;

    /// Logs of the confirmed receipt, in receipt order.
    async fn receipt_logs(&self, hash: TxHash) -> Result<Vec<ReceiptLog>, RpcError>;
}

#[async_trait]
impl<T: EventSource + ?Sized> EventSource for std::sync::Arc<T> {
    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<EventLog>, RpcError> {
        (**self).get_logs(query).await
    }
}

#[async_trait]
impl<T: TransactionResolver + ?Sized> TransactionResolver for std::sync::Arc<T> {
    async fn get_transaction(&self, hash: TxHash) -> Result<ResolvedTransaction, RpcError> {
        (**self).get_transaction(hash).await
    }

    async fn receipt_logs(&self, hash: TxHash) -> Result<Vec<ReceiptLog>, RpcError> {
        (**self).receipt_logs(hash).await
    }
}
