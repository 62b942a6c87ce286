// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! JSON-RPC backed source and resolver

use alloy_consensus::Transaction as _;
use alloy_network::{ReceiptResponse as _, TransactionResponse as _};
use alloy_primitives::{BlockNumber, TxHash};
use alloy_provider::Provider;
use alloy_rpc_types::Filter;
use async_trait::async_trait;
use tracing::{debug, trace};

use super::{EventLog, EventSource, LogQuery, ReceiptLog, ResolvedTransaction, TransactionResolver};
use crate::errors::RpcError;
use crate::types::WeiAmount;

/// Reads logs, transactions and receipts from a JSON-RPC node.
///
/// Log queries are split into block chunks of `chunk_size` so they stay
/// under the result limits most providers enforce on `eth_getLogs`.
#[derive(Debug, Clone)]
pub struct RpcChainSource<P> {
    provider: P,
    chunk_size: u64,
}

impl<P> RpcChainSource<P> {
    /// Wrap a provider
    pub fn new(provider: P, chunk_size: u64) -> Self {
        Self {
            provider,
            chunk_size: chunk_size.max(1),
        }
    }

    /// The wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: Provider> RpcChainSource<P> {
    async fn resolve_to_block(&self, to_block: Option<BlockNumber>) -> Result<BlockNumber, RpcError> {
        match to_block {
            Some(block) => Ok(block),
            None => self
                .provider
                .get_block_number()
                .await
                .map_err(|e| RpcError::chain_connection_failed("get_block_number", e)),
        }
    }
}

/// Inclusive block ranges of at most `size` blocks covering `from..=to`.
pub(crate) fn block_chunks(from: BlockNumber, to: BlockNumber, size: u64) -> Vec<(BlockNumber, BlockNumber)> {
    let size = size.max(1);
    let mut chunks = Vec::new();
    let mut start = from;
    while start <= to {
        let end = start.saturating_add(size - 1).min(to);
        chunks.push((start, end));
        if end == to {
            break;
        }
        start = end + 1;
    }
    chunks
}

#[async_trait]
impl<P: Provider> EventSource for RpcChainSource<P> {
    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<EventLog>, RpcError> {
        let to_block = self.resolve_to_block(query.to_block).await?;
        let mut logs = Vec::new();

        for (start, end) in block_chunks(query.from_block, to_block, self.chunk_size) {
            let filter = Filter::new()
                .address(query.address)
                .event_signature(query.topic0)
                .from_block(start)
                .to_block(end);

            let chunk = self.provider.get_logs(&filter).await.map_err(|e| {
                RpcError::get_logs_failed(format!("{} blocks {start}..={end}", query.address), e)
            })?;
            trace!(from_block = start, to_block = end, count = chunk.len(), "Fetched log chunk");

            for log in chunk.into_iter().filter(|log| !log.removed) {
                logs.push(EventLog::try_from(log)?);
            }
        }

        debug!(query = %query, count = logs.len(), "Fetched logs over JSON-RPC");
        Ok(logs)
    }
}

#[async_trait]
impl<P: Provider> TransactionResolver for RpcChainSource<P> {
    async fn get_transaction(&self, hash: TxHash) -> Result<ResolvedTransaction, RpcError> {
        let tx = self
            .provider
            .get_transaction_by_hash(hash)
            .await
            .map_err(|e| RpcError::chain_connection_failed("get_transaction_by_hash", e))?
            .ok_or(RpcError::TransactionNotFound { tx_hash: hash })?;

        Ok(ResolvedTransaction {
            hash,
            from: tx.from(),
            value: WeiAmount::new(tx.value()),
        })
    }

    async fn receipt_logs(&self, hash: TxHash) -> Result<Vec<ReceiptLog>, RpcError> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| RpcError::chain_connection_failed("get_transaction_receipt", e))?
            .ok_or(RpcError::ReceiptNotFound { tx_hash: hash })?;

        if receipt.block_number().is_none() {
            return Err(RpcError::ReceiptNotFound { tx_hash: hash });
        }

        receipt
            .inner
            .logs()
            .iter()
            .map(|log| {
                let log_index = log.log_index.ok_or_else(|| {
                    RpcError::invalid_response("json-rpc", format!("receipt log of {hash} without logIndex"))
                })?;
                Ok(ReceiptLog {
                    log_index,
                    address: log.inner.address,
                    data: log.inner.data.clone(),
                })
            })
            .collect()
    }
}
