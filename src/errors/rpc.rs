// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Shared RPC error types for the log source and transaction resolver.
//!
//! Both collaborators (JSON-RPC node and Etherscan) report failures through
//! [`RpcError`] so the reconciliation passes can wrap them with the
//! transaction hash or query that triggered them.

use alloy_primitives::TxHash;

/// Errors that can occur while talking to the log source or the node.
///
/// # Examples
///
/// ```rust
/// use alloy_primitives::TxHash;
/// use refund_snapshot::RpcError;
///
/// let error = RpcError::TransactionNotFound {
///     tx_hash: TxHash::ZERO,
/// };
/// assert!(error.to_string().starts_with("Transaction not found"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Failed to fetch logs from the node.
    #[error("Failed to fetch logs for {operation}")]
    GetLogsFailed {
        /// Description of the query (contract, topic and block range)
        operation: String,
        /// The underlying provider error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The node does not know the transaction.
    #[error("Transaction not found: {tx_hash}")]
    TransactionNotFound {
        /// The transaction hash that wasn't found
        tx_hash: TxHash,
    },

    /// The transaction has no confirmed receipt yet.
    #[error("Receipt not found for transaction: {tx_hash}")]
    ReceiptNotFound {
        /// The transaction hash whose receipt wasn't found
        tx_hash: TxHash,
    },

    /// Catch-all for failed RPC calls (network errors, timeouts, exhausted
    /// transport retries).
    #[error("Chain connection failed during {operation}")]
    ChainConnectionFailed {
        /// Description of the operation that failed
        operation: String,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The data source kept refusing requests after all retries.
    #[error("{service} unavailable after {attempts} attempts: {reason}")]
    SourceUnavailable {
        /// Which service refused (e.g. "etherscan")
        service: String,
        /// How many requests were made
        attempts: u32,
        /// Last reported reason
        reason: String,
    },

    /// The source answered with something that cannot be interpreted.
    #[error("Invalid response from {service}: {details}")]
    InvalidResponse {
        /// Which service answered
        service: String,
        /// What was wrong with the payload
        details: String,
    },

    /// The configured provider URL could not be parsed.
    #[error("Invalid provider URL: {0}")]
    ProviderUrlInvalid(String),
}

impl RpcError {
    /// Helper to create a `GetLogsFailed` error from any error type.
    pub fn get_logs_failed(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::GetLogsFailed {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Helper to create a `ChainConnectionFailed` error from any error type.
    pub fn chain_connection_failed(
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::ChainConnectionFailed {
            operation: operation.into(),
            source: Box::new(source),
        }
    }

    /// Helper to create a `SourceUnavailable` error.
    pub fn source_unavailable(
        service: impl Into<String>,
        attempts: u32,
        reason: impl Into<String>,
    ) -> Self {
        RpcError::SourceUnavailable {
            service: service.into(),
            attempts,
            reason: reason.into(),
        }
    }

    /// Helper to create an `InvalidResponse` error.
    pub fn invalid_response(service: impl Into<String>, details: impl Into<String>) -> Self {
        RpcError::InvalidResponse {
            service: service.into(),
            details: details.into(),
        }
    }
}
