// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Errors raised while decoding ABI-encoded log topics and data.

use alloy_primitives::B256;

/// A log did not match the fixed schema it was expected to follow.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The log has fewer topics than the schema requires.
    #[error("Log has no topic at index {index} (found {available})")]
    MissingTopic {
        /// Topic index that was requested
        index: usize,
        /// Number of topics present
        available: usize,
    },

    /// An address topic has non-zero bytes in its 12-byte left padding.
    #[error("Topic {index} is not a left-padded address: {word}")]
    DirtyAddressPadding {
        /// Topic index
        index: usize,
        /// The offending 32-byte word
        word: B256,
    },

    /// Log data has the wrong size for the schema.
    #[error("Log data is {actual} bytes, expected {expected}")]
    DataLength {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// The ABI decoder rejected the payload.
    #[error("ABI decoding failed: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    /// The receipt does not contain the transfer log the event pointed at.
    #[error("Receipt has no transfer log with log index {log_index}")]
    TransferLogMissing {
        /// Block-wide log index of the event
        log_index: u64,
    },

    /// The log at the expected position carries another event signature.
    #[error("Unexpected event signature: expected {expected}, found {actual}")]
    UnexpectedSignature {
        /// Expected topic0
        expected: B256,
        /// Found topic0 (zero when the log has no topics)
        actual: B256,
    },
}
