// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strict decoding of the fixed log schemas
//!
//! Topics and data use the standard fixed-width big-endian ABI encoding.
//! Unlike the lenient decoders of `alloy-sol-types`, these functions reject
//! address words with dirty padding and data with trailing bytes, since a
//! mis-sized payload here means the log is not what the snapshot assumes.

use alloy_primitives::{Address, LogData, B256, U256};
use alloy_sol_types::SolValue;

use super::definitions::TransferSingle;
use crate::errors::DecodeError;

/// Size of one ABI word.
const WORD: usize = 32;
/// Zero bytes left of an address inside a word.
const ADDRESS_PADDING: usize = 12;

/// Decode the address held in topic `index`.
///
/// # Examples
///
/// ```rust
/// use alloy_primitives::{address, B256};
/// use refund_snapshot::events::abi::decode_topic_address;
///
/// let holder = address!("00000000000000000000000000000000000000aa");
/// let topics = vec![B256::ZERO, holder.into_word()];
/// assert_eq!(decode_topic_address(&topics, 1).unwrap(), holder);
/// ```
pub fn decode_topic_address(topics: &[B256], index: usize) -> Result<Address, DecodeError> {
    let word = topics.get(index).ok_or(DecodeError::MissingTopic {
        index,
        available: topics.len(),
    })?;

    if word[..ADDRESS_PADDING].iter().any(|b| *b != 0) {
        return Err(DecodeError::DirtyAddressPadding {
            index,
            word: *word,
        });
    }

    Ok(Address::from_word(*word))
}

/// Decode `(uint256 id, uint256 value)` from log data.
pub fn decode_id_and_amount(data: &[u8]) -> Result<(U256, U256), DecodeError> {
    if data.len() != 2 * WORD {
        return Err(DecodeError::DataLength {
            expected: 2 * WORD,
            actual: data.len(),
        });
    }

    Ok(<(U256, U256)>::abi_decode(data)?)
}

/// topic0 of a log, or zero when it has none.
pub fn signature_of(log: &LogData) -> B256 {
    log.topics().first().copied().unwrap_or_default()
}

/// Decode a full `TransferSingle` log, checking its signature first.
pub fn decode_transfer_single(
    log: &LogData,
    expected_signature: B256,
) -> Result<TransferSingle, DecodeError> {
    let actual = signature_of(log);
    if actual != expected_signature {
        return Err(DecodeError::UnexpectedSignature {
            expected: expected_signature,
            actual,
        });
    }

    let topics = log.topics();
    let (id, value) = decode_id_and_amount(&log.data)?;

    Ok(TransferSingle {
        operator: decode_topic_address(topics, 1)?,
        from: decode_topic_address(topics, 2)?,
        to: decode_topic_address(topics, 3)?,
        id,
        value,
    })
}
