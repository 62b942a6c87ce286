//! Event definitions of the tracked token contract
//!
//! The token is an ERC-1155 collection; ownership changes are reported by
//! `TransferSingle`. The mint event of the sale contract and the marketplace
//! purchase log are only matched by topic0 and never decoded, so they have
//! no definition here (see [`crate::config::constants::topics`]).
//!
//! # Event Signatures
//!
//! - **TransferSingle**: `TransferSingle(address,address,address,uint256,uint256)`
//!
//! # Example: Using the auto-generated signature hash in a query
//!
//! ```rust,ignore
//! use refund_snapshot::events::TransferSingle;
//! use refund_snapshot::source::LogQuery;
//! use alloy_sol_types::SolEvent;
//!
//! let query = LogQuery::new(token_contract, TransferSingle::SIGNATURE_HASH, 0);
//! ```

use std::fmt::Debug;

use alloy_sol_types::sol;

sol! {
    /// ERC-1155 TransferSingle event
    ///
    /// # Fields
    ///
    /// - `operator`: Account that initiated the transfer (indexed, topic 1)
    /// - `from`: Previous holder (indexed, topic 2)
    /// - `to`: New holder (indexed, topic 3)
    /// - `id`: Token id
    /// - `value`: Number of units moved
    event TransferSingle(
        address indexed operator,
        address indexed from,
        address indexed to,
        uint256 id,
        uint256 value
    );
}

impl Debug for TransferSingle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TransferSingle(operator: {}, from: {}, to: {}, id: {}, value: {})",
            self.operator, self.from, self.to, self.id, self.value
        )
    }
}
