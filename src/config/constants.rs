//! Well-known addresses, topics and prices of the tracked drop
//!
//! This module centralizes the production values used as configuration
//! defaults.

use alloy_primitives::{address, b256, Address, B256};

/// Contracts involved in the drop
pub mod contracts {
    use super::*;

    /// Fixed-price sale contract; emits the mint event and receives payment.
    ///
    /// Contract: 0x49a19aA2a4E3fC19614d7aFCE014C60397A197Ac
    pub const MINTING_CONTRACT: Address = address!("49a19aa2a4e3fc19614d7afce014c60397a197ac");

    /// ERC-1155 token contract; emits `TransferSingle`.
    ///
    /// Contract: 0x5719DAcA15f885d49bF98ea2a9d03C5d97528d44
    pub const TOKEN_CONTRACT: Address = address!("5719daca15f885d49bf98ea2a9d03c5d97528d44");

    /// Account that sent the initial distribution transfers.
    pub const DEPLOYER: Address = address!("f557597fed3f7fbfb2d4cc7ce304e2e4b7927053");
}

/// Event topics (topic0) of the three tracked signatures
pub mod topics {
    use super::*;

    /// Mint event emitted by the sale contract.
    pub const MINT: B256 =
        b256!("dd06b66c3ba8126086cd863137d6f3b86ce5bcf4309cac390cc265e39194d0b2");

    /// `TransferSingle(address,address,address,uint256,uint256)`
    pub const TRANSFER_SINGLE: B256 =
        b256!("c3d58168c5ae7397731d063d5bbf3d657854427343f4c083240f7aacaa2d0f62");

    /// Marketplace order fill logged right after the transfer it settles.
    pub const MARKETPLACE_PURCHASE: B256 =
        b256!("c4109843e0b7d514e4c093114b863f8e7d8d9a458c372cd51bfe526b588006c9");
}

/// Sale price of one unit, in wei (0.08 ETH).
pub const UNIT_PRICE_WEI: u64 = 80_000_000_000_000_000;

/// Decimal places of the refund amounts.
pub const REFUND_DECIMALS: i64 = 2;

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::SolEvent;

    use crate::events::definitions::TransferSingle;

    #[test]
    fn test_transfer_topic_matches_event_definition() {
        assert_eq!(topics::TRANSFER_SINGLE, TransferSingle::SIGNATURE_HASH);
    }

    #[test]
    fn test_checksummed_contracts() {
        assert_eq!(
            contracts::MINTING_CONTRACT.to_checksum(None),
            "0x49a19aA2a4E3fC19614d7aFCE014C60397A197Ac"
        );
        assert_eq!(
            contracts::TOKEN_CONTRACT.to_checksum(None),
            "0x5719DAcA15f885d49bF98ea2a9d03C5d97528d44"
        );
    }

    #[test]
    fn test_unit_price() {
        assert_eq!(UNIT_PRICE_WEI, 8 * 10u64.pow(16));
    }
}
