// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Event definitions, ABI decoding and chronological ordering.
//!
//! This module handles:
//! - The `TransferSingle` event definition
//! - Strict decoding of address topics and `(id, value)` data
//! - Sorting event streams by chain position before they are folded

pub mod abi;
pub mod definitions;
pub mod ordering;

pub use definitions::TransferSingle;
pub use ordering::{sort_chronologically, EventPosition, Positioned};
