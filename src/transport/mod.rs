// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Transport layers for the JSON-RPC client and the Etherscan API.
//!
//! Only retries are applied: request/response logging is emitted natively by
//! alloy's transport at DEBUG/TRACE level.

pub mod retry;

pub use retry::{retry_with_backoff, Attempt, RetryConfig, RetryError, RetryLayer, RetryService};
