// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for the snapshot domain.
//!
//! - [`WeiAmount`] for paid values and the unit price
//! - [`Units`] for exact, signed token unit counts

pub mod units;
pub mod wei;

pub use units::Units;
pub use wei::WeiAmount;
