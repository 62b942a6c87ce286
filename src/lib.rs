// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Refund snapshot for a fixed-price NFT drop
//!
//! Replays the mint log of the sale contract and the `TransferSingle` log of
//! the token contract into per-address unit balances, then prices every
//! balance at the mint price to produce refund amounts.
//!
//! # Passes
//!
//! 1. **Mint pass** ([`mint`]): every mint transaction credits its sender
//!    with `value / unit_price` units.
//! 2. **Transfer pass** ([`transfer`]): transfers move units between holders,
//!    except those sent by the deployer, those out of the minting contract,
//!    and the credit side of marketplace purchases.
//! 3. **Refunds** ([`refund`]): `balance * unit_price`, rounded half-up to
//!    two decimals.
//!
//! # Example
//!
//! ```rust,ignore
//! use refund_snapshot::provider::{create_http_provider, ProviderConfig};
//! use refund_snapshot::source::RpcChainSource;
//! use refund_snapshot::{SnapshotConfig, SnapshotPipeline, SnapshotWriter};
//!
//! let config = SnapshotConfig::default();
//! let provider = create_http_provider(ProviderConfig::new(rpc_url))?;
//! let chain = RpcChainSource::new(provider, config.log_chunk_size);
//!
//! let snapshot = SnapshotPipeline::new(&config, &chain, &chain)
//!     .with_writer(SnapshotWriter::new("out"))
//!     .run()
//!     .await?;
//! println!("{} refunds", snapshot.refunds.len());
//! ```

pub mod balance;
pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod events;
pub mod mint;
pub mod pipeline;
pub mod provider;
pub mod refund;
pub mod snapshot;
pub mod source;
mod tracing;
pub mod transfer;
pub mod transport;
pub mod types;

pub use balance::BalanceMap;
pub use config::{SnapshotConfig, SnapshotConfigBuilder};
pub use errors::{
    ArtifactError, ConfigError, DecodeError, ReconcileError, RpcError, SnapshotError,
};
pub use events::EventPosition;
pub use mint::{MintAccumulator, MintEvent};
pub use pipeline::{Snapshot, SnapshotPipeline};
pub use refund::{project_refunds, RefundEntry};
pub use snapshot::SnapshotWriter;
pub use source::{
    EventLog, EventSource, LogQuery, ReceiptLog, ResolvedTransaction, TransactionResolver,
};
pub use transfer::{TransferEvent, TransferOutcome, TransferReconciler, TransferRules, TransferStep};
pub use types::{Units, WeiAmount};
