//! Span creation helpers for snapshot operations.
//!
//! Telemetry stays out of the pass logic: each instrumented operation has a
//! span helper here, and the async code attaches it with
//! [`tracing::Instrument`].
//!
//! Usage pattern:
//! ```rust,ignore
//! async fn my_pass(&self, logs: &[EventLog]) -> Result<T> {
//!     async { /* pass logic */ }
//!         .instrument(spans::my_pass(logs.len()))
//!         .await
//! }
//! ```

use alloy_primitives::{Address, BlockNumber, TxHash, B256};
use tracing::{Level, Span};

/// Create span for a whole snapshot run.
///
/// Parent: None (root span)
/// Children: fetch_logs, mint_pass, transfer_pass
#[inline]
pub(crate) fn snapshot_run(from_block: BlockNumber, to_block: Option<BlockNumber>) -> Span {
    tracing::span!(
        Level::INFO,
        "snapshot.run",
        from_block = from_block,
        to_block = ?to_block,
    )
}

/// Create span for retrieving one event log.
///
/// Parent: snapshot_run span
#[inline]
pub(crate) fn fetch_logs(what: &'static str, address: Address, topic0: B256) -> Span {
    tracing::debug_span!(
        "snapshot.fetch_logs",
        what = what,
        address = %address,
        topic0 = %topic0,
    )
}

/// Create span for the mint pass.
///
/// Parent: snapshot_run span
/// Children: resolve_transaction spans (one per mint log)
#[inline]
pub(crate) fn mint_pass(events: usize) -> Span {
    tracing::info_span!("snapshot.mint_pass", events = events)
}

/// Create span for the transfer pass.
///
/// Parent: snapshot_run span
/// Children: resolve_transaction spans (one per transfer log)
#[inline]
pub(crate) fn transfer_pass(events: usize) -> Span {
    tracing::info_span!("snapshot.transfer_pass", events = events)
}

/// Create span for resolving the transaction behind one log.
///
/// Parent: mint_pass or transfer_pass span
/// Children: RPC calls for transaction and receipt retrieval
#[inline]
pub(crate) fn resolve_transaction(tx_hash: TxHash, log_index: u64) -> Span {
    tracing::trace_span!(
        "snapshot.resolve_transaction",
        tx_hash = %tx_hash,
        log_index = log_index,
    )
}
