//! Error types for the refund snapshot.
//!
//! Each concern has its own error type, and [`SnapshotError`] unifies them
//! for callers that only need to report a failure:
//!
//! - [`RpcError`] - log source and node failures
//! - [`DecodeError`] - ABI decoding of topics and log data
//! - [`ReconcileError`] - fatal failures of the mint and transfer passes
//! - [`ArtifactError`] - writing the snapshot files
//! - [`ConfigError`] - environment configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use refund_snapshot::{SnapshotError, bootstrap};
//!
//! async fn example() -> Result<(), SnapshotError> {
//!     let snapshot = pipeline.run().await?;
//!     writer.write_refunds(&snapshot.refunds).await?;
//!     // Errors automatically convert to SnapshotError via From implementations
//!     Ok(())
//! }
//! ```

mod artifact;
mod config;
mod decode;
mod reconcile;
mod rpc;

pub use artifact::ArtifactError;
pub use config::ConfigError;
pub use decode::DecodeError;
pub use reconcile::ReconcileError;
pub use rpc::RpcError;

/// Unified error type for a snapshot run.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Error from the reconciliation passes.
    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Error from writing artifacts.
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Error from configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from building collaborators.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),
}
