// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Errors raised while persisting snapshot artifacts.

use std::path::PathBuf;

/// Failure to write one of the snapshot files.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// Filesystem failure.
    #[error("I/O error on {path}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failure.
    #[error("Failed to serialize {path}")]
    Serialize {
        /// Target file
        path: PathBuf,
        /// The underlying error
        #[source]
        source: serde_json::Error,
    },

    /// An artifact read back from disk has unexpected content.
    #[error("Invalid content in {path}: {details}")]
    Invalid {
        /// File involved
        path: PathBuf,
        /// What was wrong
        details: String,
    },

    /// A value cannot be represented as a JSON number.
    #[error("Value {value} for {address} is not representable as a JSON number")]
    NonFiniteNumber {
        /// Checksummed address of the entry
        address: String,
        /// The value that failed to convert
        value: String,
    },
}

impl ArtifactError {
    /// Helper to create an `Io` error for a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArtifactError::Io {
            path: path.into(),
            source,
        }
    }
}
