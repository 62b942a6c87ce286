// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Errors raised while reading configuration from the environment.

/// Invalid or missing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("Missing configuration: {field}")]
    Missing {
        /// Name of the missing variable
        field: String,
    },

    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {field}: {details}")]
    Invalid {
        /// Name of the variable
        field: String,
        /// Parse failure details
        details: String,
    },
}

impl ConfigError {
    /// Create a `Missing` error for a specific field.
    pub fn missing(field: impl Into<String>) -> Self {
        ConfigError::Missing {
            field: field.into(),
        }
    }

    /// Create an `Invalid` error for a specific field.
    pub fn invalid(field: impl Into<String>, details: impl std::fmt::Display) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            details: details.to_string(),
        }
    }
}
