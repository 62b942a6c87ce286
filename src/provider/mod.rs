// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! JSON-RPC provider construction
//!
//! The snapshot reads one Ethereum chain, so the provider is a plain
//! `RootProvider<Ethereum>` with the [`RetryLayer`] in its transport stack.
//! Recommended fillers are disabled: nothing is ever sent, only read.

mod config;

pub use config::ProviderConfig;

use alloy_network::Ethereum;
use alloy_provider::ProviderBuilder;
use alloy_rpc_client::ClientBuilder;

use crate::errors::RpcError;
use crate::transport::RetryLayer;

/// HTTP provider for Ethereum mainnet and compatible chains
pub type EthereumHttpProvider = alloy_provider::RootProvider<Ethereum>;

/// Create an HTTP provider with retries
///
/// # Examples
///
/// ```rust,ignore
/// use refund_snapshot::provider::{create_http_provider, ProviderConfig};
///
/// let provider = create_http_provider(ProviderConfig::new("https://eth.llamarpc.com"))?;
/// let head = provider.get_block_number().await?;
/// ```
///
/// # Errors
///
/// Returns [`RpcError::ProviderUrlInvalid`] if the URL cannot be parsed.
pub fn create_http_provider(config: ProviderConfig) -> Result<EthereumHttpProvider, RpcError> {
    let url: url::Url = config
        .url
        .parse()
        .map_err(|e| RpcError::ProviderUrlInvalid(format!("{e}")))?;

    let client = ClientBuilder::default()
        .layer(RetryLayer::from_config(config.retry))
        .http(url);

    Ok(ProviderBuilder::new()
        .disable_recommended_fillers()
        .network::<Ethereum>()
        .connect_client(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_rejected() {
        let result = create_http_provider(ProviderConfig::new("not a url"));
        assert!(matches!(result, Err(RpcError::ProviderUrlInvalid(_))));
    }

    #[tokio::test]
    async fn test_valid_url_builds_provider() {
        let result = create_http_provider(ProviderConfig::new("http://localhost:8545"));
        assert!(result.is_ok());
    }
}
