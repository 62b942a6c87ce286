//! Configuration for snapshot runs
//!
//! [`SnapshotConfig`] holds the contracts and topics that define the drop,
//! the unit price, the block range to replay and the knobs of the pipeline.
//! Defaults are the production values from [`constants`].
//!
//! # Example: Using defaults
//!
//! ```rust
//! use refund_snapshot::SnapshotConfig;
//!
//! let config = SnapshotConfig::default();
//! assert_eq!(config.from_block, 0);
//! ```
//!
//! # Example: Custom configuration
//!
//! ```rust
//! use refund_snapshot::SnapshotConfigBuilder;
//!
//! let config = SnapshotConfigBuilder::new()
//!     .from_block(13_000_000)
//!     .resolve_concurrency(16)
//!     .strict_non_negative(true)
//!     .build();
//! assert_eq!(config.resolve_concurrency, 16);
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use alloy_chains::NamedChain;
use alloy_primitives::{Address, BlockNumber, B256};

use crate::errors::ConfigError;
use crate::types::WeiAmount;

pub mod constants;

/// Default number of transaction resolutions in flight per pass.
const DEFAULT_RESOLVE_CONCURRENCY: usize = 8;
/// Default block span of one `eth_getLogs` request.
const DEFAULT_LOG_CHUNK_SIZE: u64 = 10_000;

/// Configuration of one snapshot run
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Chain the contracts live on (selects the Etherscan chain id)
    pub chain: NamedChain,

    /// Sale contract emitting the mint event
    pub minting_contract: Address,

    /// Token contract emitting `TransferSingle`
    pub token_contract: Address,

    /// Sender of the initial distribution; its transfers are ignored
    pub deployer: Address,

    /// topic0 of the mint event
    pub mint_topic: B256,

    /// topic0 of the transfer event
    pub transfer_topic: B256,

    /// topic0 of the marketplace purchase log
    pub marketplace_topic: B256,

    /// Price of one unit
    pub unit_price: WeiAmount,

    /// Decimal places of refund amounts
    pub refund_decimals: i64,

    /// First block replayed
    /// Default: 0
    pub from_block: BlockNumber,

    /// Last block replayed, `None` for the chain head
    pub to_block: Option<BlockNumber>,

    /// Transactions resolved concurrently within a pass
    /// Default: 8
    pub resolve_concurrency: usize,

    /// Block span of one `eth_getLogs` request
    /// Default: 10,000
    pub log_chunk_size: u64,

    /// Abort when an address ends the run with a negative balance
    /// Default: false (negative balances are only reported)
    pub strict_non_negative: bool,

    /// Directory receiving the artifacts
    /// Default: current directory
    pub output_dir: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            chain: NamedChain::Mainnet,
            minting_contract: constants::contracts::MINTING_CONTRACT,
            token_contract: constants::contracts::TOKEN_CONTRACT,
            deployer: constants::contracts::DEPLOYER,
            mint_topic: constants::topics::MINT,
            transfer_topic: constants::topics::TRANSFER_SINGLE,
            marketplace_topic: constants::topics::MARKETPLACE_PURCHASE,
            unit_price: WeiAmount::from(constants::UNIT_PRICE_WEI),
            refund_decimals: constants::REFUND_DECIMALS,
            from_block: 0,
            to_block: None,
            resolve_concurrency: DEFAULT_RESOLVE_CONCURRENCY,
            log_chunk_size: DEFAULT_LOG_CHUNK_SIZE,
            strict_non_negative: false,
            output_dir: PathBuf::from("."),
        }
    }
}

impl SnapshotConfig {
    /// Build a configuration from environment variables on top of the
    /// defaults.
    ///
    /// | variable | field |
    /// |---|---|
    /// | `SNAPSHOT_OUTPUT_DIR` | `output_dir` |
    /// | `SNAPSHOT_FROM_BLOCK` | `from_block` |
    /// | `SNAPSHOT_TO_BLOCK` | `to_block` |
    /// | `SNAPSHOT_CONCURRENCY` | `resolve_concurrency` |
    /// | `SNAPSHOT_LOG_CHUNK_SIZE` | `log_chunk_size` |
    /// | `SNAPSHOT_STRICT` | `strict_non_negative` |
    /// | `SNAPSHOT_UNIT_PRICE_ETH` | `unit_price` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut builder = SnapshotConfigBuilder::new();

        if let Some(dir) = env_var("SNAPSHOT_OUTPUT_DIR") {
            builder = builder.output_dir(dir);
        }
        if let Some(block) = env_parse::<u64>("SNAPSHOT_FROM_BLOCK")? {
            builder = builder.from_block(block);
        }
        if let Some(block) = env_parse::<u64>("SNAPSHOT_TO_BLOCK")? {
            builder = builder.to_block(block);
        }
        if let Some(concurrency) = env_parse::<usize>("SNAPSHOT_CONCURRENCY")? {
            builder = builder.resolve_concurrency(concurrency);
        }
        if let Some(size) = env_parse::<u64>("SNAPSHOT_LOG_CHUNK_SIZE")? {
            builder = builder.log_chunk_size(size);
        }
        if let Some(strict) = env_parse::<bool>("SNAPSHOT_STRICT")? {
            builder = builder.strict_non_negative(strict);
        }
        if let Some(price) = env_var("SNAPSHOT_UNIT_PRICE_ETH") {
            let price = WeiAmount::from_ether_str(&price).ok_or_else(|| {
                ConfigError::invalid("SNAPSHOT_UNIT_PRICE_ETH", "expected a decimal ether amount")
            })?;
            builder = builder.unit_price(price);
        }

        builder.try_build()
    }

    /// Check the invariants the passes rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unit_price.is_zero() {
            return Err(ConfigError::invalid("unit_price", "must be non-zero"));
        }
        if self.resolve_concurrency == 0 {
            return Err(ConfigError::invalid("resolve_concurrency", "must be at least 1"));
        }
        if self.log_chunk_size == 0 {
            return Err(ConfigError::invalid("log_chunk_size", "must be at least 1"));
        }
        if let Some(to_block) = self.to_block {
            if to_block < self.from_block {
                return Err(ConfigError::invalid(
                    "to_block",
                    format!("{to_block} is before from_block {}", self.from_block),
                ));
            }
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    dotenvy::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(name)
        .map(|raw| raw.trim().parse::<T>().map_err(|e| ConfigError::invalid(name, e)))
        .transpose()
}

/// Builder for [`SnapshotConfig`]
///
/// # Example
///
/// ```rust
/// use refund_snapshot::SnapshotConfigBuilder;
/// use alloy_primitives::address;
///
/// let config = SnapshotConfigBuilder::new()
///     .deployer(address!("1111111111111111111111111111111111111111"))
///     .output_dir("snapshots")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct SnapshotConfigBuilder {
    config: SnapshotConfig,
}

impl SnapshotConfigBuilder {
    /// Create a new builder starting from the production defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chain
    pub fn chain(mut self, chain: NamedChain) -> Self {
        self.config.chain = chain;
        self
    }

    /// Set the sale contract
    pub fn minting_contract(mut self, address: Address) -> Self {
        self.config.minting_contract = address;
        self
    }

    /// Set the token contract
    pub fn token_contract(mut self, address: Address) -> Self {
        self.config.token_contract = address;
        self
    }

    /// Set the deployer whose transfers are ignored
    pub fn deployer(mut self, address: Address) -> Self {
        self.config.deployer = address;
        self
    }

    /// Set the mint event topic
    pub fn mint_topic(mut self, topic: B256) -> Self {
        self.config.mint_topic = topic;
        self
    }

    /// Set the transfer event topic
    pub fn transfer_topic(mut self, topic: B256) -> Self {
        self.config.transfer_topic = topic;
        self
    }

    /// Set the marketplace purchase topic
    pub fn marketplace_topic(mut self, topic: B256) -> Self {
        self.config.marketplace_topic = topic;
        self
    }

    /// Set the unit price
    pub fn unit_price(mut self, price: WeiAmount) -> Self {
        self.config.unit_price = price;
        self
    }

    /// Set the first replayed block
    pub fn from_block(mut self, block: BlockNumber) -> Self {
        self.config.from_block = block;
        self
    }

    /// Set the last replayed block
    pub fn to_block(mut self, block: BlockNumber) -> Self {
        self.config.to_block = Some(block);
        self
    }

    /// Set how many transactions are resolved concurrently
    pub fn resolve_concurrency(mut self, concurrency: usize) -> Self {
        self.config.resolve_concurrency = concurrency;
        self
    }

    /// Set the block span of one `eth_getLogs` request
    pub fn log_chunk_size(mut self, size: u64) -> Self {
        self.config.log_chunk_size = size;
        self
    }

    /// Abort on negative final balances
    pub fn strict_non_negative(mut self, strict: bool) -> Self {
        self.config.strict_non_negative = strict;
        self
    }

    /// Set the artifact directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Build the configuration without validation
    pub fn build(self) -> SnapshotConfig {
        self.config
    }

    /// Build and validate the configuration
    pub fn try_build(self) -> Result<SnapshotConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_defaults_are_production_values() {
        let config = SnapshotConfig::default();

        assert_eq!(config.chain, NamedChain::Mainnet);
        assert_eq!(config.minting_contract, constants::contracts::MINTING_CONTRACT);
        assert_eq!(config.token_contract, constants::contracts::TOKEN_CONTRACT);
        assert_eq!(config.deployer, constants::contracts::DEPLOYER);
        assert_eq!(config.unit_price, WeiAmount::from(80_000_000_000_000_000u64));
        assert_eq!(config.refund_decimals, 2);
        assert_eq!(config.to_block, None);
        assert!(!config.strict_non_negative);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let deployer = address!("1111111111111111111111111111111111111111");
        let config = SnapshotConfigBuilder::new()
            .deployer(deployer)
            .from_block(100)
            .to_block(200)
            .resolve_concurrency(2)
            .output_dir("/tmp/out")
            .build();

        assert_eq!(config.deployer, deployer);
        assert_eq!(config.from_block, 100);
        assert_eq!(config.to_block, Some(200));
        assert_eq!(config.resolve_concurrency, 2);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_zero_price_is_invalid() {
        let result = SnapshotConfigBuilder::new()
            .unit_price(WeiAmount::ZERO)
            .try_build();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "unit_price"));
    }

    #[test]
    fn test_zero_concurrency_is_invalid() {
        let result = SnapshotConfigBuilder::new().resolve_concurrency(0).try_build();
        assert!(result.is_err());
    }

    #[test]
    fn test_inverted_block_range_is_invalid() {
        let result = SnapshotConfigBuilder::new()
            .from_block(200)
            .to_block(100)
            .try_build();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "to_block"));
    }
}
