use dotenvy::dotenv;
use tracing::{info, warn};

use crate::{
    errors::ConfigError,
    provider::{create_http_provider, ProviderConfig},
    snapshot::SnapshotWriter,
    source::{EtherscanConfig, EtherscanLogSource, RpcChainSource},
    transport::RetryConfig,
    Snapshot, SnapshotConfig, SnapshotPipeline,
};

/// Default retry budget of the JSON-RPC transport.
const DEFAULT_RPC_MAX_RETRIES: u32 = 3;

/// Main entry point for the application.
pub async fn run() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let rpc_url = dotenvy::var("HTTP_PROVIDER").map_err(|_| ConfigError::missing("HTTP_PROVIDER"))?;
    let max_retries = match dotenvy::var("RPC_MAX_RETRIES") {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::invalid("RPC_MAX_RETRIES", e))?,
        Err(_) => DEFAULT_RPC_MAX_RETRIES,
    };
    let retry = RetryConfig::with_max_retries(max_retries);

    let config = SnapshotConfig::from_env()?;

    // Transactions and receipts always come from the node
    let provider = create_http_provider(ProviderConfig::new(rpc_url).with_retry(retry.clone()))?;
    let chain = RpcChainSource::new(provider, config.log_chunk_size);
    let writer = SnapshotWriter::new(&config.output_dir);

    let snapshot = match dotenvy::var("ETHERSCAN_API_KEY").ok().filter(|key| !key.is_empty()) {
        Some(api_key) => {
            info!("Reading event logs from Etherscan");
            let etherscan = EtherscanLogSource::new(
                EtherscanConfig::new(api_key)
                    .with_chain(config.chain)
                    .with_retry(retry),
            );
            SnapshotPipeline::new(&config, &etherscan, &chain)
                .with_writer(writer)
                .run()
                .await?
        }
        None => {
            info!("ETHERSCAN_API_KEY not set, reading event logs over JSON-RPC");
            SnapshotPipeline::new(&config, &chain, &chain)
                .with_writer(writer)
                .run()
                .await?
        }
    };

    report(&snapshot);
    Ok(())
}

fn report(snapshot: &Snapshot) {
    let negatives = snapshot.negative_addresses();
    if !negatives.is_empty() {
        warn!(
            count = negatives.len(),
            "Addresses with negative balances are included in the refund files"
        );
    }

    for path in &snapshot.artifacts {
        info!(path = %path.display(), "Artifact");
    }
    info!(
        refunds = snapshot.refunds.len(),
        deployer_transfers = snapshot.transfers.deployer,
        "Done"
    );
}
