use std::process::ExitCode;

use refund_snapshot::bootstrap::run;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!("Refund snapshot failed: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}
