// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Retry with exponential backoff for both log sources.
//!
//! [`RetryLayer`] plugs into the alloy transport stack so every JSON-RPC
//! request of the snapshot (log chunks, transactions, receipts) is retried on
//! transient failures. [`retry_with_backoff`] applies the same policy to
//! plain async calls such as the Etherscan log API, which is not a JSON-RPC
//! endpoint.
//!
//! Both use the same schedule:
//!
//! ```text
//! delay = min(base_delay * 2^attempt, max_delay)
//! ```

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use alloy_json_rpc::{RequestPacket, ResponsePacket, RpcError};
use alloy_transport::TransportError;
use tower::Layer;
use tracing::{debug, warn};

/// Default maximum number of retry attempts.
const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay for exponential backoff (250ms).
const DEFAULT_BASE_DELAY_MS: u64 = 250;
/// Default maximum delay between retries (30 seconds).
const DEFAULT_MAX_DELAY_MS: u64 = 30_000;

/// Configuration for retry behavior.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial request).
    pub max_retries: u32,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryConfig {
    /// Default schedule with a custom retry budget
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Delay before retry number `attempt + 1`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self)
    }
}

/// A Tower layer retrying transient JSON-RPC failures.
///
/// # Example
///
/// ```rust,ignore
/// use refund_snapshot::transport::{RetryConfig, RetryLayer};
/// use alloy_rpc_client::ClientBuilder;
///
/// let client = ClientBuilder::default()
///     .layer(RetryLayer::from_config(RetryConfig::with_max_retries(8)))
///     .http(rpc_url);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RetryLayer {
    config: Arc<RetryConfig>,
}

impl RetryLayer {
    /// Creates a retry layer with the default schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a retry layer with the given schedule.
    pub fn from_config(config: RetryConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The schedule used by this layer
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = RetryService<S>;

    fn layer(&self, service: S) -> Self::Service {
        RetryService {
            service,
            config: self.config.clone(),
        }
    }
}

/// Service produced by [`RetryLayer`].
#[derive(Clone, Debug)]
pub struct RetryService<S> {
    service: S,
    config: Arc<RetryConfig>,
}

impl<S> tower::Service<RequestPacket> for RetryService<S>
where
    S: tower::Service<RequestPacket, Response = ResponsePacket, Error = TransportError>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = ResponsePacket;
    type Error = TransportError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&mut self, request: RequestPacket) -> Self::Future {
        let service = self.service.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let outcome = retry_with_backoff(&config, "json-rpc", move || {
                let mut service = service.clone();
                let request = request.clone();
                async move {
                    service.call(request).await.map_err(|error| {
                        if is_retryable_error(&error) {
                            Attempt::Transient(error)
                        } else {
                            Attempt::Permanent(error)
                        }
                    })
                }
            })
            .await;

            outcome.map_err(RetryError::into_inner)
        })
    }
}

/// Classification of a failed attempt.
#[derive(Debug)]
pub enum Attempt<E> {
    /// Worth retrying (rate limit, timeout, 5xx)
    Transient(E),
    /// Retrying cannot help
    Permanent(E),
}

/// Failure of [`retry_with_backoff`].
#[derive(Debug)]
pub enum RetryError<E> {
    /// A permanent error, returned without retrying
    Permanent(E),
    /// The retry budget ran out; holds the last transient error
    Exhausted {
        /// Last error observed
        last: E,
        /// Number of attempts made, including the first
        attempts: u32,
    },
}

impl<E> RetryError<E> {
    /// The underlying error
    pub fn into_inner(self) -> E {
        match self {
            Self::Permanent(error) | Self::Exhausted { last: error, .. } => error,
        }
    }
}

/// Run `call` until it succeeds, fails permanently or exhausts the budget.
///
/// Transient failures are retried after [`RetryConfig::backoff`].
pub async fn retry_with_backoff<T, E, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    mut call: F,
) -> Result<T, RetryError<E>>
where
    E: std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Attempt<E>>>,
{
    let mut attempt = 0u32;
    loop {
        match call().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(operation, attempt, "Request succeeded after retry");
                }
                return Ok(value);
            }
            Err(Attempt::Permanent(error)) => {
                debug!(operation, error = %error, "Non-retryable error, not retrying");
                return Err(RetryError::Permanent(error));
            }
            Err(Attempt::Transient(error)) => {
                if attempt >= config.max_retries {
                    warn!(
                        operation,
                        error = %error,
                        attempts = attempt + 1,
                        "Max retries exceeded"
                    );
                    return Err(RetryError::Exhausted {
                        last: error,
                        attempts: attempt + 1,
                    });
                }

                let delay = calculate_backoff(attempt, config);
                warn!(
                    operation,
                    error = %error,
                    attempt = attempt + 1,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis(),
                    "Retryable error, backing off"
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

fn calculate_backoff(attempt: u32, config: &RetryConfig) -> Duration {
    let multiplier = 2u64.saturating_pow(attempt);
    let delay_ms = config
        .base_delay
        .as_millis()
        .saturating_mul(multiplier as u128);
    let capped_delay_ms = delay_ms.min(config.max_delay.as_millis()) as u64;
    Duration::from_millis(capped_delay_ms)
}

/// Transient JSON-RPC failures: transport errors flagged retryable by alloy
/// (connection, 429, 5xx), garbled or null responses, and error responses
/// with a retryable code.
fn is_retryable_error(error: &TransportError) -> bool {
    match error {
        RpcError::Transport(kind) => kind.is_retry_err(),
        RpcError::SerError(_) => false,
        RpcError::DeserError { .. } => true,
        RpcError::ErrorResp(err) => err.is_retry_err(),
        RpcError::NullResp => true,
        _ => false,
    }
}
