// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Etherscan log API source
//!
//! `module=logs&action=getLogs` returns at most `offset` records per call and
//! caps `page * offset`, so instead of page numbers the source walks a block
//! cursor: each full page restarts at the last block it contained. Pages are
//! sorted on arrival; records of the restarted block that were already
//! merged are dropped, and any other record behind the merged tail fails the
//! request instead of being lost.
//!
//! Rate-limit replies (`status: "0"` with a "rate limit" result) are retried
//! with the shared backoff schedule. "No records found" is an empty result,
//! not an error.

use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

use alloy_chains::NamedChain;
use alloy_primitives::{Address, Bytes, LogData, TxHash, B256};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, trace};

use super::{EventLog, EventSource, LogQuery};
use crate::errors::RpcError;
use crate::events::{sort_chronologically, EventPosition};
use crate::transport::{retry_with_backoff, Attempt, RetryConfig, RetryError};

/// Etherscan multichain API endpoint
pub const ETHERSCAN_API_URL: &str = "https://api.etherscan.io/v2/api";

const SERVICE: &str = "etherscan";
const DEFAULT_PAGE_SIZE: usize = 1_000;
const DEFAULT_REQUEST_INTERVAL_MS: u64 = 250;

/// Settings of the Etherscan client
#[derive(Debug, Clone)]
pub struct EtherscanConfig {
    /// API key
    pub api_key: String,
    /// Chain whose logs are requested
    pub chain: NamedChain,
    /// API endpoint
    pub base_url: String,
    /// Records per request
    pub page_size: usize,
    /// Pause between consecutive page requests
    pub request_interval: Duration,
    /// Retry schedule for rate-limit and transport failures
    pub retry: RetryConfig,
}

impl EtherscanConfig {
    /// Mainnet configuration with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            chain: NamedChain::Mainnet,
            base_url: ETHERSCAN_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_interval: Duration::from_millis(DEFAULT_REQUEST_INTERVAL_MS),
            retry: RetryConfig::default(),
        }
    }

    /// Select the chain
    pub fn with_chain(mut self, chain: NamedChain) -> Self {
        self.chain = chain;
        self
    }

    /// Override the retry schedule
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// [`EventSource`] backed by the Etherscan log API.
#[derive(Debug, Clone)]
pub struct EtherscanLogSource {
    client: reqwest::Client,
    config: EtherscanConfig,
}

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    status: String,
    message: String,
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EtherscanLog {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
    block_number: String,
    transaction_hash: TxHash,
    transaction_index: String,
    log_index: String,
}

impl EtherscanLog {
    fn into_event_log(self) -> Result<EventLog, RpcError> {
        let position = EventPosition::new(
            parse_quantity(&self.block_number)?,
            parse_quantity(&self.transaction_index)?,
            parse_quantity(&self.log_index)?,
        );
        let data = LogData::new(self.topics, self.data)
            .ok_or_else(|| RpcError::invalid_response(SERVICE, "log with more than 4 topics"))?;

        Ok(EventLog {
            transaction_hash: self.transaction_hash,
            position,
            address: self.address,
            data,
        })
    }
}

/// Parse an Etherscan quantity. Hex with `0x` prefix, where a bare `0x`
/// means zero; decimal otherwise.
fn parse_quantity(raw: &str) -> Result<u64, RpcError> {
    let parsed = match raw.strip_prefix("0x") {
        Some("") => Ok(0),
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse::<u64>(),
    };
    parsed.map_err(|e| RpcError::invalid_response(SERVICE, format!("bad quantity {raw:?}: {e}")))
}

/// What one page request came back with.
#[derive(Debug)]
enum PageReply {
    Logs(Vec<EventLog>),
    Empty,
}

fn interpret_response(response: EtherscanResponse) -> Result<PageReply, Attempt<RpcError>> {
    if response.status == "1" {
        let logs: Vec<EtherscanLog> = serde_json::from_value(response.result).map_err(|e| {
            Attempt::Permanent(RpcError::invalid_response(SERVICE, format!("unexpected result: {e}")))
        })?;
        return logs
            .into_iter()
            .map(EtherscanLog::into_event_log)
            .collect::<Result<Vec<_>, _>>()
            .map(PageReply::Logs)
            .map_err(Attempt::Permanent);
    }

    let detail = response
        .result
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| response.result.to_string());

    if response.message.starts_with("No records found") {
        return Ok(PageReply::Empty);
    }

    let error = RpcError::invalid_response(SERVICE, format!("{}: {detail}", response.message));
    if detail.to_ascii_lowercase().contains("rate limit") {
        Err(Attempt::Transient(error))
    } else {
        Err(Attempt::Permanent(error))
    }
}

/// Accumulates pages fetched with a restarting block cursor.
#[derive(Debug, Default)]
struct PageMerger {
    logs: Vec<EventLog>,
    /// Positions merged in the block of the last merged log
    boundary: BTreeSet<EventPosition>,
}

impl PageMerger {
    /// Sort `page` and append what was not merged before.
    ///
    /// # Errors
    ///
    /// [`RpcError::InvalidResponse`] if the page holds a log behind the merged
    /// tail that was never merged, i.e. an earlier page skipped it.
    fn merge(&mut self, mut page: Vec<EventLog>) -> Result<(), RpcError> {
        sort_chronologically(&mut page);

        for log in page {
            let tail = self.logs.last().map(|last| last.position);
            if let Some(tail) = tail.filter(|tail| log.position <= *tail) {
                if self.boundary.contains(&log.position) {
                    continue;
                }
                return Err(RpcError::invalid_response(
                    SERVICE,
                    format!(
                        "log {} of {} arrived after {tail}, which was already merged",
                        log.position, log.transaction_hash
                    ),
                ));
            }

            if tail.is_some_and(|tail| tail.block_number != log.position.block_number) {
                self.boundary.clear();
            }
            self.boundary.insert(log.position);
            self.logs.push(log);
        }
        Ok(())
    }

    fn into_logs(self) -> Vec<EventLog> {
        self.logs
    }
}

/// Walk the block cursor from `from_block`, asking `fetch_page` for one page
/// per step, until a page comes back short or empty.
async fn collect_pages<F, Fut>(
    from_block: u64,
    page_size: usize,
    request_interval: Duration,
    mut fetch_page: F,
) -> Result<Vec<EventLog>, RpcError>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<PageReply, RpcError>>,
{
    let mut merger = PageMerger::default();
    let mut cursor = from_block;

    loop {
        let page = match fetch_page(cursor).await? {
            PageReply::Logs(page) => page,
            PageReply::Empty => break,
        };
        let page_len = page.len();
        let blocks = page.iter().map(|log| log.position.block_number);
        let (first_block, last_block) = match (blocks.clone().min(), blocks.max()) {
            (Some(first), Some(last)) => (first, last),
            _ => break,
        };
        trace!(from_block = cursor, count = page_len, last_block, "Fetched Etherscan page");

        merger.merge(page)?;

        if page_len < page_size {
            break;
        }
        if first_block == last_block && last_block == cursor {
            return Err(RpcError::invalid_response(
                SERVICE,
                format!("block {cursor} holds more than {page_size} matching logs; raise the page size"),
            ));
        }

        cursor = last_block;
        tokio::time::sleep(request_interval).await;
    }

    Ok(merger.into_logs())
}

impl EtherscanLogSource {
    /// Create a source with its own HTTP client
    pub fn new(config: EtherscanConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    async fn request_page(&self, query: &LogQuery, from_block: u64) -> Result<PageReply, Attempt<RpcError>> {
        let to_block = query
            .to_block
            .map(|block| block.to_string())
            .unwrap_or_else(|| "latest".to_string());
        let chain_id = self.config.chain as u64;

        let params = [
            ("chainid", chain_id.to_string()),
            ("module", "logs".to_string()),
            ("action", "getLogs".to_string()),
            ("address", query.address.to_string()),
            ("topic0", query.topic0.to_string()),
            ("fromBlock", from_block.to_string()),
            ("toBlock", to_block),
            ("page", "1".to_string()),
            ("offset", self.config.page_size.to_string()),
            ("apikey", self.config.api_key.clone()),
        ];

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&params)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(classify_transport_error)?;

        let body: EtherscanResponse = response.json().await.map_err(classify_transport_error)?;
        interpret_response(body)
    }
}

fn classify_transport_error(error: reqwest::Error) -> Attempt<RpcError> {
    let transient = error.is_timeout()
        || error.is_connect()
        || error.is_decode()
        || error
            .status()
            .is_some_and(|status| status.is_server_error() || status.as_u16() == 429);

    let error = RpcError::chain_connection_failed("etherscan getLogs", error);
    if transient {
        Attempt::Transient(error)
    } else {
        Attempt::Permanent(error)
    }
}

#[async_trait]
impl EventSource for EtherscanLogSource {
    async fn get_logs(&self, query: &LogQuery) -> Result<Vec<EventLog>, RpcError> {
        let fetch_page = move |cursor: u64| async move {
            retry_with_backoff(&self.config.retry, "etherscan getLogs", || {
                self.request_page(query, cursor)
            })
            .await
            .map_err(|error| match error {
                RetryError::Permanent(error) => error,
                RetryError::Exhausted { last, attempts } => {
                    RpcError::source_unavailable(SERVICE, attempts, last.to_string())
                }
            })
        };

        let logs = collect_pages(
            query.from_block,
            self.config.page_size,
            self.config.request_interval,
            fetch_page,
        )
        .await?;

        debug!(query = %query, count = logs.len(), "Fetched logs from Etherscan");
        Ok(logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn log_at(block: u64, log_index: u64) -> EventLog {
        EventLog {
            transaction_hash: B256::with_last_byte(log_index as u8),
            position: EventPosition::new(block, 0, log_index),
            address: Address::ZERO,
            data: LogData::new_unchecked(vec![B256::ZERO], Bytes::new()),
        }
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x10").unwrap(), 16);
        assert_eq!(parse_quantity("0x").unwrap(), 0);
        assert_eq!(parse_quantity("42").unwrap(), 42);
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn test_successful_response() {
        let response: EtherscanResponse = serde_json::from_value(json!({
            "status": "1",
            "message": "OK",
            "result": [{
                "address": "0x5719daca15f885d49bf98ea2a9d03c5d97528d44",
                "topics": ["0xc3d58168c5ae7397731d063d5bbf3d657854427343f4c083240f7aacaa2d0f62"],
                "data": "0x",
                "blockNumber": "0xc65d40",
                "timeStamp": "0x6123e5a1",
                "gasPrice": "0x1",
                "gasUsed": "0x1",
                "logIndex": "0x",
                "transactionHash": "0x1111111111111111111111111111111111111111111111111111111111111111",
                "transactionIndex": "0x1f"
            }]
        }))
        .unwrap();

        match interpret_response(response) {
            Ok(PageReply::Logs(logs)) => {
                assert_eq!(logs.len(), 1);
                assert_eq!(logs[0].position, EventPosition::new(13_000_000, 31, 0));
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[test]
    fn test_no_records_is_empty() {
        let response: EtherscanResponse = serde_json::from_value(json!({
            "status": "0",
            "message": "No records found",
            "result": []
        }))
        .unwrap();
        assert!(matches!(interpret_response(response), Ok(PageReply::Empty)));
    }

    #[test]
    fn test_rate_limit_is_transient() {
        let response: EtherscanResponse = serde_json::from_value(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Max rate limit reached"
        }))
        .unwrap();
        assert!(matches!(interpret_response(response), Err(Attempt::Transient(_))));
    }

    #[test]
    fn test_invalid_key_is_permanent() {
        let response: EtherscanResponse = serde_json::from_value(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Invalid API Key"
        }))
        .unwrap();
        assert!(matches!(interpret_response(response), Err(Attempt::Permanent(_))));
    }

    fn positions(logs: &[EventLog]) -> Vec<(u64, u64)> {
        logs.iter().map(|l| (l.position.block_number, l.log_index())).collect()
    }

    /// Serves `pages` in order and records the cursor of every request.
    fn serve(
        pages: Vec<PageReply>,
        cursors: &mut Vec<u64>,
    ) -> impl FnMut(u64) -> std::future::Ready<Result<PageReply, RpcError>> + '_ {
        let mut pages = std::collections::VecDeque::from(pages);
        move |cursor| {
            cursors.push(cursor);
            std::future::ready(
                pages
                    .pop_front()
                    .ok_or_else(|| RpcError::invalid_response(SERVICE, "no more fixture pages")),
            )
        }
    }

    #[test]
    fn test_page_boundary_has_no_duplicates_or_gaps() {
        let mut merger = PageMerger::default();

        // First page ends inside block 11; the next page restarts at block 11.
        merger.merge(vec![log_at(10, 0), log_at(10, 3), log_at(11, 1)]).unwrap();
        merger.merge(vec![log_at(11, 1), log_at(11, 4), log_at(12, 0)]).unwrap();

        assert_eq!(
            positions(&merger.into_logs()),
            vec![(10, 0), (10, 3), (11, 1), (11, 4), (12, 0)]
        );
    }

    #[test]
    fn test_unordered_page_keeps_every_log() {
        let mut merger = PageMerger::default();
        merger.merge(vec![log_at(11, 1), log_at(10, 0), log_at(10, 3)]).unwrap();

        assert_eq!(positions(&merger.into_logs()), vec![(10, 0), (10, 3), (11, 1)]);
    }

    #[test]
    fn test_page_behind_merged_tail_is_rejected() {
        let mut merger = PageMerger::default();
        merger.merge(vec![log_at(10, 0), log_at(11, 1)]).unwrap();

        // (10, 2) was never merged and sits before the tail.
        let result = merger.merge(vec![log_at(10, 2), log_at(12, 0)]);
        assert!(matches!(result, Err(RpcError::InvalidResponse { .. })));
    }

    #[tokio::test]
    async fn test_cursor_restarts_at_last_block_of_full_page() {
        let mut cursors = Vec::new();
        let pages = vec![
            PageReply::Logs(vec![log_at(10, 0), log_at(11, 0)]),
            PageReply::Logs(vec![log_at(11, 0), log_at(12, 0)]),
            PageReply::Logs(vec![log_at(12, 0)]),
        ];

        let logs = collect_pages(10, 2, Duration::ZERO, serve(pages, &mut cursors))
            .await
            .unwrap();

        assert_eq!(positions(&logs), vec![(10, 0), (11, 0), (12, 0)]);
        assert_eq!(cursors, vec![10, 11, 12]);
    }

    #[tokio::test]
    async fn test_short_page_ends_paging() {
        let mut cursors = Vec::new();
        let pages = vec![PageReply::Logs(vec![log_at(10, 0), log_at(15, 2)])];

        let logs = collect_pages(5, 3, Duration::ZERO, serve(pages, &mut cursors))
            .await
            .unwrap();

        assert_eq!(logs.len(), 2);
        assert_eq!(cursors, vec![5]);
    }

    #[tokio::test]
    async fn test_no_records_ends_paging() {
        let mut cursors = Vec::new();
        let pages = vec![
            PageReply::Logs(vec![log_at(10, 0), log_at(11, 0)]),
            PageReply::Empty,
        ];

        let logs = collect_pages(10, 2, Duration::ZERO, serve(pages, &mut cursors))
            .await
            .unwrap();

        assert_eq!(logs.len(), 2);
        assert_eq!(cursors, vec![10, 11]);
    }

    #[tokio::test]
    async fn test_full_page_within_one_block_fails() {
        let mut cursors = Vec::new();
        let pages = vec![PageReply::Logs(vec![log_at(10, 0), log_at(10, 1)])];

        let result = collect_pages(10, 2, Duration::ZERO, serve(pages, &mut cursors)).await;

        match result {
            Err(RpcError::InvalidResponse { details, .. }) => {
                assert!(details.contains("block 10 holds more than 2"));
            }
            other => panic!("expected an oversized block error, got {other:?}"),
        }
        assert_eq!(cursors, vec![10]);
    }
}
