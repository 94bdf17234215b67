//! RPC Client Module - JSON-RPC over HTTP
//!
//! One provider per chain, built from the chain registry entry:
//! 1. Primary URL from env / registry file, public RPC as fallback
//! 2. Exponential backoff with jitter on timeouts, 429s and connect errors
//! 3. Gzip + User-Agent headers
//! 4. Node-side JSON-RPC errors are returned as-is (never retried); a
//!    reverted `eth_call` carries its revert data in the error payload

use alloy_primitives::{Address, Bytes, B256, U64};
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::config::{AppConfig, ChainInfo};
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{FetchedReceipt, FetchedTransaction};
use crate::utils::constants::{get_public_rpc_fallback, USER_AGENT as USER_AGENT_CONST};

/// Base retry delay in milliseconds
pub const BASE_RETRY_MS: u64 = 500;

/// Maximum retry delay in milliseconds
pub const MAX_RETRY_MS: u64 = 8000;

/// Jitter percentage for retry delay
pub const RETRY_JITTER_PERCENT: u64 = 20;

/// Delay before retry number `attempt` (1-based), jitter included
pub fn backoff_delay(attempt: u32) -> Duration {
    let base_delay = BASE_RETRY_MS.saturating_mul(2_u64.saturating_pow(attempt.saturating_sub(1)));
    let capped_delay = base_delay.min(MAX_RETRY_MS);

    // ±20% so parallel chain probes don't retry in lockstep
    let jitter_range = (capped_delay * RETRY_JITTER_PERCENT) / 100;
    let jitter: i64 =
        rand::thread_rng().gen_range(-(jitter_range as i64)..=(jitter_range as i64));
    Duration::from_millis((capped_delay as i64 + jitter).max(100) as u64)
}

/// Result of replaying a transaction with `eth_call`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Success(Bytes),
    Reverted { message: String, data: Option<Bytes> },
}

/// RPC Provider bound to one chain
#[derive(Clone)]
pub struct RpcProvider {
    /// Configured endpoint
    primary_url: String,
    /// Public endpoint, when it differs from the primary
    fallback_url: Option<String>,
    /// HTTP client with custom headers (gzip enabled)
    client: reqwest::Client,
    /// Chain name for logging
    network_name: String,
    max_retries: u32,
}

impl RpcProvider {
    /// Create a provider for a registry chain
    pub fn new(chain: &ChainInfo, config: &AppConfig) -> AppResult<Self> {
        if !chain.has_rpc() {
            return Err(AppError::invalid_config(format!(
                "no RPC endpoint configured for {}",
                chain.name
            )));
        }

        let fallback_url = get_public_rpc_fallback(chain.chain_id)
            .filter(|url| *url != chain.rpc_url)
            .map(String::from);

        let provider = Self {
            primary_url: chain.rpc_url.clone(),
            fallback_url,
            client: Self::build_client(config.rpc_timeout)?,
            network_name: chain.name.clone(),
            max_retries: config.rpc_max_retries.max(1),
        };
        debug!("🔌 RPC for {} at {}", provider.network_name, provider.masked_url());
        Ok(provider)
    }

    /// Build HTTP client with custom headers (gzip compression)
    fn build_client(timeout: Duration) -> AppResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorCode::ConfigInvalidValue, "failed to build HTTP client", e)
            })
    }

    /// Execute a JSON-RPC call; `null` results come back as `None`.
    /// Transport failures fall over to the public endpoint.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> AppResult<Result<Option<T>, RpcError>> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let primary_err = match self.call_with_retry(&self.primary_url, &payload).await {
            Ok(result) => return Ok(result),
            Err(e) => {
                warn!("⚠️ Primary RPC failed on {}: {}", self.network_name, e);
                e
            }
        };

        if let Some(ref fallback) = self.fallback_url {
            info!("🔄 Trying fallback RPC for {}", self.network_name);
            match self.call_with_retry(fallback, &payload).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    warn!("⚠️ Fallback RPC also failed: {}", e);
                }
            }
        }

        Err(primary_err)
    }

    /// Like `call`, but a node error becomes an `RPC_ERROR`
    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> AppResult<Option<T>> {
        self.call(method, params).await?.map_err(|e| {
            AppError::rpc_error(format!(
                "{} on {}: {} (code: {})",
                method, self.network_name, e.message, e.code
            ))
        })
    }

    /// Retry transient failures with exponential backoff
    async fn call_with_retry<T: DeserializeOwned>(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> AppResult<Result<Option<T>, RpcError>> {
        let mut attempt = 0;
        loop {
            match self.execute_call::<T>(url, payload).await {
                Ok(result) => return Ok(result),
                Err(e) if e.code.is_retryable() && attempt + 1 < self.max_retries => {
                    attempt += 1;
                    let delay = backoff_delay(attempt);
                    if e.code == ErrorCode::RpcRateLimited {
                        warn!("⏳ Rate limited on {}, backing off", self.network_name);
                    }
                    debug!(
                        "⏳ Retry {}/{} after {}ms: {}",
                        attempt + 1,
                        self.max_retries,
                        delay.as_millis(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Execute single RPC call
    async fn execute_call<T: DeserializeOwned>(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> AppResult<Result<Option<T>, RpcError>> {
        let response = self.client.post(url).json(payload).send().await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AppError::rpc_rate_limited());
        }
        if status.is_server_error() {
            return Err(AppError::rpc_connection_failed(format!("HTTP error: {}", status)));
        }
        if !status.is_success() {
            return Err(AppError::rpc_error(format!("HTTP error: {}", status)));
        }

        let body = response.bytes().await?;
        parse_response(&body)
    }

    pub async fn get_transaction_by_hash(&self, hash: B256) -> AppResult<Option<FetchedTransaction>> {
        self.request("eth_getTransactionByHash", serde_json::json!([hash]))
            .await
    }

    pub async fn get_transaction_receipt(&self, hash: B256) -> AppResult<Option<FetchedReceipt>> {
        self.request("eth_getTransactionReceipt", serde_json::json!([hash]))
            .await
    }

    /// Read-only call against the latest block
    pub async fn eth_call(&self, to: Address, data: &[u8]) -> AppResult<Bytes> {
        let params = serde_json::json!([{ "to": to, "data": Bytes::copy_from_slice(data) }, "latest"]);
        match self.call::<Bytes>("eth_call", params).await? {
            Ok(result) => Ok(result.unwrap_or_default()),
            Err(e) => Err(AppError::rpc_error(format!(
                "eth_call to {} reverted: {}",
                to, e.message
            ))),
        }
    }

    /// Re-run `tx` as an `eth_call` on the state it originally saw
    pub async fn replay_call(&self, tx: &FetchedTransaction) -> AppResult<CallOutcome> {
        let block = match tx.block_number {
            Some(n) if n > U64::ZERO => format!("0x{:x}", n - U64::from(1)),
            _ => "latest".to_string(),
        };
        let params = serde_json::json!([{
            "from": tx.from,
            "to": tx.to,
            "data": tx.input,
            "value": tx.value,
            "gas": tx.gas,
        }, block]);

        match self.call::<Bytes>("eth_call", params).await? {
            Ok(result) => Ok(CallOutcome::Success(result.unwrap_or_default())),
            Err(e) => Ok(CallOutcome::Reverted {
                data: e.revert_data(),
                message: e.message,
            }),
        }
    }

    /// Get RPC URL (masked for logging)
    pub fn masked_url(&self) -> String {
        mask_url(&self.primary_url)
    }
}

/// Hide API keys: everything after `/v2/` or `/v3/`
pub fn mask_url(url: &str) -> String {
    for marker in ["/v2/", "/v3/"] {
        if let Some((base, key)) = url.split_once(marker) {
            if !key.is_empty() {
                return format!("{}{}***HIDDEN***", base, marker);
            }
        }
    }
    url.to_string()
}

/// Node-side rate limits come back as errors so the retry loop backs off
fn parse_response<T: DeserializeOwned>(body: &[u8]) -> AppResult<Result<Option<T>, RpcError>> {
    let json: RpcResponse<T> = serde_json::from_slice(body)?;
    match json.error {
        Some(error) if error.is_rate_limit() => Err(AppError::rpc_rate_limited()),
        Some(error) => Ok(Err(error)),
        None => Ok(Ok(json.result)),
    }
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

/// JSON-RPC error structure
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    /// Check if this is a rate limit error (code -32005)
    pub fn is_rate_limit(&self) -> bool {
        self.code == -32005
            || (self.data.is_none() && self.message.to_lowercase().contains("rate limit"))
    }

    /// Revert payload. Geth puts the hex in `data`; some nodes nest it as
    /// `data.data` or only embed it in the message.
    pub fn revert_data(&self) -> Option<Bytes> {
        let from_value = |v: &serde_json::Value| v.as_str().and_then(|s| Bytes::from_str(s).ok());

        match &self.data {
            Some(serde_json::Value::String(_)) => self.data.as_ref().and_then(from_value),
            Some(serde_json::Value::Object(map)) => map.get("data").and_then(from_value),
            _ => self
                .message
                .split_whitespace()
                .find(|word| word.starts_with("0x") && word.len() > 10)
                .and_then(|word| Bytes::from_str(word).ok()),
        }
    }
}
