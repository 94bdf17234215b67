//! Token metadata lookup
//!
//! `TokenResolver` answers `(chain, address) -> TokenInfo`:
//! zero address -> native currency (no network), then the shared cache,
//! then a `TokenSource` (ERC-20 `name` / `symbol` / `decimals` over RPC).

use alloy_primitives::{Address, B256};
use alloy_sol_types::SolCall;
use dashmap::DashMap;
use futures_util::future::try_join3;
use std::future::Future;
use tracing::{debug, warn};

use crate::core::abi::{IERC20Bytes32, IERC20Metadata};
use crate::models::config::{AppConfig, ChainInfo};
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::TokenInfo;
use crate::providers::rpc::RpcProvider;
use crate::utils::cache::{CacheStats, TokenCache};

/// Where token metadata comes from on a cache miss
pub trait TokenSource: Send + Sync + 'static {
    fn fetch(
        &self,
        chain: &ChainInfo,
        address: Address,
    ) -> impl Future<Output = AppResult<TokenInfo>> + Send;
}

/// Reads ERC-20 metadata with `eth_call`. One provider per chain, created
/// on first use.
pub struct RpcTokenSource {
    config: AppConfig,
    providers: DashMap<u64, RpcProvider>,
}

impl RpcTokenSource {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            providers: DashMap::new(),
        }
    }

    fn provider(&self, chain: &ChainInfo) -> AppResult<RpcProvider> {
        if let Some(provider) = self.providers.get(&chain.chain_id) {
            return Ok(provider.clone());
        }
        let provider = RpcProvider::new(chain, &self.config)?;
        self.providers.insert(chain.chain_id, provider.clone());
        Ok(provider)
    }
}

impl TokenSource for RpcTokenSource {
    async fn fetch(&self, chain: &ChainInfo, address: Address) -> AppResult<TokenInfo> {
        let provider = self.provider(chain)?;

        let (name, symbol, decimals) = try_join3(
            provider.eth_call(address, &IERC20Metadata::nameCall {}.abi_encode()),
            provider.eth_call(address, &IERC20Metadata::symbolCall {}.abi_encode()),
            provider.eth_call(address, &IERC20Metadata::decimalsCall {}.abi_encode()),
        )
        .await
        .map_err(|e| metadata_error(chain, address, e))?;

        let decimals = IERC20Metadata::decimalsCall::abi_decode_returns(&decimals, false)
            .map_err(|e| {
                AppError::token_not_found(format!("{} on {}: decimals: {}", address, chain.name, e))
            })?
            ._0;

        Ok(TokenInfo {
            name: decode_name(&name).unwrap_or_default(),
            symbol: decode_symbol(&symbol).unwrap_or_else(|| {
                warn!("⚠️ Unreadable symbol for {} on {}", address, chain.name);
                "???".to_string()
            }),
            decimals,
            address: address.to_checksum(None),
        })
    }
}

/// Transport failures keep their code; a node refusing the call means the
/// address has no readable ERC-20 metadata.
fn metadata_error(chain: &ChainInfo, address: Address, e: AppError) -> AppError {
    let message = format!("{} on {}: {}", address, chain.name, e.message);
    match e.code {
        ErrorCode::RpcTimeout
        | ErrorCode::RpcConnectionFailed
        | ErrorCode::RpcRateLimited
        | ErrorCode::RpcInvalidResponse => AppError::new(e.code, message),
        _ => AppError::token_not_found(message),
    }
}

/// A bytes32 return is exactly one word; an ABI string needs at least two
/// (offset + length), so the word size decides which decoding applies.
fn decode_name(data: &[u8]) -> Option<String> {
    let name = if data.len() == 32 {
        IERC20Bytes32::nameCall::abi_decode_returns(data, false)
            .ok()
            .and_then(|r| bytes32_to_string(r._0))
    } else {
        IERC20Metadata::nameCall::abi_decode_returns(data, false)
            .ok()
            .map(|r| r._0)
    };
    name.filter(|n| !n.is_empty())
}

fn decode_symbol(data: &[u8]) -> Option<String> {
    let symbol = if data.len() == 32 {
        IERC20Bytes32::symbolCall::abi_decode_returns(data, false)
            .ok()
            .and_then(|r| bytes32_to_string(r._0))
    } else {
        IERC20Metadata::symbolCall::abi_decode_returns(data, false)
            .ok()
            .map(|r| r._0)
    };
    symbol.filter(|s| !s.is_empty())
}

/// Right-padded ASCII in a bytes32 (MKR-style tokens)
fn bytes32_to_string(word: B256) -> Option<String> {
    let end = word.iter().position(|b| *b == 0).unwrap_or(32);
    let text = std::str::from_utf8(&word[..end]).ok()?;
    (!text.is_empty()).then(|| text.to_string())
}

/// Cache + native sentinel in front of a `TokenSource`
pub struct TokenResolver<S> {
    source: S,
    cache: TokenCache,
}

impl<S: TokenSource> TokenResolver<S> {
    pub fn new(source: S) -> Self {
        Self::with_cache(source, TokenCache::new())
    }

    pub fn with_cache(source: S, cache: TokenCache) -> Self {
        Self { source, cache }
    }

    pub async fn resolve(&self, chain: &ChainInfo, address: Address) -> AppResult<TokenInfo> {
        if address.is_zero() {
            return Ok(TokenInfo::native(&chain.native_symbol));
        }
        if let Some(token) = self.cache.get(chain.chain_id, &address) {
            return Ok(token);
        }

        let token = self.source.fetch(chain, address).await?;
        debug!(
            "🪙 {} on {}: {} ({} decimals)",
            address, chain.name, token.symbol, token.decimals
        );
        self.cache.set(chain.chain_id, address, token.clone());
        Ok(token)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ChainRegistry;
    use crate::models::errors::ErrorKind;
    use alloy_primitives::U256;
    use alloy_sol_types::SolValue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    impl TokenSource for CountingSource {
        async fn fetch(&self, _chain: &ChainInfo, address: Address) -> AppResult<TokenInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(TokenInfo {
                name: "Tether USD".to_string(),
                symbol: "USDT".to_string(),
                decimals: 6,
                address: address.to_checksum(None),
            })
        }
    }

    fn resolver() -> TokenResolver<CountingSource> {
        TokenResolver::new(CountingSource {
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_zero_address_never_hits_source() {
        let registry = ChainRegistry::load().unwrap();
        let resolver = resolver();

        for chain in registry.all() {
            let token = resolver.resolve(chain, Address::ZERO).await.unwrap();
            assert_eq!(token.symbol, chain.native_symbol);
            assert_eq!(token.decimals, 18);
        }
        assert_eq!(resolver.source().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_lookup_is_cached() {
        let registry = ChainRegistry::load().unwrap();
        let chain = registry.by_chain_id(1).unwrap();
        let resolver = resolver();
        let usdt = Address::repeat_byte(0x44);

        resolver.resolve(chain, usdt).await.unwrap();
        let token = resolver.resolve(chain, usdt).await.unwrap();

        assert_eq!(token.symbol, "USDT");
        assert_eq!(resolver.source().calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cache_stats().hits, 1);
    }

    #[test]
    fn test_string_and_bytes32_symbols() {
        let as_string = "WETH".to_string().abi_encode();
        assert_eq!(decode_symbol(&as_string).as_deref(), Some("WETH"));

        let mut word = [0u8; 32];
        word[..3].copy_from_slice(b"MKR");
        assert_eq!(decode_symbol(&word).as_deref(), Some("MKR"));

        let mut word = [0u8; 32];
        word[..5].copy_from_slice(b"Maker");
        assert_eq!(decode_name(&word).as_deref(), Some("Maker"));
        let as_string = "Wrapped Ether".to_string().abi_encode();
        assert_eq!(decode_name(&as_string).as_deref(), Some("Wrapped Ether"));

        let decimals = U256::from(6u8).abi_encode();
        assert_eq!(
            IERC20Metadata::decimalsCall::abi_decode_returns(&decimals, false)
                .unwrap()
                ._0,
            6
        );
    }

    #[test]
    fn test_metadata_error_keeps_transport_failures() {
        let registry = ChainRegistry::load().unwrap();
        let chain = registry.by_chain_id(56).unwrap();
        let token = Address::repeat_byte(0x44);

        let timeout = metadata_error(chain, token, AppError::rpc_timeout("Request timeout"));
        assert_eq!(timeout.code, ErrorCode::RpcTimeout);
        assert_eq!(timeout.kind(), ErrorKind::Network);

        let refused = metadata_error(
            chain,
            token,
            AppError::rpc_connection_failed("Connection failed"),
        );
        assert_eq!(refused.code, ErrorCode::RpcConnectionFailed);

        let reverted = metadata_error(chain, token, AppError::rpc_error("eth_call reverted"));
        assert_eq!(reverted.code, ErrorCode::TokenNotFound);
        assert_eq!(reverted.kind(), ErrorKind::Lookup);
        assert!(reverted.message.contains("on bsc"));
    }

    #[test]
    fn test_empty_metadata_is_a_miss() {
        assert!(bytes32_to_string(B256::ZERO).is_none());
        assert!(decode_symbol(&[0u8; 32]).is_none());
        assert!(decode_symbol(&String::new().abi_encode()).is_none());
        assert!(decode_name(&[]).is_none());
    }
}
