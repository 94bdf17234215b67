//! In-Memory Token Metadata Cache
//!
//! Thread-safe cache for resolved token metadata, shared by every chain
//! probe. Uses DashMap for concurrent access without a global lock.
//!
//! - Keyed by (chain id, address); `Address` is already case-normalized
//! - No expiry: name/symbol/decimals are immutable on-chain
//! - Entries are inserted whole, so a reader never sees a partial value
//! - Two tasks racing on the same key may both fetch; the later insert wins

use alloy_primitives::Address;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::models::types::TokenInfo;

#[derive(Clone, Default)]
pub struct TokenCache {
    store: Arc<DashMap<(u64, Address), TokenInfo>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached metadata for `address` on `chain_id`
    pub fn get(&self, chain_id: u64, address: &Address) -> Option<TokenInfo> {
        match self.store.get(&(chain_id, *address)) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("✅ CACHE HIT: {}:{}", chain_id, address);
                Some(entry.value().clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("📭 CACHE MISS: {}:{}", chain_id, address);
                None
            }
        }
    }

    /// Store a fully resolved entry
    pub fn set(&self, chain_id: u64, address: Address, token: TokenInfo) {
        debug!("💾 CACHE SET: {}:{} ({})", chain_id, address, token.symbol);
        self.store.insert((chain_id, address), token);
    }

    /// Hit/miss counters
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            entries: self.store.len(),
            hits,
            misses,
            hit_rate,
        }
    }
}

/// Cache statistics for the end-of-run log line
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn usdc() -> TokenInfo {
        TokenInfo {
            name: "USD Coin".to_string(),
            symbol: "USDC".to_string(),
            decimals: 6,
            address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
        }
    }

    #[test]
    fn test_cache_set_get() {
        let cache = TokenCache::new();
        let address = Address::from_str("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48").unwrap();

        cache.set(1, address, usdc());

        assert_eq!(cache.get(1, &address), Some(usdc()));
    }

    #[test]
    fn test_keys_are_per_chain() {
        let cache = TokenCache::new();
        let address = Address::from_str("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48").unwrap();

        cache.set(1, address, usdc());

        assert!(cache.get(56, &address).is_none());
    }

    #[test]
    fn test_address_case_does_not_matter() {
        let cache = TokenCache::new();
        let upper = Address::from_str("0xA0B86991C6218B36C1D19D4A2E9EB0CE3606EB48").unwrap();
        let lower = Address::from_str("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48").unwrap();

        cache.set(1, upper, usdc());

        assert!(cache.get(1, &lower).is_some());
    }

    #[test]
    fn test_cache_stats() {
        let cache = TokenCache::new();
        let address = Address::repeat_byte(0x11);

        cache.set(1, address, usdc());
        cache.get(1, &address); // HIT
        cache.get(1, &Address::repeat_byte(0x22)); // MISS

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }
}
