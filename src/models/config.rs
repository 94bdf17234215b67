//! Configuration module for the OmniSwap decoder
//!
//! The chain registry (SoDiamond deployments, swap routers, Stargate pools)
//! is read once at startup and shared read-only afterwards.

use alloy_primitives::{Address, U256};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::{
    chain_id_for_alias, get_native_symbol, get_public_rpc_fallback, rpc_env_key,
    DEFAULT_RPC_MAX_RETRIES, DEFAULT_RPC_TIMEOUT_SECS,
};

/// Registry file bundled with the binary
const EMBEDDED_CHAINS: &str = include_str!("../../config/chains.json");

/// Env var pointing at an alternative registry file
pub const CHAINS_FILE_ENV: &str = "OMNISWAP_CHAINS_FILE";

/// Decode strategy for a router's call data.
/// Tags match the interface names used in the registry file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum RouterFamily {
    #[serde(rename = "IUniswapV2Router02")]
    UniswapV2,
    #[serde(rename = "IUniswapV2Router02AVAX")]
    UniswapV2Avax,
    #[serde(rename = "ISwapRouter")]
    UniswapV3,
    /// Any other tag: listed in the registry but not decodable
    #[serde(other)]
    Unsupported,
}

impl RouterFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UniswapV2 => "IUniswapV2Router02",
            Self::UniswapV2Avax => "IUniswapV2Router02AVAX",
            Self::UniswapV3 => "ISwapRouter",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Swap router entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouterDescriptor {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "RouterAddress")]
    pub address: Address,
    #[serde(rename = "Type")]
    pub family: RouterFamily,
}

/// Stargate pool entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PoolDescriptor {
    #[serde(rename = "PoolId")]
    pub pool_id: u64,
    #[serde(rename = "Decimal")]
    pub decimals: u8,
    #[serde(rename = "TokenAddress")]
    pub token_address: Address,
    #[serde(rename = "TokenName")]
    pub token_name: String,
}

/// Raw chain entry as stored in the registry file
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ChainEntry {
    chain_id: u64,
    so_diamond: Address,
    stargate_chain_id: u16,
    #[serde(default)]
    uniswap_router: Vec<RouterDescriptor>,
    #[serde(default)]
    stargate_pool: Vec<PoolDescriptor>,
    #[serde(default)]
    rpc: Option<String>,
    #[serde(default)]
    currency_symbol: Option<String>,
}

/// Everything known about one chain
#[derive(Debug, Clone)]
pub struct ChainInfo {
    pub name: String,
    pub chain_id: u64,
    /// Stargate chain numbering
    pub relay_chain_id: u16,
    pub so_diamond: Address,
    pub native_symbol: String,
    /// Empty when no endpoint is configured; such chains are never probed
    pub rpc_url: String,
    pub routers: Vec<RouterDescriptor>,
    pub pools: Vec<PoolDescriptor>,
}

impl ChainInfo {
    /// Router registered at `address`. `Address` equality is byte equality,
    /// so the hex case used in the file or the call data does not matter.
    pub fn router_for(&self, address: &Address) -> Option<&RouterDescriptor> {
        self.routers.iter().find(|r| r.address == *address)
    }

    /// Stargate pool with the given id
    pub fn pool_by_id(&self, pool_id: U256) -> Option<&PoolDescriptor> {
        let id = u64::try_from(pool_id).ok()?;
        self.pools.iter().find(|p| p.pool_id == id)
    }

    pub fn has_rpc(&self) -> bool {
        !self.rpc_url.is_empty()
    }
}

/// Immutable chain table
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    chains: Vec<ChainInfo>,
}

impl ChainRegistry {
    /// Load from `OMNISWAP_CHAINS_FILE` if set, otherwise the embedded file
    pub fn load() -> AppResult<Self> {
        match std::env::var(CHAINS_FILE_ENV) {
            Ok(path) if !path.is_empty() => {
                info!("📄 Loading chain registry from {}", path);
                let raw = std::fs::read_to_string(&path).map_err(|e| {
                    AppError::with_source(
                        ErrorCode::ConfigUnreadable,
                        format!("cannot read {}", path),
                        e,
                    )
                })?;
                Self::from_json(&raw)
            }
            _ => Self::from_json(EMBEDDED_CHAINS),
        }
    }

    /// Parse a registry document (chain name -> entry)
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let entries: HashMap<String, ChainEntry> = serde_json::from_str(raw).map_err(|e| {
            AppError::with_source(ErrorCode::ConfigInvalidValue, "invalid chain registry", e)
        })?;

        let mut chains: Vec<ChainInfo> = entries
            .into_iter()
            .map(|(name, entry)| Self::build_chain(name, entry))
            .collect();
        chains.sort_by_key(|c| c.chain_id);

        for pair in chains.windows(2) {
            if pair[0].chain_id == pair[1].chain_id {
                return Err(AppError::invalid_config(format!(
                    "chain id {} declared twice ({} and {})",
                    pair[0].chain_id, pair[0].name, pair[1].name
                )));
            }
        }

        debug!("Loaded {} chains", chains.len());
        Ok(Self { chains })
    }

    /// RPC precedence: chain env var, file entry, public fallback
    fn build_chain(name: String, entry: ChainEntry) -> ChainInfo {
        let rpc_url = rpc_env_key(entry.chain_id)
            .and_then(|key| std::env::var(key).ok())
            .filter(|url| !url.is_empty())
            .or(entry.rpc)
            .or_else(|| get_public_rpc_fallback(entry.chain_id).map(String::from))
            .unwrap_or_default();

        if rpc_url.is_empty() {
            warn!("⚠️ No RPC endpoint for {} (chain {})", name, entry.chain_id);
        }

        let native_symbol = entry
            .currency_symbol
            .unwrap_or_else(|| get_native_symbol(entry.chain_id).to_string());

        ChainInfo {
            name,
            chain_id: entry.chain_id,
            relay_chain_id: entry.stargate_chain_id,
            so_diamond: entry.so_diamond,
            native_symbol,
            rpc_url,
            routers: entry.uniswap_router,
            pools: entry.stargate_pool,
        }
    }

    pub fn by_chain_id(&self, chain_id: u64) -> Option<&ChainInfo> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }

    /// Chain id as carried in call data (uint256)
    pub fn by_chain_id_u256(&self, chain_id: U256) -> Option<&ChainInfo> {
        u64::try_from(chain_id).ok().and_then(|id| self.by_chain_id(id))
    }

    pub fn by_relay_chain_id(&self, relay_chain_id: u16) -> Option<&ChainInfo> {
        self.chains.iter().find(|c| c.relay_chain_id == relay_chain_id)
    }

    /// Registry key first, then the alias table
    pub fn by_name(&self, alias: &str) -> Option<&ChainInfo> {
        self.chains
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(alias))
            .or_else(|| chain_id_for_alias(alias).and_then(|id| self.by_chain_id(id)))
    }

    pub fn all(&self) -> &[ChainInfo] {
        &self.chains
    }
}

/// Runtime knobs
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Timeout for each RPC request
    pub rpc_timeout: Duration,
    /// Attempts per endpoint before giving up
    pub rpc_max_retries: u32,
    /// Print token addresses next to symbols
    pub detail: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc_timeout: Duration::from_secs(
                std::env::var("RPC_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_RPC_TIMEOUT_SECS),
            ),
            rpc_max_retries: std::env::var("RPC_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RPC_MAX_RETRIES),
            detail: true,
        }
    }
}
