//! Constants Module - Single Source of Truth
//!
//! Chain ids, aliases, native symbols, RPC fallbacks and report layout.
//! The chain registry file may override symbols and RPC URLs; everything
//! else reads from here.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// User-Agent for HTTP requests
pub const USER_AGENT: &str = "OmniSwapParser/0.1.0";

// ============================================
// RPC CONSTANTS
// ============================================

/// Default timeout for RPC requests (seconds)
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;

/// Default number of attempts per RPC endpoint
pub const DEFAULT_RPC_MAX_RETRIES: u32 = 3;

/// Decimals of every chain's native currency
pub const NATIVE_DECIMALS: u8 = 18;

// ============================================
// REPORT LAYOUT
// ============================================

/// Width of the label column in the report
pub const REPORT_LABEL_WIDTH: usize = 25;

/// Separator printed around each transaction report
pub const REPORT_SEPARATOR: &str = "==========================================================";

// ============================================
// CHAIN IDS
// ============================================

/// Ethereum Mainnet
pub const CHAIN_ID_ETHEREUM: u64 = 1;
/// BNB Smart Chain
pub const CHAIN_ID_BSC: u64 = 56;
/// Polygon
pub const CHAIN_ID_POLYGON: u64 = 137;
/// Arbitrum One
pub const CHAIN_ID_ARBITRUM: u64 = 42161;
/// Optimism
pub const CHAIN_ID_OPTIMISM: u64 = 10;
/// Avalanche C-Chain
pub const CHAIN_ID_AVALANCHE: u64 = 43114;

/// All chain IDs with built-in defaults
pub const SUPPORTED_CHAIN_IDS: [u64; 6] = [
    CHAIN_ID_ETHEREUM,
    CHAIN_ID_BSC,
    CHAIN_ID_POLYGON,
    CHAIN_ID_ARBITRUM,
    CHAIN_ID_OPTIMISM,
    CHAIN_ID_AVALANCHE,
];

// ============================================
// CHAIN ALIASES
// ============================================

/// Resolve a user-supplied chain alias to a chain id
pub fn chain_id_for_alias(alias: &str) -> Option<u64> {
    match alias.to_lowercase().as_str() {
        "eth" | "ethereum" | "mainnet" | "evm" => Some(CHAIN_ID_ETHEREUM),
        "bsc" | "binance" => Some(CHAIN_ID_BSC),
        "avax" | "avax-c" | "avalanche" => Some(CHAIN_ID_AVALANCHE),
        "polygon" | "matic" => Some(CHAIN_ID_POLYGON),
        "arbitrum" | "arb" => Some(CHAIN_ID_ARBITRUM),
        "op" | "optimism" => Some(CHAIN_ID_OPTIMISM),
        _ => None,
    }
}

// ============================================
// PUBLIC RPC FALLBACKS
// ============================================

/// Get public RPC fallback URL for a chain
pub fn get_public_rpc_fallback(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        CHAIN_ID_ETHEREUM => Some("https://rpc.ankr.com/eth"),
        CHAIN_ID_BSC => Some("https://bsc-dataseed3.ninicoin.io"),
        CHAIN_ID_POLYGON => Some("https://polygon-rpc.com"),
        CHAIN_ID_ARBITRUM => Some("https://rpc.ankr.com/arbitrum"),
        CHAIN_ID_OPTIMISM => Some("https://mainnet.optimism.io"),
        CHAIN_ID_AVALANCHE => Some("https://api.avax.network/ext/bc/C/rpc"),
        _ => None,
    }
}

/// Env var that overrides the RPC URL of a chain
pub fn rpc_env_key(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        CHAIN_ID_ETHEREUM => Some("ETH_HTTP_URL"),
        CHAIN_ID_BSC => Some("BSC_HTTP_URL"),
        CHAIN_ID_POLYGON => Some("POLYGON_HTTP_URL"),
        CHAIN_ID_ARBITRUM => Some("ARBITRUM_HTTP_URL"),
        CHAIN_ID_OPTIMISM => Some("OPTIMISM_HTTP_URL"),
        CHAIN_ID_AVALANCHE => Some("AVALANCHE_HTTP_URL"),
        _ => None,
    }
}

// ============================================
// CHAIN METADATA
// ============================================

/// Native currency symbol. L2s keep a distinct symbol so cross-chain
/// routes stay readable ("ETH -> OPETH").
pub fn get_native_symbol(chain_id: u64) -> &'static str {
    match chain_id {
        CHAIN_ID_ETHEREUM => "ETH",
        CHAIN_ID_BSC => "BNB",
        CHAIN_ID_POLYGON => "MATIC",
        CHAIN_ID_ARBITRUM => "ARBITRUMETH",
        CHAIN_ID_OPTIMISM => "OPETH",
        CHAIN_ID_AVALANCHE => "AVAX",
        _ => "ETH",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_aliases() {
        assert_eq!(chain_id_for_alias("eth"), Some(1));
        assert_eq!(chain_id_for_alias("Mainnet"), Some(1));
        assert_eq!(chain_id_for_alias("avax-c"), Some(43114));
        assert_eq!(chain_id_for_alias("op"), Some(10));
        assert_eq!(chain_id_for_alias("solana"), None);
    }

    #[test]
    fn test_public_fallback() {
        for chain_id in SUPPORTED_CHAIN_IDS {
            assert!(get_public_rpc_fallback(chain_id).is_some());
            assert!(rpc_env_key(chain_id).is_some());
        }
        assert!(get_public_rpc_fallback(999).is_none());
    }

    #[test]
    fn test_native_symbols() {
        assert_eq!(get_native_symbol(CHAIN_ID_BSC), "BNB");
        assert_eq!(get_native_symbol(CHAIN_ID_OPTIMISM), "OPETH");
    }
}
