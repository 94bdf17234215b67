//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so a report line or log entry
//! can be traced back to the stage that produced it.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - LOOKUP_xxx: registry / token lookups
//! - METHOD_xxx: selector not in any registry
//! - DECODE_xxx: byte layout does not match the declared schema
//! - RPC_xxx: transport and node errors
//! - CFG_xxx: configuration errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// Taxonomy bucket of this error
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Coarse error taxonomy. Decides how far a failure propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Chain, pool or token not found; the transaction on that chain is abandoned
    Lookup,
    /// Selector not present in the registry consulted
    UnknownMethod,
    /// Bytes do not match the schema (includes packed path errors)
    Decode,
    /// Transport failure talking to a node
    Network,
    /// Startup configuration problem
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lookup => "LookupError",
            Self::UnknownMethod => "UnknownMethod",
            Self::Decode => "DecodeError",
            Self::Network => "NetworkError",
            Self::Config => "ConfigError",
        }
    }
}

/// Unique error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Lookup Errors
    // ============================================
    /// Chain id / alias not in the chain registry
    ChainNotFound,
    /// Relay pool id not in the chain's pool registry
    PoolNotFound,
    /// Token metadata could not be resolved
    TokenNotFound,

    // ============================================
    // Method Errors
    // ============================================
    /// Selector not present in the registry
    UnknownMethod,

    // ============================================
    // Decode Errors
    // ============================================
    /// Calldata does not match the method schema
    DecodeFailed,
    /// Calldata shorter than a selector
    CalldataTooShort,
    /// Packed path: fee count is not address count - 1
    PathInvalidArity,
    /// Packed path: byte length is not 20 + 23n
    PathMalformed,
    /// Packed path: fee does not fit in 3 bytes
    PathFeeOutOfRange,

    // ============================================
    // RPC Errors
    // ============================================
    /// RPC connection failed
    RpcConnectionFailed,
    /// RPC request timeout
    RpcTimeout,
    /// RPC rate limited (HTTP 429)
    RpcRateLimited,
    /// RPC returned error response
    RpcError,
    /// Invalid RPC response
    RpcInvalidResponse,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,
    /// Configuration file missing or unreadable
    ConfigUnreadable,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChainNotFound => "LOOKUP_CHAIN_NOT_FOUND",
            Self::PoolNotFound => "LOOKUP_POOL_NOT_FOUND",
            Self::TokenNotFound => "LOOKUP_TOKEN_NOT_FOUND",

            Self::UnknownMethod => "METHOD_UNKNOWN",

            Self::DecodeFailed => "DECODE_FAILED",
            Self::CalldataTooShort => "DECODE_CALLDATA_TOO_SHORT",
            Self::PathInvalidArity => "DECODE_PATH_INVALID_ARITY",
            Self::PathMalformed => "DECODE_PATH_MALFORMED",
            Self::PathFeeOutOfRange => "DECODE_PATH_FEE_OUT_OF_RANGE",

            Self::RpcConnectionFailed => "RPC_CONNECTION_FAILED",
            Self::RpcTimeout => "RPC_TIMEOUT",
            Self::RpcRateLimited => "RPC_RATE_LIMITED",
            Self::RpcError => "RPC_ERROR",
            Self::RpcInvalidResponse => "RPC_INVALID_RESPONSE",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
            Self::ConfigUnreadable => "CFG_UNREADABLE",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Map the code onto the error taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ChainNotFound | Self::PoolNotFound | Self::TokenNotFound => ErrorKind::Lookup,
            Self::UnknownMethod => ErrorKind::UnknownMethod,
            Self::DecodeFailed
            | Self::CalldataTooShort
            | Self::PathInvalidArity
            | Self::PathMalformed
            | Self::PathFeeOutOfRange => ErrorKind::Decode,
            Self::RpcConnectionFailed
            | Self::RpcTimeout
            | Self::RpcRateLimited
            | Self::RpcError
            | Self::RpcInvalidResponse
            | Self::Unknown => ErrorKind::Network,
            Self::ConfigInvalidValue | Self::ConfigUnreadable => ErrorKind::Config,
        }
    }

    /// Check if error is retryable.
    /// Decode and lookup failures never are: the same bytes decode the same way.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RpcTimeout | Self::RpcRateLimited | Self::RpcConnectionFailed
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Chain id not in registry
    pub fn chain_not_found(what: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ChainNotFound, format!("chain not found: {}", what))
    }

    /// Pool id not in registry
    pub fn pool_not_found(chain: &str, pool_id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::PoolNotFound,
            format!("pool {} not found on {}", pool_id, chain),
        )
    }

    /// Token metadata unavailable
    pub fn token_not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::TokenNotFound, msg)
    }

    /// Selector not in registry
    pub fn unknown_method(registry: &str, selector: [u8; 4]) -> Self {
        Self::new(
            ErrorCode::UnknownMethod,
            format!("selector 0x{} not found in {}", hex::encode(selector), registry),
        )
    }

    /// Calldata does not decode
    pub fn decode_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DecodeFailed, msg)
    }

    /// RPC connection failed
    pub fn rpc_connection_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcConnectionFailed, msg)
    }

    /// RPC timeout
    pub fn rpc_timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcTimeout, msg)
    }

    /// RPC rate limited
    pub fn rpc_rate_limited() -> Self {
        Self::new(ErrorCode::RpcRateLimited, "Rate limited")
    }

    /// Node returned a JSON-RPC error
    pub fn rpc_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcError, msg)
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::ConfigUnreadable, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::RpcTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::RpcConnectionFailed, "Connection failed")
        } else {
            Self::new(ErrorCode::RpcError, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::RpcInvalidResponse, "JSON parse error", err)
    }
}

impl From<alloy_sol_types::Error> for AppError {
    fn from(err: alloy_sol_types::Error) -> Self {
        Self::new(ErrorCode::DecodeFailed, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::rpc_timeout("Connection timed out");
        assert_eq!(err.code, ErrorCode::RpcTimeout);
        assert_eq!(err.code_str(), "RPC_TIMEOUT");
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::RpcTimeout.is_retryable());
        assert!(ErrorCode::RpcRateLimited.is_retryable());
        assert!(!ErrorCode::DecodeFailed.is_retryable());
        assert!(!ErrorCode::UnknownMethod.is_retryable());
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ErrorCode::PoolNotFound.kind(), ErrorKind::Lookup);
        assert_eq!(ErrorCode::PathMalformed.kind(), ErrorKind::Decode);
        assert_eq!(ErrorCode::PathInvalidArity.kind(), ErrorKind::Decode);
        assert_eq!(ErrorCode::UnknownMethod.kind(), ErrorKind::UnknownMethod);
        assert_eq!(ErrorCode::RpcRateLimited.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_display_carries_code() {
        let err = AppError::unknown_method("SoDiamond", [0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(
            err.to_string(),
            "[METHOD_UNKNOWN] selector 0xdeadbeef not found in SoDiamond"
        );
    }
}
