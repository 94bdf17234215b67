//! Packed multi-hop path codec (Uniswap V3 `bytes path`)
//!
//! Layout: `token(20) | fee(3) | token(20) [| fee(3) | token(20) ...]`
//! Fees are big-endian uint24 in hundredths of a basis point.
//! A well-formed path is exactly `20 + 23 * hops` bytes long.

use alloy_primitives::Address;

use crate::models::errors::{AppError, AppResult, ErrorCode};

pub const ADDR_SIZE: usize = 20;
pub const FEE_SIZE: usize = 3;
/// One hop: address followed by the fee of the pool it enters
pub const HOP_SIZE: usize = ADDR_SIZE + FEE_SIZE;
/// Largest value a 3-byte fee can hold
pub const MAX_FEE: u32 = (1 << 24) - 1;

/// Decoded route: `tokens.len() == fees.len() + 1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedPath {
    pub tokens: Vec<Address>,
    pub fees: Vec<u32>,
}

impl PackedPath {
    /// Validate arity and build a path
    pub fn new(tokens: Vec<Address>, fees: Vec<u32>) -> AppResult<Self> {
        if tokens.is_empty() || fees.len() != tokens.len() - 1 {
            return Err(AppError::new(
                ErrorCode::PathInvalidArity,
                format!(
                    "expected {} fees for {} tokens, got {}",
                    tokens.len().saturating_sub(1),
                    tokens.len(),
                    fees.len()
                ),
            ));
        }
        Ok(Self { tokens, fees })
    }

    pub fn hops(&self) -> usize {
        self.fees.len()
    }

    /// Reverse the route (exactOutput paths are stored output-first)
    pub fn reversed(mut self) -> Self {
        self.tokens.reverse();
        self.fees.reverse();
        self
    }

    pub fn encode(&self) -> AppResult<Vec<u8>> {
        encode_path(&self.tokens, &self.fees)
    }

    pub fn decode(bytes: &[u8]) -> AppResult<Self> {
        decode_path(bytes)
    }
}

/// Pack `tokens` and `fees` into the V3 path format
pub fn encode_path(tokens: &[Address], fees: &[u32]) -> AppResult<Vec<u8>> {
    if tokens.is_empty() || fees.len() != tokens.len() - 1 {
        return Err(AppError::new(
            ErrorCode::PathInvalidArity,
            format!("{} fees for {} tokens", fees.len(), tokens.len()),
        ));
    }

    let mut encoded = Vec::with_capacity(fees.len() * HOP_SIZE + ADDR_SIZE);
    for (token, &fee) in tokens.iter().zip(fees) {
        if fee > MAX_FEE {
            return Err(AppError::new(
                ErrorCode::PathFeeOutOfRange,
                format!("fee {} does not fit in {} bytes", fee, FEE_SIZE),
            ));
        }
        encoded.extend_from_slice(token.as_slice());
        encoded.extend_from_slice(&fee.to_be_bytes()[4 - FEE_SIZE..]);
    }
    encoded.extend_from_slice(tokens[tokens.len() - 1].as_slice());
    Ok(encoded)
}

/// Unpack a V3 path. Rejects any length that is not `20 + 23n`.
pub fn decode_path(bytes: &[u8]) -> AppResult<PackedPath> {
    if bytes.len() < ADDR_SIZE || (bytes.len() - ADDR_SIZE) % HOP_SIZE != 0 {
        return Err(AppError::new(
            ErrorCode::PathMalformed,
            format!(
                "path length {} is not {} + {}*n",
                bytes.len(),
                ADDR_SIZE,
                HOP_SIZE
            ),
        ));
    }

    let hops = (bytes.len() - ADDR_SIZE) / HOP_SIZE;
    let mut tokens = Vec::with_capacity(hops + 1);
    let mut fees = Vec::with_capacity(hops);

    for chunk in bytes[..hops * HOP_SIZE].chunks_exact(HOP_SIZE) {
        tokens.push(Address::from_slice(&chunk[..ADDR_SIZE]));
        let fee = &chunk[ADDR_SIZE..];
        fees.push(u32::from_be_bytes([0, fee[0], fee[1], fee[2]]));
    }
    tokens.push(Address::from_slice(&bytes[hops * HOP_SIZE..]));

    Ok(PackedPath { tokens, fees })
}
