//! Type definitions for the OmniSwap decoder
//! Decoded call data, fetched chain data and resolved token metadata

use alloy_primitives::{Address, Bytes, B256, U256, U64};
use serde::{Deserialize, Serialize};

use crate::utils::constants::NATIVE_DECIMALS;

/// Per-transfer identity carried by both outer methods (`SoData`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEnvelope {
    pub transaction_id: B256,
    pub receiver: Address,
    pub source_chain_id: U256,
    /// Zero address means the chain's native currency
    pub sending_asset: Address,
    pub destination_chain_id: U256,
    pub receiving_asset: Address,
    /// Base units of the sending asset
    pub amount: U256,
}

/// One hop instruction (`SwapData`). `call_data` is decoded later, once the
/// router family of `call_to` is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapLeg {
    pub call_to: Address,
    pub approve_to: Address,
    pub sending_asset: Address,
    pub receiving_asset: Address,
    pub from_amount: U256,
    pub call_data: Bytes,
}

/// Stargate-specific part of a relay swap (`StargateData`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEnvelope {
    pub src_pool_id: U256,
    /// Stargate's own chain numbering, not the EVM chain id
    pub dst_relay_chain_id: u16,
    pub dst_pool_id: U256,
    pub min_amount: U256,
    pub dst_gas: U256,
    pub dst_contract: Address,
}

/// Fully unpacked outer call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapRequest {
    /// `swapTokensGeneric`: single-chain swap
    Generic {
        envelope: TransferEnvelope,
        legs: Vec<SwapLeg>,
    },
    /// `soSwapViaStargate`: cross-chain swap relayed through Stargate
    Relay {
        envelope: TransferEnvelope,
        src_legs: Vec<SwapLeg>,
        relay: RelayEnvelope,
        dst_legs: Vec<SwapLeg>,
    },
}

impl SwapRequest {
    pub fn envelope(&self) -> &TransferEnvelope {
        match self {
            Self::Generic { envelope, .. } | Self::Relay { envelope, .. } => envelope,
        }
    }
}

/// Display metadata for an asset on one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Checksummed address string
    pub address: String,
}

impl TokenInfo {
    /// Synthetic entry for the zero address: the chain's native currency
    pub fn native(symbol: &str) -> Self {
        Self {
            name: symbol.to_string(),
            symbol: symbol.to_string(),
            decimals: NATIVE_DECIMALS,
            address: Address::ZERO.to_checksum(None),
        }
    }
}

/// Subset of `eth_getTransactionByHash` the decoder needs
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedTransaction {
    pub hash: B256,
    pub from: Address,
    pub to: Option<Address>,
    pub input: Bytes,
    pub value: U256,
    pub gas: U64,
    #[serde(default)]
    pub gas_price: Option<U256>,
    /// None while pending
    #[serde(default)]
    pub block_number: Option<U64>,
}

/// Subset of `eth_getTransactionReceipt`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchedReceipt {
    /// Absent on pre-Byzantium receipts
    #[serde(default)]
    pub status: Option<U64>,
    pub gas_used: U64,
}

impl FetchedReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.map(|s| s == U64::from(1)).unwrap_or(true)
    }
}
