//! Providers Module - External Data Sources
//!
//! JSON-RPC client and ERC-20 token metadata lookup.

pub mod rpc;
pub mod token;

pub use rpc::*;
pub use token::*;
