//! OmniSwap Parser Library
//!
//! Decodes OmniSwap SoDiamond transactions into readable reports:
//! - Generic same-chain swaps (`swapTokensGeneric`)
//! - Stargate relay swaps (`soSwapViaStargate`) with both swap sides
//! - Uniswap V2 / V3 router legs, including packed V3 paths

pub mod core;
pub mod models;
pub mod providers;
pub mod report;
pub mod utils;

pub use crate::core::analyzer::{ChainAnalyzer, ProbeOutcome};
pub use crate::core::interpreter::{Interpreter, Stage, TxReport};
pub use crate::core::path::{decode_path, encode_path, PackedPath};
pub use crate::core::registry::MethodRegistries;
pub use models::config::{AppConfig, ChainInfo, ChainRegistry};
pub use models::errors::{AppError, AppResult, ErrorCode, ErrorKind};
pub use models::types::TokenInfo;
pub use providers::token::{RpcTokenSource, TokenResolver, TokenSource};
pub use report::{render_outcomes, render_report, RenderOptions};
