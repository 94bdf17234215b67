//! Core Module - Call Data Decoding & Interpretation
//!
//! ABI schemas, method registries, the packed path codec, leg resolution
//! and the per-transaction stage machine.

pub mod abi;
pub mod analyzer;
pub mod decoder;
pub mod interpreter;
pub mod path;
pub mod registry;
pub mod resolver;

pub use analyzer::*;
pub use interpreter::*;
pub use path::*;
pub use registry::*;
pub use resolver::*;
