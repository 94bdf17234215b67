//! Models Module - Data Structures & Configuration
//!
//! Chain registry, decoded call data types and the error taxonomy.

pub mod config;
pub mod errors;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
