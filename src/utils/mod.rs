//! Utils Module - Helper Functions & Shared Utilities
//!
//! Constants, the token metadata cache and amount formatting.

pub mod cache;
pub mod constants;
pub mod units;

pub use cache::*;
pub use constants::*;
pub use units::*;
