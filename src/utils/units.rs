//! Base-unit formatting helpers
//!
//! Amounts are rendered from their decimal digits so that an 18-decimal
//! value prints every digit instead of going through f64.

use alloy_primitives::U256;
use chrono::DateTime;

/// Uniswap V3 fees are expressed in hundredths of a basis point
const FEE_DENOMINATOR: u32 = 10_000;

/// Format `amount` base units with `decimals` fractional digits.
/// Works on the decimal digits, so any `uint8` decimals is exact.
///
/// `format_units(1_500_000, 6) == "1.500000"`
pub fn format_units(amount: U256, decimals: u8) -> String {
    let digits = amount.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }
    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    format!("{}.{}", whole, frac)
}

/// Format an amount followed by its symbol, e.g. `900.000000 USDC`
pub fn format_token_amount(amount: U256, decimals: u8, symbol: &str) -> String {
    format!("{} {}", format_units(amount, decimals), symbol)
}

/// Render a V3 pool fee as a percentage: 3000 -> "0.3%", 500 -> "0.05%",
/// 10000 -> "1.0%". At least one fractional digit is always shown.
pub fn format_fee_percent(fee: u32) -> String {
    let whole = fee / FEE_DENOMINATOR;
    let frac = format!("{:04}", fee % FEE_DENOMINATOR);
    let trimmed = frac.trim_end_matches('0');
    let frac = if trimmed.is_empty() { "0" } else { trimmed };
    format!("{}.{}%", whole, frac)
}

/// Render a unix-seconds deadline as UTC, falling back to the raw number
/// for sentinel values such as `type(uint256).max`.
pub fn format_deadline(deadline: U256) -> String {
    let secs = u64::try_from(deadline)
        .ok()
        .and_then(|s| i64::try_from(s).ok());
    match secs.and_then(|s| DateTime::from_timestamp(s, 0)) {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => deadline.to_string(),
    }
}
