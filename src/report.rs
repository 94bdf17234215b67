//! Report Renderer
//!
//! Aligned text output: a 25-column label, then the value. Rendering goes to
//! a `String` so the binary decides where it is printed.

use alloy_primitives::Bytes;
use alloy_sol_types::{Panic, Revert, SolError};
use std::fmt::Write;

use crate::core::analyzer::ProbeOutcome;
use crate::core::interpreter::{RelaySummary, RevertInfo, SideReport, TxReport, TxSummary};
use crate::core::resolver::{LegOutcome, ResolvedRoute, SideOutcome};
use crate::utils::constants::{REPORT_LABEL_WIDTH, REPORT_SEPARATOR};
use crate::utils::units::format_deadline;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Print token addresses, deadlines and relay extras
    pub detail: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { detail: true }
    }
}

/// Decode revert data: `Error(string)`, `Panic(uint256)`, or raw hex
pub fn decode_revert_reason(output: &[u8]) -> Option<String> {
    if output.is_empty() {
        return None;
    }
    if let Ok(revert) = Revert::abi_decode(output, false) {
        return Some(revert.reason);
    }
    if let Ok(panic) = Panic::abi_decode(output, false) {
        return Some(format!("panic code 0x{:x}", panic.code));
    }
    Some(format!("0x{}", hex::encode(output)))
}

fn revert_label(revert: &RevertInfo) -> String {
    revert
        .data
        .as_ref()
        .map(Bytes::as_ref)
        .and_then(decode_revert_reason)
        .unwrap_or_else(|| revert.message.clone())
}

struct Renderer {
    out: String,
    options: RenderOptions,
}

impl Renderer {
    fn new(options: RenderOptions) -> Self {
        Self {
            out: String::new(),
            options,
        }
    }

    fn line(&mut self, label: &str, content: impl AsRef<str>) {
        let _ = writeln!(
            self.out,
            "{:<width$}{}",
            label,
            content.as_ref(),
            width = REPORT_LABEL_WIDTH
        );
    }

    fn separator(&mut self) {
        let _ = writeln!(self.out, "{}", REPORT_SEPARATOR);
    }

    fn summary(&mut self, summary: &TxSummary) {
        self.line("Chain", &summary.chain);
        self.line("Hash", summary.hash.to_string());
        self.line("Gas Limit", summary.gas_limit.to_string());
        if let Some(price) = summary.gas_price {
            self.line("Gas Price", price.to_string());
        }
        self.line("Value", &summary.value);
        match summary.succeeded {
            Some(true) => self.line("Status", "1"),
            Some(false) => self.line("Status", "0"),
            None => self.line("Status", "pending"),
        }
        if let Some(gas_used) = summary.gas_used {
            if self.options.detail {
                self.line("Gas Used", gas_used.to_string());
            }
        }
        if let Some(revert) = &summary.revert {
            self.line("Revert Reason", revert_label(revert));
        }
    }

    fn route(&mut self, route: &ResolvedRoute) {
        self.line("Swap", route.route_label());
        if self.options.detail {
            self.line("Method", route.method);
            let label = if route.exact_in { "AmountIn" } else { "MaxAmountIn" };
            self.line(label, route.amount_in_label());
        }
        let label = if route.exact_out { "AmountOut" } else { "MinAmountOut" };
        self.line(label, route.min_out_label());
        if self.options.detail {
            let path: Vec<&str> = route.tokens.iter().map(|t| t.address.as_str()).collect();
            self.line("Path", path.join(" -> "));
            self.line("Deadline", format_deadline(route.deadline));
        }
    }

    fn side(&mut self, side: &SideReport) {
        match &side.outcome {
            SideOutcome::NotSwapped => self.line(side.label, "Not Swapped"),
            SideOutcome::Legs(legs) => {
                self.line(side.label, format!("{} leg(s) on {}", legs.len(), side.chain));
                for leg in legs {
                    match leg {
                        LegOutcome::Resolved(route) => self.route(route),
                        LegOutcome::Uninterpretable { call_to, router } => {
                            let router = router.clone().unwrap_or_else(|| call_to.to_string());
                            self.line("Swap", format!("{}  (not interpretable)", router));
                        }
                        LegOutcome::Failed {
                            call_to,
                            router,
                            error,
                        } => {
                            let router = router.clone().unwrap_or_else(|| call_to.to_string());
                            self.line("Swap", format!("{}  err: {}", router, error));
                        }
                    }
                }
            }
        }
    }

    fn relay(&mut self, relay: &RelaySummary) {
        match &relay.pools {
            Ok(pools) => self.line("Stargate", pools),
            Err(e) => self.line("Stargate", format!("err: {}", e)),
        }
        if self.options.detail {
            self.line("StargateChainId", relay.dst_relay_chain_id.to_string());
            self.line("MinAmount", &relay.min_amount);
            self.line("DstGas", relay.dst_gas.to_string());
            self.line("DstSoDiamond", relay.dst_contract.to_string());
        }
    }

    fn report(&mut self, report: &TxReport) {
        self.separator();
        self.summary(&report.summary);
        self.separator();

        if let Some(method) = report.method {
            self.line("Method", method);
        }
        if let Some(envelope) = &report.envelope {
            self.line("TransactionId", hex::encode(envelope.transaction_id));
            self.line("Receiver", envelope.receiver.to_string());
            self.line("Router", envelope.route_label());
            if self.options.detail {
                self.line("SendTokenAddress", envelope.sending_asset.to_string());
                self.line("ReceiveTokenAddress", envelope.receiving_asset.to_string());
            }
            self.line("Amount", envelope.amount_label());
        }

        let mut sides = report.sides.iter();
        if let Some(first) = sides.next() {
            self.side(first);
        }
        if let Some(relay) = &report.relay {
            self.relay(relay);
        }
        for side in sides {
            self.side(side);
        }

        if let Some(failure) = &report.failure {
            self.line("Error", failure.to_string());
        }
        self.separator();
    }
}

/// Render one interpreted transaction
pub fn render_report(report: &TxReport, options: RenderOptions) -> String {
    let mut renderer = Renderer::new(options);
    renderer.report(report);
    renderer.out
}

/// Render every probe: found transactions in full, failures as one line each
pub fn render_outcomes(outcomes: &[ProbeOutcome], options: RenderOptions) -> String {
    let mut renderer = Renderer::new(options);
    for outcome in outcomes {
        match outcome {
            ProbeOutcome::Found(report) => renderer.report(report),
            ProbeOutcome::Failed { chain, error } => {
                let _ = writeln!(renderer.out, "{} err: {}", chain, error);
            }
            ProbeOutcome::NotFound { .. } => {}
        }
    }
    if !outcomes.iter().any(ProbeOutcome::is_found) {
        let _ = writeln!(renderer.out, "transaction not found");
    }
    renderer.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    #[test]
    fn test_decode_error_string() {
        let data = Revert {
            reason: "TransferHelper: TRANSFER_FROM_FAILED".to_string(),
        }
        .abi_encode();
        assert_eq!(
            decode_revert_reason(&data).as_deref(),
            Some("TransferHelper: TRANSFER_FROM_FAILED")
        );
    }

    #[test]
    fn test_decode_panic() {
        let data = Panic {
            code: U256::from(0x11),
        }
        .abi_encode();
        assert_eq!(decode_revert_reason(&data).as_deref(), Some("panic code 0x11"));
    }

    #[test]
    fn test_decode_custom_error_falls_back_to_hex() {
        assert_eq!(
            decode_revert_reason(&[0xde, 0xad, 0xbe, 0xef]).as_deref(),
            Some("0xdeadbeef")
        );
        assert!(decode_revert_reason(&[]).is_none());
    }

    #[test]
    fn test_line_alignment() {
        let mut renderer = Renderer::new(RenderOptions::default());
        renderer.line("Amount", "1.0 ETH");
        assert_eq!(renderer.out, format!("Amount{}1.0 ETH\n", " ".repeat(19)));
    }

    #[test]
    fn test_nothing_found() {
        let outcomes = vec![ProbeOutcome::NotFound {
            chain: "bsc".to_string(),
        }];
        let out = render_outcomes(&outcomes, RenderOptions::default());
        assert_eq!(out, "transaction not found\n");
    }
}
