//! Transaction Interpreter
//!
//! Drives one fetched transaction through
//! `Fetched -> Classified -> EnvelopeDecoded -> LegsResolved -> Reported`.
//! The first unrecoverable failure stops the walk; everything computed up to
//! that point stays in the report.

use alloy_primitives::{Address, Bytes, B256, U256};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::decoder::decode_outer;
use crate::core::registry::MethodRegistries;
use crate::core::resolver::{LegResolver, SideOutcome};
use crate::models::config::{ChainInfo, ChainRegistry};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{
    FetchedReceipt, FetchedTransaction, RelayEnvelope, SwapRequest, TokenInfo, TransferEnvelope,
};
use crate::providers::token::{TokenResolver, TokenSource};
use crate::utils::constants::NATIVE_DECIMALS;
use crate::utils::units::format_token_amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetched,
    Classified,
    EnvelopeDecoded,
    LegsResolved,
    Reported,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetched => "Fetched",
            Self::Classified => "Classified",
            Self::EnvelopeDecoded => "EnvelopeDecoded",
            Self::LegsResolved => "LegsResolved",
            Self::Reported => "Reported",
        }
    }
}

/// A failure tagged with the stage that produced it
#[derive(Debug)]
pub struct StageError {
    pub stage: Stage,
    pub error: AppError,
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.stage.as_str(), self.error.kind().as_str(), self.error)
    }
}

/// Revert details recovered by replaying a failed transaction
#[derive(Debug, Clone)]
pub struct RevertInfo {
    pub message: String,
    pub data: Option<Bytes>,
}

/// Transaction-level facts, available as soon as the tx is fetched
#[derive(Debug, Clone)]
pub struct TxSummary {
    pub hash: B256,
    pub chain: String,
    pub gas_limit: u64,
    pub gas_price: Option<U256>,
    pub value: String,
    /// None without a receipt (pending tx)
    pub succeeded: Option<bool>,
    pub gas_used: Option<u64>,
    pub revert: Option<RevertInfo>,
}

/// Decoded envelope with chains and assets resolved
#[derive(Debug, Clone)]
pub struct EnvelopeReport {
    pub transaction_id: B256,
    pub receiver: Address,
    pub source_chain: String,
    pub destination_chain: String,
    pub sending_token: TokenInfo,
    pub receiving_token: TokenInfo,
    pub sending_asset: Address,
    pub receiving_asset: Address,
    pub amount: U256,
}

impl EnvelopeReport {
    /// `bsc(BNB) -> polygon(USDC)`
    pub fn route_label(&self) -> String {
        format!(
            "{}({}) -> {}({})",
            self.source_chain,
            self.sending_token.symbol,
            self.destination_chain,
            self.receiving_token.symbol
        )
    }

    pub fn amount_label(&self) -> String {
        format_token_amount(self.amount, self.sending_token.decimals, &self.sending_token.symbol)
    }
}

/// Stargate part of a relay swap
#[derive(Debug)]
pub struct RelaySummary {
    /// `USDT(2) -> USDC(1)`, or why the pools couldn't be named
    pub pools: AppResult<String>,
    pub dst_relay_chain_id: u16,
    /// Minimum destination amount in the destination pool's precision
    pub min_amount: String,
    pub dst_gas: U256,
    pub dst_contract: Address,
}

/// Legs of one side, labelled the way they are printed
#[derive(Debug)]
pub struct SideReport {
    pub label: &'static str,
    pub chain: String,
    pub outcome: SideOutcome,
}

/// Everything the renderer needs for one transaction
#[derive(Debug)]
pub struct TxReport {
    pub summary: TxSummary,
    pub stage: Stage,
    /// Every stage reached, in order
    pub trail: Vec<Stage>,
    pub method: Option<&'static str>,
    pub envelope: Option<EnvelopeReport>,
    /// Source side first; relay pools are printed between the two sides
    pub sides: Vec<SideReport>,
    pub relay: Option<RelaySummary>,
    pub failure: Option<StageError>,
}

impl TxReport {
    fn new(summary: TxSummary) -> Self {
        Self {
            summary,
            stage: Stage::Fetched,
            trail: vec![Stage::Fetched],
            method: None,
            envelope: None,
            sides: Vec::new(),
            relay: None,
            failure: None,
        }
    }

    fn advance(&mut self, stage: Stage) {
        self.stage = stage;
        self.trail.push(stage);
    }

    fn fail(mut self, stage: Stage, error: AppError) -> Self {
        warn!("❌ {} failed at {}: {}", self.summary.hash, stage.as_str(), error);
        self.failure = Some(StageError { stage, error });
        self
    }

    pub fn is_complete(&self) -> bool {
        self.stage == Stage::Reported && self.failure.is_none()
    }
}

/// Label for a relay pool: `USDC(1)`
fn pool_label(chain: &ChainInfo, pool_id: U256) -> AppResult<String> {
    chain
        .pool_by_id(pool_id)
        .map(|pool| format!("{}({})", pool.token_name, pool.pool_id))
        .ok_or_else(|| AppError::pool_not_found(&chain.name, pool_id))
}

/// `<poolA>(<idA>) -> <poolB>(<idB>)` from the two chains' pool registries
pub fn pool_summary(src: &ChainInfo, dst: &ChainInfo, relay: &RelayEnvelope) -> AppResult<String> {
    Ok(format!(
        "{} -> {}",
        pool_label(src, relay.src_pool_id)?,
        pool_label(dst, relay.dst_pool_id)?
    ))
}

pub struct Interpreter<S> {
    chains: Arc<ChainRegistry>,
    methods: Arc<MethodRegistries>,
    tokens: Arc<TokenResolver<S>>,
}

impl<S> Clone for Interpreter<S> {
    fn clone(&self) -> Self {
        Self {
            chains: Arc::clone(&self.chains),
            methods: Arc::clone(&self.methods),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl<S: TokenSource> Interpreter<S> {
    pub fn new(
        chains: Arc<ChainRegistry>,
        methods: Arc<MethodRegistries>,
        tokens: Arc<TokenResolver<S>>,
    ) -> Self {
        Self {
            chains,
            methods,
            tokens,
        }
    }

    pub fn chains(&self) -> &ChainRegistry {
        &self.chains
    }

    pub fn tokens(&self) -> &TokenResolver<S> {
        &self.tokens
    }

    /// Walk `tx` (found on `chain`) through every stage
    pub async fn interpret(
        &self,
        chain: &ChainInfo,
        tx: &FetchedTransaction,
        receipt: Option<&FetchedReceipt>,
    ) -> TxReport {
        let mut report = TxReport::new(summarize(chain, tx, receipt));

        if tx.to != Some(chain.so_diamond) {
            debug!(
                "{} is addressed to {:?}, not the SoDiamond on {}",
                tx.hash, tx.to, chain.name
            );
        }

        // Classified
        let (method, request) = match decode_outer(&self.methods.so_diamond, &tx.input) {
            Ok(decoded) => decoded,
            Err(e) => return report.fail(Stage::Classified, e),
        };
        report.advance(Stage::Classified);
        report.method = Some(method);
        info!("📦 {} on {}: {}", tx.hash, chain.name, method);

        // EnvelopeDecoded
        let envelope = request.envelope();
        let (src_chain, dst_chain) = match self.envelope_chains(envelope) {
            Ok(chains) => chains,
            Err(e) => return report.fail(Stage::EnvelopeDecoded, e),
        };
        match self.envelope_report(envelope, src_chain, dst_chain).await {
            Ok(envelope) => report.envelope = Some(envelope),
            Err(e) => return report.fail(Stage::EnvelopeDecoded, e),
        }
        report.advance(Stage::EnvelopeDecoded);

        // LegsResolved
        let legs = LegResolver::new(&self.methods, &self.tokens);
        match &request {
            SwapRequest::Generic { legs: src_legs, .. } => {
                report.sides.push(SideReport {
                    label: "SrcChain",
                    chain: src_chain.name.clone(),
                    outcome: legs.resolve_side(src_chain, src_legs).await,
                });
                report.advance(Stage::LegsResolved);
            }
            SwapRequest::Relay {
                src_legs,
                relay,
                dst_legs,
                ..
            } => {
                let (src_side, dst_side) = futures_util::join!(
                    legs.resolve_side(src_chain, src_legs),
                    legs.resolve_side(dst_chain, dst_legs)
                );
                report.sides.push(SideReport {
                    label: "SrcSwap",
                    chain: src_chain.name.clone(),
                    outcome: src_side,
                });
                report.sides.push(SideReport {
                    label: "DstSwap",
                    chain: dst_chain.name.clone(),
                    outcome: dst_side,
                });
                report.advance(Stage::LegsResolved);
                report.relay = Some(self.relay_summary(src_chain, dst_chain, relay));
            }
        }

        report.advance(Stage::Reported);
        report
    }

    fn envelope_chains(&self, envelope: &TransferEnvelope) -> AppResult<(&ChainInfo, &ChainInfo)> {
        let src = self
            .chains
            .by_chain_id_u256(envelope.source_chain_id)
            .ok_or_else(|| AppError::chain_not_found(format!("source {}", envelope.source_chain_id)))?;
        let dst = self
            .chains
            .by_chain_id_u256(envelope.destination_chain_id)
            .ok_or_else(|| {
                AppError::chain_not_found(format!("destination {}", envelope.destination_chain_id))
            })?;
        Ok((src, dst))
    }

    async fn envelope_report(
        &self,
        envelope: &TransferEnvelope,
        src: &ChainInfo,
        dst: &ChainInfo,
    ) -> AppResult<EnvelopeReport> {
        let (sending_token, receiving_token) = futures_util::try_join!(
            self.tokens.resolve(src, envelope.sending_asset),
            self.tokens.resolve(dst, envelope.receiving_asset)
        )?;

        Ok(EnvelopeReport {
            transaction_id: envelope.transaction_id,
            receiver: envelope.receiver,
            source_chain: src.name.clone(),
            destination_chain: dst.name.clone(),
            sending_token,
            receiving_token,
            sending_asset: envelope.sending_asset,
            receiving_asset: envelope.receiving_asset,
            amount: envelope.amount,
        })
    }

    /// Pools are looked up on the envelope's source and destination chains.
    /// The relay chain id is only cross-checked.
    fn relay_summary(&self, src: &ChainInfo, dst: &ChainInfo, relay: &RelayEnvelope) -> RelaySummary {
        match self.chains.by_relay_chain_id(relay.dst_relay_chain_id) {
            Some(chain) if chain.chain_id != dst.chain_id => warn!(
                "⚠️ Relay chain {} is {}, but the envelope says {}",
                relay.dst_relay_chain_id, chain.name, dst.name
            ),
            Some(_) => {}
            None => warn!(
                "⚠️ Relay chain {} is not in the registry (envelope says {})",
                relay.dst_relay_chain_id, dst.name
            ),
        }

        let pools = pool_summary(src, dst, relay);
        let min_amount = dst
            .pool_by_id(relay.dst_pool_id)
            .map(|pool| format_token_amount(relay.min_amount, pool.decimals, &pool.token_name))
            .unwrap_or_else(|| relay.min_amount.to_string());

        RelaySummary {
            pools,
            dst_relay_chain_id: relay.dst_relay_chain_id,
            min_amount,
            dst_gas: relay.dst_gas,
            dst_contract: relay.dst_contract,
        }
    }
}

fn summarize(chain: &ChainInfo, tx: &FetchedTransaction, receipt: Option<&FetchedReceipt>) -> TxSummary {
    TxSummary {
        hash: tx.hash,
        chain: chain.name.clone(),
        gas_limit: tx.gas.to::<u64>(),
        gas_price: tx.gas_price,
        value: format_token_amount(tx.value, NATIVE_DECIMALS, &chain.native_symbol),
        succeeded: receipt.map(FetchedReceipt::succeeded),
        gas_used: receipt.map(|r| r.gas_used.to::<u64>()),
        revert: None,
    }
}
