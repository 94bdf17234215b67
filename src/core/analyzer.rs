//! Chain Analyzer
//! Fetches a transaction on one chain and runs it through the interpreter.
//! Without a chain hint every chain with an RPC endpoint is probed in
//! parallel and all outcomes are collected.

use alloy_primitives::B256;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::core::interpreter::{Interpreter, RevertInfo, TxReport};
use crate::models::config::{AppConfig, ChainInfo};
use crate::models::errors::{AppError, ErrorCode};
use crate::providers::rpc::{CallOutcome, RpcProvider};
use crate::providers::token::TokenSource;

/// Result of looking for the transaction on one chain
#[derive(Debug)]
pub enum ProbeOutcome {
    Found(Box<TxReport>),
    NotFound { chain: String },
    Failed { chain: String, error: AppError },
}

impl ProbeOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

pub struct ChainAnalyzer<S> {
    interpreter: Interpreter<S>,
    config: AppConfig,
}

impl<S> Clone for ChainAnalyzer<S> {
    fn clone(&self) -> Self {
        Self {
            interpreter: self.interpreter.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: TokenSource> ChainAnalyzer<S> {
    pub fn new(interpreter: Interpreter<S>, config: AppConfig) -> Self {
        Self {
            interpreter,
            config,
        }
    }

    pub fn interpreter(&self) -> &Interpreter<S> {
        &self.interpreter
    }

    /// Look for `hash` on `chain`. Each probe owns its own RPC client.
    pub async fn probe_chain(&self, chain: &ChainInfo, hash: B256) -> ProbeOutcome {
        let failed = |error: AppError| ProbeOutcome::Failed {
            chain: chain.name.clone(),
            error,
        };

        let provider = match RpcProvider::new(chain, &self.config) {
            Ok(provider) => provider,
            Err(e) => return failed(e),
        };

        let tx = match provider.get_transaction_by_hash(hash).await {
            Ok(Some(tx)) => tx,
            Ok(None) => {
                debug!("{} not on {}", hash, chain.name);
                return ProbeOutcome::NotFound {
                    chain: chain.name.clone(),
                };
            }
            Err(e) => return failed(e),
        };
        info!("✅ Found {} on {}", hash, chain.name);

        let receipt = match provider.get_transaction_receipt(hash).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!("⚠️ No receipt for {} on {}: {}", hash, chain.name, e);
                None
            }
        };

        let mut report = self.interpreter.interpret(chain, &tx, receipt.as_ref()).await;

        if receipt.as_ref().is_some_and(|r| !r.succeeded()) {
            match provider.replay_call(&tx).await {
                Ok(CallOutcome::Reverted { message, data }) => {
                    report.summary.revert = Some(RevertInfo { message, data });
                }
                Ok(CallOutcome::Success(_)) => {
                    debug!("Replay of {} did not revert", hash);
                }
                Err(e) => warn!("⚠️ Replay of {} failed: {}", hash, e),
            }
        }

        ProbeOutcome::Found(Box::new(report))
    }

    /// Probe every chain with an RPC endpoint, one task per chain. A hit on
    /// one chain does not cancel the others. Outcomes come back in registry
    /// order.
    pub async fn probe_all(&self, hash: B256) -> Vec<ProbeOutcome> {
        let started = Instant::now();
        let chains: Vec<ChainInfo> = self
            .interpreter
            .chains()
            .all()
            .iter()
            .filter(|c| c.has_rpc())
            .cloned()
            .collect();

        let mut set = JoinSet::new();
        for (index, chain) in chains.iter().cloned().enumerate() {
            let analyzer = self.clone();
            set.spawn(async move { (index, analyzer.probe_chain(&chain, hash).await) });
        }

        let mut slots: Vec<Option<ProbeOutcome>> = chains.iter().map(|_| None).collect();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => warn!("⚠️ Probe task died: {}", e),
            }
        }

        let outcomes: Vec<ProbeOutcome> = slots
            .into_iter()
            .zip(chains)
            .map(|(slot, chain)| {
                slot.unwrap_or_else(|| ProbeOutcome::Failed {
                    chain: chain.name,
                    error: AppError::new(ErrorCode::Unknown, "probe task did not complete"),
                })
            })
            .collect();

        let found = outcomes.iter().filter(|o| o.is_found()).count();
        let failed = outcomes
            .iter()
            .filter(|o| matches!(o, ProbeOutcome::Failed { .. }))
            .count();
        info!(
            "📊 Probed {} chains in {}ms | Found: {} | Failed: {}",
            outcomes.len(),
            started.elapsed().as_millis(),
            found,
            failed
        );

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::MethodRegistries;
    use crate::models::config::ChainRegistry;
    use crate::models::errors::ErrorKind;
    use crate::models::types::TokenInfo;
    use crate::providers::token::TokenResolver;
    use alloy_primitives::Address;
    use std::sync::Arc;
    use std::time::Duration;

    struct NoNetwork;

    impl TokenSource for NoNetwork {
        async fn fetch(
            &self,
            _chain: &ChainInfo,
            address: Address,
        ) -> crate::models::errors::AppResult<TokenInfo> {
            Err(AppError::token_not_found(address.to_string()))
        }
    }

    const LOCAL_CHAINS: &str = r#"{
        "devnet": {
            "ChainId": 31337,
            "SoDiamond": "0x2967E7Bb9DaA5711Ac332cAF874BD47ef99B3820",
            "StargateChainId": 10001,
            "Rpc": "http://127.0.0.1:9"
        },
        "offline": {
            "ChainId": 31338,
            "SoDiamond": "0x2967E7Bb9DaA5711Ac332cAF874BD47ef99B3820",
            "StargateChainId": 10002
        }
    }"#;

    fn analyzer() -> ChainAnalyzer<NoNetwork> {
        let interpreter = Interpreter::new(
            Arc::new(ChainRegistry::from_json(LOCAL_CHAINS).unwrap()),
            Arc::new(MethodRegistries::build()),
            Arc::new(TokenResolver::new(NoNetwork)),
        );
        let config = AppConfig {
            rpc_timeout: Duration::from_secs(2),
            rpc_max_retries: 1,
            detail: true,
        };
        ChainAnalyzer::new(interpreter, config)
    }

    #[tokio::test]
    async fn test_unreachable_node_is_reported_per_chain() {
        let outcomes = analyzer().probe_all(B256::repeat_byte(0x42)).await;

        // the chain without an endpoint is skipped
        assert_eq!(outcomes.len(), 1);
        match &outcomes[0] {
            ProbeOutcome::Failed { chain, error } => {
                assert_eq!(chain, "devnet");
                assert_eq!(error.kind(), ErrorKind::Network);
            }
            other => panic!("expected a network failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chain_without_rpc_fails_fast() {
        let analyzer = analyzer();
        let offline = analyzer.interpreter().chains().by_chain_id(31338).unwrap().clone();

        let outcome = analyzer.probe_chain(&offline, B256::ZERO).await;
        match outcome {
            ProbeOutcome::Failed { error, .. } => assert_eq!(error.kind(), ErrorKind::Config),
            other => panic!("expected a config failure, got {:?}", other),
        }
    }
}
