//! OmniSwap Parser - decode an OmniSwap transaction by hash
//!
//! Without `--chain` every chain with an RPC endpoint is probed in parallel.
//!
//! Logs go to stderr (`RUST_LOG`, default `warn`); the report goes to stdout.

use alloy_primitives::B256;
use clap::Parser;
use eyre::Result;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use omniswap_parser::{
    render_outcomes, AppConfig, ChainAnalyzer, ChainRegistry, Interpreter, MethodRegistries,
    RenderOptions, RpcTokenSource, TokenResolver,
};

#[derive(Parser, Debug)]
#[command(version, about = "Decode OmniSwap swap transactions", long_about = None)]
struct Cli {
    /// Transaction hash
    #[arg(short, long)]
    tx: B256,

    /// Chain to look on (eth, bsc, avax, polygon, arbitrum, op); all chains if omitted
    #[arg(short, long)]
    chain: Option<String>,

    /// Print token addresses, deadlines and relay extras (default)
    #[arg(short, long, overrides_with = "no_detail")]
    detail: bool,

    /// Hide token addresses, deadlines and relay extras
    #[arg(long, overrides_with = "detail")]
    no_detail: bool,
}

impl Cli {
    /// On by default; the later of `--detail` / `--no-detail` wins
    fn detail(&self) -> bool {
        self.detail || !self.no_detail
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let config = AppConfig {
        detail: cli.detail(),
        ..AppConfig::default()
    };
    let chains = Arc::new(ChainRegistry::load()?);
    let methods = Arc::new(MethodRegistries::build());
    let tokens = Arc::new(TokenResolver::new(RpcTokenSource::new(config.clone())));
    let options = RenderOptions {
        detail: config.detail,
    };

    let analyzer = ChainAnalyzer::new(
        Interpreter::new(Arc::clone(&chains), methods, Arc::clone(&tokens)),
        config,
    );

    let outcomes = match cli.chain.as_deref() {
        Some(alias) => {
            let Some(chain) = chains.by_name(alias) else {
                println!("unsupported chain: {}", alias);
                return Ok(());
            };
            vec![analyzer.probe_chain(chain, cli.tx).await]
        }
        None => analyzer.probe_all(cli.tx).await,
    };

    print!("{}", render_outcomes(&outcomes, options));

    let stats = tokens.cache_stats();
    debug!("🪙 Token cache: {:?}", stats);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0x8b8f0a5c2bd0e3a7c7b83a3c6b6a2f4bd9e2de8c8e9d7f1b2a3c4d5e6f708192";

    #[test]
    fn test_detail_flags() {
        let cli = Cli::try_parse_from(["omniswap_parser", "-t", HASH]).unwrap();
        assert!(cli.detail());
        assert!(cli.chain.is_none());

        let cli = Cli::try_parse_from(["omniswap_parser", "-t", HASH, "--no-detail"]).unwrap();
        assert!(!cli.detail());

        let cli =
            Cli::try_parse_from(["omniswap_parser", "-t", HASH, "--no-detail", "-d"]).unwrap();
        assert!(cli.detail());

        let cli = Cli::try_parse_from(["omniswap_parser", "--tx", HASH, "-c", "bsc", "-d"]).unwrap();
        assert!(cli.detail());
        assert_eq!(cli.chain.as_deref(), Some("bsc"));
    }

    #[test]
    fn test_tx_hash_is_required() {
        assert!(Cli::try_parse_from(["omniswap_parser"]).is_err());
        assert!(Cli::try_parse_from(["omniswap_parser", "-t", "0x1234"]).is_err());
    }
}
