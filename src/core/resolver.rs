//! Swap-Leg Resolver
//!
//! Picks the router family for a leg's `callTo`, decodes the inner call with
//! that family's registry and turns it into a displayable route.

use alloy_primitives::{Address, U256};
use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::core::decoder::{unpack_v2, unpack_v3, InnerSwap};
use crate::core::registry::MethodRegistries;
use crate::models::config::{ChainInfo, RouterDescriptor, RouterFamily};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{SwapLeg, TokenInfo};
use crate::providers::token::{TokenResolver, TokenSource};
use crate::utils::units::{format_fee_percent, format_token_amount};

/// A leg with every hop resolved to token metadata
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    pub router: String,
    pub family: RouterFamily,
    pub method: &'static str,
    /// One entry per hop address, input first
    pub tokens: Vec<TokenInfo>,
    pub fees: Option<Vec<u32>>,
    pub amount_in: U256,
    /// False when `amount_in` is an upper bound (exact-output swaps)
    pub exact_in: bool,
    pub min_out: U256,
    pub exact_out: bool,
    pub deadline: U256,
}

impl ResolvedRoute {
    /// `UniswapV2  WETH -> USDC`, or with fees: `UniswapV3  WETH -(0.05%)-> USDC`
    pub fn route_label(&self) -> String {
        let mut route = String::new();
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                match self.fees.as_ref().and_then(|fees| fees.get(i - 1)) {
                    Some(fee) => route.push_str(&format!(" -({})-> ", format_fee_percent(*fee))),
                    None => route.push_str(" -> "),
                }
            }
            route.push_str(&token.symbol);
        }
        format!("{}  {}", self.router, route)
    }

    pub fn output_token(&self) -> Option<&TokenInfo> {
        self.tokens.last()
    }

    pub fn input_token(&self) -> Option<&TokenInfo> {
        self.tokens.first()
    }

    /// Guaranteed output in the final token's precision: `900.000000 USDC`
    pub fn min_out_label(&self) -> String {
        match self.output_token() {
            Some(token) => format_token_amount(self.min_out, token.decimals, &token.symbol),
            None => self.min_out.to_string(),
        }
    }

    pub fn amount_in_label(&self) -> String {
        match self.input_token() {
            Some(token) => format_token_amount(self.amount_in, token.decimals, &token.symbol),
            None => self.amount_in.to_string(),
        }
    }
}

/// What became of one leg
#[derive(Debug)]
pub enum LegOutcome {
    Resolved(ResolvedRoute),
    /// Router unknown or of a family we can't decode; not an error
    Uninterpretable {
        call_to: Address,
        router: Option<String>,
    },
    Failed {
        call_to: Address,
        router: Option<String>,
        error: AppError,
    },
}

/// One side (source or destination) of a swap
#[derive(Debug)]
pub enum SideOutcome {
    NotSwapped,
    Legs(Vec<LegOutcome>),
}

impl SideOutcome {
    pub fn legs(&self) -> &[LegOutcome] {
        match self {
            Self::NotSwapped => &[],
            Self::Legs(legs) => legs,
        }
    }
}

pub struct LegResolver<'a, S> {
    methods: &'a MethodRegistries,
    tokens: &'a TokenResolver<S>,
}

impl<'a, S: TokenSource> LegResolver<'a, S> {
    pub fn new(methods: &'a MethodRegistries, tokens: &'a TokenResolver<S>) -> Self {
        Self { methods, tokens }
    }

    /// Resolve every leg of a side. An empty side never touches the router
    /// registry. Legs are independent: one failing leaves the others intact.
    pub async fn resolve_side(&self, chain: &ChainInfo, legs: &[SwapLeg]) -> SideOutcome {
        if legs.is_empty() {
            return SideOutcome::NotSwapped;
        }
        let outcomes = join_all(legs.iter().map(|leg| self.resolve_leg(chain, leg))).await;
        SideOutcome::Legs(outcomes)
    }

    pub async fn resolve_leg(&self, chain: &ChainInfo, leg: &SwapLeg) -> LegOutcome {
        let Some(router) = chain.router_for(&leg.call_to) else {
            debug!("Router {} not registered on {}", leg.call_to, chain.name);
            return LegOutcome::Uninterpretable {
                call_to: leg.call_to,
                router: None,
            };
        };

        let inner = match self.decode_inner(router, leg) {
            Ok(Some(inner)) => inner,
            Ok(None) => {
                return LegOutcome::Uninterpretable {
                    call_to: leg.call_to,
                    router: Some(router.name.clone()),
                }
            }
            Err(error) => {
                warn!("⚠️ Leg via {} on {}: {}", router.name, chain.name, error);
                return LegOutcome::Failed {
                    call_to: leg.call_to,
                    router: Some(router.name.clone()),
                    error,
                };
            }
        };

        match self.route(chain, router, leg, inner).await {
            Ok(route) => LegOutcome::Resolved(route),
            Err(error) => {
                warn!("⚠️ Token lookup for leg via {} on {}: {}", router.name, chain.name, error);
                LegOutcome::Failed {
                    call_to: leg.call_to,
                    router: Some(router.name.clone()),
                    error,
                }
            }
        }
    }

    /// `Ok(None)` for families without a decoder
    fn decode_inner(&self, router: &RouterDescriptor, leg: &SwapLeg) -> AppResult<Option<InnerSwap>> {
        match router.family {
            RouterFamily::UniswapV2 | RouterFamily::UniswapV2Avax => {
                let Some(registry) = self.methods.v2_for(router.family) else {
                    return Ok(None);
                };
                let (descriptor, tail) = registry.identify(&leg.call_data)?;
                unpack_v2(descriptor, tail).map(Some)
            }
            RouterFamily::UniswapV3 => {
                let (descriptor, tail) = self.methods.swap_router.identify(&leg.call_data)?;
                unpack_v3(descriptor, tail).map(Some)
            }
            RouterFamily::Unsupported => Ok(None),
        }
    }

    async fn route(
        &self,
        chain: &ChainInfo,
        router: &RouterDescriptor,
        leg: &SwapLeg,
        inner: InnerSwap,
    ) -> AppResult<ResolvedRoute> {
        let tokens = join_all(inner.tokens.iter().map(|address| self.tokens.resolve(chain, *address)))
            .await
            .into_iter()
            .collect::<AppResult<Vec<_>>>()?;

        Ok(ResolvedRoute {
            router: router.name.clone(),
            family: router.family,
            method: inner.method,
            tokens,
            fees: inner.fees,
            exact_in: inner.amount_in.is_some() || !inner.exact_out,
            amount_in: inner.amount_in.unwrap_or(leg.from_amount),
            min_out: inner.min_out,
            exact_out: inner.exact_out,
            deadline: inner.deadline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::abi::{ISwapRouter, IUniswapV2Router02};
    use crate::core::path::encode_path;
    use crate::models::config::ChainRegistry;
    use crate::models::errors::ErrorCode;
    use alloy_primitives::Bytes;
    use alloy_sol_types::SolCall;
    use std::str::FromStr;

    struct FixedSource;

    impl TokenSource for FixedSource {
        async fn fetch(&self, _chain: &ChainInfo, address: Address) -> AppResult<TokenInfo> {
            let (symbol, decimals) = match address.0[19] {
                0x01 => ("WETH", 18),
                0x02 => ("USDC", 6),
                0x03 => ("DAI", 18),
                _ => return Err(AppError::token_not_found(address.to_string())),
            };
            Ok(TokenInfo {
                name: symbol.to_string(),
                symbol: symbol.to_string(),
                decimals,
                address: address.to_checksum(None),
            })
        }
    }

    fn token(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[0] = 0xee;
        bytes[19] = last;
        Address::from(bytes)
    }

    fn leg(call_to: Address, call_data: Vec<u8>) -> SwapLeg {
        SwapLeg {
            call_to,
            approve_to: call_to,
            sending_asset: Address::ZERO,
            receiving_asset: token(2),
            from_amount: U256::from(1_000_000_000_000_000_000u128),
            call_data: Bytes::from(call_data),
        }
    }

    fn mainnet() -> ChainInfo {
        ChainRegistry::load().unwrap().by_chain_id(1).unwrap().clone()
    }

    fn uniswap_v2() -> Address {
        Address::from_str("0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D").unwrap()
    }

    fn uniswap_v3() -> Address {
        Address::from_str("0xE592427A0AEce92De3Edee1F18E0157C05861564").unwrap()
    }

    #[tokio::test]
    async fn test_v2_leg() {
        let methods = MethodRegistries::build();
        let tokens = TokenResolver::new(FixedSource);
        let resolver = LegResolver::new(&methods, &tokens);

        let call = IUniswapV2Router02::swapExactETHForTokensCall {
            amountOutMin: U256::from(900_000_000u64),
            path: vec![token(1), token(2)],
            to: Address::ZERO,
            deadline: U256::from(1_700_000_000u64),
        };
        let outcome = resolver.resolve_leg(&mainnet(), &leg(uniswap_v2(), call.abi_encode())).await;

        let route = match outcome {
            LegOutcome::Resolved(route) => route,
            other => panic!("expected a resolved leg, got {:?}", other),
        };
        assert_eq!(route.route_label(), "UniswapV2  WETH -> USDC");
        assert_eq!(route.min_out_label(), "900.000000 USDC");
        assert_eq!(route.amount_in_label(), "1.000000000000000000 WETH");
    }

    #[tokio::test]
    async fn test_v3_leg_shows_fees() {
        let methods = MethodRegistries::build();
        let tokens = TokenResolver::new(FixedSource);
        let resolver = LegResolver::new(&methods, &tokens);

        let call = ISwapRouter::exactInputCall {
            params: ISwapRouter::ExactInputParams {
                path: encode_path(&[token(1), token(2), token(3)], &[500, 3000])
                    .unwrap()
                    .into(),
                recipient: Address::ZERO,
                deadline: U256::from(1_700_000_000u64),
                amountIn: U256::from(10u64).pow(U256::from(18)),
                amountOutMinimum: U256::from(10u64).pow(U256::from(18)),
            },
        };
        let outcome = resolver.resolve_leg(&mainnet(), &leg(uniswap_v3(), call.abi_encode())).await;

        let route = match outcome {
            LegOutcome::Resolved(route) => route,
            other => panic!("expected a resolved leg, got {:?}", other),
        };
        assert_eq!(route.route_label(), "UniswapV3  WETH -(0.05%)-> USDC -(0.3%)-> DAI");
        assert_eq!(route.min_out_label(), "1.000000000000000000 DAI");
    }

    #[tokio::test]
    async fn test_unknown_router_is_not_an_error() {
        let methods = MethodRegistries::build();
        let tokens = TokenResolver::new(FixedSource);
        let resolver = LegResolver::new(&methods, &tokens);

        let outcome = resolver
            .resolve_leg(&mainnet(), &leg(Address::repeat_byte(0x77), vec![0xde, 0xad]))
            .await;
        assert!(matches!(outcome, LegOutcome::Uninterpretable { router: None, .. }));
    }

    #[tokio::test]
    async fn test_failing_leg_keeps_siblings() {
        let methods = MethodRegistries::build();
        let tokens = TokenResolver::new(FixedSource);
        let resolver = LegResolver::new(&methods, &tokens);

        let good = IUniswapV2Router02::swapExactTokensForTokensCall {
            amountIn: U256::from(1_000_000u64),
            amountOutMin: U256::from(1u64),
            path: vec![token(2), token(3)],
            to: Address::ZERO,
            deadline: U256::from(1u64),
        };
        let legs = vec![
            leg(uniswap_v2(), vec![0xde, 0xad, 0xbe, 0xef]),
            leg(uniswap_v2(), good.abi_encode()),
        ];

        let side = resolver.resolve_side(&mainnet(), &legs).await;
        let outcomes = side.legs();
        assert_eq!(outcomes.len(), 2);
        match &outcomes[0] {
            LegOutcome::Failed { error, .. } => assert_eq!(error.code, ErrorCode::UnknownMethod),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(matches!(outcomes[1], LegOutcome::Resolved(_)));
    }

    #[tokio::test]
    async fn test_empty_side() {
        let methods = MethodRegistries::build();
        let tokens = TokenResolver::new(FixedSource);
        let resolver = LegResolver::new(&methods, &tokens);

        let side = resolver.resolve_side(&mainnet(), &[]).await;
        assert!(matches!(side, SideOutcome::NotSwapped));
    }
}
