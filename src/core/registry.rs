//! Method signature registries
//!
//! One registry per contract family, built once at startup from the `sol!`
//! call types and shared immutably afterwards. Each entry maps a 4-byte
//! selector to the method name, its canonical signature and a closed
//! dispatch tag.

use alloy_sol_types::SolCall;
use std::collections::HashMap;
use tracing::debug;

use crate::core::abi::{ISoDiamond, ISwapRouter, IUniswapV2Router02, IUniswapV2Router02AVAX};
use crate::models::config::RouterFamily;
use crate::models::errors::{AppError, AppResult, ErrorCode};

pub type Selector = [u8; 4];

/// Outer SoDiamond methods the decoder understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OuterMethod {
    SwapTokensGeneric,
    SoSwapViaStargate,
}

/// Argument layout of a V2 router swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum V2Shape {
    /// `swapExactTokens*`: (amountIn, amountOutMin, path, to, deadline)
    ExactTokensIn,
    /// Input taken from msg.value: (amountOutMin, path, to, deadline)
    BalanceIn,
    /// `swapTokensForExact*`: (amountOut, amountInMax, path, to, deadline)
    ExactTokensOut,
}

impl V2Shape {
    /// Derived from the method name, once, while the registry is built
    pub fn from_method_name(name: &str) -> Self {
        if name.starts_with("swapExactTokens") {
            Self::ExactTokensIn
        } else if name.starts_with("swapTokensForExact") {
            Self::ExactTokensOut
        } else {
            Self::BalanceIn
        }
    }
}

/// V3 swap router methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum V3Method {
    ExactInput,
    ExactInputSingle,
    ExactOutput,
    ExactOutputSingle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor<K> {
    pub name: &'static str,
    /// Canonical signature, e.g. `swapExactTokensForTokens(uint256,uint256,address[],address,uint256)`
    pub signature: &'static str,
    pub selector: Selector,
    pub kind: K,
}

/// Selector -> method lookup for one contract family
#[derive(Debug, Clone)]
pub struct MethodRegistry<K> {
    label: &'static str,
    methods: HashMap<Selector, MethodDescriptor<K>>,
}

impl<K: Copy> MethodRegistry<K> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            methods: HashMap::new(),
        }
    }

    /// Add `C` under `kind`
    pub fn register<C: SolCall>(&mut self, kind: K) -> &mut Self {
        let signature = C::SIGNATURE;
        let name = signature.split('(').next().unwrap_or(signature);
        let previous = self.methods.insert(
            C::SELECTOR,
            MethodDescriptor {
                name,
                signature,
                selector: C::SELECTOR,
                kind,
            },
        );
        debug_assert!(previous.is_none(), "selector clash in {}: {}", self.label, name);
        self
    }

    /// Match the first 4 bytes of `calldata` and split off the argument body
    pub fn identify<'a>(&self, calldata: &'a [u8]) -> AppResult<(&MethodDescriptor<K>, &'a [u8])> {
        if calldata.len() < 4 {
            return Err(AppError::new(
                ErrorCode::CalldataTooShort,
                format!(
                    "{} bytes of calldata for {}, need a 4-byte selector",
                    calldata.len(),
                    self.label
                ),
            ));
        }

        let (head, tail) = calldata.split_at(4);
        let selector: Selector = [head[0], head[1], head[2], head[3]];
        let descriptor = self
            .methods
            .get(&selector)
            .ok_or_else(|| AppError::unknown_method(self.label, selector))?;

        debug!("🔎 {} -> {}", hex::encode(selector), descriptor.name);
        Ok((descriptor, tail))
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &MethodDescriptor<K>> {
        self.methods.values()
    }
}

impl MethodRegistry<V2Shape> {
    /// Add a V2 swap, shape taken from its name
    fn register_v2<C: SolCall>(&mut self) -> &mut Self {
        let name = C::SIGNATURE.split('(').next().unwrap_or(C::SIGNATURE);
        self.register::<C>(V2Shape::from_method_name(name))
    }
}

/// All registries the decoder consults
#[derive(Debug, Clone)]
pub struct MethodRegistries {
    pub so_diamond: MethodRegistry<OuterMethod>,
    pub uniswap_v2: MethodRegistry<V2Shape>,
    pub uniswap_v2_avax: MethodRegistry<V2Shape>,
    pub swap_router: MethodRegistry<V3Method>,
}

impl MethodRegistries {
    pub fn build() -> Self {
        let mut so_diamond = MethodRegistry::new("SoDiamond");
        so_diamond
            .register::<ISoDiamond::swapTokensGenericCall>(OuterMethod::SwapTokensGeneric)
            .register::<ISoDiamond::soSwapViaStargateCall>(OuterMethod::SoSwapViaStargate);

        let mut uniswap_v2 = MethodRegistry::new("IUniswapV2Router02");
        {
            use IUniswapV2Router02::*;
            uniswap_v2
                .register_v2::<swapExactTokensForTokensCall>()
                .register_v2::<swapTokensForExactTokensCall>()
                .register_v2::<swapExactETHForTokensCall>()
                .register_v2::<swapTokensForExactETHCall>()
                .register_v2::<swapExactTokensForETHCall>()
                .register_v2::<swapETHForExactTokensCall>()
                .register_v2::<swapExactTokensForTokensSupportingFeeOnTransferTokensCall>()
                .register_v2::<swapExactETHForTokensSupportingFeeOnTransferTokensCall>()
                .register_v2::<swapExactTokensForETHSupportingFeeOnTransferTokensCall>();
        }

        let mut uniswap_v2_avax = MethodRegistry::new("IUniswapV2Router02AVAX");
        {
            use IUniswapV2Router02AVAX::*;
            uniswap_v2_avax
                .register_v2::<swapExactTokensForTokensCall>()
                .register_v2::<swapTokensForExactTokensCall>()
                .register_v2::<swapExactAVAXForTokensCall>()
                .register_v2::<swapTokensForExactAVAXCall>()
                .register_v2::<swapExactTokensForAVAXCall>()
                .register_v2::<swapAVAXForExactTokensCall>()
                .register_v2::<swapExactTokensForTokensSupportingFeeOnTransferTokensCall>()
                .register_v2::<swapExactAVAXForTokensSupportingFeeOnTransferTokensCall>()
                .register_v2::<swapExactTokensForAVAXSupportingFeeOnTransferTokensCall>();
        }

        let mut swap_router = MethodRegistry::new("ISwapRouter");
        swap_router
            .register::<ISwapRouter::exactInputCall>(V3Method::ExactInput)
            .register::<ISwapRouter::exactInputSingleCall>(V3Method::ExactInputSingle)
            .register::<ISwapRouter::exactOutputCall>(V3Method::ExactOutput)
            .register::<ISwapRouter::exactOutputSingleCall>(V3Method::ExactOutputSingle);

        debug!(
            "Method registries ready: {} outer, {} v2, {} v2-avax, {} v3",
            so_diamond.len(),
            uniswap_v2.len(),
            uniswap_v2_avax.len(),
            swap_router.len()
        );

        Self {
            so_diamond,
            uniswap_v2,
            uniswap_v2_avax,
            swap_router,
        }
    }

    /// V2 address book for a router family
    pub fn v2_for(&self, family: RouterFamily) -> Option<&MethodRegistry<V2Shape>> {
        match family {
            RouterFamily::UniswapV2 => Some(&self.uniswap_v2),
            RouterFamily::UniswapV2Avax => Some(&self.uniswap_v2_avax),
            RouterFamily::UniswapV3 | RouterFamily::Unsupported => None,
        }
    }
}

impl Default for MethodRegistries {
    fn default() -> Self {
        Self::build()
    }
}
