//! Call Decoder
//!
//! Turns raw call bytes into typed requests: the outer SoDiamond call into a
//! `SwapRequest`, and a leg's router call into an `InnerSwap`.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;

use crate::core::abi::{shapes, ISoDiamond, ISwapRouter};
use crate::core::path::{decode_path, PackedPath};
use crate::core::registry::{MethodDescriptor, MethodRegistry, OuterMethod, V2Shape, V3Method};
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{RelayEnvelope, SwapLeg, SwapRequest, TransferEnvelope};

impl From<ISoDiamond::SoData> for TransferEnvelope {
    fn from(data: ISoDiamond::SoData) -> Self {
        Self {
            transaction_id: data.transactionId,
            receiver: data.receiver,
            source_chain_id: data.sourceChainId,
            sending_asset: data.sendingAssetId,
            destination_chain_id: data.destinationChainId,
            receiving_asset: data.receivingAssetId,
            amount: data.amount,
        }
    }
}

impl From<ISoDiamond::SwapData> for SwapLeg {
    fn from(data: ISoDiamond::SwapData) -> Self {
        Self {
            call_to: data.callTo,
            approve_to: data.approveTo,
            sending_asset: data.sendingAssetId,
            receiving_asset: data.receivingAssetId,
            from_amount: data.fromAmount,
            call_data: data.callData,
        }
    }
}

impl From<ISoDiamond::StargateData> for RelayEnvelope {
    fn from(data: ISoDiamond::StargateData) -> Self {
        Self {
            src_pool_id: data.srcStargatePoolId,
            dst_relay_chain_id: data.dstStargateChainId,
            dst_pool_id: data.dstStargatePoolId,
            min_amount: data.minAmount,
            dst_gas: data.dstGasForSgReceive,
            dst_contract: data.dstSoDiamond,
        }
    }
}

fn legs(data: Vec<ISoDiamond::SwapData>) -> Vec<SwapLeg> {
    data.into_iter().map(SwapLeg::from).collect()
}

fn decode_error(method: &str, err: alloy_sol_types::Error) -> AppError {
    AppError::decode_failed(format!("{}: {}", method, err))
}

/// Decode the argument body of an outer call
pub fn unpack(descriptor: &MethodDescriptor<OuterMethod>, tail: &[u8]) -> AppResult<SwapRequest> {
    match descriptor.kind {
        OuterMethod::SwapTokensGeneric => {
            let call = ISoDiamond::swapTokensGenericCall::abi_decode_raw(tail, false)
                .map_err(|e| decode_error(descriptor.name, e))?;
            Ok(SwapRequest::Generic {
                envelope: call.soData.into(),
                legs: legs(call.swapData),
            })
        }
        OuterMethod::SoSwapViaStargate => {
            let call = ISoDiamond::soSwapViaStargateCall::abi_decode_raw(tail, false)
                .map_err(|e| decode_error(descriptor.name, e))?;
            Ok(SwapRequest::Relay {
                envelope: call.soData.into(),
                src_legs: legs(call.swapDataSrc),
                relay: call.stargateData.into(),
                dst_legs: legs(call.swapDataDst),
            })
        }
    }
}

/// `identify` then `unpack` against the SoDiamond registry
pub fn decode_outer(
    registry: &MethodRegistry<OuterMethod>,
    calldata: &[u8],
) -> AppResult<(&'static str, SwapRequest)> {
    let (descriptor, tail) = registry.identify(calldata)?;
    Ok((descriptor.name, unpack(descriptor, tail)?))
}

/// Router-agnostic view of one decoded swap call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerSwap {
    pub method: &'static str,
    /// Input token first
    pub tokens: Vec<Address>,
    /// Per-hop pool fees; only path-based routers have them
    pub fees: Option<Vec<u32>>,
    /// None when the input comes from msg.value or is bounded by a maximum
    pub amount_in: Option<U256>,
    /// Minimum acceptable output, or the exact output for exact-out swaps
    pub min_out: U256,
    pub exact_out: bool,
    pub deadline: U256,
}

/// Decode a V2 router call body by its argument shape
pub fn unpack_v2(descriptor: &MethodDescriptor<V2Shape>, tail: &[u8]) -> AppResult<InnerSwap> {
    let method = descriptor.name;
    let swap = match descriptor.kind {
        V2Shape::ExactTokensIn => {
            let call = shapes::exactTokensInCall::abi_decode_raw(tail, false)
                .map_err(|e| decode_error(method, e))?;
            InnerSwap {
                method,
                tokens: call.path,
                fees: None,
                amount_in: Some(call.amountIn),
                min_out: call.amountOutMin,
                exact_out: false,
                deadline: call.deadline,
            }
        }
        V2Shape::BalanceIn => {
            let call = shapes::balanceInCall::abi_decode_raw(tail, false)
                .map_err(|e| decode_error(method, e))?;
            InnerSwap {
                method,
                tokens: call.path,
                fees: None,
                amount_in: None,
                min_out: call.amountOutMin,
                exact_out: false,
                deadline: call.deadline,
            }
        }
        V2Shape::ExactTokensOut => {
            let call = shapes::exactTokensOutCall::abi_decode_raw(tail, false)
                .map_err(|e| decode_error(method, e))?;
            InnerSwap {
                method,
                tokens: call.path,
                fees: None,
                amount_in: None,
                min_out: call.amountOut,
                exact_out: true,
                deadline: call.deadline,
            }
        }
    };

    if swap.tokens.len() < 2 {
        return Err(AppError::decode_failed(format!(
            "{}: path has {} tokens",
            method,
            swap.tokens.len()
        )));
    }
    Ok(swap)
}

/// Decode a V3 router call body. Multi-hop paths go through the path codec;
/// exact-output paths are stored output-first and come back in swap order.
pub fn unpack_v3(descriptor: &MethodDescriptor<V3Method>, tail: &[u8]) -> AppResult<InnerSwap> {
    let method = descriptor.name;
    match descriptor.kind {
        V3Method::ExactInput => {
            let params = ISwapRouter::exactInputCall::abi_decode_raw(tail, false)
                .map_err(|e| decode_error(method, e))?
                .params;
            let path = decode_path(&params.path)?;
            Ok(InnerSwap {
                method,
                tokens: path.tokens,
                fees: Some(path.fees),
                amount_in: Some(params.amountIn),
                min_out: params.amountOutMinimum,
                exact_out: false,
                deadline: params.deadline,
            })
        }
        V3Method::ExactOutput => {
            let params = ISwapRouter::exactOutputCall::abi_decode_raw(tail, false)
                .map_err(|e| decode_error(method, e))?
                .params;
            let path: PackedPath = decode_path(&params.path)?.reversed();
            Ok(InnerSwap {
                method,
                tokens: path.tokens,
                fees: Some(path.fees),
                amount_in: None,
                min_out: params.amountOut,
                exact_out: true,
                deadline: params.deadline,
            })
        }
        V3Method::ExactInputSingle => {
            let params = ISwapRouter::exactInputSingleCall::abi_decode_raw(tail, false)
                .map_err(|e| decode_error(method, e))?
                .params;
            Ok(InnerSwap {
                method,
                tokens: vec![params.tokenIn, params.tokenOut],
                fees: Some(vec![params.fee.to::<u32>()]),
                amount_in: Some(params.amountIn),
                min_out: params.amountOutMinimum,
                exact_out: false,
                deadline: params.deadline,
            })
        }
        V3Method::ExactOutputSingle => {
            let params = ISwapRouter::exactOutputSingleCall::abi_decode_raw(tail, false)
                .map_err(|e| decode_error(method, e))?
                .params;
            Ok(InnerSwap {
                method,
                tokens: vec![params.tokenIn, params.tokenOut],
                fees: Some(vec![params.fee.to::<u32>()]),
                amount_in: None,
                min_out: params.amountOut,
                exact_out: true,
                deadline: params.deadline,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::abi::{IUniswapV2Router02, IUniswapV2Router02AVAX};
    use crate::core::path::encode_path;
    use crate::core::registry::MethodRegistries;
    use crate::models::errors::ErrorCode;
    use alloy_primitives::{Bytes, B256};

    fn so_data() -> ISoDiamond::SoData {
        ISoDiamond::SoData {
            transactionId: B256::repeat_byte(0xaa),
            receiver: Address::repeat_byte(0x01),
            sourceChainId: U256::from(56),
            sendingAssetId: Address::ZERO,
            destinationChainId: U256::from(137),
            receivingAssetId: Address::repeat_byte(0x02),
            amount: U256::from(1_000_000_000_000_000_000u128),
        }
    }

    fn swap_data(call_data: Vec<u8>) -> ISoDiamond::SwapData {
        ISoDiamond::SwapData {
            callTo: Address::repeat_byte(0x10),
            approveTo: Address::repeat_byte(0x10),
            sendingAssetId: Address::ZERO,
            receivingAssetId: Address::repeat_byte(0x03),
            fromAmount: U256::from(5),
            callData: Bytes::from(call_data),
        }
    }

    #[test]
    fn test_decode_generic() {
        let registries = MethodRegistries::build();
        let calldata = ISoDiamond::swapTokensGenericCall {
            soData: so_data(),
            swapData: vec![swap_data(vec![1, 2, 3])],
        }
        .abi_encode();

        let (method, request) = decode_outer(&registries.so_diamond, &calldata).unwrap();
        assert_eq!(method, "swapTokensGeneric");
        match request {
            SwapRequest::Generic { envelope, legs } => {
                assert_eq!(envelope.source_chain_id, U256::from(56));
                assert_eq!(envelope.transaction_id, B256::repeat_byte(0xaa));
                assert_eq!(legs.len(), 1);
                assert_eq!(legs[0].call_data.as_ref(), &[1, 2, 3]);
            }
            other => panic!("expected generic swap, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_relay() {
        let registries = MethodRegistries::build();
        let calldata = ISoDiamond::soSwapViaStargateCall {
            soData: so_data(),
            swapDataSrc: vec![],
            stargateData: ISoDiamond::StargateData {
                srcStargatePoolId: U256::from(2),
                dstStargateChainId: 109,
                dstStargatePoolId: U256::from(1),
                minAmount: U256::from(990),
                dstGasForSgReceive: U256::from(200_000),
                dstSoDiamond: Address::repeat_byte(0x29),
            },
            swapDataDst: vec![swap_data(vec![]), swap_data(vec![])],
        }
        .abi_encode();

        let (_, request) = decode_outer(&registries.so_diamond, &calldata).unwrap();
        match request {
            SwapRequest::Relay {
                src_legs,
                relay,
                dst_legs,
                ..
            } => {
                assert!(src_legs.is_empty());
                assert_eq!(dst_legs.len(), 2);
                assert_eq!(relay.dst_relay_chain_id, 109);
                assert_eq!(relay.dst_pool_id, U256::from(1));
            }
            other => panic!("expected relay swap, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_body_is_decode_error() {
        let registries = MethodRegistries::build();
        let mut calldata = ISoDiamond::swapTokensGenericCall {
            soData: so_data(),
            swapData: vec![],
        }
        .abi_encode();
        calldata.truncate(100);

        let err = decode_outer(&registries.so_diamond, &calldata).unwrap_err();
        assert_eq!(err.code, ErrorCode::DecodeFailed);
    }

    #[test]
    fn test_v2_shapes() {
        let registries = MethodRegistries::build();
        let path = vec![Address::repeat_byte(1), Address::repeat_byte(2)];

        let exact_in = IUniswapV2Router02::swapExactTokensForTokensCall {
            amountIn: U256::from(100),
            amountOutMin: U256::from(90),
            path: path.clone(),
            to: Address::ZERO,
            deadline: U256::from(1),
        }
        .abi_encode();
        let (descriptor, tail) = registries.uniswap_v2.identify(&exact_in).unwrap();
        let swap = unpack_v2(descriptor, tail).unwrap();
        assert_eq!(swap.amount_in, Some(U256::from(100)));
        assert_eq!(swap.min_out, U256::from(90));
        assert_eq!(swap.tokens, path);

        let balance_in = IUniswapV2Router02AVAX::swapExactAVAXForTokensCall {
            amountOutMin: U256::from(42),
            path: path.clone(),
            to: Address::ZERO,
            deadline: U256::from(1),
        }
        .abi_encode();
        let (descriptor, tail) = registries.uniswap_v2_avax.identify(&balance_in).unwrap();
        let swap = unpack_v2(descriptor, tail).unwrap();
        assert_eq!(swap.amount_in, None);
        assert_eq!(swap.min_out, U256::from(42));

        let exact_out = IUniswapV2Router02::swapTokensForExactTokensCall {
            amountOut: U256::from(7),
            amountInMax: U256::from(70),
            path,
            to: Address::ZERO,
            deadline: U256::from(1),
        }
        .abi_encode();
        let (descriptor, tail) = registries.uniswap_v2.identify(&exact_out).unwrap();
        let swap = unpack_v2(descriptor, tail).unwrap();
        assert!(swap.exact_out);
        assert_eq!(swap.min_out, U256::from(7));
    }

    #[test]
    fn test_v3_exact_input() {
        let registries = MethodRegistries::build();
        let tokens = vec![Address::repeat_byte(1), Address::repeat_byte(2), Address::repeat_byte(3)];
        let calldata = ISwapRouter::exactInputCall {
            params: ISwapRouter::ExactInputParams {
                path: encode_path(&tokens, &[500, 3000]).unwrap().into(),
                recipient: Address::ZERO,
                deadline: U256::from(1_700_000_000u64),
                amountIn: U256::from(1000),
                amountOutMinimum: U256::from(900),
            },
        }
        .abi_encode();

        let (descriptor, tail) = registries.swap_router.identify(&calldata).unwrap();
        let swap = unpack_v3(descriptor, tail).unwrap();
        assert_eq!(swap.tokens, tokens);
        assert_eq!(swap.fees, Some(vec![500, 3000]));
        assert_eq!(swap.min_out, U256::from(900));
    }

    #[test]
    fn test_v3_exact_output_is_reordered() {
        let registries = MethodRegistries::build();
        let stored = vec![Address::repeat_byte(3), Address::repeat_byte(2), Address::repeat_byte(1)];
        let calldata = ISwapRouter::exactOutputCall {
            params: ISwapRouter::ExactOutputParams {
                path: encode_path(&stored, &[3000, 500]).unwrap().into(),
                recipient: Address::ZERO,
                deadline: U256::from(1),
                amountOut: U256::from(5),
                amountInMaximum: U256::from(50),
            },
        }
        .abi_encode();

        let (descriptor, tail) = registries.swap_router.identify(&calldata).unwrap();
        let swap = unpack_v3(descriptor, tail).unwrap();
        assert_eq!(swap.tokens[0], Address::repeat_byte(1));
        assert_eq!(swap.fees, Some(vec![500, 3000]));
        assert!(swap.exact_out);
    }

    #[test]
    fn test_v3_malformed_path() {
        let registries = MethodRegistries::build();
        let calldata = ISwapRouter::exactInputCall {
            params: ISwapRouter::ExactInputParams {
                path: Bytes::from(vec![0u8; 42]),
                recipient: Address::ZERO,
                deadline: U256::from(1),
                amountIn: U256::from(1),
                amountOutMinimum: U256::from(1),
            },
        }
        .abi_encode();

        let (descriptor, tail) = registries.swap_router.identify(&calldata).unwrap();
        let err = unpack_v3(descriptor, tail).unwrap_err();
        assert_eq!(err.code, ErrorCode::PathMalformed);
    }
}
