//! Contract interfaces used by the decoder
//!
//! SoDiamond (outer call), the two V2 router address books, the V3 swap
//! router and ERC-20 metadata.

use alloy_sol_types::sol;

sol! {
    interface ISoDiamond {
        struct SoData {
            bytes32 transactionId;
            address receiver;
            uint256 sourceChainId;
            address sendingAssetId;
            uint256 destinationChainId;
            address receivingAssetId;
            uint256 amount;
        }

        struct SwapData {
            address callTo;
            address approveTo;
            address sendingAssetId;
            address receivingAssetId;
            uint256 fromAmount;
            bytes callData;
        }

        struct StargateData {
            uint256 srcStargatePoolId;
            uint16 dstStargateChainId;
            uint256 dstStargatePoolId;
            uint256 minAmount;
            uint256 dstGasForSgReceive;
            address dstSoDiamond;
        }

        function swapTokensGeneric(
            SoData soData,
            SwapData[] swapData
        ) external payable;

        function soSwapViaStargate(
            SoData soData,
            SwapData[] swapDataSrc,
            StargateData stargateData,
            SwapData[] swapDataDst
        ) external payable;
    }
}

sol! {
    interface IUniswapV2Router02 {
        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);

        function swapTokensForExactTokens(
            uint256 amountOut,
            uint256 amountInMax,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);

        function swapExactETHForTokens(
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external payable returns (uint256[] memory amounts);

        function swapTokensForExactETH(
            uint256 amountOut,
            uint256 amountInMax,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);

        function swapExactTokensForETH(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);

        function swapETHForExactTokens(
            uint256 amountOut,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external payable returns (uint256[] memory amounts);

        function swapExactTokensForTokensSupportingFeeOnTransferTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external;

        function swapExactETHForTokensSupportingFeeOnTransferTokens(
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external payable;

        function swapExactTokensForETHSupportingFeeOnTransferTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external;
    }
}

// TraderJoe / Pangolin: same layouts, AVAX in the method names
sol! {
    interface IUniswapV2Router02AVAX {
        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);

        function swapTokensForExactTokens(
            uint256 amountOut,
            uint256 amountInMax,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);

        function swapExactAVAXForTokens(
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external payable returns (uint256[] memory amounts);

        function swapTokensForExactAVAX(
            uint256 amountOut,
            uint256 amountInMax,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);

        function swapExactTokensForAVAX(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);

        function swapAVAXForExactTokens(
            uint256 amountOut,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external payable returns (uint256[] memory amounts);

        function swapExactTokensForTokensSupportingFeeOnTransferTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external;

        function swapExactAVAXForTokensSupportingFeeOnTransferTokens(
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external payable;

        function swapExactTokensForAVAXSupportingFeeOnTransferTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external;
    }
}

sol! {
    interface ISwapRouter {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 deadline;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }

        struct ExactInputParams {
            bytes path;
            address recipient;
            uint256 deadline;
            uint256 amountIn;
            uint256 amountOutMinimum;
        }

        struct ExactOutputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 deadline;
            uint256 amountOut;
            uint256 amountInMaximum;
            uint160 sqrtPriceLimitX96;
        }

        struct ExactOutputParams {
            bytes path;
            address recipient;
            uint256 deadline;
            uint256 amountOut;
            uint256 amountInMaximum;
        }

        function exactInputSingle(ExactInputSingleParams params) external payable returns (uint256 amountOut);
        function exactInput(ExactInputParams params) external payable returns (uint256 amountOut);
        function exactOutputSingle(ExactOutputSingleParams params) external payable returns (uint256 amountIn);
        function exactOutput(ExactOutputParams params) external payable returns (uint256 amountIn);
    }
}

/// Argument layouts shared by every V2 swap method. The selector differs per
/// method but the body after it is one of these three.
pub mod shapes {
    use alloy_sol_types::sol;

    sol! {
        function exactTokensIn(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] path,
            address to,
            uint256 deadline
        );

        function balanceIn(
            uint256 amountOutMin,
            address[] path,
            address to,
            uint256 deadline
        );

        function exactTokensOut(
            uint256 amountOut,
            uint256 amountInMax,
            address[] path,
            address to,
            uint256 deadline
        );
    }
}

sol! {
    interface IERC20Metadata {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }
}

// Pre-standard tokens (MKR, SAI) return bytes32 instead of string
sol! {
    interface IERC20Bytes32 {
        function name() external view returns (bytes32);
        function symbol() external view returns (bytes32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::SolCall;

    #[test]
    fn test_known_selectors() {
        assert_eq!(
            IUniswapV2Router02::swapExactTokensForTokensCall::SELECTOR,
            [0x38, 0xed, 0x17, 0x39]
        );
        assert_eq!(
            IUniswapV2Router02::swapExactETHForTokensCall::SELECTOR,
            [0x7f, 0xf3, 0x6a, 0xb5]
        );
        assert_eq!(ISwapRouter::exactInputCall::SELECTOR, [0xc0, 0x4b, 0x8d, 0x59]);
        assert_eq!(IERC20Metadata::decimalsCall::SELECTOR, [0x31, 0x3c, 0xe5, 0x67]);
    }

    #[test]
    fn test_shape_bodies_match_router_methods() {
        use alloy_primitives::{Address, U256};

        let call = IUniswapV2Router02::swapExactTokensForETHCall {
            amountIn: U256::from(10),
            amountOutMin: U256::from(9),
            path: vec![Address::repeat_byte(1), Address::ZERO],
            to: Address::repeat_byte(2),
            deadline: U256::from(1_700_000_000u64),
        };
        let encoded = call.abi_encode();
        let body = shapes::exactTokensInCall::abi_decode_raw(&encoded[4..], true).unwrap();
        assert_eq!(body.amountIn, U256::from(10));
        assert_eq!(body.path.len(), 2);
    }
}
