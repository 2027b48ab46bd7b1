//! Contract interfaces the pipeline calls.

use alloy_sol_types::sol;

sol! {
	interface IERC20 {
		function name() external view returns (string);
		function symbol() external view returns (string);
		function decimals() external view returns (uint8);
		function totalSupply() external view returns (uint256);
		function allowance(address owner, address spender) external view returns (uint256);
		function approve(address spender, uint256 amount) external returns (bool);
		function transfer(address to, uint256 amount) external returns (bool);
	}

	interface IWrappedNative {
		function deposit() external payable;
	}

	// Exact-in router as deployed on the Cronos networks (no deadline argument).
	interface IRouter {
		function swapExactTokensForTokens(
			uint256 amountIn,
			uint256 amountOutMin,
			address[] calldata path,
			address to
		) external returns (uint256[] memory amounts);
	}
}
