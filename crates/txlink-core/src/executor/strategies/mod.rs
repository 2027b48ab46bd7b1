//! Per-kind execution strategies.
//!
//! A strategy knows which steps its operation kind takes and how to derive
//! addresses, amounts and calldata from the plan. The executor supplies the
//! network switch, phase bookkeeping and submission.

mod swap;
mod transfer;
mod wrap;

pub use swap::SwapStrategy;
pub use transfer::TransferStrategy;
pub use wrap::WrapStrategy;

use super::{ExecutionParams, RunContext};
use alloy_primitives::{B256, U256};
use async_trait::async_trait;
use txlink_types::{ExecutionError, OperationKind, OperationPlan, TokenAmount};

/// Steps of one operation kind.
#[async_trait]
pub trait OperationStrategy: Send + Sync {
	fn kind(&self) -> OperationKind;

	/// Checks that need neither wallet nor chain. Runs before the network
	/// switch, so a failure here means nothing was requested from the wallet.
	fn check(&self, _plan: &OperationPlan, _params: &ExecutionParams) -> Result<(), ExecutionError> {
		Ok(())
	}

	/// Runs the kind's on-chain steps and returns the final transaction hash.
	async fn execute(&self, context: &RunContext<'_>) -> Result<B256, ExecutionError>;
}

/// Strategy for an operation kind.
pub fn strategy_for(kind: OperationKind) -> &'static dyn OperationStrategy {
	match kind {
		OperationKind::Transfer => &TransferStrategy,
		OperationKind::Wrap => &WrapStrategy,
		OperationKind::Swap => &SwapStrategy,
	}
}

/// Scales a human amount to base units, rejecting excess precision.
fn to_base_units(amount: &TokenAmount, decimals: u8) -> Result<U256, ExecutionError> {
	amount
		.to_base_units(decimals)
		.map_err(|e| ExecutionError::InvalidAmount(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use txlink_types::utils::tests::builders::OperationPlanBuilder;

	#[test]
	fn test_strategy_for_kind() {
		for kind in [OperationKind::Transfer, OperationKind::Wrap, OperationKind::Swap] {
			assert_eq!(strategy_for(kind).kind(), kind);
		}
	}

	#[test]
	fn test_only_swap_needs_min_amount_out() {
		let params = ExecutionParams::default();
		assert!(TransferStrategy
			.check(&OperationPlanBuilder::transfer().build(), &params)
			.is_ok());
		assert!(WrapStrategy
			.check(&OperationPlanBuilder::wrap().build(), &params)
			.is_ok());
		assert_eq!(
			SwapStrategy.check(&OperationPlanBuilder::swap().build(), &params),
			Err(ExecutionError::MissingParameter("min_amount_out"))
		);
	}

	#[test]
	fn test_to_base_units_rejects_excess_precision() {
		let amount: TokenAmount = "0.0000001".parse().unwrap();
		assert_eq!(to_base_units(&amount, 7).unwrap(), U256::from(1u8));
		assert!(matches!(
			to_base_units(&amount, 6),
			Err(ExecutionError::InvalidAmount(_))
		));
	}
}
