use super::{to_base_units, OperationStrategy};
use crate::executor::{ExecutionParams, RunContext};
use alloy_primitives::B256;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use txlink_types::{
	ActionKind, ExecutionError, ExecutionPhase, OperationKind, OperationPlan, Participants,
};
use txlink_wallet::abi::{IRouter, IERC20};

/// Approve-then-swap through the chain's router.
///
/// The approval is skipped when the router's allowance already covers the
/// swap amount, so running a plan again after a failed swap goes straight
/// to the swap.
pub struct SwapStrategy;

#[async_trait]
impl OperationStrategy for SwapStrategy {
	fn kind(&self) -> OperationKind {
		OperationKind::Swap
	}

	fn check(&self, _plan: &OperationPlan, params: &ExecutionParams) -> Result<(), ExecutionError> {
		if params.min_amount_out.is_none() {
			return Err(ExecutionError::MissingParameter("min_amount_out"));
		}
		Ok(())
	}

	async fn execute(&self, context: &RunContext<'_>) -> Result<B256, ExecutionError> {
		let Participants::Swap {
			router,
			from_token,
			to_token,
		} = context.plan.participants
		else {
			return Err(ExecutionError::MissingParameter("swap participants"));
		};
		let swap_step = context
			.plan
			.step(ActionKind::Swap)
			.ok_or(ExecutionError::MissingParameter("swap step"))?;
		let min_amount_out = context
			.params
			.min_amount_out
			.as_ref()
			.ok_or(ExecutionError::MissingParameter("min_amount_out"))?;

		// all amounts are scaled before anything is signed
		let decimals_in = context.decimals(from_token).await;
		let amount_in = to_base_units(&swap_step.amount, decimals_in)?;
		let approve_amount = match context.plan.step(ActionKind::Approve) {
			Some(step) => to_base_units(&step.amount, decimals_in)?.max(amount_in),
			None => amount_in,
		};
		let decimals_out = context.decimals(to_token).await;
		let amount_out_min = to_base_units(min_amount_out, decimals_out)?;

		let allowance = context.allowance(from_token, router).await?;
		if allowance < amount_in {
			tracing::info!(%allowance, required = %amount_in, "Approving router");
			let data = IERC20::approveCall {
				spender: router,
				amount: approve_amount,
			}
			.abi_encode();

			context.enter(ExecutionPhase::Approving).await?;
			context
				.submit(ActionKind::Approve, from_token, None, Some(data.into()))
				.await?;
		} else {
			tracing::info!(%allowance, "Allowance covers swap, skipping approval");
		}
		context.enter(ExecutionPhase::Approved).await?;

		let data = IRouter::swapExactTokensForTokensCall {
			amountIn: amount_in,
			amountOutMin: amount_out_min,
			path: vec![from_token, to_token],
			to: context.owner,
		}
		.abi_encode();

		context.enter(ExecutionPhase::Swapping).await?;
		context
			.submit(ActionKind::Swap, router, None, Some(data.into()))
			.await
	}
}
