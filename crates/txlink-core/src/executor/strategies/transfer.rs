use super::{to_base_units, OperationStrategy};
use crate::executor::RunContext;
use alloy_primitives::B256;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use txlink_types::{
	ActionKind, ExecutionError, ExecutionPhase, OperationKind, Participants, DEFAULT_DECIMALS,
};
use txlink_wallet::abi::IERC20;

/// Native or ERC-20 transfer in a single signer call.
pub struct TransferStrategy;

#[async_trait]
impl OperationStrategy for TransferStrategy {
	fn kind(&self) -> OperationKind {
		OperationKind::Transfer
	}

	async fn execute(&self, context: &RunContext<'_>) -> Result<B256, ExecutionError> {
		let Participants::Transfer { recipient, token } = context.plan.participants else {
			return Err(ExecutionError::MissingParameter("transfer participants"));
		};
		let step = context
			.plan
			.step(ActionKind::Transfer)
			.ok_or(ExecutionError::MissingParameter("transfer step"))?;

		match token {
			Some(token) => {
				let decimals = context.decimals(token).await;
				let amount = to_base_units(&step.amount, decimals)?;
				let data = IERC20::transferCall {
					to: recipient,
					amount,
				}
				.abi_encode();

				context.enter(ExecutionPhase::Signing).await?;
				context
					.submit(ActionKind::Transfer, token, None, Some(data.into()))
					.await
			},
			None => {
				let value = to_base_units(&step.amount, DEFAULT_DECIMALS)?;

				context.enter(ExecutionPhase::Signing).await?;
				context
					.submit(ActionKind::Transfer, recipient, Some(value), None)
					.await
			},
		}
	}
}
