use super::{to_base_units, OperationStrategy};
use crate::executor::RunContext;
use alloy_primitives::B256;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use txlink_types::{
	ActionKind, ExecutionError, ExecutionPhase, OperationKind, Participants, DEFAULT_DECIMALS,
};
use txlink_wallet::abi::IWrappedNative;

/// `deposit()` into the chain's wrapped native token.
pub struct WrapStrategy;

#[async_trait]
impl OperationStrategy for WrapStrategy {
	fn kind(&self) -> OperationKind {
		OperationKind::Wrap
	}

	async fn execute(&self, context: &RunContext<'_>) -> Result<B256, ExecutionError> {
		let Participants::Wrap { wrapped_token } = context.plan.participants else {
			return Err(ExecutionError::MissingParameter("wrap participants"));
		};
		let step = context
			.plan
			.step(ActionKind::Deposit)
			.ok_or(ExecutionError::MissingParameter("deposit step"))?;
		let value = to_base_units(&step.amount, DEFAULT_DECIMALS)?;
		let data = IWrappedNative::depositCall {}.abi_encode();

		context.enter(ExecutionPhase::Depositing).await?;
		context
			.submit(ActionKind::Deposit, wrapped_token, Some(value), Some(data.into()))
			.await
	}
}
