//! Operation executor.
//!
//! Drives one plan through its phases: the network switch, then the
//! on-chain steps of the operation kind, then confirmation. The per-kind
//! parts live in [`strategies`]; this module owns the state, the run lock,
//! transition checks, signer submission and receipt polling.
//!
//! Phases only move along the edges in [`transitions`]. A failure at any
//! point records the error, keeps the last completed phase as checkpoint and
//! ends the run in `Failed`. Nothing is retried automatically; running the
//! same plan again starts over and re-reads on-chain state.

pub mod strategies;
pub mod transitions;

use crate::event_bus::EventBus;
use crate::reconciler::NetworkReconciler;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::instrument;
use txlink_config::{Config, GasOverride};
use txlink_types::{
	ActionKind, ExecutionError, ExecutionPhase, ExecutionState, OperationPlan, ProgressEvent,
	TokenAmount, DEFAULT_DECIMALS,
};
use txlink_wallet::abi::IERC20;
use txlink_wallet::{CallParams, ReceiptSummary, TransactionParams, WalletClient, WalletError};

pub use strategies::{strategy_for, OperationStrategy, SwapStrategy, TransferStrategy, WrapStrategy};
pub use transitions::is_valid_transition;

const GWEI: u64 = 1_000_000_000;

/// Caller-supplied parameters that are not part of the intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionParams {
	/// Minimum swap output in to-token units. Required for swaps.
	pub min_amount_out: Option<TokenAmount>,
}

impl ExecutionParams {
	pub fn with_min_amount_out(min_amount_out: TokenAmount) -> Self {
		Self {
			min_amount_out: Some(min_amount_out),
		}
	}
}

/// Executor tuning.
#[derive(Debug, Clone)]
pub struct ExecutorSettings {
	/// Delay between receipt polls.
	pub poll_interval: Duration,
	/// Gas overrides per step kind.
	pub gas: HashMap<ActionKind, GasOverride>,
}

impl Default for ExecutorSettings {
	fn default() -> Self {
		Self {
			poll_interval: Duration::from_millis(1000),
			gas: HashMap::new(),
		}
	}
}

impl ExecutorSettings {
	pub fn from_config(config: &Config) -> Self {
		let gas = [
			ActionKind::Transfer,
			ActionKind::Deposit,
			ActionKind::Approve,
			ActionKind::Swap,
		]
		.into_iter()
		.filter_map(|action| config.execution.gas_for(action).map(|gas| (action, gas)))
		.collect();

		Self {
			poll_interval: Duration::from_millis(config.wallet.poll_interval_ms),
			gas,
		}
	}

	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}

	pub fn with_gas(mut self, action: ActionKind, gas: GasOverride) -> Self {
		self.gas.insert(action, gas);
		self
	}

	fn gas_for(&self, action: ActionKind) -> GasOverride {
		self.gas.get(&action).copied().unwrap_or_default()
	}
}

/// Maps a wallet error onto the executor's error classes.
///
/// 4001 is a rejection, anything reporting a revert is a revert, the rest
/// is treated as an RPC failure.
pub fn classify_wallet_error(error: WalletError) -> ExecutionError {
	if error.is_user_rejection() {
		ExecutionError::SignerRejected(error.message)
	} else if error.is_revert() {
		ExecutionError::CallReverted(error.message)
	} else {
		ExecutionError::RpcError(error.to_string())
	}
}

/// Runs operation plans against a wallet, one at a time.
///
/// Clones share state, run lock and event bus, so a clone handed to a
/// spawned task is the same executor.
#[derive(Clone)]
pub struct OperationExecutor {
	wallet: Option<WalletClient>,
	settings: Arc<ExecutorSettings>,
	state: Arc<RwLock<ExecutionState>>,
	run_lock: Arc<Mutex<()>>,
	event_bus: EventBus,
}

impl OperationExecutor {
	pub fn new(wallet: Option<WalletClient>, settings: ExecutorSettings) -> Self {
		Self {
			wallet,
			settings: Arc::new(settings),
			state: Arc::new(RwLock::new(ExecutionState::new())),
			run_lock: Arc::new(Mutex::new(())),
			event_bus: EventBus::default(),
		}
	}

	pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
		self.event_bus = event_bus;
		self
	}

	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
		self.event_bus.subscribe()
	}

	/// Snapshot of the current run state.
	pub async fn state(&self) -> ExecutionState {
		self.state.read().await.clone()
	}

	pub fn is_running(&self) -> bool {
		self.run_lock.try_lock().is_err()
	}

	/// Returns to `Idle`, dropping the previous run's outcome.
	pub async fn reset(&self) -> Result<(), ExecutionError> {
		let _guard = self
			.run_lock
			.try_lock()
			.map_err(|_| ExecutionError::RunInProgress)?;

		let from = {
			let mut state = self.state.write().await;
			let from = state.phase;
			*state = ExecutionState::new();
			from
		};
		if from != ExecutionPhase::Idle {
			self.publish(ProgressEvent::PhaseChanged {
				from,
				to: ExecutionPhase::Idle,
			});
		}
		Ok(())
	}

	/// Executes `plan` to completion and returns the final transaction hash.
	///
	/// Fails with `RunInProgress`, leaving the running state untouched, when
	/// another run holds the executor.
	#[instrument(skip_all, fields(kind = %plan.kind, chain_id = plan.chain.id))]
	pub async fn run(
		&self,
		plan: &OperationPlan,
		params: &ExecutionParams,
	) -> Result<B256, ExecutionError> {
		let _guard = self
			.run_lock
			.try_lock()
			.map_err(|_| ExecutionError::RunInProgress)?;
		*self.state.write().await = ExecutionState::new();

		match self.drive(plan, params).await {
			Ok(tx_hash) => {
				tracing::info!(tx_hash = %tx_hash, "Operation confirmed");
				Ok(tx_hash)
			},
			Err(error) => {
				self.fail(&error).await;
				Err(error)
			},
		}
	}

	/// Runs `plan` on a background task.
	pub fn spawn(&self, plan: OperationPlan, params: ExecutionParams) -> RunHandle {
		let executor = self.clone();
		let task = tokio::spawn(async move { executor.run(&plan, &params).await });
		RunHandle { task }
	}

	async fn drive(
		&self,
		plan: &OperationPlan,
		params: &ExecutionParams,
	) -> Result<B256, ExecutionError> {
		let strategy = strategy_for(plan.kind);
		strategy.check(plan, params)?;

		let wallet = self
			.wallet
			.as_ref()
			.ok_or(ExecutionError::WalletUnavailable)?;

		self.transition(ExecutionPhase::Switching).await?;
		NetworkReconciler::ensure_network(plan, Some(wallet)).await?;
		let owner = wallet
			.connected_account()
			.await
			.map_err(classify_wallet_error)?;

		let context = RunContext {
			executor: self,
			wallet,
			plan,
			params,
			owner,
		};
		let tx_hash = strategy.execute(&context).await?;

		self.transition(ExecutionPhase::Confirmed).await?;
		Ok(tx_hash)
	}

	async fn transition(&self, to: ExecutionPhase) -> Result<(), ExecutionError> {
		let from = {
			let mut state = self.state.write().await;
			let from = state.phase;
			if !is_valid_transition(from, to) {
				return Err(ExecutionError::InvalidTransition { from, to });
			}
			state.phase = to;
			if from != ExecutionPhase::Idle {
				state.checkpoint = Some(from);
			}
			from
		};

		tracing::info!(phase = %to, "Phase {} -> {}", from, to);
		self.publish(ProgressEvent::PhaseChanged { from, to });
		Ok(())
	}

	async fn fail(&self, error: &ExecutionError) {
		let from = {
			let mut state = self.state.write().await;
			state.last_error = Some(error.clone());
			let from = state.phase;
			if is_valid_transition(from, ExecutionPhase::Failed) {
				state.phase = ExecutionPhase::Failed;
				Some(from)
			} else {
				None
			}
		};

		tracing::warn!(error = %error, "Operation failed");
		if let Some(from) = from {
			self.publish(ProgressEvent::PhaseChanged {
				from,
				to: ExecutionPhase::Failed,
			});
		}
		self.publish(ProgressEvent::RunFailed {
			error: error.clone(),
		});
	}

	fn publish(&self, event: ProgressEvent) {
		let receivers = self.event_bus.publish(event);
		tracing::trace!(receivers, "Progress event published");
	}
}

/// What a strategy sees of the running executor.
pub struct RunContext<'a> {
	executor: &'a OperationExecutor,
	wallet: &'a WalletClient,
	pub plan: &'a OperationPlan,
	pub params: &'a ExecutionParams,
	/// Connected account, the sender of every transaction.
	pub owner: Address,
}

impl RunContext<'_> {
	/// Moves the run to `phase`.
	pub async fn enter(&self, phase: ExecutionPhase) -> Result<(), ExecutionError> {
		self.executor.transition(phase).await
	}

	/// Reads `decimals()` of an ERC-20 token.
	///
	/// A token that does not answer is scaled with [`DEFAULT_DECIMALS`].
	pub async fn decimals(&self, token: Address) -> u8 {
		let read = self
			.read(token, IERC20::decimalsCall {}.abi_encode())
			.await
			.and_then(|output| {
				IERC20::decimalsCall::abi_decode_returns(&output).map_err(|e| {
					ExecutionError::RpcError(format!("Invalid decimals() response: {e}"))
				})
			});
		read.unwrap_or_else(|e| {
			tracing::warn!(%token, error = %e, "decimals() unavailable, using {DEFAULT_DECIMALS}");
			DEFAULT_DECIMALS
		})
	}

	/// Reads `allowance(owner, spender)` of an ERC-20 token.
	pub async fn allowance(&self, token: Address, spender: Address) -> Result<U256, ExecutionError> {
		let call = IERC20::allowanceCall {
			owner: self.owner,
			spender,
		};
		let output = self.read(token, call.abi_encode()).await?;
		IERC20::allowanceCall::abi_decode_returns(&output).map_err(|e| {
			ExecutionError::RpcError(format!("Invalid allowance() response from {token}: {e}"))
		})
	}

	async fn read(&self, to: Address, data: Vec<u8>) -> Result<Bytes, ExecutionError> {
		self.wallet
			.call(&CallParams {
				from: Some(self.owner),
				to,
				data: data.into(),
			})
			.await
			.map_err(classify_wallet_error)
	}

	/// Signs and submits one transaction, then waits for its receipt.
	///
	/// The hash is recorded as soon as the wallet returns it. A mined
	/// transaction with failed status is a revert.
	#[instrument(skip_all, fields(action = %action, to = %to))]
	pub async fn submit(
		&self,
		action: ActionKind,
		to: Address,
		value: Option<U256>,
		data: Option<Bytes>,
	) -> Result<B256, ExecutionError> {
		let gas = self.executor.settings.gas_for(action);
		let tx = TransactionParams {
			from: self.owner,
			to,
			value,
			data,
			gas: gas.gas_limit.map(U256::from),
			gas_price: gas
				.gas_price_gwei
				.map(|gwei| U256::from(gwei) * U256::from(GWEI)),
		};

		self.executor.state.write().await.signer_calls += 1;
		let tx_hash = self
			.wallet
			.send_transaction(&tx)
			.await
			.map_err(classify_wallet_error)?;
		self.executor.state.write().await.last_tx_hash = Some(tx_hash);

		tracing::info!(tx_hash = %tx_hash, "Transaction submitted");
		self.executor
			.publish(ProgressEvent::TransactionSubmitted { action, tx_hash });

		let receipt = self.wait_for_receipt(tx_hash).await?;
		if !receipt.success {
			return Err(ExecutionError::CallReverted(format!(
				"{action} transaction {tx_hash} failed on chain"
			)));
		}

		tracing::info!(tx_hash = %tx_hash, block = ?receipt.block_number, "Transaction confirmed");
		self.executor.publish(ProgressEvent::TransactionConfirmed {
			action,
			tx_hash,
			block_number: receipt.block_number,
		});
		Ok(tx_hash)
	}

	async fn wait_for_receipt(&self, tx_hash: B256) -> Result<ReceiptSummary, ExecutionError> {
		loop {
			match self
				.wallet
				.transaction_receipt(tx_hash)
				.await
				.map_err(classify_wallet_error)?
			{
				Some(receipt) => return Ok(receipt),
				None => tokio::time::sleep(self.executor.settings.poll_interval).await,
			}
		}
	}
}

/// Handle to a run started with [`OperationExecutor::spawn`].
pub struct RunHandle {
	task: JoinHandle<Result<B256, ExecutionError>>,
}

impl RunHandle {
	/// Stops the run. Anything already submitted stays submitted.
	pub fn abandon(&self) {
		self.task.abort();
	}

	pub fn is_finished(&self) -> bool {
		self.task.is_finished()
	}

	/// Waits for the run; `None` when it was abandoned.
	pub async fn outcome(self) -> Option<Result<B256, ExecutionError>> {
		self.task.await.ok()
	}
}
