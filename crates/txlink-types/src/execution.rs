//! Execution state machine types.
//!
//! These types describe a single executor run: the phase it is in, the last
//! transaction it submitted, the last error it hit and the last step it
//! completed. The transition table itself lives with the executor.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Phase of an executor run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionPhase {
	Idle,
	/// Waiting on the wallet to switch to (or add) the plan's chain.
	Switching,
	/// Transfer submitted or awaiting signature.
	Signing,
	/// Wrap deposit submitted or awaiting signature.
	Depositing,
	/// Approval submitted or awaiting signature.
	Approving,
	/// Router allowance covers the swap amount.
	Approved,
	Swapping,
	Confirmed,
	Failed,
}

impl ExecutionPhase {
	/// `Confirmed` and `Failed` end a run; only `reset` leaves them.
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::Confirmed | Self::Failed)
	}
}

impl fmt::Display for ExecutionPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Idle => "Idle",
			Self::Switching => "Switching",
			Self::Signing => "Signing",
			Self::Depositing => "Depositing",
			Self::Approving => "Approving",
			Self::Approved => "Approved",
			Self::Swapping => "Swapping",
			Self::Confirmed => "Confirmed",
			Self::Failed => "Failed",
		};
		f.write_str(name)
	}
}

/// Failures of the network reconciliation step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
	#[error("No wallet available")]
	WalletUnavailable,
	#[error("Failed to switch to custom network: {0}")]
	SwitchFailed(String),
	#[error("Failed to add custom network: {0}")]
	AddFailed(String),
}

/// Failures of an executor run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
	#[error("No wallet available")]
	WalletUnavailable,
	#[error(transparent)]
	Network(#[from] NetworkError),
	#[error("Transaction rejected by signer: {0}")]
	SignerRejected(String),
	#[error("Transaction reverted: {0}")]
	CallReverted(String),
	#[error("RPC error: {0}")]
	RpcError(String),
	#[error("Invalid amount: {0}")]
	InvalidAmount(String),
	#[error("Missing execution parameter: {0}")]
	MissingParameter(&'static str),
	#[error("Invalid phase transition from {from} to {to}")]
	InvalidTransition {
		from: ExecutionPhase,
		to: ExecutionPhase,
	},
	#[error("Another run is already in progress")]
	RunInProgress,
}

/// Mutable state owned by one executor run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionState {
	pub phase: ExecutionPhase,
	/// Hash of the most recently submitted transaction, recorded on submission.
	pub last_tx_hash: Option<B256>,
	pub last_error: Option<ExecutionError>,
	/// Last step that completed successfully.
	pub checkpoint: Option<ExecutionPhase>,
	/// Signer calls issued during the current run.
	pub signer_calls: u32,
}

impl Default for ExecutionState {
	fn default() -> Self {
		Self {
			phase: ExecutionPhase::Idle,
			last_tx_hash: None,
			last_error: None,
			checkpoint: None,
			signer_calls: 0,
		}
	}
}

impl ExecutionState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_terminal(&self) -> bool {
		self.phase.is_terminal()
	}
}
