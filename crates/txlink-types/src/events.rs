//! Progress events published while a plan executes.

use crate::execution::{ExecutionError, ExecutionPhase};
use crate::plan::ActionKind;
use alloy_primitives::B256;

/// Notifications broadcast by the executor's event bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
	PhaseChanged {
		from: ExecutionPhase,
		to: ExecutionPhase,
	},
	/// Emitted as soon as the wallet returns a hash, before any receipt.
	TransactionSubmitted {
		action: ActionKind,
		tx_hash: B256,
	},
	TransactionConfirmed {
		action: ActionKind,
		tx_hash: B256,
		block_number: Option<u64>,
	},
	RunFailed {
		error: ExecutionError,
	},
}
