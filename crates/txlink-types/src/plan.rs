//! Operation plan types.
//!
//! An [`OperationPlan`] is the decoded, validated form of an intent token:
//! the chain to act on, which kind of operation to run, who takes part and
//! the ordered steps with their human amounts. Plans are immutable once
//! decoded; executors only ever borrow them.

use crate::chain::ChainDescriptor;
use crate::utils::TokenAmount;
use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kind of operation a plan describes; selects the executor strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
	/// Native value transfer or ERC-20 `transfer`.
	Transfer,
	/// Native currency deposited into the wrapped-native contract.
	Wrap,
	/// Allowance-guarded approval followed by an exact-in router swap.
	Swap,
}

impl OperationKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Transfer => "transfer",
			Self::Wrap => "wrap",
			Self::Swap => "swap",
		}
	}
}

impl fmt::Display for OperationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for OperationKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"transfer" => Ok(Self::Transfer),
			"wrap" | "deposit" => Ok(Self::Wrap),
			"swap" => Ok(Self::Swap),
			other => Err(format!("Unknown operation kind: {other}")),
		}
	}
}

/// Kind of a single on-chain step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
	Deposit,
	Approve,
	Swap,
	Transfer,
}

impl fmt::Display for ActionKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Deposit => "deposit",
			Self::Approve => "approve",
			Self::Swap => "swap",
			Self::Transfer => "transfer",
		};
		f.write_str(name)
	}
}

/// One step of a plan with its amount in human units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
	pub kind: ActionKind,
	pub amount: TokenAmount,
}

impl Action {
	pub fn new(kind: ActionKind, amount: TokenAmount) -> Self {
		Self { kind, amount }
	}
}

/// Addresses taking part in the operation.
///
/// The sender is never part of the plan: it is whatever account the wallet
/// has connected when the run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Participants {
	Transfer {
		recipient: Address,
		/// ERC-20 contract; `None` means a native value transfer.
		token: Option<Address>,
	},
	Wrap {
		wrapped_token: Address,
	},
	Swap {
		router: Address,
		from_token: Address,
		to_token: Address,
	},
}

impl Participants {
	pub fn kind(&self) -> OperationKind {
		match self {
			Self::Transfer { .. } => OperationKind::Transfer,
			Self::Wrap { .. } => OperationKind::Wrap,
			Self::Swap { .. } => OperationKind::Swap,
		}
	}

	/// ERC-20 contracts named by the plan, in display order.
	pub fn token_addresses(&self) -> Vec<Address> {
		match self {
			Self::Transfer { token, .. } => token.iter().copied().collect(),
			Self::Wrap { wrapped_token } => vec![*wrapped_token],
			Self::Swap {
				from_token,
				to_token,
				..
			} => vec![*from_token, *to_token],
		}
	}
}

/// Violations of the plan invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
	#[error("Plan has no steps")]
	EmptySteps,
	#[error("Plan expired at {0}")]
	Expired(DateTime<Utc>),
	#[error("Participants describe a {participants} operation but the plan is {kind}")]
	KindMismatch {
		kind: OperationKind,
		participants: OperationKind,
	},
}

/// Decoded and validated transaction intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationPlan {
	pub chain: ChainDescriptor,
	pub kind: OperationKind,
	pub participants: Participants,
	pub steps: Vec<Action>,
	/// Native currency symbol shown to the wallet when adding the chain.
	pub currency: String,
	pub expires_at: DateTime<Utc>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub issuer: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subject: Option<String>,
}

impl OperationPlan {
	/// Checks the structural invariants against `now`.
	pub fn validate(&self, now: DateTime<Utc>) -> Result<(), PlanError> {
		if self.steps.is_empty() {
			return Err(PlanError::EmptySteps);
		}
		if self.participants.kind() != self.kind {
			return Err(PlanError::KindMismatch {
				kind: self.kind,
				participants: self.participants.kind(),
			});
		}
		if self.expires_at <= now {
			return Err(PlanError::Expired(self.expires_at));
		}
		Ok(())
	}

	/// First step of the given kind.
	pub fn step(&self, kind: ActionKind) -> Option<&Action> {
		self.steps.iter().find(|action| action.kind == kind)
	}

	pub fn token_addresses(&self) -> Vec<Address> {
		self.participants.token_addresses()
	}
}
