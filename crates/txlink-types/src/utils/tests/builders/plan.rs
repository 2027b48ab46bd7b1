//! Operation plan builder utilities.

use crate::chain::{ChainDescriptor, ChainRegistry};
use crate::plan::{Action, ActionKind, OperationKind, OperationPlan, Participants};
use crate::utils::TokenAmount;
use alloy_primitives::Address;
use chrono::{DateTime, Duration, Utc};

/// Chain every builder preset targets unless overridden.
pub const DEFAULT_TEST_CHAIN_ID: u64 = 240;

/// Builder for creating [`OperationPlan`] instances.
///
/// The presets (`transfer`, `wrap`, `swap`) produce plans that pass
/// validation against the current time.
#[derive(Debug, Clone)]
pub struct OperationPlanBuilder {
	chain: ChainDescriptor,
	participants: Participants,
	steps: Vec<Action>,
	currency: String,
	expires_at: DateTime<Utc>,
	issuer: Option<String>,
	subject: Option<String>,
}

fn amount(value: &str) -> TokenAmount {
	value.parse().unwrap_or_else(|_| TokenAmount::zero())
}

impl OperationPlanBuilder {
	fn with_defaults(participants: Participants, steps: Vec<Action>) -> Self {
		let registry = ChainRegistry::builtin();
		let chain = registry
			.descriptor(DEFAULT_TEST_CHAIN_ID)
			.cloned()
			.unwrap_or_else(|| super::ChainEntryBuilder::new().build_descriptor());
		let currency = chain.native_currency.symbol.clone();
		Self {
			chain,
			participants,
			steps,
			currency,
			expires_at: Utc::now() + Duration::hours(1),
			issuer: None,
			subject: None,
		}
	}

	/// Native transfer of 1.5 to `0x3333…`.
	pub fn transfer() -> Self {
		Self::with_defaults(
			Participants::Transfer {
				recipient: Address::repeat_byte(0x33),
				token: None,
			},
			vec![Action::new(ActionKind::Transfer, amount("1.5"))],
		)
	}

	/// Deposit of 2 into the chain's wrapped native token.
	pub fn wrap() -> Self {
		let wrapped = ChainRegistry::builtin()
			.contracts(DEFAULT_TEST_CHAIN_ID)
			.and_then(|contracts| contracts.wrapped_native)
			.unwrap_or(Address::repeat_byte(0xbb));
		Self::with_defaults(
			Participants::Wrap {
				wrapped_token: wrapped,
			},
			vec![Action::new(ActionKind::Deposit, amount("2"))],
		)
	}

	/// Approve 10 then swap 10 from `0x1111…` to `0x2222…`.
	pub fn swap() -> Self {
		let router = ChainRegistry::builtin()
			.contracts(DEFAULT_TEST_CHAIN_ID)
			.and_then(|contracts| contracts.router)
			.unwrap_or(Address::repeat_byte(0xaa));
		Self::with_defaults(
			Participants::Swap {
				router,
				from_token: Address::repeat_byte(0x11),
				to_token: Address::repeat_byte(0x22),
			},
			vec![
				Action::new(ActionKind::Approve, amount("10")),
				Action::new(ActionKind::Swap, amount("10")),
			],
		)
	}

	pub fn with_chain(mut self, chain: ChainDescriptor) -> Self {
		self.currency = chain.native_currency.symbol.clone();
		self.chain = chain;
		self
	}

	pub fn with_participants(mut self, participants: Participants) -> Self {
		self.participants = participants;
		self
	}

	pub fn with_steps(mut self, steps: Vec<Action>) -> Self {
		self.steps = steps;
		self
	}

	/// Sets every step's amount.
	pub fn with_amount(mut self, value: &str) -> Self {
		let value = amount(value);
		for step in &mut self.steps {
			step.amount = value.clone();
		}
		self
	}

	pub fn with_currency<S: Into<String>>(mut self, currency: S) -> Self {
		self.currency = currency.into();
		self
	}

	pub fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
		self.expires_at = expires_at;
		self
	}

	pub fn with_issuer<S: Into<String>>(mut self, issuer: S) -> Self {
		self.issuer = Some(issuer.into());
		self
	}

	pub fn with_subject<S: Into<String>>(mut self, subject: S) -> Self {
		self.subject = Some(subject.into());
		self
	}

	pub fn build(self) -> OperationPlan {
		let kind: OperationKind = self.participants.kind();
		OperationPlan {
			chain: self.chain,
			kind,
			participants: self.participants,
			steps: self.steps,
			currency: self.currency,
			expires_at: self.expires_at,
			issuer: self.issuer,
			subject: self.subject,
		}
	}
}
