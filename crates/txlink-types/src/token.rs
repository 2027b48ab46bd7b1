//! Token metadata shown next to a plan.

use crate::utils::{format_units, DEFAULT_DECIMALS};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// ERC-20 metadata as read from chain.
///
/// Lookup failures are carried in `error` rather than returned, so callers
/// can always render something.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
	pub address: Option<Address>,
	pub name: String,
	pub symbol: String,
	pub decimals: u8,
	pub total_supply: U256,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl TokenInfo {
	/// Placeholder info with empty fields and the given error.
	pub fn failed(address: Option<Address>, error: impl Into<String>) -> Self {
		Self {
			address,
			name: String::new(),
			symbol: String::new(),
			decimals: DEFAULT_DECIMALS,
			total_supply: U256::ZERO,
			error: Some(error.into()),
		}
	}

	pub fn is_ok(&self) -> bool {
		self.error.is_none()
	}

	/// Total supply in human units.
	pub fn formatted_supply(&self) -> String {
		format_units(self.total_supply, self.decimals)
	}
}
