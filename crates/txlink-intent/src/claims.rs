//! Wire shape of intent token claims.
//!
//! Field names follow the camelCase JSON issued by the link service. Numeric
//! fields tolerate both JSON numbers and strings, since issuers disagree on
//! which one an amount is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount as carried in a claim: `10`, `0.5` or `"0.5"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountClaim {
	Number(serde_json::Number),
	Text(String),
}

impl fmt::Display for AmountClaim {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Number(n) => write!(f, "{n}"),
			Self::Text(s) => f.write_str(s),
		}
	}
}

impl From<&str> for AmountClaim {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}

/// Chain id as a JSON number, decimal string or hex string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainIdClaim {
	Number(u64),
	Text(String),
}

impl ChainIdClaim {
	pub fn value(&self) -> Option<u64> {
		match self {
			Self::Number(id) => Some(*id),
			Self::Text(text) => {
				let text = text.trim();
				match text.strip_prefix("0x") {
					Some(hex) => u64::from_str_radix(hex, 16).ok(),
					None => text.parse().ok(),
				}
			},
		}
	}
}

/// Embedded chain description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainClaim {
	pub id: ChainIdClaim,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub explorer_url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rpc: Option<String>,
}

/// One entry of the `action` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionClaim {
	pub action: String,
	pub amount: AmountClaim,
}

/// Complete claim set of an intent token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentClaims {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub from: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub to: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub amount: Option<AmountClaim>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub contract_address: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub from_contract_address: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub to_contract_address: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub currency: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chain: Option<ChainClaim>,
	/// Expiry as unix seconds.
	pub exp: i64,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub action: Vec<ActionClaim>,
	/// Explicit operation kind; otherwise taken from the route or actions.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iss: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sub: Option<String>,
}
